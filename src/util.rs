use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Opens `path`, naming the `kind` of file in the error.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path)
        .map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}

/// Reads all of `path` into a string, naming the `kind` of file in the
/// error.
pub fn read_to_string(path: &Path, kind: &str) -> Result<String> {
    let mut contents = String::new();
    open(path, kind)?
        .read_to_string(&mut contents)
        .map_err(|e| anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))?;
    Ok(contents)
}
