use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use tracing::{debug, info};
use weblinks::config::Config;
use weblinks::logging;
use weblinks::smileys;
use weblinks::url::{ContextRoot, Resource, Selector};
use weblinks::weblog::Weblog;

fn main() {
    if let Err(err) = run(app().get_matches()) {
        eprintln!("weblinks error: {:#}", err);
        std::process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let handle = || Arg::with_name("handle").required(true).help("Weblog handle");
    let selectors = |cmd: App<'static, 'static>| {
        cmd.arg(Arg::with_name("category").long("category").takes_value(true))
            .arg(
                Arg::with_name("date")
                    .long("date")
                    .takes_value(true)
                    .help("YYYYMMDD or YYYYMM"),
            )
            .arg(
                Arg::with_name("tag")
                    .long("tag")
                    .takes_value(true)
                    .multiple(true)
                    .number_of_values(1),
            )
            .arg(Arg::with_name("page").long("page").takes_value(true))
    };

    App::new("weblinks")
        .about("Prints canonical weblog URLs")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .takes_value(true)
                .help("Directory to search for weblinks.yaml (default: current directory)"),
        )
        .arg(
            Arg::with_name("preview")
                .long("preview")
                .help("Build authoring-preview URLs"),
        )
        .arg(
            Arg::with_name("theme")
                .long("theme")
                .takes_value(true)
                .requires("preview")
                .help("Theme forced onto preview URLs"),
        )
        .arg(
            Arg::with_name("absolute")
                .long("absolute")
                .help("Include scheme and host"),
        )
        .arg(Arg::with_name("locale").long("locale").takes_value(true))
        .subcommand(SubCommand::with_name("weblog").arg(handle()))
        .subcommand(
            SubCommand::with_name("entry")
                .arg(handle())
                .arg(Arg::with_name("anchor").long("anchor").takes_value(true)),
        )
        .subcommand(selectors(SubCommand::with_name("collection").arg(handle())))
        .subcommand(selectors(
            SubCommand::with_name("page")
                .arg(handle())
                .arg(Arg::with_name("link").long("link").takes_value(true)),
        ))
        .subcommand(
            SubCommand::with_name("resource")
                .arg(handle())
                .arg(Arg::with_name("path").required(true)),
        )
        .subcommand(
            SubCommand::with_name("smileys")
                .about("Renders emoticons in TEXT as image tags")
                .arg(Arg::with_name("text").required(true)),
        )
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let dir = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    match Config::find_project_file(&dir) {
        Some(path) => Config::from_project_file(&path),
        None => Ok(Config::default()),
    }
}

fn run(matches: ArgMatches) -> Result<()> {
    let config = load_config(&matches)?;
    logging::init(config.log_level.as_deref())?;

    let strategy = config.url_strategy(matches.is_present("preview"), matches.value_of("theme"));
    let locale = matches.value_of("locale");
    let absolute = matches.is_present("absolute");

    let (name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => return Err(anyhow!("missing subcommand")),
    };

    if name == "smileys" {
        let definitions = config.smiley_definitions()?;
        let table = smileys::init(config.context_urls.absolute_url(), definitions.as_deref())?;
        info!(count = table.len(), "smileys loaded");
        println!("{}", table.render(sub.value_of("text").unwrap_or_default()));
        return Ok(());
    }

    let weblog = sub.value_of("handle").map(Weblog::new);
    let tags: Vec<String> = sub
        .values_of("tag")
        .map(|values| values.map(str::to_owned).collect())
        .unwrap_or_default();
    let page = match sub.value_of("page") {
        Some(page) => page
            .parse::<i32>()
            .map_err(|e| anyhow!("Invalid --page `{}`: {}", page, e))?,
        None => 0,
    };
    let selector = Selector {
        category: sub.value_of("category"),
        date: sub.value_of("date"),
        tags: &tags,
        page,
    };

    let resource = match name {
        "weblog" => Resource::Root,
        "entry" => Resource::Entry {
            anchor: sub.value_of("anchor"),
        },
        "collection" => Resource::Collection(selector),
        "page" => Resource::Page {
            link: sub.value_of("link"),
            selector,
        },
        "resource" => Resource::File {
            path: sub.value_of("path").unwrap_or_default(),
        },
        other => return Err(anyhow!("unknown subcommand `{}`", other)),
    };
    debug!(?resource, ?locale, absolute, "resolving");

    match strategy.resolve(weblog.as_ref(), locale, &resource, absolute) {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => Err(anyhow!("no weblog to resolve against")),
    }
}

