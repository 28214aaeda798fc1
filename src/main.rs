use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use portalgen::build::build_site;
use portalgen::config::Config;
use portalgen::navbar::Patcher;
use portalgen::parser::FeedFormat;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer().with_writer(std::io::stderr).with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            ),
        )
        .init();

    let matches = App::new("portalgen")
        .about("Generates game portal pages from XML/RSS game feeds")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("The project file (defaults to the nearest portalgen.yaml)")
                .global(true)
                .takes_value(true),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Generates game pages and indices from the feeds")
                .arg(
                    Arg::with_name("feeds")
                        .long("feeds")
                        .value_name("DIR")
                        .help("The directory holding the *.xml feeds")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .value_name("DIR")
                        .help("The output directory for pages and indices")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("strict")
                        .long("strict")
                        .help("Require well-formed XML feeds"),
                ),
        )
        .subcommand(
            SubCommand::with_name("patch-navbar")
                .about("Replaces the navigation bar in already-generated pages")
                .arg(
                    Arg::with_name("DIR")
                        .help("The directory to patch (defaults to the output directory)")
                        .index(1),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("patch-navbar", Some(matches)) => patch_navbar(matches),
        _ => Err(anyhow!("no subcommand given")),
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path)),
        None => Config::from_directory(&std::env::current_dir()?),
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(feeds) = matches.value_of("feeds") {
        config.feeds_directory = PathBuf::from(feeds);
    }
    if let Some(output) = matches.value_of("output") {
        config.games_directory = PathBuf::from(output);
    }
    if matches.is_present("strict") {
        config.format = FeedFormat::Strict;
    }

    build_site(&config)?;
    Ok(())
}

fn patch_navbar(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let dir = matches
        .value_of("DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.games_directory.clone());

    let summary = Patcher::new(&config.navbar).patch_tree(&dir)?;
    print!("{}", summary);
    Ok(())
}
