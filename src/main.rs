//! CLI entry point for `quern`.

use anyhow::Result;
use clap::{App, AppSettings, Arg, SubCommand};
use quern::{build, config::Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = App::new("quern")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A static blog generator for Jekyll-style Markdown posts")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Render the site into the output directory")
                .arg(
                    Arg::with_name("source")
                        .help(
                            "Project directory (defaults to the current \
                             directory); `quern.yaml` is searched for here \
                             and in ancestor directories",
                        )
                        .index(1),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("_site")
                        .help("Output directory"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => {
            let source = PathBuf::from(matches.value_of("source").unwrap_or("."));
            let output = PathBuf::from(matches.value_of("output").unwrap());
            let config = Config::from_directory(&source, &output)?;
            build::build_site(config)?;
            Ok(())
        }
        _ => unreachable!("SubcommandRequiredElseHelp"),
    }
}
