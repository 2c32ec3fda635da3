use std::io::stdout;

use anyhow::Result;
use clap::{crate_version, value_parser, Arg, Command};
use clap_complete::{generate, Shell};

pub mod io;

pub mod progress;

mod subcommands;

pub mod traits;
use traits::EvnormApp;

pub mod util;

fn main() -> Result<()> {
    // Known subapplications.
    let apps = vec![
        subcommands::ConvertApp::app(),
        subcommands::ExportLabelsApp::app(),
        subcommands::ValidateApp::app(),
    ];

    env_logger::init();

    let mut cli = Command::new("evnorm")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .about("Normalize event extraction datasets")
        .version(crate_version!())
        .subcommands(apps)
        .subcommand(
            Command::new("completions")
                .about("Generate completion scripts for your shell")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        );
    let matches = cli.clone().get_matches();

    match matches.subcommand() {
        Some(("completions", matches)) => {
            let shell = *matches.get_one::<Shell>("shell").unwrap();
            generate(shell, &mut cli, "evnorm", &mut stdout());
            Ok(())
        }
        Some(("convert", matches)) => subcommands::ConvertApp::parse(matches)?.run(),
        Some(("export-labels", matches)) => subcommands::ExportLabelsApp::parse(matches)?.run(),
        Some(("validate", matches)) => subcommands::ValidateApp::parse(matches)?.run(),
        _unknown => unreachable!(),
    }
}
