use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use evnorm::instance::Instance;
use evnorm::validate::Validator;
use indicatif::ProgressBar;
use stdinout::Input;

use crate::progress::instance_progress;
use crate::traits::EvnormApp;
use crate::util::count_records;

const INPUT: &str = "INPUT";
const NO_DETAILED: &str = "NO_DETAILED";

pub struct ValidateApp {
    detailed: bool,
    input: Option<String>,
}

impl ValidateApp {
    fn progress_bar(&self) -> Result<ProgressBar> {
        match self.input {
            Some(ref input) => {
                let f = File::open(input).context(format!("Cannot open input: {}", input))?;
                let n_instances = count_records(BufReader::new(f))
                    .context(format!("Cannot count instances in: {}", input))?;
                instance_progress(n_instances)
            }
            None => Ok(ProgressBar::hidden()),
        }
    }
}

impl EvnormApp for ValidateApp {
    fn app() -> Command {
        Command::new("validate")
            .about("Validate normalized instances")
            .arg(Arg::new(INPUT).help("Input instances").index(1))
            .arg(
                Arg::new(NO_DETAILED)
                    .long("no-detailed")
                    .action(ArgAction::SetTrue)
                    .help("Only check chunks, sentences, triggers, and arguments"),
            )
    }

    fn parse(matches: &ArgMatches) -> Result<Self> {
        let detailed = !matches.get_flag(NO_DETAILED);
        let input = matches.get_one::<String>(INPUT).map(ToOwned::to_owned);

        Ok(ValidateApp { detailed, input })
    }

    fn run(&self) -> Result<()> {
        let progress_bar = self.progress_bar()?;

        let input = Input::from(self.input.as_ref());
        let reader = input.buf_read().context("Cannot open input for reading")?;

        let validator = Validator::new(self.detailed);

        let mut n_instances = 0;
        let mut n_invalid = 0;
        for (idx, line) in reader.lines().enumerate() {
            let line = line.context("Cannot read instance")?;
            if line.trim().is_empty() {
                continue;
            }

            let instance: Instance = serde_json::from_str(&line)
                .context(format!("Cannot parse instance on line {}", idx + 1))?;

            let violations = validator.validate(&instance);
            if !violations.is_empty() {
                n_invalid += 1;
            }
            for violation in violations {
                progress_bar.suspend(|| log::error!("{}: {}", instance.id, violation));
            }

            n_instances += 1;
            progress_bar.inc(1);
        }

        progress_bar.finish();

        if n_invalid > 0 {
            bail!("{} of {} instances are invalid", n_invalid, n_instances);
        }

        log::info!("All {} instances are valid", n_instances);

        Ok(())
    }
}
