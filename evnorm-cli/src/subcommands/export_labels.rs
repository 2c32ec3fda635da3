use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufWriter};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use evnorm::dataset::{Dataset, Emm, M2e2, RawRecord, Rams, Records};
use evnorm::error::RecordError;
use evnorm::labels::{write_vocabulary, Vocabulary};

use crate::io::{DatasetInput, DatasetKind, DATASETS};
use crate::traits::EvnormApp;

const DATASET: &str = "DATASET";
const EVENTS_OUTPUT: &str = "EVENTS_OUTPUT";
const INPUT: &str = "INPUT";
const ROLES_OUTPUT: &str = "ROLES_OUTPUT";

pub struct ExportLabelsApp {
    dataset: DatasetKind,
    events_output: String,
    input: String,
    roles_output: String,
}

fn collect_labels<D, R>(dataset: &D, read: R, vocabulary: &mut Vocabulary) -> Result<()>
where
    D: Dataset,
    R: BufRead,
{
    let records = Records::new(read, dataset.format())
        .context(format!("Cannot read {} dataset", dataset.origin()))?;

    for record in records {
        let RawRecord { index, value } = record.context("Cannot read record")?;
        let source = value
            .map_err(RecordError::from)
            .and_then(|value| dataset.parse_record(value))
            .and_then(|record| dataset.extract_spans(index, record));

        match source {
            Ok(source) => vocabulary.add_record(&source),
            Err(err) => log::warn!(
                target: dataset.origin(),
                "record {}: {}, skipping",
                index,
                err
            ),
        }
    }

    Ok(())
}

fn write_labels(labels: &BTreeSet<String>, path: &str) -> Result<()> {
    let f = File::create(path).context(format!("Cannot create label file: {}", path))?;
    write_vocabulary(labels, BufWriter::new(f))
        .context(format!("Cannot write labels to: {}", path))?;
    log::info!("Wrote {} labels to {}", labels.len(), path);
    Ok(())
}

impl EvnormApp for ExportLabelsApp {
    fn app() -> Command {
        Command::new("export-labels")
            .arg_required_else_help(true)
            .about("Export the raw event types and roles of a dataset")
            .arg(
                Arg::new(DATASET)
                    .help("Source dataset")
                    .index(1)
                    .required(true)
                    .value_parser(DATASETS.to_vec()),
            )
            .arg(
                Arg::new(INPUT)
                    .help("Input data (a directory of files for EMM)")
                    .index(2)
                    .required(true),
            )
            .arg(
                Arg::new(EVENTS_OUTPUT)
                    .help("Event type output file")
                    .index(3)
                    .required(true),
            )
            .arg(
                Arg::new(ROLES_OUTPUT)
                    .help("Role output file")
                    .index(4)
                    .required(true),
            )
    }

    fn parse(matches: &ArgMatches) -> Result<Self> {
        let dataset = matches.get_one::<String>(DATASET).unwrap().parse()?;
        let input = matches.get_one::<String>(INPUT).unwrap().into();
        let events_output = matches.get_one::<String>(EVENTS_OUTPUT).unwrap().into();
        let roles_output = matches.get_one::<String>(ROLES_OUTPUT).unwrap().into();

        Ok(ExportLabelsApp {
            dataset,
            events_output,
            input,
            roles_output,
        })
    }

    fn run(&self) -> Result<()> {
        let input = DatasetInput::new(self.dataset, Some(self.input.as_str()))?;

        let mut vocabulary = Vocabulary::default();
        input.for_each_read(false, |file_index, read| match self.dataset {
            DatasetKind::Rams => collect_labels(&Rams, read, &mut vocabulary),
            DatasetKind::M2e2 => collect_labels(&M2e2, read, &mut vocabulary),
            DatasetKind::Emm => collect_labels(&Emm::new(file_index), read, &mut vocabulary),
        })?;

        write_labels(&vocabulary.event_types, &self.events_output)?;
        write_labels(&vocabulary.roles, &self.roles_output)
    }
}
