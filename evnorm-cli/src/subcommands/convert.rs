use std::io::{BufRead, BufWriter};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use evnorm::annotate::Annotate;
use evnorm::dataset::{Dataset, Emm, M2e2, Rams, Records};
use evnorm::extract::Extractor;
use evnorm::labels::LabelMapper;
use evnorm::writer::{BatchWriter, JsonLinesWriter, WriteBatch};
use stdinout::Output;

use crate::io::{load_config, DatasetInput, DatasetKind, DATASETS};
use crate::progress::ConversionSpeed;
use crate::traits::EvnormApp;

const CONFIG: &str = "CONFIG";
const DATASET: &str = "DATASET";
const INPUT: &str = "INPUT";
const NO_MAPPING: &str = "NO_MAPPING";
const OUTPUT: &str = "OUTPUT";

pub struct ConvertApp {
    config: String,
    dataset: DatasetKind,
    input: Option<String>,
    no_mapping: bool,
    output: Option<String>,
}

fn convert_dataset<A, D, R, W>(
    extractor: &mut Extractor<A>,
    dataset: &D,
    read: R,
    writer: &mut BatchWriter<W>,
) -> Result<()>
where
    A: Annotate + ?Sized,
    D: Dataset,
    R: BufRead,
    W: WriteBatch,
{
    let records = Records::new(read, dataset.format())
        .context(format!("Cannot read {} dataset", dataset.origin()))?;
    extractor
        .convert(dataset, records, writer)
        .context(format!("Cannot convert {} dataset", dataset.origin()))
}

impl EvnormApp for ConvertApp {
    fn app() -> Command {
        Command::new("convert")
            .arg_required_else_help(true)
            .about("Convert a dataset to normalized instances")
            .arg(
                Arg::new(CONFIG)
                    .help("Conversion configuration file")
                    .index(1)
                    .required(true),
            )
            .arg(
                Arg::new(DATASET)
                    .help("Source dataset")
                    .index(2)
                    .required(true)
                    .value_parser(DATASETS.to_vec()),
            )
            .arg(
                Arg::new(INPUT)
                    .help("Input data (a directory of files for EMM)")
                    .index(3),
            )
            .arg(Arg::new(OUTPUT).help("Output instances").index(4))
            .arg(
                Arg::new(NO_MAPPING)
                    .long("no-mapping")
                    .action(ArgAction::SetTrue)
                    .help("Do not map event types and roles to canonical labels"),
            )
    }

    fn parse(matches: &ArgMatches) -> Result<Self> {
        let config = matches.get_one::<String>(CONFIG).unwrap().into();
        let dataset = matches.get_one::<String>(DATASET).unwrap().parse()?;
        let input = matches.get_one::<String>(INPUT).map(ToOwned::to_owned);
        let no_mapping = matches.get_flag(NO_MAPPING);
        let output = matches.get_one::<String>(OUTPUT).map(ToOwned::to_owned);

        Ok(ConvertApp {
            config,
            dataset,
            input,
            no_mapping,
            output,
        })
    }

    fn run(&self) -> Result<()> {
        let config = load_config(&self.config)?;

        let annotator = config
            .annotator()
            .context("Cannot construct annotation service client")?;
        log::info!("Annotating with CoreNLP server at {}", annotator.url());
        let labels = if self.no_mapping {
            LabelMapper::identity()
        } else {
            config
                .label_mapper()
                .context("Cannot load label mappings")?
        };

        let input = DatasetInput::new(self.dataset, self.input.as_deref())?;

        let output = Output::from(self.output.as_ref());
        let mut writer = BatchWriter::new(
            JsonLinesWriter::new(BufWriter::new(
                output.write().context("Cannot open output for writing")?,
            )),
            config.extraction.batch_size,
        );

        let mut extractor = Extractor::new(&annotator, &labels).with_aligner(config.aligner());
        let mut speed = ConversionSpeed::new();

        input.for_each_read(true, |file_index, read| match self.dataset {
            DatasetKind::Rams => convert_dataset(&mut extractor, &Rams, read, &mut writer),
            DatasetKind::M2e2 => convert_dataset(&mut extractor, &M2e2, read, &mut writer),
            DatasetKind::Emm => {
                convert_dataset(&mut extractor, &Emm::new(file_index), read, &mut writer)
            }
        })?;

        writer.finish().context("Cannot write instances")?;

        let stats = *extractor.stats();
        speed.count_records(stats.records);
        log::info!("{}", stats);

        Ok(())
    }
}
