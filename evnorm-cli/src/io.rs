use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use evnorm::config::{Config, TomlRead};
use stdinout::Input;

use crate::progress::ReadProgress;

/// Names of the supported datasets.
pub static DATASETS: &[&str] = &["rams", "m2e2", "emm"];

/// Supported source datasets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DatasetKind {
    Rams,
    M2e2,
    Emm,
}

impl FromStr for DatasetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rams" => Ok(DatasetKind::Rams),
            "m2e2" => Ok(DatasetKind::M2e2),
            "emm" => Ok(DatasetKind::Emm),
            unknown => bail!("Unknown dataset: {}", unknown),
        }
    }
}

/// Input of a dataset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DatasetInput {
    Stdin,

    /// Dataset files, in processing order.
    Files(Vec<PathBuf>),
}

impl DatasetInput {
    /// Construct the input of a dataset.
    ///
    /// Only EMM datasets can be read from a directory, the files of the
    /// directory are processed in sorted order.
    pub fn new(kind: DatasetKind, input: Option<&str>) -> Result<Self> {
        let input = match input {
            Some(input) => Path::new(input),
            None => return Ok(DatasetInput::Stdin),
        };

        if !input.is_dir() {
            return Ok(DatasetInput::Files(vec![input.to_owned()]));
        }

        if kind != DatasetKind::Emm {
            bail!(
                "Cannot read {:?} dataset from directory: {}",
                kind,
                input.to_string_lossy()
            );
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(input)
            .context(format!("Cannot read directory: {}", input.to_string_lossy()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().map(|ext| ext == "json").unwrap_or(false) {
                files.push(path);
            }
        }
        files.sort();

        Ok(DatasetInput::Files(files))
    }

    /// Call `f` with the index and reader of every input.
    ///
    /// When `progress` is true, a progress bar is shown while reading
    /// files.
    pub fn for_each_read<F>(&self, progress: bool, mut f: F) -> Result<()>
    where
        F: FnMut(usize, Box<dyn BufRead + '_>) -> Result<()>,
    {
        match self {
            DatasetInput::Stdin => {
                let input = Input::from(None::<&str>);
                let read = input.buf_read().context("Cannot open input for reading")?;
                f(0, Box::new(read))
            }
            DatasetInput::Files(files) => {
                for (idx, path) in files.iter().enumerate() {
                    log::info!("Reading {}", path.to_string_lossy());

                    let file = File::open(path)
                        .context(format!("Cannot open dataset file: {}", path.to_string_lossy()))?;
                    let read: Box<dyn BufRead> = if progress {
                        Box::new(BufReader::new(ReadProgress::new(file).context(
                            "Cannot create progress bar",
                        )?))
                    } else {
                        Box::new(BufReader::new(file))
                    };

                    f(idx, read)?;
                }

                Ok(())
            }
        }
    }
}

pub fn load_config(config_path: &str) -> Result<Config> {
    let config_file = File::open(config_path)
        .context(format!("Cannot open configuration file '{}'", &config_path))?;
    let mut config = Config::from_toml_read(config_file)
        .context(format!("Cannot parse configuration file: {}", config_path))?;
    config.relativize_paths(config_path).context(format!(
        "Cannot relativize paths in configuration file: {}",
        config_path
    ))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{DatasetInput, DatasetKind};

    #[test]
    fn dataset_names_are_parsed() {
        assert_eq!("rams".parse::<DatasetKind>().unwrap(), DatasetKind::Rams);
        assert_eq!("M2E2".parse::<DatasetKind>().unwrap(), DatasetKind::M2e2);
        assert_eq!("emm".parse::<DatasetKind>().unwrap(), DatasetKind::Emm);
        assert!("ace".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn directories_are_only_read_for_emm() {
        let testdata = concat!(env!("CARGO_MANIFEST_DIR"), "/../evnorm/testdata");

        assert!(DatasetInput::new(DatasetKind::Rams, Some(testdata)).is_err());

        match DatasetInput::new(DatasetKind::Emm, Some(testdata)).unwrap() {
            DatasetInput::Files(files) => {
                let names: Vec<_> = files
                    .iter()
                    .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
                    .collect();
                assert_eq!(names, vec!["emm.json", "events.json", "m2e2.json", "roles.json"]);
            }
            DatasetInput::Stdin => panic!("Expected files"),
        }

        assert_eq!(
            DatasetInput::new(DatasetKind::Rams, None).unwrap(),
            DatasetInput::Stdin
        );
    }
}
