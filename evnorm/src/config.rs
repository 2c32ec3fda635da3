use std::io::Read;
use std::path::Path;

use evnorm_align::{SpanAligner, DEFAULT_ANCHOR_BUFFER};
use serde::Deserialize;

use crate::annotate::CoreNlpClient;
use crate::error::EvnormError;
use crate::labels::LabelMapper;

/// Annotation service configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnnotatorConfig {
    /// URL of the CoreNLP server.
    pub url: String,
}

/// Extraction configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// The number of instances that are written at once.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// The number of tokens before the anchor token that are searched
    /// for the first word of a span.
    #[serde(default = "default_anchor_buffer")]
    pub anchor_buffer: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            batch_size: default_batch_size(),
            anchor_buffer: default_anchor_buffer(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}

fn default_anchor_buffer() -> usize {
    DEFAULT_ANCHOR_BUFFER
}

/// Label mapping configuration.
///
/// Labels without a mapping file are only normalized.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelsConfig {
    /// Event type mapping.
    pub events: Option<String>,

    /// Argument role mapping.
    pub roles: Option<String>,
}

/// Conversion configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Configuration of the annotation service.
    pub annotator: AnnotatorConfig,

    /// Configuration of the extraction.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Configuration of the label mappings.
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl Config {
    /// Make configuration paths relative to the configuration file.
    pub fn relativize_paths<P>(&mut self, config_path: P) -> Result<(), EvnormError>
    where
        P: AsRef<Path>,
    {
        let config_path = config_path.as_ref();

        if let Some(ref mut events) = self.labels.events {
            *events = relativize_path(config_path, events)?;
        }
        if let Some(ref mut roles) = self.labels.roles {
            *roles = relativize_path(config_path, roles)?;
        }

        Ok(())
    }

    /// Construct the annotation service client.
    pub fn annotator(&self) -> Result<CoreNlpClient, EvnormError> {
        Ok(CoreNlpClient::new(self.annotator.url.clone())?)
    }

    /// Construct the span aligner.
    pub fn aligner(&self) -> SpanAligner {
        SpanAligner::new(self.extraction.anchor_buffer)
    }

    /// Load the label mappings.
    pub fn label_mapper(&self) -> Result<LabelMapper, EvnormError> {
        LabelMapper::open(self.labels.events.as_ref(), self.labels.roles.as_ref())
    }
}

pub trait TomlRead
where
    Self: Sized,
{
    fn from_toml_read(read: impl Read) -> Result<Self, EvnormError>;
}

impl TomlRead for Config {
    fn from_toml_read(mut read: impl Read) -> Result<Self, EvnormError> {
        let mut data = String::new();
        read.read_to_string(&mut data)?;
        let config: Config = toml::from_str(&data)?;

        if config.extraction.batch_size == 0 {
            return Err(EvnormError::IllegalConfigurationError(
                "batch_size should at least be 1".to_string(),
            ));
        }

        Ok(config)
    }
}

fn relativize_path(config_path: &Path, filename: &str) -> Result<String, EvnormError> {
    if filename.is_empty() {
        return Ok(filename.to_owned());
    }

    let path = Path::new(&filename);

    // Don't touch absolute paths.
    if path.is_absolute() {
        return Ok(filename.to_owned());
    }

    let abs_config_path = config_path.canonicalize()?;
    Ok(abs_config_path
        .parent()
        .ok_or_else(|| {
            EvnormError::RelativizePathError(format!(
                "Cannot get parent path of the configuration file: {}",
                abs_config_path.to_string_lossy()
            ))
        })?
        .join(path)
        .to_str()
        .ok_or_else(|| {
            EvnormError::RelativizePathError(format!(
                "Cannot convert parent path to string: {}",
                abs_config_path.to_string_lossy()
            ))
        })?
        .to_owned())
}
