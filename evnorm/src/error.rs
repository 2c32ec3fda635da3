use std::io;

use evnorm_align::AlignError;
use thiserror::Error;

use crate::annotate::AnnotateError;

/// Errors that abort a conversion run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EvnormError {
    #[error(transparent)]
    AnnotateError(#[from] AnnotateError),

    #[error("Illegal configuration: {0}")]
    IllegalConfigurationError(String),

    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error("{0}: {1}")]
    JSonSerialization(String, serde_json::Error),

    #[error("Cannot relativize path: {0}")]
    RelativizePathError(String),

    #[error(transparent)]
    TomlDeserializationError(#[from] toml::de::Error),
}

/// Errors that cause a single record to be skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Cannot annotate record: {0}")]
    ParseFailure(#[from] AnnotateError),

    #[error("Cannot align trigger: {0}")]
    AlignmentFailure(#[source] AlignError),

    #[error("Argument `{key}` does not refer to an aligned entity")]
    MissingLinkage { key: String },

    #[error("Record does not have an event type")]
    MissingEventType,

    #[error("Record does not have a trigger")]
    MissingTrigger,

    #[error("Span [{start}, {end}) does not fit the {len} source tokens")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Record does not match the dataset schema: {0}")]
    Schema(#[from] serde_json::Error),
}
