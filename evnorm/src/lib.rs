//! Normalization of event extraction datasets.
//!
//! Records of a source dataset are annotated by an [annotation
//! service](annotate::Annotate), their entity, trigger, and argument spans
//! are aligned to the tokens of the annotation service, and the result is
//! written as [instances](instance::Instance) of a single schema.

pub mod annotate;

pub mod config;

pub mod dataset;

pub mod error;

pub mod extract;

pub mod instance;

pub mod labels;

pub mod validate;

pub mod writer;
