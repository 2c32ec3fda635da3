//! Source datasets.
//!
//! A [`Dataset`] reads the records of one source dataset and extracts
//! the text, mention spans, and events of a record in the index space of
//! the source. The spans are aligned to the annotation service's tokens by
//! the [extractor](crate::extract::Extractor).

use std::io::{BufRead, Lines};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{EvnormError, RecordError};

mod emm;
pub use emm::Emm;

mod m2e2;
pub use m2e2::M2e2;

mod rams;
pub use rams::Rams;

/// Serialization format of a dataset file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordFormat {
    /// One JSON record per line.
    JsonLines,

    /// A single JSON array of records.
    JsonArray,
}

/// What to do with an argument that does not refer to an aligned entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgumentPolicy {
    /// Skip the whole instance.
    SkipInstance,

    /// Drop only the argument.
    DropArgument,
}

/// A record in a dataset file that is not parsed yet.
#[derive(Debug)]
pub struct RawRecord {
    /// Index of the record in the dataset file.
    pub index: usize,

    /// JSON value of the record, syntax errors are scoped to the record in
    /// JSON lines files.
    pub value: Result<Value, serde_json::Error>,
}

/// Iterator over the records of a dataset file.
pub enum Records<R> {
    Lines { lines: Lines<R>, index: usize },
    Array(std::iter::Enumerate<std::vec::IntoIter<Value>>),
}

impl<R> Records<R>
where
    R: BufRead,
{
    /// Read records in the given format.
    ///
    /// JSON arrays are read eagerly, a malformed array is an error.
    pub fn new(read: R, format: RecordFormat) -> Result<Self, EvnormError> {
        match format {
            RecordFormat::JsonLines => Ok(Records::Lines {
                lines: read.lines(),
                index: 0,
            }),
            RecordFormat::JsonArray => {
                let values: Vec<Value> = serde_json::from_reader(read).map_err(|err| {
                    EvnormError::JSonSerialization("Cannot read dataset".to_string(), err)
                })?;
                Ok(Records::Array(values.into_iter().enumerate()))
            }
        }
    }
}

impl<R> Iterator for Records<R>
where
    R: BufRead,
{
    type Item = Result<RawRecord, EvnormError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Records::Lines { lines, index } => {
                for line in lines {
                    let line = match line {
                        Ok(line) => line,
                        Err(err) => return Some(Err(err.into())),
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    let record = RawRecord {
                        index: *index,
                        value: serde_json::from_str(&line),
                    };
                    *index += 1;

                    return Some(Ok(record));
                }

                None
            }
            Records::Array(values) => values
                .next()
                .map(|(index, value)| Ok(RawRecord { index, value: Ok(value) })),
        }
    }
}

/// The text of a source record.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceText {
    /// Tokenized sentences.
    ///
    /// Mention offsets are token offsets into the concatenation of the
    /// sentences. The sentences are annotated as-is.
    Sentences(Vec<Vec<String>>),

    /// Raw text with its source tokenization.
    ///
    /// Mention offsets are token offsets into `tokens`. The raw text is
    /// annotated.
    Tokenized { text: String, tokens: Vec<String> },

    /// Raw text, mention offsets are character offsets.
    Document(String),
}

/// A mention in the index space of its source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceMention {
    /// Start offset.
    pub start: usize,

    /// Exclusive end offset.
    pub end: usize,

    /// Text of the mention in the source.
    pub text: String,

    /// Key by which arguments refer to the mention.
    pub key: String,

    /// Entity type in the source, empty if the source does not
    /// have entity types.
    pub existing_type: String,
}

/// An argument in the index space of its source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceArgument {
    /// Key of the entity mention.
    pub key: String,

    /// Offsets of the argument, if the source provides them.
    pub offsets: Option<(usize, usize)>,

    /// Raw role label.
    pub role: String,
}

/// An event in the index space of its source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceEvent {
    /// Raw event type.
    pub event_type: String,

    pub trigger: SourceMention,

    pub arguments: Vec<SourceArgument>,
}

/// A record with its mentions and events in the index space of the source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRecord {
    pub id: String,
    pub text: SourceText,
    pub entities: Vec<SourceMention>,
    pub events: Vec<SourceEvent>,
}

/// A source dataset.
pub trait Dataset {
    /// Schema of a record.
    type Record: DeserializeOwned;

    /// Name of the dataset, used as the origin of instances.
    fn origin(&self) -> &str;

    fn format(&self) -> RecordFormat;

    /// Parse the JSON value of a record.
    fn parse_record(&self, value: Value) -> Result<Self::Record, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Extract text, mentions, and events of the record at `index`.
    fn extract_spans(&self, index: usize, record: Self::Record)
        -> Result<SourceRecord, RecordError>;

    /// Policy for arguments that do not refer to an aligned entity.
    fn argument_policy(&self) -> ArgumentPolicy {
        ArgumentPolicy::SkipInstance
    }
}

/// Join the source tokens `[start, end)`.
pub(crate) fn token_text(
    tokens: &[String],
    start: usize,
    end: usize,
) -> Result<String, RecordError> {
    if start > end || end > tokens.len() {
        return Err(RecordError::InvalidSpan {
            start,
            end,
            len: tokens.len(),
        });
    }

    Ok(tokens[start..end].join(" "))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{token_text, RecordFormat, Records};
    use crate::error::{EvnormError, RecordError};

    #[test]
    fn json_lines_errors_are_scoped_to_records() {
        let data = "{\"a\": 1}\n\n{broken\n{\"a\": 3}\n";
        let records = Records::new(Cursor::new(data), RecordFormat::JsonLines)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].index, 1);
        assert!(records[1].value.is_err());
        assert_eq!(records[2].index, 2);
        assert_eq!(records[2].value.as_ref().unwrap()["a"], 3);
    }

    #[test]
    fn malformed_array_is_fatal() {
        assert!(matches!(
            Records::new(Cursor::new("[{\"a\": 1},"), RecordFormat::JsonArray),
            Err(EvnormError::JSonSerialization(_, _))
        ));

        let records = Records::new(Cursor::new("[{\"a\": 1}, {\"a\": 2}]"), RecordFormat::JsonArray)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].index, 1);
    }

    #[test]
    fn token_text_checks_bounds() {
        let tokens = vec!["Troops".to_string(), "arrived".to_string()];
        assert_eq!(token_text(&tokens, 0, 2).unwrap(), "Troops arrived");
        assert!(matches!(
            token_text(&tokens, 1, 3),
            Err(RecordError::InvalidSpan {
                start: 1,
                end: 3,
                len: 2
            })
        ));
    }
}
