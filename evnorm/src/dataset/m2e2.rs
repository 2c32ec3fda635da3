use serde::Deserialize;

use crate::dataset::{
    token_text, Dataset, RecordFormat, SourceArgument, SourceEvent, SourceMention, SourceRecord,
    SourceText,
};
use crate::error::RecordError;

/// An M2E2 record.
///
/// Spans are token offsets into `words` with exclusive ends.
#[derive(Clone, Debug, Deserialize)]
pub struct M2e2Record {
    pub sentence_id: String,

    pub sentence: String,

    pub words: Vec<String>,

    #[serde(rename = "golden-entity-mentions")]
    pub entities: Vec<M2e2Entity>,

    #[serde(rename = "golden-event-mentions")]
    pub events: Vec<M2e2Event>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct M2e2Entity {
    pub start: usize,

    pub end: usize,

    #[serde(rename = "entity-type")]
    pub entity_type: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct M2e2Event {
    pub event_type: String,

    pub trigger: M2e2Span,

    pub arguments: Vec<M2e2Argument>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct M2e2Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct M2e2Argument {
    pub start: usize,
    pub end: usize,
    pub role: String,
}

/// The M2E2 multimedia event extraction dataset (text part).
#[derive(Clone, Copy, Debug, Default)]
pub struct M2e2;

impl Dataset for M2e2 {
    type Record = M2e2Record;

    fn origin(&self) -> &str {
        "M2E2"
    }

    fn format(&self) -> RecordFormat {
        RecordFormat::JsonArray
    }

    fn extract_spans(&self, index: usize, record: M2e2Record) -> Result<SourceRecord, RecordError> {
        let words = &record.words;

        let entities = record
            .entities
            .iter()
            .map(|entity| {
                let text = token_text(words, entity.start, entity.end)?;
                Ok::<_, RecordError>(SourceMention {
                    start: entity.start,
                    end: entity.end,
                    key: text.clone(),
                    text,
                    existing_type: entity.entity_type.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let events = record
            .events
            .iter()
            .map(|event| {
                let trigger_text = token_text(words, event.trigger.start, event.trigger.end)?;
                let arguments = event
                    .arguments
                    .iter()
                    .map(|argument| {
                        Ok::<_, RecordError>(SourceArgument {
                            key: token_text(words, argument.start, argument.end)?,
                            offsets: Some((argument.start, argument.end)),
                            role: argument.role.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok::<_, RecordError>(SourceEvent {
                    event_type: event.event_type.clone(),
                    trigger: SourceMention {
                        start: event.trigger.start,
                        end: event.trigger.end,
                        key: trigger_text.clone(),
                        text: trigger_text,
                        existing_type: String::new(),
                    },
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SourceRecord {
            id: format!("M2E2-instance-{}-{}", index, record.sentence_id),
            text: SourceText::Tokenized {
                text: record.sentence,
                tokens: record.words,
            },
            entities,
            events,
        })
    }
}
