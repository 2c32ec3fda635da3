use serde::Deserialize;

use crate::dataset::{
    ArgumentPolicy, Dataset, RecordFormat, SourceArgument, SourceEvent, SourceMention,
    SourceRecord, SourceText,
};
use crate::error::RecordError;

const EVENT_TYPE_FIELD: &str = "ev_type";

const TRIGGER_LABEL: &str = "event trigger";

/// A Label Studio task of the EMM dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct EmmRecord {
    pub data: EmmData,

    #[serde(default)]
    pub completions: Vec<EmmCompletion>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmmData {
    pub filename: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmmCompletion {
    pub result: Vec<EmmResult>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmmResult {
    pub from_name: String,
    pub value: EmmValue,
}

/// Value of an annotation.
///
/// Choices are used for the event type, labels for mentions. Offsets
/// are character offsets into the text of the task.
#[derive(Clone, Debug, Deserialize)]
pub struct EmmValue {
    #[serde(default)]
    pub choices: Vec<String>,

    #[serde(default)]
    pub labels: Vec<String>,

    pub start: Option<usize>,

    pub end: Option<usize>,

    #[serde(default)]
    pub text: String,
}

/// The EMM event dataset, annotated in Label Studio.
///
/// Every labeled span other than the trigger is an entity and an
/// argument of the event, with its label as the role.
#[derive(Clone, Copy, Debug, Default)]
pub struct Emm {
    file_index: usize,
}

impl Emm {
    /// Construct the dataset for the file with the given index.
    pub fn new(file_index: usize) -> Self {
        Emm { file_index }
    }
}

impl Dataset for Emm {
    type Record = EmmRecord;

    fn origin(&self) -> &str {
        "EMM"
    }

    fn format(&self) -> RecordFormat {
        RecordFormat::JsonArray
    }

    fn extract_spans(&self, index: usize, record: EmmRecord) -> Result<SourceRecord, RecordError> {
        let id = format!(
            "EMM-instance-{}-{}-{}",
            self.file_index, index, record.data.filename
        );

        let results = record
            .completions
            .into_iter()
            .next()
            .map(|completion| completion.result)
            .unwrap_or_default();

        let mut event_type = None;
        let mut trigger = None;
        let mut entities = Vec::new();
        let mut arguments = Vec::new();

        for (idx, result) in results.into_iter().enumerate() {
            let value = result.value;

            if result.from_name == EVENT_TYPE_FIELD {
                event_type = value.choices.into_iter().next();
                continue;
            }

            let label = match value.labels.first() {
                Some(label) => label,
                None => continue,
            };

            let (start, end) = match (value.start, value.end) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    log::warn!(
                        target: self.origin(),
                        "{}: label `{}` does not have offsets",
                        id,
                        label
                    );
                    continue;
                }
            };

            let mention = SourceMention {
                start,
                end,
                text: value.text.clone(),
                key: format!("result-{}", idx),
                existing_type: String::new(),
            };

            if label.trim().eq_ignore_ascii_case(TRIGGER_LABEL) {
                if trigger.is_some() {
                    log::warn!(
                        target: self.origin(),
                        "{}: extra trigger `{}`, only the first is used",
                        id,
                        mention.text
                    );
                } else {
                    trigger = Some(mention);
                }
            } else {
                arguments.push(SourceArgument {
                    key: mention.key.clone(),
                    offsets: Some((start, end)),
                    role: label.clone(),
                });
                entities.push(mention);
            }
        }

        let event_type = event_type.ok_or(RecordError::MissingEventType)?;
        let trigger = trigger.ok_or(RecordError::MissingTrigger)?;

        Ok(SourceRecord {
            id,
            text: SourceText::Document(record.data.text),
            entities,
            events: vec![SourceEvent {
                event_type,
                trigger,
                arguments,
            }],
        })
    }

    fn argument_policy(&self) -> ArgumentPolicy {
        ArgumentPolicy::DropArgument
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Emm;
    use crate::dataset::{ArgumentPolicy, Dataset, SourceText};
    use crate::error::RecordError;

    fn task(results: serde_json::Value) -> serde_json::Value {
        json!({
            "id": 17,
            "data": {
                "filename": "article-17.txt",
                "text": "Rebels attacked\nAleppo on Monday."
            },
            "completions": [{"result": results}]
        })
    }

    #[test]
    fn spans_are_extracted() {
        let value = task(json!([
            {"from_name": "ev_type", "to_name": "text", "type": "choices",
             "value": {"choices": ["Attack"]}},
            {"from_name": "label", "to_name": "text", "type": "labels",
             "value": {"start": 7, "end": 15, "text": "attacked", "labels": ["Event Trigger"]}},
            {"from_name": "label", "to_name": "text", "type": "labels",
             "value": {"start": 0, "end": 6, "text": "Rebels", "labels": ["Attacker"]}},
            {"from_name": "label", "to_name": "text", "type": "labels",
             "value": {"start": 16, "end": 22, "text": "Aleppo", "labels": ["Place"]}}
        ]));

        let emm = Emm::new(2);
        let record = emm.parse_record(value).unwrap();
        let source = emm.extract_spans(5, record).unwrap();

        assert_eq!(source.id, "EMM-instance-2-5-article-17.txt");
        assert!(matches!(source.text, SourceText::Document(ref text) if text.contains('\n')));
        assert_eq!(source.entities.len(), 2);
        assert_eq!(source.entities[1].text, "Aleppo");

        let event = &source.events[0];
        assert_eq!(event.event_type, "Attack");
        assert_eq!(event.trigger.start, 7);
        assert_eq!(event.trigger.end, 15);
        assert_eq!(event.arguments.len(), 2);
        assert_eq!(event.arguments[0].role, "Attacker");
        assert_eq!(event.arguments[0].key, source.entities[0].key);
        assert_eq!(emm.argument_policy(), ArgumentPolicy::DropArgument);
    }

    #[test]
    fn first_trigger_is_used() {
        let value = task(json!([
            {"from_name": "ev_type", "value": {"choices": ["Attack"]}},
            {"from_name": "label", "value": {"start": 7, "end": 15, "text": "attacked", "labels": ["Event Trigger"]}},
            {"from_name": "label", "value": {"start": 26, "end": 32, "text": "Monday", "labels": ["event trigger"]}}
        ]));

        let emm = Emm::new(0);
        let record = emm.parse_record(value).unwrap();
        let source = emm.extract_spans(0, record).unwrap();

        assert_eq!(source.events.len(), 1);
        assert_eq!(source.events[0].trigger.text, "attacked");
        assert_eq!(source.events[0].trigger.start, 7);
        assert!(source.entities.is_empty());
    }

    #[test]
    fn missing_event_type_fails() {
        let value = task(json!([
            {"from_name": "label", "value": {"start": 7, "end": 15, "text": "attacked", "labels": ["Event Trigger"]}}
        ]));

        let record = Emm::new(0).parse_record(value).unwrap();
        assert!(matches!(
            Emm::new(0).extract_spans(0, record),
            Err(RecordError::MissingEventType)
        ));
    }

    #[test]
    fn missing_trigger_fails() {
        let value = task(json!([
            {"from_name": "ev_type", "value": {"choices": ["Attack"]}},
            {"from_name": "label", "value": {"start": 0, "end": 6, "text": "Rebels", "labels": ["Attacker"]}}
        ]));

        let record = Emm::new(0).parse_record(value).unwrap();
        assert!(matches!(
            Emm::new(0).extract_spans(0, record),
            Err(RecordError::MissingTrigger)
        ));
    }
}
