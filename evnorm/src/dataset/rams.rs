use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::dataset::{
    token_text, Dataset, RecordFormat, SourceArgument, SourceEvent, SourceMention, SourceRecord,
    SourceText,
};
use crate::error::RecordError;

/// A RAMS record.
///
/// Spans are token offsets into the concatenated sentences with
/// inclusive ends.
#[derive(Clone, Debug, Deserialize)]
pub struct RamsRecord {
    pub doc_key: String,

    pub sentences: Vec<Vec<String>>,

    pub ent_spans: Vec<(usize, usize, IgnoredAny)>,

    /// Trigger spans with their event types and probabilities.
    pub evt_triggers: Vec<(usize, usize, Vec<(String, f64)>)>,

    /// Trigger span, argument span, and role.
    pub gold_evt_links: Vec<((usize, usize), (usize, usize), String)>,
}

/// The Roles Across Multiple Sentences dataset.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rams;

/// Strip the event and argument number prefix of a RAMS role.
///
/// For example, `evt089arg01victim` becomes `victim`.
fn strip_role_prefix(role: &str) -> &str {
    match role.rfind(|c: char| c.is_ascii_digit()) {
        Some(idx) => &role[idx + 1..],
        None => role,
    }
}

impl Dataset for Rams {
    type Record = RamsRecord;

    fn origin(&self) -> &str {
        "RAMS"
    }

    fn format(&self) -> RecordFormat {
        RecordFormat::JsonLines
    }

    fn extract_spans(&self, index: usize, record: RamsRecord) -> Result<SourceRecord, RecordError> {
        let id = format!("RAMS-instance-{}-{}", index, record.doc_key);
        let tokens = record.sentences.concat();

        let mention = |start: usize, end_inclusive: usize| {
            let text = token_text(&tokens, start, end_inclusive + 1)?;
            Ok::<_, RecordError>(SourceMention {
                start,
                end: end_inclusive + 1,
                key: text.clone(),
                text,
                existing_type: String::new(),
            })
        };

        let entities = record
            .ent_spans
            .iter()
            .map(|&(start, end, _)| mention(start, end))
            .collect::<Result<Vec<_>, _>>()?;

        let (trigger_start, trigger_end, types) =
            record.evt_triggers.first().ok_or(RecordError::MissingTrigger)?;
        if record.evt_triggers.len() > 1 {
            log::warn!(
                target: self.origin(),
                "{}: {} triggers, only the first is used",
                id,
                record.evt_triggers.len()
            );
        }

        let event_type = types
            .first()
            .map(|(event_type, _)| event_type.clone())
            .ok_or(RecordError::MissingEventType)?;

        let arguments = record
            .gold_evt_links
            .iter()
            .map(|&(_, (start, end), ref role)| {
                let end = end + 1;
                Ok::<_, RecordError>(SourceArgument {
                    key: token_text(&tokens, start, end)?,
                    offsets: Some((start, end)),
                    role: strip_role_prefix(role).to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let trigger = mention(*trigger_start, *trigger_end)?;

        Ok(SourceRecord {
            id,
            text: SourceText::Sentences(record.sentences),
            entities,
            events: vec![SourceEvent {
                event_type,
                trigger,
                arguments,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{strip_role_prefix, Rams};
    use crate::dataset::{Dataset, SourceArgument, SourceText};
    use crate::error::RecordError;

    #[test]
    fn role_prefix_is_stripped() {
        assert_eq!(strip_role_prefix("evt089arg01victim"), "victim");
        assert_eq!(strip_role_prefix("evt089arg02place"), "place");
        assert_eq!(strip_role_prefix("victim"), "victim");
    }

    #[test]
    fn spans_are_extracted() {
        let value = json!({
            "doc_key": "nw_RC00c8620",
            "sentences": [["Rebels", "attacked", "Aleppo", "."], ["Two", "civilians", "died", "."]],
            "ent_spans": [[0, 0, [["evt001arg01attacker", 1.0]]], [2, 2, []], [4, 5, []]],
            "evt_triggers": [[1, 1, [["conflict.attack.n/a", 1.0]]]],
            "gold_evt_links": [[[1, 1], [0, 0], "evt001arg01attacker"], [[1, 1], [4, 5], "evt001arg03target"]]
        });

        let rams = Rams;
        let record = rams.parse_record(value).unwrap();
        let source = rams.extract_spans(3, record).unwrap();

        assert_eq!(source.id, "RAMS-instance-3-nw_RC00c8620");
        assert!(matches!(source.text, SourceText::Sentences(ref s) if s.len() == 2));
        assert_eq!(source.entities.len(), 3);
        assert_eq!(source.entities[2].start, 4);
        assert_eq!(source.entities[2].end, 6);
        assert_eq!(source.entities[2].key, "Two civilians");

        let event = &source.events[0];
        assert_eq!(event.event_type, "conflict.attack.n/a");
        assert_eq!(event.trigger.text, "attacked");
        assert_eq!(
            event.arguments[1],
            SourceArgument {
                key: "Two civilians".to_string(),
                offsets: Some((4, 6)),
                role: "target".to_string()
            }
        );
    }

    #[test]
    fn record_without_trigger_fails() {
        let value = json!({
            "doc_key": "nw_RC00c8620",
            "sentences": [["Rebels", "attacked", "."]],
            "ent_spans": [],
            "evt_triggers": [],
            "gold_evt_links": []
        });

        let record = Rams.parse_record(value).unwrap();
        assert!(matches!(
            Rams.extract_spans(0, record),
            Err(RecordError::MissingTrigger)
        ));
    }

    #[test]
    fn out_of_bounds_spans_fail() {
        let value = json!({
            "doc_key": "nw_RC00c8620",
            "sentences": [["Rebels", "attacked", "."]],
            "ent_spans": [[2, 3, []]],
            "evt_triggers": [[1, 1, [["conflict.attack.n/a", 1.0]]]],
            "gold_evt_links": []
        });

        let record = Rams.parse_record(value).unwrap();
        assert!(matches!(
            Rams.extract_spans(0, record),
            Err(RecordError::InvalidSpan { .. })
        ));
    }
}
