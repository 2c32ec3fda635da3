//! Normalized instances.
//!
//! The serde attributes of these types define the output schema. The
//! extractor, the batch writers, and the validator all go through these
//! types, so the set of keys is not repeated anywhere else.

use evnorm_align::Span;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A normalized dataset instance.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Instance {
    /// Name of the source dataset.
    pub origin: String,

    pub id: String,

    pub no_of_sentences: usize,

    pub sentences: Vec<Sentence>,

    /// The text that was annotated.
    pub text: String,

    pub words: Vec<String>,

    pub lemma: Vec<String>,

    pub pos_tags: Vec<String>,

    pub ner: Vec<String>,

    pub golden_entity_mentions: Vec<EntityMention>,

    pub golden_event_mentions: Vec<EventMention>,

    /// Bracketed constituency tree per sentence.
    pub penn_treebank: Vec<String>,

    /// Dependency relations per sentence, token indices are relative to
    /// the sentence and 1-based, head 0 is the root.
    pub dependency_parsing: Vec<Vec<Dependency>>,

    /// BIO chunk labels per sentence.
    pub chunks: Vec<Vec<String>>,
}

impl Instance {
    pub fn n_tokens(&self) -> usize {
        self.words.len()
    }
}

/// A sentence of an instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Sentence {
    #[serde(flatten)]
    pub span: Span,

    pub text: String,
}

/// An entity mention.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntityMention {
    pub entity_id: String,

    #[serde(flatten)]
    pub span: Span,

    pub text: String,

    /// Majority type of the named entity labels of the span.
    pub entity_type: String,

    /// Entity type from the source dataset, empty when the dataset does not
    /// have entity types.
    pub existing_entity_type: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub degraded_alignment: bool,
}

/// An event trigger.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Trigger {
    #[serde(flatten)]
    pub span: Span,

    pub text: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub degraded_alignment: bool,
}

/// An event argument.
///
/// Arguments are always derived from an entity mention of the same
/// instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Argument {
    #[serde(flatten)]
    pub span: Span,

    pub text: String,

    pub role: String,

    pub entity_type: String,

    pub existing_entity_type: String,
}

impl Argument {
    /// Construct an argument for an entity mention.
    pub fn from_entity(entity: &EntityMention, role: impl Into<String>) -> Self {
        Argument {
            span: entity.span,
            text: entity.text.clone(),
            role: role.into(),
            entity_type: entity.entity_type.clone(),
            existing_entity_type: entity.existing_entity_type.clone(),
        }
    }
}

/// An event mention.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventMention {
    pub event_type: String,

    pub trigger: Trigger,

    pub arguments: Vec<Argument>,
}

/// A dependency relation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Dependency {
    pub relation: String,
    pub head: usize,
    pub dependent: usize,
}

#[cfg(test)]
pub(crate) mod tests {
    use evnorm_align::Span;
    use serde_json::json;

    use super::{Argument, EntityMention, EventMention, Instance, Sentence, Trigger};

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    /// A small well-formed instance.
    pub fn instance(id: &str) -> Instance {
        let entities = vec![
            EntityMention {
                entity_id: format!("{}-entity-0", id),
                span: Span::new(0, 1),
                text: "Police".to_string(),
                entity_type: "O".to_string(),
                existing_entity_type: "PER".to_string(),
                degraded_alignment: false,
            },
            EntityMention {
                entity_id: format!("{}-entity-1", id),
                span: Span::new(2, 4),
                text: "John Smith".to_string(),
                entity_type: "PERSON".to_string(),
                existing_entity_type: "PER".to_string(),
                degraded_alignment: false,
            },
        ];

        let event = EventMention {
            event_type: "arrest".to_string(),
            trigger: Trigger {
                span: Span::new(1, 2),
                text: "arrested".to_string(),
                degraded_alignment: false,
            },
            arguments: vec![
                Argument::from_entity(&entities[0], "agent"),
                Argument::from_entity(&entities[1], "person"),
            ],
        };

        Instance {
            origin: "M2E2".to_string(),
            id: id.to_string(),
            no_of_sentences: 1,
            sentences: vec![Sentence {
                span: Span::new(0, 5),
                text: "Police arrested John Smith .".to_string(),
            }],
            text: "Police arrested John Smith.".to_string(),
            words: strings(&["Police", "arrested", "John", "Smith", "."]),
            lemma: strings(&["police", "arrest", "John", "Smith", "."]),
            pos_tags: strings(&["NNS", "VBD", "NNP", "NNP", "."]),
            ner: strings(&["O", "O", "PERSON", "PERSON", "O"]),
            golden_entity_mentions: entities,
            golden_event_mentions: vec![event],
            penn_treebank: vec![
                "(ROOT (S (NP (NNS Police)) (VP (VBD arrested) (NP (NNP John) (NNP Smith))) (. .)))"
                    .to_string(),
            ],
            dependency_parsing: vec![Vec::new()],
            chunks: vec![strings(&["B-NP", "B-VP", "B-NP", "I-NP", "O"])],
        }
    }

    #[test]
    fn instance_keys() {
        let value = serde_json::to_value(instance("M2E2-instance-0-s1")).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "chunks",
                "dependency-parsing",
                "golden-entity-mentions",
                "golden-event-mentions",
                "id",
                "lemma",
                "ner",
                "no-of-sentences",
                "origin",
                "penn-treebank",
                "pos-tags",
                "sentences",
                "text",
                "words"
            ]
        );
        assert_eq!(value["golden-event-mentions"][0]["event-type"], "arrest");
    }

    fn entity(degraded_alignment: bool) -> EntityMention {
        EntityMention {
            entity_id: "M2E2-instance-0-s1-entity-0".to_string(),
            span: Span::new(2, 4),
            text: "John Smith".to_string(),
            entity_type: "PERSON".to_string(),
            existing_entity_type: "PER".to_string(),
            degraded_alignment,
        }
    }

    #[test]
    fn entity_keys() {
        assert_eq!(
            serde_json::to_value(entity(false)).unwrap(),
            json!({
                "entity-id": "M2E2-instance-0-s1-entity-0",
                "start": 2,
                "end": 4,
                "text": "John Smith",
                "entity-type": "PERSON",
                "existing-entity-type": "PER",
            })
        );
    }

    #[test]
    fn degraded_alignments_are_flagged() {
        let value = serde_json::to_value(entity(true)).unwrap();
        assert_eq!(value["degraded-alignment"], json!(true));

        let trigger = Trigger {
            span: Span::new(1, 2),
            text: "arrested".to_string(),
            degraded_alignment: false,
        };
        assert_eq!(
            serde_json::to_value(&trigger).unwrap(),
            json!({"start": 1, "end": 2, "text": "arrested"})
        );
    }

    #[test]
    fn argument_copies_entity() {
        let argument = Argument::from_entity(&entity(false), "agent");
        assert_eq!(argument.span, Span::new(2, 4));
        assert_eq!(argument.text, "John Smith");
        assert_eq!(argument.entity_type, "PERSON");
        assert_eq!(argument.existing_entity_type, "PER");
        assert_eq!(argument.role, "agent");
    }

    #[test]
    fn sentence_is_flat() {
        let sentence: Sentence =
            serde_json::from_value(json!({"start": 0, "end": 3, "text": "Troops arrived ."}))
                .unwrap();
        assert_eq!(sentence.span, Span::new(0, 3));
        assert_eq!(sentence.text, "Troops arrived .");
    }
}
