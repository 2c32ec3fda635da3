//! Structural validation of normalized instances.

use std::fmt;

use evnorm_align::Span;
use seqalign::measures::Levenshtein;
use seqalign::Align;
use thiserror::Error;

use crate::instance::Instance;

/// Minimum similarity of a mention text and the text of its tokens.
pub const MIN_SIMILARITY: f64 = 0.9;

/// Kinds of spans in an instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanKind {
    Sentence,
    Entity,
    Trigger,
    Argument,
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SpanKind::Sentence => "sentence",
            SpanKind::Entity => "entity",
            SpanKind::Trigger => "trigger",
            SpanKind::Argument => "argument",
        };

        f.write_str(name)
    }
}

/// Structural problems of an instance.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StructuralViolation {
    #[error("`{field}` has {len} elements, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("chunk labels cover {n_chunks} tokens, expected {n_tokens}")]
    ChunkCoverage { n_chunks: usize, n_tokens: usize },

    #[error("{kind} [{start}, {end}) does not fit the {n_tokens} tokens")]
    OutOfBounds {
        kind: SpanKind,
        start: usize,
        end: usize,
        n_tokens: usize,
    },

    #[error("{kind} text `{text}` does not match its tokens `{tokens}` (similarity {similarity:.2})")]
    TextMismatch {
        kind: SpanKind,
        text: String,
        tokens: String,
        similarity: f64,
    },
}

/// Normalized Levenshtein similarity of two strings.
///
/// The similarity is 1 minus the edit distance divided by the length
/// of the longest string, the similarity of two empty strings is 1.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }

    let distance = Levenshtein::new(1, 1, 1).align(&a, &b).distance();
    1.0 - distance as f64 / max_len as f64
}

/// Validator of instances.
///
/// In detailed mode, the lengths of the token-level and sentence-level
/// fields and the entity mentions are checked as well.
#[derive(Clone, Copy, Debug)]
pub struct Validator {
    detailed: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new(true)
    }
}

impl Validator {
    pub fn new(detailed: bool) -> Self {
        Validator { detailed }
    }

    /// Validate an instance, returning all violations.
    pub fn validate(&self, instance: &Instance) -> Vec<StructuralViolation> {
        let mut violations = Vec::new();
        let n_tokens = instance.n_tokens();

        if self.detailed {
            for (field, len) in &[
                ("lemma", instance.lemma.len()),
                ("pos-tags", instance.pos_tags.len()),
                ("ner", instance.ner.len()),
            ] {
                check_len(&mut violations, field, *len, n_tokens);
            }

            for (field, len) in &[
                ("sentences", instance.sentences.len()),
                ("penn-treebank", instance.penn_treebank.len()),
                ("dependency-parsing", instance.dependency_parsing.len()),
                ("chunks", instance.chunks.len()),
            ] {
                check_len(&mut violations, field, *len, instance.no_of_sentences);
            }
        }

        let n_chunks = instance.chunks.iter().map(Vec::len).sum();
        if n_chunks != n_tokens {
            violations.push(StructuralViolation::ChunkCoverage { n_chunks, n_tokens });
        }

        for sentence in &instance.sentences {
            check_span(
                &mut violations,
                &instance.words,
                SpanKind::Sentence,
                sentence.span,
                &sentence.text,
            );
        }

        if self.detailed {
            for entity in &instance.golden_entity_mentions {
                check_span(
                    &mut violations,
                    &instance.words,
                    SpanKind::Entity,
                    entity.span,
                    &entity.text,
                );
            }
        }

        for event in &instance.golden_event_mentions {
            check_span(
                &mut violations,
                &instance.words,
                SpanKind::Trigger,
                event.trigger.span,
                &event.trigger.text,
            );

            for argument in &event.arguments {
                check_span(
                    &mut violations,
                    &instance.words,
                    SpanKind::Argument,
                    argument.span,
                    &argument.text,
                );
            }
        }

        violations
    }
}

fn check_len(
    violations: &mut Vec<StructuralViolation>,
    field: &'static str,
    len: usize,
    expected: usize,
) {
    if len != expected {
        violations.push(StructuralViolation::LengthMismatch {
            field,
            len,
            expected,
        });
    }
}

fn check_span(
    violations: &mut Vec<StructuralViolation>,
    words: &[String],
    kind: SpanKind,
    span: Span,
    text: &str,
) {
    let tokens = match span.text(words) {
        Some(tokens) => tokens,
        None => {
            violations.push(StructuralViolation::OutOfBounds {
                kind,
                start: span.start,
                end: span.end,
                n_tokens: words.len(),
            });
            return;
        }
    };

    let similarity = similarity(text, &tokens);
    if similarity < MIN_SIMILARITY {
        violations.push(StructuralViolation::TextMismatch {
            kind,
            text: text.to_owned(),
            tokens,
            similarity,
        });
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use evnorm_align::Span;

    use super::{similarity, SpanKind, StructuralViolation, Validator};
    use crate::instance::tests::instance;

    #[test]
    fn similarity_is_normalized() {
        assert_abs_diff_eq!(similarity("John Smith", "John Smith"), 1.0);
        assert_abs_diff_eq!(similarity("", ""), 1.0);
        assert_abs_diff_eq!(similarity("abcd", ""), 0.0);
        assert_abs_diff_eq!(similarity("Paris.", "Paris"), 1.0 - 1.0 / 6.0);
    }

    #[test]
    fn well_formed_instance_is_valid() {
        assert!(Validator::default().validate(&instance("i")).is_empty());
        assert!(Validator::new(false).validate(&instance("i")).is_empty());
    }

    #[test]
    fn parallel_lengths_are_checked_in_detailed_mode() {
        let mut instance = instance("i");
        instance.lemma.pop();
        instance.no_of_sentences = 2;

        let violations = Validator::new(true).validate(&instance);
        assert!(violations.contains(&StructuralViolation::LengthMismatch {
            field: "lemma",
            len: 4,
            expected: 5
        }));
        assert!(violations.contains(&StructuralViolation::LengthMismatch {
            field: "chunks",
            len: 1,
            expected: 2
        }));

        assert!(Validator::new(false).validate(&instance).is_empty());
    }

    #[test]
    fn chunk_coverage_is_checked() {
        let mut instance = instance("i");
        instance.chunks[0].pop();

        assert_eq!(
            Validator::new(false).validate(&instance),
            vec![StructuralViolation::ChunkCoverage {
                n_chunks: 4,
                n_tokens: 5
            }]
        );
    }

    #[test]
    fn spans_are_checked() {
        let mut instance = instance("i");
        instance.golden_event_mentions[0].trigger.span = Span::new(4, 6);
        instance.golden_event_mentions[0].arguments[1].text = "Jane Doe".to_string();

        let violations = Validator::new(false).validate(&instance);
        assert_eq!(violations.len(), 2);
        assert_eq!(
            violations[0],
            StructuralViolation::OutOfBounds {
                kind: SpanKind::Trigger,
                start: 4,
                end: 6,
                n_tokens: 5
            }
        );
        assert!(matches!(
            violations[1],
            StructuralViolation::TextMismatch {
                kind: SpanKind::Argument,
                ..
            }
        ));
    }

    #[test]
    fn entities_are_checked_in_detailed_mode() {
        let mut instance = instance("i");
        instance.golden_entity_mentions[1].span = Span::new(1, 2);

        assert!(Validator::new(false).validate(&instance).is_empty());
        assert!(matches!(
            Validator::new(true).validate(&instance).as_slice(),
            [StructuralViolation::TextMismatch {
                kind: SpanKind::Entity,
                ..
            }]
        ));
    }
}
