//! Extraction of normalized instances from source records.

use std::fmt;

use evnorm_align::normalize::normalize_newlines;
use evnorm_align::{majority_type, Alignment, ForeignSpan, SourceDocument, Span, SpanAligner};

use crate::annotate::{Annotate, Annotation};
use crate::dataset::{
    ArgumentPolicy, Dataset, RawRecord, SourceArgument, SourceMention, SourceRecord, SourceText,
};
use crate::error::{EvnormError, RecordError};
use crate::instance::{Argument, EntityMention, EventMention, Instance, Trigger};
use crate::labels::LabelMapper;
use crate::writer::{BatchWriter, WriteBatch};

/// Counters of an extraction run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExtractStats {
    /// Records that were read.
    pub records: usize,

    /// Instances that were extracted.
    pub instances: usize,

    /// Records that were skipped.
    pub skipped: usize,

    /// Entities that could not be aligned.
    pub dropped_entities: usize,

    /// Arguments that did not refer to an aligned entity.
    pub dropped_arguments: usize,

    /// Alignments with a degraded search window.
    pub degraded: usize,

    /// Arguments with more than one candidate entity.
    pub ambiguous_links: usize,
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "records: {}, instances: {}, skipped: {}, dropped entities: {}, dropped arguments: {}, degraded alignments: {}, ambiguous links: {}",
            self.records,
            self.instances,
            self.skipped,
            self.dropped_entities,
            self.dropped_arguments,
            self.degraded,
            self.ambiguous_links
        )
    }
}

/// An aligned entity with the source mention it was aligned from.
struct AlignedEntity<'s> {
    source: &'s SourceMention,
    entity: EntityMention,
}

/// Entity that an argument refers to.
#[derive(Debug, Eq, PartialEq)]
enum Linkage<'e> {
    Unique(&'e EntityMention),

    /// Several distinct candidates, the first is used.
    Ambiguous(&'e EntityMention),

    Missing,
}

/// Find the entity that an argument refers to.
///
/// Entities are matched by key. When the argument has offsets, an
/// entity with the same key and source offsets is preferred.
fn link<'e>(entities: &'e [AlignedEntity], argument: &SourceArgument) -> Linkage<'e> {
    let candidates: Vec<&EntityMention> = entities
        .iter()
        .filter(|aligned| aligned.source.key == argument.key)
        .map(|aligned| &aligned.entity)
        .collect();

    if let Some(offsets) = argument.offsets {
        let exact = entities.iter().find(|aligned| {
            aligned.source.key == argument.key
                && (aligned.source.start, aligned.source.end) == offsets
        });
        if let Some(aligned) = exact {
            return Linkage::Unique(&aligned.entity);
        }
    }

    match candidates.split_first() {
        None => Linkage::Missing,
        Some((&first, rest)) => {
            if rest.iter().all(|entity| entity.span == first.span) {
                Linkage::Unique(first)
            } else {
                Linkage::Ambiguous(first)
            }
        }
    }
}

/// Text of an aligned mention.
///
/// Mentions given by character offsets keep their source literal, with
/// whitespace collapsed, so that it can be validated against the aligned
/// tokens. Otherwise the aligned tokens are joined.
fn mention_text(
    text: &SourceText,
    mention: &SourceMention,
    span: Span,
    tokens: &[String],
) -> String {
    match text {
        SourceText::Document(_) => mention
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
        SourceText::Sentences(_) | SourceText::Tokenized { .. } => {
            span.text(tokens).unwrap_or_default()
        }
    }
}

/// Extractor of normalized instances.
///
/// The extractor annotates the text of a source record, aligns its
/// mentions to the annotation, and assembles an instance. Failures are
/// scoped to a record: a record that cannot be converted is logged and
/// skipped.
pub struct Extractor<'a, A>
where
    A: ?Sized,
{
    annotator: &'a A,
    aligner: SpanAligner,
    labels: &'a LabelMapper,
    stats: ExtractStats,
}

impl<'a, A> Extractor<'a, A>
where
    A: Annotate + ?Sized,
{
    pub fn new(annotator: &'a A, labels: &'a LabelMapper) -> Self {
        Extractor {
            annotator,
            aligner: SpanAligner::default(),
            labels,
            stats: ExtractStats::default(),
        }
    }

    /// Use the given span aligner.
    pub fn with_aligner(mut self, aligner: SpanAligner) -> Self {
        self.aligner = aligner;
        self
    }

    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Convert records and write the instances.
    ///
    /// Errors while reading records or writing instances are returned,
    /// errors in a record only cause the record to be skipped.
    pub fn convert<D, I, W>(
        &mut self,
        dataset: &D,
        records: I,
        writer: &mut BatchWriter<W>,
    ) -> Result<(), EvnormError>
    where
        D: Dataset,
        I: IntoIterator<Item = Result<RawRecord, EvnormError>>,
        W: WriteBatch,
    {
        for record in records {
            if let Some(instance) = self.convert_record(dataset, record?) {
                writer.push(instance)?;
            }
        }

        Ok(())
    }

    /// Convert a single record.
    ///
    /// Returns `None` when the record is skipped.
    pub fn convert_record<D>(&mut self, dataset: &D, record: RawRecord) -> Option<Instance>
    where
        D: Dataset,
    {
        self.stats.records += 1;

        let RawRecord { index, value } = record;
        let source = value
            .map_err(RecordError::from)
            .and_then(|value| dataset.parse_record(value))
            .and_then(|record| dataset.extract_spans(index, record));

        let source = match source {
            Ok(source) => source,
            Err(err) => {
                log::warn!(
                    target: dataset.origin(),
                    "record {}: {}, skipping",
                    index,
                    err
                );
                self.stats.skipped += 1;
                return None;
            }
        };

        match self.extract(dataset, &source) {
            Ok(instance) => {
                self.stats.instances += 1;
                Some(instance)
            }
            Err(err) => {
                log::warn!(target: dataset.origin(), "{}: {}, skipping", source.id, err);
                self.stats.skipped += 1;
                None
            }
        }
    }

    fn annotate(&self, text: &SourceText) -> Result<(String, Annotation), RecordError> {
        Ok(match text {
            SourceText::Sentences(sentences) => {
                let annotation = self.annotator.annotate_sentences(sentences)?;
                (annotation.text(), annotation)
            }
            SourceText::Tokenized { text, .. } | SourceText::Document(text) => {
                let text = normalize_newlines(text);
                let annotation = self.annotator.annotate(&text)?;
                (text, annotation)
            }
        })
    }

    fn align(
        &mut self,
        document: SourceDocument,
        mention: &SourceMention,
        tokens: &[String],
    ) -> Result<Alignment, evnorm_align::AlignError> {
        let alignment = self.aligner.align(
            document,
            ForeignSpan::new(mention.start, mention.end, &mention.text),
            tokens,
        )?;

        if alignment.is_degraded() {
            self.stats.degraded += 1;
        }

        Ok(alignment)
    }

    /// Extract an instance from a source record.
    pub fn extract<D>(&mut self, dataset: &D, source: &SourceRecord) -> Result<Instance, RecordError>
    where
        D: Dataset,
    {
        let origin = dataset.origin();
        let (text, annotation) = self.annotate(&source.text)?;
        let tokens = &annotation.tokens;

        let concatenated;
        let document = match source.text {
            SourceText::Sentences(ref sentences) => {
                concatenated = sentences.concat();
                SourceDocument::Tokens(&concatenated)
            }
            SourceText::Tokenized { ref tokens, .. } => SourceDocument::Tokens(tokens),
            SourceText::Document(ref text) => SourceDocument::Text(text),
        };

        let mut entities = Vec::with_capacity(source.entities.len());
        for (idx, mention) in source.entities.iter().enumerate() {
            let alignment = match self.align(document, mention, tokens) {
                Ok(alignment) => alignment,
                Err(err) => {
                    log::warn!(target: origin, "{}: dropping entity: {}", source.id, err);
                    self.stats.dropped_entities += 1;
                    continue;
                }
            };

            let span = alignment.span;
            entities.push(AlignedEntity {
                source: mention,
                entity: EntityMention {
                    entity_id: format!("{}-entity-{}", source.id, idx),
                    span,
                    text: mention_text(&source.text, mention, span, tokens),
                    entity_type: majority_type(&annotation.ner[span.range()]).to_owned(),
                    existing_entity_type: mention.existing_type.clone(),
                    degraded_alignment: alignment.is_degraded(),
                },
            });
        }

        let mut events = Vec::with_capacity(source.events.len());
        for event in &source.events {
            let alignment = self
                .align(document, &event.trigger, tokens)
                .map_err(RecordError::AlignmentFailure)?;
            let trigger = Trigger {
                span: alignment.span,
                text: mention_text(&source.text, &event.trigger, alignment.span, tokens),
                degraded_alignment: alignment.is_degraded(),
            };

            let mut arguments = Vec::with_capacity(event.arguments.len());
            for argument in &event.arguments {
                let entity = match link(&entities, argument) {
                    Linkage::Unique(entity) => entity,
                    Linkage::Ambiguous(entity) => {
                        log::warn!(
                            target: origin,
                            "{}: argument `{}` matches several entities, using the first",
                            source.id,
                            argument.key
                        );
                        self.stats.ambiguous_links += 1;
                        entity
                    }
                    Linkage::Missing => match dataset.argument_policy() {
                        ArgumentPolicy::SkipInstance => {
                            return Err(RecordError::MissingLinkage {
                                key: argument.key.clone(),
                            })
                        }
                        ArgumentPolicy::DropArgument => {
                            log::warn!(
                                target: origin,
                                "{}: dropping argument `{}` without entity",
                                source.id,
                                argument.key
                            );
                            self.stats.dropped_arguments += 1;
                            continue;
                        }
                    },
                };

                arguments.push(Argument::from_entity(
                    entity,
                    self.labels.role(&argument.role),
                ));
            }

            events.push(EventMention {
                event_type: self.labels.event_type(&event.event_type),
                trigger,
                arguments,
            });
        }

        Ok(Instance {
            origin: origin.to_owned(),
            id: source.id.clone(),
            no_of_sentences: annotation.sentences.len(),
            sentences: annotation.sentences,
            text,
            words: annotation.tokens,
            lemma: annotation.lemmas,
            pos_tags: annotation.pos,
            ner: annotation.ner,
            golden_entity_mentions: entities.into_iter().map(|aligned| aligned.entity).collect(),
            golden_event_mentions: events,
            penn_treebank: annotation.constituency,
            dependency_parsing: annotation.dependencies,
            chunks: annotation.chunks,
        })
    }
}
