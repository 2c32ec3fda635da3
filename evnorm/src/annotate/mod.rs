//! Linguistic annotation of source texts.

use evnorm_align::Span;
use thiserror::Error;

use crate::instance::{Dependency, Sentence};

mod chunk;
pub use chunk::chunk_labels;

mod corenlp;
pub use corenlp::CoreNlpClient;

/// Annotation errors.
///
/// Annotation errors are scoped to the text (and thus record) that
/// was annotated.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Cannot annotate an empty text")]
    EmptyText,

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("Annotation service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Inconsistent annotation: {0}")]
    Inconsistent(String),

    #[error("Cannot read constituency tree: {0}")]
    Tree(String),
}

/// Linguistic annotation of a document.
///
/// Token-level annotations are parallel to `tokens`. Sentence-level
/// annotations are parallel to `sentences`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
    pub pos: Vec<String>,
    pub ner: Vec<String>,
    pub sentences: Vec<Sentence>,
    pub constituency: Vec<String>,
    pub dependencies: Vec<Vec<Dependency>>,
    pub chunks: Vec<Vec<String>>,
}

impl Annotation {
    /// Append an annotated sentence.
    ///
    /// The span of the sentence starts after the last token of the
    /// preceding sentence.
    pub fn push_sentence(&mut self, sentence: AnnotatedSentence) -> Result<(), AnnotateError> {
        let n_tokens = sentence.tokens.len();
        if sentence.lemmas.len() != n_tokens
            || sentence.pos.len() != n_tokens
            || sentence.ner.len() != n_tokens
        {
            return Err(AnnotateError::Inconsistent(format!(
                "sentence with {} tokens has {} lemmas, {} part-of-speech tags, and {} named entity labels",
                n_tokens,
                sentence.lemmas.len(),
                sentence.pos.len(),
                sentence.ner.len()
            )));
        }

        if sentence.chunks.len() != n_tokens {
            return Err(AnnotateError::Inconsistent(format!(
                "sentence with {} tokens has {} chunk labels",
                n_tokens,
                sentence.chunks.len()
            )));
        }

        let start = self.tokens.len();
        self.sentences.push(Sentence {
            span: Span::new(start, start + n_tokens),
            text: sentence.tokens.join(" "),
        });

        self.tokens.extend(sentence.tokens);
        self.lemmas.extend(sentence.lemmas);
        self.pos.extend(sentence.pos);
        self.ner.extend(sentence.ner);
        self.constituency.push(sentence.constituency);
        self.dependencies.push(sentence.dependencies);
        self.chunks.push(sentence.chunks);

        Ok(())
    }

    /// The annotated text, reconstructed from the sentences.
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|sentence| sentence.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Annotation of a single sentence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotatedSentence {
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
    pub pos: Vec<String>,
    pub ner: Vec<String>,
    pub constituency: String,
    pub dependencies: Vec<Dependency>,
    pub chunks: Vec<String>,
}

/// Linguistic annotation service.
pub trait Annotate {
    /// Tokenize, sentence-split, and annotate raw text.
    fn annotate(&self, text: &str) -> Result<Annotation, AnnotateError>;

    /// Annotate pre-tokenized sentences.
    ///
    /// The tokenization and sentence split of `sentences` are retained.
    fn annotate_sentences(&self, sentences: &[Vec<String>]) -> Result<Annotation, AnnotateError>;
}
