use serde::{Deserialize, Serialize};

use crate::normalize::{char_slice, loose_word, sub_words, whitespace_words};
use crate::{AlignError, Span};

/// Default number of tokens by which a coarse anchor is widened.
pub const DEFAULT_ANCHOR_BUFFER: usize = 2;

/// The document in which a foreign span is defined.
#[derive(Clone, Copy, Debug)]
pub enum SourceDocument<'a> {
    /// Raw text, span offsets are character offsets.
    Text(&'a str),

    /// A source tokenization, span offsets are token offsets.
    Tokens(&'a [String]),
}

impl<'a> SourceDocument<'a> {
    /// Loose whitespace words of the document.
    fn words(&self) -> Vec<&'a str> {
        match *self {
            SourceDocument::Text(text) => whitespace_words(text)
                .into_iter()
                .map(|(_, word)| word)
                .collect(),
            SourceDocument::Tokens(tokens) => {
                tokens.iter().map(|token| loose_word(token)).collect()
            }
        }
    }

    /// Index of the word that contains the given span offset.
    fn word_index(&self, offset: usize) -> Option<usize> {
        match *self {
            SourceDocument::Text(text) => whitespace_words(text)
                .iter()
                .rposition(|&(word_start, _)| word_start <= offset),
            SourceDocument::Tokens(tokens) => Some(offset).filter(|&idx| idx < tokens.len()),
        }
    }

    /// Loose words covered by the span.
    ///
    /// Falls back to the literal span text when the offsets do not
    /// fit the document.
    fn span_words(&self, span: ForeignSpan<'a>) -> Vec<&'a str> {
        let words: Vec<&str> = match *self {
            SourceDocument::Text(text) => char_slice(text, span.start, span.end)
                .map(|slice| whitespace_words(slice).into_iter().map(|(_, w)| w).collect())
                .unwrap_or_default(),
            SourceDocument::Tokens(tokens) if span.start <= span.end && span.end <= tokens.len() => {
                tokens[span.start..span.end]
                    .iter()
                    .map(|token| loose_word(token))
                    .collect()
            }
            SourceDocument::Tokens(_) => Vec::new(),
        };

        let words: Vec<&str> = words.into_iter().filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            span.text
                .split_whitespace()
                .map(loose_word)
                .filter(|w| !w.is_empty())
                .collect()
        } else {
            words
        }
    }
}

/// A span in a foreign index space.
///
/// The interpretation of `start` and `end` depends on the
/// [`SourceDocument`]: character offsets for raw text, token offsets
/// for tokenized documents. `end` is exclusive in both cases.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ForeignSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

impl<'a> ForeignSpan<'a> {
    pub fn new(start: usize, end: usize, text: &'a str) -> Self {
        ForeignSpan { start, end, text }
    }
}

/// How the search window of an alignment was found.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorQuality {
    /// Both boundary words were located in the source document.
    Exact,

    /// At least one boundary word could not be located and the search
    /// window fell back to the document boundaries.
    Degraded,
}

/// A successful alignment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Alignment {
    pub span: Span,
    pub quality: AnchorQuality,
}

impl Alignment {
    pub fn is_degraded(&self) -> bool {
        self.quality == AnchorQuality::Degraded
    }
}

/// Canonical sub-words, each with the index of its token.
struct CanonicalWords {
    words: Vec<(String, usize)>,
}

impl CanonicalWords {
    fn new<S>(tokens: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let words = tokens
            .iter()
            .enumerate()
            .flat_map(|(idx, token)| {
                sub_words(token.as_ref())
                    .into_iter()
                    .map(move |word| (word, idx))
            })
            .collect();

        CanonicalWords { words }
    }

    /// Find the first occurrence of `word`.
    ///
    /// Only sub-words at position `min_pos` or later that belong to token
    /// `min_token` or later are considered. Returns the position of the
    /// sub-word and its token index.
    fn find(&self, word: &str, min_pos: usize, min_token: usize) -> Option<(usize, usize)> {
        self.words
            .iter()
            .enumerate()
            .skip(min_pos)
            .find(|(_, (sub_word, token_idx))| *token_idx >= min_token && sub_word == word)
            .map(|(pos, &(_, token_idx))| (pos, token_idx))
    }
}

/// Aligner of foreign spans to canonical tokens.
///
/// The aligner first locates the boundary words of a span in the
/// whitespace tokenization of the source document. These coarse anchors
/// delimit a search window in the canonical tokens, which is widened by a
/// buffer to absorb differences between the tokenizations. The span
/// boundaries are then found by exact matching of normalized sub-words
/// within the window.
///
/// Alignment is a pure function of the document, the span, and the
/// canonical tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SpanAligner {
    buffer: usize,
}

impl Default for SpanAligner {
    fn default() -> Self {
        SpanAligner::new(DEFAULT_ANCHOR_BUFFER)
    }
}

impl SpanAligner {
    /// Construct an aligner that widens anchors by `buffer` tokens.
    pub fn new(buffer: usize) -> Self {
        SpanAligner { buffer }
    }

    /// Align `span` from `document` to the `canonical` tokens.
    pub fn align<'a, S>(
        &self,
        document: SourceDocument<'a>,
        span: ForeignSpan<'a>,
        canonical: &[S],
    ) -> Result<Alignment, AlignError>
    where
        S: AsRef<str>,
    {
        let span_sub_words = sub_words(span.text);
        let (first_sub_word, last_sub_word) = match (span_sub_words.first(), span_sub_words.last())
        {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AlignError::EmptySpan {
                    text: span.text.to_owned(),
                })
            }
        };

        let doc_words = document.words();
        let span_words = document.span_words(span);

        let start_anchor = span_words
            .first()
            .and_then(|&word| locate(&doc_words, word, document.word_index(span.start)));
        let end_anchor = span_words.last().and_then(|&word| {
            locate(
                &doc_words,
                word,
                document.word_index(span.end.saturating_sub(1)),
            )
        });

        let canonical_words = CanonicalWords::new(canonical);

        let start_window = start_anchor
            .map(|anchor| anchor.saturating_sub(self.buffer))
            .unwrap_or(0);
        let (start_pos, start) = canonical_words
            .find(first_sub_word, 0, start_window)
            .ok_or_else(|| AlignError::no_match(span.text, first_sub_word.as_str(), start_window))?;

        // The last sub-word cannot precede the other sub-words of the span.
        let min_end_pos = start_pos + span_sub_words.len() - 1;
        let end_window = end_anchor
            .map(|anchor| anchor.saturating_sub(self.buffer))
            .unwrap_or(start)
            .max(start);
        let (_, last) = canonical_words
            .find(last_sub_word, min_end_pos, end_window)
            .ok_or_else(|| AlignError::no_match(span.text, last_sub_word.as_str(), end_window))?;

        let quality = if start_anchor.is_some() && end_anchor.is_some() {
            AnchorQuality::Exact
        } else {
            AnchorQuality::Degraded
        };

        Ok(Alignment {
            span: Span::new(start, last + 1),
            quality,
        })
    }
}

/// Locate `word` in the document words.
///
/// The word at index `hint` is preferred, otherwise the first occurrence
/// is used.
fn locate(doc_words: &[&str], word: &str, hint: Option<usize>) -> Option<usize> {
    hint.filter(|&idx| doc_words.get(idx) == Some(&word))
        .or_else(|| doc_words.iter().position(|&doc_word| doc_word == word))
}
