use thiserror::Error;

/// Span alignment errors.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AlignError {
    /// The span text does not contain a single alignable word.
    #[error("Span `{text}` does not contain any alignable word")]
    EmptySpan { text: String },

    /// A boundary word of the span does not occur in the search window.
    #[error("Cannot find `{word}` of span `{text}` at or after token {window_start}")]
    NoMatch {
        text: String,
        word: String,
        window_start: usize,
    },
}

impl AlignError {
    pub(crate) fn no_match(
        text: impl Into<String>,
        word: impl Into<String>,
        window_start: usize,
    ) -> Self {
        AlignError::NoMatch {
            text: text.into(),
            word: word.into(),
            window_start,
        }
    }
}
