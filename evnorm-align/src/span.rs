use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open token span `[start, end)`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Construct a span.
    ///
    /// Panics when `start` is larger than `end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) is after its end ({})",
            start,
            end
        );

        Span { start, end }
    }

    /// Check whether the span is a valid span over `n_tokens` tokens.
    pub fn fits(&self, n_tokens: usize) -> bool {
        self.start <= self.end && self.end <= n_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Get the text of the span by joining its tokens with spaces.
    ///
    /// Returns `None` if the span does not fit `tokens`.
    pub fn text<S>(&self, tokens: &[S]) -> Option<String>
    where
        S: AsRef<str>,
    {
        if !self.fits(tokens.len()) {
            return None;
        }

        let words: Vec<&str> = tokens[self.range()].iter().map(|t| t.as_ref()).collect();
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn span_text_joins_tokens() {
        let tokens = ["Troops", "entered", "the", "city", "."];
        assert_eq!(
            Span::new(2, 4).text(&tokens),
            Some("the city".to_string())
        );
        assert_eq!(Span::new(3, 3).text(&tokens), Some(String::new()));
        assert_eq!(Span::new(4, 6).text(&tokens), None);
    }

    #[test]
    fn fits_rejects_inverted_spans() {
        let span = Span { start: 3, end: 2 };
        assert!(!span.fits(5));
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    #[should_panic]
    fn new_rejects_inverted_spans() {
        Span::new(2, 1);
    }
}
