//! Text normalization.
//!
//! Span texts and canonical tokens are normalized with the same
//! functions, so that words from both sides can be compared directly.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MERIDIEM: Regex = Regex::new(r"(?i)(\d)([ap]m)\b").unwrap();
}

const LEFT_BRACKET: &str = "LRB";
const RIGHT_BRACKET: &str = "RRB";

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_strippable(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '–' | '—' | '…')
}

/// Replace line breaks by sentence boundaries.
///
/// A run of line breaks that does not follow a sentence-final period is
/// replaced by a synthetic `" . "` boundary. Other line breaks are replaced
/// by a space. Leading and trailing line breaks are removed.
pub fn normalize_newlines(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !is_newline(c) {
            normalized.push(c);
            continue;
        }

        while chars.peek().copied().map(is_newline).unwrap_or(false) {
            chars.next();
        }

        let before = normalized.trim_end_matches(|c| c == ' ' || c == '\t');
        if before.is_empty() || chars.peek().is_none() {
            continue;
        }

        if before.ends_with('.') {
            normalized.push(' ');
        } else {
            normalized.push_str(" . ");
        }
    }

    normalized
}

/// Strip surrounding punctuation from a whitespace-delimited word.
///
/// Interior punctuation is kept. Returns an empty string for words
/// that only consist of punctuation.
pub fn loose_word(word: &str) -> &str {
    word.trim_matches(is_strippable)
}

/// Split text into normalized sub-words.
///
/// Parentheses become the distinct words `LRB` and `RRB` (as do the
/// `-LRB-` and `-RRB-` tokens of Penn Treebank-style tokenizers), a
/// digit followed by *am*/*pm* is split, hyphens separate words and
/// surrounding punctuation is stripped.
pub fn sub_words(text: &str) -> Vec<String> {
    let text = text
        .replace('(', &format!(" {} ", LEFT_BRACKET))
        .replace(')', &format!(" {} ", RIGHT_BRACKET));
    let text = MERIDIEM.replace_all(&text, "$1 $2");

    text.split(|c: char| c.is_whitespace() || c == '-')
        .map(loose_word)
        .filter(|word| !word.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Whitespace-delimited words with their character offsets.
///
/// Words are returned as loose words (see [`loose_word`]). Words that
/// only consist of punctuation are retained as empty strings, so that
/// word indices correspond to the whitespace tokenization.
pub fn whitespace_words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut word_start = None;

    for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
        if c.is_whitespace() {
            if let Some((start_char, start_byte)) = word_start.take() {
                words.push((start_char, loose_word(&text[start_byte..byte_idx])));
            }
        } else if word_start.is_none() {
            word_start = Some((char_idx, byte_idx));
        }
    }

    if let Some((start_char, start_byte)) = word_start {
        words.push((start_char, loose_word(&text[start_byte..])));
    }

    words
}

/// Get a substring by character offsets.
///
/// Returns `None` when the offsets are out of bounds or inverted.
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }

    let mut byte_offsets = text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()));
    let start_byte = byte_offsets.nth(start)?;
    let end_byte = if end == start {
        start_byte
    } else {
        byte_offsets.nth(end - start - 1)?
    };

    Some(&text[start_byte..end_byte])
}
