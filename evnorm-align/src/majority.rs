use itertools::Itertools;

/// Tag used when a span does not cover any tagged token.
pub const NO_TYPE: &str = "O";

/// Get the most frequent tag.
///
/// Ties are broken in favor of the tag that occurs first in `tags`.
/// Returns [`NO_TYPE`] if `tags` is empty.
pub fn majority_type<S>(tags: &[S]) -> &str
where
    S: AsRef<str>,
{
    let tags: Vec<&str> = tags.iter().map(|tag| tag.as_ref()).collect();
    let counts = tags.iter().copied().counts();
    let max_count = match counts.values().max() {
        Some(&max_count) => max_count,
        None => return NO_TYPE,
    };

    tags.iter()
        .copied()
        .find(|tag| counts[tag] == max_count)
        .unwrap_or(NO_TYPE)
}
