use crate::annotate::AnnotateError;

/// Phrase labels that do not form chunks.
static CLAUSE_LABELS: &[&str] = &["ROOT", "S", "SBAR", "SBARQ", "SINV", "SQ", "FRAG"];

const OUTSIDE: &str = "O";

/// Derive BIO chunk labels from a bracketed constituency tree.
///
/// The chunk of a token is the phrase that immediately dominates its
/// preterminal. Tokens that are directly dominated by a clause-level
/// node are outside any chunk.
pub fn chunk_labels(tree: &str) -> Result<Vec<String>, AnnotateError> {
    // Open nodes: phrase label and node identifier.
    let mut open: Vec<(&str, usize)> = Vec::new();
    let mut n_nodes = 0;
    let mut expect_label = false;
    let mut prev_chunk = None;
    let mut labels = Vec::new();

    for lexeme in lexemes(tree) {
        match lexeme {
            "(" => {
                // Unlabeled node, e.g. the root of a Penn Treebank tree.
                if expect_label {
                    open.push(("", n_nodes));
                    n_nodes += 1;
                }
                expect_label = true;
            }
            ")" => {
                if expect_label {
                    return Err(AnnotateError::Tree(format!("empty node in: {}", tree)));
                }
                if open.pop().is_none() {
                    return Err(AnnotateError::Tree(format!(
                        "unbalanced parentheses in: {}",
                        tree
                    )));
                }
            }
            symbol if expect_label => {
                open.push((symbol, n_nodes));
                n_nodes += 1;
                expect_label = false;
            }
            _ => {
                if open.is_empty() {
                    return Err(AnnotateError::Tree(format!(
                        "token outside of a node in: {}",
                        tree
                    )));
                }

                let chunk = open
                    .len()
                    .checked_sub(2)
                    .map(|idx| open[idx])
                    .map(|(label, id)| (phrase(label), id))
                    .filter(|(phrase, _)| !phrase.is_empty() && !CLAUSE_LABELS.contains(phrase));

                match chunk {
                    Some((phrase, id)) => {
                        let prefix = if prev_chunk == Some(id) { "I" } else { "B" };
                        labels.push(format!("{}-{}", prefix, phrase));
                        prev_chunk = Some(id);
                    }
                    None => {
                        labels.push(OUTSIDE.to_string());
                        prev_chunk = None;
                    }
                }
            }
        }
    }

    if expect_label || !open.is_empty() {
        return Err(AnnotateError::Tree(format!(
            "unbalanced parentheses in: {}",
            tree
        )));
    }

    Ok(labels)
}

/// Strip function tags from a phrase label.
fn phrase(label: &str) -> &str {
    match label.find(|c| c == '-' || c == '=') {
        Some(idx) if idx > 0 => &label[..idx],
        _ => label,
    }
}

fn lexemes(tree: &str) -> Vec<&str> {
    let mut lexemes = Vec::new();
    let mut start = None;

    for (idx, c) in tree.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(start) = start.take() {
                lexemes.push(&tree[start..idx]);
            }
            if !c.is_whitespace() {
                lexemes.push(&tree[idx..idx + 1]);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(start) = start {
        lexemes.push(&tree[start..]);
    }

    lexemes
}

#[cfg(test)]
mod tests {
    use super::chunk_labels;
    use crate::annotate::AnnotateError;

    #[test]
    fn chunks_from_tree() {
        let tree = "(ROOT (S (NP (DT The) (NN cat)) (VP (VBD sat) (PP (IN on) (NP (DT the) (NN mat)))) (. .)))";
        assert_eq!(
            chunk_labels(tree).unwrap(),
            vec!["B-NP", "I-NP", "B-VP", "B-PP", "B-NP", "I-NP", "O"]
        );
    }

    #[test]
    fn adjacent_phrases_start_new_chunks() {
        let tree = "(ROOT (S (NP (NP (NNP Smith)) (NP-TMP (NN yesterday))) (VP (VBD left))))";
        assert_eq!(
            chunk_labels(tree).unwrap(),
            vec!["B-NP", "B-NP", "B-VP"]
        );
    }

    #[test]
    fn bracket_tokens_and_unlabeled_roots() {
        let tree = "( (FRAG (-LRB- -LRB-) (NP (NNP Reuters)) (-RRB- -RRB-)))";
        assert_eq!(chunk_labels(tree).unwrap(), vec!["O", "B-NP", "O"]);
    }

    #[test]
    fn malformed_trees_are_rejected() {
        assert!(matches!(
            chunk_labels("(ROOT (S (NN cat))"),
            Err(AnnotateError::Tree(_))
        ));
        assert!(matches!(
            chunk_labels("(ROOT (S (NN cat))))"),
            Err(AnnotateError::Tree(_))
        ));
        assert!(matches!(chunk_labels("cat"), Err(AnnotateError::Tree(_))));
    }
}
