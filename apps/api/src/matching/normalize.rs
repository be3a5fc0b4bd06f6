// Text canonicalization for the dense-vector scoring path.

/// Canonicalizes text before it is handed to an embedding comparison:
/// collapse whitespace runs, strip characters outside alphanumerics,
/// whitespace, and `.,!?;:-`, lowercase, then drop tokens of one or two
/// characters.
///
/// Lexical feature extraction and evidence work on raw text instead, so
/// vocabulary entries like "node.js" survive untouched.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:-".contains(*c))
        .collect();
    kept.to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .collect::<Vec<_>>()
        .join(" ")
}
