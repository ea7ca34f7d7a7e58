//! Punctuation stripping for token position lookups.

/// ASCII punctuation plus typographic double quotes.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~“”";

/// Remove punctuation from a token.
///
/// An apostrophe or hyphen survives unless it is the token's last character
/// (`don't`, `well-known`, `a-b-` becomes `a-b`).
pub fn strip_punctuation(token: &str) -> String {
    let last = token.char_indices().next_back().map(|(idx, _)| idx);
    token
        .char_indices()
        .filter(|&(idx, c)| match c {
            '\'' | '-' => Some(idx) != last,
            other => !PUNCTUATION.contains(other),
        })
        .map(|(_, c)| c)
        .collect()
}
