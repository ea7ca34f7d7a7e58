//! Scan for tokens that contain an adjacent repeat of three or more characters.

/// Shortest run that counts as reduplicated material.
const MIN_UNIT: usize = 3;

/// Count whitespace-terminated tokens holding a run immediately followed by
/// itself (`gijagija`, `xmetumetu`).
///
/// The scan moves left to right and resumes after each hit's terminating
/// whitespace, so a token is counted at most once. The run may start
/// anywhere in the token; a token without whitespace after it is never
/// counted.
pub(crate) fn count_adjacent_repeats(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut pos = 0;
    while pos < chars.len() {
        match repeat_at(&chars, pos) {
            Some(next) => {
                count += 1;
                pos = next;
            }
            None => pos += 1,
        }
    }
    count
}

/// Try a repeat whose unit starts at `pos`, or right after it when `pos` is
/// whitespace. Returns the position after the whitespace closing the token.
fn repeat_at(chars: &[char], pos: usize) -> Option<usize> {
    let start = if chars[pos].is_whitespace() { pos + 1 } else { pos };
    let end = start + chars.get(start..)?.iter().position(|c| c.is_whitespace())?;
    let run = &chars[start..end];
    (MIN_UNIT..=run.len() / 2)
        .any(|unit| run[..unit] == run[unit..2 * unit])
        .then_some(end + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_full_and_partial_reduplication() {
        assert_eq!(count_adjacent_repeats("the gijagija dog\n"), 1);
        assert_eq!(count_adjacent_repeats("a popopera\n"), 0);
        assert_eq!(count_adjacent_repeats("a popepopera\n"), 1);
        assert_eq!(count_adjacent_repeats("xmetumetu\n"), 1);
    }

    #[test]
    fn needs_units_of_three_characters() {
        assert_eq!(count_adjacent_repeats("bibibi\n"), 0);
        assert_eq!(count_adjacent_repeats("bibbib\n"), 1);
    }

    #[test]
    fn counts_each_token_once() {
        assert_eq!(count_adjacent_repeats("abcabcabcabc\n"), 1);
        assert_eq!(count_adjacent_repeats("gijagija und metumetu\n"), 2);
    }

    #[test]
    fn requires_whitespace_after_token() {
        assert_eq!(count_adjacent_repeats("gijagija"), 0);
        assert_eq!(count_adjacent_repeats("gijagija  \n"), 1);
        assert_eq!(count_adjacent_repeats(""), 0);
    }
}
