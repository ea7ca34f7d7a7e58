//! Vowel harmony: a `C1 V+ C2 V+ C3` template whose two vowel slots must
//! agree with the vowels of the preceding word.

use tracing::trace;

use crate::normalize::strip_punctuation;
use crate::{MatchError, PatternCache, Translation};

const VOWELS: &str = "AaEeIiOoUuÄäÜüÖö";

fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

fn vowel_runs(word: &str) -> Vec<&str> {
    word.split(|c: char| !is_vowel(c))
        .filter(|run| !run.is_empty())
        .collect()
}

fn consonant_clusters(marker: &str) -> Vec<&str> {
    marker
        .split(is_vowel)
        .filter(|cluster| !cluster.is_empty())
        .collect()
}

fn same_vowels(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub(crate) fn found_vowel_harmony(
    patterns: &mut PatternCache,
    marker: &str,
    translation: &Translation<'_>,
) -> Result<bool, MatchError> {
    let clusters = consonant_clusters(marker);
    let [first, middle, last, ..] = clusters.as_slice() else {
        return Err(MatchError::HarmonyTemplate(marker.to_string()));
    };
    let pattern = format!(
        "{}[{VOWELS}]+{}[{VOWELS}]+{}",
        regex::escape(first),
        regex::escape(middle),
        regex::escape(last)
    );
    let Some(found) = patterns.get(&pattern)?.find(translation.text()) else {
        return Ok(false);
    };
    let found = found.as_str();

    // Position lookup runs against the original-case tokens, so the template
    // must be a whole token once punctuation is gone.
    let raw_tokens: Vec<&str> = translation.raw().trim().split(' ').collect();
    let Some(index) = raw_tokens
        .iter()
        .position(|token| strip_punctuation(token) == found)
    else {
        trace!(found, "template is not a separate token");
        return Ok(false);
    };
    let Some(previous) = index.checked_sub(1).map(|i| raw_tokens[i]) else {
        trace!(found, "template has no preceding token");
        return Ok(false);
    };

    let vowels = vowel_runs(found);
    let previous_vowels = vowel_runs(previous);
    let (expected_first, expected_second) = match previous_vowels.as_slice() {
        [] => return Ok(false),
        [only] => (*only, *only),
        [.., penultimate, ultimate] => (*penultimate, *ultimate),
    };
    Ok(same_vowels(vowels[0], expected_first) && same_vowels(vowels[1], expected_second))
}
