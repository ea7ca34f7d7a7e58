//! Detect injected morphology in machine-translation output.
//!
//! Each phenomenon gets one predicate over a translated sentence. A
//! phenomenon is only credited when the marker shows up unambiguously: every
//! matcher counts occurrences and succeeds on exactly one.
//!
//! # How it works
//! 1. Pick a [`MatcherPlan`] once per run from the phenomenon and the
//!    representation under evaluation.
//! 2. Per example, [`MatcherPlan::for_side`] yields the [`Matcher`] for the
//!    side the pattern was injected into.
//! 3. [`Matcher::is_match`] runs on a lower-cased [`Translation`], reusing
//!    the search patterns already compiled into a [`PatternCache`].
//!
//! Markers are matched literally. The search text always ends in a newline
//! so the last token of a sentence is whitespace-bounded like every other.
//!
//! # Example
//! ```rust
//! use morph_match::{MatcherPlan, PatternCache, Translation};
//! use morph_types::{Phenomenon, Representation, Side};
//!
//! # fn main() -> Result<(), morph_match::MatchError> {
//! let plan = MatcherPlan::new(Phenomenon::Circumfix, Representation::Surface);
//! let mut patterns = PatternCache::default();
//! let translation = Translation::new("it was unhappily done");
//! assert!(plan.for_side(Side::Target).is_match("un-ly", &translation, &mut patterns)?);
//! # Ok(()) }
//! ```

mod harmony;
mod normalize;
mod repeat;

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;
use tracing::trace;

use morph_types::{Phenomenon, Representation, Side};

pub use normalize::strip_punctuation;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("circumfix marker `{0}` is not of the form prefix-suffix")]
    CircumfixMarker(String),
    #[error("vowel harmony marker `{0}` has fewer than three consonant clusters")]
    HarmonyTemplate(String),
    #[error("failed to build search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// One translated sentence prepared for matching.
#[derive(Clone, Debug)]
pub struct Translation<'a> {
    raw: &'a str,
    text: String,
}

impl<'a> Translation<'a> {
    pub fn new(raw: &'a str) -> Self {
        let raw = raw.trim_end_matches(['\n', '\r']);
        let mut text = raw.to_lowercase();
        text.push('\n');
        Self { raw, text }
    }

    /// The line as produced by the model, case preserved.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Lower-cased search text, newline terminated.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Matching strategy for one kind of example.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Matcher {
    /// The marker and the rest of its token occur exactly once.
    SingleToken,
    /// The reference form occurs once, or exactly one token repeats a 3+ character run.
    Reduplication,
    /// Exactly one token contains the marker.
    Infix,
    /// Exactly one token carries both halves of a `prefix-suffix` marker.
    Circumfix,
    /// A consonant template whose vowels agree with the preceding token.
    VowelHarmony,
}

impl Matcher {
    /// Matcher for target-side examples in surface representation.
    pub fn for_target_surface(phenomenon: Phenomenon) -> Self {
        match phenomenon {
            Phenomenon::Compound => Matcher::SingleToken,
            Phenomenon::Reduplication => Matcher::Reduplication,
            Phenomenon::Infix => Matcher::Infix,
            Phenomenon::Circumfix => Matcher::Circumfix,
            Phenomenon::VowelHarmony => Matcher::VowelHarmony,
        }
    }

    /// Check whether `marker` was reproduced in `translation`.
    ///
    /// Errors only when the marker itself cannot describe a pattern of this
    /// kind, which means the meta-info input is broken.
    pub fn is_match(
        self,
        marker: &str,
        translation: &Translation<'_>,
        patterns: &mut PatternCache,
    ) -> Result<bool, MatchError> {
        let marker = marker.to_lowercase();
        let text = translation.text();
        match self {
            Matcher::SingleToken => found_single_token(patterns, &marker, text),
            Matcher::Reduplication => found_reduplication(patterns, &marker, text),
            Matcher::Infix => found_infix(patterns, &marker, text),
            Matcher::Circumfix => found_circumfix(patterns, &marker, text),
            Matcher::VowelHarmony => {
                harmony::found_vowel_harmony(patterns, &marker, translation)
            }
        }
    }
}

/// Matchers selected for one evaluation run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatcherPlan {
    source: Matcher,
    target: Matcher,
}

impl MatcherPlan {
    /// Source-side and abstract examples only need the isolated marker or
    /// placeholder token; target-side surface examples use the phenomenon's
    /// own matcher.
    pub fn new(phenomenon: Phenomenon, representation: Representation) -> Self {
        let target = match representation {
            Representation::Abstract => Matcher::SingleToken,
            Representation::Surface => Matcher::for_target_surface(phenomenon),
        };
        Self {
            source: Matcher::SingleToken,
            target,
        }
    }

    pub fn for_side(&self, side: Side) -> Matcher {
        match side {
            Side::Source => self.source,
            Side::Target => self.target,
        }
    }
}

/// Compiled search patterns, keyed by pattern text.
///
/// Markers come from a small fixed inventory, so one cache per run compiles
/// each pattern once.
#[derive(Clone, Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Regex>,
}

impl PatternCache {
    pub fn get(&mut self, pattern: &str) -> Result<&Regex, MatchError> {
        if !self.compiled.contains_key(pattern) {
            let regex = Regex::new(pattern)?;
            trace!(pattern, "compiled search pattern");
            self.compiled.insert(pattern.to_string(), regex);
        }
        Ok(&self.compiled[pattern])
    }

    /// Number of distinct patterns compiled so far.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

fn count_matches(
    patterns: &mut PatternCache,
    pattern: &str,
    text: &str,
) -> Result<usize, MatchError> {
    Ok(patterns.get(pattern)?.find_iter(text).count())
}

fn single_token_count(
    patterns: &mut PatternCache,
    marker: &str,
    text: &str,
) -> Result<usize, MatchError> {
    let pattern = format!(r"\s?{}\S*?\s", regex::escape(marker));
    count_matches(patterns, &pattern, text)
}

fn found_single_token(
    patterns: &mut PatternCache,
    marker: &str,
    text: &str,
) -> Result<bool, MatchError> {
    Ok(single_token_count(patterns, marker, text)? == 1)
}

fn found_reduplication(
    patterns: &mut PatternCache,
    marker: &str,
    text: &str,
) -> Result<bool, MatchError> {
    if single_token_count(patterns, marker, text)? == 1 {
        return Ok(true);
    }
    // The model may reduplicate a different stem than the reference.
    Ok(repeat::count_adjacent_repeats(text) == 1)
}

fn found_infix(
    patterns: &mut PatternCache,
    marker: &str,
    text: &str,
) -> Result<bool, MatchError> {
    let pattern = format!(r"\s?(?:\S+)?{}(?:\S*)?\s", regex::escape(marker));
    Ok(count_matches(patterns, &pattern, text)? == 1)
}

fn found_circumfix(
    patterns: &mut PatternCache,
    marker: &str,
    text: &str,
) -> Result<bool, MatchError> {
    let Some((prefix, suffix)) = marker
        .split_once('-')
        .filter(|(_, suffix)| !suffix.contains('-'))
    else {
        return Err(MatchError::CircumfixMarker(marker.to_string()));
    };
    let pattern = format!(
        r"\s?{}(?:\S+)?{}\S*?\s",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Ok(count_matches(patterns, &pattern, text)? == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(matcher: Matcher, marker: &str, line: &str) -> bool {
        matcher
            .is_match(marker, &Translation::new(line), &mut PatternCache::default())
            .expect("valid marker")
    }

    #[test]
    fn single_token_requires_exactly_one_occurrence() {
        assert!(hit(Matcher::SingleToken, "token", "a token here"));
        assert!(hit(Matcher::SingleToken, "token", "token"));
        assert!(hit(Matcher::SingleToken, "token", "the tokens here"));
        assert!(!hit(Matcher::SingleToken, "token", "no marker"));
        assert!(!hit(Matcher::SingleToken, "token", "token and token"));
    }

    #[test]
    fn single_token_ignores_case() {
        assert!(hit(Matcher::SingleToken, "Bico", "Sona BICO fährt"));
        assert!(hit(
            Matcher::SingleToken,
            "@COMPOUND_1@",
            "ein @compound_1@ haus"
        ));
    }

    #[test]
    fn marker_is_matched_literally() {
        assert!(!hit(Matcher::SingleToken, "a.c", "the abc word"));
        assert!(hit(Matcher::SingleToken, "a.c", "the a.c word"));
    }

    #[test]
    fn infix_matches_inside_one_token() {
        assert!(hit(Matcher::Infix, "siye", "das kasiyeto ist da"));
        assert!(hit(Matcher::Infix, "siye", "siye"));
        assert!(!hit(Matcher::Infix, "siye", "kasiyeto und pasiyelo"));
        assert!(!hit(Matcher::Infix, "siye", "nothing here"));
    }

    #[test]
    fn circumfix_needs_prefix_and_suffix() {
        assert!(hit(Matcher::Circumfix, "un-ly", "it was unhappily done"));
        assert!(!hit(Matcher::Circumfix, "un-ly", "it was uneventful"));
        assert!(!hit(
            Matcher::Circumfix,
            "un-ly",
            "unhappily and unkindly"
        ));
    }

    #[test]
    fn circumfix_rejects_malformed_marker() {
        let translation = Translation::new("unhappily");
        let mut patterns = PatternCache::default();
        assert!(matches!(
            Matcher::Circumfix.is_match("unly", &translation, &mut patterns),
            Err(MatchError::CircumfixMarker(_))
        ));
        assert!(matches!(
            Matcher::Circumfix.is_match("a-b-c", &translation, &mut patterns),
            Err(MatchError::CircumfixMarker(_))
        ));
    }

    #[test]
    fn reduplication_prefers_reference_form() {
        assert!(hit(Matcher::Reduplication, "bi", "the bibibi dog"));
        assert!(hit(Matcher::Reduplication, "popopera", "ein popopera"));
    }

    // Heuristic: any single token with an adjacent 3+ character repeat is
    // credited, even if the model reduplicated an unrelated stem.
    #[test]
    fn reduplication_falls_back_to_any_repeat() {
        assert!(hit(Matcher::Reduplication, "popera", "the gijagija dog"));
        assert!(!hit(
            Matcher::Reduplication,
            "popera",
            "gijagija and metumetu"
        ));
        assert!(!hit(Matcher::Reduplication, "popera", "the plain dog"));
    }

    #[test]
    fn plan_selects_single_token_for_source_and_abstract() {
        let surface = MatcherPlan::new(Phenomenon::Infix, Representation::Surface);
        assert_eq!(surface.for_side(Side::Source), Matcher::SingleToken);
        assert_eq!(surface.for_side(Side::Target), Matcher::Infix);

        let abstract_plan = MatcherPlan::new(Phenomenon::Infix, Representation::Abstract);
        assert_eq!(abstract_plan.for_side(Side::Target), Matcher::SingleToken);

        let compound = MatcherPlan::new(Phenomenon::Compound, Representation::Surface);
        assert_eq!(compound.for_side(Side::Target), Matcher::SingleToken);
    }

    #[test]
    fn patterns_compile_once_per_marker() {
        let mut patterns = PatternCache::default();
        for line in ["ein bico", "kein treffer", "bico und bico"] {
            Matcher::SingleToken
                .is_match("bico", &Translation::new(line), &mut patterns)
                .unwrap();
        }
        assert_eq!(patterns.len(), 1);

        Matcher::SingleToken
            .is_match("BICO", &Translation::new("Bico"), &mut patterns)
            .unwrap();
        Matcher::Infix
            .is_match("bico", &Translation::new("abicoz"), &mut patterns)
            .unwrap();
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn translation_terminates_search_text() {
        let translation = Translation::new("Ein Haus\r\n");
        assert_eq!(translation.raw(), "Ein Haus");
        assert_eq!(translation.text(), "ein haus\n");
    }
}
