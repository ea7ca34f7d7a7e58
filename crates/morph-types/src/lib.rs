//! Shared vocabulary for evaluating synthetic morphology in MT output.
//!
//! The evaluator scores five injected phenomena (compounding, vowel harmony,
//! infixation, circumfixation, reduplication) in either a `surface` or an
//! `abstract` representation. This crate holds the small types every other
//! crate keys on, the source-frequency bucketer, and the fixed reporting
//! order of pattern pairs for each phenomenon/representation combination.
//!
//! ```rust
//! use morph_types::{FreqBand, Phenomenon, Representation, canonical_order};
//!
//! let phenomenon: Phenomenon = "compound".parse().unwrap();
//! assert_eq!(FreqBand::from_frequency(5), Some(FreqBand::OneToFive));
//! assert_eq!(
//!     Representation::from_pattern_pair("sona_surface-bico"),
//!     Some(Representation::Surface)
//! );
//! assert_eq!(canonical_order(phenomenon, Representation::Surface).len(), 10);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Morphological phenomenon injected into the data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Phenomenon {
    Circumfix,
    Compound,
    Infix,
    Reduplication,
    VowelHarmony,
}

impl Phenomenon {
    pub const ALL: [Phenomenon; 5] = [
        Phenomenon::Circumfix,
        Phenomenon::Compound,
        Phenomenon::Infix,
        Phenomenon::Reduplication,
        Phenomenon::VowelHarmony,
    ];

    /// Name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Phenomenon::Circumfix => "circumfix",
            Phenomenon::Compound => "compound",
            Phenomenon::Infix => "infix",
            Phenomenon::Reduplication => "reduplication",
            Phenomenon::VowelHarmony => "vowelharmony",
        }
    }
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phenomenon {
    type Err = ParseNameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Phenomenon::ALL
            .into_iter()
            .find(|p| p.as_str() == raw)
            .ok_or_else(|| ParseNameError {
                kind: "phenomenon",
                value: raw.to_string(),
                expected: "circumfix, compound, infix, reduplication, vowelharmony",
            })
    }
}

/// Whether the injected marker is a concrete string or a placeholder token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Representation {
    Surface,
    Abstract,
}

impl Representation {
    pub fn as_str(self) -> &'static str {
        match self {
            Representation::Surface => "surface",
            Representation::Abstract => "abstract",
        }
    }

    /// Derive the representation from a pattern-pair key.
    ///
    /// Takes the part before the final `-`, then the suffix after its last
    /// `_`: `sona_surface-bico` is surface, `@INFIX_1@_abstract-soxu` is
    /// abstract. Any other suffix yields `None`.
    pub fn from_pattern_pair(pattern_pair: &str) -> Option<Self> {
        let head = pattern_pair
            .rsplit_once('-')
            .map_or(pattern_pair, |(head, _)| head);
        let suffix = head.rsplit('_').next().unwrap_or(head);
        match suffix {
            "surface" => Some(Representation::Surface),
            "abstract" => Some(Representation::Abstract),
            _ => None,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Representation {
    type Err = ParseNameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "surface" => Ok(Representation::Surface),
            "abstract" => Ok(Representation::Abstract),
            _ => Err(ParseNameError {
                kind: "representation",
                value: raw.to_string(),
                expected: "surface, abstract",
            }),
        }
    }
}

/// Side of the translation pair the pattern was injected into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// Parse the `src`/`trg` annotation of a meta-info line.
    pub fn from_annotation(raw: &str) -> Option<Self> {
        match raw {
            "src" => Some(Side::Source),
            "trg" => Some(Side::Target),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Source => "src",
            Side::Target => "trg",
        })
    }
}

/// Unknown name for one of the enums above.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Source-frequency band of a pattern in the training data.
///
/// Bands are closed on the upper bound, so 5 is `1-5` and 6 is `6-15`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum FreqBand {
    ZeroShot,
    OneToFive,
    SixToFifteen,
    SixteenToFifty,
    FiftyOneToHundred,
    HundredOneToFiveHundred,
    FiveHundredOneToThousand,
}

/// Highest source frequency that still falls into a band.
pub const MAX_BANDED_FREQUENCY: u64 = 1000;

impl FreqBand {
    /// Reporting order.
    pub const ALL: [FreqBand; 7] = [
        FreqBand::ZeroShot,
        FreqBand::OneToFive,
        FreqBand::SixToFifteen,
        FreqBand::SixteenToFifty,
        FreqBand::FiftyOneToHundred,
        FreqBand::HundredOneToFiveHundred,
        FreqBand::FiveHundredOneToThousand,
    ];

    /// Bucket a source frequency. Frequencies above [`MAX_BANDED_FREQUENCY`]
    /// have no band and are left out of the evaluation.
    pub fn from_frequency(freq: u64) -> Option<Self> {
        match freq {
            0 => Some(FreqBand::ZeroShot),
            1..=5 => Some(FreqBand::OneToFive),
            6..=15 => Some(FreqBand::SixToFifteen),
            16..=50 => Some(FreqBand::SixteenToFifty),
            51..=100 => Some(FreqBand::FiftyOneToHundred),
            101..=500 => Some(FreqBand::HundredOneToFiveHundred),
            501..=MAX_BANDED_FREQUENCY => Some(FreqBand::FiveHundredOneToThousand),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FreqBand::ZeroShot => "zero-shot",
            FreqBand::OneToFive => "1-5",
            FreqBand::SixToFifteen => "6-15",
            FreqBand::SixteenToFifty => "16-50",
            FreqBand::FiftyOneToHundred => "51-100",
            FreqBand::HundredOneToFiveHundred => "101-500",
            FreqBand::FiveHundredOneToThousand => "501-1000",
        }
    }
}

impl fmt::Display for FreqBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Pattern pairs in order of pattern-pair frequency in the training data.

static COMPOUND_SURFACE_ORDER: [&str; 10] = [
    "sona_surface-bico",
    "zogaze_surface-qepus",
    "suyi_surface-saqo",
    "segalo_surface-domabu",
    "zarumo_surface-vazaga",
    "tumoko_surface-pifeke",
    "necib_surface-kixaka",
    "yoyexo_surface-nifa",
    "dawida_surface-nonujo",
    "saxuj_surface-tedubo",
];

static VOWEL_HARMONY_SURFACE_ORDER: [&str; 4] = [
    "duji_surface-['s', 'f', 'p']",
    "zoged_surface-['b', 'p', 'r']",
    "dulana_surface-['n', 'l', 'j']",
    "xefoqi_surface-['b', 'k', 'm']",
];

static INFIX_SURFACE_ORDER: [&str; 4] = [
    "jetah_surface-huheke",
    "dezaxe_surface-siye",
    "yusid_surface-huxi",
    "yadey_surface-numime",
];

static CIRCUMFIX_SURFACE_ORDER: [&str; 4] = [
    "['jeb', 'fet']_surface-wofi",
    "['Kur', 'maz']_surface-quroc",
    "['nuw', 'daf']_surface-seyet",
    "['Rül', 'bos']_surface-sudizu",
];

static REDUPLICATION_SURFACE_ORDER: [&str; 3] = [
    "partial_surface-popera",
    "triple_partial_surface-metuza",
    "full_surface-gija",
];

static COMPOUND_ABSTRACT_ORDER: [&str; 10] = [
    "@COMPOUND_1@_abstract-wuze",
    "@COMPOUND_2@_abstract-pomuy",
    "@COMPOUND_3@_abstract-quyeso",
    "@COMPOUND_4@_abstract-zolo",
    "@COMPOUND_5@_abstract-nemine",
    "@COMPOUND_6@_abstract-fexot",
    "@COMPOUND_7@_abstract-zixu",
    "@COMPOUND_8@_abstract-tazif",
    "@COMPOUND_9@_abstract-supu",
    "@COMPOUND_10@_abstract-jifo",
];

static VOWEL_HARMONY_ABSTRACT_ORDER: [&str; 4] = [
    "raxuja_abstract-@VOWEL_HARMONY_1@",
    "gapu_abstract-@VOWEL_HARMONY_2@",
    "soyut_abstract-@VOWEL_HARMONY_3@",
    "zide_abstract-@VOWEL_HARMONY_4@",
];

static INFIX_ABSTRACT_ORDER: [&str; 4] = [
    "@INFIX_1@_abstract-soxu",
    "@INFIX_2@_abstract-ceri",
    "@INFIX_3@_abstract-lasi",
    "@INFIX_4@_abstract-jigaq",
];

static CIRCUMFIX_ABSTRACT_ORDER: [&str; 4] = [
    "@CIRCUMFIX_1@_abstract-fuge",
    "@CIRCUMFIX_2@_abstract-zixer",
    "@CIRCUMFIX_3@_abstract-xobex",
    "@CIRCUMFIX_4@_abstract-pasoz",
];

static REDUPLICATION_ABSTRACT_ORDER: [&str; 3] = [
    "partial_abstract-gegec",
    "triple_partial_abstract-yisu",
    "full_abstract-jufo",
];

/// Fixed reporting order of pattern pairs for a phenomenon/representation.
pub fn canonical_order(
    phenomenon: Phenomenon,
    representation: Representation,
) -> &'static [&'static str] {
    match (representation, phenomenon) {
        (Representation::Surface, Phenomenon::Compound) => &COMPOUND_SURFACE_ORDER,
        (Representation::Surface, Phenomenon::VowelHarmony) => &VOWEL_HARMONY_SURFACE_ORDER,
        (Representation::Surface, Phenomenon::Infix) => &INFIX_SURFACE_ORDER,
        (Representation::Surface, Phenomenon::Circumfix) => &CIRCUMFIX_SURFACE_ORDER,
        (Representation::Surface, Phenomenon::Reduplication) => &REDUPLICATION_SURFACE_ORDER,
        (Representation::Abstract, Phenomenon::Compound) => &COMPOUND_ABSTRACT_ORDER,
        (Representation::Abstract, Phenomenon::VowelHarmony) => &VOWEL_HARMONY_ABSTRACT_ORDER,
        (Representation::Abstract, Phenomenon::Infix) => &INFIX_ABSTRACT_ORDER,
        (Representation::Abstract, Phenomenon::Circumfix) => &CIRCUMFIX_ABSTRACT_ORDER,
        (Representation::Abstract, Phenomenon::Reduplication) => &REDUPLICATION_ABSTRACT_ORDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn buckets_boundaries_into_lower_band() {
        assert_eq!(FreqBand::from_frequency(0), Some(FreqBand::ZeroShot));
        assert_eq!(FreqBand::from_frequency(1), Some(FreqBand::OneToFive));
        assert_eq!(FreqBand::from_frequency(5), Some(FreqBand::OneToFive));
        assert_eq!(FreqBand::from_frequency(6), Some(FreqBand::SixToFifteen));
        assert_eq!(FreqBand::from_frequency(15), Some(FreqBand::SixToFifteen));
        assert_eq!(FreqBand::from_frequency(50), Some(FreqBand::SixteenToFifty));
        assert_eq!(FreqBand::from_frequency(100), Some(FreqBand::FiftyOneToHundred));
        assert_eq!(
            FreqBand::from_frequency(500),
            Some(FreqBand::HundredOneToFiveHundred)
        );
        assert_eq!(
            FreqBand::from_frequency(1000),
            Some(FreqBand::FiveHundredOneToThousand)
        );
        assert_eq!(FreqBand::from_frequency(1001), None);
    }

    #[test]
    fn band_labels_follow_reporting_order() {
        let labels: Vec<_> = FreqBand::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(
            labels,
            ["zero-shot", "1-5", "6-15", "16-50", "51-100", "101-500", "501-1000"]
        );
    }

    #[test]
    fn derives_representation_from_pattern_pair() {
        assert_eq!(
            Representation::from_pattern_pair("sona_surface-bico"),
            Some(Representation::Surface)
        );
        assert_eq!(
            Representation::from_pattern_pair("@COMPOUND_1@_abstract-wuze"),
            Some(Representation::Abstract)
        );
        assert_eq!(
            Representation::from_pattern_pair("raxuja_abstract-@VOWEL_HARMONY_1@"),
            Some(Representation::Abstract)
        );
        assert_eq!(
            Representation::from_pattern_pair("['Rül', 'bos']_surface-sudizu"),
            Some(Representation::Surface)
        );
        assert_eq!(Representation::from_pattern_pair("plain-pair"), None);
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!("vowelharmony".parse::<Phenomenon>(), Ok(Phenomenon::VowelHarmony));
        assert_eq!("abstract".parse::<Representation>(), Ok(Representation::Abstract));
        let err = "suffix".parse::<Phenomenon>().unwrap_err();
        assert!(err.to_string().contains("circumfix"));
        for phenomenon in Phenomenon::ALL {
            assert_eq!(phenomenon.to_string().parse::<Phenomenon>(), Ok(phenomenon));
        }
    }

    #[test]
    fn canonical_orders_have_fixed_sizes() {
        for representation in [Representation::Surface, Representation::Abstract] {
            for phenomenon in Phenomenon::ALL {
                let expected = match phenomenon {
                    Phenomenon::Compound => 10,
                    Phenomenon::Reduplication => 3,
                    _ => 4,
                };
                let order = canonical_order(phenomenon, representation);
                assert_eq!(order.len(), expected, "{phenomenon}/{representation}");
                assert!(
                    order
                        .iter()
                        .all(|pair| Representation::from_pattern_pair(pair)
                            == Some(representation))
                );
            }
        }
    }

    proptest! {
        #[test]
        fn every_frequency_up_to_ceiling_has_a_band(freq in 0u64..=MAX_BANDED_FREQUENCY) {
            let band = FreqBand::from_frequency(freq);
            prop_assert!(band.is_some());
            prop_assert_eq!(band, FreqBand::from_frequency(freq));
        }

        #[test]
        fn frequencies_above_ceiling_have_no_band(freq in (MAX_BANDED_FREQUENCY + 1)..u64::MAX) {
            prop_assert_eq!(FreqBand::from_frequency(freq), None);
        }
    }
}
