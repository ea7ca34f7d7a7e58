//! Meta-info records and language-model scores.

use std::num::{ParseFloatError, ParseIntError};

use morph_types::{FreqBand, Representation, Side};
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum RecordError {
    #[error("meta-info line has no tab after the pattern pair")]
    MissingTab,
    #[error("annotations `{0}` must contain exactly one `:` before the marker")]
    Marker(String),
    #[error("annotations `{0}` must have the form side-frequency-extra")]
    Annotations(String),
    #[error("invalid source frequency `{value}`: {source}")]
    Frequency {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unknown side `{0}` (expected src or trg)")]
    Side(String),
    #[error("invalid score `{value}`: {source}")]
    Score {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Everything the evaluator needs from one meta-info line
/// (`pattern_pair<TAB>side-freq-extra:marker`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExampleRecord<'a> {
    pub pattern_pair: &'a str,
    /// Marker, placeholder or consonant template expected in the output.
    pub to_match: &'a str,
    pub side: Side,
    pub frequency: u64,
    /// `None` above the highest band; such examples are not evaluated.
    pub freq_band: Option<FreqBand>,
}

impl<'a> ExampleRecord<'a> {
    pub fn parse(line: &'a str) -> Result<Self, RecordError> {
        let mut fields = line.trim().split('\t');
        let pattern_pair = fields.next().unwrap_or_default();
        let info = fields.next().ok_or(RecordError::MissingTab)?;

        let (annotations, to_match) = info
            .split_once(':')
            .filter(|(_, marker)| !marker.contains(':'))
            .ok_or_else(|| RecordError::Marker(info.to_string()))?;

        let parts: Vec<&str> = annotations.split('-').collect();
        let [side, frequency, _extra] = parts.as_slice() else {
            return Err(RecordError::Annotations(annotations.to_string()));
        };
        let side =
            Side::from_annotation(side).ok_or_else(|| RecordError::Side(side.to_string()))?;
        let frequency: u64 = frequency.parse().map_err(|source| RecordError::Frequency {
            value: frequency.to_string(),
            source,
        })?;

        Ok(Self {
            pattern_pair,
            to_match,
            side,
            frequency,
            freq_band: FreqBand::from_frequency(frequency),
        })
    }

    pub fn representation(&self) -> Option<Representation> {
        Representation::from_pattern_pair(self.pattern_pair)
    }
}

const ORIGINAL_SCORE: &str = "-inf";

/// Language-model score of an example.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Score {
    /// Sentence from the original corpus (scored `-inf`).
    Original,
    /// Sentence produced by data augmentation.
    Augmented(f64),
}

impl Score {
    /// Only the literal `-inf` marks an original sentence; every other line
    /// must hold the float score of an augmented one.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let raw = raw.trim();
        if raw == ORIGINAL_SCORE {
            return Ok(Score::Original);
        }
        raw.parse().map(Score::Augmented).map_err(|source| RecordError::Score {
            value: raw.to_string(),
            source,
        })
    }

    pub fn is_original(self) -> bool {
        matches!(self, Score::Original)
    }
}
