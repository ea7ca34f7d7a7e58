use std::collections::HashMap;

use morph_corpus::{CorpusError, ExampleRecord, RecordError, Score, Triple};
use morph_match::{MatchError, MatcherPlan, PatternCache, Translation};
use morph_types::{FreqBand, Phenomenon, Representation};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EvalConfig {
    pub phenomenon: Phenomenon,
    pub representation: Representation,
    /// Also score sentences produced by data augmentation.
    pub include_augmented: bool,
    /// Key counters by pattern pair and source-frequency band.
    pub by_freq_bucket: bool,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: RecordError,
    },
    #[error("line {line}: {source}")]
    Match {
        line: usize,
        #[source]
        source: MatchError,
    },
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Examples seen and credited for one counter key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Count {
    pub total: u64,
    pub accurate: u64,
}

impl Count {
    /// `None` when no example was counted.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.accurate as f64 / self.total as f64)
    }
}

/// Accuracy counters keyed by pattern pair, or by `pattern_pair-band` when
/// bucketing by frequency. Counters only ever grow.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    counts: HashMap<String, Count>,
}

impl Tally {
    pub fn record(&mut self, key: String, accurate: bool) {
        let count = self.counts.entry(key).or_default();
        count.total += 1;
        if accurate {
            count.accurate += 1;
        }
    }

    /// Counts for `key`, zero when never observed.
    pub fn get(&self, key: &str) -> Count {
        self.counts.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Count)> {
        self.counts.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

/// Counter key for a pattern pair, suffixed with the band label when bucketing.
pub fn tally_key(pattern_pair: &str, band: Option<FreqBand>) -> String {
    match band {
        Some(band) => format!("{pattern_pair}-{}", band.label()),
        None => pattern_pair.to_string(),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// Augmented sentence while only originals are scored.
    Augmented,
    /// Pattern pair of the other (or no) representation.
    Representation,
    /// Source frequency above the highest band.
    Frequency,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Skipped(SkipReason),
    Counted { accurate: bool },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EvalStats {
    pub seen: u64,
    pub evaluated: u64,
    pub accurate: u64,
    pub skipped_augmented: u64,
    pub skipped_representation: u64,
    pub skipped_frequency: u64,
}

/// Result of one evaluation run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Evaluation {
    pub tally: Tally,
    pub stats: EvalStats,
}

/// Scores aligned examples one at a time.
pub struct Evaluator {
    config: EvalConfig,
    plan: MatcherPlan,
    patterns: PatternCache,
    evaluation: Evaluation,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            plan: MatcherPlan::new(config.phenomenon, config.representation),
            patterns: PatternCache::default(),
            evaluation: Evaluation::default(),
        }
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// Filter, match and count one example.
    ///
    /// The meta-info line is only parsed once the score filter passed, and a
    /// malformed line fails the whole run: the three streams cannot be
    /// realigned past it.
    pub fn observe(&mut self, triple: &Triple<'_>) -> Result<Outcome, EvalError> {
        let line = triple.line;
        self.evaluation.stats.seen += 1;

        let score =
            Score::parse(triple.score).map_err(|source| EvalError::Record { line, source })?;
        if !self.config.include_augmented && !score.is_original() {
            return Ok(self.skip(line, SkipReason::Augmented));
        }

        let record = ExampleRecord::parse(triple.meta)
            .map_err(|source| EvalError::Record { line, source })?;
        if record.representation() != Some(self.config.representation) {
            return Ok(self.skip(line, SkipReason::Representation));
        }
        let Some(band) = record.freq_band else {
            return Ok(self.skip(line, SkipReason::Frequency));
        };

        let matcher = self.plan.for_side(record.side);
        let accurate = matcher
            .is_match(
                record.to_match,
                &Translation::new(triple.translation),
                &mut self.patterns,
            )
            .map_err(|source| EvalError::Match { line, source })?;
        trace!(line, pattern_pair = record.pattern_pair, ?matcher, accurate, "matched");

        let key = tally_key(
            record.pattern_pair,
            self.config.by_freq_bucket.then_some(band),
        );
        self.evaluation.tally.record(key, accurate);
        let stats = &mut self.evaluation.stats;
        stats.evaluated += 1;
        if accurate {
            stats.accurate += 1;
        }
        Ok(Outcome::Counted { accurate })
    }

    pub fn tally(&self) -> &Tally {
        &self.evaluation.tally
    }

    pub fn stats(&self) -> EvalStats {
        self.evaluation.stats
    }

    /// Search patterns compiled so far, one per distinct marker and matcher.
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    pub fn finish(self) -> Evaluation {
        self.evaluation
    }

    fn skip(&mut self, line: usize, reason: SkipReason) -> Outcome {
        let stats = &mut self.evaluation.stats;
        match reason {
            SkipReason::Augmented => stats.skipped_augmented += 1,
            SkipReason::Representation => stats.skipped_representation += 1,
            SkipReason::Frequency => stats.skipped_frequency += 1,
        }
        debug!(line, ?reason, "skipped example");
        Outcome::Skipped(reason)
    }
}

/// Run a fresh [`Evaluator`] over all triples.
pub fn evaluate<'a, I>(config: EvalConfig, triples: I) -> Result<Evaluation, EvalError>
where
    I: IntoIterator<Item = Result<Triple<'a>, CorpusError>>,
{
    let mut evaluator = Evaluator::new(config);
    for triple in triples {
        evaluator.observe(&triple?)?;
    }
    Ok(evaluator.finish())
}
