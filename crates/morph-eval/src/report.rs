use std::fmt;
use std::io::{self, Write};

use morph_types::{FreqBand, canonical_order};

use crate::evaluator::{Count, EvalConfig, Tally, tally_key};

/// One result line: the accuracy of a pattern pair, optionally within a band.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportEntry {
    /// 1-based position in the canonical order.
    pub number: usize,
    pub pattern_pair: &'static str,
    pub band: Option<FreqBand>,
    pub count: Count,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.band {
            Some(band) => write!(f, "#{} {}: ", self.number, band)?,
            None => write!(f, "#{}: ", self.number)?,
        }
        match self.count.accuracy() {
            Some(accuracy) => f.write_str(&format_ratio(accuracy)),
            None => f.write_str("no examples found for this pattern"),
        }
    }
}

/// Round to three decimals, ties to even, and print like a shortest float
/// (`1.0`, `0.667`).
fn format_ratio(ratio: f64) -> String {
    let rounded = (ratio * 1000.0).round_ties_even() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

/// Entries in canonical order; seven per pattern pair when bucketing.
pub fn report_entries(tally: &Tally, config: &EvalConfig) -> Vec<ReportEntry> {
    let order = canonical_order(config.phenomenon, config.representation);
    let bands: Vec<Option<FreqBand>> = if config.by_freq_bucket {
        FreqBand::ALL.into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    order
        .iter()
        .enumerate()
        .flat_map(|(idx, &pattern_pair)| {
            bands.iter().map(move |&band| ReportEntry {
                number: idx + 1,
                pattern_pair,
                band,
                count: tally.get(&tally_key(pattern_pair, band)),
            })
        })
        .collect()
}

/// Write the result lines; bucketed output ends each pattern pair with a
/// blank line.
pub fn render<W: Write>(out: &mut W, tally: &Tally, config: &EvalConfig) -> io::Result<()> {
    let entries = report_entries(tally, config);
    for entry in &entries {
        writeln!(out, "{entry}")?;
        if entry.band == FreqBand::ALL.last().copied() {
            writeln!(out)?;
        }
    }
    Ok(())
}
