pub mod evaluator;
pub mod report;

pub use evaluator::{
    Count, EvalConfig, EvalError, EvalStats, Evaluation, Evaluator, Outcome, SkipReason, Tally,
    evaluate, tally_key,
};
pub use report::{ReportEntry, render, report_entries};
