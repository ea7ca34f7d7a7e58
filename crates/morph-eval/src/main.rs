use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use morph_corpus::{EvalInputs, InputPaths, LoadMode};
use morph_eval::{EvalConfig, evaluate, render};
use morph_types::{Phenomenon, Representation};

#[derive(Parser, Debug)]
#[command(name = "morph-eval")]
#[command(about = "Score how often MT output reproduces injected morphological patterns")]
struct Cli {
    /// MT output, one translated sentence per line.
    #[arg(short = 't', long)]
    translations: PathBuf,
    /// Meta-info lines (`pattern_pair<TAB>side-freq-extra:marker`).
    #[arg(short = 'i', long, alias = "meta_info")]
    meta_info: PathBuf,
    /// Language-model scores; `-inf` marks original sentences.
    #[arg(short = 's', long)]
    scores: PathBuf,
    /// circumfix, compound, infix, reduplication or vowelharmony.
    #[arg(short = 'm', long, alias = "morphological_phenomenon")]
    morphological_phenomenon: Phenomenon,
    /// surface or abstract.
    #[arg(short = 'r', long, alias = "representation_type")]
    representation_type: Representation,
    #[arg(long, alias = "include_augmented_examples", default_value_t = false)]
    include_augmented_examples: bool,
    #[arg(long, alias = "evaluate_by_freq_buckets", default_value_t = false)]
    evaluate_by_freq_buckets: bool,
    /// How input files are loaded: mmap or owned.
    #[arg(
        long,
        env = "MORPH_EVAL_LOAD_MODE",
        default_value = "mmap",
        value_parser = parse_load_mode
    )]
    load_mode: LoadMode,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EvalConfig {
        phenomenon: cli.morphological_phenomenon,
        representation: cli.representation_type,
        include_augmented: cli.include_augmented_examples,
        by_freq_bucket: cli.evaluate_by_freq_buckets,
    };
    info!(
        "evaluating {} ({}) with {:?} buffers",
        config.phenomenon, config.representation, cli.load_mode
    );

    let start = Instant::now();
    let paths = InputPaths::new(cli.translations, cli.meta_info, cli.scores);
    let inputs = EvalInputs::load_with_mode(&paths, cli.load_mode)
        .context("failed to load evaluation inputs")?;
    info!("inputs loaded in {} ms", start.elapsed().as_millis());

    let eval_start = Instant::now();
    let evaluation = evaluate(config, inputs.triples())?;
    let stats = evaluation.stats;
    info!(
        seen = stats.seen,
        evaluated = stats.evaluated,
        accurate = stats.accurate,
        skipped_augmented = stats.skipped_augmented,
        skipped_representation = stats.skipped_representation,
        skipped_frequency = stats.skipped_frequency,
        "evaluated in {} ms",
        eval_start.elapsed().as_millis()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &evaluation.tally, &config).context("failed to write results")?;
    out.flush()?;
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::from_name(raw)
        .ok_or_else(|| format!("unknown load mode `{raw}` (expected mmap or owned)"))
}

/// Diagnostics go to stderr; `RUST_LOG` directives apply per target.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
