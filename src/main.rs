//! Evaluation CLI: apply a translation matrix to source vectors and report Top-N accuracy.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use tmeval::config::FileConfig;
use tmeval::mapping::store::{read_matrix_file, read_word_list};
use tmeval::mapping::TrainedMapping;
use tmeval::{EvalConfig, EvalInputs, EvaluationHarness, MappingSource};

/// Given a translation matrix, test data (words and their translations) and source
/// and target language vectors, retrieve translations of the source test words and
/// compute Top N accuracy.
///
/// Example: "corrected" retrieval (GC) with 2000 additional source elements to
/// correct for hubs: tmeval --additional 2000 --mx-path tm test_wpairs.txt en.txt it.txt
#[derive(Parser, Debug)]
#[command(name = "tmeval")]
struct Args {
    /// Test dictionary: word pairs, space separated, one pair per line.
    seed_fn: PathBuf,

    /// Source language vectors: a "<name> <dim>" header, then a word and dim values per line.
    source_fn: PathBuf,

    /// Target language vectors, same format.
    target_fn: PathBuf,

    /// Persisted mapping: directory or base file name without extension.
    #[arg(long)]
    mx_path: Option<PathBuf>,

    /// Translation matrix JSON file to evaluate directly (requires --train-words).
    #[arg(long, requires = "train_words")]
    mapping: Option<PathBuf>,

    /// Words the direct mapping was trained on, one per line (excluded from testing).
    #[arg(long, requires = "mapping")]
    train_words: Option<PathBuf>,

    /// Swap the columns of the dictionary.
    #[arg(long)]
    reverse: bool,

    /// Number of elements (additional to test data) used with Global Correction (GC).
    #[arg(long)]
    additional: Option<usize>,

    /// Leave out-of-vocabulary test words out of the precision denominator.
    #[arg(long)]
    just_recall: bool,

    /// File prefix for the mapped vectors (.vecs.txt and .wds.txt).
    #[arg(long)]
    mapped_vecs: Option<PathBuf>,

    /// Write the log to this file instead of stderr.
    #[arg(short = 'o', long = "log-file")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let defaults = FileConfig::load()?.eval;

    let direct = match (&args.mapping, &args.train_words) {
        (Some(mx), Some(words)) => Some(TrainedMapping {
            matrix: read_matrix_file(mx)
                .with_context(|| format!("Failed to read mapping {}", mx.display()))?,
            train_words: read_word_list(words)
                .with_context(|| format!("Failed to read training words {}", words.display()))?,
        }),
        _ => None,
    };
    // a mapping file on the command line replaces the configured mapping path
    let mx_path = match (&args.mx_path, &direct) {
        (Some(path), _) => Some(path.clone()),
        (None, None) => defaults.mx_path.clone(),
        (None, Some(_)) => None,
    };
    let mapping = MappingSource::from_parts(direct, mx_path)?;

    let mut config = EvalConfig::new(mapping);
    config.reverse = args.reverse || defaults.reverse;
    config.additional = args.additional.or(defaults.additional);
    config.coverage = !args.just_recall && defaults.coverage;
    config.mapped_vecs = args.mapped_vecs.clone();
    config.precision_at = defaults.precision_at.clone();

    let inputs = EvalInputs {
        seed_fn: args.seed_fn,
        source_fn: args.source_fn,
        target_fn: args.target_fn,
    };

    let report = EvaluationHarness::new(config).evaluate(&inputs)?;

    println!("\n=== Translation Accuracy ===");
    println!("Test words:  {} scored / {} in denominator", report.ranks.len(), report.denominator);
    for (k, precision) in &report.precision_at {
        println!("Prec@{:<3}     {:.2}%", k, precision * 100.0);
    }
    println!("MRR:         {:.3}", report.mrr);

    Ok(())
}
