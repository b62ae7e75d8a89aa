//! Evaluation framework: in-vocabulary filtering, Top-N accuracy with optional
//! globally corrected retrieval, and the end-to-end harness.

pub mod harness;
pub mod metrics;
pub mod vocab;

pub use harness::{sample_additional, EvalInputs, EvaluationHarness};
pub use metrics::{
    mean_reciprocal_rank, precision_at_k, score_translation_accuracy, AccuracyReport, Retrieval,
};
pub use vocab::{filter_in_vocabulary, CoverageStats};
