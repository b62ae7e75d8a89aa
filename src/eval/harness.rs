//! Evaluation of a translation matrix on held-out word pairs.
//!
//! Only the test words (plus optional additional elements) are loaded from the
//! source space; the whole target space is the search space.

use crate::config::{EvalConfig, MappingSource, NEEDED_PAIRS, SAMPLING_SEED, SOURCE_MAX_ROWS};
use crate::dictionary::{read_test_pairs, TestPairs};
use crate::error::{Result, TmevalError};
use crate::eval::metrics::{score_translation_accuracy, AccuracyReport};
use crate::eval::vocab::filter_in_vocabulary;
use crate::mapping::{apply_mapping, MappingStore, TrainedMapping};
use crate::space::{read_vocabulary, write_mapped_vectors, SpaceLoader, VectorSpace};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// The three input files of an evaluation run.
#[derive(Debug, Clone)]
pub struct EvalInputs {
    /// Word-pair dictionary with the test translations.
    pub seed_fn: PathBuf,
    /// Source language vectors.
    pub source_fn: PathBuf,
    /// Target language vectors.
    pub target_fn: PathBuf,
}

pub struct EvaluationHarness {
    config: EvalConfig,
}

impl EvaluationHarness {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Resolve the translation matrix and the words it was trained on.
    pub fn load_mapping(&self, inputs: &EvalInputs) -> Result<TrainedMapping> {
        match &self.config.mapping {
            MappingSource::Direct(mapping) => {
                if mapping.train_words.is_empty() {
                    return Err(TmevalError::AmbiguousMapping(
                        "translation matrix or training words unspecified".to_string(),
                    ));
                }
                Ok(mapping.clone())
            }
            MappingSource::Persisted(mx_path) => MappingStore::resolve(
                mx_path,
                &inputs.seed_fn,
                &inputs.source_fn,
                &inputs.target_fn,
            )
            .load(),
        }
    }

    /// Load the source vectors needed for evaluation: the test source words, plus
    /// `additional` words sampled from the rest of the vocabulary when requested.
    /// The result is normalized.
    ///
    /// Also returns the number of additional words actually sampled (`None` when
    /// none were requested); that count, not the requested one, selects GC retrieval.
    pub fn build_source_space(
        &self,
        source_fn: &Path,
        test_pairs: &TestPairs,
    ) -> Result<(VectorSpace, Option<usize>)> {
        let source_words = test_pairs.source_words();
        let (lexicon, sampled_count) = match self.config.additional {
            Some(additional) => {
                let vocabulary = read_vocabulary(source_fn)?;
                let sampled = sample_additional(&vocabulary, &source_words, additional);
                if sampled.len() < additional {
                    log::warn!(
                        "Requested {} additional elements, only {} available",
                        additional,
                        sampled.len()
                    );
                }
                log::info!("Sampling {} additional elements", sampled.len());
                let count = sampled.len();
                (source_words.into_iter().chain(sampled).collect(), Some(count))
            }
            None => (source_words, None),
        };

        let mut space = SpaceLoader::new()
            .lexicon(&lexicon)
            .max_rows(SOURCE_MAX_ROWS)
            .build(source_fn)?;
        space.normalize();
        Ok((space, sampled_count))
    }

    pub fn evaluate(&self, inputs: &EvalInputs) -> Result<AccuracyReport> {
        let mapping = self.load_mapping(inputs)?;

        log::info!(
            "The denominator of precision {} OOV words",
            if self.config.coverage {
                "includes"
            } else {
                "doesn't include"
            }
        );
        let needed = self.config.coverage.then_some(NEEDED_PAIRS);
        let test_pairs = read_test_pairs(
            &inputs.seed_fn,
            self.config.reverse,
            needed,
            &mapping.train_words,
        )?;

        let (source, additional) = self.build_source_space(&inputs.source_fn, &test_pairs)?;

        let mut target = SpaceLoader::new().build(&inputs.target_fn)?;
        target.normalize();

        let (test_pairs, stats) = filter_in_vocabulary(&source, &target, &test_pairs, NEEDED_PAIRS);

        if mapping.matrix.output_dim() != target.dim() {
            return Err(TmevalError::DimensionMismatch {
                expected: target.dim(),
                found: mapping.matrix.output_dim(),
            });
        }
        log::info!("Mapping all the elements loaded in the source space");
        let mapped = apply_mapping(&source, &mapping.matrix)?;

        if let Some(prefix) = &self.config.mapped_vecs {
            log::info!("Printing mapped vectors: {}", prefix.display());
            write_mapped_vectors(&mapped, prefix)?;
        }

        let denominator = if self.config.coverage {
            stats.requested
        } else {
            stats.covered
        };
        score_translation_accuracy(
            &mapped,
            &target,
            &test_pairs,
            additional,
            denominator,
            &self.config.precision_at,
        )
    }
}

/// Deterministically sample up to `requested` words of `vocabulary` outside `base`.
///
/// At most `|vocabulary| - |base|` words are returned, never a base word.
pub fn sample_additional(
    vocabulary: &BTreeSet<String>,
    base: &HashSet<String>,
    requested: usize,
) -> Vec<String> {
    let candidates: Vec<&String> = vocabulary.iter().filter(|w| !base.contains(*w)).collect();
    let count = requested
        .min(vocabulary.len().saturating_sub(base.len()))
        .min(candidates.len());
    let mut rng = ChaCha8Rng::seed_from_u64(SAMPLING_SEED);
    candidates
        .choose_multiple(&mut rng, count)
        .map(|w| (*w).clone())
        .collect()
}
