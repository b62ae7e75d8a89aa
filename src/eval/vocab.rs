//! Restrict test pairs to words both spaces can represent.

use crate::dictionary::TestPairs;
use crate::space::VectorSpace;

/// How many requested test source words survived the vocabulary filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    /// Distinct source words considered (capped at `needed`).
    pub requested: usize,
    /// Source words kept: in the source space with at least one target in the target space.
    pub covered: usize,
}

impl CoverageStats {
    pub fn coverage(&self) -> f32 {
        if self.requested == 0 {
            0.0
        } else {
            self.covered as f32 / self.requested as f32
        }
    }
}

/// Keep pairs whose source word is in `source` and target word is in `target`,
/// up to `needed` source words.
pub fn filter_in_vocabulary(
    source: &VectorSpace,
    target: &VectorSpace,
    pairs: &TestPairs,
    needed: usize,
) -> (TestPairs, CoverageStats) {
    let mut filtered = TestPairs::new();
    let mut requested = 0usize;
    for (src, targets) in pairs.iter() {
        if filtered.len() >= needed {
            break;
        }
        requested += 1;
        if !source.contains(src) {
            continue;
        }
        for tgt in targets.iter().filter(|t| target.contains(t)) {
            filtered.insert(src, tgt);
        }
    }
    let stats = CoverageStats {
        requested: requested.min(needed),
        covered: filtered.len(),
    };
    log::info!(
        "{} of {} test source words are in vocabulary ({:.1}%)",
        stats.covered,
        stats.requested,
        stats.coverage() * 100.0
    );
    (filtered, stats)
}
