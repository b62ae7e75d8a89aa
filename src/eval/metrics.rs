//! Nearest-neighbour translation retrieval and Top-N accuracy.
//!
//! Every mapped source vector is compared against every target vector by cosine.
//! Standard retrieval ranks targets by descending cosine. Globally corrected (GC)
//! retrieval first ranks, for each target, all loaded source vectors (test words plus
//! additional ones), then ranks targets for a source by ascending
//! `rank(target -> source) - cosine`; the cosine only breaks rank ties. The
//! additional source vectors make those ranks meaningful and push down "hub"
//! targets that are close to everything.

use crate::dictionary::TestPairs;
use crate::error::{Result, TmevalError};
use crate::space::VectorSpace;
use ndarray::{s, Array2};
use std::cmp::Ordering;

/// Target rows scored per matrix product.
const TARGET_BLOCK: usize = 4096;

/// Default cut-offs reported as `Prec@k`.
pub const DEFAULT_PRECISION_AT: [usize; 3] = [1, 5, 10];

/// How candidate targets are ordered for a source word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    Standard,
    GloballyCorrected,
}

impl Retrieval {
    /// GC retrieval is used whenever additional source elements were requested.
    pub fn for_additional(additional: Option<usize>) -> Self {
        match additional {
            Some(n) if n > 0 => Retrieval::GloballyCorrected,
            _ => Retrieval::Standard,
        }
    }
}

/// Outcome of scoring one mapped source space against a target space.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    /// `(k, Prec@k)` in the order requested.
    pub precision_at: Vec<(usize, f32)>,
    /// Mean reciprocal rank of the first correct translation.
    pub mrr: f32,
    /// 1-based rank of the first gold translation per scored source word.
    pub ranks: Vec<(String, usize)>,
    /// Top retrieved target word per scored source word.
    pub translations: Vec<(String, String)>,
    /// Denominator of every precision value.
    pub denominator: usize,
}

impl AccuracyReport {
    pub fn precision(&self, k: usize) -> Option<f32> {
        self.precision_at
            .iter()
            .find(|(kk, _)| *kk == k)
            .map(|(_, p)| *p)
    }
}

/// Fraction of test words whose first correct translation is ranked within `k`.
/// Returns 0.0 for a zero denominator.
pub fn precision_at_k(ranks: &[usize], denominator: usize, k: usize) -> f32 {
    if denominator == 0 {
        return 0.0;
    }
    let hits = ranks.iter().filter(|&&r| r <= k).count();
    hits as f32 / denominator as f32
}

/// Average of 1/rank over `denominator` test words (unscored words add 0).
pub fn mean_reciprocal_rank(ranks: &[usize], denominator: usize) -> f32 {
    if denominator == 0 {
        return 0.0;
    }
    let sum: f32 = ranks.iter().map(|&r| 1.0 / r as f32).sum();
    sum / denominator as f32
}

/// Score translations of the test words in `mapped` against `target`.
///
/// * `mapped` - mapped source space; rows are normalized here
/// * `target` - normalized target space (the search space)
/// * `pairs` - in-vocabulary test pairs
/// * `additional` - when set, GC retrieval is used
/// * `denominator` - number of test words precision is computed over
/// * `ks` - precision cut-offs
pub fn score_translation_accuracy(
    mapped: &VectorSpace,
    target: &VectorSpace,
    pairs: &TestPairs,
    additional: Option<usize>,
    denominator: usize,
    ks: &[usize],
) -> Result<AccuracyReport> {
    if mapped.dim() != target.dim() {
        return Err(TmevalError::DimensionMismatch {
            expected: target.dim(),
            found: mapped.dim(),
        });
    }
    let mut mapped = mapped.clone();
    mapped.normalize();

    let retrieval = Retrieval::for_additional(additional);
    let queries = TestQueries::new(&mapped, target, pairs);
    log::info!(
        "Scoring {} test words against {} targets ({:?} retrieval, {} source elements)",
        queries.columns.len(),
        target.len(),
        retrieval,
        mapped.len()
    );

    let scorer = Scorer {
        mapped: &mapped,
        target,
        retrieval,
    };
    let outcome = scorer.rank(&queries);

    let mut ranks = Vec::with_capacity(queries.columns.len());
    let mut translations = Vec::with_capacity(queries.columns.len());
    for (q, &col) in queries.columns.iter().enumerate() {
        let word = mapped.id2word()[col].clone();
        if let Some(best) = outcome.best[q] {
            translations.push((word.clone(), target.id2word()[best].clone()));
        }
        if let Some(rank) = outcome.ranks[q] {
            log::debug!("{} -> rank {}", word, rank);
            ranks.push((word, rank));
        }
    }

    let raw: Vec<usize> = ranks.iter().map(|(_, r)| *r).collect();
    let precision_at: Vec<(usize, f32)> = ks
        .iter()
        .map(|&k| (k, precision_at_k(&raw, denominator, k)))
        .collect();
    for (k, p) in &precision_at {
        log::info!("Prec@{}: {:.3}", k, p);
    }

    Ok(AccuracyReport {
        precision_at,
        mrr: mean_reciprocal_rank(&raw, denominator),
        ranks,
        translations,
        denominator,
    })
}

/// Test words as source columns, with their gold targets as target rows.
struct TestQueries {
    columns: Vec<usize>,
    gold: Vec<Vec<usize>>,
}

impl TestQueries {
    fn new(mapped: &VectorSpace, target: &VectorSpace, pairs: &TestPairs) -> Self {
        let mut columns = Vec::new();
        let mut gold = Vec::new();
        for (source, targets) in pairs.iter() {
            if let Some(col) = mapped.index_of(source) {
                columns.push(col);
                gold.push(targets.iter().filter_map(|t| target.index_of(t)).collect());
            }
        }
        Self { columns, gold }
    }
}

struct RankOutcome {
    ranks: Vec<Option<usize>>,
    best: Vec<Option<usize>>,
}

struct Scorer<'a> {
    mapped: &'a VectorSpace,
    target: &'a VectorSpace,
    retrieval: Retrieval,
}

impl<'a> Scorer<'a> {
    /// Two passes over the target space: the first finds the best gold key per test
    /// word, the second counts targets ordered strictly before it.
    fn rank(&self, queries: &TestQueries) -> RankOutcome {
        let n = queries.columns.len();
        let mut gold_key = vec![f64::INFINITY; n];
        let mut gold_rows: Vec<(usize, usize)> = queries
            .gold
            .iter()
            .enumerate()
            .flat_map(|(q, rows)| rows.iter().map(move |&t| (t, q)))
            .collect();
        gold_rows.sort_unstable();

        let mut gi = 0;
        self.for_each_block(|start, sims| {
            let end = start + sims.nrows();
            while gi < gold_rows.len() && gold_rows[gi].0 < end {
                let (t, q) = gold_rows[gi];
                let row = sims.row(t - start).to_vec();
                let key = self.key(&row, queries.columns[q]);
                if key < gold_key[q] {
                    gold_key[q] = key;
                }
                gi += 1;
            }
        });

        let mut before = vec![0usize; n];
        let mut best: Vec<Option<(f64, usize)>> = vec![None; n];
        self.for_each_block(|start, sims| {
            for (offset, row) in sims.rows().into_iter().enumerate() {
                let row = row.to_vec();
                let source_ranks = self.source_ranks(&row);
                for (q, &col) in queries.columns.iter().enumerate() {
                    let key = key_with(&source_ranks, &row, col, self.retrieval);
                    if key < gold_key[q] {
                        before[q] += 1;
                    }
                    let improves = match best[q] {
                        Some((k, _)) => key < k,
                        None => true,
                    };
                    if improves {
                        best[q] = Some((key, start + offset));
                    }
                }
            }
        });

        RankOutcome {
            ranks: (0..n)
                .map(|q| gold_key[q].is_finite().then(|| before[q] + 1))
                .collect(),
            best: best.into_iter().map(|b| b.map(|(_, t)| t)).collect(),
        }
    }

    /// Cosines between a block of target rows and every source row.
    fn for_each_block(&self, mut f: impl FnMut(usize, &Array2<f64>)) {
        let targets = self.target.matrix();
        let sources_t = self.mapped.matrix().t();
        let mut start = 0;
        while start < targets.nrows() {
            let end = (start + TARGET_BLOCK).min(targets.nrows());
            let sims = targets.slice(s![start..end, ..]).dot(&sources_t);
            f(start, &sims);
            start = end;
        }
    }

    /// 0-based rank of every source for one target by descending cosine (only needed
    /// for GC retrieval). Equal cosines are ranked by source index, so ranks are distinct.
    fn source_ranks(&self, row: &[f64]) -> Vec<usize> {
        match self.retrieval {
            Retrieval::Standard => Vec::new(),
            Retrieval::GloballyCorrected => {
                let mut order: Vec<usize> = (0..row.len()).collect();
                // stable sort keeps index order among ties
                order.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(Ordering::Equal));
                let mut ranks = vec![0usize; row.len()];
                for (rank, source) in order.into_iter().enumerate() {
                    ranks[source] = rank;
                }
                ranks
            }
        }
    }

    fn key(&self, row: &[f64], col: usize) -> f64 {
        key_with(&self.source_ranks(row), row, col, self.retrieval)
    }
}

/// Sort key of a target for source `col`; lower is better.
fn key_with(source_ranks: &[usize], row: &[f64], col: usize, retrieval: Retrieval) -> f64 {
    let sim = row[col];
    match retrieval {
        Retrieval::Standard => -sim,
        Retrieval::GloballyCorrected => source_ranks[col] as f64 - sim,
    }
}
