use crate::error::{Result, TmevalError};
use ndarray::{s, Array2, ArrayView1};
use std::collections::HashMap;

/// A word embedding space: a dense matrix whose row `i` is the vector of `id2word[i]`.
///
/// `word2id` is built once at construction and is always the inverse of `id2word`.
/// The only mutation after construction is [`VectorSpace::normalize`], which rescales
/// rows in place and never touches the vocabulary.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    matrix: Array2<f64>,
    id2word: Vec<String>,
    word2id: HashMap<String, usize>,
}

impl VectorSpace {
    /// Build a space from a matrix and its row labels.
    ///
    /// Fails with `DuplicateWord` if a word occurs twice, and with `InvalidInput`
    /// if the number of words and the number of rows differ.
    pub fn new(matrix: Array2<f64>, id2word: Vec<String>) -> Result<Self> {
        if matrix.nrows() != id2word.len() {
            return Err(TmevalError::InvalidInput(format!(
                "{} words for a matrix of {} rows",
                id2word.len(),
                matrix.nrows()
            )));
        }
        let word2id = create_word2id(&id2word)?;
        Ok(Self {
            matrix,
            id2word,
            word2id,
        })
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn id2word(&self) -> &[String] {
        &self.id2word
    }

    pub fn word2id(&self) -> &HashMap<String, usize> {
        &self.word2id
    }

    /// Row index of `word`, if it is in the vocabulary.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.word2id.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word2id.contains_key(word)
    }

    /// Number of words (rows).
    pub fn len(&self) -> usize {
        self.id2word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2word.is_empty()
    }

    /// Dimensionality (columns).
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.matrix.row(index)
    }

    /// Vector of `word`, if present.
    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f64>> {
        self.index_of(word).map(|i| self.matrix.row(i))
    }

    /// Same vocabulary and row order, new coordinates.
    pub fn with_matrix(&self, matrix: Array2<f64>) -> Result<Self> {
        if matrix.nrows() != self.len() {
            return Err(TmevalError::DimensionMismatch {
                expected: self.len(),
                found: matrix.nrows(),
            });
        }
        Ok(Self {
            matrix,
            id2word: self.id2word.clone(),
            word2id: self.word2id.clone(),
        })
    }

    /// Keep only the first `max_rows` rows and their words.
    pub fn truncate(&mut self, max_rows: usize) {
        if max_rows >= self.len() {
            return;
        }
        self.matrix = self.matrix.slice(s![..max_rows, ..]).to_owned();
        for word in self.id2word.drain(max_rows..) {
            self.word2id.remove(&word);
        }
    }

    /// Scale every row to unit Euclidean norm. Zero rows are left as they are.
    pub fn normalize(&mut self) {
        for mut row in self.matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm != 0.0 {
                row.mapv_inplace(|x| x / norm);
            }
        }
    }
}

fn create_word2id(id2word: &[String]) -> Result<HashMap<String, usize>> {
    let mut word2id = HashMap::with_capacity(id2word.len());
    for (idx, word) in id2word.iter().enumerate() {
        if word2id.insert(word.clone(), idx).is_some() {
            return Err(TmevalError::DuplicateWord(word.clone()));
        }
    }
    Ok(word2id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn word2id_is_inverse_of_id2word() {
        let m = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let space = VectorSpace::new(m, words(&["a", "b", "c"])).unwrap();
        assert_eq!(space.word2id().len(), 3);
        assert_eq!(space.len(), space.matrix().nrows());
        for (i, w) in space.id2word().iter().enumerate() {
            assert_eq!(space.index_of(w), Some(i));
        }
        assert!(space.index_of("d").is_none());
    }

    #[test]
    fn duplicate_word_fails_wherever_it_occurs() {
        for list in [["x", "x", "y"], ["x", "y", "x"], ["y", "x", "x"]] {
            let m = Array2::zeros((3, 2));
            let err = VectorSpace::new(m, words(&list)).unwrap_err();
            assert!(matches!(err, TmevalError::DuplicateWord(ref w) if w == "x"));
        }
    }

    #[test]
    fn row_count_must_match_vocabulary() {
        let m = Array2::zeros((2, 2));
        let err = VectorSpace::new(m, words(&["a"])).unwrap_err();
        assert!(matches!(err, TmevalError::InvalidInput(_)));
    }

    #[test]
    fn normalize_scales_rows_and_keeps_zero_rows() {
        let m = array![[3.0, 4.0], [0.0, 0.0], [0.0, 2.0]];
        let mut space = VectorSpace::new(m, words(&["a", "zero", "c"])).unwrap();
        space.normalize();
        assert!((space.row(0)[0] - 0.6).abs() < 1e-9);
        assert!((space.row(0)[1] - 0.8).abs() < 1e-9);
        assert_eq!(space.row(1).to_vec(), vec![0.0, 0.0]);
        assert_eq!(space.row(2).to_vec(), vec![0.0, 1.0]);
        assert!(space.matrix().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let m = array![[1.0, 2.0, 2.0], [0.5, -0.5, 0.0]];
        let mut space = VectorSpace::new(m, words(&["a", "b"])).unwrap();
        space.normalize();
        let once = space.matrix().clone();
        space.normalize();
        for (a, b) in once.iter().zip(space.matrix().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert_eq!(space.id2word(), &words(&["a", "b"])[..]);
    }

    #[test]
    fn truncate_keeps_rows_and_words_in_lockstep() {
        let m = array![[1.0], [2.0], [3.0]];
        let mut space = VectorSpace::new(m, words(&["a", "b", "c"])).unwrap();
        space.truncate(2);
        assert_eq!(space.len(), 2);
        assert_eq!(space.matrix().nrows(), 2);
        assert_eq!(space.id2word(), &words(&["a", "b"])[..]);
        assert!(!space.contains("c"));
        assert_eq!(space.vector("b").unwrap()[0], 2.0);
    }

    #[test]
    fn with_matrix_keeps_vocabulary() {
        let space = VectorSpace::new(array![[1.0, 0.0], [0.0, 1.0]], words(&["a", "b"])).unwrap();
        let moved = space.with_matrix(array![[5.0], [6.0]]).unwrap();
        assert_eq!(moved.id2word(), space.id2word());
        assert_eq!(moved.dim(), 1);
        assert!(space.with_matrix(array![[1.0]]).is_err());
    }
}
