//! Translation matrices: a linear map from a source embedding space into the
//! coordinate system of a target space.

pub mod store;

pub use store::{MappingStore, TrainedMapping};

use crate::error::{Result, TmevalError};
use crate::space::VectorSpace;
use ndarray::Array2;

/// Linear operator of shape `(source_dim, target_dim)`, applied to row vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationMatrix {
    matrix: Array2<f64>,
}

impl TranslationMatrix {
    pub fn new(matrix: Array2<f64>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Dimension of the vectors this mapping accepts.
    pub fn input_dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Dimension of the vectors this mapping produces.
    pub fn output_dim(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Project every row of `space` through `mapping`. Vocabulary and row order are kept.
pub fn apply_mapping(space: &VectorSpace, mapping: &TranslationMatrix) -> Result<VectorSpace> {
    if space.dim() != mapping.input_dim() {
        return Err(TmevalError::DimensionMismatch {
            expected: mapping.input_dim(),
            found: space.dim(),
        });
    }
    let mapped = space.matrix().dot(mapping.matrix());
    space.with_matrix(mapped)
}
