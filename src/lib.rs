pub mod config;
pub mod dictionary;
pub mod error;
pub mod eval;
pub mod mapping;
pub mod space;

pub use config::{EvalConfig, MappingSource};
pub use error::{Result, TmevalError};
pub use eval::{EvalInputs, EvaluationHarness};
pub use space::{SpaceLoader, VectorSpace};
