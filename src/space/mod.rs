//! Word embedding spaces: in-memory representation, file loader, and text dump.

pub mod export;
pub mod loader;
pub mod vector_space;

pub use export::write_mapped_vectors;
pub use loader::{read_vocabulary, SpaceLoader, UNFILTERED_LINE_CAP};
pub use vector_space::VectorSpace;
