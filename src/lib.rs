//! Indices into n-dimensional arrays, as values.
//!
//! Provides [`Index`], a description of what an indexing expression
//! such as `a[0, ..., 1:10:2, newaxis]` selects from an array, and the
//! arithmetic to reason about it without any array at hand:
//! canonicalizing ([`Index::reduce`]), expanding against a shape
//! ([`Index::expand`]), inferring result shapes ([`Index::newshape`]),
//! broadcasting coordinate arrays ([`broadcast()`]) and re-expressing one
//! index in the coordinates of another ([`Index::as_subindex`]), which
//! [`ChunkSize`] builds on to map indices onto chunk grids.
//!
//! The central piece is [`Range::reduce`]: two ranges select the same
//! elements from every axis exactly when their reductions are equal.
//!
//! ```
//! use ndindex::Index;
//! use ndindex::Range;
//!
//! let a = Range::new(Some(2), Some(5), Some(3)).unwrap();
//! let b = Range::new(Some(2), Some(4), Some(3)).unwrap();
//! assert_eq!(a.reduce(), b.reduce());
//!
//! let index = ndindex::tuple![0, Index::Ellipsis, 0..5].unwrap();
//! assert_eq!(index.newshape(&[10, 10, 10]).unwrap(), vec![10, 5]);
//! ```

/// Integer and boolean coordinate arrays.
pub mod array;

/// Broadcasting of coordinate arrays.
pub mod broadcast;

/// Regular chunk grids.
pub mod chunking;

/// The [`Index`] enum and the errors of this crate.
pub mod index;

/// Strided ranges and their canonical forms.
pub mod range;

/// Native representations of indices.
pub mod raw;

mod subindex;

/// Multi-axis indices: expansion and shape inference.
pub mod tuple;

#[cfg(test)]
mod test_utils;

/// Boolean masks used as indices.
pub use array::BooleanArray;
/// Integer coordinate arrays used as indices.
pub use array::IntegerArray;
pub use broadcast::broadcast;
pub use broadcast::broadcast_shapes;
pub use broadcast::Broadcast;
/// Shapes of regular chunk grids.
pub use chunking::ChunkSize;
/// Errors raised when constructing index values.
pub use index::ConstructionError;
pub use index::Index;
/// Errors raised when applying indices to shapes.
pub use index::IndexError;
pub use range::Range;
pub use range::RangeArgs;
pub use raw::RawIndex;
/// Validation policies for expansion.
pub use tuple::ExpandOpts;
pub use tuple::Tuple;
