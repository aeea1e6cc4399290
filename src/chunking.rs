//! Regular chunk grids over an array.

use itertools::izip;
use itertools::Either;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::index::ConstructionError;
use crate::index::Index;
use crate::index::IndexError;
use crate::range::Range;
use crate::tuple::Tuple;

/// The shape of the chunks of a regular grid. Chunks at the far edge of
/// an axis are clipped to the array, so they may be smaller.
///
/// ```
/// use ndindex::ChunkSize;
/// let chunks = ChunkSize::new(vec![10, 10]).unwrap();
/// assert_eq!(chunks.num_chunks(&[25, 30]).unwrap(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ChunkSize(Vec<usize>);

impl ChunkSize {
    /// Creates a chunk size. Every dimension must be positive.
    pub fn new(dims: Vec<usize>) -> Result<Self, ConstructionError> {
        if let Some(axis) = dims.iter().position(|&dim| dim == 0) {
            return Err(ConstructionError::ZeroChunkSize { axis });
        }
        Ok(Self(dims))
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    pub fn args(&self) -> Vec<usize> {
        self.0.clone()
    }

    fn check_rank(&self, shape: &[usize]) -> Result<(), IndexError> {
        if shape.len() != self.ndim() {
            return Err(IndexError::AxisCountMismatch {
                expected: self.ndim(),
                actual: shape.len(),
            });
        }
        Ok(())
    }

    /// The number of chunks covering an array of `shape`.
    pub fn num_chunks(&self, shape: &[usize]) -> Result<usize, IndexError> {
        self.check_rank(shape)?;
        Ok(izip!(shape, &self.0)
            .map(|(&size, &chunk)| size.div_ceil(chunk))
            .product())
    }

    /// The chunks along one axis, in order.
    fn axis_chunks(size: usize, chunk: usize) -> impl Iterator<Item = Range> {
        (0..size).step_by(chunk).map(move |start| {
            let stop = (start + chunk).min(size);
            Range::from(start as isize..stop as isize).reduce()
        })
    }

    /// Every chunk of an array of `shape`, in row-major order, each as a
    /// tuple of reduced ranges.
    pub fn indices(&self, shape: &[usize]) -> Result<impl Iterator<Item = Tuple>, IndexError> {
        self.check_rank(shape)?;
        let axes = izip!(shape, &self.0)
            .map(|(&size, &chunk)| Self::axis_chunks(size, chunk).map(Index::Range).collect())
            .collect();
        Ok(grid(axes))
    }

    /// The chunks of an array of `shape` that `index` selects at least
    /// one element from, in row-major order.
    ///
    /// Only integers, ranges, ellipses and new axes are supported.
    pub fn as_subchunks(
        &self,
        index: &Index,
        shape: &[usize],
    ) -> Result<impl Iterator<Item = Tuple>, IndexError> {
        self.check_rank(shape)?;
        let expanded = index.expand(shape)?;
        if expanded.entries().iter().any(Index::is_array) {
            return Err(IndexError::Unsupported {
                op: "as_subchunks",
                index: index.clone(),
            });
        }

        let per_axis = expanded.entries().iter().filter(|entry| !entry.is_new_axis());
        let mut axes = Vec::with_capacity(shape.len());
        for (entry, &size, &chunk) in izip!(per_axis, shape, &self.0) {
            let entry = ascending(entry, size)?;
            let mut hits = Vec::new();
            for chunk in Self::axis_chunks(size, chunk) {
                let chunk = Index::Range(chunk);
                if !entry.as_subindex(&chunk)?.is_empty() {
                    hits.push(chunk);
                }
            }
            axes.push(hits);
        }
        tracing::trace!(
            %index,
            ?shape,
            chunks = ?axes.iter().map(Vec::len).collect::<Vec<_>>(),
            "as_subchunks"
        );
        Ok(grid(axes))
    }
}

/// The same positions as an expanded entry, visited in increasing
/// order.
fn ascending(entry: &Index, size: usize) -> Result<Index, IndexError> {
    match entry {
        Index::Range(range) if range.stride() < 0 => {
            let len = range.len_with(size) as isize;
            let start = range.start().unwrap_or(0);
            let step = range.stride();
            let last = start + (len - 1) * step;
            Ok(Index::Range(Range::new(Some(last), Some(start + 1), Some(-step))?))
        }
        other => Ok(other.clone()),
    }
}

/// All combinations of one entry per axis, in row-major order.
fn grid(axes: Vec<Vec<Index>>) -> impl Iterator<Item = Tuple> {
    if axes.is_empty() {
        return Either::Left(std::iter::once(Tuple::default()));
    }
    Either::Right(
        axes.into_iter()
            .multi_cartesian_product()
            .map(Tuple),
    )
}

impl TryFrom<Vec<usize>> for ChunkSize {
    type Error = ConstructionError;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(dims)
    }
}

impl From<ChunkSize> for Vec<usize> {
    fn from(chunks: ChunkSize) -> Self {
        chunks.0
    }
}
