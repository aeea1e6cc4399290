use std::fmt;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::array::BooleanArray;
use crate::array::IntegerArray;
use crate::range::Range;
use crate::tuple::ExpandOpts;
use crate::tuple::Tuple;

/// Errors raised while constructing an index value. These depend only
/// on the value itself, never on a shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("range step cannot be zero")]
    ZeroStep,

    #[error("an index can only have a single ellipsis")]
    MultipleEllipses,

    #[error("array of {len} elements cannot have shape {shape:?}")]
    ArrayShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("tuples cannot contain tuples")]
    NestedTuple,

    #[error("chunk size of axis {axis} must be positive")]
    ZeroChunkSize { axis: usize },
}

/// Errors raised by operations that apply an index to a shape or to
/// another index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error("index {index} is out of bounds for axis {axis} with size {size}")]
    OutOfBounds {
        index: isize,
        axis: usize,
        size: usize,
    },

    #[error("too many indices: index consumes {num_indices} axes but shape has {num_dim}")]
    TooManyIndices { num_indices: usize, num_dim: usize },

    #[error("axis count mismatch: expected {expected}, got {actual}")]
    AxisCountMismatch { expected: usize, actual: usize },

    #[error("boolean index at axis {axis} has shape {actual:?}, but the indexed axes are {expected:?}")]
    BooleanShapeMismatch {
        axis: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("shape mismatch: {lhs:?} and {rhs:?} cannot be broadcast together")]
    Broadcast { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("{op} is not supported for `{index}`")]
    Unsupported { op: &'static str, index: Index },
}

/// An index into an n-dimensional array.
///
/// Indices are plain values: constructing one never consults a shape,
/// and every operation returns a new value. Equality and hashing are
/// structural, so `0:10` and `0:10:1` compare unequal; reduce both
/// sides first to compare what they select.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumAsInner)]
pub enum Index {
    /// A single position along one axis. The axis is removed from the
    /// result.
    Integer(isize),
    /// A strided selection along one axis.
    Range(Range),
    /// Stands for as many full ranges as needed to cover the remaining
    /// axes.
    Ellipsis,
    /// Inserts a new axis of length 1 into the result.
    NewAxis,
    /// Explicit positions along one axis.
    IntegerArray(IntegerArray),
    /// A mask over as many axes as it has dimensions.
    BooleanArray(BooleanArray),
    /// One index per axis.
    Tuple(Tuple),
}

impl Index {
    /// The number of axes of the indexed array this index consumes.
    pub(crate) fn num_axes(&self) -> usize {
        match self {
            Index::Integer(_) | Index::Range(_) | Index::IntegerArray(_) => 1,
            Index::BooleanArray(mask) => mask.ndim(),
            Index::Ellipsis | Index::NewAxis => 0,
            Index::Tuple(tuple) => tuple.entries().iter().map(Index::num_axes).sum(),
        }
    }

    pub(crate) fn is_array(&self) -> bool {
        matches!(self, Index::IntegerArray(_) | Index::BooleanArray(_))
    }

    /// Canonicalizes this index without reference to a shape. Ranges
    /// are reduced to their canonical form; tuples are reduced entry by
    /// entry, lose a redundant trailing ellipsis, and collapse to their
    /// only entry when they have one.
    pub fn reduce(&self) -> Index {
        match self {
            Index::Range(range) => Index::Range(range.reduce()),
            Index::Tuple(tuple) => tuple.reduce(),
            other => other.clone(),
        }
    }

    /// Canonicalizes this index against `shape`.
    ///
    /// Integers and ranges are normalized against the axis they index.
    /// Tuples are expanded, lose any trailing full ranges, and collapse
    /// to their only entry when they have one.
    pub fn reduce_with(&self, shape: &[usize]) -> Result<Index, IndexError> {
        match self {
            Index::Tuple(tuple) => tuple.reduce_with(shape),
            Index::Ellipsis | Index::NewAxis => {
                self.expand(shape)?;
                Ok(self.clone())
            }
            _ => {
                let expanded = self.expand(shape)?;
                Ok(expanded
                    .entries()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| self.clone()))
            }
        }
    }

    /// Expands this index against `shape` into a tuple with one entry
    /// per axis, plus any new axes.
    pub fn expand(&self, shape: &[usize]) -> Result<Tuple, IndexError> {
        Tuple::from(self.clone()).expand(shape)
    }

    /// The shape of the result of indexing an array of `shape` by this
    /// index.
    pub fn newshape(&self, shape: &[usize]) -> Result<Vec<usize>, IndexError> {
        Tuple::from(self.clone()).newshape(shape)
    }

    /// True if this index selects nothing from an array of any shape.
    /// A false result only means emptiness depends on the shape.
    pub fn is_empty(&self) -> bool {
        match self {
            Index::Integer(_) | Index::Ellipsis | Index::NewAxis => false,
            Index::Range(range) => range.is_empty(),
            Index::IntegerArray(array) => array.size() == 0,
            Index::BooleanArray(mask) => mask.count() == 0,
            Index::Tuple(tuple) => tuple.entries().iter().any(Index::is_empty),
        }
    }

    /// True if this index selects nothing from an array of `shape`.
    pub fn is_empty_with(&self, shape: &[usize]) -> Result<bool, IndexError> {
        Ok(self.newshape(shape)?.contains(&0))
    }

    /// True if indexing an array of `shape` by this index succeeds,
    /// including bound checks on integer arrays.
    pub fn is_valid(&self, shape: &[usize]) -> bool {
        Tuple::from(self.clone())
            .newshape_with(&ExpandOpts::strict(), shape)
            .is_ok()
    }

    /// Replaces the coordinate arrays of this index with integer arrays
    /// of their common broadcast shape. Boolean masks turn into one
    /// integer array per axis they cover.
    pub fn broadcast_arrays(&self) -> Result<Index, IndexError> {
        let broadcast = Tuple::from(self.clone()).broadcast_arrays()?;
        match self {
            Index::Tuple(_) => Ok(Index::Tuple(broadcast)),
            _ => Ok(broadcast.into_single()),
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Integer(i) => write!(f, "{}", i),
            Index::Range(range) => write!(f, "{}", range),
            Index::Ellipsis => write!(f, "..."),
            Index::NewAxis => write!(f, "newaxis"),
            Index::IntegerArray(array) => fmt_array(f, array.data(), array.shape()),
            Index::BooleanArray(mask) => fmt_array(f, mask.data(), mask.shape()),
            Index::Tuple(tuple) => write!(f, "{}", tuple),
        }
    }
}

fn fmt_array<T: fmt::Display>(f: &mut fmt::Formatter<'_>, data: &[T], shape: &[usize]) -> fmt::Result {
    write!(f, "[{}]", data.iter().join(", "))?;
    if shape.len() != 1 {
        write!(f, " (shape {:?})", shape)?;
    }
    Ok(())
}

impl From<isize> for Index {
    fn from(index: isize) -> Self {
        Index::Integer(index)
    }
}

/// A zero-dimensional mask.
impl From<bool> for Index {
    fn from(value: bool) -> Self {
        Index::BooleanArray(BooleanArray::scalar(value))
    }
}

impl From<Vec<isize>> for Index {
    fn from(data: Vec<isize>) -> Self {
        Index::IntegerArray(IntegerArray::from_vec(data))
    }
}

impl From<Vec<bool>> for Index {
    fn from(data: Vec<bool>) -> Self {
        Index::BooleanArray(BooleanArray::from_vec(data))
    }
}

impl From<Range> for Index {
    fn from(range: Range) -> Self {
        Index::Range(range)
    }
}

impl From<IntegerArray> for Index {
    fn from(array: IntegerArray) -> Self {
        Index::IntegerArray(array)
    }
}

impl From<BooleanArray> for Index {
    fn from(mask: BooleanArray) -> Self {
        Index::BooleanArray(mask)
    }
}

impl From<Tuple> for Index {
    fn from(tuple: Tuple) -> Self {
        Index::Tuple(tuple)
    }
}

impl From<std::ops::Range<isize>> for Index {
    fn from(range: std::ops::Range<isize>) -> Self {
        Index::Range(range.into())
    }
}

impl From<std::ops::RangeInclusive<isize>> for Index {
    fn from(range: std::ops::RangeInclusive<isize>) -> Self {
        Index::Range(range.into())
    }
}

impl From<std::ops::RangeFrom<isize>> for Index {
    fn from(range: std::ops::RangeFrom<isize>) -> Self {
        Index::Range(range.into())
    }
}

impl From<std::ops::RangeTo<isize>> for Index {
    fn from(range: std::ops::RangeTo<isize>) -> Self {
        Index::Range(range.into())
    }
}

impl From<std::ops::RangeFull> for Index {
    fn from(range: std::ops::RangeFull) -> Self {
        Index::Range(range.into())
    }
}

// Index values are shared freely between threads.
fn _assert_index_traits()
where
    Index: Send + Sync + 'static,
    Range: Send + Sync + 'static,
    Tuple: Send + Sync + 'static,
    IndexError: Send + Sync + 'static,
{
}
