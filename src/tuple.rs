use std::fmt;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::array::normalize_position;
use crate::broadcast::advanced_shape;
use crate::broadcast::broadcast;
use crate::broadcast::broadcast_shapes;
use crate::index::ConstructionError;
use crate::index::Index;
use crate::index::IndexError;
use crate::range::Range;

/// Builds a [`Tuple`] from a list of values convertible into
/// [`Index`]. Native ranges become [`Range`]s, so use
/// [`Index::Ellipsis`] for `...`.
///
/// ```
/// use ndindex::Index;
/// let t = ndindex::tuple![0, Index::Ellipsis, 1..3, Index::NewAxis].unwrap();
/// assert_eq!(t.to_string(), "(0, ..., 1:3, newaxis)");
/// assert!(ndindex::tuple![Index::Ellipsis, Index::Ellipsis].is_err());
/// ```
#[macro_export]
macro_rules! tuple {
    ( $( $entry:expr ),* $(,)? ) => {
        $crate::Tuple::new(vec![ $( $crate::Index::from($entry) ),* ])
    };
}

/// `ExpandOpts` controls how strictly [`Tuple::expand_with`] validates
/// coordinate arrays.
#[derive(Debug, Clone, Default)]
pub struct ExpandOpts {
    /// Bound-check integer array entries against their axis and make
    /// them non-negative.
    pub check_array_bounds: bool,
}

impl ExpandOpts {
    // Integer arrays pass through unchecked.
    pub fn lenient() -> Self {
        Self {
            check_array_bounds: false,
        }
    }

    // Fail with the same errors as actually indexing an array would.
    pub fn strict() -> Self {
        Self {
            check_array_bounds: true,
        }
    }
}

/// A multi-axis index: one entry per axis, with at most one
/// [`Index::Ellipsis`] standing in for the axes not mentioned and any
/// number of [`Index::NewAxis`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Index>", into = "Vec<Index>")]
pub struct Tuple(pub(crate) Vec<Index>);

impl Tuple {
    /// Creates a tuple. Fails if `entries` holds more than one ellipsis
    /// or a nested tuple.
    pub fn new(entries: Vec<Index>) -> Result<Self, ConstructionError> {
        if entries.iter().any(Index::is_tuple) {
            return Err(ConstructionError::NestedTuple);
        }
        if entries.iter().filter(|entry| entry.is_ellipsis()).count() > 1 {
            return Err(ConstructionError::MultipleEllipses);
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[Index] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn args(&self) -> Vec<Index> {
        self.0.clone()
    }

    /// The only entry of a one-entry tuple, or the tuple itself.
    pub(crate) fn into_single(mut self) -> Index {
        match self.0.len() {
            1 => self.0.remove(0),
            _ => Index::Tuple(self),
        }
    }

    fn has_arrays(&self) -> bool {
        self.0.iter().any(Index::is_array)
    }

    /// Positions of the entries broadcast together as one block: the
    /// coordinate arrays, and the integers when there are arrays.
    fn advanced_positions(&self) -> Vec<usize> {
        if !self.has_arrays() {
            return Vec::new();
        }
        self.0
            .iter()
            .positions(|entry| entry.is_integer() || entry.is_array())
            .collect()
    }

    /// True unless some other entry, of whatever width, sits between
    /// two entries of the advanced block.
    fn advanced_is_contiguous(&self) -> bool {
        self.advanced_positions()
            .into_iter()
            .tuple_windows()
            .all(|(a, b)| b - a == 1)
    }

    /// Expands this tuple against `shape` with [`ExpandOpts::lenient`].
    pub fn expand(&self, shape: &[usize]) -> Result<Tuple, IndexError> {
        self.expand_with(&ExpandOpts::lenient(), shape)
    }

    /// Expands this tuple against `shape` into an explicit form with
    /// exactly one consuming entry per axis.
    ///
    /// The ellipsis, or the end of the tuple when there is none, is
    /// replaced by full ranges for the axes the other entries leave
    /// over. Integers are bound-checked and made non-negative, ranges
    /// are reduced against their axis, and boolean masks must match the
    /// axes they cover. New axes keep their position. Coordinate arrays
    /// are not broadcast.
    pub fn expand_with(&self, opts: &ExpandOpts, shape: &[usize]) -> Result<Tuple, IndexError> {
        let consumed: usize = self.0.iter().map(Index::num_axes).sum();
        if consumed > shape.len() {
            return Err(IndexError::TooManyIndices {
                num_indices: consumed,
                num_dim: shape.len(),
            });
        }
        let elided = shape.len() - consumed;

        let mut entries = Vec::with_capacity(self.0.len() + elided);
        let mut axis = 0;
        let full = |size: usize| Index::Range(Range::full().reduce_with(size));
        for entry in &self.0 {
            match entry {
                Index::Integer(i) => {
                    let i = normalize_position(*i, axis, shape[axis])?;
                    entries.push(Index::Integer(i));
                }
                Index::Range(range) => entries.push(Index::Range(range.reduce_with(shape[axis]))),
                Index::Ellipsis => entries.extend(shape[axis..axis + elided].iter().map(|&n| full(n))),
                Index::NewAxis => entries.push(Index::NewAxis),
                Index::IntegerArray(array) if opts.check_array_bounds => {
                    entries.push(Index::IntegerArray(array.reduce_with(axis, shape[axis])?));
                }
                Index::IntegerArray(_) => entries.push(entry.clone()),
                Index::BooleanArray(mask) => {
                    let covered = &shape[axis..axis + mask.ndim()];
                    if mask.shape() != covered {
                        return Err(IndexError::BooleanShapeMismatch {
                            axis,
                            expected: covered.to_vec(),
                            actual: mask.shape().to_vec(),
                        });
                    }
                    entries.push(entry.clone());
                }
                Index::Tuple(_) => return Err(ConstructionError::NestedTuple.into()),
            }
            axis += match entry {
                Index::Ellipsis => elided,
                other => other.num_axes(),
            };
        }
        if !self.0.iter().any(Index::is_ellipsis) {
            entries.extend(shape[axis..].iter().map(|&n| full(n)));
        }

        tracing::trace!(index = %self, ?shape, expanded = entries.len(), "expand");
        Ok(Tuple(entries))
    }

    /// The shape of the result of indexing an array of `shape` by this
    /// tuple.
    ///
    /// ```
    /// # use ndindex::Index;
    /// let t = ndindex::tuple![0, Index::Ellipsis, 0..5].unwrap();
    /// assert_eq!(t.newshape(&[10, 10, 10]).unwrap(), vec![10, 5]);
    /// ```
    pub fn newshape(&self, shape: &[usize]) -> Result<Vec<usize>, IndexError> {
        self.newshape_with(&ExpandOpts::lenient(), shape)
    }

    /// Like [`Tuple::newshape`], validating with `opts`.
    ///
    /// Integers drop their axis, ranges keep theirs with its new
    /// length, and new axes add a 1. When coordinate arrays are present
    /// they and any integers are broadcast together, and the broadcast
    /// shape takes the place of the first of them. If a range, new axis
    /// or ellipsis separates them, the broadcast shape goes to the front
    /// instead. This holds even for an ellipsis that stands for no axes.
    pub fn newshape_with(&self, opts: &ExpandOpts, shape: &[usize]) -> Result<Vec<usize>, IndexError> {
        let expanded = self.expand_with(opts, shape)?;
        let has_arrays = expanded.has_arrays();

        let mut newshape = Vec::with_capacity(shape.len());
        let mut block_at = None;
        let mut axis = 0;
        for entry in &expanded.0 {
            match entry {
                Index::Integer(_) if !has_arrays => {}
                Index::Integer(_) | Index::IntegerArray(_) | Index::BooleanArray(_) => {
                    if block_at.is_none() {
                        block_at = Some(newshape.len());
                    }
                }
                Index::Range(range) => newshape.push(range.len_with(shape[axis])),
                Index::NewAxis => newshape.push(1),
                Index::Ellipsis | Index::Tuple(_) => {}
            }
            axis += entry.num_axes();
        }

        if let Some(at) = block_at {
            let block = block_shape(&expanded)?;
            let at = if self.advanced_is_contiguous() { at } else { 0 };
            let (before, after) = newshape.split_at(at);
            return Ok(before.iter().chain(&block).chain(after).copied().collect());
        }
        Ok(newshape)
    }

    /// Canonicalizes this tuple without reference to a shape.
    pub fn reduce(&self) -> Index {
        let mut entries: Vec<Index> = self.0.iter().map(Index::reduce).collect();
        if entries.last().is_some_and(Index::is_ellipsis) {
            entries.pop();
        }
        Tuple(entries).into_single()
    }

    /// Canonicalizes this tuple against `shape`: the expanded form with
    /// trailing full ranges dropped, collapsed to a single entry where
    /// possible. An ellipsis standing for no axes is kept when it is all
    /// that separates the coordinate arrays, since it moves their
    /// broadcast shape to the front.
    pub fn reduce_with(&self, shape: &[usize]) -> Result<Index, IndexError> {
        let Tuple(mut entries) = self.expand(shape)?;
        if self.has_arrays() {
            let expanded = Tuple(entries.clone());
            block_shape(&expanded)?;
            if !self.advanced_is_contiguous() && expanded.advanced_is_contiguous() {
                // Every entry before the ellipsis expanded to exactly one.
                if let Some(at) = self.0.iter().position(Index::is_ellipsis) {
                    entries.insert(at, Index::Ellipsis);
                }
            }
        }
        let mut axis = shape.len();
        while let Some(Index::Range(range)) = entries.last() {
            let Some(last) = axis.checked_sub(1) else {
                break;
            };
            if *range != Range::full().reduce_with(shape[last]) {
                break;
            }
            entries.pop();
            axis = last;
        }
        Ok(Tuple(entries).into_single())
    }

    /// Replaces the coordinate arrays of this tuple, and its integers
    /// when arrays are present, with integer arrays of their common
    /// broadcast shape. A boolean mask becomes one integer array per
    /// axis it covers; zero-dimensional masks are kept as they are.
    pub fn broadcast_arrays(&self) -> Result<Tuple, IndexError> {
        if !self.has_arrays() {
            return Ok(self.clone());
        }
        let advanced: Vec<Index> = self
            .0
            .iter()
            .filter(|entry| advanced_shape(entry).is_some())
            .cloned()
            .collect();
        let mut arrays = broadcast(&advanced)?.arrays.into_iter();

        let mut entries = Vec::with_capacity(self.0.len());
        for entry in &self.0 {
            if advanced_shape(entry).is_none() {
                entries.push(entry.clone());
                continue;
            }
            let converted = arrays.next().unwrap_or_default();
            match entry {
                Index::BooleanArray(mask) if mask.ndim() == 0 => entries.push(entry.clone()),
                _ => entries.extend(converted.into_iter().map(Index::IntegerArray)),
            }
        }
        Ok(Tuple(entries))
    }
}

/// The broadcast shape of the integers and coordinate arrays of an
/// expanded tuple.
fn block_shape(expanded: &Tuple) -> Result<Vec<usize>, IndexError> {
    let shapes: Vec<Vec<usize>> = expanded.0.iter().filter_map(advanced_shape).collect();
    broadcast_shapes(&shapes.iter().map(Vec::as_slice).collect::<Vec<_>>())
}

impl From<Index> for Tuple {
    fn from(index: Index) -> Self {
        match index {
            Index::Tuple(tuple) => tuple,
            other => Tuple(vec![other]),
        }
    }
}

impl TryFrom<Vec<Index>> for Tuple {
    type Error = ConstructionError;

    fn try_from(entries: Vec<Index>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Tuple> for Vec<Index> {
    fn from(tuple: Tuple) -> Self {
        tuple.0
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "({},)", single),
            entries => write!(f, "({})", entries.iter().join(", ")),
        }
    }
}
