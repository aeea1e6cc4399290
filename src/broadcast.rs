//! Broadcasting of coordinate-array indices.
//!
//! Coordinate arrays in one index are iterated together, so their
//! shapes must agree under the usual broadcasting rule: shapes are
//! aligned at their trailing dimension, and two dimensions agree when
//! they are equal or one of them is 1.

use crate::array::IntegerArray;
use crate::index::Index;
use crate::index::IndexError;

/// Computes the shape that all of `shapes` broadcast to.
///
/// ```
/// # use ndindex::broadcast_shapes;
/// assert_eq!(broadcast_shapes(&[&[3, 1], &[4]]).unwrap(), vec![3, 4]);
/// assert!(broadcast_shapes(&[&[3], &[4]]).is_err());
/// ```
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>, IndexError> {
    shapes
        .iter()
        .try_fold(Vec::new(), |acc, shape| broadcast_pair(&acc, shape))
}

fn broadcast_pair(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, IndexError> {
    let ndim = lhs.len().max(rhs.len());
    let dim = |shape: &[usize], i: usize| {
        // Missing leading dimensions behave as 1.
        (i + shape.len())
            .checked_sub(ndim)
            .map_or(1, |j| shape[j])
    };
    (0..ndim)
        .map(|i| match (dim(lhs, i), dim(rhs, i)) {
            (l, r) if l == r || r == 1 => Ok(l),
            (1, r) => Ok(r),
            _ => Err(IndexError::Broadcast {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            }),
        })
        .collect()
}

/// The shape an advanced index entry contributes to broadcasting, or
/// `None` for entries that are not coordinate arrays. Integers count as
/// zero-dimensional arrays and a boolean mask contributes the number
/// of positions it selects.
pub(crate) fn advanced_shape(entry: &Index) -> Option<Vec<usize>> {
    match entry {
        Index::Integer(_) => Some(Vec::new()),
        Index::IntegerArray(array) => Some(array.shape().to_vec()),
        Index::BooleanArray(mask) => Some(vec![mask.count()]),
        _ => None,
    }
}

/// The result of broadcasting a list of coordinate-array entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// The common shape.
    pub shape: Vec<usize>,
    /// For each input entry, its integer coordinate arrays materialized
    /// at `shape`: one for an integer or integer array, one per
    /// dimension for a boolean mask, and none for a zero-dimensional
    /// mask, which spans no axis.
    pub arrays: Vec<Vec<IntegerArray>>,
}

/// Converts boolean masks to integer coordinate arrays and broadcasts
/// every entry to a common shape. Entries other than integers and
/// coordinate arrays are rejected.
pub fn broadcast(entries: &[Index]) -> Result<Broadcast, IndexError> {
    let mut shapes = Vec::with_capacity(entries.len());
    let mut converted = Vec::with_capacity(entries.len());
    for entry in entries {
        let arrays = match entry {
            Index::Integer(i) => vec![IntegerArray::scalar(*i)],
            Index::IntegerArray(array) => vec![array.clone()],
            Index::BooleanArray(mask) => mask.nonzero(),
            other => {
                return Err(IndexError::Unsupported {
                    op: "broadcast",
                    index: other.clone(),
                });
            }
        };
        shapes.extend(advanced_shape(entry));
        converted.push(arrays);
    }

    let shape = broadcast_shapes(&shapes.iter().map(Vec::as_slice).collect::<Vec<_>>())?;
    tracing::trace!(?shape, num_entries = entries.len(), "broadcast coordinate arrays");
    let arrays = converted
        .into_iter()
        .map(|arrays| {
            arrays
                .into_iter()
                .map(|array| array.broadcast_to(&shape))
                .collect()
        })
        .collect();
    Ok(Broadcast { shape, arrays })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::BooleanArray;

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(broadcast_shapes(&[]).unwrap(), Vec::<usize>::new());
        assert_eq!(broadcast_shapes(&[&[2, 1], &[1, 3]]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shapes(&[&[5, 1, 4], &[3, 1], &[]]).unwrap(), vec![5, 3, 4]);
        assert_eq!(broadcast_shapes(&[&[0], &[1]]).unwrap(), vec![0]);

        let result = broadcast_shapes(&[&[2, 3], &[3, 2]]);
        assert!(
            matches!(
                result,
                Err(IndexError::Broadcast { ref lhs, ref rhs }) if *lhs == vec![2, 3] && *rhs == vec![3, 2]
            ),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_broadcast_masks() {
        let mask = BooleanArray::new(vec![false, true, true, false], vec![2, 2]).unwrap();
        let entries = vec![Index::from(mask), Index::from(vec![10, 20])];
        let Broadcast { shape, arrays } = broadcast(&entries).unwrap();
        assert_eq!(shape, vec![2]);
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0].len(), 2);
        assert_eq!(arrays[0][0].data(), &[0, 1]);
        assert_eq!(arrays[0][1].data(), &[1, 0]);
        assert_eq!(arrays[1][0].data(), &[10, 20]);
    }

    #[test]
    fn test_broadcast_scalars() {
        let column = IntegerArray::new(vec![0, 1, 2], vec![3, 1]).unwrap();
        let entries = vec![Index::from(column), Index::from(4), Index::from(true)];
        let Broadcast { shape, arrays } = broadcast(&entries).unwrap();
        assert_eq!(shape, vec![3, 1]);
        assert_eq!(arrays[1][0].data(), &[4, 4, 4]);
        assert!(arrays[2].is_empty());

        let result = broadcast(&[Index::from(false), Index::from(vec![1, 2])]);
        assert!(matches!(result, Err(IndexError::Broadcast { .. })), "Unexpected: {:?}", result);
    }

    #[test]
    fn test_broadcast_rejects_basic_indices() {
        let result = broadcast(&[Index::from(0..3)]);
        assert!(
            matches!(result, Err(IndexError::Unsupported { op: "broadcast", .. })),
            "Unexpected: {:?}",
            result
        );
    }
}
