use serde::Deserialize;
use serde::Serialize;

use crate::index::ConstructionError;
use crate::index::IndexError;

/// An n-dimensional array of integer positions, stored in row-major
/// order. Used as an index it picks positions along a single axis and
/// contributes its own shape to the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(Vec<isize>, Vec<usize>)", into = "(Vec<isize>, Vec<usize>)")]
pub struct IntegerArray {
    data: Vec<isize>,
    shape: Vec<usize>,
}

impl IntegerArray {
    /// Creates an array from row-major `data` and a `shape` whose
    /// element count must equal `data.len()`.
    pub fn new(data: Vec<isize>, shape: Vec<usize>) -> Result<Self, ConstructionError> {
        check_shape(&shape, data.len())?;
        Ok(Self { data, shape })
    }

    /// A one-dimensional array.
    pub fn from_vec(data: Vec<isize>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// A zero-dimensional array holding a single value.
    pub fn scalar(value: isize) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[isize] {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn args(&self) -> (Vec<isize>, Vec<usize>) {
        (self.data.clone(), self.shape.clone())
    }

    /// Bound-checks every entry against an axis of length `size` and
    /// rewrites negative entries as non-negative ones.
    pub fn reduce_with(&self, axis: usize, size: usize) -> Result<Self, IndexError> {
        let data = self
            .data
            .iter()
            .map(|&index| normalize_position(index, axis, size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            data,
            shape: self.shape.clone(),
        })
    }

    /// Materializes this array broadcast to `shape`. The caller is
    /// responsible for `shape` being a valid broadcast target.
    pub(crate) fn broadcast_to(&self, shape: &[usize]) -> Self {
        if self.shape == shape {
            return self.clone();
        }
        let size: usize = shape.iter().product();
        let offset = shape.len() - self.shape.len();
        let strides = strides(&self.shape);
        let mut data = Vec::with_capacity(size);
        let mut coords = vec![0usize; shape.len()];
        for _ in 0..size {
            let flat: usize = self
                .shape
                .iter()
                .zip(&strides)
                .enumerate()
                .map(|(i, (&dim, &stride))| if dim == 1 { 0 } else { coords[offset + i] * stride })
                .sum();
            data.push(self.data[flat]);
            advance(&mut coords, shape);
        }
        Self {
            data,
            shape: shape.to_vec(),
        }
    }
}

impl TryFrom<(Vec<isize>, Vec<usize>)> for IntegerArray {
    type Error = ConstructionError;

    fn try_from((data, shape): (Vec<isize>, Vec<usize>)) -> Result<Self, Self::Error> {
        Self::new(data, shape)
    }
}

impl From<IntegerArray> for (Vec<isize>, Vec<usize>) {
    fn from(array: IntegerArray) -> Self {
        (array.data, array.shape)
    }
}

/// An n-dimensional boolean mask, stored in row-major order. Used as an
/// index it consumes as many axes as it has dimensions and selects the
/// positions where it is true.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(Vec<bool>, Vec<usize>)", into = "(Vec<bool>, Vec<usize>)")]
pub struct BooleanArray {
    data: Vec<bool>,
    shape: Vec<usize>,
}

impl BooleanArray {
    pub fn new(data: Vec<bool>, shape: Vec<usize>) -> Result<Self, ConstructionError> {
        check_shape(&shape, data.len())?;
        Ok(Self { data, shape })
    }

    pub fn from_vec(data: Vec<bool>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    /// A zero-dimensional mask. `true` adds a length-1 axis to the
    /// result and `false` a length-0 one.
    pub fn scalar(value: bool) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn args(&self) -> (Vec<bool>, Vec<usize>) {
        (self.data.clone(), self.shape.clone())
    }

    /// The number of true entries.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }

    /// One coordinate array per dimension, listing the positions of the
    /// true entries in row-major order. Each array is one-dimensional
    /// with length [`BooleanArray::count`].
    pub fn nonzero(&self) -> Vec<IntegerArray> {
        let mut columns = vec![Vec::with_capacity(self.count()); self.ndim()];
        let mut coords = vec![0usize; self.ndim()];
        for &value in &self.data {
            if value {
                for (column, &coord) in columns.iter_mut().zip(&coords) {
                    column.push(coord as isize);
                }
            }
            advance(&mut coords, &self.shape);
        }
        columns.into_iter().map(IntegerArray::from_vec).collect()
    }
}

impl TryFrom<(Vec<bool>, Vec<usize>)> for BooleanArray {
    type Error = ConstructionError;

    fn try_from((data, shape): (Vec<bool>, Vec<usize>)) -> Result<Self, Self::Error> {
        Self::new(data, shape)
    }
}

impl From<BooleanArray> for (Vec<bool>, Vec<usize>) {
    fn from(mask: BooleanArray) -> Self {
        (mask.data, mask.shape)
    }
}

fn check_shape(shape: &[usize], len: usize) -> Result<(), ConstructionError> {
    if shape.iter().product::<usize>() != len {
        return Err(ConstructionError::ArrayShapeMismatch {
            shape: shape.to_vec(),
            len,
        });
    }
    Ok(())
}

/// Bound-checks a single position against an axis of length `size`,
/// returning it as a non-negative offset.
pub(crate) fn normalize_position(index: isize, axis: usize, size: usize) -> Result<isize, IndexError> {
    let n = size as isize;
    if index < -n || index >= n {
        return Err(IndexError::OutOfBounds { index, axis, size });
    }
    Ok(if index < 0 { index + n } else { index })
}

/// Row-major strides for `shape`.
fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Steps `coords` to the next row-major position within `shape`.
fn advance(coords: &mut [usize], shape: &[usize]) {
    for (coord, &dim) in coords.iter_mut().zip(shape).rev() {
        *coord += 1;
        if *coord < dim {
            return;
        }
        *coord = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checks() {
        assert!(IntegerArray::new(vec![0, 1, 2, 3, 4, 5], vec![2, 3]).is_ok());
        assert!(IntegerArray::new(vec![], vec![0, 4]).is_ok());
        assert_eq!(IntegerArray::scalar(3).ndim(), 0);

        let result = BooleanArray::new(vec![true, false], vec![3]);
        assert!(
            matches!(
                result,
                Err(ConstructionError::ArrayShapeMismatch { ref shape, len: 2 }) if *shape == vec![3]
            ),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_reduce_with() {
        let array = IntegerArray::from_vec(vec![0, -1, 2, -3]);
        assert_eq!(array.reduce_with(0, 3).unwrap().data(), &[0, 2, 2, 0]);

        let result = array.reduce_with(1, 2);
        assert!(
            matches!(
                result,
                Err(IndexError::OutOfBounds {
                    index: 2,
                    axis: 1,
                    size: 2
                })
            ),
            "Unexpected: {:?}",
            result
        );
        assert!(IntegerArray::from_vec(vec![0]).reduce_with(0, 0).is_err());
    }

    #[test]
    fn test_nonzero() {
        #[rustfmt::skip]
        let mask = BooleanArray::new(
            vec![
                true, false, true,
                false, true, false,
            ],
            vec![2, 3],
        )
        .unwrap();
        assert_eq!(mask.count(), 3);
        let coords = mask.nonzero();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0].data(), &[0, 0, 1]);
        assert_eq!(coords[1].data(), &[0, 2, 1]);
        assert_eq!(coords[1].shape(), &[3]);

        let empty = BooleanArray::from_vec(vec![false; 4]).nonzero();
        assert_eq!(empty[0].shape(), &[0]);
    }

    #[test]
    fn test_broadcast_to() {
        let column = IntegerArray::new(vec![1, 2], vec![2, 1]).unwrap();
        let wide = column.broadcast_to(&[2, 3]);
        assert_eq!(wide.data(), &[1, 1, 1, 2, 2, 2]);

        let row = IntegerArray::from_vec(vec![7, 8, 9]);
        let tall = row.broadcast_to(&[2, 3]);
        assert_eq!(tall.data(), &[7, 8, 9, 7, 8, 9]);

        let scalar = IntegerArray::scalar(4).broadcast_to(&[2, 2]);
        assert_eq!(scalar.data(), &[4, 4, 4, 4]);

        let nothing = row.broadcast_to(&[0, 3]);
        assert_eq!(nothing.size(), 0);
    }

    #[test]
    fn test_serde() {
        let array = IntegerArray::new(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let json = serde_json::to_string(&array).unwrap();
        assert_eq!(serde_json::from_str::<IntegerArray>(&json).unwrap(), array);
        assert_eq!(json, "[[1,2,3,4],[2,2]]");
        assert!(serde_json::from_str::<BooleanArray>("[[true],[2]]").is_err());
    }
}
