//! Re-expressing one index in the coordinates of another.
//!
//! `i.as_subindex(j)` is the index `k` such that `a[j][k]` holds exactly
//! the elements of `a[i]` that also lie in `a[j]`. This is what lets an
//! index for a whole array be applied to a chunk of it.
//!
//! Along each axis both indices are arithmetic progressions over the
//! same coordinates, so their common elements form another progression.
//! Mapping that progression through the inverse of `j`'s affine map
//! gives `k`.

use itertools::izip;

use crate::index::Index;
use crate::index::IndexError;
use crate::range::Range;
use crate::tuple::Tuple;

const OP: &str = "as_subindex";

/// The positions `start, start + step, ...` below `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Progression {
    start: i128,
    stop: Option<i128>,
    step: i128,
}

impl Progression {
    /// The progression a range selects from every axis long enough to
    /// hold it. Only ranges whose canonical form counts from the front
    /// of the axis describe one.
    fn of(range: &Range) -> Result<Self, IndexError> {
        let reduced = range.reduce();
        match reduced.args() {
            (Some(start), stop, Some(step))
                if start >= 0 && step > 0 && stop.map_or(true, |stop| stop >= 0) =>
            {
                Ok(Self {
                    start: start as i128,
                    stop: stop.map(|stop| stop as i128),
                    step: step as i128,
                })
            }
            _ => Err(unsupported(Index::Range(*range))),
        }
    }

    fn contains(&self, position: i128) -> bool {
        position >= self.start
            && (position - self.start) % self.step == 0
            && self.stop.map_or(true, |stop| position < stop)
    }

    /// The positions in both `self` and `other`.
    fn intersect(&self, other: &Progression) -> Option<Progression> {
        let (gcd, bezout, _) = egcd(self.step, other.step);
        let offset = other.start - self.start;
        if offset % gcd != 0 {
            return None;
        }
        let step = self.step / gcd * other.step;
        // Smallest solution of x = self.start (mod self.step) and
        // x = other.start (mod other.step), then the first one in both.
        let x = self.start + self.step * (bezout * (offset / gcd)).rem_euclid(other.step / gcd);
        let lo = self.start.max(other.start);
        let start = lo + (x - lo).rem_euclid(step);
        let stop = match (self.stop, other.stop) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        // No axis is longer than isize::MAX.
        if stop.is_some_and(|stop| start >= stop) || start > isize::MAX as i128 {
            return None;
        }
        Some(Progression { start, stop, step })
    }

    /// The local position of `position` within `self`, which must
    /// contain it.
    fn local_position(&self, position: i128) -> isize {
        ((position - self.start) / self.step) as isize
    }

    /// `self` in the local coordinates of `frame`, which must contain
    /// every position of `self`.
    fn local(&self, frame: &Progression) -> Result<Range, IndexError> {
        let stop = self
            .stop
            .map(|stop| -((frame.start - stop).div_euclid(frame.step)) as isize);
        let range = Range::new(
            Some(frame.local_position(self.start)),
            stop,
            Some((self.step / frame.step) as isize),
        )?;
        Ok(range.reduce())
    }
}

/// Returns `(g, x, y)` with `g = gcd(a, b) = a * x + b * y`.
fn egcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_x, mut x) = (1, 0);
    let (mut old_y, mut y) = (0, 1);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_x, x) = (x, old_x - q * x);
        (old_y, y) = (y, old_y - q * y);
    }
    (old_r, old_x, old_y)
}

fn unsupported(index: Index) -> IndexError {
    IndexError::Unsupported { op: OP, index }
}

fn point(index: &Index, position: isize) -> Result<i128, IndexError> {
    if position < 0 {
        return Err(unsupported(index.clone()));
    }
    Ok(position as i128)
}

/// How one axis of `i` looks from inside the same axis of `j`.
#[derive(Debug)]
enum AxisSubindex {
    /// The entry selecting `i`'s elements from the axis of `a[j]`.
    Entry(Index),
    /// `i` and `j` pick the same single position, and `j` removes the
    /// axis, so nothing is left to select.
    Removed,
    /// `i` and `j` have no position in common.
    Disjoint,
}

fn axis_subindex(i: &Index, j: &Index) -> Result<AxisSubindex, IndexError> {
    let subindex = match (i, j) {
        (Index::Range(ri), Index::Range(rj)) => {
            let frame = Progression::of(rj)?;
            match Progression::of(ri)?.intersect(&frame) {
                Some(common) => AxisSubindex::Entry(Index::Range(common.local(&frame)?)),
                None => AxisSubindex::Disjoint,
            }
        }
        (Index::Integer(x), Index::Range(rj)) => {
            let x = point(i, *x)?;
            let frame = Progression::of(rj)?;
            if frame.contains(x) {
                AxisSubindex::Entry(Index::Integer(frame.local_position(x)))
            } else {
                AxisSubindex::Disjoint
            }
        }
        // `j` removes the axis; a selected point comes back as a
        // length-1 axis.
        (Index::Range(ri), Index::Integer(y)) => {
            let y = point(j, *y)?;
            if Progression::of(ri)?.contains(y) {
                AxisSubindex::Entry(Index::NewAxis)
            } else {
                AxisSubindex::Disjoint
            }
        }
        (Index::Integer(x), Index::Integer(y)) => {
            if point(i, *x)? == point(j, *y)? {
                AxisSubindex::Removed
            } else {
                AxisSubindex::Disjoint
            }
        }
        (Index::Range(_) | Index::Integer(_), other) | (other, _) => {
            return Err(unsupported(other.clone()));
        }
    };
    Ok(subindex)
}

/// The index selecting nothing from the result of indexing by `j`.
fn select_nothing(j: &Tuple) -> Tuple {
    let entry = if j.entries().iter().any(Index::is_range) {
        Index::Range(Range::EMPTY)
    } else {
        // Integers alone leave no axis for a range to empty.
        Index::from(false)
    };
    Tuple::from(entry)
}

impl Range {
    /// The range `k` such that indexing by `other` and then by `k`
    /// selects the elements this range selects that `other` also does.
    ///
    /// Both ranges must count from the front of the axis with a
    /// positive step once reduced; reduce them against a shape first
    /// otherwise. Disjoint ranges give [`Range::EMPTY`].
    ///
    /// ```
    /// use ndindex::Range;
    /// let i = Range::from(50..160);
    /// assert_eq!(i.as_subindex(&Range::from(0..100)).unwrap(), Range::from(50..100).reduce());
    /// assert_eq!(i.as_subindex(&Range::from(100..200)).unwrap(), Range::from(0..60).reduce());
    /// ```
    pub fn as_subindex(&self, other: &Range) -> Result<Range, IndexError> {
        let frame = Progression::of(other)?;
        match Progression::of(self)?.intersect(&frame) {
            Some(common) => common.local(&frame),
            None => Ok(Range::EMPTY),
        }
    }
}

impl Tuple {
    /// Re-expresses this tuple in the coordinates of `other`, axis by
    /// axis. Both tuples must have the same number of entries, each an
    /// integer or a range.
    ///
    /// If any axis is disjoint the result selects nothing.
    pub fn as_subindex(&self, other: &Tuple) -> Result<Tuple, IndexError> {
        if self.len() != other.len() {
            return Err(IndexError::AxisCountMismatch {
                expected: other.len(),
                actual: self.len(),
            });
        }
        let mut entries = Vec::with_capacity(self.len());
        let mut disjoint = false;
        for (i, j) in izip!(self.entries(), other.entries()) {
            match axis_subindex(i, j)? {
                AxisSubindex::Entry(entry) => entries.push(entry),
                AxisSubindex::Removed => {}
                AxisSubindex::Disjoint => disjoint = true,
            }
        }
        tracing::trace!(index = %self, frame = %other, disjoint, "as_subindex");
        if disjoint {
            return Ok(select_nothing(other));
        }
        Ok(Tuple::new(entries)?)
    }
}

impl Index {
    /// Re-expresses this index in the coordinates of `other`: the index
    /// `k` such that `a[other][k]` holds exactly the elements of
    /// `a[self]` that also lie in `a[other]`.
    ///
    /// Only integers, ranges and tuples of them are supported; tuples
    /// are composed axis by axis.
    ///
    /// When nothing is shared the result is [`Range::EMPTY`], except
    /// when `other` holds only integers: `a[other]` then has no axis
    /// left for a range to index, and the result is the
    /// zero-dimensional mask `Index::from(false)` instead.
    pub fn as_subindex(&self, other: &Index) -> Result<Index, IndexError> {
        if self.is_tuple() || other.is_tuple() {
            let j = Tuple::from(other.clone());
            return Ok(Index::Tuple(Tuple::from(self.clone()).as_subindex(&j)?));
        }
        let subindex = match axis_subindex(self, other)? {
            AxisSubindex::Entry(entry) => entry,
            AxisSubindex::Removed => Index::Tuple(Tuple::default()),
            AxisSubindex::Disjoint => {
                select_nothing(&Tuple::from(other.clone())).into_single()
            }
        };
        Ok(subindex)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::test_utils::prop_forward_range;
    use crate::test_utils::reference_slice;
    use crate::tuple;

    fn range(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Range {
        Range::new(start, stop, step).unwrap()
    }

    #[test]
    fn test_chunk_examples() {
        let i = Range::from(50..160);
        let j1 = Range::from(0..100);
        let j2 = Range::from(100..200);
        assert_eq!(i.as_subindex(&j1).unwrap(), range(Some(50), Some(100), Some(1)));
        assert_eq!(i.as_subindex(&j2).unwrap(), range(Some(0), Some(60), Some(1)));
        assert_eq!(
            Index::from(i).as_subindex(&Index::from(j2)).unwrap(),
            Index::Range(range(Some(0), Some(60), Some(1)))
        );
    }

    #[test]
    fn test_strided() {
        // Evens within 1, 4, 7, ..., 19 are 4, 10, 16: positions 1, 3, 5.
        let k = range(Some(0), None, Some(2))
            .as_subindex(&range(Some(1), Some(20), Some(3)))
            .unwrap();
        assert_eq!(k, range(Some(1), Some(6), Some(2)));

        let odd = range(Some(1), None, Some(2));
        let even = range(Some(0), None, Some(2));
        assert_eq!(odd.as_subindex(&even).unwrap(), Range::EMPTY);
        assert_eq!(
            Range::from(0..10).as_subindex(&Range::from(20..30)).unwrap(),
            Range::EMPTY
        );
        assert_eq!(
            Range::full().as_subindex(&Range::from(3..)).unwrap(),
            range(Some(0), None, Some(1))
        );
    }

    #[test]
    fn test_points() {
        let frame = Index::from(range(Some(1), Some(20), Some(3)));
        assert_eq!(Index::from(7).as_subindex(&frame).unwrap(), Index::Integer(2));
        assert_eq!(
            Index::from(8).as_subindex(&frame).unwrap(),
            Index::Range(Range::EMPTY)
        );
        assert_eq!(
            Index::from(0..10).as_subindex(&Index::from(5)).unwrap(),
            Index::NewAxis
        );
        assert_eq!(
            Index::from(3).as_subindex(&Index::from(3)).unwrap(),
            Index::Tuple(Tuple::default())
        );
        assert_eq!(
            Index::from(3).as_subindex(&Index::from(4)).unwrap(),
            Index::from(false)
        );
        // Integers alone leave no axis, so a mask stands in for an empty range.
        let k = Index::from(tuple![3, 4].unwrap())
            .as_subindex(&Index::from(tuple![3, 5].unwrap()))
            .unwrap();
        assert_eq!(k, Index::from(tuple![false].unwrap()));
        assert!(k.is_empty());
    }

    #[test]
    fn test_tuples() {
        let i = tuple![0..10, 5, 2..].unwrap();
        let j = tuple![5..15, 5, 3].unwrap();
        assert_eq!(
            i.as_subindex(&j).unwrap(),
            tuple![range(Some(0), Some(5), Some(1)), Index::NewAxis].unwrap()
        );

        let disjoint = tuple![0..10, 4].unwrap().as_subindex(&tuple![0..10, 5].unwrap());
        assert_eq!(disjoint.unwrap(), tuple![Range::EMPTY].unwrap());

        let result = i.as_subindex(&tuple![0..10].unwrap());
        assert!(
            matches!(
                result,
                Err(IndexError::AxisCountMismatch {
                    expected: 1,
                    actual: 3
                })
            ),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_unsupported() {
        let frame = Index::from(0..10);
        for index in [
            Index::from(vec![0, 1]),
            Index::from(vec![true]),
            Index::Ellipsis,
            Index::NewAxis,
            Index::from(-1),
            Index::from(-5..),
            Index::from(range(None, None, Some(-1))),
        ] {
            let result = index.as_subindex(&frame);
            assert!(
                matches!(result, Err(IndexError::Unsupported { op: "as_subindex", .. })),
                "Unexpected: {:?}",
                result
            );
            let result = frame.as_subindex(&index);
            assert!(
                matches!(result, Err(IndexError::Unsupported { .. })),
                "Unexpected: {:?}",
                result
            );
        }
    }

    // a[j][k] must hold exactly the elements of a[i] that are in a[j].
    #[test]
    fn test_composition_matches_reference() {
        let starts = [None, Some(0), Some(1), Some(2), Some(3), Some(5)];
        let stops = [None, Some(0), Some(2), Some(5), Some(9), Some(14)];
        let steps = [None, Some(1), Some(2), Some(3), Some(4)];
        let ranges: Vec<Range> = itertools::iproduct!(starts, stops, steps)
            .map(|(start, stop, step)| range(start, stop, step))
            .collect();
        for i in &ranges {
            for j in &ranges {
                let k = i.as_subindex(j).unwrap();
                for n in 0..=16 {
                    let in_j = reference_slice(j.args(), n);
                    let members: HashSet<isize> = in_j.iter().copied().collect();
                    let expected: Vec<isize> = reference_slice(i.args(), n)
                        .into_iter()
                        .filter(|x| members.contains(x))
                        .collect();
                    let actual: Vec<isize> = reference_slice(k.args(), in_j.len())
                        .into_iter()
                        .map(|position| in_j[position as usize])
                        .collect();
                    assert_eq!(actual, expected, "{} in {} gave {} on {}", i, j, k, n);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_composition_is_a_subset(
            i in prop_forward_range(60),
            j in prop_forward_range(60),
            n in 0usize..100,
        ) {
            let k = i.as_subindex(&j).unwrap();
            let in_j = reference_slice(j.args(), n);
            let in_i: HashSet<isize> = reference_slice(i.args(), n).into_iter().collect();
            let selected = reference_slice(k.args(), in_j.len());
            prop_assert_eq!(
                selected.len(),
                in_j.iter().filter(|x| in_i.contains(x)).count()
            );
            for position in selected {
                prop_assert!(in_i.contains(&in_j[position as usize]));
            }
        }
    }

    #[test]
    fn test_egcd() {
        for (a, b) in [(12, 18), (7, 5), (1, 9), (6, 6)] {
            let (g, x, y) = egcd(a, b);
            assert_eq!(a * x + b * y, g);
            assert_eq!(a % g, 0);
            assert_eq!(b % g, 0);
        }
        assert_eq!(egcd(12, 18).0, 6);
    }
}
