//! Reference models and generators shared by the unit tests.

use proptest::prelude::*;

use crate::range::Range;
use crate::range::RangeArgs;

/// The positions a slice selects from an axis of length `size`,
/// following the bounds adjustment a host language's slicing applies:
/// absent bounds start out infinitely far in the direction of travel,
/// negative ones count from the end, and both are then pulled inside
/// the axis.
pub(crate) fn reference_slice((start, stop, step): RangeArgs, size: usize) -> Vec<isize> {
    let len = size as isize;
    let step = step.unwrap_or(1);
    assert_ne!(step, 0);
    let backwards = step < 0;

    let adjust = |bound: isize| {
        if bound < 0 {
            let bound = bound + len;
            if bound < 0 {
                if backwards { -1 } else { 0 }
            } else {
                bound
            }
        } else if bound >= len {
            if backwards { len - 1 } else { len }
        } else {
            bound
        }
    };
    let start = adjust(start.unwrap_or(if backwards { isize::MAX } else { 0 }));
    let stop = adjust(stop.unwrap_or(if backwards { isize::MIN } else { isize::MAX }));

    let mut positions = Vec::new();
    let mut i = start;
    while (!backwards && i < stop) || (backwards && i > stop) {
        positions.push(i);
        i += step;
    }
    positions
}

/// Every range with `start` and `stop` absent or drawn from `bounds`,
/// and `step` absent or drawn from `bounds` without zero.
pub(crate) fn sweep_ranges(bounds: std::ops::Range<isize>) -> impl Iterator<Item = Range> {
    let offsets: Vec<Option<isize>> = std::iter::once(None).chain(bounds.map(Some)).collect();
    let steps: Vec<Option<isize>> = offsets.iter().copied().filter(|&s| s != Some(0)).collect();
    itertools::iproduct!(offsets.clone(), offsets, steps)
        .map(|(start, stop, step)| Range::new(start, stop, step).unwrap())
}

fn prop_offset(max: isize) -> impl Strategy<Value = Option<isize>> {
    prop::option::of(-max..max)
}

/// Arbitrary ranges with offsets in `-max..max` and steps up to `max`
/// in magnitude.
pub(crate) fn prop_range(max: isize) -> impl Strategy<Value = Range> {
    let step = prop::option::of(prop_oneof![-max..0, 1..max]);
    (prop_offset(max), prop_offset(max), step)
        .prop_map(|(start, stop, step)| Range::new(start, stop, step).unwrap())
}

/// Arbitrary ranges that count from the front of the axis with a
/// positive step.
pub(crate) fn prop_forward_range(max: isize) -> impl Strategy<Value = Range> {
    (
        prop::option::of(0..max),
        prop::option::of(0..max),
        prop::option::of(1..max),
    )
        .prop_map(|(start, stop, step)| Range::new(start, stop, step).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_slice() {
        assert_eq!(reference_slice((None, None, None), 4), vec![0, 1, 2, 3]);
        assert_eq!(reference_slice((None, None, Some(-1)), 4), vec![3, 2, 1, 0]);
        assert_eq!(reference_slice((Some(-2), None, None), 4), vec![2, 3]);
        assert_eq!(reference_slice((Some(10), Some(-10), Some(-3)), 8), vec![7, 4, 1]);
        assert_eq!(reference_slice((Some(1), Some(1), None), 4), Vec::<isize>::new());
        assert_eq!(reference_slice((None, None, Some(-1)), 0), Vec::<isize>::new());
    }

    #[test]
    fn test_sweep_ranges() {
        // 3 offsets and 2 nonzero steps, each also absent.
        assert_eq!(sweep_ranges(-1..2).count(), 4 * 4 * 3);
    }
}
