use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::index::ConstructionError;

/// The constructor arguments of a [`Range`]: `(start, stop, step)`.
pub type RangeArgs = (Option<isize>, Option<isize>, Option<isize>);

/// A strided selection along one axis, with the usual directional
/// defaults: an absent `start`/`stop` means "from the first/up to the
/// last element in the direction of `step`", and an absent `step`
/// means 1. Negative offsets count from the end of the axis.
///
/// Equality is structural: `Range(0, 10)` and `Range(0, 10, 1)` are
/// different values. Use [`Range::reduce`] to compare selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeArgs", into = "RangeArgs")]
pub struct Range {
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
}

impl Range {
    /// The canonical empty range, `0:0:1`.
    pub const EMPTY: Range = Range {
        start: Some(0),
        stop: Some(0),
        step: Some(1),
    };

    /// Creates a new range. Fails if `step` is zero.
    pub fn new(
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<Self, ConstructionError> {
        if step == Some(0) {
            return Err(ConstructionError::ZeroStep);
        }
        Ok(Self { start, stop, step })
    }

    /// The range selecting every element of an axis, `:`.
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    const fn from_parts(start: isize, stop: Option<isize>, step: isize) -> Self {
        Self {
            start: Some(start),
            stop,
            step: Some(step),
        }
    }

    pub fn start(&self) -> Option<isize> {
        self.start
    }

    pub fn stop(&self) -> Option<isize> {
        self.stop
    }

    pub fn step(&self) -> Option<isize> {
        self.step
    }

    /// The step with its default applied.
    pub fn stride(&self) -> isize {
        self.step.unwrap_or(1)
    }

    /// The constructor arguments. `Range::new` applied to these always
    /// reproduces `self`.
    pub fn args(&self) -> RangeArgs {
        (self.start, self.stop, self.step)
    }

    /// Resolves defaults and negative offsets against an axis of
    /// length `size`, returning the clamped `(start, stop, step)`.
    ///
    /// For a positive step both bounds land in `[0, size]`; for a
    /// negative step they land in `[-1, size - 1]`, where `-1` stands
    /// for "one before index 0".
    pub fn resolve(&self, size: usize) -> (isize, isize, isize) {
        let n = size as isize;
        let step = self.stride();
        let (lower, upper) = if step > 0 { (0, n) } else { (-1, n - 1) };
        let clamp = |offset: isize| {
            if offset < 0 {
                (offset + n).max(lower)
            } else {
                offset.min(upper)
            }
        };
        let start = match self.start {
            Some(offset) => clamp(offset),
            None if step > 0 => lower,
            None => upper,
        };
        let stop = match self.stop {
            Some(offset) => clamp(offset),
            None if step > 0 => upper,
            None => lower,
        };
        (start, stop, step)
    }

    /// The number of elements selected from an axis of length `size`.
    pub fn len_with(&self, size: usize) -> usize {
        let (start, stop, step) = self.resolve(size);
        span_len(start, stop, step) as usize
    }

    /// The positions selected from an axis of length `size`, in
    /// iteration order.
    pub fn indices(&self, size: usize) -> impl Iterator<Item = usize> {
        let (start, stop, step) = self.resolve(size);
        (0..span_len(start, stop, step)).map(move |k| (start + k * step) as usize)
    }

    /// Canonicalizes this range against an axis of length `size`.
    ///
    /// The result has a concrete non-negative start and an explicit
    /// step, and its stop sits immediately past the last selected
    /// element. Empty selections become [`Range::EMPTY`] and single
    /// elements `x` become `x:x+1:1`. When a negative-step selection
    /// runs down to index 0 the stop is absent, since `-1` would wrap.
    pub fn reduce_with(&self, size: usize) -> Range {
        let (start, stop, step) = self.resolve(size);
        match span_len(start, stop, step) {
            0 => Self::EMPTY,
            1 => Self::from_parts(start, Some(start + 1), 1),
            len => {
                let last = start + (len - 1) * step;
                let stop = if step > 0 {
                    Some(last + 1)
                } else if last == 0 {
                    None
                } else {
                    Some(last - 1)
                };
                Self::from_parts(start, stop, step)
            }
        }
    }

    /// Canonicalizes this range without an axis length.
    ///
    /// Two ranges reduce to the same value exactly when they select
    /// the same elements, in the same order, from every axis length.
    /// The result always has a concrete start and an explicit step,
    /// and `r.reduce().reduce_with(n) == r.reduce_with(n)` for all `n`.
    ///
    /// Offsets are treated as exact integers, so ranges that only differ
    /// on axes longer than `isize::MAX`, like `isize::MIN:` and `0:`,
    /// keep distinct reductions.
    pub fn reduce(&self) -> Range {
        // Offsets are widened so that negating or subtracting them
        // cannot overflow.
        let step = wide(self.stride());
        let stop = self.stop.map(wide);
        if step > 0 {
            reduce_forward(self.start.map_or(0, wide), stop, step)
        } else {
            reduce_backward(self.start.map_or(-1, wide), stop, -step)
        }
    }

    /// The largest number of elements this range selects from any axis
    /// length, or `None` when that number grows without bound (as for
    /// `0:-1` or `-1:0:-1`).
    pub fn len(&self) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        let step = wide(self.stride());
        let stop = self.stop.map(wide);
        let count = if step > 0 {
            max_len_forward(self.start.map_or(0, wide), stop, step)?
        } else {
            max_len_backward(self.start.map_or(-1, wide), stop, -step)?
        };
        Some(narrow(count) as usize)
    }

    /// True if this range selects nothing from every axis length.
    pub fn is_empty(&self) -> bool {
        self.reduce() == Self::EMPTY
    }

    /// True if this range selects nothing from an axis of length `size`.
    pub fn is_empty_with(&self, size: usize) -> bool {
        self.len_with(size) == 0
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::full()
    }
}

impl TryFrom<RangeArgs> for Range {
    type Error = ConstructionError;

    fn try_from((start, stop, step): RangeArgs) -> Result<Self, Self::Error> {
        Self::new(start, stop, step)
    }
}

impl From<Range> for RangeArgs {
    fn from(range: Range) -> Self {
        range.args()
    }
}

impl From<std::ops::Range<isize>> for Range {
    fn from(r: std::ops::Range<isize>) -> Self {
        Self {
            start: Some(r.start),
            stop: Some(r.end),
            step: None,
        }
    }
}

impl From<std::ops::RangeInclusive<isize>> for Range {
    fn from(r: std::ops::RangeInclusive<isize>) -> Self {
        // `..=-1` runs through the last element; `..0` would select nothing.
        let stop = match *r.end() {
            -1 => None,
            end => Some(end + 1),
        };
        Self {
            start: Some(*r.start()),
            stop,
            step: None,
        }
    }
}

impl From<std::ops::RangeFrom<isize>> for Range {
    fn from(r: std::ops::RangeFrom<isize>) -> Self {
        Self {
            start: Some(r.start),
            stop: None,
            step: None,
        }
    }
}

impl From<std::ops::RangeTo<isize>> for Range {
    fn from(r: std::ops::RangeTo<isize>) -> Self {
        Self {
            start: None,
            stop: Some(r.end),
            step: None,
        }
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        write!(f, ":")?;
        if let Some(stop) = self.stop {
            write!(f, "{}", stop)?;
        }
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// `len(range(start, stop, step))` for concrete bounds.
fn span_len(start: isize, stop: isize, step: isize) -> isize {
    narrow(count(wide(start), wide(stop), wide(step)))
}

fn count(start: i128, stop: i128, step: i128) -> i128 {
    if step > 0 {
        ceil_div(stop - start, step).max(0)
    } else {
        ceil_div(start - stop, -step).max(0)
    }
}

fn ceil_div(num: i128, den: i128) -> i128 {
    -((-num).div_euclid(den))
}

fn wide(offset: isize) -> i128 {
    offset as i128
}

fn narrow(value: i128) -> isize {
    value.clamp(isize::MIN as i128, isize::MAX as i128) as isize
}

fn parts(start: i128, stop: Option<i128>, step: i128) -> Range {
    Range::from_parts(narrow(start), stop.map(narrow), narrow(step))
}

// The shape-free canonical form is organized by the direction of the
// step and the signs of start and stop. For each of these cases the
// selection as a function of the axis length `n` is one of a handful
// of shapes. Selections that can reach two or more elements pin down
// their direction and stride, and the cases stay distinguishable, so
// only a few parameters have slack. Selections that never exceed one
// element are classified by `Single` instead, because very different
// ranges share those.
//
// The case analysis runs on `i128`. No axis is longer than
// `isize::MAX`, so the few results that leave the `isize` range are
// saturated without changing what they select.

/// A selection that never contains more than one element, as a
/// function of the axis length `n`. Off the stated domain nothing is
/// selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Single {
    /// Element `c` whenever `n > c`.
    Fixed(i128),
    /// Element `min(a, n - 1)` for `n >= lo`, with `1 <= lo <= a + 1`.
    HeadTail { a: i128, lo: i128 },
    /// Element `max(n + a, 0)` for `n >= lo`, with `1 <= lo <= -a`.
    EndTail { a: i128, lo: i128 },
    /// Element `min(a, n - 1)` for `1 <= n < hi`, with `hi >= a + 2`.
    HeadWindow { a: i128, hi: i128 },
    /// Element `max(n + a, 0)` for `1 <= n < hi`, with `hi >= 1 - a`.
    EndWindow { a: i128, hi: i128 },
}

impl Single {
    fn canonical(self) -> Range {
        match self {
            // Position `isize::MAX` is past the end of every axis.
            Single::Fixed(c) if c >= wide(isize::MAX) => Range::EMPTY,
            Single::Fixed(c) => parts(c, Some(c + 1), 1),
            Single::HeadTail { a, lo } if lo == a + 1 => Single::Fixed(a).canonical(),
            Single::HeadTail { a, lo: 1 } => parts(a, None, -(a + 1)),
            Single::HeadTail { a, lo } => parts(a, Some(lo - 2), lo - 2 - a),
            Single::EndTail { a, lo: 1 } => parts(a, None, -a),
            Single::EndTail { a, lo } => parts(a, Some(1 - lo), 1 - lo - a),
            Single::HeadWindow { a: 0, hi } => flat_window(hi),
            Single::HeadWindow { a, hi } if hi == a + 2 => ramp_window(hi),
            Single::HeadWindow { a, hi } => parts(a, Some(a - hi), -(a + 1).min(hi - a - 1)),
            Single::EndWindow { a, hi } if -a >= hi - 1 => flat_window(hi),
            Single::EndWindow { a: -1, hi } => ramp_window(hi),
            Single::EndWindow { a, hi } => parts(a, Some(hi + a), (hi + a).min(-a)),
        }
    }
}

/// Element 0 for `1 <= n < hi`.
fn flat_window(hi: i128) -> Range {
    parts(1 - hi, Some(1), 1)
}

/// Element `n - 1` for `1 <= n < hi`.
fn ramp_window(hi: i128) -> Range {
    parts(-1, Some(hi - 1), 1)
}

fn reduce_forward(start: i128, stop: Option<i128>, step: i128) -> Range {
    let a = start;
    match stop {
        None if a >= 0 => parts(a, None, step),
        None if step >= -a => Single::EndTail { a, lo: 1 }.canonical(),
        None => parts(a, None, step),
        Some(b) if a >= 0 && b >= 0 => match count(a, b, step) {
            0 => Range::EMPTY,
            1 => Single::Fixed(a).canonical(),
            len => parts(a, Some(a + (len - 1) * step + 1), step),
        },
        Some(b) if a >= 0 => parts(a, Some(b), step),
        Some(b) if b < 0 => match count(a, b, step) {
            0 => Range::EMPTY,
            1 => Single::EndTail { a, lo: 1 - b }.canonical(),
            _ => parts(a, Some(b), step),
        },
        Some(0) => Range::EMPTY,
        Some(b) if step >= b.min(-a) => Single::EndWindow { a, hi: b - a }.canonical(),
        Some(b) => parts(a, Some(b), step),
    }
}

fn reduce_backward(start: i128, stop: Option<i128>, stride: i128) -> Range {
    let a = start;
    let step = -stride;
    match stop {
        None if a >= 0 && a < stride => Single::HeadTail { a, lo: 1 }.canonical(),
        None => parts(a, None, step),
        Some(b) if a >= 0 && b >= 0 => {
            if a <= b {
                Range::EMPTY
            } else if a - b <= stride {
                Single::HeadTail { a, lo: b + 2 }.canonical()
            } else {
                parts(a, Some(b), step)
            }
        }
        Some(-1) if a >= 0 => Range::EMPTY,
        Some(b) if a >= 0 => {
            if stride >= (a + 1).min(-b - 1) {
                Single::HeadWindow { a, hi: a - b }.canonical()
            } else {
                parts(a, Some(b), step)
            }
        }
        Some(b) if b < 0 => {
            if a <= b {
                Range::EMPTY
            } else if a - b <= stride {
                Single::EndTail { a, lo: -a }.canonical()
            } else {
                // Only the element count matters here, so the stop is
                // pulled in next to the last element.
                let len = count(a, b, step);
                parts(a, Some(a - (len - 1) * stride - 1), step)
            }
        }
        Some(b) => parts(a, Some(b), step),
    }
}

fn max_len_forward(a: i128, stop: Option<i128>, step: i128) -> Option<i128> {
    match stop {
        None if a >= 0 => None,
        None => Some(ceil_div(-a, step)),
        Some(b) if a >= 0 && b < 0 => None,
        Some(b) if (a >= 0) == (b >= 0) => Some(count(a, b, step)),
        Some(b) => Some(ceil_div(b.min(-a), step)),
    }
}

fn max_len_backward(a: i128, stop: Option<i128>, stride: i128) -> Option<i128> {
    match stop {
        None if a >= 0 => Some(a / stride + 1),
        None => None,
        Some(b) if a < 0 && b >= 0 => None,
        Some(b) if (a >= 0) == (b >= 0) => Some(count(a, b, -stride)),
        Some(b) if b == -1 => Some(0),
        Some(b) => Some(ceil_div((a + 1).min(-b - 1), stride)),
    }
}
