//! One-dimensional range arithmetic shared by collision and visibility tests.

/// Closed range `[start, end]` on a single axis.
///
/// Endpoints are always stored in ascending order, so a projected interval can
/// be built from two arbitrary scalar projections without sorting them first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    start: f32,
    end: f32,
}

impl Interval {
    /// Creates an interval spanning the two provided values in either order.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Creates an interval centred on `center` extending `half_width` both ways.
    #[must_use]
    pub fn around(center: f32, half_width: f32) -> Self {
        Self::new(center - half_width, center + half_width)
    }

    /// Lower bound of the interval.
    #[must_use]
    pub const fn start(&self) -> f32 {
        self.start
    }

    /// Upper bound of the interval.
    #[must_use]
    pub const fn end(&self) -> f32 {
        self.end
    }

    /// Distance between the two bounds.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    /// Reports whether `value` lies within the closed interval.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        self.start <= value && value <= self.end
    }

    /// Reports whether `other` lies entirely within this interval.
    #[must_use]
    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection of the two intervals, or `None` when they are disjoint.
    ///
    /// Intervals that merely touch produce a zero-length intersection.
    #[must_use]
    pub fn overlap(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Interval { start, end })
    }

    /// Length of the intersection, zero when the intervals are disjoint.
    #[must_use]
    pub fn overlap_length(&self, other: &Interval) -> f32 {
        self.overlap(other).map_or(0.0, |overlap| overlap.length())
    }

    /// Returns the interval moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: f32) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}
