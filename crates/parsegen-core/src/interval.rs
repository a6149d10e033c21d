//! Sorted interval sets over token types and Unicode code points.
//!
//! The set is kept as a sorted list of disjoint, non-adjacent, inclusive
//! intervals. All mutating operations restore that invariant, so membership
//! and intersection tests are binary/linear over a small list.

use std::fmt;

/// Inclusive interval `[a, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    pub fn contains(&self, v: i32) -> bool {
        self.a <= v && v <= self.b
    }

    /// Number of elements in the interval.
    pub fn len(&self) -> u64 {
        (self.b - self.a) as u64 + 1
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.a <= other.b && other.a <= self.b
    }

    /// True when the union of the two intervals is a single interval.
    fn touches(&self, other: &Interval) -> bool {
        self.a <= other.b.saturating_add(1) && other.a <= self.b.saturating_add(1)
    }

    fn intersection(&self, other: &Interval) -> Option<Interval> {
        let a = self.a.max(other.a);
        let b = self.b.min(other.b);
        (a <= b).then_some(Interval::new(a, b))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == self.b {
            write!(f, "{}", self.a)
        } else {
            write!(f, "{}..{}", self.a, self.b)
        }
    }
}

/// Set of integers stored as sorted disjoint intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Singleton set.
    pub fn of(v: i32) -> Self {
        let mut s = Self::new();
        s.add(v);
        s
    }

    /// Set holding the inclusive range `[a, b]`.
    pub fn of_range(a: i32, b: i32) -> Self {
        let mut s = Self::new();
        s.add_range(a, b);
        s
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total number of elements across all intervals.
    pub fn len(&self) -> u64 {
        self.intervals.iter().map(Interval::len).sum()
    }

    pub fn contains(&self, v: i32) -> bool {
        self.intervals
            .binary_search_by(|iv| {
                if v < iv.a {
                    std::cmp::Ordering::Greater
                } else if v > iv.b {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn min(&self) -> Option<i32> {
        self.intervals.first().map(|iv| iv.a)
    }

    pub fn max(&self) -> Option<i32> {
        self.intervals.last().map(|iv| iv.b)
    }

    pub fn add(&mut self, v: i32) {
        self.add_range(v, v);
    }

    /// Add `[a, b]`, returning the sub-intervals that were already present.
    ///
    /// Callers that must diagnose duplicate characters (charset collision
    /// checks) inspect the returned overlaps; plain union callers ignore them.
    pub fn add_range(&mut self, a: i32, b: i32) -> Vec<Interval> {
        assert!(a <= b, "empty interval {a}..{b}");
        let added = Interval::new(a, b);
        let mut overlaps = Vec::new();

        // Collect every existing interval the new one touches, recording
        // genuine overlaps (shared elements, not mere adjacency).
        let mut merged = added;
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut placed = false;
        for iv in &self.intervals {
            if iv.touches(&merged) {
                if let Some(ov) = iv.intersection(&added) {
                    overlaps.push(ov);
                }
                merged = Interval::new(merged.a.min(iv.a), merged.b.max(iv.b));
            } else if iv.b < merged.a {
                out.push(*iv);
            } else {
                if !placed {
                    out.push(merged);
                    placed = true;
                }
                out.push(*iv);
            }
        }
        if !placed {
            out.push(merged);
        }
        self.intervals = out;
        overlaps
    }

    /// Union with another set, ignoring overlaps.
    pub fn union(&mut self, other: &IntervalSet) {
        for iv in &other.intervals {
            self.add_range(iv.a, iv.b);
        }
    }

    /// True when the two sets share at least one element.
    pub fn intersects(&self, other: &IntervalSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let (x, y) = (&self.intervals[i], &other.intervals[j]);
            if x.overlaps(y) {
                return true;
            }
            if x.b < y.b {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Elements of `self` also present in `other`.
    pub fn intersection(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = IntervalSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let (x, y) = (&self.intervals[i], &other.intervals[j]);
            if let Some(iv) = x.intersection(y) {
                out.add_range(iv.a, iv.b);
            }
            if x.b < y.b {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    /// Elements of `[universe_min, universe_max]` not present in `self`.
    pub fn complement(&self, universe_min: i32, universe_max: i32) -> IntervalSet {
        let mut out = IntervalSet::new();
        let mut next = universe_min;
        for iv in &self.intervals {
            if iv.b < universe_min {
                continue;
            }
            if iv.a > universe_max {
                break;
            }
            if iv.a > next {
                out.add_range(next, iv.a - 1);
            }
            next = next.max(iv.b.saturating_add(1));
        }
        if next <= universe_max {
            out.add_range(next, universe_max);
        }
        out
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Iterate every element. Intended for small sets (tests, vocab emission).
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().flat_map(|iv| iv.a..=iv.b)
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{iv}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<i32> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        let mut s = IntervalSet::new();
        for v in iter {
            s.add(v);
        }
        s
    }
}
