use serde::{Deserialize, Serialize};

use crate::types::Milliseconds;

/// One visual lane of derived timing: three parallel sequences of equal
/// length holding `[start, end)` intervals and the entity each interval
/// represents.
///
/// What `index` points at depends on the producer: a call-node index for
/// stack-chart and flame-graph rows, a category index for the
/// leaf-category row, a marker index for marker rows.
///
/// Invariant: intervals are sorted by start and pairwise non-overlapping
/// (`end[i] <= start[i + 1]`), which is what makes [`TimingRow::hit_test`]
/// a plain binary search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingRow {
    pub start: Vec<Milliseconds>,
    pub end: Vec<Milliseconds>,
    pub index: Vec<usize>,
}

impl TimingRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Append an interval. Callers are responsible for keeping the row
    /// sorted and non-overlapping.
    pub fn push(&mut self, start: Milliseconds, end: Milliseconds, index: usize) {
        debug_assert!(end >= start);
        debug_assert!(self.end.last().is_none_or(|&prev| prev <= start));
        self.start.push(start);
        self.end.push(end);
        self.index.push(index);
    }

    /// Find the interval containing `time`, if any, and return its
    /// position within the row.
    ///
    /// Bisection-right over `start`: the candidate is the last interval
    /// starting at or before `time`, accepted only if its end reaches
    /// `time`.
    pub fn hit_test(&self, time: Milliseconds) -> Option<usize> {
        let i = self.start.partition_point(|&s| s <= time);
        if i == 0 {
            return None;
        }
        let candidate = i - 1;
        (self.end[candidate] >= time).then_some(candidate)
    }
}

/// Map a pixel y offset within a track to its visual lane.
pub fn lane_for_y(y: f64, row_height: f64) -> usize {
    debug_assert!(row_height > 0.0);
    if y < 0.0 { 0 } else { (y / row_height) as usize }
}
