use stackline_protocol::{Milliseconds, TimingRow};

use crate::model::profile::RawMarkerTable;

/// Height of one marker lane in logical pixels.
pub const MARKER_ROW_HEIGHT: f64 = 16.0;

/// Fixed number of visual lanes a marker track draws. Logical rows wrap
/// onto these cyclically, so a track's height stays bounded no matter
/// how deeply markers overlap.
pub const MARKER_ROW_REPEAT: usize = 7;

/// Pack markers into the minimum number of non-overlapping logical rows.
///
/// Markers must arrive sorted by start time (asserted). Each one goes
/// into the lowest-numbered row whose last interval ends at or before
/// the marker's start; if none qualifies, a new row opens. Point markers
/// occupy a zero-length interval at their start. Every produced row is
/// sorted by start, ready for binary-search hit-testing; `index` holds
/// marker indices.
///
/// Rows beyond [`MARKER_ROW_REPEAT`] share a visual lane with earlier
/// rows (see [`lane_for_row`]) and may overlap on screen. That is the
/// accepted price of a bounded track height.
pub fn marker_timing_rows(markers: &RawMarkerTable) -> Vec<TimingRow> {
    let mut rows: Vec<TimingRow> = Vec::new();
    let mut prev_start = f64::NEG_INFINITY;

    for marker in 0..markers.len() {
        let start = markers.start_time[marker];
        let end = markers.effective_end(marker);
        assert!(start >= prev_start, "markers must be sorted by start time");
        prev_start = start;

        let row = rows
            .iter()
            .position(|r| r.end.last().is_none_or(|&last| last <= start));
        let row = match row {
            Some(r) => r,
            None => {
                rows.push(TimingRow::new());
                rows.len() - 1
            }
        };
        rows[row].push(start, end, marker);
    }

    rows
}

/// The visual lane a logical row draws into.
pub fn lane_for_row(row: usize) -> usize {
    row % MARKER_ROW_REPEAT
}

/// Resolve a pointer hit on a marker track: check every logical row that
/// draws into `lane`, earliest row first, and return the marker index
/// under `time` if any.
pub fn hit_test(rows: &[TimingRow], lane: usize, time: Milliseconds) -> Option<usize> {
    rows.iter()
        .enumerate()
        .filter(|(row, _)| lane_for_row(*row) == lane)
        .find_map(|(_, row)| row.hit_test(time).map(|pos| row.index[pos]))
}
