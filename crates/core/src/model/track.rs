use serde::{Deserialize, Serialize};
use stackline_protocol::TimingRow;

/// Which timing derivation a track renders.
///
/// A closed set: the dispatch in [`crate::timing::compute_track_timing`]
/// matches exhaustively, so adding a kind is a compile-time-checked
/// change everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    StackChart,
    FlameGraph,
    LeafCategory,
    Markers,
}

/// Timing payload for one track, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackTiming {
    /// One row per call-tree depth, `index` = call-node indices.
    StackChart(Vec<TimingRow>),
    /// One row per depth in normalized [0, 1] units, `index` = call-node
    /// indices.
    FlameGraph(Vec<TimingRow>),
    /// A single row, `index` = category indices.
    LeafCategory(TimingRow),
    /// Packed logical rows, `index` = marker indices.
    Markers(Vec<TimingRow>),
}

impl TrackTiming {
    pub fn kind(&self) -> TrackKind {
        match self {
            TrackTiming::StackChart(_) => TrackKind::StackChart,
            TrackTiming::FlameGraph(_) => TrackKind::FlameGraph,
            TrackTiming::LeafCategory(_) => TrackKind::LeafCategory,
            TrackTiming::Markers(_) => TrackKind::Markers,
        }
    }
}

/// A track is one horizontal strip of the timeline: a view kind over one
/// thread, with a fixed height the rendering layer stacks vertically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub kind: TrackKind,
    pub thread_index: usize,
    /// Height in logical pixels.
    pub height: f64,
}
