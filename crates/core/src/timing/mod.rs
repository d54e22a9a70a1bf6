pub mod flame_graph;
pub mod interval;
pub mod leaf_category;
pub mod marker_rows;
pub mod max_depth;
pub mod sample_filter;
pub mod stack_chart;

pub use flame_graph::flame_graph_timing;
pub use interval::build_timing_row;
pub use leaf_category::leaf_category_timing;
pub use marker_rows::{MARKER_ROW_HEIGHT, MARKER_ROW_REPEAT, lane_for_row, marker_timing_rows};
pub use max_depth::compute_max_depth;
pub use sample_filter::{FilteredSamples, filter_samples};
pub use stack_chart::stack_timing_by_depth;

use stackline_protocol::{FilterState, Milliseconds};

use crate::model::call_node::{CallNodeInfo, build_call_node_info};
use crate::model::profile::Thread;
use crate::model::track::{TrackKind, TrackTiming};

/// Derive the timing payload for one track of one thread.
///
/// This is the closed dispatch over track kinds: every variant of
/// [`TrackKind`] is matched here, so a new kind fails to compile until
/// it gets a derivation. `interval` is the profile's nominal sampling
/// interval from its metadata.
pub fn compute_track_timing(
    thread: &Thread,
    interval: Milliseconds,
    state: &FilterState,
    kind: TrackKind,
) -> TrackTiming {
    match kind {
        TrackKind::StackChart => {
            let (info, filtered) = derive_samples(thread, state);
            let timing = stack_timing_by_depth(
                &filtered,
                filtered.times(&thread.samples),
                &info.table,
                interval,
            );
            TrackTiming::StackChart(timing)
        }
        TrackKind::FlameGraph => {
            let (info, filtered) = derive_samples(thread, state);
            TrackTiming::FlameGraph(flame_graph_timing(
                &filtered,
                &info.table,
                &thread.func_table,
                &thread.string_table,
            ))
        }
        TrackKind::LeafCategory => {
            let (info, filtered) = derive_samples(thread, state);
            let row = leaf_category_timing(
                &filtered,
                filtered.times(&thread.samples),
                &info.table,
                interval,
            );
            TrackTiming::LeafCategory(row)
        }
        TrackKind::Markers => TrackTiming::Markers(marker_timing_rows(&thread.markers)),
    }
}

/// Shared front half of every sample-based derivation: build the call
/// tree for the current filters, then map samples through it.
fn derive_samples(thread: &Thread, state: &FilterState) -> (CallNodeInfo, FilteredSamples) {
    let info = build_call_node_info(
        &thread.stack_table,
        &thread.func_table,
        state.implementation,
        state.invert_callstack,
    );
    let filtered = filter_samples(
        &thread.samples,
        &info,
        &thread.func_table,
        &thread.string_table,
        state,
    );
    (info, filtered)
}
