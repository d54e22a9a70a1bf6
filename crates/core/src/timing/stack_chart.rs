use stackline_protocol::{Milliseconds, TimingRow};

use crate::model::call_node::CallNodeTable;
use crate::timing::interval::build_timing_row;
use crate::timing::max_depth::compute_max_depth;
use crate::timing::sample_filter::FilteredSamples;

/// Stack-chart timing: one row per call-tree depth.
///
/// Row `d` carries, for every visible sample whose path is at least
/// `d + 1` deep, the call node at depth `d` on that path; shallower
/// samples leave gaps. Rows run exactly from depth 0 to the deepest
/// visible sample, so no produced row is empty. `interval` is the
/// profile's sampling interval, used as the synthetic width of a
/// trailing single-sample box.
pub fn stack_timing_by_depth(
    filtered: &FilteredSamples,
    sample_times: &[Milliseconds],
    call_nodes: &CallNodeTable,
    interval: Milliseconds,
) -> Vec<TimingRow> {
    debug_assert_eq!(filtered.len(), sample_times.len());
    let Some(max_depth) = compute_max_depth(filtered, call_nodes) else {
        return Vec::new();
    };

    (0..=max_depth)
        .map(|depth| {
            build_timing_row(
                sample_times,
                |i| {
                    filtered.node[i].and_then(|node| call_nodes.ancestor_at_depth(node, depth))
                },
                interval,
            )
        })
        .collect()
}
