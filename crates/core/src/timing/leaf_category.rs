use stackline_protocol::{Milliseconds, TimingRow};

use crate::model::call_node::CallNodeTable;
use crate::timing::interval::build_timing_row;
use crate::timing::sample_filter::FilteredSamples;

/// Leaf-category timing: a single row where each sample contributes the
/// category of its post-filter leaf node. Adjacent samples in the same
/// category merge, so the row reads as "what kind of work ran when".
/// `index` holds category indices.
pub fn leaf_category_timing(
    filtered: &FilteredSamples,
    sample_times: &[Milliseconds],
    call_nodes: &CallNodeTable,
    interval: Milliseconds,
) -> TimingRow {
    debug_assert_eq!(filtered.len(), sample_times.len());
    build_timing_row(
        sample_times,
        |i| filtered.node[i].map(|node| call_nodes.category[node]),
        interval,
    )
}
