use crate::model::call_node::CallNodeTable;
use crate::timing::sample_filter::FilteredSamples;

/// Deepest call-node depth among the visible samples.
///
/// `None` is the "no rows" sentinel: the committed range holds no sample
/// with a usable node. Callers must treat it differently from `Some(0)`,
/// which means root-level samples exist.
pub fn compute_max_depth(filtered: &FilteredSamples, call_nodes: &CallNodeTable) -> Option<usize> {
    filtered
        .node
        .iter()
        .flatten()
        .map(|&node| call_nodes.depth[node])
        .max()
}
