use std::ops::Range;

use stackline_protocol::{FilterState, Milliseconds};

use crate::model::call_node::{CallNodeInfo, CallNodeTable};
use crate::model::profile::{FuncTable, SamplesTable, StringTable};

/// The per-sample call-node assignment every timing builder consumes.
///
/// Covers only the samples inside the committed range: `node[i]` belongs
/// to sample `sample_range.start + i`. `None` means the sample
/// contributes nothing (no stack captured, removed by the implementation
/// filter, or excluded by the search string).
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSamples {
    pub sample_range: Range<usize>,
    pub node: Vec<Option<usize>>,
}

impl FilteredSamples {
    pub fn len(&self) -> usize {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    /// The sample times this assignment covers.
    pub fn times<'a>(&self, samples: &'a SamplesTable) -> &'a [Milliseconds] {
        &samples.time[self.sample_range.clone()]
    }
}

/// Apply the current filter state to one thread's samples.
///
/// Range restriction is a binary search over the sorted sample times
/// (half-open, like the committed range itself). Hide-platform-details
/// collapses each node onto its nearest self-or-ancestor JS node,
/// falling back to the path's root when the whole path is native; the
/// collapse is idempotent. A non-empty search string keeps a sample only
/// if some node on its full call-node path has a function name
/// containing the search, case-insensitively.
pub fn filter_samples(
    samples: &SamplesTable,
    info: &CallNodeInfo,
    func_table: &FuncTable,
    string_table: &StringTable,
    state: &FilterState,
) -> FilteredSamples {
    let start = samples.time.partition_point(|&t| t < state.range.start);
    let end = samples.time.partition_point(|&t| t < state.range.end);
    let table = &info.table;

    // Per-node memo caches, filled lazily across the sample scan.
    let mut collapse_cache: Vec<Option<usize>> = vec![None; table.len()];
    let mut search_cache: Vec<Option<bool>> = vec![None; table.len()];
    let needle = state.search.to_lowercase();

    let mut node = Vec::with_capacity(end - start);
    for i in start..end {
        let mut assigned = samples.stack[i].and_then(|s| info.stack_to_node[s]);

        if state.hide_platform_details
            && let Some(n) = assigned
        {
            assigned = Some(collapse_platform(n, table, func_table, &mut collapse_cache));
        }

        if !needle.is_empty()
            && let Some(n) = assigned
            && !path_matches(n, table, func_table, string_table, &needle, &mut search_cache)
        {
            assigned = None;
        }

        node.push(assigned);
    }

    FilteredSamples {
        sample_range: start..end,
        node,
    }
}

/// Nearest self-or-ancestor JS node, else the path's root. Both targets
/// are fixed points of this function, which is what makes the collapse
/// idempotent.
fn collapse_platform(
    node: usize,
    table: &CallNodeTable,
    func_table: &FuncTable,
    cache: &mut [Option<usize>],
) -> usize {
    if let Some(collapsed) = cache[node] {
        return collapsed;
    }
    let mut js_ancestor = None;
    let mut current = Some(node);
    let mut root = node;
    while let Some(n) = current {
        if func_table.is_js[table.func[n]] {
            js_ancestor = Some(n);
            break;
        }
        root = n;
        current = table.parent[n];
    }
    let collapsed = js_ancestor.unwrap_or(root);
    cache[node] = Some(collapsed);
    collapsed
}

fn path_matches(
    node: usize,
    table: &CallNodeTable,
    func_table: &FuncTable,
    string_table: &StringTable,
    needle: &str,
    cache: &mut Vec<Option<bool>>,
) -> bool {
    if let Some(matched) = cache[node] {
        return matched;
    }
    let name = string_table.get(func_table.name[table.func[node]]);
    let parent = table.parent[node];
    let matched = name.to_lowercase().contains(needle)
        || parent.is_some_and(|p| path_matches(p, table, func_table, string_table, needle, cache));
    cache[node] = Some(matched);
    matched
}
