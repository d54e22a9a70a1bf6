use std::cmp::Ordering;

use stackline_protocol::TimingRow;

use crate::model::call_node::CallNodeTable;
use crate::model::profile::{FuncTable, StringTable};
use crate::timing::sample_filter::FilteredSamples;

/// Flame-graph timing: one row per depth, spans in normalized [0, 1]
/// horizontal units rather than time.
///
/// Every visible leaf sample adds one unit of self time to its node;
/// a node's span is proportional to its subtree total (self plus
/// descendants). Layout is depth-first with siblings ordered by total
/// descending, ties broken by function name and then node index, and
/// children laid out contiguously from the parent's left edge — so the
/// output is fully deterministic and non-overlapping by construction.
pub fn flame_graph_timing(
    filtered: &FilteredSamples,
    call_nodes: &CallNodeTable,
    func_table: &FuncTable,
    string_table: &StringTable,
) -> Vec<TimingRow> {
    let node_count = call_nodes.len();
    let mut total = vec![0.0f64; node_count];
    for node in filtered.node.iter().flatten() {
        total[*node] += 1.0;
    }
    // Children sit at higher indices than parents, so one reverse scan
    // folds self times up into subtree totals.
    for node in (0..node_count).rev() {
        if total[node] > 0.0
            && let Some(parent) = call_nodes.parent[node]
        {
            total[parent] += total[node];
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for node in 0..node_count {
        if total[node] <= 0.0 {
            continue;
        }
        match call_nodes.parent[node] {
            Some(parent) => children[parent].push(node),
            None => roots.push(node),
        }
    }

    let full_total: f64 = roots.iter().map(|&r| total[r]).sum();
    if full_total <= 0.0 {
        return Vec::new();
    }

    let heaviest_first = |&a: &usize, &b: &usize| -> Ordering {
        total[b].total_cmp(&total[a]).then_with(|| {
            let name_a = string_table.get(func_table.name[call_nodes.func[a]]);
            let name_b = string_table.get(func_table.name[call_nodes.func[b]]);
            name_a.cmp(name_b).then(a.cmp(&b))
        })
    };
    roots.sort_by(heaviest_first);
    for siblings in &mut children {
        siblings.sort_by(heaviest_first);
    }

    let mut rows: Vec<TimingRow> = Vec::new();
    // Depth-first with an explicit stack; children are pushed reversed
    // so the heaviest pops first and each row fills left to right.
    //
    // Work items carry the cumulative sample weight to a node's left
    // edge, not a pre-divided fraction. Weights are exact integer-valued
    // floats, so both edges come from a single rounded division and two
    // spans meeting at the same cumulative weight share the exact same
    // float — summing per-sibling fractions instead can overshoot the
    // next span's start by an ulp.
    let mut work: Vec<(usize, f64)> = Vec::with_capacity(roots.len());
    let mut weight_before = 0.0;
    for &root in &roots {
        work.push((root, weight_before));
        weight_before += total[root];
    }
    work.reverse();

    while let Some((node, left_weight)) = work.pop() {
        let depth = call_nodes.depth[node];
        if rows.len() <= depth {
            rows.resize_with(depth + 1, TimingRow::new);
        }
        let start = left_weight / full_total;
        let end = (left_weight + total[node]) / full_total;
        rows[depth].push(start, end, node);

        let mut child_weight = left_weight;
        let mut child_seeds: Vec<(usize, f64)> = Vec::with_capacity(children[node].len());
        for &child in &children[node] {
            child_seeds.push((child, child_weight));
            child_weight += total[child];
        }
        work.extend(child_seeds.into_iter().rev());
    }

    rows
}
