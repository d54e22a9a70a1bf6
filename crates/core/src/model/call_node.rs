use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use stackline_protocol::ImplementationFilter;

use crate::model::profile::{FuncTable, StackTable};

/// Deduplicated call-tree forest, arena-with-parent-index layout.
///
/// Nodes are identified by `(func, parent node)`: every raw stack whose
/// chain of kept frames spells the same call path collapses onto one
/// node. Parents always sit at smaller indices than their children, so a
/// single forward scan visits parents first and a reverse scan visits
/// children first. Roots have depth 0 and `parent[root] = None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallNodeTable {
    pub func: Vec<usize>,
    pub parent: Vec<Option<usize>>,
    pub depth: Vec<usize>,
    pub category: Vec<usize>,
}

impl CallNodeTable {
    pub fn len(&self) -> usize {
        self.func.len()
    }

    pub fn is_empty(&self) -> bool {
        self.func.is_empty()
    }

    /// The node at `depth` on the path from the root to `node`, or
    /// `None` when the path is shorter than `depth + 1`.
    pub fn ancestor_at_depth(&self, node: usize, depth: usize) -> Option<usize> {
        if self.depth[node] < depth {
            return None;
        }
        let mut n = node;
        while self.depth[n] > depth {
            n = self.parent[n]?;
        }
        Some(n)
    }

    fn push(&mut self, func: usize, parent: Option<usize>, category: usize) -> usize {
        let depth = parent.map_or(0, |p| self.depth[p] + 1);
        self.func.push(func);
        self.parent.push(parent);
        self.depth.push(depth);
        self.category.push(category);
        self.func.len() - 1
    }
}

/// A call-node forest together with the mapping from raw stack index to
/// the node that stack collapsed onto. `None` means every frame of the
/// stack was removed by the implementation filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CallNodeInfo {
    pub table: CallNodeTable,
    pub stack_to_node: Vec<Option<usize>>,
}

/// Build the call-node forest for one thread.
///
/// The forward walk visits stacks in table order (parents first), maps
/// each stack's prefix to its already-built parent node, drops frames
/// the implementation filter rejects, and interns by `(func, parent)`.
///
/// When `invert` is set the tree is instead rooted at each stack's leaf
/// frame and grown outward toward the original roots. The inverted
/// forest is a disjoint index space: its node indices carry no
/// relationship whatsoever to the forward forest's indices.
///
/// A malformed stack table (prefix not preceding its stack) is a
/// programming error in the upstream loader and fails fast here.
pub fn build_call_node_info(
    stack_table: &StackTable,
    func_table: &FuncTable,
    implementation: ImplementationFilter,
    invert: bool,
) -> CallNodeInfo {
    if invert {
        build_inverted(stack_table, func_table, implementation)
    } else {
        build_forward(stack_table, func_table, implementation)
    }
}

fn build_forward(
    stack_table: &StackTable,
    func_table: &FuncTable,
    implementation: ImplementationFilter,
) -> CallNodeInfo {
    let mut table = CallNodeTable::default();
    let mut index_of: HashMap<(usize, Option<usize>), usize> = HashMap::new();
    let mut stack_to_node: Vec<Option<usize>> = vec![None; stack_table.len()];

    for s in 0..stack_table.len() {
        let prefix = stack_table.prefix[s];
        assert!(
            prefix.is_none_or(|p| p < s),
            "stack table must list prefixes before their stacks"
        );
        let parent = prefix.and_then(|p| stack_to_node[p]);
        let func = stack_table.func[s];
        if !implementation.matches(func_table.is_js[func]) {
            // Filtered frame: the stack collapses onto its filtered parent.
            stack_to_node[s] = parent;
            continue;
        }
        let node = intern(&mut table, &mut index_of, func, parent, stack_table.category[s]);
        stack_to_node[s] = Some(node);
    }

    CallNodeInfo { table, stack_to_node }
}

fn build_inverted(
    stack_table: &StackTable,
    func_table: &FuncTable,
    implementation: ImplementationFilter,
) -> CallNodeInfo {
    let mut table = CallNodeTable::default();
    let mut index_of: HashMap<(usize, Option<usize>), usize> = HashMap::new();
    let mut stack_to_node: Vec<Option<usize>> = vec![None; stack_table.len()];
    let mut kept: Vec<(usize, usize)> = Vec::new();

    for s in 0..stack_table.len() {
        // Collect the kept frames leaf-first, then grow a path rooted at
        // the leaf.
        kept.clear();
        let mut current = Some(s);
        while let Some(i) = current {
            let func = stack_table.func[i];
            if implementation.matches(func_table.is_js[func]) {
                kept.push((func, stack_table.category[i]));
            }
            let prefix = stack_table.prefix[i];
            assert!(
                prefix.is_none_or(|p| p < i),
                "stack table must list prefixes before their stacks"
            );
            current = prefix;
        }

        let mut node = None;
        for &(func, category) in &kept {
            node = Some(intern(&mut table, &mut index_of, func, node, category));
        }
        stack_to_node[s] = node;
    }

    CallNodeInfo { table, stack_to_node }
}

fn intern(
    table: &mut CallNodeTable,
    index_of: &mut HashMap<(usize, Option<usize>), usize>,
    func: usize,
    parent: Option<usize>,
    category: usize,
) -> usize {
    *index_of
        .entry((func, parent))
        .or_insert_with(|| table.push(func, parent, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::{FuncTable, StackTable};

    /// Stacks:  A        A→B      A→B→C    A→X(native)→D
    fn fixture() -> (StackTable, FuncTable) {
        let stack_table = StackTable {
            func: vec![0, 1, 2, 3, 4],
            category: vec![0, 0, 1, 0, 1],
            prefix: vec![None, Some(0), Some(1), Some(0), Some(3)],
        };
        let func_table = FuncTable {
            name: vec![0, 1, 2, 3, 4],
            is_js: vec![true, true, true, false, true],
        };
        (stack_table, func_table)
    }

    /// Funcs on the path from `node` up to its root, leaf-first.
    fn func_path(table: &CallNodeTable, node: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            path.push(table.func[n]);
            current = table.parent[n];
        }
        path
    }

    #[test]
    fn merges_stacks_by_func_and_parent() {
        let (stacks, funcs) = fixture();
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, false);
        // Five stacks, five distinct call paths, five nodes.
        assert_eq!(info.table.len(), 5);
        // Shared prefix A maps both chains onto the same root node.
        let b = info.stack_to_node[1].unwrap();
        let x = info.stack_to_node[3].unwrap();
        assert_eq!(info.table.parent[b], info.table.parent[x]);
    }

    #[test]
    fn depth_tracks_parent_depth() {
        let (stacks, funcs) = fixture();
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, false);
        for n in 0..info.table.len() {
            match info.table.parent[n] {
                Some(p) => {
                    assert!(p < n, "parents precede children");
                    assert_eq!(info.table.depth[n], info.table.depth[p] + 1);
                }
                None => assert_eq!(info.table.depth[n], 0),
            }
        }
    }

    #[test]
    fn implementation_filter_folds_frames_into_parent() {
        let (stacks, funcs) = fixture();
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Js, false);
        // Stack 3 is A→X with X native: it collapses onto A's node.
        assert_eq!(info.stack_to_node[3], info.stack_to_node[0]);
        // Stack 4 is A→X→D: D's parent skips X and attaches to A.
        let d = info.stack_to_node[4].unwrap();
        assert_eq!(info.table.parent[d], info.stack_to_node[0]);
        assert_eq!(info.table.depth[d], 1);
    }

    #[test]
    fn fully_filtered_stack_maps_to_none() {
        let stacks = StackTable {
            func: vec![0],
            category: vec![0],
            prefix: vec![None],
        };
        let funcs = FuncTable {
            name: vec![0],
            is_js: vec![false],
        };
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Js, false);
        assert!(info.table.is_empty());
        assert_eq!(info.stack_to_node[0], None);
    }

    #[test]
    fn ancestor_at_depth_walks_the_path() {
        let (stacks, funcs) = fixture();
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, false);
        let c = info.stack_to_node[2].unwrap();
        let a = info.stack_to_node[0].unwrap();
        assert_eq!(info.table.ancestor_at_depth(c, 0), Some(a));
        assert_eq!(info.table.ancestor_at_depth(c, 2), Some(c));
        assert_eq!(info.table.ancestor_at_depth(a, 2), None);
    }

    #[test]
    fn inversion_preserves_path_sets() {
        let (stacks, funcs) = fixture();
        let forward = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, false);
        let inverted = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, true);

        // Walking an inverted node upward spells the original path
        // root-first; reversing the forward walk must agree, stack by
        // stack. Two inversions therefore restore the original path set.
        for s in 0..stacks.len() {
            let f = forward.stack_to_node[s].unwrap();
            let i = inverted.stack_to_node[s].unwrap();
            let mut forward_path = func_path(&forward.table, f);
            forward_path.reverse();
            assert_eq!(func_path(&inverted.table, i), forward_path);
        }
    }

    #[test]
    fn inverted_tree_merges_common_leaves() {
        // Two stacks with the same leaf func C: A→C and B→C.
        let stacks = StackTable {
            func: vec![0, 1, 2, 2],
            category: vec![0, 0, 0, 0],
            prefix: vec![None, None, Some(0), Some(1)],
        };
        let funcs = FuncTable {
            name: vec![0, 1, 2],
            is_js: vec![true, true, true],
        };
        let info = build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, true);
        let c_from_a = info.stack_to_node[2].unwrap();
        let c_from_b = info.stack_to_node[3].unwrap();
        // Both paths hang off one shared leaf-rooted node for C.
        assert_eq!(info.table.parent[c_from_a], info.table.parent[c_from_b]);
        assert_eq!(info.table.depth[c_from_a], 1);
    }

    #[test]
    #[should_panic(expected = "prefixes before their stacks")]
    fn panics_on_out_of_order_prefix() {
        let stacks = StackTable {
            func: vec![0, 0],
            category: vec![0, 0],
            prefix: vec![Some(1), None],
        };
        let funcs = FuncTable {
            name: vec![0],
            is_js: vec![true],
        };
        build_call_node_info(&stacks, &funcs, ImplementationFilter::Combined, false);
    }
}
