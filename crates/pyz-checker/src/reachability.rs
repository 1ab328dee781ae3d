//! Flow-reachability queries.
//!
//! Pure lookup over the binder's control-flow graph: flow nodes are only
//! attached to statement-level nodes, so expression nodes inherit their
//! statement's reachability by walking upward. No analysis happens here.

use pyz_binder::flow_flags;
use pyz_common::limits::MAX_TREE_WALK_ITERATIONS;
use pyz_parser::NodeIndex;

use crate::state::CheckerState;

impl CheckerState<'_> {
    /// Whether `node` is statically unreachable. Returns `false` when no
    /// ancestor carries a flow node: absence of flow information means the
    /// binder considered the code live.
    pub fn is_unreachable(&self, node: NodeIndex) -> bool {
        let mut current = node;
        let mut iterations = 0u32;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return false;
            }
            if let Some(flow) = self.ctx.analysis.flow_node(current) {
                return self
                    .ctx
                    .binder
                    .flow_nodes
                    .get(flow)
                    .is_some_and(|n| n.has_any_flags(flow_flags::UNREACHABLE));
            }
            current = self.ctx.arena.parent(current);
        }
        false
    }

    pub fn is_reachable(&self, node: NodeIndex) -> bool {
        !self.is_unreachable(node)
    }

    /// The subset of `statements` that is unreachable, in input order.
    pub fn unreachable_statements(&self, statements: &[NodeIndex]) -> Vec<NodeIndex> {
        statements
            .iter()
            .copied()
            .filter(|&stmt| self.is_unreachable(stmt))
            .collect()
    }
}
