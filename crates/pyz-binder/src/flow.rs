//! Control-flow graph nodes.
//!
//! Flow nodes are produced by the binder during graph construction; the
//! checker only reads their flags. Reachability is recorded as a flag on
//! the node rather than re-derived, so lookups stay O(1).

use smallvec::SmallVec;

pub mod flow_flags {
    pub const UNREACHABLE: u32 = 1 << 0;
    pub const START: u32 = 1 << 1;
    pub const ASSIGNMENT: u32 = 1 << 2;
    pub const BRANCH_LABEL: u32 = 1 << 3;
    pub const LOOP_LABEL: u32 = 1 << 4;
    pub const CALL: u32 = 1 << 5;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlowNodeId(pub u32);

impl FlowNodeId {
    pub const NONE: FlowNodeId = FlowNodeId(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Clone, Debug)]
pub struct FlowNode {
    pub flags: u32,
    pub antecedents: SmallVec<[FlowNodeId; 2]>,
}

impl FlowNode {
    pub fn has_any_flags(&self, flags: u32) -> bool {
        (self.flags & flags) != 0
    }
}

pub struct FlowNodeArena {
    nodes: Vec<FlowNode>,
}

impl FlowNodeArena {
    pub fn new() -> FlowNodeArena {
        FlowNodeArena { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, flags: u32) -> FlowNodeId {
        let id = FlowNodeId(self.nodes.len() as u32);
        self.nodes.push(FlowNode {
            flags,
            antecedents: SmallVec::new(),
        });
        id
    }

    pub fn add_antecedent(&mut self, node: FlowNodeId, antecedent: FlowNodeId) {
        if let Some(n) = self.nodes.get_mut(node.0 as usize) {
            n.antecedents.push(antecedent);
        }
    }

    pub fn get(&self, id: FlowNodeId) -> Option<&FlowNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }
}
