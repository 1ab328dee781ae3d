//! Core node types and kind-specific payload structs.

/// Index of a node in its arena. `NONE` is the absent sentinel; optional
/// child links use it instead of `Option` to keep payload structs compact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// An ordered list of child nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// The core node record: kind, byte range, and an index into the
/// kind-specific data pool (`u32::MAX` for token-like nodes with no
/// payload).
#[derive(Copy, Clone, Debug)]
pub struct Node {
    pub kind: u16,
    pub pos: u32,
    pub end: u32,
    pub(crate) data: u32,
}

impl Node {
    pub(crate) const NO_DATA: u32 = u32::MAX;

    pub fn new(kind: u16, pos: u32, end: u32) -> Node {
        Node {
            kind,
            pos,
            end,
            data: Self::NO_DATA,
        }
    }
}

/// Per-node info kept outside the core record. Parent pointers are wired
/// at creation time (children are created before parents).
#[derive(Copy, Clone, Debug)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
}

impl Default for ExtendedNodeInfo {
    fn default() -> Self {
        Self {
            parent: NodeIndex::NONE,
        }
    }
}

// ============================================================================
// Kind-specific payloads
// ============================================================================

#[derive(Clone, Debug)]
pub struct ModuleData {
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct SuiteData {
    pub statements: NodeList,
}

#[derive(Clone, Debug)]
pub struct ClassData {
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    pub decorators: NodeList,
    /// Base classes and keyword arguments (e.g. `metaclass=`) in the
    /// class statement's argument list.
    pub arguments: NodeList,
    pub suite: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct FunctionData {
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    pub decorators: NodeList,
    pub parameters: NodeList,
    pub return_annotation: NodeIndex,
    pub suite: NodeIndex,
    pub is_async: bool,
}

#[derive(Clone, Debug)]
pub struct LambdaData {
    pub parameters: NodeList,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct ComprehensionData {
    pub expression: NodeIndex,
    /// `for` and `if` clauses in document order; the first entry is always
    /// a `COMPREHENSION_FOR`.
    pub for_if_nodes: NodeList,
}

#[derive(Clone, Debug)]
pub struct ComprehensionForData {
    pub target: NodeIndex,
    pub iterable: NodeIndex,
    pub is_async: bool,
}

#[derive(Clone, Debug)]
pub struct ComprehensionIfData {
    pub test: NodeIndex,
}

/// How a parameter binds its arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParameterCategory {
    /// Ordinary positional-or-keyword parameter.
    Simple,
    /// `*args`-style variadic positional parameter.
    ArgsList,
    /// `**kwargs`-style variadic keyword parameter.
    KwargsDict,
}

#[derive(Clone, Debug)]
pub struct ParameterData {
    pub name: NodeIndex,
    pub annotation: NodeIndex,
    pub default_value: NodeIndex,
    pub category: ParameterCategory,
}

#[derive(Clone, Debug)]
pub struct TypeParameterListData {
    pub parameters: NodeList,
}

#[derive(Clone, Debug)]
pub struct TypeParameterData {
    pub name: NodeIndex,
    pub bound: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct DecoratorData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct CallData {
    pub callee: NodeIndex,
    pub arguments: NodeList,
}

#[derive(Clone, Debug)]
pub struct ArgumentData {
    /// Keyword name for `name=value` arguments, `NONE` for positional.
    pub name: NodeIndex,
    pub value: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct MemberAccessData {
    pub left_expression: NodeIndex,
    /// Always a `NAME` node.
    pub member_name: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct NameData {
    pub value: String,
}

#[derive(Clone, Debug)]
pub struct StringData {
    pub value: String,
}
