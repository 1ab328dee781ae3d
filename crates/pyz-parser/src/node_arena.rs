//! Node storage and creation methods.
//!
//! Nodes are created bottom-up: children exist before their parent, so the
//! parent-wiring helpers can assume every child index is already valid.

use crate::node::*;
use crate::syntax_kind;

#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    extended_info: Vec<ExtendedNodeInfo>,
    modules: Vec<ModuleData>,
    suites: Vec<SuiteData>,
    classes: Vec<ClassData>,
    functions: Vec<FunctionData>,
    lambdas: Vec<LambdaData>,
    comprehensions: Vec<ComprehensionData>,
    comprehension_fors: Vec<ComprehensionForData>,
    comprehension_ifs: Vec<ComprehensionIfData>,
    parameters: Vec<ParameterData>,
    type_parameter_lists: Vec<TypeParameterListData>,
    type_parameters: Vec<TypeParameterData>,
    decorators: Vec<DecoratorData>,
    calls: Vec<CallData>,
    arguments: Vec<ArgumentData>,
    member_accesses: Vec<MemberAccessData>,
    names: Vec<NameData>,
    strings: Vec<StringData>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn get_extended(&self, idx: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if idx.is_none() {
            return None;
        }
        self.extended_info.get(idx.0 as usize)
    }

    /// Parent of `idx`, or `NodeIndex::NONE` at the tree root.
    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get_extended(idx)
            .map_or(NodeIndex::NONE, |ext| ext.parent)
    }

    // ========================================================================
    // Parent wiring
    // ========================================================================

    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if !child.is_none()
            && let Some(info) = self.extended_info.get_mut(child.0 as usize)
        {
            info.parent = parent;
        }
    }

    #[inline]
    fn set_parent_list(&mut self, list: &NodeList, parent: NodeIndex) {
        for &child in &list.nodes {
            self.set_parent(child, parent);
        }
    }

    fn push_node(&mut self, kind: u16, pos: u32, end: u32, data: u32) -> NodeIndex {
        let index = self.nodes.len() as u32;
        let mut node = Node::new(kind, pos, end);
        node.data = data;
        self.nodes.push(node);
        self.extended_info.push(ExtendedNodeInfo::default());
        NodeIndex(index)
    }

    // ========================================================================
    // Node creation
    // ========================================================================

    /// Add a token-like node with no payload (literals, `pass`, ...).
    pub fn add_token(&mut self, kind: u16, pos: u32, end: u32) -> NodeIndex {
        self.push_node(kind, pos, end, Node::NO_DATA)
    }

    pub fn add_name(&mut self, value: &str, pos: u32, end: u32) -> NodeIndex {
        let data = self.names.len() as u32;
        self.names.push(NameData {
            value: value.to_string(),
        });
        self.push_node(syntax_kind::NAME, pos, end, data)
    }

    pub fn add_string_literal(&mut self, value: &str, pos: u32, end: u32) -> NodeIndex {
        let data = self.strings.len() as u32;
        self.strings.push(StringData {
            value: value.to_string(),
        });
        self.push_node(syntax_kind::STRING_LITERAL, pos, end, data)
    }

    pub fn add_module(&mut self, statements: NodeList, pos: u32, end: u32) -> NodeIndex {
        let data = self.modules.len() as u32;
        let idx = self.push_node(syntax_kind::MODULE, pos, end, data);
        self.set_parent_list(&statements, idx);
        self.modules.push(ModuleData { statements });
        idx
    }

    pub fn add_suite(&mut self, statements: NodeList, pos: u32, end: u32) -> NodeIndex {
        let data = self.suites.len() as u32;
        let idx = self.push_node(syntax_kind::SUITE, pos, end, data);
        self.set_parent_list(&statements, idx);
        self.suites.push(SuiteData { statements });
        idx
    }

    pub fn add_class(&mut self, class: ClassData, pos: u32, end: u32) -> NodeIndex {
        let data = self.classes.len() as u32;
        let idx = self.push_node(syntax_kind::CLASS_DEF, pos, end, data);
        self.set_parent(class.name, idx);
        self.set_parent(class.type_parameters, idx);
        self.set_parent_list(&class.decorators, idx);
        self.set_parent_list(&class.arguments, idx);
        self.set_parent(class.suite, idx);
        self.classes.push(class);
        idx
    }

    pub fn add_function(&mut self, function: FunctionData, pos: u32, end: u32) -> NodeIndex {
        let data = self.functions.len() as u32;
        let idx = self.push_node(syntax_kind::FUNCTION_DEF, pos, end, data);
        self.set_parent(function.name, idx);
        self.set_parent(function.type_parameters, idx);
        self.set_parent_list(&function.decorators, idx);
        self.set_parent_list(&function.parameters, idx);
        self.set_parent(function.return_annotation, idx);
        self.set_parent(function.suite, idx);
        self.functions.push(function);
        idx
    }

    pub fn add_lambda(&mut self, lambda: LambdaData, pos: u32, end: u32) -> NodeIndex {
        let data = self.lambdas.len() as u32;
        let idx = self.push_node(syntax_kind::LAMBDA, pos, end, data);
        self.set_parent_list(&lambda.parameters, idx);
        self.set_parent(lambda.expression, idx);
        self.lambdas.push(lambda);
        idx
    }

    pub fn add_comprehension(
        &mut self,
        comprehension: ComprehensionData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data = self.comprehensions.len() as u32;
        let idx = self.push_node(syntax_kind::COMPREHENSION, pos, end, data);
        self.set_parent(comprehension.expression, idx);
        self.set_parent_list(&comprehension.for_if_nodes, idx);
        self.comprehensions.push(comprehension);
        idx
    }

    pub fn add_comprehension_for(
        &mut self,
        clause: ComprehensionForData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data = self.comprehension_fors.len() as u32;
        let idx = self.push_node(syntax_kind::COMPREHENSION_FOR, pos, end, data);
        self.set_parent(clause.target, idx);
        self.set_parent(clause.iterable, idx);
        self.comprehension_fors.push(clause);
        idx
    }

    pub fn add_comprehension_if(&mut self, test: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data = self.comprehension_ifs.len() as u32;
        let idx = self.push_node(syntax_kind::COMPREHENSION_IF, pos, end, data);
        self.set_parent(test, idx);
        self.comprehension_ifs.push(ComprehensionIfData { test });
        idx
    }

    pub fn add_parameter(&mut self, parameter: ParameterData, pos: u32, end: u32) -> NodeIndex {
        let data = self.parameters.len() as u32;
        let idx = self.push_node(syntax_kind::PARAMETER, pos, end, data);
        self.set_parent(parameter.name, idx);
        self.set_parent(parameter.annotation, idx);
        self.set_parent(parameter.default_value, idx);
        self.parameters.push(parameter);
        idx
    }

    pub fn add_type_parameter_list(&mut self, parameters: NodeList, pos: u32, end: u32) -> NodeIndex {
        let data = self.type_parameter_lists.len() as u32;
        let idx = self.push_node(syntax_kind::TYPE_PARAMETER_LIST, pos, end, data);
        self.set_parent_list(&parameters, idx);
        self.type_parameter_lists
            .push(TypeParameterListData { parameters });
        idx
    }

    pub fn add_type_parameter(&mut self, name: NodeIndex, bound: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data = self.type_parameters.len() as u32;
        let idx = self.push_node(syntax_kind::TYPE_PARAMETER, pos, end, data);
        self.set_parent(name, idx);
        self.set_parent(bound, idx);
        self.type_parameters.push(TypeParameterData { name, bound });
        idx
    }

    pub fn add_decorator(&mut self, expression: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data = self.decorators.len() as u32;
        let idx = self.push_node(syntax_kind::DECORATOR, pos, end, data);
        self.set_parent(expression, idx);
        self.decorators.push(DecoratorData { expression });
        idx
    }

    pub fn add_call(&mut self, callee: NodeIndex, arguments: NodeList, pos: u32, end: u32) -> NodeIndex {
        let data = self.calls.len() as u32;
        let idx = self.push_node(syntax_kind::CALL, pos, end, data);
        self.set_parent(callee, idx);
        self.set_parent_list(&arguments, idx);
        self.calls.push(CallData { callee, arguments });
        idx
    }

    pub fn add_argument(&mut self, name: NodeIndex, value: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data = self.arguments.len() as u32;
        let idx = self.push_node(syntax_kind::ARGUMENT, pos, end, data);
        self.set_parent(name, idx);
        self.set_parent(value, idx);
        self.arguments.push(ArgumentData { name, value });
        idx
    }

    pub fn add_member_access(
        &mut self,
        left_expression: NodeIndex,
        member_name: NodeIndex,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data = self.member_accesses.len() as u32;
        let idx = self.push_node(syntax_kind::MEMBER_ACCESS, pos, end, data);
        self.set_parent(left_expression, idx);
        self.set_parent(member_name, idx);
        self.member_accesses.push(MemberAccessData {
            left_expression,
            member_name,
        });
        idx
    }

    // ========================================================================
    // Payload accessors
    // ========================================================================

    fn payload<'a, T>(&self, pool: &'a [T], node: &Node, kind: u16) -> Option<&'a T> {
        if node.kind != kind || node.data == Node::NO_DATA {
            return None;
        }
        pool.get(node.data as usize)
    }

    pub fn get_module(&self, node: &Node) -> Option<&ModuleData> {
        self.payload(&self.modules, node, syntax_kind::MODULE)
    }

    pub fn get_suite(&self, node: &Node) -> Option<&SuiteData> {
        self.payload(&self.suites, node, syntax_kind::SUITE)
    }

    pub fn get_class(&self, node: &Node) -> Option<&ClassData> {
        self.payload(&self.classes, node, syntax_kind::CLASS_DEF)
    }

    pub fn get_function(&self, node: &Node) -> Option<&FunctionData> {
        self.payload(&self.functions, node, syntax_kind::FUNCTION_DEF)
    }

    pub fn get_lambda(&self, node: &Node) -> Option<&LambdaData> {
        self.payload(&self.lambdas, node, syntax_kind::LAMBDA)
    }

    pub fn get_comprehension(&self, node: &Node) -> Option<&ComprehensionData> {
        self.payload(&self.comprehensions, node, syntax_kind::COMPREHENSION)
    }

    pub fn get_comprehension_for(&self, node: &Node) -> Option<&ComprehensionForData> {
        self.payload(
            &self.comprehension_fors,
            node,
            syntax_kind::COMPREHENSION_FOR,
        )
    }

    pub fn get_comprehension_if(&self, node: &Node) -> Option<&ComprehensionIfData> {
        self.payload(&self.comprehension_ifs, node, syntax_kind::COMPREHENSION_IF)
    }

    pub fn get_parameter(&self, node: &Node) -> Option<&ParameterData> {
        self.payload(&self.parameters, node, syntax_kind::PARAMETER)
    }

    pub fn get_type_parameter_list(&self, node: &Node) -> Option<&TypeParameterListData> {
        self.payload(
            &self.type_parameter_lists,
            node,
            syntax_kind::TYPE_PARAMETER_LIST,
        )
    }

    pub fn get_type_parameter(&self, node: &Node) -> Option<&TypeParameterData> {
        self.payload(&self.type_parameters, node, syntax_kind::TYPE_PARAMETER)
    }

    pub fn get_decorator(&self, node: &Node) -> Option<&DecoratorData> {
        self.payload(&self.decorators, node, syntax_kind::DECORATOR)
    }

    pub fn get_call(&self, node: &Node) -> Option<&CallData> {
        self.payload(&self.calls, node, syntax_kind::CALL)
    }

    pub fn get_argument(&self, node: &Node) -> Option<&ArgumentData> {
        self.payload(&self.arguments, node, syntax_kind::ARGUMENT)
    }

    pub fn get_member_access(&self, node: &Node) -> Option<&MemberAccessData> {
        self.payload(&self.member_accesses, node, syntax_kind::MEMBER_ACCESS)
    }

    pub fn get_name(&self, node: &Node) -> Option<&NameData> {
        self.payload(&self.names, node, syntax_kind::NAME)
    }

    pub fn get_string(&self, node: &Node) -> Option<&StringData> {
        self.payload(&self.strings, node, syntax_kind::STRING_LITERAL)
    }

    /// Resolve the text of a `NAME` node by index.
    pub fn name_text(&self, idx: NodeIndex) -> Option<&str> {
        let node = self.get(idx)?;
        self.get_name(node).map(|data| data.value.as_str())
    }

    /// Resolve the text of a `STRING_LITERAL` node by index.
    pub fn string_text(&self, idx: NodeIndex) -> Option<&str> {
        let node = self.get(idx)?;
        self.get_string(node).map(|data| data.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ParameterCategory;

    #[test]
    fn parent_pointers_wired_on_creation() {
        let mut arena = NodeArena::new();
        let name = arena.add_name("f", 4, 5);
        let suite = arena.add_suite(NodeList::default(), 10, 14);
        let func = arena.add_function(
            FunctionData {
                name,
                type_parameters: NodeIndex::NONE,
                decorators: NodeList::default(),
                parameters: NodeList::default(),
                return_annotation: NodeIndex::NONE,
                suite,
                is_async: false,
            },
            0,
            14,
        );
        let module = arena.add_module(NodeList::new(vec![func]), 0, 14);

        assert_eq!(arena.parent(name), func);
        assert_eq!(arena.parent(suite), func);
        assert_eq!(arena.parent(func), module);
        assert_eq!(arena.parent(module), NodeIndex::NONE);
    }

    #[test]
    fn payload_accessors_check_kind() {
        let mut arena = NodeArena::new();
        let name = arena.add_name("x", 0, 1);
        let param = arena.add_parameter(
            ParameterData {
                name,
                annotation: NodeIndex::NONE,
                default_value: NodeIndex::NONE,
                category: ParameterCategory::Simple,
            },
            0,
            1,
        );

        let param_node = *arena.get(param).unwrap();
        assert!(arena.get_parameter(&param_node).is_some());
        assert!(arena.get_function(&param_node).is_none());
        assert_eq!(arena.name_text(name), Some("x"));
    }
}
