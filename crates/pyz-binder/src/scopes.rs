//! Lexical scopes.
//!
//! Scopes form a tree mirroring (but not identical to) the syntax tree:
//! every module, class body, function body, lambda, comprehension, and
//! type-parameter list gets one. Class bodies and comprehensions are
//! *evaluation* scopes but not *execution* scopes — code inside them runs
//! in the context of their container.

use pyz_parser::NodeIndex;
use rustc_hash::FxHashMap;

use crate::symbols::SymbolId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Builtin,
    Module,
    Class,
    Function,
    Lambda,
    Comprehension,
    /// Scope introduced by a PEP 695 type-parameter list. Transparent to
    /// lookups of outer names ("proxy" scope).
    TypeParameter,
}

impl ScopeKind {
    /// Whether code attributed to this scope actually executes here.
    pub fn is_execution_scope(self) -> bool {
        matches!(
            self,
            ScopeKind::Builtin | ScopeKind::Module | ScopeKind::Function | ScopeKind::Lambda
        )
    }
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// The syntax node that introduced this scope.
    pub node: NodeIndex,
    pub parent: Option<ScopeId>,
    symbols: FxHashMap<String, SymbolId>,
}

pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> ScopeArena {
        ScopeArena { scopes: Vec::new() }
    }

    pub fn alloc(&mut self, kind: ScopeKind, node: NodeIndex, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            node,
            parent,
            symbols: FxHashMap::default(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0 as usize)
    }

    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) {
        if let Some(s) = self.scopes.get_mut(scope.0 as usize) {
            s.symbols.insert(name.to_string(), symbol);
        }
    }

    /// Look up a name in exactly this scope.
    pub fn lookup_symbol(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope)?.symbols.get(name).copied()
    }

    /// Look up a name in this scope or any enclosing scope. Type-parameter
    /// scopes are searched like any other; their transparency to *binding*
    /// is the binder's concern, not lookup's.
    pub fn lookup_symbol_recursive(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.get(id)?;
            if let Some(&sym) = s.symbols.get(name) {
                return Some(sym);
            }
            current = s.parent;
        }
        None
    }
}
