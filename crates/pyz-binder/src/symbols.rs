//! Symbols and declarations.

use pyz_parser::NodeIndex;

pub mod symbol_flags {
    pub const CLASS: u32 = 1 << 0;
    pub const FUNCTION: u32 = 1 << 1;
    pub const VARIABLE: u32 = 1 << 2;
    pub const PARAMETER: u32 = 1 << 3;
    pub const TYPE_PARAMETER: u32 = 1 << 4;
    pub const IMPORTED: u32 = 1 << 5;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

/// One syntactic binding site for a name.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub node: NodeIndex,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Function,
    Variable,
    Parameter,
    TypeParameter,
    Alias,
}

/// A named entity with its ordered list of declarations (document order
/// within the file).
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub flags: u32,
    pub declarations: Vec<DeclId>,
}

pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena {
            symbols: Vec::new(),
        }
    }

    pub fn alloc(&mut self, name: &str, flags: u32) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            flags,
            declarations: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn add_declaration(&mut self, id: SymbolId, decl: DeclId) {
        if let Some(sym) = self.symbols.get_mut(id.0 as usize) {
            sym.declarations.push(decl);
        }
    }

    /// Ordered declarations for a symbol; empty slice when the symbol is
    /// unknown.
    pub fn declarations_for_symbol(&self, id: SymbolId) -> &[DeclId] {
        self.get(id).map_or(&[], |sym| &sym.declarations)
    }
}

pub struct DeclarationArena {
    declarations: Vec<Declaration>,
}

impl DeclarationArena {
    pub fn new() -> DeclarationArena {
        DeclarationArena {
            declarations: Vec::new(),
        }
    }

    pub fn alloc(&mut self, kind: DeclarationKind, node: NodeIndex) -> DeclId {
        let id = DeclId(self.declarations.len() as u32);
        self.declarations.push(Declaration { kind, node });
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0 as usize)
    }
}
