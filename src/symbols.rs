use slab::Slab;

use crate::types::{Int, Level, Var};

pub type SymbolId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Constant,
    Variable,
    Procedure,
}

impl SymbolKind {
    // numbering used by the symbol table dump
    pub fn id(self) -> u8 {
        match self {
            SymbolKind::Constant => 1,
            SymbolKind::Variable => 2,
            SymbolKind::Procedure => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: Var,
    /// Literal value, constants only.
    pub value: Int,
    pub level: Level,
    /// Frame offset of a variable, entry instruction of a procedure.
    pub address: usize,
    pub live: bool,
}

impl Symbol {
    pub fn constant(name: Var, value: Int, level: Level) -> Self {
        Symbol {
            kind: SymbolKind::Constant,
            name,
            value,
            level,
            address: 0,
            live: true,
        }
    }

    pub fn variable(name: Var, level: Level, offset: usize) -> Self {
        Symbol {
            kind: SymbolKind::Variable,
            name,
            value: 0,
            level,
            address: offset,
            live: true,
        }
    }

    pub fn procedure(name: Var, level: Level, entry: usize) -> Self {
        Symbol {
            kind: SymbolKind::Procedure,
            name,
            value: 0,
            level,
            address: entry,
            live: true,
        }
    }
}

/// Append-only registry of every declared name.
///
/// Symbols are never removed: leaving a block only clears their `live`
/// flag, so the full declaration history stays around for the dump.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Slab<Symbol>,
    // declaration order of every symbol sharing a spelling
    by_name: fnv::FnvHashMap<Var, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().map(|(_, symbol)| symbol)
    }

    /// Adds `symbol` unless a live symbol of the same name was already
    /// declared at the same level.
    pub fn declare(&mut self, symbol: Symbol) -> Option<SymbolId> {
        if self.declared_at(&symbol.name, symbol.level).is_some() {
            return None;
        }

        let name = symbol.name.clone();
        let id = self.symbols.insert(symbol);
        self.by_name.entry(name).or_default().push(id);
        Some(id)
    }

    /// Innermost live declaration of `name` visible from `level`.
    pub fn lookup(&self, name: &str, level: Level) -> Option<(SymbolId, &Symbol)> {
        self.live_named(name).find(|(_, symbol)| symbol.level <= level)
    }

    fn declared_at(&self, name: &str, level: Level) -> Option<(SymbolId, &Symbol)> {
        self.live_named(name).find(|(_, symbol)| symbol.level == level)
    }

    // newest first
    fn live_named<'a>(&'a self, name: &str) -> impl Iterator<Item = (SymbolId, &'a Symbol)> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flat_map(|ids| ids.iter().rev())
            .filter_map(move |&id| self.symbols.get(id).map(|symbol| (id, symbol)))
            .filter(|(_, symbol)| symbol.live)
    }

    /// Hides every symbol declared since the table held `mark` entries.
    pub fn close_scope(&mut self, mark: usize) {
        for (id, symbol) in self.symbols.iter_mut() {
            if id >= mark {
                symbol.live = false;
            }
        }
    }
}
