//! Per-scope symbol tables

use crate::common::Range;
use crate::frontend::ast::NodeId;
use crate::types::BscType;
use std::collections::HashMap;

/// A symbol in a symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Name as written at the (last) declaration
    pub name: String,
    pub range: Option<Range>,
    pub ty: BscType,
}

/// Symbols declared directly in one scope.
///
/// Names are compared case-insensitively. The parent is the enclosing
/// scope node, not an owned table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolEntry>,
    parent: Option<NodeId>,
}

impl SymbolTable {
    pub fn new(parent: Option<NodeId>) -> Self {
        Self {
            symbols: HashMap::new(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Insert or overwrite `name`
    pub fn add_symbol(&mut self, name: &str, range: Option<Range>, ty: BscType) {
        self.symbols.insert(
            name.to_ascii_lowercase(),
            SymbolEntry {
                name: name.to_string(),
                range,
                ty,
            },
        );
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.symbols.contains_key(&name.to_ascii_lowercase())
    }

    pub fn get_symbol(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entries sorted by lower-cased name
    pub fn entries(&self) -> Vec<&SymbolEntry> {
        let mut keys: Vec<&String> = self.symbols.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| self.symbols.get(k)).collect()
    }
}
