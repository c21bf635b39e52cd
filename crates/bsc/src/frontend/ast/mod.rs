//! Abstract Syntax Tree definitions
//!
//! Nodes live in an arena owned by [`Ast`] and refer to each other by
//! [`NodeId`]. Child edges are the owning direction; every node also keeps a
//! plain handle to its parent, set once when the parent is allocated and
//! used only for upward searches.

mod node;
mod visitor;

pub use node::{InterfaceParam, NodeKind};
pub use visitor::{walk, Visitor};

use crate::common::Range;
use crate::frontend::sema::{SymbolEntry, SymbolTable};
use crate::types::BscType;
use std::fmt::Write as _;
use std::ops::Index;

/// Handle to a node in an [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node with its location, parent handle and (for scopes) symbol table
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Absent for synthetic nodes
    pub range: Option<Range>,
    parent: Option<NodeId>,
    symbol_table: Option<SymbolTable>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn symbol_table(&self) -> Option<&SymbolTable> {
        self.symbol_table.as_ref()
    }
}

/// Syntax tree of one file. The root is always a `Body` at [`Ast::root`].
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Body { statements: Vec::new() },
                range: None,
                parent: None,
                symbol_table: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node and adopt its children
    pub(crate) fn alloc(&mut self, kind: NodeKind, range: Option<Range>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            range,
            parent: None,
            symbol_table: None,
        });
        id
    }

    /// Overwrite a node in place, keeping its own parent and adopting the new children.
    ///
    /// Used by the parser to turn an already built expression into the
    /// statement it turned out to be (`a.b` into `a.b = 1`) and to fill in the root.
    pub(crate) fn replace(&mut self, id: NodeId, kind: NodeKind, range: Option<Range>) {
        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.range = range;
    }

    /// Grow a node's range to also cover `range`
    pub(crate) fn extend_range(&mut self, id: NodeId, range: Option<Range>) {
        let node = &mut self.nodes[id.index()];
        node.range = Range::bounding([node.range, range]);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn range(&self, id: NodeId) -> Option<Range> {
        self.nodes[id.index()].range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Statements of the root body
    pub fn statements(&self) -> &[NodeId] {
        match self.kind(self.root()) {
            NodeKind::Body { statements } => statements,
            _ => &[],
        }
    }

    /// Strict ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor matching `predicate`
    pub fn find_ancestor<F>(&self, id: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId, &NodeKind) -> bool,
    {
        self.ancestors(id).find(|&ancestor| predicate(ancestor, self.kind(ancestor)))
    }

    /// Whether `id` introduces a lexical scope: the file root body, a
    /// namespace body, a function expression or a catch clause.
    pub fn is_scope(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::FunctionExpression { .. } | NodeKind::Catch { .. } => true,
            NodeKind::Body { .. } => match self.parent(id) {
                None => true,
                Some(parent) => matches!(self.kind(parent), NodeKind::Namespace { .. }),
            },
            _ => false,
        }
    }

    /// Nearest scope node, starting at `id` itself
    pub fn nearest_scope(&self, id: NodeId) -> NodeId {
        if self.is_scope(id) {
            return id;
        }
        self.find_ancestor(id, |ancestor, _| self.is_scope(ancestor))
            .unwrap_or_else(|| self.root())
    }

    pub fn symbol_table(&self, scope: NodeId) -> Option<&SymbolTable> {
        self.nodes[scope.index()].symbol_table.as_ref()
    }

    /// Register a symbol in the nearest scope of `at`, creating that scope's
    /// table on first use. A later registration of the same name (compared
    /// case-insensitively) overwrites the earlier one.
    pub fn add_symbol(&mut self, at: NodeId, name: &str, range: Option<Range>, ty: BscType) {
        let scope = self.nearest_scope(at);
        let enclosing = self.parent(scope).map(|parent| self.nearest_scope(parent));
        self.nodes[scope.index()]
            .symbol_table
            .get_or_insert_with(|| SymbolTable::new(enclosing))
            .add_symbol(name, range, ty);
    }

    /// Whether the nearest scope of `at` already holds `name`, without looking further up
    pub fn has_local_symbol(&self, at: NodeId, name: &str) -> bool {
        self.symbol_table(self.nearest_scope(at))
            .is_some_and(|table| table.has_symbol(name))
    }

    /// Look `name` up through the chain of scopes enclosing `at`
    pub fn lookup_symbol(&self, at: NodeId, name: &str) -> Option<&SymbolEntry> {
        let mut scope = Some(self.nearest_scope(at));
        while let Some(id) = scope {
            let table = self.symbol_table(id);
            if let Some(entry) = table.and_then(|t| t.get_symbol(name)) {
                return Some(entry);
            }
            scope = match table {
                Some(t) => t.parent(),
                None => self.parent(id).map(|parent| self.nearest_scope(parent)),
            };
        }
        None
    }

    /// Drop every symbol table so a new pass starts from scratch
    pub fn clear_symbol_tables(&mut self) {
        for node in &mut self.nodes {
            node.symbol_table = None;
        }
    }

    /// Every node handle, in allocation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Scope nodes that currently own a table, in allocation order
    pub fn scopes(&self) -> impl Iterator<Item = (NodeId, &SymbolTable)> {
        self.node_ids()
            .filter_map(|id| self.symbol_table(id).map(|table| (id, table)))
    }

    /// Dotted name of a `Variable`/`DottedGet` chain, e.g. `Alpha.Beta`
    pub fn dotted_name(&self, expr: NodeId) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = expr;
        loop {
            match self.kind(current) {
                NodeKind::Variable { name } => {
                    parts.push(name.text.as_str());
                    break;
                }
                NodeKind::DottedGet { obj, name, .. } => {
                    parts.push(name.text.as_str());
                    current = *obj;
                }
                _ => return None,
            }
        }
        parts.reverse();
        Some(parts.join("."))
    }

    /// Full name of a namespace, including every enclosing namespace
    pub fn namespace_name(&self, namespace: NodeId) -> Option<String> {
        let mut parts = Vec::new();
        for id in std::iter::once(namespace).chain(self.ancestors(namespace)) {
            if let NodeKind::Namespace { name_expression, .. } = self.kind(id) {
                parts.push(self.dotted_name(*name_expression)?);
            }
        }
        parts.reverse();
        Some(parts.join("."))
    }

    /// Indented outline of the tree
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            let _ = write!(out, "{:indent$}{}", "", node.kind.name(), indent = depth * 2);
            if let Some(label) = node.kind.label() {
                let _ = write!(out, " {}", label);
            }
            if let Some(range) = node.range {
                let _ = write!(out, " @ {}", range);
            }
            out.push('\n');
            for child in node.kind.children().into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

/// Iterator over the strict ancestors of a node
pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}
