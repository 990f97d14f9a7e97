//! Identifier registry
//!
//! Append-only record of every declarator accepted into a scope during one
//! resolution run. Ids are handed out sequentially starting at 1 and exist for
//! external reference only; resolution never consults them.

use crate::ast::{DeclKind, Name, NodeId};
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 1-based registry id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(u32);

impl DeclId {
    pub fn get(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One binding introduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: Name,
    pub kind: DeclKind,
    pub span: Span,
    /// Identity of the bound identifier; uses are unified with this node
    pub node: NodeId,
}

impl Declarator {
    pub fn new(name: Name, kind: DeclKind, span: Span, node: NodeId) -> Self {
        Self {
            name,
            kind,
            span,
            node,
        }
    }
}

/// Registry of all accepted declarators
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    declarators: Vec<Declarator>,
    #[serde(skip)]
    by_node: HashMap<NodeId, DeclId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declarator and return its id
    pub fn record(&mut self, declarator: Declarator) -> DeclId {
        self.declarators.push(declarator);
        let id = DeclId(self.declarators.len() as u32);
        let node = self.declarators[id.index()].node;
        self.by_node.entry(node).or_insert(id);
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Declarator> {
        self.declarators.get(id.index())
    }

    /// Declarator whose bound identifier is `node`
    pub fn declaration_of(&self, node: NodeId) -> Option<(DeclId, &Declarator)> {
        let id = *self.by_node.get(&node)?;
        self.get(id).map(|decl| (id, decl))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declarator)> {
        self.declarators
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId(i as u32 + 1), decl))
    }

    pub fn len(&self) -> usize {
        self.declarators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarators.is_empty()
    }
}

impl std::ops::Index<DeclId> for Registry {
    type Output = Declarator;

    fn index(&self, id: DeclId) -> &Declarator {
        &self.declarators[id.index()]
    }
}
