//! Chained scopes
//!
//! Scopes are stored in an arena and linked to their parent by id. A scope
//! maps each name to at most one declarator; lookups either stay on one level
//! or follow the parent chain to the root.

use crate::ast::Name;
use crate::registry::{DeclId, Declarator, Registry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Index of a scope in its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// What opened a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Program level; shared by the block and function chains
    Root,
    /// Block scope opened alongside a function scope
    FunctionBody,
    /// Function scope (parameters, `var`, nested function names)
    Function,
    /// `{ ... }`
    Block,
    /// `catch (e) { ... }`
    Catch,
}

impl ScopeKind {
    /// A block scope nested inside a function body (or inside the root)
    pub fn is_nested_block(self) -> bool {
        matches!(self, ScopeKind::Block | ScopeKind::Catch)
    }
}

#[derive(Debug, Clone)]
struct ScopeData {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    /// For function bodies: the function scope opened together with this block
    companion: Option<ScopeId>,
    bindings: HashMap<Name, DeclId>,
}

/// Arena of scopes for one resolution run
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    /// Create a tree holding only the root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                parent: None,
                kind: ScopeKind::Root,
                companion: None,
                bindings: HashMap::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a new scope whose parent is `parent`
    pub fn child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.push(parent, kind, None)
    }

    /// Create the block scope of a function body, paired with its function scope
    pub fn function_body(&mut self, parent: ScopeId, function: ScopeId) -> ScopeId {
        self.push(parent, ScopeKind::FunctionBody, Some(function))
    }

    fn push(&mut self, parent: ScopeId, kind: ScopeKind, companion: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent: Some(parent),
            kind,
            companion,
            bindings: HashMap::new(),
        });
        trace!(%id, %parent, ?kind, "entered scope");
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.index()].kind
    }

    /// Search only `scope` itself
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<DeclId> {
        self.scopes[scope.index()].bindings.get(name).copied()
    }

    /// Resolve a use seen from block scope `block`
    ///
    /// Walks the block chain outward. When the walk leaves a function body it
    /// consults that body's function scope before moving on, so parameters and
    /// `var`s of a function shadow same-named bindings further out.
    pub fn lookup_visible(&self, block: ScopeId, name: &str) -> Option<DeclId> {
        trace!(name, scope = %block, "looking up");
        let mut link = Some(block);
        while let Some(current) = link {
            let data = &self.scopes[current.index()];
            if let Some(decl) = data.bindings.get(name) {
                return Some(*decl);
            }
            if let Some(function) = data.companion {
                if let Some(decl) = self.lookup_local(function, name) {
                    return Some(decl);
                }
            }
            link = data.parent;
        }
        None
    }

    /// Bind `declarator` in `scope` and record it in `registry`
    ///
    /// An existing binding of the same name in `scope` is replaced. Callers
    /// that must not overwrite check [`lookup_local`](Self::lookup_local)
    /// first.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        declarator: Declarator,
        registry: &mut Registry,
    ) -> DeclId {
        let name = declarator.name.clone();
        trace!(name = %name, kind = %declarator.kind, %scope, "declaring");
        let id = registry.record(declarator);
        self.scopes[scope.index()].bindings.insert(name, id);
        id
    }

    /// Number of scopes created so far, root included
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
