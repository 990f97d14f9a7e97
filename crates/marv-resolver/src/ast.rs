//! Abstract Syntax Tree (AST) definitions
//!
//! The tree is produced by the front end's parser and handed to the binding
//! pass. Identifiers carry interior-mutable resolution slots so the pass can
//! record bindings while walking a shared reference to the tree.

use crate::registry::DeclId;
use crate::scope::ScopeId;
use crate::span::Span;
use crate::walk::{Node, Visitor};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// AST schema version
///
/// Included in JSON dumps. Increment when making breaking changes to the tree shape.
pub const AST_VERSION: u32 = 1;

/// Stable identity of a tree node, assigned at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rejected attempt to build an identifier without a name
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("identifier name must not be empty")]
pub struct EmptyName;

/// Two identifiers of one tree carry the same node id
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("node id {0} is shared by more than one identifier")]
pub struct DuplicateNodeId(pub NodeId);

/// Non-empty identifier text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyName> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmptyName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Names built into the resolver itself
    pub(crate) fn builtin(name: &'static str) -> Self {
        debug_assert!(!name.is_empty());
        Self(name.to_string())
    }
}

impl TryFrom<String> for Name {
    type Error = EmptyName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = EmptyName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn cell_is_none<T: Copy>(cell: &Cell<Option<T>>) -> bool {
    cell.get().is_none()
}

/// An identifier occurrence
///
/// `binder` marks the occurrence that introduces the name (declarator ids,
/// parameters, function names, catch parameters). Every other occurrence is a
/// use. After resolution, `canonical()` yields the node id of the declaration
/// the occurrence refers to; consumers must read through it rather than
/// comparing `id` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: NodeId,
    pub name: Name,
    pub span: Span,
    #[serde(default)]
    pub binder: bool,
    /// Resolved target; `None` means the identifier is its own target
    #[serde(default, skip_serializing_if = "cell_is_none")]
    target: Cell<Option<NodeId>>,
    /// Registry id, for binding occurrences that introduced a declaration
    #[serde(default, skip_serializing_if = "cell_is_none")]
    decl: Cell<Option<DeclId>>,
    /// Scope the declaration was inserted into
    #[serde(default, skip_serializing_if = "cell_is_none")]
    scope: Cell<Option<ScopeId>>,
}

impl Identifier {
    /// A use occurrence
    pub fn new(id: NodeId, name: Name, span: Span) -> Self {
        Self {
            id,
            name,
            span,
            binder: false,
            target: Cell::new(None),
            decl: Cell::new(None),
            scope: Cell::new(None),
        }
    }

    /// A binding occurrence
    pub fn binding(id: NodeId, name: Name, span: Span) -> Self {
        Self {
            binder: true,
            ..Self::new(id, name, span)
        }
    }

    /// The node this identifier refers to (itself until unified)
    pub fn canonical(&self) -> NodeId {
        self.target.get().unwrap_or(self.id)
    }

    /// Redirect this identifier's identity to `target`
    ///
    /// Unifying twice with the same target is a no-op. Targets are always
    /// declaration nodes, so chains never form.
    pub fn unify_with(&self, target: NodeId) {
        if target == self.id {
            self.target.set(None);
        } else {
            self.target.set(Some(target));
        }
    }

    /// Whether this identifier has been unified with some other node
    pub fn is_unified(&self) -> bool {
        self.target.get().is_some()
    }

    /// Registry id of the declaration this occurrence introduced
    pub fn declaration(&self) -> Option<DeclId> {
        self.decl.get()
    }

    /// Scope the introduced declaration lives in
    pub fn owning_scope(&self) -> Option<ScopeId> {
        self.scope.get()
    }

    pub(crate) fn record_declaration(&self, decl: DeclId, scope: ScopeId) {
        self.decl.set(Some(decl));
        self.scope.set(Some(scope));
    }

    /// Forget any earlier resolution of this occurrence
    pub(crate) fn reset(&self) {
        self.target.set(None);
        self.decl.set(None);
        self.scope.set(None);
    }
}

/// Declaration keyword of a `var`/`let`/`const` group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

/// Kind of a binding recorded in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Var,
    Let,
    Const,
    Function,
    Argument,
    Catch,
    /// Injected by the resolver (`arguments`)
    Auto,
}

impl DeclKind {
    /// Lives in the nearest block scope
    pub fn is_block_scoped(self) -> bool {
        matches!(self, DeclKind::Let | DeclKind::Const | DeclKind::Catch)
    }

    /// Lives in the nearest function scope
    pub fn is_function_scoped(self) -> bool {
        !self.is_block_scoped()
    }

    pub fn is_const(self) -> bool {
        self == DeclKind::Const
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
            DeclKind::Function => "function",
            DeclKind::Argument => "argument",
            DeclKind::Catch => "catch",
            DeclKind::Auto => "auto",
        }
    }
}

impl From<VarKind> for DeclKind {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Var => DeclKind::Var,
            VarKind::Let => DeclKind::Let,
            VarKind::Const => DeclKind::Const,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    /// Walk the tree depth-first, invoking `visitor` on entry and exit of every node
    pub fn walk<V: Visitor>(&self, visitor: &mut V) {
        crate::walk::walk_program(visitor, self);
    }

    /// Largest node id present in the tree
    pub fn max_node_id(&self) -> NodeId {
        struct MaxId(u32);

        impl Visitor for MaxId {
            fn enter(&mut self, node: Node<'_>) {
                if let Node::Identifier(id) = node {
                    self.0 = self.0.max(id.id.0);
                }
            }
        }

        let mut max = MaxId(0);
        self.walk(&mut max);
        NodeId(max.0)
    }

    /// Check that no two identifiers share a node id
    pub fn check_node_ids(&self) -> Result<(), DuplicateNodeId> {
        struct Ids {
            seen: HashSet<NodeId>,
            duplicate: Option<NodeId>,
        }

        impl Visitor for Ids {
            fn enter(&mut self, node: Node<'_>) {
                if let Node::Identifier(ident) = node {
                    if !self.seen.insert(ident.id) && self.duplicate.is_none() {
                        self.duplicate = Some(ident.id);
                    }
                }
            }
        }

        let mut ids = Ids {
            seen: HashSet::new(),
            duplicate: None,
        };
        self.walk(&mut ids);
        match ids.duplicate {
            Some(id) => Err(DuplicateNodeId(id)),
            None => Ok(()),
        }
    }

    /// Return every identifier to its unresolved state
    pub(crate) fn clear_resolution(&self) {
        struct Clear;

        impl Visitor for Clear {
            fn enter(&mut self, node: Node<'_>) {
                if let Node::Identifier(ident) = node {
                    ident.reset();
                }
            }
        }

        self.walk(&mut Clear);
    }
}

/// Versioned program wrapper for JSON interchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedProgram {
    pub ast_version: u32,
    #[serde(flatten)]
    pub program: Program,
}

impl VersionedProgram {
    pub fn new(program: Program) -> Self {
        Self {
            ast_version: AST_VERSION,
            program,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a tree, rejecting trees whose identifiers share node ids
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let versioned: Self = serde_json::from_str(json)?;
        versioned
            .program
            .check_node_ids()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(versioned)
    }
}

impl From<Program> for VersionedProgram {
    fn from(program: Program) -> Self {
        Self::new(program)
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    VarDecl(VariableDeclaration),
    FunctionDecl(Function),
    Block(Block),
    Expr(ExprStmt),
    Return(ReturnStmt),
    If(IfStmt),
    While(WhileStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
}

/// `var a = 1, b;` / `let ...` / `const ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

/// One binding within a declaration group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub kind: VarKind,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Function declaration or expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

/// `try { } catch (e) { } finally { }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub block: Block,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Identifier,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Identifier(Identifier),
    Literal(Literal, Span),
    Call(CallExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Member(MemberExpr),
    Array(ArrayExpr),
    Function(Function),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(id) => id.span,
            Expr::Literal(_, span) => *span,
            Expr::Call(call) => call.span,
            Expr::Binary(binary) => binary.span,
            Expr::Assign(assign) => assign.span,
            Expr::Member(member) => member.span,
            Expr::Array(array) => array.span,
            Expr::Function(func) => func.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Binary operation; the operator is kept as source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

/// `object.property` (the property is not an identifier use)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// Hands out fresh node ids while constructing a tree programmatically
#[derive(Debug, Clone)]
pub struct AstBuilder {
    next: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Continue numbering after an existing tree's ids
    pub fn after(program: &Program) -> Self {
        Self {
            next: program.max_node_id().0 + 1,
        }
    }

    pub fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// A use occurrence with a fresh id
    pub fn use_of(&mut self, name: Name, span: Span) -> Identifier {
        Identifier::new(self.node_id(), name, span)
    }

    /// A binding occurrence with a fresh id
    pub fn binding(&mut self, name: Name, span: Span) -> Identifier {
        Identifier::binding(self.node_id(), name, span)
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
