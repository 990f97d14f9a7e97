//! Identifier resolution
//!
//! Binds every identifier use to the declaration it refers to. The pass keeps
//! two scope cursors while walking the tree:
//!
//! - the block cursor, which moves on every block, catch clause and function
//!   body, and hosts `let`/`const`/`catch` bindings;
//! - the function cursor, which moves only on functions, and hosts
//!   `var`/`function`/parameter/`arguments` bindings.
//!
//! Both start at a shared root scope pre-populated with the host's intrinsic
//! names as constants. All state lives in a per-call session, so separate
//! calls never interfere.

use crate::ast::{
    AstBuilder, CatchClause, DeclKind, Function, Identifier, Name, NodeId, Program,
    VariableDeclaration,
};
use crate::diagnostic::{error_codes, Diagnostic, DiagnosticLevel, DiagnosticSink};
use crate::redefinition::Redefinition;
use crate::registry::{DeclId, Declarator, Registry};
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::span::Span;
use crate::walk::{Node, Visitor};
use std::collections::HashSet;
use tracing::{debug, instrument, trace};

/// Names the host environment provides before any user code runs
pub const DEFAULT_INTRINSICS: &[&str] = &[
    "Object",
    "Array",
    "String",
    "Date",
    "undefined",
    "require",
    "exports",
];

/// Name of the implicit argument-list binding of every function
pub const ARGUMENTS: &str = "arguments";

/// Knobs for one resolver
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    /// Names pre-declared as constants in the root scope
    pub intrinsics: Vec<Name>,
    /// Report uses that match no declaration
    pub warn_unresolved: bool,
    /// File name stamped on diagnostics
    pub file: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            intrinsics: DEFAULT_INTRINSICS.iter().copied().map(Name::builtin).collect(),
            warn_unresolved: true,
            file: "<input>".to_string(),
        }
    }
}

/// Output of a resolution run
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The input tree, with uses unified to their declarations
    pub program: Program,
    /// Every declarator accepted during the run
    pub registry: Registry,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Declarator an identifier resolves to, if any
    pub fn declaration_of(&self, ident: &Identifier) -> Option<&Declarator> {
        self.registry
            .declaration_of(ident.canonical())
            .map(|(_, decl)| decl)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
    }
}

/// Identifier resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve `program`, consuming and returning it with every resolvable use bound
    pub fn resolve(&self, program: Program) -> Resolution {
        let mut diagnostics = Vec::new();
        let registry = self.resolve_with_sink(&program, &mut diagnostics);
        Resolution {
            program,
            registry,
            diagnostics,
        }
    }

    /// Resolve `program` in place, reporting into `sink`
    ///
    /// Always walks the whole tree; diagnostics never cut the pass short.
    /// Bindings left over from an earlier run are discarded first.
    ///
    /// # Panics
    ///
    /// If two identifiers of `program` share a node id.
    #[instrument(level = "debug", skip_all, fields(file = %self.options.file))]
    pub fn resolve_with_sink(&self, program: &Program, sink: &mut dyn DiagnosticSink) -> Registry {
        if let Err(err) = program.check_node_ids() {
            panic!("malformed syntax tree: {err}");
        }
        program.clear_resolution();

        let mut session = Session::new(&self.options, program, sink);
        program.walk(&mut session);
        debug!(
            declarations = session.registry.len(),
            scopes = session.scopes.len(),
            "resolution finished"
        );
        session.registry
    }
}

/// Resolve `program` with default options
pub fn resolve(program: Program) -> Resolution {
    Resolver::new().resolve(program)
}

/// State of one traversal
struct Session<'a> {
    options: &'a ResolverOptions,
    sink: &'a mut dyn DiagnosticSink,
    scopes: ScopeTree,
    registry: Registry,
    block_scope: ScopeId,
    function_scope: ScopeId,
    /// Ids for declarators that have no node in the tree
    synthetic: AstBuilder,
    /// Binding occurrences announced by their construct but not yet visited
    binding_sites: HashSet<NodeId>,
}

impl<'a> Session<'a> {
    fn new(
        options: &'a ResolverOptions,
        program: &Program,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let mut scopes = ScopeTree::new();
        let mut registry = Registry::new();
        let mut synthetic = AstBuilder::after(program);
        let root = scopes.root();

        for name in &options.intrinsics {
            let declarator =
                Declarator::new(name.clone(), DeclKind::Const, Span::dummy(), synthetic.node_id());
            scopes.declare(root, declarator, &mut registry);
        }

        Self {
            options,
            sink,
            scopes,
            registry,
            block_scope: root,
            function_scope: root,
            synthetic,
            binding_sites: HashSet::new(),
        }
    }

    /// Parent of a scope being left
    fn leave(&self, scope: ScopeId) -> ScopeId {
        match self.scopes.parent(scope) {
            Some(parent) => parent,
            None => panic!("attempted to leave the root scope: unbalanced enter/exit"),
        }
    }

    /// Existing declarator that an incoming `kind` declaration of `name` collides with
    ///
    /// The block scope is always checked. The function scope is checked for
    /// function-scoped kinds, and for block-scoped kinds only while the block
    /// cursor sits at the function's own level, so a `let` in a nested block
    /// shadows rather than collides. The flag is set when the match sits in
    /// the function scope while the block cursor is inside a nested block.
    fn local_collision(&self, name: &str, kind: DeclKind) -> Option<(DeclId, bool)> {
        if let Some(decl) = self.scopes.lookup_local(self.block_scope, name) {
            return Some((decl, false));
        }
        let nested = self.scopes.kind(self.block_scope).is_nested_block();
        if nested && kind.is_block_scoped() {
            return None;
        }
        let decl = self.scopes.lookup_local(self.function_scope, name)?;
        Some((decl, nested))
    }

    /// Declare through the redefinition policy
    fn declare_checked(&mut self, ident: &Identifier, kind: DeclKind, span: Span) {
        let incoming = Declarator::new(ident.name.clone(), kind, span, ident.id);

        if let Some((existing, subblock)) = self.local_collision(ident.name.as_str(), kind) {
            let first = &self.registry[existing];
            let diag = Redefinition::new(first, &incoming, subblock).to_diagnostic(&self.options.file);
            ident.unify_with(first.node);
            self.sink.report(diag);
            return;
        }

        let scope = if kind.is_block_scoped() {
            self.block_scope
        } else {
            self.function_scope
        };
        let decl = self.scopes.declare(scope, incoming, &mut self.registry);
        ident.record_declaration(decl, scope);
    }

    /// Declare without consulting the policy (catch parameters, arguments)
    fn declare_fresh(&mut self, scope: ScopeId, ident: &Identifier, kind: DeclKind) {
        let declarator = Declarator::new(ident.name.clone(), kind, ident.span, ident.id);
        let decl = self.scopes.declare(scope, declarator, &mut self.registry);
        ident.record_declaration(decl, scope);
    }

    fn exit_declaration(&mut self, group: &VariableDeclaration) {
        for declarator in &group.declarations {
            self.declare_checked(&declarator.id, declarator.kind.into(), declarator.span);
        }
    }

    fn exit_identifier(&mut self, ident: &Identifier) {
        if self.binding_sites.remove(&ident.id) || ident.binder {
            trace!(name = %ident.name, span = %ident.span, "skipping binding occurrence");
            return;
        }

        match self.scopes.lookup_visible(self.block_scope, ident.name.as_str()) {
            Some(decl) => {
                let target = self.registry[decl].node;
                trace!(name = %ident.name, %decl, "resolved");
                ident.unify_with(target);
            }
            None if self.options.warn_unresolved => {
                self.sink.report(
                    Diagnostic::warning_with_code(
                        error_codes::UNRESOLVED_IDENTIFIER,
                        format!("Undefined identifier '{}'", ident.name),
                        ident.span,
                    )
                    .with_file(self.options.file.as_str())
                    .with_label("not declared in any enclosing scope")
                    .with_help(format!(
                        "declare '{}' before using it, or check for typos",
                        ident.name
                    )),
                );
            }
            None => {}
        }
    }

    fn enter_catch(&mut self, clause: &CatchClause) {
        self.binding_sites.insert(clause.param.id);
        self.block_scope = self.scopes.child(self.block_scope, ScopeKind::Catch);
        self.declare_fresh(self.block_scope, &clause.param, DeclKind::Catch);
    }

    fn enter_function(&mut self, func: &Function) {
        self.binding_sites
            .extend(func.name.iter().chain(&func.params).map(|ident| ident.id));
        if let Some(name) = &func.name {
            debug!(name = %name.name, "entering function");
            self.declare_checked(name, DeclKind::Function, name.span);
        }

        let function_scope = self.scopes.child(self.function_scope, ScopeKind::Function);
        self.block_scope = self.scopes.function_body(self.block_scope, function_scope);
        self.function_scope = function_scope;

        // Same-named parameters overwrite each other: the last one wins
        for param in &func.params {
            self.declare_fresh(function_scope, param, DeclKind::Argument);
        }

        let arguments = Declarator::new(
            Name::builtin(ARGUMENTS),
            DeclKind::Auto,
            func.span,
            self.synthetic.node_id(),
        );
        self.scopes
            .declare(function_scope, arguments, &mut self.registry);
    }

    fn exit_function(&mut self) {
        debug_assert_eq!(self.scopes.kind(self.block_scope), ScopeKind::FunctionBody);
        self.block_scope = self.leave(self.block_scope);
        self.function_scope = self.leave(self.function_scope);
    }
}

impl Visitor for Session<'_> {
    fn enter(&mut self, node: Node<'_>) {
        match node {
            Node::Block(_) => {
                self.block_scope = self.scopes.child(self.block_scope, ScopeKind::Block);
            }
            Node::VariableDeclarator(declarator) => {
                self.binding_sites.insert(declarator.id.id);
            }
            Node::CatchClause(clause) => self.enter_catch(clause),
            Node::FunctionDeclaration(func) | Node::FunctionExpression(func) => {
                self.enter_function(func)
            }
            _ => {}
        }
    }

    fn exit(&mut self, node: Node<'_>) {
        match node {
            Node::VariableDeclaration(group) => self.exit_declaration(group),
            Node::Identifier(ident) => self.exit_identifier(ident),
            Node::Block(_) | Node::CatchClause(_) => {
                self.block_scope = self.leave(self.block_scope);
            }
            Node::FunctionDeclaration(_) | Node::FunctionExpression(_) => self.exit_function(),
            _ => {}
        }
    }
}
