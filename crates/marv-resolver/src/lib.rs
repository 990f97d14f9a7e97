//! Marv Resolver - Identifier binding for the Marv JavaScript front end
//!
//! This library provides the name-resolution pass of the compiler:
//! - The syntax tree consumed and annotated by the pass
//! - Chained block and function scopes with an intrinsic root
//! - The declarator registry and redefinition policy
//! - Diagnostics for redefinitions and unresolved uses

/// Marv resolver version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod diagnostic;
pub mod redefinition;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod span;
pub mod walk;

// Re-export commonly used types
pub use ast::{
    AstBuilder, DeclKind, DuplicateNodeId, Identifier, Name, NodeId, Program, VarKind,
    VersionedProgram,
};
pub use diagnostic::{
    error_codes, sort_diagnostics, Diagnostic, DiagnosticLevel, DiagnosticSink, RelatedLocation,
    DIAG_VERSION,
};
pub use redefinition::{Redefinition, Severity};
pub use registry::{DeclId, Declarator, Registry};
pub use resolver::{resolve, Resolution, Resolver, ResolverOptions, DEFAULT_INTRINSICS};
pub use scope::{ScopeId, ScopeKind, ScopeTree};
pub use span::Span;
pub use walk::{Node, NodeKind, Visitor};
