//! Shared helpers for building trees by hand and inspecting resolved ones
#![allow(dead_code)]

use marv_resolver::ast::*;
use marv_resolver::walk::{Node, Visitor};
use marv_resolver::{Resolution, Span};

pub fn n(s: &str) -> Name {
    Name::new(s).expect("test names are non-empty")
}

/// Builds trees with unique ids and non-overlapping spans
///
/// Spans advance monotonically in construction order, so every identifier
/// gets a distinct location that tests can assert on.
pub struct Tree {
    ids: AstBuilder,
    pos: usize,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            ids: AstBuilder::new(),
            pos: 0,
        }
    }

    fn span_for(&mut self, text: &str) -> Span {
        let span = Span::new(self.pos, self.pos + text.len());
        self.pos = span.end + 1;
        span
    }

    fn here(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    pub fn ident(&mut self, name: &str) -> Identifier {
        let span = self.span_for(name);
        self.ids.use_of(n(name), span)
    }

    pub fn binding(&mut self, name: &str) -> Identifier {
        let span = self.span_for(name);
        self.ids.binding(n(name), span)
    }

    pub fn use_(&mut self, name: &str) -> Expr {
        Expr::Identifier(self.ident(name))
    }

    pub fn num(&mut self, value: f64) -> Expr {
        let start = self.pos;
        self.pos += 2;
        Expr::Literal(Literal::Number(value), self.here(start))
    }

    /// `callee(args...)` where the callee is a plain identifier
    pub fn call(&mut self, callee: &str, args: Vec<Expr>) -> Expr {
        let start = self.pos;
        let callee = Box::new(self.use_(callee));
        Expr::Call(CallExpr {
            callee,
            args,
            span: self.here(start),
        })
    }

    pub fn assign(&mut self, target: &str, value: Expr) -> Expr {
        let start = self.pos;
        let target = Box::new(self.use_(target));
        Expr::Assign(AssignExpr {
            target,
            value: Box::new(value),
            span: self.here(start),
        })
    }

    pub fn member(&mut self, object: Expr, property: &str) -> Expr {
        let start = self.pos;
        self.pos += property.len() + 1;
        Expr::Member(MemberExpr {
            object: Box::new(object),
            property: property.to_string(),
            span: self.here(start),
        })
    }

    pub fn decl(&mut self, kind: VarKind, name: &str, init: Option<Expr>) -> Stmt {
        self.decls(kind, vec![(name, init)])
    }

    /// One declaration group holding several declarators
    pub fn decls(&mut self, kind: VarKind, items: Vec<(&str, Option<Expr>)>) -> Stmt {
        let start = self.pos;
        let declarations = items
            .into_iter()
            .map(|(name, init)| {
                let id = self.binding(name);
                let span = id.span;
                VariableDeclarator {
                    id,
                    kind,
                    init,
                    span,
                }
            })
            .collect();
        Stmt::VarDecl(VariableDeclaration {
            declarations,
            span: self.here(start),
        })
    }

    pub fn var(&mut self, name: &str) -> Stmt {
        self.decl(VarKind::Var, name, None)
    }

    pub fn let_(&mut self, name: &str) -> Stmt {
        self.decl(VarKind::Let, name, None)
    }

    pub fn const_(&mut self, name: &str) -> Stmt {
        self.decl(VarKind::Const, name, None)
    }

    pub fn expr(&mut self, expr: Expr) -> Stmt {
        let span = expr.span();
        Stmt::Expr(ExprStmt { expr, span })
    }

    /// Expression statement consisting of a bare use
    pub fn use_stmt(&mut self, name: &str) -> Stmt {
        let expr = self.use_(name);
        self.expr(expr)
    }

    pub fn ret(&mut self, value: Expr) -> Stmt {
        let span = value.span();
        Stmt::Return(ReturnStmt {
            value: Some(value),
            span,
        })
    }

    pub fn block(&mut self, statements: Vec<Stmt>) -> Stmt {
        Stmt::Block(self.raw_block(statements))
    }

    fn raw_block(&mut self, statements: Vec<Stmt>) -> Block {
        Block {
            statements,
            span: Span::new(0, self.pos),
        }
    }

    pub fn function(&mut self, name: Option<&str>, params: &[&str], body: Vec<Stmt>) -> Function {
        let start = self.pos;
        let name = name.map(|name| self.binding(name));
        let params = params.iter().map(|p| self.binding(p)).collect();
        let body = self.raw_block(body);
        Function {
            name,
            params,
            body,
            span: self.here(start),
        }
    }

    pub fn function_decl(&mut self, name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
        Stmt::FunctionDecl(self.function(Some(name), params, body))
    }

    pub fn try_catch(&mut self, block: Vec<Stmt>, param: &str, body: Vec<Stmt>) -> Stmt {
        let start = self.pos;
        let block = self.raw_block(block);
        let param = self.binding(param);
        let body = self.raw_block(body);
        Stmt::Try(TryStmt {
            block,
            handler: Some(CatchClause {
                param,
                body,
                span: self.here(start),
            }),
            finalizer: None,
            span: self.here(start),
        })
    }

    pub fn program(&mut self, body: Vec<Stmt>) -> Program {
        Program {
            body,
            span: Span::new(0, self.pos),
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Collector {
    found: Vec<Identifier>,
}

impl Visitor for Collector {
    fn enter(&mut self, node: Node<'_>) {
        if let Node::Identifier(ident) = node {
            self.found.push(ident.clone());
        }
    }
}

/// Every identifier in document order, with resolution state
pub fn identifiers(program: &Program) -> Vec<Identifier> {
    let mut collector = Collector::default();
    program.walk(&mut collector);
    collector.found
}

/// Use occurrences of `name`, in document order
pub fn uses_of(program: &Program, name: &str) -> Vec<Identifier> {
    identifiers(program)
        .into_iter()
        .filter(|ident| !ident.binder && ident.name.as_str() == name)
        .collect()
}

/// Binding occurrences of `name`, in document order
pub fn bindings_of(program: &Program, name: &str) -> Vec<Identifier> {
    identifiers(program)
        .into_iter()
        .filter(|ident| ident.binder && ident.name.as_str() == name)
        .collect()
}

/// Diagnostic codes in emission order
pub fn codes(resolution: &Resolution) -> Vec<&str> {
    resolution
        .diagnostics
        .iter()
        .map(|d| d.code.as_str())
        .collect()
}
