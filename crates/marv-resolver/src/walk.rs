//! Depth-first tree traversal
//!
//! The walker owns all recursion. Passes implement [`Visitor`] and receive an
//! `enter` call before a node's children are visited and an `exit` call after,
//! in document order. Handlers match on [`Node`] to pick the kinds they care
//! about.

use crate::ast::*;
use std::fmt;

/// Borrowed view of a tree node, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    VariableDeclaration(&'a VariableDeclaration),
    VariableDeclarator(&'a VariableDeclarator),
    FunctionDeclaration(&'a Function),
    FunctionExpression(&'a Function),
    Block(&'a Block),
    ExpressionStatement(&'a ExprStmt),
    Return(&'a ReturnStmt),
    If(&'a IfStmt),
    While(&'a WhileStmt),
    Try(&'a TryStmt),
    CatchClause(&'a CatchClause),
    Throw(&'a ThrowStmt),
    Identifier(&'a Identifier),
    Literal(&'a Literal),
    Call(&'a CallExpr),
    Binary(&'a BinaryExpr),
    Assign(&'a AssignExpr),
    Member(&'a MemberExpr),
    Array(&'a ArrayExpr),
}

/// Node kind, without the borrowed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    Block,
    ExpressionStatement,
    Return,
    If,
    While,
    Try,
    CatchClause,
    Throw,
    Identifier,
    Literal,
    Call,
    Binary,
    Assign,
    Member,
    Array,
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program(_) => NodeKind::Program,
            Node::VariableDeclaration(_) => NodeKind::VariableDeclaration,
            Node::VariableDeclarator(_) => NodeKind::VariableDeclarator,
            Node::FunctionDeclaration(_) => NodeKind::FunctionDeclaration,
            Node::FunctionExpression(_) => NodeKind::FunctionExpression,
            Node::Block(_) => NodeKind::Block,
            Node::ExpressionStatement(_) => NodeKind::ExpressionStatement,
            Node::Return(_) => NodeKind::Return,
            Node::If(_) => NodeKind::If,
            Node::While(_) => NodeKind::While,
            Node::Try(_) => NodeKind::Try,
            Node::CatchClause(_) => NodeKind::CatchClause,
            Node::Throw(_) => NodeKind::Throw,
            Node::Identifier(_) => NodeKind::Identifier,
            Node::Literal(_) => NodeKind::Literal,
            Node::Call(_) => NodeKind::Call,
            Node::Binary(_) => NodeKind::Binary,
            Node::Assign(_) => NodeKind::Assign,
            Node::Member(_) => NodeKind::Member,
            Node::Array(_) => NodeKind::Array,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Enter/exit handler table
///
/// Both methods default to doing nothing, so a pass only overrides the hooks
/// it needs.
pub trait Visitor {
    fn enter(&mut self, _node: Node<'_>) {}
    fn exit(&mut self, _node: Node<'_>) {}
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    v.enter(Node::Program(program));
    for stmt in &program.body {
        walk_stmt(v, stmt);
    }
    v.exit(Node::Program(program));
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::VarDecl(decl) => walk_var_decl(v, decl),
        Stmt::FunctionDecl(func) => {
            let node = Node::FunctionDeclaration(func);
            v.enter(node);
            walk_function_parts(v, func);
            v.exit(node);
        }
        Stmt::Block(block) => walk_block(v, block),
        Stmt::Expr(expr_stmt) => {
            let node = Node::ExpressionStatement(expr_stmt);
            v.enter(node);
            walk_expr(v, &expr_stmt.expr);
            v.exit(node);
        }
        Stmt::Return(ret) => {
            let node = Node::Return(ret);
            v.enter(node);
            if let Some(value) = &ret.value {
                walk_expr(v, value);
            }
            v.exit(node);
        }
        Stmt::If(if_stmt) => {
            let node = Node::If(if_stmt);
            v.enter(node);
            walk_expr(v, &if_stmt.test);
            walk_stmt(v, &if_stmt.consequent);
            if let Some(alternate) = &if_stmt.alternate {
                walk_stmt(v, alternate);
            }
            v.exit(node);
        }
        Stmt::While(while_stmt) => {
            let node = Node::While(while_stmt);
            v.enter(node);
            walk_expr(v, &while_stmt.test);
            walk_stmt(v, &while_stmt.body);
            v.exit(node);
        }
        Stmt::Try(try_stmt) => {
            let node = Node::Try(try_stmt);
            v.enter(node);
            walk_block(v, &try_stmt.block);
            if let Some(handler) = &try_stmt.handler {
                let catch = Node::CatchClause(handler);
                v.enter(catch);
                walk_identifier(v, &handler.param);
                // The catch clause already opened a scope for its body
                for stmt in &handler.body.statements {
                    walk_stmt(v, stmt);
                }
                v.exit(catch);
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                walk_block(v, finalizer);
            }
            v.exit(node);
        }
        Stmt::Throw(throw) => {
            let node = Node::Throw(throw);
            v.enter(node);
            walk_expr(v, &throw.value);
            v.exit(node);
        }
    }
}

fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, decl: &VariableDeclaration) {
    let node = Node::VariableDeclaration(decl);
    v.enter(node);
    for declarator in &decl.declarations {
        let inner = Node::VariableDeclarator(declarator);
        v.enter(inner);
        walk_identifier(v, &declarator.id);
        if let Some(init) = &declarator.init {
            walk_expr(v, init);
        }
        v.exit(inner);
    }
    v.exit(node);
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    let node = Node::Block(block);
    v.enter(node);
    for stmt in &block.statements {
        walk_stmt(v, stmt);
    }
    v.exit(node);
}

/// Name, parameters, then body statements.
///
/// The body is not reported as a separate block: the function construct
/// itself delimits the body's scope.
fn walk_function_parts<V: Visitor + ?Sized>(v: &mut V, func: &Function) {
    if let Some(name) = &func.name {
        walk_identifier(v, name);
    }
    for param in &func.params {
        walk_identifier(v, param);
    }
    for stmt in &func.body.statements {
        walk_stmt(v, stmt);
    }
}

fn walk_identifier<V: Visitor + ?Sized>(v: &mut V, id: &Identifier) {
    let node = Node::Identifier(id);
    v.enter(node);
    v.exit(node);
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Identifier(id) => walk_identifier(v, id),
        Expr::Literal(lit, _) => {
            let node = Node::Literal(lit);
            v.enter(node);
            v.exit(node);
        }
        Expr::Call(call) => {
            let node = Node::Call(call);
            v.enter(node);
            walk_expr(v, &call.callee);
            for arg in &call.args {
                walk_expr(v, arg);
            }
            v.exit(node);
        }
        Expr::Binary(binary) => {
            let node = Node::Binary(binary);
            v.enter(node);
            walk_expr(v, &binary.left);
            walk_expr(v, &binary.right);
            v.exit(node);
        }
        Expr::Assign(assign) => {
            let node = Node::Assign(assign);
            v.enter(node);
            walk_expr(v, &assign.target);
            walk_expr(v, &assign.value);
            v.exit(node);
        }
        Expr::Member(member) => {
            let node = Node::Member(member);
            v.enter(node);
            walk_expr(v, &member.object);
            v.exit(node);
        }
        Expr::Array(array) => {
            let node = Node::Array(array);
            v.enter(node);
            for elem in &array.elements {
                walk_expr(v, elem);
            }
            v.exit(node);
        }
        Expr::Function(func) => {
            let node = Node::FunctionExpression(func);
            v.enter(node);
            walk_function_parts(v, func);
            v.exit(node);
        }
    }
}
