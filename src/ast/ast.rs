use crate::Position;

use super::{
    expressions::{
        ArrayLiteral, AssignmentExpr, BinaryExpr, CallExpr, EntityLiteral, FunctionLiteral,
        IndexExpr, MapLiteral, MemberExpr, MethodCallExpr, Number, SetLiteral, UnaryExpr,
    },
    statements::{
        BlockStmt, EachStmt, EchoStmt, ExpressionStmt, FnDeclStmt, HaltStmt, IfStmt, RangeStmt,
        ReturnStmt, SkipStmt, TemplateDeclStmt, VarDeclStmt, WhileStmt,
    },
};

/// The root of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    Expression(ExpressionStmt),
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    Range(RangeStmt),
    Each(EachStmt),
    Halt(HaltStmt),
    Skip(SkipStmt),
    Return(ReturnStmt),
    FnDecl(FnDeclStmt),
    Echo(EchoStmt),
    TemplateDecl(TemplateDeclStmt),
}

impl Stmt {
    pub fn position(&self) -> &Position {
        match self {
            Stmt::VarDecl(stmt) => &stmt.position,
            Stmt::Expression(stmt) => &stmt.position,
            Stmt::Block(stmt) => &stmt.position,
            Stmt::If(stmt) => &stmt.position,
            Stmt::While(stmt) => &stmt.position,
            Stmt::Range(stmt) => &stmt.position,
            Stmt::Each(stmt) => &stmt.position,
            Stmt::Halt(stmt) => &stmt.position,
            Stmt::Skip(stmt) => &stmt.position,
            Stmt::Return(stmt) => &stmt.position,
            Stmt::FnDecl(stmt) => &stmt.position,
            Stmt::Echo(stmt) => &stmt.position,
            Stmt::TemplateDecl(stmt) => &stmt.position,
        }
    }
}

/// Expressions carry no positions, so two spellings of the same tree
/// (a pipe and its explicit call chain) compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Numeric(Number),
    String(String),
    Boolean(bool),
    Null,
    Array(ArrayLiteral),
    Set(SetLiteral),
    Map(MapLiteral),
    Entity(EntityLiteral),
    Function(FunctionLiteral),
    Identifier(String),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Assignment(AssignmentExpr),
    Index(IndexExpr),
    Call(CallExpr),
    Member(MemberExpr),
    MethodCall(MethodCallExpr),
}

impl Expr {
    /// Identifiers, and index expressions whose base is itself assignable.
    pub fn is_assignable(&self) -> bool {
        match self {
            Expr::Identifier(_) => true,
            Expr::Index(index) => index.base.is_assignable(),
            Expr::Member(member) => member.object.is_assignable(),
            _ => false,
        }
    }

    /// Whether this may appear on the left of `=`.
    pub fn is_assignment_target(&self) -> bool {
        matches!(self, Expr::Identifier(_) | Expr::Index(_) | Expr::Member(_))
    }

    pub fn identifier(name: &str) -> Self {
        Expr::Identifier(name.to_string())
    }

    pub fn int(value: i64) -> Self {
        Expr::Numeric(Number::Int(value))
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
        })
    }
}
