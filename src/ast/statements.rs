use std::slice::Iter;

use crate::Position;

use super::{
    ast::{Expr, Stmt},
    types::{FunctionType, Type},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub position: Position,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// `Type name = initializer;`
///
/// `id` keys the analyzer's resolved type for this declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub id: i32,
    pub name: String,
    pub declared_type: Type,
    pub initializer: Expr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: BlockStmt,
    pub else_block: Option<BlockStmt>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub position: Position,
}

/// `range (variable in start to end [by step]) body`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    pub variable: String,
    pub start: Expr,
    pub end: Expr,
    pub step: Expr,
    pub body: BlockStmt,
    pub position: Position,
}

/// `each (variable in iterable) body`
#[derive(Debug, Clone, PartialEq)]
pub struct EachStmt {
    pub variable: String,
    pub iterable: Expr,
    pub body: BlockStmt,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HaltStmt {
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkipStmt {
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub expression: Option<Expr>,
    pub position: Position,
}

/// `func name -> ReturnType = [ParamType name, ...] >> body`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub id: i32,
    pub name: String,
    pub function_type: FunctionType,
    pub body: BlockStmt,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EchoStmt {
    pub expression: Expr,
    pub position: Position,
}

/// `template Name = { Type attr; ... func method ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDeclStmt {
    pub name: String,
    pub attributes: Vec<(String, Type)>,
    pub methods: Vec<FnDeclStmt>,
    pub position: Position,
}
