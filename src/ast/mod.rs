/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The Program root and the closed Stmt / Expr enums
/// - expressions: Payloads of the expression variants
/// - statements: Payloads of the statement variants
/// - types: The type model (primitives, collections, functions, templates)
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
