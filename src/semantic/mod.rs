//! Semantic analysis for parsed Cirrus programs.
//!
//! The analyzer walks the AST once, keeping a stack of scopes, and rejects
//! programs that misuse names, types or control flow. It reports the first
//! problem it finds. On success it returns an [`analyzer::Analysis`] holding
//! the resolved type of every declaration, including inferred ones.

pub mod analyzer;
pub mod expressions;
pub mod statements;
pub mod symbol_table;

#[cfg(test)]
mod tests;
