//! Error types and error handling for the front end.
//!
//! Every phase (lexing, parsing, analysis) reports failures through the
//! single [`errors::Error`] type, which pairs an [`errors::ErrorImpl`]
//! variant with the source position it was raised at. Each variant maps
//! onto one [`errors::ErrorKind`]: lexical, syntax, name, type or control
//! flow.
//!
//! Diagnostics are fatal. The first one aborts the pass.

pub mod errors;
