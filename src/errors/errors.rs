use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// The broad class a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Name,
    Type,
    ControlFlow,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Name => "name error",
            ErrorKind::Type => "type error",
            ErrorKind::ControlFlow => "control flow error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnterminatedString
            | ErrorImpl::UnterminatedComment => ErrorKind::Lexical,

            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::ExpectedToken { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::InvalidAssignmentTarget
            | ErrorImpl::DuplicateTemplateMember { .. } => ErrorKind::Syntax,

            ErrorImpl::VariableRedeclared { .. }
            | ErrorImpl::VariableShadowed { .. }
            | ErrorImpl::FunctionRedeclared { .. }
            | ErrorImpl::TemplateRedeclared { .. }
            | ErrorImpl::SymbolAlreadyDefined { .. }
            | ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::FunctionNotDeclared { .. }
            | ErrorImpl::TemplateNotFound { .. }
            | ErrorImpl::TypeNotDefined { .. }
            | ErrorImpl::AttributeNotDefined { .. } => ErrorKind::Name,

            ErrorImpl::VariableTypeMismatch { .. }
            | ErrorImpl::BinaryTypeMismatch { .. }
            | ErrorImpl::AssignmentTypeMismatch { .. }
            | ErrorImpl::ReturnTypeMismatch { .. }
            | ErrorImpl::ReturnTypeNotInferred { .. }
            | ErrorImpl::ArgumentTypeMismatch { .. }
            | ErrorImpl::AttributeTypeMismatch { .. }
            | ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::InvalidIncrementTarget { .. }
            | ErrorImpl::NotAFunction { .. }
            | ErrorImpl::CalleeNotFunction { .. }
            | ErrorImpl::FunctionArity { .. }
            | ErrorImpl::CalleeArity { .. }
            | ErrorImpl::MethodArity { .. }
            | ErrorImpl::NonIntegerIndex { .. }
            | ErrorImpl::IndexingNonArray { .. }
            | ErrorImpl::NoMembers { .. }
            | ErrorImpl::NoMethods { .. }
            | ErrorImpl::MemberNotDefined { .. }
            | ErrorImpl::MethodNotDefined { .. }
            | ErrorImpl::InvalidElementType { .. }
            | ErrorImpl::InvalidKeyType { .. }
            | ErrorImpl::InvalidValueType { .. }
            | ErrorImpl::UnhashableElement { .. }
            | ErrorImpl::UnhashableKey { .. }
            | ErrorImpl::NotATemplate { .. }
            | ErrorImpl::NonBooleanCondition { .. }
            | ErrorImpl::NonIntegerRange
            | ErrorImpl::NonArrayIterable { .. } => ErrorKind::Type,

            ErrorImpl::UnreachableCode
            | ErrorImpl::UnreachableElse
            | ErrorImpl::UnreachableIf
            | ErrorImpl::HaltOutsideLoop
            | ErrorImpl::SkipOutsideLoop
            | ErrorImpl::ReturnOutsideFunction
            | ErrorImpl::GlobalScopeExit => ErrorKind::ControlFlow,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::ExpectedToken { .. } => "ExpectedToken",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::DuplicateTemplateMember { .. } => "DuplicateTemplateMember",
            ErrorImpl::VariableRedeclared { .. } => "VariableRedeclared",
            ErrorImpl::VariableShadowed { .. } => "VariableShadowed",
            ErrorImpl::FunctionRedeclared { .. } => "FunctionRedeclared",
            ErrorImpl::TemplateRedeclared { .. } => "TemplateRedeclared",
            ErrorImpl::SymbolAlreadyDefined { .. } => "SymbolAlreadyDefined",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::TemplateNotFound { .. } => "TemplateNotFound",
            ErrorImpl::TypeNotDefined { .. } => "TypeNotDefined",
            ErrorImpl::AttributeNotDefined { .. } => "AttributeNotDefined",
            ErrorImpl::VariableTypeMismatch { .. } => "VariableTypeMismatch",
            ErrorImpl::BinaryTypeMismatch { .. } => "BinaryTypeMismatch",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::ReturnTypeNotInferred { .. } => "ReturnTypeNotInferred",
            ErrorImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            ErrorImpl::AttributeTypeMismatch { .. } => "AttributeTypeMismatch",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidIncrementTarget { .. } => "InvalidIncrementTarget",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::CalleeNotFunction { .. } => "CalleeNotFunction",
            ErrorImpl::FunctionArity { .. } => "FunctionArity",
            ErrorImpl::CalleeArity { .. } => "CalleeArity",
            ErrorImpl::MethodArity { .. } => "MethodArity",
            ErrorImpl::NonIntegerIndex { .. } => "NonIntegerIndex",
            ErrorImpl::IndexingNonArray { .. } => "IndexingNonArray",
            ErrorImpl::NoMembers { .. } => "NoMembers",
            ErrorImpl::NoMethods { .. } => "NoMethods",
            ErrorImpl::MemberNotDefined { .. } => "MemberNotDefined",
            ErrorImpl::MethodNotDefined { .. } => "MethodNotDefined",
            ErrorImpl::InvalidElementType { .. } => "InvalidElementType",
            ErrorImpl::InvalidKeyType { .. } => "InvalidKeyType",
            ErrorImpl::InvalidValueType { .. } => "InvalidValueType",
            ErrorImpl::UnhashableElement { .. } => "UnhashableElement",
            ErrorImpl::UnhashableKey { .. } => "UnhashableKey",
            ErrorImpl::NotATemplate { .. } => "NotATemplate",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::NonIntegerRange => "NonIntegerRange",
            ErrorImpl::NonArrayIterable { .. } => "NonArrayIterable",
            ErrorImpl::UnreachableCode => "UnreachableCode",
            ErrorImpl::UnreachableElse => "UnreachableElse",
            ErrorImpl::UnreachableIf => "UnreachableIf",
            ErrorImpl::HaltOutsideLoop => "HaltOutsideLoop",
            ErrorImpl::SkipOutsideLoop => "SkipOutsideLoop",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::GlobalScopeExit => "GlobalScopeExit",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::ExpectedToken { expected, .. } => {
                ErrorTip::Suggestion(format!("Insert `{}` here", expected))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("Close the string with a matching quote"))
            }
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables, index expressions and members can be assigned to",
            )),
            ErrorImpl::VariableShadowed { name } => ErrorTip::Suggestion(format!(
                "`{}` is declared in an enclosing scope, pick another name",
                name
            )),
            ErrorImpl::VariableNotDeclared { name } => ErrorTip::Suggestion(format!(
                "Declare `{}` before use; functions cannot see outer variables",
                name
            )),
            ErrorImpl::VariableTypeMismatch {
                declared, actual, ..
            } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                declared, actual
            )),
            ErrorImpl::ArgumentTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::AttributeTypeMismatch { declared, actual, .. } => {
                ErrorTip::Suggestion(format!(
                    "Expected attribute type `{}`, received `{}`",
                    declared, actual
                ))
            }
            ErrorImpl::BinaryTypeMismatch { .. } => {
                ErrorTip::Suggestion(String::from("Both operands must have the same type"))
            }
            ErrorImpl::FunctionArity { expected, received, .. }
            | ErrorImpl::CalleeArity { expected, received }
            | ErrorImpl::MethodArity { expected, received, .. } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::UnhashableElement { .. } | ErrorImpl::UnhashableKey { .. } => {
                ErrorTip::Suggestion(String::from("Only primitives and sets are hashable"))
            }
            ErrorImpl::HaltOutsideLoop | ErrorImpl::SkipOutsideLoop => ErrorTip::Suggestion(
                String::from("Loops do not extend into function bodies"),
            ),
            ErrorImpl::ReturnTypeNotInferred { name } => ErrorTip::Suggestion(format!(
                "Declare the return type of `{}` or return a non-recursive value first",
                name
            )),
            ErrorImpl::UnreachableCode => ErrorTip::Suggestion(String::from(
                "Remove the statements after return, halt or skip",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} at line {}, column {}",
            self.kind(),
            self.internal_error,
            self.position.line,
            self.position.column
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,

    // Syntax
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("expected {expected}, got {received:?}")]
    ExpectedToken { expected: String, received: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("Invalid left-hand side in assignment")]
    InvalidAssignmentTarget,
    #[error("Duplicate member `{member}` in template `{template}`")]
    DuplicateTemplateMember { template: String, member: String },

    // Name
    #[error("Cannot redeclare variable \"{name}\"")]
    VariableRedeclared { name: String },
    #[error("Cannot shadow existing variable \"{name}\"")]
    VariableShadowed { name: String },
    #[error("Cannot redeclare function \"{name}\"")]
    FunctionRedeclared { name: String },
    #[error("Cannot redeclare template \"{name}\"")]
    TemplateRedeclared { name: String },
    #[error("Symbol \"{name}\" already declared in the current scope")]
    SymbolAlreadyDefined { name: String },
    #[error("Variable `{name}` not declared")]
    VariableNotDeclared { name: String },
    #[error("Function `{name}` not declared")]
    FunctionNotDeclared { name: String },
    #[error("Template `{name}` not found")]
    TemplateNotFound { name: String },
    #[error("Type `{name}` is not defined")]
    TypeNotDefined { name: String },
    #[error("Attribute `{attribute}` not defined in template `{template}`")]
    AttributeNotDefined { attribute: String, template: String },

    // Type
    #[error("Type mismatch for variable `{name}`: `{declared}` != `{actual}`")]
    VariableTypeMismatch {
        name: String,
        declared: String,
        actual: String,
    },
    #[error("Type mismatch in binary expression: `{left}` != `{right}`")]
    BinaryTypeMismatch { left: String, right: String },
    #[error("Type mismatch in assignment expression: `{target}` != `{value}`")]
    AssignmentTypeMismatch { target: String, value: String },
    #[error("Return type `{actual}` does not match function return type `{expected}`")]
    ReturnTypeMismatch { expected: String, actual: String },
    #[error("Return type of `{name}` is not inferred yet")]
    ReturnTypeNotInferred { name: String },
    #[error("Argument type `{received}` does not match parameter type `{expected}`")]
    ArgumentTypeMismatch { expected: String, received: String },
    #[error("Type mismatch for attribute `{attribute}`: `{declared}` != `{actual}`")]
    AttributeTypeMismatch {
        attribute: String,
        declared: String,
        actual: String,
    },
    #[error("Invalid operand type for {operator}: `{operand}`")]
    InvalidOperand { operator: String, operand: String },
    #[error("Invalid assignment target for {operator}")]
    InvalidIncrementTarget { operator: String },
    #[error("`{name}` is not a function")]
    NotAFunction { name: String },
    #[error("Callee expression does not evaluate to a function type, got `{received}`")]
    CalleeNotFunction { received: String },
    #[error("Function `{name}` expects {expected} arguments, got {received}")]
    FunctionArity {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("Function expects {expected} arguments, got {received}")]
    CalleeArity { expected: usize, received: usize },
    #[error("Method `{method}` expects {expected} arguments, got {received}")]
    MethodArity {
        method: String,
        expected: usize,
        received: usize,
    },
    #[error("Array index must be an integer, got `{received}`")]
    NonIntegerIndex { received: String },
    #[error("Indexing non-array type `{received}`")]
    IndexingNonArray { received: String },
    #[error("Type `{received}` does not have members")]
    NoMembers { received: String },
    #[error("Type `{received}` does not have methods")]
    NoMethods { received: String },
    #[error("Member `{member}` is not defined on type `{received}`")]
    MemberNotDefined { member: String, received: String },
    #[error("Method `{method}` is not defined on type `{received}`")]
    MethodNotDefined { method: String, received: String },
    #[error("Invalid element type in {collection} literal: `{expected}` != `{received}`")]
    InvalidElementType {
        collection: String,
        expected: String,
        received: String,
    },
    #[error("Invalid key type in map literal: `{expected}` != `{received}`")]
    InvalidKeyType { expected: String, received: String },
    #[error("Invalid value type in map literal: `{expected}` != `{received}`")]
    InvalidValueType { expected: String, received: String },
    #[error("Element type of set must be hashable, got `{received}`")]
    UnhashableElement { received: String },
    #[error("Key type of map must be hashable, got `{received}`")]
    UnhashableKey { received: String },
    #[error("`{name}` is not a template")]
    NotATemplate { name: String },
    #[error("Condition of {statement} statement must be a boolean, got `{received}`")]
    NonBooleanCondition { statement: String, received: String },
    #[error("Range boundaries and increment must be integers")]
    NonIntegerRange,
    #[error("Each statement requires an array type for iteration, got `{received}`")]
    NonArrayIterable { received: String },

    // Control flow
    #[error("Unreachable code detected")]
    UnreachableCode,
    #[error("Unreachable else block detected")]
    UnreachableElse,
    #[error("Unreachable if block detected")]
    UnreachableIf,
    #[error("Halt statement is not valid outside of a loop block")]
    HaltOutsideLoop,
    #[error("Skip statement is not valid outside of a loop block")]
    SkipOutsideLoop,
    #[error("Return statement is not valid outside of a function block")]
    ReturnOutsideFunction,
    #[error("Cannot exit the global scope")]
    GlobalScopeExit,
}
