use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::{
        ast::Program,
        types::{FunctionType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::symbol_table::SymbolTable;

/// Types resolved by the analyzer, keyed by the declaration ids the parser assigned.
///
/// `infer` declarations and functions whose return type was inferred show
/// up here with their concrete types.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub(super) variables: HashMap<i32, Type>,
    pub(super) functions: HashMap<i32, FunctionType>,
}

impl Analysis {
    pub fn variable_type(&self, id: i32) -> Option<&Type> {
        self.variables.get(&id)
    }

    pub fn function_type(&self, id: i32) -> Option<&FunctionType> {
        self.functions.get(&id)
    }
}

#[derive(Debug)]
pub struct Analyzer {
    pub symbols: SymbolTable,
    pub analysis: Analysis,
    /// Position of the statement being analyzed. Expressions carry no
    /// positions, so their errors point here.
    pub position: Position,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            symbols: SymbolTable::new(),
            analysis: Analysis::default(),
            position: Position::null(),
        }
    }

    pub fn error(&self, error: ErrorImpl) -> Error {
        Error::new(error, self.position.clone())
    }

    /// Every template name a type mentions must refer to a declared template.
    pub fn validate_type(&self, ty: &Type) -> Result<(), Error> {
        for name in ty.referenced_names() {
            match self.symbols.lookup(name, false) {
                Some(Type::Template(_)) => {}
                Some(_) => {
                    return Err(self.error(ErrorImpl::NotATemplate {
                        name: name.to_string(),
                    }))
                }
                None => {
                    return Err(self.error(ErrorImpl::TypeNotDefined {
                        name: name.to_string(),
                    }))
                }
            }
        }

        Ok(())
    }

    pub fn validate_signature(&self, function: &FunctionType) -> Result<(), Error> {
        self.validate_type(&function.return_type)?;
        for (_, param) in &function.params {
            self.validate_type(param)?;
        }

        Ok(())
    }

    /// Replaces a bare template name with the template it refers to.
    /// Nested names stay as they are; they compare equal to the template.
    pub fn resolve_type(&self, ty: Type) -> Result<Type, Error> {
        match ty {
            Type::TypeName(name) => match self.symbols.lookup(&name, false) {
                Some(Type::Template(template)) => Ok(Type::Template(template.clone())),
                Some(_) => Err(self.error(ErrorImpl::NotATemplate { name })),
                None => Err(self.error(ErrorImpl::TypeNotDefined { name })),
            },
            ty => Ok(ty),
        }
    }

    /// Set elements and map keys must be hashable at every nesting level.
    pub fn check_hashable(&self, ty: &Type) -> Result<(), Error> {
        match ty {
            Type::Set(element) => {
                if !element.is_hashable() {
                    return Err(self.error(ErrorImpl::UnhashableElement {
                        received: element.to_string(),
                    }));
                }
                self.check_hashable(element)
            }
            Type::Map { key, value } => {
                if !key.is_hashable() {
                    return Err(self.error(ErrorImpl::UnhashableKey {
                        received: key.to_string(),
                    }));
                }
                self.check_hashable(key)?;
                self.check_hashable(value)
            }
            Type::Array(element) => self.check_hashable(element),
            Type::Function(function) => {
                self.check_hashable(&function.return_type)?;
                for (_, param) in &function.params {
                    self.check_hashable(param)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Checks a parsed program and returns the resolved declaration types.
///
/// Analysis stops at the first error.
pub fn analyze(program: &Program) -> Result<Analysis, Error> {
    let mut analyzer = Analyzer::new();

    for stmt in &program.body {
        analyzer.analyze_stmt(stmt)?;
    }

    debug!(
        variables = analyzer.analysis.variables.len(),
        functions = analyzer.analysis.functions.len(),
        "analysis finished"
    );

    Ok(analyzer.analysis)
}
