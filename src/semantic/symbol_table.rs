use std::collections::HashMap;

use tracing::debug;

use crate::{
    ast::types::{FunctionType, Type},
    errors::errors::{Error, ErrorImpl},
    Position,
};

/// What opened a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Global,
    Block,
    /// A function body. Holds the signature so `return` can check against it
    /// and fix an `infer` return type.
    Function(FunctionType),
    Loop,
    Branch,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    symbols: HashMap<String, Type>,
    pub reachable: bool,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            symbols: HashMap::new(),
            reachable: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.symbols.get(name)
    }
}

/// A stack of lexical scopes. The global scope at the bottom is never popped.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::new(ScopeKind::Global)],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) {
        debug!(depth = self.scopes.len(), kind = ?kind, "enter scope");
        self.scopes.push(Scope::new(kind));
    }

    /// Pops the innermost scope and hands it back, so callers can read its
    /// reachability or resolved function signature.
    pub fn exit_scope(&mut self, position: &Position) -> Result<Scope, Error> {
        if self.scopes.len() == 1 {
            return Err(Error::new(ErrorImpl::GlobalScopeExit, position.clone()));
        }

        match self.scopes.pop() {
            Some(scope) => {
                debug!(depth = self.scopes.len(), reachable = scope.reachable, "exit scope");
                Ok(scope)
            }
            None => Err(Error::new(ErrorImpl::GlobalScopeExit, position.clone())),
        }
    }

    fn current(&self) -> &Scope {
        let index = self.depth();
        &self.scopes[index]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let index = self.depth();
        &mut self.scopes[index]
    }

    /// Defines `name` in the innermost scope. Names may repeat across scopes
    /// but not within one.
    pub fn define(&mut self, name: &str, ty: Type, position: &Position) -> Result<(), Error> {
        if self.current().symbols.contains_key(name) {
            return Err(Error::new(
                ErrorImpl::SymbolAlreadyDefined {
                    name: name.to_string(),
                },
                position.clone(),
            ));
        }

        debug!(name, ty = %ty, depth = self.depth(), "define");
        self.current_mut().symbols.insert(name.to_string(), ty);
        Ok(())
    }

    /// Replaces the type of an existing symbol in the innermost scope that owns it.
    pub fn update(&mut self, name: &str, ty: Type) {
        if let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.symbols.contains_key(name))
        {
            scope.symbols.insert(name.to_string(), ty);
        }
    }

    pub fn is_defined_in_current(&self, name: &str) -> bool {
        self.current().symbols.contains_key(name)
    }

    /// Index of the scope owning `name`, innermost first.
    ///
    /// With `limit_to_function` the walk stops after the nearest function
    /// scope has been checked, so a function body sees its own locals and
    /// parameters but nothing declared around it.
    pub fn lookup_scope(&self, name: &str, limit_to_function: bool) -> Option<usize> {
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            if scope.symbols.contains_key(name) {
                return Some(index);
            }

            if limit_to_function && matches!(scope.kind, ScopeKind::Function(_)) {
                return None;
            }
        }

        None
    }

    pub fn lookup(&self, name: &str, limit_to_function: bool) -> Option<&Type> {
        self.lookup_scope(name, limit_to_function)
            .and_then(|index| self.scopes[index].get(name))
    }

    /// Signature of the nearest enclosing function.
    pub fn current_function_type(&self) -> Option<&FunctionType> {
        self.scopes.iter().rev().find_map(|scope| match &scope.kind {
            ScopeKind::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn current_function_type_mut(&mut self) -> Option<&mut FunctionType> {
        self.scopes.iter_mut().rev().find_map(|scope| match &mut scope.kind {
            ScopeKind::Function(function) => Some(function),
            _ => None,
        })
    }

    /// Whether `halt`/`skip` may appear here. Loops do not extend into function bodies.
    pub fn is_loop_scope(&self) -> bool {
        for scope in self.scopes.iter().rev() {
            match scope.kind {
                ScopeKind::Function(_) => return false,
                ScopeKind::Loop => return true,
                _ => {}
            }
        }

        false
    }

    /// True only when every scope on the stack is reachable.
    pub fn is_reachable(&self) -> bool {
        self.scopes.iter().all(|scope| scope.reachable)
    }

    /// Marks the innermost scope unreachable.
    pub fn set_unreachable(&mut self) {
        self.current_mut().reachable = false;
    }
}
