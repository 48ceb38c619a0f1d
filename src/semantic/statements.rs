use tracing::debug;

use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{
            BlockStmt, EachStmt, FnDeclStmt, IfStmt, RangeStmt, ReturnStmt, TemplateDeclStmt,
            VarDeclStmt, WhileStmt,
        },
        types::{FunctionType, TemplateType, Type},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{analyzer::Analyzer, symbol_table::ScopeKind};

/// The first `return` in source order, not looking into nested declarations.
fn first_return(block: &BlockStmt) -> Option<&ReturnStmt> {
    block.iter().find_map(|stmt| match stmt {
        Stmt::Return(stmt) => Some(stmt),
        Stmt::Block(block) => first_return(block),
        Stmt::If(stmt) => first_return(&stmt.then_block)
            .or_else(|| stmt.else_block.as_ref().and_then(first_return)),
        Stmt::While(stmt) => first_return(&stmt.body),
        Stmt::Range(stmt) => first_return(&stmt.body),
        Stmt::Each(stmt) => first_return(&stmt.body),
        _ => None,
    })
}

impl Analyzer {
    pub fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        let enclosing = std::mem::replace(&mut self.position, stmt.position().clone());

        if !self.symbols.is_reachable() {
            return Err(self.error(ErrorImpl::UnreachableCode));
        }

        match stmt {
            Stmt::VarDecl(stmt) => self.analyze_var_decl(stmt)?,
            Stmt::Expression(stmt) => {
                self.analyze_expr(&stmt.expression)?;
            }
            Stmt::Block(block) => self.analyze_block(block, Some(ScopeKind::Block))?,
            Stmt::If(stmt) => self.analyze_if(stmt)?,
            Stmt::While(stmt) => self.analyze_while(stmt)?,
            Stmt::Range(stmt) => self.analyze_range(stmt)?,
            Stmt::Each(stmt) => self.analyze_each(stmt)?,
            Stmt::Halt(_) => {
                if !self.symbols.is_loop_scope() {
                    return Err(self.error(ErrorImpl::HaltOutsideLoop));
                }
                self.symbols.set_unreachable();
            }
            Stmt::Skip(_) => {
                if !self.symbols.is_loop_scope() {
                    return Err(self.error(ErrorImpl::SkipOutsideLoop));
                }
                self.symbols.set_unreachable();
            }
            Stmt::Return(stmt) => self.analyze_return(stmt)?,
            Stmt::FnDecl(stmt) => self.analyze_fn_decl(stmt)?,
            Stmt::Echo(stmt) => {
                self.analyze_expr(&stmt.expression)?;
            }
            Stmt::TemplateDecl(stmt) => self.analyze_template_decl(stmt)?,
        }

        self.position = enclosing;
        Ok(())
    }

    /// Analyzes a block's statements, in a fresh scope of `kind` when given.
    pub fn analyze_block(&mut self, block: &BlockStmt, kind: Option<ScopeKind>) -> Result<(), Error> {
        let scoped = kind.is_some();
        if let Some(kind) = kind {
            self.symbols.enter_scope(kind);
        }

        for stmt in block.iter() {
            self.analyze_stmt(stmt)?;
        }

        if scoped {
            self.symbols.exit_scope(&self.position)?;
        }

        Ok(())
    }

    /// Analyzes a branch in its own scope and reports whether it falls through.
    fn analyze_branch(&mut self, block: &BlockStmt) -> Result<bool, Error> {
        self.symbols.enter_scope(ScopeKind::Branch);
        for stmt in block.iter() {
            self.analyze_stmt(stmt)?;
        }
        let scope = self.symbols.exit_scope(&self.position)?;

        Ok(scope.reachable)
    }

    fn analyze_var_decl(&mut self, stmt: &VarDeclStmt) -> Result<(), Error> {
        let initializer = self.analyze_expr(&stmt.initializer)?;

        if let Some(depth) = self.symbols.lookup_scope(&stmt.name, true) {
            let name = stmt.name.clone();
            return Err(if depth == self.symbols.depth() {
                self.error(ErrorImpl::VariableRedeclared { name })
            } else {
                self.error(ErrorImpl::VariableShadowed { name })
            });
        }

        let declared = if stmt.declared_type.is_infer() {
            initializer.clone()
        } else {
            self.validate_type(&stmt.declared_type)?;
            self.resolve_type(stmt.declared_type.clone())?
        };

        if declared != initializer {
            return Err(self.error(ErrorImpl::VariableTypeMismatch {
                name: stmt.name.clone(),
                declared: declared.to_string(),
                actual: initializer.to_string(),
            }));
        }

        self.check_hashable(&declared)?;

        debug!(name = %stmt.name, ty = %declared, "variable declared");
        self.symbols.define(&stmt.name, declared.clone(), &self.position)?;
        self.analysis.variables.insert(stmt.id, declared);

        Ok(())
    }

    fn analyze_if(&mut self, stmt: &IfStmt) -> Result<(), Error> {
        let condition = self.analyze_expr(&stmt.condition)?;
        if condition != Type::bool() {
            return Err(self.error(ErrorImpl::NonBooleanCondition {
                statement: String::from("if"),
                received: condition.to_string(),
            }));
        }

        if matches!(stmt.condition, Expr::Boolean(false)) && !stmt.then_block.is_empty() {
            return Err(self.error(ErrorImpl::UnreachableIf));
        }

        let then_reachable = self.analyze_branch(&stmt.then_block)?;
        if matches!(stmt.condition, Expr::Boolean(true)) && stmt.else_block.is_some() {
            return Err(self.error(ErrorImpl::UnreachableElse));
        }

        let else_reachable = match &stmt.else_block {
            Some(block) => self.analyze_branch(block)?,
            None => true,
        };

        if !then_reachable && !else_reachable {
            self.symbols.set_unreachable();
        }

        Ok(())
    }

    fn analyze_while(&mut self, stmt: &WhileStmt) -> Result<(), Error> {
        let condition = self.analyze_expr(&stmt.condition)?;
        if condition != Type::bool() {
            return Err(self.error(ErrorImpl::NonBooleanCondition {
                statement: String::from("while"),
                received: condition.to_string(),
            }));
        }

        self.analyze_block(&stmt.body, Some(ScopeKind::Loop))
    }

    fn analyze_range(&mut self, stmt: &RangeStmt) -> Result<(), Error> {
        for bound in [&stmt.start, &stmt.end, &stmt.step] {
            if self.analyze_expr(bound)? != Type::int() {
                return Err(self.error(ErrorImpl::NonIntegerRange));
            }
        }

        self.symbols.enter_scope(ScopeKind::Loop);
        self.symbols.define(&stmt.variable, Type::int(), &self.position)?;
        self.analyze_block(&stmt.body, None)?;
        self.symbols.exit_scope(&self.position)?;

        Ok(())
    }

    fn analyze_each(&mut self, stmt: &EachStmt) -> Result<(), Error> {
        let element = match self.analyze_expr(&stmt.iterable)? {
            Type::Array(element) => *element,
            other => {
                return Err(self.error(ErrorImpl::NonArrayIterable {
                    received: other.to_string(),
                }))
            }
        };

        self.symbols.enter_scope(ScopeKind::Loop);
        self.symbols.define(&stmt.variable, element, &self.position)?;
        self.analyze_block(&stmt.body, None)?;
        self.symbols.exit_scope(&self.position)?;

        Ok(())
    }

    fn analyze_return(&mut self, stmt: &ReturnStmt) -> Result<(), Error> {
        let expected = match self.symbols.current_function_type() {
            Some(function) => function.return_type.as_ref().clone(),
            None => return Err(self.error(ErrorImpl::ReturnOutsideFunction)),
        };

        let actual = match &stmt.expression {
            Some(expression) => self.analyze_expr(expression)?,
            None => Type::void(),
        };

        if expected.is_infer() {
            debug!(ty = %actual, "return type inferred");
            if let Some(function) = self.symbols.current_function_type_mut() {
                function.return_type = Box::new(actual);
            }
        } else if expected != actual {
            return Err(self.error(ErrorImpl::ReturnTypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            }));
        }

        self.symbols.set_unreachable();
        Ok(())
    }

    /// Opens a function scope holding the parameters. Methods also see their
    /// template's attributes and sibling methods as locals, defined first.
    fn enter_function_scope(
        &mut self,
        function: &FunctionType,
        template: Option<&TemplateType>,
    ) -> Result<(), Error> {
        self.symbols.enter_scope(ScopeKind::Function(function.clone()));

        if let Some(template) = template {
            for (attribute, ty) in &template.attributes {
                let ty = self.resolve_type(ty.clone())?;
                self.symbols.define(attribute, ty, &self.position)?;
            }
            for (method, ty) in &template.methods {
                self.symbols
                    .define(method, Type::Function(ty.clone()), &self.position)?;
            }
        }

        for (name, ty) in &function.params {
            let ty = self.resolve_type(ty.clone())?;
            self.symbols.define(name, ty, &self.position)?;
        }

        Ok(())
    }

    /// Resolves an `infer` return type before the body is analyzed.
    ///
    /// A body that never returns a value gets `void`. Otherwise the first
    /// `return` is typed in a scratch function scope that holds the
    /// parameters and the locals declared on the way to it. If that fails,
    /// for instance because the return calls the function itself, the type
    /// stays open and the first analyzed `return` fixes it.
    pub fn prepare_signature(
        &mut self,
        function: &FunctionType,
        body: &BlockStmt,
        template: Option<&TemplateType>,
    ) -> FunctionType {
        let mut function = function.clone();
        if !function.return_type.is_infer() {
            return function;
        }

        if !first_return(body).is_some_and(|stmt| stmt.expression.is_some()) {
            function.return_type = Box::new(Type::void());
            return function;
        }

        let symbols = self.symbols.clone();
        let analysis = self.analysis.clone();
        let position = self.position.clone();

        let inferred = self
            .enter_function_scope(&function, template)
            .and_then(|_| self.scan_return(body));

        self.symbols = symbols;
        self.analysis = analysis;
        self.position = position;

        match inferred {
            Ok(Some(ty)) if !ty.is_infer() => {
                debug!(ty = %ty, "return type inferred ahead of body");
                function.return_type = Box::new(ty);
            }
            Ok(_) => {}
            Err(error) => debug!(error = error.get_error_name(), "return type left open"),
        }

        function
    }

    /// Types the first `return` of a block, declaring locals met before it.
    fn scan_return(&mut self, block: &BlockStmt) -> Result<Option<Type>, Error> {
        for stmt in block.iter() {
            self.position = stmt.position().clone();

            let found = match stmt {
                Stmt::Return(stmt) => {
                    return match &stmt.expression {
                        Some(expression) => self.analyze_expr(expression).map(Some),
                        None => Ok(Some(Type::void())),
                    }
                }
                Stmt::VarDecl(stmt) => {
                    let declared = if stmt.declared_type.is_infer() {
                        self.analyze_expr(&stmt.initializer)
                    } else {
                        self.resolve_type(stmt.declared_type.clone())
                    };
                    if let Ok(ty) = declared {
                        self.symbols.define(&stmt.name, ty, &self.position).ok();
                    }
                    None
                }
                Stmt::FnDecl(stmt) => {
                    let function = self.prepare_signature(&stmt.function_type, &stmt.body, None);
                    self.symbols
                        .define(&stmt.name, Type::Function(function), &self.position)
                        .ok();
                    None
                }
                Stmt::Block(block) => self.scan_scoped(block, None)?,
                Stmt::If(stmt) => match self.scan_scoped(&stmt.then_block, None)? {
                    Some(ty) => Some(ty),
                    None => match &stmt.else_block {
                        Some(block) => self.scan_scoped(block, None)?,
                        None => None,
                    },
                },
                Stmt::While(stmt) => self.scan_scoped(&stmt.body, None)?,
                Stmt::Range(stmt) => {
                    self.scan_scoped(&stmt.body, Some((stmt.variable.as_str(), Type::int())))?
                }
                Stmt::Each(stmt) => {
                    let element = match self.analyze_expr(&stmt.iterable)? {
                        Type::Array(element) => *element,
                        other => {
                            return Err(self.error(ErrorImpl::NonArrayIterable {
                                received: other.to_string(),
                            }))
                        }
                    };
                    self.scan_scoped(&stmt.body, Some((stmt.variable.as_str(), element)))?
                }
                _ => None,
            };

            if found.is_some() {
                return Ok(found);
            }
        }

        Ok(None)
    }

    fn scan_scoped(
        &mut self,
        block: &BlockStmt,
        variable: Option<(&str, Type)>,
    ) -> Result<Option<Type>, Error> {
        self.symbols.enter_scope(ScopeKind::Block);
        if let Some((name, ty)) = variable {
            self.symbols.define(name, ty, &self.position)?;
        }
        let found = self.scan_return(block)?;
        self.symbols.exit_scope(&self.position)?;

        Ok(found)
    }

    /// Analyzes a function body in its own function scope and returns the
    /// signature with any inferred return type filled in.
    pub fn analyze_function_body(
        &mut self,
        function: FunctionType,
        body: &BlockStmt,
        template: Option<&TemplateType>,
    ) -> Result<FunctionType, Error> {
        self.enter_function_scope(&function, template)?;
        self.analyze_block(body, None)?;

        let scope = self.symbols.exit_scope(&self.position)?;
        let mut resolved = match scope.kind {
            ScopeKind::Function(resolved) => resolved,
            _ => function,
        };
        if resolved.return_type.is_infer() {
            resolved.return_type = Box::new(Type::void());
        }

        Ok(resolved)
    }

    fn analyze_fn_decl(&mut self, stmt: &FnDeclStmt) -> Result<(), Error> {
        if self.symbols.is_defined_in_current(&stmt.name) {
            return Err(self.error(ErrorImpl::FunctionRedeclared {
                name: stmt.name.clone(),
            }));
        }

        self.validate_signature(&stmt.function_type)?;
        self.check_hashable(&Type::Function(stmt.function_type.clone()))?;

        self.symbols.define(
            &stmt.name,
            Type::Function(stmt.function_type.clone()),
            &self.position,
        )?;
        let function = self.prepare_signature(&stmt.function_type, &stmt.body, None);
        debug!(name = %stmt.name, ty = %function, "function declared");
        self.symbols
            .update(&stmt.name, Type::Function(function.clone()));

        let resolved = self.analyze_function_body(function.clone(), &stmt.body, None)?;
        if resolved != function {
            self.symbols
                .update(&stmt.name, Type::Function(resolved.clone()));
        }
        self.analysis.functions.insert(stmt.id, resolved);

        Ok(())
    }

    fn analyze_template_decl(&mut self, stmt: &TemplateDeclStmt) -> Result<(), Error> {
        if self.symbols.lookup(&stmt.name, false).is_some() {
            return Err(self.error(ErrorImpl::TemplateRedeclared {
                name: stmt.name.clone(),
            }));
        }

        let mut template = TemplateType {
            name: stmt.name.clone(),
            attributes: stmt.attributes.clone(),
            methods: stmt
                .methods
                .iter()
                .map(|method| (method.name.clone(), method.function_type.clone()))
                .collect(),
        };

        debug!(name = %stmt.name, "template declared");
        self.symbols
            .define(&stmt.name, Type::Template(template.clone()), &self.position)?;

        for (_, ty) in &stmt.attributes {
            self.validate_type(ty)?;
            self.check_hashable(ty)?;
        }

        for (index, method) in stmt.methods.iter().enumerate() {
            self.validate_signature(&method.function_type)?;

            let prepared =
                self.prepare_signature(&method.function_type, &method.body, Some(&template));
            template.methods[index].1 = prepared;
            self.symbols
                .update(&stmt.name, Type::Template(template.clone()));
        }

        for (index, method) in stmt.methods.iter().enumerate() {
            let signature = template.methods[index].1.clone();
            let resolved = self.analyze_function_body(signature, &method.body, Some(&template))?;

            template.methods[index].1 = resolved.clone();
            self.symbols
                .update(&stmt.name, Type::Template(template.clone()));
            self.analysis.functions.insert(method.id, resolved);
        }

        Ok(())
    }
}
