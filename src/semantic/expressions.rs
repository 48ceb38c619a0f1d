use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayLiteral, AssignmentExpr, BinaryExpr, CallExpr, EntityLiteral,
            FunctionLiteral, IndexExpr, MapLiteral, MemberExpr, MethodCallExpr, Number, SetLiteral,
            UnaryExpr, UnaryOp,
        },
        types::{FunctionType, Type},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::analyzer::Analyzer;

impl Analyzer {
    /// Computes the type of an expression.
    ///
    /// A bare template name in the result is swapped for the template
    /// itself, so callers always see attributes and methods.
    pub fn analyze_expr(&mut self, expr: &Expr) -> Result<Type, Error> {
        let ty = match expr {
            Expr::Numeric(Number::Int(_)) => Type::int(),
            Expr::Numeric(Number::Float(_)) => Type::float(),
            Expr::String(_) => Type::str(),
            Expr::Boolean(_) => Type::bool(),
            Expr::Null => Type::null(),
            Expr::Array(array) => self.analyze_array(array)?,
            Expr::Set(set) => self.analyze_set(set)?,
            Expr::Map(map) => self.analyze_map(map)?,
            Expr::Entity(entity) => self.analyze_entity(entity)?,
            Expr::Function(function) => self.analyze_function_literal(function)?,
            Expr::Identifier(name) => match self.symbols.lookup(name, true) {
                Some(ty) => ty.clone(),
                None => {
                    return Err(self.error(ErrorImpl::VariableNotDeclared { name: name.clone() }))
                }
            },
            Expr::Unary(unary) => self.analyze_unary(unary)?,
            Expr::Binary(binary) => self.analyze_binary(binary)?,
            Expr::Assignment(assignment) => self.analyze_assignment(assignment)?,
            Expr::Index(index) => self.analyze_index(index)?,
            Expr::Call(call) => self.analyze_call(call)?,
            Expr::Member(member) => self.analyze_member(member)?,
            Expr::MethodCall(call) => self.analyze_method_call(call)?,
        };

        self.resolve_type(ty)
    }

    /// Checks that every element type equals the first and returns it.
    /// An empty literal has element type `void`.
    fn uniform_type(&mut self, elements: &[Expr], collection: &str) -> Result<Type, Error> {
        let Some((first, rest)) = elements.split_first() else {
            return Ok(Type::void());
        };

        let expected = self.analyze_expr(first)?;
        for element in rest {
            let received = self.analyze_expr(element)?;
            if received != expected {
                return Err(self.error(ErrorImpl::InvalidElementType {
                    collection: collection.to_string(),
                    expected: expected.to_string(),
                    received: received.to_string(),
                }));
            }
        }

        Ok(expected)
    }

    fn analyze_array(&mut self, array: &ArrayLiteral) -> Result<Type, Error> {
        let element = self.uniform_type(&array.elements, "array")?;
        Ok(Type::array(element))
    }

    fn analyze_set(&mut self, set: &SetLiteral) -> Result<Type, Error> {
        let element = self.uniform_type(&set.elements, "set")?;
        if !set.elements.is_empty() && !element.is_hashable() {
            return Err(self.error(ErrorImpl::UnhashableElement {
                received: element.to_string(),
            }));
        }

        Ok(Type::set(element))
    }

    fn analyze_map(&mut self, map: &MapLiteral) -> Result<Type, Error> {
        let Some(((first_key, first_value), rest)) = map.pairs.split_first() else {
            return Ok(Type::map(Type::void(), Type::void()));
        };

        let key = self.analyze_expr(first_key)?;
        let value = self.analyze_expr(first_value)?;
        if !key.is_hashable() {
            return Err(self.error(ErrorImpl::UnhashableKey {
                received: key.to_string(),
            }));
        }

        for (next_key, next_value) in rest {
            let received = self.analyze_expr(next_key)?;
            if received != key {
                return Err(self.error(ErrorImpl::InvalidKeyType {
                    expected: key.to_string(),
                    received: received.to_string(),
                }));
            }

            let received = self.analyze_expr(next_value)?;
            if received != value {
                return Err(self.error(ErrorImpl::InvalidValueType {
                    expected: value.to_string(),
                    received: received.to_string(),
                }));
            }
        }

        Ok(Type::map(key, value))
    }

    /// Attributes left out of an entity literal are allowed.
    fn analyze_entity(&mut self, entity: &EntityLiteral) -> Result<Type, Error> {
        let template = match self.symbols.lookup(&entity.template, false) {
            Some(Type::Template(template)) => template.clone(),
            Some(_) => {
                return Err(self.error(ErrorImpl::NotATemplate {
                    name: entity.template.clone(),
                }))
            }
            None => {
                return Err(self.error(ErrorImpl::TemplateNotFound {
                    name: entity.template.clone(),
                }))
            }
        };

        for (attribute, value) in &entity.attributes {
            let declared = match template.attribute(attribute) {
                Some(declared) => declared.clone(),
                None => {
                    return Err(self.error(ErrorImpl::AttributeNotDefined {
                        attribute: attribute.clone(),
                        template: template.name.clone(),
                    }))
                }
            };

            let actual = self.analyze_expr(value)?;
            if actual != declared {
                return Err(self.error(ErrorImpl::AttributeTypeMismatch {
                    attribute: attribute.clone(),
                    declared: declared.to_string(),
                    actual: actual.to_string(),
                }));
            }
        }

        Ok(Type::Template(template))
    }

    fn analyze_function_literal(&mut self, function: &FunctionLiteral) -> Result<Type, Error> {
        let signature = FunctionType::new(Type::infer(), function.params.clone());
        self.validate_signature(&signature)?;

        let signature = self.prepare_signature(&signature, &function.body, None);
        let resolved = self.analyze_function_body(signature, &function.body, None)?;

        Ok(Type::Function(resolved))
    }

    fn analyze_unary(&mut self, unary: &UnaryExpr) -> Result<Type, Error> {
        let operator = unary.operator.to_string();

        if matches!(unary.operator, UnaryOp::Increment | UnaryOp::Decrement)
            && !unary.operand.is_assignable()
        {
            return Err(self.error(ErrorImpl::InvalidIncrementTarget { operator }));
        }

        let operand = self.analyze_expr(&unary.operand)?;
        let valid = match unary.operator {
            UnaryOp::Not => operand == Type::bool(),
            UnaryOp::Negate | UnaryOp::Increment | UnaryOp::Decrement => operand.is_numeric(),
        };

        if !valid {
            return Err(self.error(ErrorImpl::InvalidOperand {
                operator,
                operand: operand.to_string(),
            }));
        }

        Ok(operand)
    }

    fn analyze_binary(&mut self, binary: &BinaryExpr) -> Result<Type, Error> {
        let left = self.analyze_expr(&binary.left)?;
        let right = self.analyze_expr(&binary.right)?;

        if left != right {
            return Err(self.error(ErrorImpl::BinaryTypeMismatch {
                left: left.to_string(),
                right: right.to_string(),
            }));
        }

        let invalid = || ErrorImpl::InvalidOperand {
            operator: binary.operator.to_string(),
            operand: left.to_string(),
        };

        match binary.operator {
            op if op.is_arithmetic() => {
                if left.is_numeric() || left == Type::str() {
                    Ok(left.clone())
                } else {
                    Err(self.error(invalid()))
                }
            }
            op if op.is_comparison() => Ok(Type::bool()),
            _ => {
                if left == Type::bool() {
                    Ok(Type::bool())
                } else {
                    Err(self.error(invalid()))
                }
            }
        }
    }

    fn analyze_assignment(&mut self, assignment: &AssignmentExpr) -> Result<Type, Error> {
        let target = self.analyze_expr(&assignment.target)?;
        let value = self.analyze_expr(&assignment.value)?;

        if target != value {
            return Err(self.error(ErrorImpl::AssignmentTypeMismatch {
                target: target.to_string(),
                value: value.to_string(),
            }));
        }

        Ok(target)
    }

    fn analyze_index(&mut self, index: &IndexExpr) -> Result<Type, Error> {
        let base = self.analyze_expr(&index.base)?;
        let position = self.analyze_expr(&index.index)?;

        if position != Type::int() {
            return Err(self.error(ErrorImpl::NonIntegerIndex {
                received: position.to_string(),
            }));
        }

        match base {
            Type::Array(element) => Ok(*element),
            other => Err(self.error(ErrorImpl::IndexingNonArray {
                received: other.to_string(),
            })),
        }
    }

    fn check_arguments(&mut self, function: &FunctionType, arguments: &[Expr]) -> Result<(), Error> {
        for ((_, expected), argument) in function.params.iter().zip(arguments) {
            let received = self.analyze_expr(argument)?;
            if received != *expected {
                return Err(self.error(ErrorImpl::ArgumentTypeMismatch {
                    expected: expected.to_string(),
                    received: received.to_string(),
                }));
            }
        }

        Ok(())
    }

    /// Named callees are looked up through every enclosing scope, so
    /// functions declared outside a body stay callable from it.
    fn analyze_call(&mut self, call: &CallExpr) -> Result<Type, Error> {
        let function = if let Expr::Identifier(name) = call.callee.as_ref() {
            let function = match self.symbols.lookup(name, false) {
                Some(Type::Function(function)) => function.clone(),
                Some(_) => return Err(self.error(ErrorImpl::NotAFunction { name: name.clone() })),
                None => {
                    return Err(self.error(ErrorImpl::FunctionNotDeclared { name: name.clone() }))
                }
            };

            if function.params.len() != call.arguments.len() {
                return Err(self.error(ErrorImpl::FunctionArity {
                    name: name.clone(),
                    expected: function.params.len(),
                    received: call.arguments.len(),
                }));
            }

            if function.return_type.is_infer() {
                return Err(self.error(ErrorImpl::ReturnTypeNotInferred { name: name.clone() }));
            }

            function
        } else {
            let function = match self.analyze_expr(&call.callee)? {
                Type::Function(function) => function,
                other => {
                    return Err(self.error(ErrorImpl::CalleeNotFunction {
                        received: other.to_string(),
                    }))
                }
            };

            if function.params.len() != call.arguments.len() {
                return Err(self.error(ErrorImpl::CalleeArity {
                    expected: function.params.len(),
                    received: call.arguments.len(),
                }));
            }

            function
        };

        self.check_arguments(&function, &call.arguments)?;

        Ok(*function.return_type)
    }

    fn analyze_member(&mut self, member: &MemberExpr) -> Result<Type, Error> {
        let object = self.analyze_expr(&member.object)?;

        if !object.has_members() {
            return Err(self.error(ErrorImpl::NoMembers {
                received: object.to_string(),
            }));
        }

        match object.member(&member.member) {
            Some(ty) => Ok(ty),
            None => Err(self.error(ErrorImpl::MemberNotDefined {
                member: member.member.clone(),
                received: object.to_string(),
            })),
        }
    }

    fn analyze_method_call(&mut self, call: &MethodCallExpr) -> Result<Type, Error> {
        let object = self.analyze_expr(&call.object)?;

        if !object.has_members() {
            return Err(self.error(ErrorImpl::NoMethods {
                received: object.to_string(),
            }));
        }

        let method = match object.method(&call.method) {
            Some(method) => method,
            None => {
                return Err(self.error(ErrorImpl::MethodNotDefined {
                    method: call.method.clone(),
                    received: object.to_string(),
                }))
            }
        };

        if method.params.len() != call.arguments.len() {
            return Err(self.error(ErrorImpl::MethodArity {
                method: call.method.clone(),
                expected: method.params.len(),
                received: call.arguments.len(),
            }));
        }

        if method.return_type.is_infer() {
            return Err(self.error(ErrorImpl::ReturnTypeNotInferred {
                name: call.method.clone(),
            }));
        }

        self.check_arguments(&method, &call.arguments)?;

        Ok(*method.return_type)
    }
}
