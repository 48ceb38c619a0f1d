//! Unit tests for the parser module.
//!
//! This module contains tests for parsing language constructs including:
//! - Variable, entity, function and template declarations
//! - Operator precedence and associativity
//! - Postfix chains and pipes
//! - The type grammar
//! - Control flow statements
//! - Syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Expr, Program, Stmt},
        expressions::{BinaryOp, Fixity, Number, UnaryOp},
        types::{FunctionType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.crs".to_string()))?;
    let (_, result) = parse(tokens, Rc::new("test.crs".to_string()));
    result
}

fn first_stmt(source: &str) -> Stmt {
    parse_source(source).unwrap().body.remove(0)
}

/// The expression of a single expression statement.
fn expr(source: &str) -> Expr {
    match first_stmt(source) {
        Stmt::Expression(stmt) => stmt.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

fn initializer(source: &str) -> Expr {
    match first_stmt(source) {
        Stmt::VarDecl(decl) => decl.initializer,
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

fn declared_type(source: &str) -> Type {
    match first_stmt(source) {
        Stmt::VarDecl(decl) => decl.declared_type,
        other => panic!("expected variable declaration, got {:?}", other),
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(crate::ast::expressions::BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

fn id(name: &str) -> Expr {
    Expr::identifier(name)
}

#[test]
fn test_parse_variable_declaration() {
    match first_stmt("int x = 42;") {
        Stmt::VarDecl(decl) => {
            assert_eq!(decl.name, "x");
            assert_eq!(decl.declared_type, Type::int());
            assert_eq!(decl.initializer, Expr::int(42));
            assert_eq!(decl.position.line, 1);
            assert_eq!(decl.position.column, 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_parse_literals() {
    assert_eq!(expr("3.5;"), Expr::Numeric(Number::Float(3.5)));
    assert_eq!(expr("'hi';"), Expr::String("hi".to_string()));
    assert_eq!(expr("true;"), Expr::Boolean(true));
    assert_eq!(expr("false;"), Expr::Boolean(false));
    assert_eq!(expr("null;"), Expr::Null);
}

#[test]
fn test_declaration_ids_are_unique() {
    let program = parse_source("int a = 1; int b = 2; func f -> void = [] >> {}").unwrap();
    let ids: Vec<i32> = program
        .body
        .iter()
        .map(|stmt| match stmt {
            Stmt::VarDecl(decl) => decl.id,
            Stmt::FnDecl(decl) => decl.id,
            _ => unreachable!(),
        })
        .collect();

    assert_eq!(ids, vec![1024, 1025, 1026]);
}

#[test]
fn test_precedence() {
    // 1 + 2 * 3 == 7 || false && x
    let parsed = expr("1 + 2 * 3 == 7 || false && x;");
    let expected = binary(
        binary(
            binary(
                Expr::int(1),
                BinaryOp::Add,
                binary(Expr::int(2), BinaryOp::Multiply, Expr::int(3)),
            ),
            BinaryOp::Equal,
            Expr::int(7),
        ),
        BinaryOp::Or,
        binary(Expr::Boolean(false), BinaryOp::And, id("x")),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn test_relational_binds_tighter_than_equality() {
    let parsed = expr("a < b == c > d;");
    let expected = binary(
        binary(id("a"), BinaryOp::Less, id("b")),
        BinaryOp::Equal,
        binary(id("c"), BinaryOp::Greater, id("d")),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn test_binary_is_left_associative() {
    let parsed = expr("a - b - c;");
    let expected = binary(
        binary(id("a"), BinaryOp::Subtract, id("b")),
        BinaryOp::Subtract,
        id("c"),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn test_grouping() {
    let parsed = expr("(a + b) * c;");
    let expected = binary(
        binary(id("a"), BinaryOp::Add, id("b")),
        BinaryOp::Multiply,
        id("c"),
    );
    assert_eq!(parsed, expected);
}

#[test]
fn test_assignment_is_right_associative() {
    match expr("a = b = 1;") {
        Expr::Assignment(outer) => {
            assert_eq!(*outer.target, id("a"));
            match *outer.value {
                Expr::Assignment(inner) => {
                    assert_eq!(*inner.target, id("b"));
                    assert_eq!(*inner.value, Expr::int(1));
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_compound_assignment_desugars() {
    match expr("x += 2;") {
        Expr::Assignment(assignment) => {
            assert_eq!(*assignment.target, id("x"));
            assert_eq!(
                *assignment.value,
                binary(id("x"), BinaryOp::Add, Expr::int(2))
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_invalid_assignment_target() {
    let error = parse_source("1 = x;").unwrap_err();
    assert_eq!(error.get_internal_error(), &ErrorImpl::InvalidAssignmentTarget);
    assert_eq!(
        error.get_internal_error().to_string(),
        "Invalid left-hand side in assignment"
    );

    assert!(parse_source("f() = 1;").is_err());
    assert!(parse_source("a[0] = 1;").is_ok());
    assert!(parse_source("p.x = 1;").is_ok());
}

#[test]
fn test_unary_operators() {
    match expr("!done;") {
        Expr::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOp::Not);
            assert_eq!(unary.fixity, Fixity::Prefix);
        }
        other => panic!("unexpected {:?}", other),
    }

    match expr("i++;") {
        Expr::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOp::Increment);
            assert_eq!(unary.fixity, Fixity::Postfix);
            assert_eq!(*unary.operand, id("i"));
        }
        other => panic!("unexpected {:?}", other),
    }

    match expr("--i;") {
        Expr::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOp::Decrement);
            assert_eq!(unary.fixity, Fixity::Prefix);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unary_minus_binds_tighter_than_binary() {
    let parsed = expr("-a + b;");
    match parsed {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator, BinaryOp::Add);
            assert!(matches!(*binary.left, Expr::Unary(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_postfix_chain() {
    // a.b(1).c[2]
    let parsed = expr("a.b(1).c[2];");
    match parsed {
        Expr::Index(index) => {
            assert_eq!(*index.index, Expr::int(2));
            match *index.base {
                Expr::Member(member) => {
                    assert_eq!(member.member, "c");
                    match *member.object {
                        Expr::MethodCall(call) => {
                            assert_eq!(*call.object, id("a"));
                            assert_eq!(call.method, "b");
                            assert_eq!(call.arguments, vec![Expr::int(1)]);
                        }
                        other => panic!("unexpected {:?}", other),
                    }
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_call_arguments() {
    assert_eq!(
        expr("add(1, x + 2);"),
        Expr::call(
            id("add"),
            vec![Expr::int(1), binary(id("x"), BinaryOp::Add, Expr::int(2))]
        )
    );
    assert_eq!(expr("f();"), Expr::call(id("f"), vec![]));
    assert_eq!(
        expr("f(1)(2);"),
        Expr::call(Expr::call(id("f"), vec![Expr::int(1)]), vec![Expr::int(2)])
    );
}

#[test]
fn test_pipe_matches_explicit_call() {
    let piped = expr("[[1, 2, 3]] >> f(x) >> g;");
    let explicit = expr("g(f([1, 2, 3], x));");
    assert_eq!(piped, explicit);
}

#[test]
fn test_pipe_spreads_first_stage_arguments() {
    assert_eq!(expr("[1, 2] >> add;"), expr("add(1, 2);"));
    assert_eq!(expr("[] >> now;"), expr("now();"));
}

#[test]
fn test_array_without_pipe() {
    match expr("[1, 2, 3];") {
        Expr::Array(array) => assert_eq!(array.elements.len(), 3),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_set_and_map_literals() {
    match initializer("infer s = {1, 2};") {
        Expr::Set(set) => assert_eq!(set.elements, vec![Expr::int(1), Expr::int(2)]),
        other => panic!("unexpected {:?}", other),
    }

    match initializer("infer m = {'a': 1, 'b': 2};") {
        Expr::Map(map) => {
            assert_eq!(map.pairs.len(), 2);
            assert_eq!(map.pairs[0].0, Expr::String("a".to_string()));
            assert_eq!(map.pairs[1].1, Expr::int(2));
        }
        other => panic!("unexpected {:?}", other),
    }

    match initializer("infer e = {};") {
        Expr::Set(set) => assert!(set.elements.is_empty()),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_map_with_set_keys() {
    let source = "str{int{}}[][] x = [[{{1, 2, 3}: 'hello', {4, 5, 6}: 'world'}]];";
    match first_stmt(source) {
        Stmt::VarDecl(decl) => {
            assert_eq!(
                decl.declared_type,
                Type::array(Type::array(Type::map(Type::set(Type::int()), Type::str())))
            );
            assert!(matches!(decl.initializer, Expr::Array(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_type_grammar() {
    assert_eq!(declared_type("int[] a = x;"), Type::array(Type::int()));
    assert_eq!(declared_type("float{} s = x;"), Type::set(Type::float()));
    assert_eq!(
        declared_type("int{str} m = x;"),
        Type::map(Type::str(), Type::int())
    );
    assert_eq!(
        declared_type("bool{}[] a = x;"),
        Type::array(Type::set(Type::bool()))
    );
    assert_eq!(declared_type("infer i = x;"), Type::infer());
    assert_eq!(
        declared_type("func<int, [int a, str b]> f = x;"),
        Type::function(
            Type::int(),
            vec![("a".to_string(), Type::int()), ("b".to_string(), Type::str())]
        )
    );
    assert_eq!(
        declared_type("func<void, []>[] fs = x;"),
        Type::array(Type::function(Type::void(), vec![]))
    );
}

#[test]
fn test_template_typed_declarations() {
    assert_eq!(
        declared_type("Point p = q;"),
        Type::TypeName("Point".to_string())
    );
    assert_eq!(
        declared_type("Point[] ps = qs;"),
        Type::array(Type::TypeName("Point".to_string()))
    );
    assert_eq!(
        declared_type("Point{str} named = m;"),
        Type::map(Type::str(), Type::TypeName("Point".to_string()))
    );
}

#[test]
fn test_void_is_only_a_return_type() {
    assert!(parse_source("void x = 1;").is_err());
    assert!(parse_source("func f -> void = [] >> {}").is_ok());
}

#[test]
fn test_function_declaration() {
    let source = "func add -> int = [int a, int b] >> { return a + b; }";
    match first_stmt(source) {
        Stmt::FnDecl(decl) => {
            assert_eq!(decl.name, "add");
            assert_eq!(
                decl.function_type,
                FunctionType::new(
                    Type::int(),
                    vec![("a".to_string(), Type::int()), ("b".to_string(), Type::int())]
                )
            );
            assert_eq!(decl.function_type.params[0].0, "a");
            assert_eq!(decl.body.body.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_function_typed_parameter() {
    let source = "func reduce -> int = [int[] arr, func<int, [int a, int b]> fn] >> { return 0; }";
    match first_stmt(source) {
        Stmt::FnDecl(decl) => {
            assert_eq!(decl.function_type.params.len(), 2);
            assert!(matches!(decl.function_type.params[1].1, Type::Function(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_function_literal() {
    match first_stmt("infer f = func [int a] >> { return a; };") {
        Stmt::VarDecl(decl) => match decl.initializer {
            Expr::Function(literal) => {
                assert_eq!(literal.params, vec![("a".to_string(), Type::int())]);
                assert_eq!(literal.body.body.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_template_declaration() {
    let source = "
        template Person = {
            str name;
            int age;

            func greet -> void = [str greeting] >> {
                echo greeting;
            }
        };
    ";
    match first_stmt(source) {
        Stmt::TemplateDecl(template) => {
            assert_eq!(template.name, "Person");
            assert_eq!(
                template.attributes,
                vec![("name".to_string(), Type::str()), ("age".to_string(), Type::int())]
            );
            assert_eq!(template.methods.len(), 1);
            assert_eq!(template.methods[0].name, "greet");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_duplicate_template_member() {
    let error = parse_source("template T = { int a; str a; };").unwrap_err();
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::DuplicateTemplateMember {
            template: "T".to_string(),
            member: "a".to_string()
        }
    );
}

#[test]
fn test_entity_declaration() {
    let source = "entity character = Person{ name: 'Alice', age: 25 };";
    match first_stmt(source) {
        Stmt::VarDecl(decl) => {
            assert_eq!(decl.name, "character");
            assert_eq!(decl.declared_type, Type::TypeName("Person".to_string()));
            match decl.initializer {
                Expr::Entity(entity) => {
                    assert_eq!(entity.template, "Person");
                    assert_eq!(entity.attributes[0].0, "name");
                    assert_eq!(entity.attributes[1].1, Expr::int(25));
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_entity_attributes_without_commas() {
    match first_stmt("entity p = Point{x: 1 y: 2};") {
        Stmt::VarDecl(decl) => match decl.initializer {
            Expr::Entity(entity) => assert_eq!(entity.attributes.len(), 2),
            other => panic!("unexpected {:?}", other),
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_if_else() {
    match first_stmt("if (x > 1) { echo 1; } else { echo 2; }") {
        Stmt::If(stmt) => {
            assert_eq!(stmt.condition, binary(id("x"), BinaryOp::Greater, Expr::int(1)));
            assert_eq!(stmt.then_block.body.len(), 1);
            assert!(stmt.else_block.is_some());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_condition_requires_parentheses() {
    assert!(parse_source("if x { echo 1; }").is_err());
    assert!(parse_source("while x { echo 1; }").is_err());
}

#[test]
fn test_range_default_step() {
    match first_stmt("range (i in 0 to 10) { echo i; }") {
        Stmt::Range(stmt) => {
            assert_eq!(stmt.variable, "i");
            assert_eq!(stmt.start, Expr::int(0));
            assert_eq!(stmt.end, Expr::int(10));
            assert_eq!(stmt.step, Expr::int(1));
        }
        other => panic!("unexpected {:?}", other),
    }

    match first_stmt("range (i in 0 to 10 by 2) { }") {
        Stmt::Range(stmt) => assert_eq!(stmt.step, Expr::int(2)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_each_loop() {
    match first_stmt("each (x in xs) { halt; skip; }") {
        Stmt::Each(stmt) => {
            assert_eq!(stmt.variable, "x");
            assert_eq!(stmt.iterable, id("xs"));
            assert!(matches!(stmt.body.body[0], Stmt::Halt(_)));
            assert!(matches!(stmt.body.body[1], Stmt::Skip(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_return_with_and_without_value() {
    let program = parse_source("return; return 1;").unwrap();
    assert!(matches!(&program.body[0], Stmt::Return(ret) if ret.expression.is_none()));
    assert!(matches!(&program.body[1], Stmt::Return(ret) if ret.expression.is_some()));
}

#[test]
fn test_nested_blocks() {
    match first_stmt("{ int x = 1; { echo x; } }") {
        Stmt::Block(block) => {
            assert_eq!(block.body.len(), 2);
            assert!(matches!(block.body[1], Stmt::Block(_)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_missing_semicolon() {
    let error = parse_source("int x = 1").unwrap_err();
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::ExpectedToken {
            expected: "Semicolon".to_string(),
            received: "EOF".to_string()
        }
    );
}

#[test]
fn test_unexpected_token() {
    let error = parse_source("int x = ;").unwrap_err();
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnexpectedToken {
            token: ";".to_string()
        }
    );
    assert_eq!(error.get_position().column, 9);
}

#[test]
fn test_unclosed_block() {
    assert!(parse_source("{ echo 1;").is_err());
}

#[test]
fn test_integer_overflow() {
    let error = parse_source("int x = 99999999999999999999;").unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::NumberParseError { .. }
    ));
}

#[test]
fn test_empty_program() {
    assert!(parse_source("").unwrap().body.is_empty());
}
