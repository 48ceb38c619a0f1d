//! Unit tests for the semantic analyzer.
//!
//! Programs go through the real lexer and parser, so each test reads as
//! Cirrus source followed by the diagnostic (or resolved types) expected.

use std::rc::Rc;

use super::{
    analyzer::{analyze, Analysis},
    symbol_table::{ScopeKind, SymbolTable},
};
use crate::{
    ast::types::{FunctionType, Type},
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Position,
};

fn check(source: &str) -> Result<Analysis, Error> {
    let tokens = tokenize(source.to_string(), Some("test.crs".to_string()))?;
    let (_, program) = parse(tokens, Rc::new("test.crs".to_string()));
    analyze(&program?)
}

fn ok(source: &str) -> Analysis {
    match check(source) {
        Ok(analysis) => analysis,
        Err(error) => panic!("expected {:?} to pass, got {:?}", source, error),
    }
}

fn err(source: &str) -> Error {
    match check(source) {
        Ok(_) => panic!("expected {:?} to fail", source),
        Err(error) => error,
    }
}

fn err_name(source: &str) -> String {
    err(source).get_error_name().to_string()
}

// DECLARATIONS

#[test]
fn test_well_typed_program() {
    ok(r#"
        int x = 5;
        float f = 2.5;
        str s = "a" + "b";
        bool b = x > 3 && true;
        int[] a = [1, 2, 3];
        int v = a[0];
        echo v;
    "#);
}

#[test]
fn test_binary_mismatch_points_at_statement() {
    let error = err("int x = 5;\nint y = x + \"a\";");

    assert_eq!(
        *error.get_internal_error(),
        ErrorImpl::BinaryTypeMismatch {
            left: "int".to_string(),
            right: "str".to_string(),
        }
    );
    assert_eq!(error.get_position().line, 2);
    assert_eq!(error.get_position().column, 1);
}

#[test]
fn test_declared_type_mismatch() {
    let error = err("int x = \"five\";");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Type mismatch for variable `x`: `int` != `str`"
    );
}

#[test]
fn test_redeclare_in_same_scope() {
    assert_eq!(err_name("int x = 1; int x = 2;"), "VariableRedeclared");
}

#[test]
fn test_shadowing_outer_scope() {
    assert_eq!(err_name("int x = 1; { int x = 2; }"), "VariableShadowed");
    assert_eq!(
        err_name("int x = 1; while (x < 3) { str x = \"a\"; }"),
        "VariableShadowed"
    );
}

#[test]
fn test_function_body_may_reuse_outer_names() {
    ok("int x = 1; func f -> int = [] >> { int x = 2; return x; }");
}

#[test]
fn test_function_body_cannot_read_outer_variables() {
    let error = err("int x = 1;\nfunc f -> int = [] >> {\n    return x;\n}");

    assert_eq!(
        *error.get_internal_error(),
        ErrorImpl::VariableNotDeclared {
            name: "x".to_string()
        }
    );
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.get_position().column, 5);
}

#[test]
fn test_undeclared_variable() {
    assert_eq!(err_name("echo y;"), "VariableNotDeclared");
}

#[test]
fn test_infer_variable_records_type() {
    let analysis = ok("infer x = 5; infer names = [\"a\", \"b\"];");

    assert_eq!(analysis.variable_type(1024), Some(&Type::int()));
    assert_eq!(analysis.variable_type(1025), Some(&Type::array(Type::str())));
}

#[test]
fn test_infer_variable_keeps_type_for_assignment() {
    let error = err("infer x = 5; x = \"a\";");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Type mismatch in assignment expression: `int` != `str`"
    );
}

#[test]
fn test_empty_array_satisfies_any_array_type() {
    ok("int[] a = []; str[][] b = [[], [\"x\"]];");
}

#[test]
fn test_undefined_type_name() {
    assert_eq!(err_name("Foo[] xs = [];"), "TypeNotDefined");
}

#[test]
fn test_type_name_that_is_not_a_template() {
    assert_eq!(err_name("int Foo = 1; Foo[] xs = [];"), "NotATemplate");
}

// FUNCTIONS

#[test]
fn test_function_call() {
    ok(r#"
        func add -> int = [int a, int b] >> {
            return a + b;
        }
        int r = add(1, 2);
    "#);
}

#[test]
fn test_recursive_function() {
    ok(r#"
        func fact -> int = [int n] >> {
            if (n < 2) {
                return 1;
            }
            return n * fact(n - 1);
        }
        echo fact(5);
    "#);
}

#[test]
fn test_recursive_infer_function() {
    let analysis = ok(r#"
        func fact -> infer = [int n] >> {
            if (n < 2) {
                return 1;
            }
            return n * fact(n - 1);
        }
        int r = fact(5);
    "#);

    assert_eq!(
        analysis.function_type(1024),
        Some(&FunctionType::new(Type::int(), vec![("n".to_string(), Type::int())]))
    );
}

#[test]
fn test_infer_return_type_known_before_self_call() {
    ok("func f -> infer = [int n] >> { int x = f(n); return 1; }");
}

#[test]
fn test_infer_return_type_sees_earlier_locals() {
    ok(r#"
        func total -> infer = [int[] xs] >> {
            int sum = 0;
            each (x in xs) {
                sum += x;
            }
            return sum;
        }
        int r = total([1, 2]);
    "#);
}

#[test]
fn test_recursive_first_return_is_not_inferred() {
    let error = err("func f -> infer = [int n] >> { return f(n); }");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Return type of `f` is not inferred yet"
    );
}

#[test]
fn test_function_arity_message() {
    let error = err("func add -> int = [int a, int b] >> { return a + b; }\nadd(1);");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Function `add` expects 2 arguments, got 1"
    );
}

#[test]
fn test_argument_type_mismatch() {
    let error = err("func neg -> int = [int a] >> { return -a; }\nneg(\"a\");");
    assert_eq!(
        *error.get_internal_error(),
        ErrorImpl::ArgumentTypeMismatch {
            expected: "int".to_string(),
            received: "str".to_string(),
        }
    );
}

#[test]
fn test_calling_undeclared_and_non_functions() {
    assert_eq!(err_name("missing(1);"), "FunctionNotDeclared");
    assert_eq!(err_name("int x = 1; x(1);"), "NotAFunction");
    assert_eq!(err_name("int[] a = [1]; a[0](1);"), "CalleeNotFunction");
}

#[test]
fn test_function_redeclared() {
    assert_eq!(
        err_name("func f -> void = [] >> {}\nfunc f -> void = [] >> {}"),
        "FunctionRedeclared"
    );
}

#[test]
fn test_return_type_mismatch() {
    let error = err("func f -> int = [] >> { return \"a\"; }");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Return type `str` does not match function return type `int`"
    );
}

#[test]
fn test_void_function_bare_return() {
    ok("func f -> void = [int a] >> { if (a > 1) { return; } echo a; }");
    assert_eq!(
        err_name("func f -> void = [] >> { return 1; }"),
        "ReturnTypeMismatch"
    );
}

#[test]
fn test_return_outside_function() {
    assert_eq!(err_name("return 1;"), "ReturnOutsideFunction");
}

#[test]
fn test_infer_return_type_from_first_return() {
    let analysis = ok("func f -> infer = [int a] >> { return a * 2; }\nint r = f(1);");

    assert_eq!(
        analysis.function_type(1024),
        Some(&FunctionType::new(Type::int(), vec![("a".to_string(), Type::int())]))
    );
}

#[test]
fn test_infer_return_type_without_return_is_void() {
    let analysis = ok("func f -> infer = [] >> { echo 1; }");
    assert_eq!(
        analysis.function_type(1024),
        Some(&FunctionType::new(Type::void(), vec![]))
    );
}

#[test]
fn test_infer_return_type_is_fixed_by_first_return() {
    assert_eq!(
        err_name("func f -> infer = [int a] >> { if (a > 0) { return 1; } return \"a\"; }"),
        "ReturnTypeMismatch"
    );
}

#[test]
fn test_function_values() {
    let analysis = ok(r#"
        func<int, [int a]> twice = func [int a] >> { return a * 2; };
        int r = twice(4);
        infer thrice = func [int a] >> { return a * 3; };
    "#);

    assert_eq!(
        analysis.variable_type(1026),
        Some(&Type::function(Type::int(), vec![("a".to_string(), Type::int())]))
    );
}

#[test]
fn test_pipe_calls_typecheck() {
    ok(r#"
        func total -> int = [int[] xs] >> {
            int sum = 0;
            each (x in xs) {
                sum += x;
            }
            return sum;
        }
        func scale -> int = [int n, int factor] >> {
            return n * factor;
        }
        int r = [[1, 2, 3]] >> total >> scale(10);
    "#);
}

// CONTROL FLOW

#[test]
fn test_unreachable_after_return() {
    let error = err("func f -> int = [] >> {\n    return 1;\n    echo 2;\n}");

    assert_eq!(*error.get_internal_error(), ErrorImpl::UnreachableCode);
    assert_eq!(error.get_position().line, 3);
}

#[test]
fn test_unreachable_after_both_branches_return() {
    assert_eq!(
        err_name(
            "func f -> int = [int a] >> { if (a > 0) { return 1; } else { return 2; } echo a; }"
        ),
        "UnreachableCode"
    );
    ok("func f -> int = [int a] >> { if (a > 0) { return 1; } echo a; return 2; }");
}

#[test]
fn test_unreachable_else_and_if() {
    assert_eq!(
        err_name("if (true) { echo 1; } else { echo 2; }"),
        "UnreachableElse"
    );
    assert_eq!(
        err_name("if (false) { echo 1; } else { echo 2; }"),
        "UnreachableIf"
    );
    ok("if (false) {} else { echo 2; }");
    ok("if (true) { echo 1; }");
}

#[test]
fn test_then_block_errors_come_before_unreachable_else() {
    assert_eq!(
        err_name("if (true) { echo y; } else { echo 2; }"),
        "VariableNotDeclared"
    );
}

#[test]
fn test_non_boolean_condition() {
    let error = err("if (1) { echo 1; }");
    assert_eq!(
        *error.get_internal_error(),
        ErrorImpl::NonBooleanCondition {
            statement: "if".to_string(),
            received: "int".to_string(),
        }
    );
    assert_eq!(err_name("while (\"a\") {}"), "NonBooleanCondition");
}

#[test]
fn test_halt_and_skip() {
    ok(r#"
        range (i in 0 to 10 by 2) {
            if (i == 4) {
                skip;
            }
            if (i == 8) {
                halt;
            }
            echo i;
        }
    "#);

    assert_eq!(err_name("halt;"), "HaltOutsideLoop");
    assert_eq!(err_name("{ skip; }"), "SkipOutsideLoop");
}

#[test]
fn test_halt_does_not_cross_function_boundary() {
    assert_eq!(
        err_name("while (true) { func f -> void = [] >> { halt; } }"),
        "HaltOutsideLoop"
    );
    assert_eq!(
        err_name("func f -> void = [] >> { if (true) { halt; } }"),
        "HaltOutsideLoop"
    );
    assert_eq!(
        err_name("while (true) { func f -> void = [] >> { if (true) { skip; } } }"),
        "SkipOutsideLoop"
    );
}

#[test]
fn test_unreachable_after_skip() {
    assert_eq!(
        err_name("while (true) { skip; echo 1; }"),
        "UnreachableCode"
    );
}

#[test]
fn test_unreachable_after_halt() {
    assert_eq!(
        err_name("while (true) { halt; echo 1; }"),
        "UnreachableCode"
    );
    ok("while (true) { halt; } echo 1;");
}

#[test]
fn test_range_and_each() {
    assert_eq!(err_name("range (i in 0 to 2.5) {}"), "NonIntegerRange");
    assert_eq!(err_name("each (c in \"abc\") {}"), "NonArrayIterable");
    assert_eq!(err_name("range (i in 0 to 3) {} echo i;"), "VariableNotDeclared");
    ok("str[] words = [\"a\", \"b\"]; each (w in words) { str upper = w + \"!\"; }");
}

// OPERATORS

#[test]
fn test_invalid_operands() {
    assert_eq!(err_name("bool b = !1;"), "InvalidOperand");
    assert_eq!(err_name("echo -\"a\";"), "InvalidOperand");
    assert_eq!(err_name("echo 1 && 2;"), "InvalidOperand");
    assert_eq!(err_name("echo true + false;"), "InvalidOperand");
}

#[test]
fn test_increment() {
    ok("int i = 0; i++; --i; float f = 1.5; f++;");
    assert_eq!(err_name("5++;"), "InvalidIncrementTarget");
    assert_eq!(err_name("str s = \"a\"; s++;"), "InvalidOperand");
}

#[test]
fn test_comparison_yields_bool() {
    ok("bool b = 1 < 2; bool c = \"a\" == \"b\";");
    assert_eq!(err_name("int b = 1 < 2;"), "VariableTypeMismatch");
}

#[test]
fn test_indexing() {
    assert_eq!(err_name("int[] a = [1]; echo a[\"0\"];"), "NonIntegerIndex");
    assert_eq!(err_name("int a = 1; echo a[0];"), "IndexingNonArray");
    ok("int[][] grid = [[1, 2], [3]]; grid[0][1] = 5;");
}

// COLLECTIONS

#[test]
fn test_collection_literals() {
    ok(r#"
        int{} s = {1, 2, 3};
        int{str} m = {"a": 1, "b": 2};
        int{}{} nested = {{1}, {2}};
        s.add(4);
        bool has = s.contains(1);
        int v = m.get("a");
        m.put("c", 3);
        int n = m.size();
    "#);
}

#[test]
fn test_mixed_element_types() {
    let error = err("echo [1, \"a\"];");
    assert_eq!(
        error.get_internal_error().to_string(),
        "Invalid element type in array literal: `int` != `str`"
    );
    assert_eq!(err_name("echo {\"a\": 1, 2: 2};"), "InvalidKeyType");
    assert_eq!(err_name("echo {\"a\": 1, \"b\": \"c\"};"), "InvalidValueType");
}

#[test]
fn test_unhashable_elements() {
    assert_eq!(err_name("echo {[1]};"), "UnhashableElement");
    assert_eq!(err_name("echo {[1]: 2};"), "UnhashableKey");
    assert_eq!(err_name("int[]{} s = {};"), "UnhashableElement");
}

#[test]
fn test_collection_methods() {
    assert_eq!(err_name("int{} s = {1}; s.add(1, 2);"), "MethodArity");
    assert_eq!(err_name("int{} s = {1}; s.push(1);"), "MethodNotDefined");
    assert_eq!(err_name("int{} s = {1}; s.add(\"a\");"), "ArgumentTypeMismatch");
    assert_eq!(err_name("int x = 1; x.size();"), "NoMethods");
    assert_eq!(err_name("int x = 1; echo x.y;"), "NoMembers");
}

// TEMPLATES

const POINT: &str = r#"
template Point = {
    int x;
    int y;
    func sum -> int = [] >> {
        return x + y;
    }
    func scaled -> infer = [int factor] >> {
        return Point{x: x * factor, y: y * factor};
    }
};
"#;

#[test]
fn test_template_and_entities() {
    let source = format!(
        "{}{}",
        POINT,
        r#"
        entity p = Point{x: 1, y: 2};
        Point q = Point{x: 3};
        int total = p.sum() + q.x;
        Point r = p.scaled(2);
        p.x = 5;
        "#
    );

    ok(&source);
}

#[test]
fn test_method_types_are_recorded() {
    let analysis = ok(POINT);
    let scaled = analysis
        .function_type(1025)
        .expect("method type recorded");

    assert_eq!(scaled.return_type.to_string(), "Point");
}

#[test]
fn test_attribute_not_defined_message() {
    let source = format!("{}entity p = Point{{x: 1, z: 2}};", POINT);
    let error = err(&source);
    assert_eq!(
        error.get_internal_error().to_string(),
        "Attribute `z` not defined in template `Point`"
    );
}

#[test]
fn test_attribute_type_mismatch() {
    let source = format!("{}entity p = Point{{x: \"a\"}};", POINT);
    assert_eq!(err_name(&source), "AttributeTypeMismatch");
}

#[test]
fn test_member_not_defined() {
    let source = format!("{}entity p = Point{{x: 1}}; echo p.z;", POINT);
    assert_eq!(err_name(&source), "MemberNotDefined");

    let source = format!("{}entity p = Point{{x: 1}}; p.sum(1);", POINT);
    assert_eq!(err_name(&source), "MethodArity");
}

#[test]
fn test_entity_of_unknown_template() {
    assert_eq!(err_name("entity p = Nope{x: 1};"), "TemplateNotFound");
    assert_eq!(err_name("int Nope = 1; entity p = Nope{x: 1};"), "NotATemplate");
}

#[test]
fn test_template_redeclared() {
    assert_eq!(
        err_name("template A = { int x; };\ntemplate A = { int y; };"),
        "TemplateRedeclared"
    );
}

#[test]
fn test_self_referencing_template() {
    ok(r#"
        template Node = {
            int value;
            Node[] children;
        };
        entity leaf = Node{value: 1, children: []};
        entity root = Node{value: 0, children: [leaf]};
        int first = root.children[0].value;
    "#);
}

#[test]
fn test_template_methods_see_attributes_and_siblings() {
    ok(r#"
        template Counter = {
            int count;
            func bump -> int = [] >> {
                count = count + 1;
                return count;
            }
            func twice -> int = [] >> {
                bump();
                return bump();
            }
        };
    "#);
}

#[test]
fn test_template_methods_see_inferred_siblings() {
    ok(r#"
        template Counter = {
            int count;
            func next -> int = [] >> {
                return current() + 1;
            }
            func current -> infer = [] >> {
                return count;
            }
        };
    "#);
}

#[test]
fn test_unknown_attribute_type() {
    assert_eq!(err_name("template A = { Missing m; };"), "TypeNotDefined");
}

// SYMBOL TABLE

fn position() -> Position {
    Position::new(0, 1, 1, Rc::new("test.crs".to_string()))
}

#[test]
fn test_symbol_table_lookup_stops_at_function() {
    let mut table = SymbolTable::new();
    table.define("outer", Type::int(), &position()).unwrap();
    table.enter_scope(ScopeKind::Function(FunctionType::new(Type::void(), vec![])));
    table.enter_scope(ScopeKind::Block);

    assert_eq!(table.lookup("outer", true), None);
    assert_eq!(table.lookup("outer", false), Some(&Type::int()));
    assert_eq!(table.lookup_scope("outer", false), Some(0));
}

#[test]
fn test_symbol_table_define_twice() {
    let mut table = SymbolTable::new();
    table.define("x", Type::int(), &position()).unwrap();

    let error = table.define("x", Type::str(), &position()).unwrap_err();
    assert_eq!(error.get_error_name(), "SymbolAlreadyDefined");
}

#[test]
fn test_symbol_table_cannot_exit_global() {
    let mut table = SymbolTable::new();
    table.enter_scope(ScopeKind::Block);
    assert!(table.exit_scope(&position()).is_ok());

    let error = table.exit_scope(&position()).unwrap_err();
    assert_eq!(*error.get_internal_error(), ErrorImpl::GlobalScopeExit);
}

#[test]
fn test_symbol_table_reachability() {
    let mut table = SymbolTable::new();
    table.enter_scope(ScopeKind::Loop);
    table.enter_scope(ScopeKind::Branch);
    assert!(table.is_loop_scope());

    table.set_unreachable();
    assert!(!table.is_reachable());

    let branch = table.exit_scope(&position()).unwrap();
    assert!(!branch.reachable);
    assert!(table.is_reachable());
}
