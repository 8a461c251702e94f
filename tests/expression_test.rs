// ABOUTME: Expression evaluator integration tests

use rlogo::eval::{evaluate_expression, Cursor};
use rlogo::frame::{CallResult, Signal};
use rlogo::node::Node;
use rlogo::parser::parse;
use rlogo::workspace::{Workspace, WorkspaceConfig};
use tempfile::TempDir;

fn workspace() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    let config = WorkspaceConfig {
        prefix: dir.path().to_path_buf(),
        trace: false,
        screen: (0, 0),
    };
    let mut ws = Workspace::new(config).unwrap();
    ws.begin_capture();
    (dir, ws)
}

fn assert_expression(ws: &mut Workspace, expr: &str, expected: &str) {
    let nodes = parse(expr).unwrap();
    let mut cur = Cursor::new(&nodes);
    match evaluate_expression(ws, &mut cur) {
        Ok(Signal::Value(v)) => {
            assert_eq!(v.to_string(), expected, "expression: {:?}", expr);
        }
        Ok(other) => panic!("expression {:?}: no value, got {:?}", expr, other),
        Err(e) => panic!("expression {:?}: {}", expr, e),
    }
}

// A stand-in for a value-producing 0-ary primitive, as the screen-width
// query is in the full system.
fn builtin_sw(_ws: &mut Workspace, _args: &[Node]) -> CallResult {
    Ok(Signal::Value(Node::number(800.0)))
}

#[test]
fn test_add_two_numbers() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "1 + 1", "2");
}

#[test]
fn test_add_three_numbers() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "1 + 2 + 3", "6");
}

#[test]
fn test_add_four_numbers() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "1 + 2 + 3 + 4", "10");
}

#[test]
fn test_mul_binds_tighter_than_add() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "2 + 3 * 4", "14");
    assert_expression(&mut ws, "2 + 3 * 4 + 5", "19");
}

#[test]
fn test_expression_with_procedure_call() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "5 + MOD 10 2 + 1", "6");
}

#[test]
fn test_unary_minus_of_group() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "10 * -(2*2)", "-40");
}

#[test]
fn test_negative_literal() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "-4 * 10", "-40");
}

#[test]
fn test_subtraction() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "1 - 2", "-1");
    assert_expression(&mut ws, "5 * 5 - 20", "5");
}

#[test]
fn test_division() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "5 * 10 / 5", "10");
}

#[test]
fn test_paren_proc_and_negative() {
    let (_dir, mut ws) = workspace();
    ws.register_builtin("SW", "", 0, builtin_sw);
    assert_expression(&mut ws, "(SW / -2)", "-400");
}

#[test]
fn test_paren_proc_in_larger_expression() {
    let (_dir, mut ws) = workspace();
    ws.register_builtin("SW", "", 0, builtin_sw);
    assert_expression(
        &mut ws,
        "make \"s -1 make \"e 1 make \"a (:e - :s) / SW :a",
        "0.0025",
    );
}

#[test]
fn test_set_variable() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "make \"a 1 :a", "1");
}

#[test]
fn test_set_variable_with_parens() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "make \"b ( 1 + 1 ) :b", "2");
}

#[test]
fn test_set_variable_with_parens_and_div() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "make \"s ( 10 - 1 ) / 800 :s", "0.01125");
}

#[test]
fn test_comparison_chain_value() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "1 + 1 = 2", "TRUE");
    assert_expression(&mut ws, "2 * 3 < 5", "FALSE");
}

#[test]
fn test_equality_is_numeric() {
    let (_dir, mut ws) = workspace();
    assert_expression(&mut ws, "2 = 2.0", "TRUE");
    assert_expression(&mut ws, "2 <> 3", "TRUE");
}
