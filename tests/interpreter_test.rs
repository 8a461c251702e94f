// ABOUTME: End-to-end interpreter scenarios driven through the REPL machinery

use rlogo::error::ErrorKind;
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

#[test]
fn test_parse_list_shape() {
    // "[ a [ b c ] d ]" is one list of three children.
    let nodes = parse("[ a [ b c ] d ]").unwrap();
    assert_eq!(nodes.len(), 1);
    let Node::List(l) = &nodes[0] else {
        panic!("expected a list");
    };
    assert_eq!(l.len(), 3);
    assert_eq!(l.items[0].to_string(), "a");
    assert_eq!(l.items[1].to_string(), "[ b c ]");
    assert_eq!(l.items[2].to_string(), "d");
}

#[test]
fn test_recursive_factorial() {
    let (_dir, mut ws) = workspace();
    ws.read_source("TO f :n\nIF :n = 0 [OUTPUT 1]\nOUTPUT :n * f :n - 1\nEND\n")
        .unwrap();
    ws.take_capture();
    ws.evaluate("PRINT f 5").unwrap();
    assert_eq!(ws.take_capture(), "120\n");
}

#[test]
fn test_square_procedure_prints() {
    let (_dir, mut ws) = workspace();
    ws.read_source("TO sq :n\nOUTPUT :n * :n\nEND\nPRINT sq 7\n")
        .unwrap();
    assert_eq!(ws.take_capture(), "SQ defined.\n49\n");
}

#[test]
fn test_repeat_doubles_global() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("MAKE \"x 10 REPEAT 4 [MAKE \"x :x + :x] PRINT :x")
        .unwrap();
    assert_eq!(ws.take_capture(), "160\n");
}

#[test]
fn test_property_list_scenario() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("PPROP \"dog \"sound \"woof").unwrap();
    ws.evaluate("PRINT GPROP \"dog \"sound").unwrap();
    assert_eq!(ws.take_capture(), "woof\n");

    ws.evaluate("REMPROP \"dog \"sound").unwrap();
    ws.evaluate("FPRINT GPROP \"dog \"sound").unwrap();
    assert_eq!(ws.take_capture(), "[ ]\n");
}

#[test]
fn test_catch_swallows_bad_input() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("CATCH \"error [SUM \"a 1]").unwrap();
}

#[test]
fn test_catch_and_throw_tags() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("CATCH \"oops [THROW \"oops]").unwrap();

    let err = ws.evaluate("CATCH \"other [THROW \"oops]").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UserError("OOPS".to_string()));
}

#[test]
fn test_tilde_continuation_matches_single_line() {
    let (_dir, mut ws) = workspace();
    ws.feed_line("PRINT [a ~").unwrap();
    ws.feed_line("b]").unwrap();
    let continued = ws.take_capture();

    ws.feed_line("PRINT [a b]").unwrap();
    assert_eq!(ws.take_capture(), continued);
}

#[test]
fn test_define_and_run_noop() {
    let (_dir, mut ws) = workspace();
    ws.feed_line("TO g").unwrap();
    ws.feed_line("END").unwrap();
    assert_eq!(ws.take_capture(), "G defined.\n");
    ws.feed_line("g").unwrap();
    assert_eq!(ws.take_capture(), "");
}

#[test]
fn test_top_level_value_is_an_error() {
    let (_dir, mut ws) = workspace();
    let err = ws.evaluate("SUM 1 2").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnValueUnused("3".to_string()));
}

#[test]
fn test_unknown_procedure_reports_name() {
    let (_dir, mut ws) = workspace();
    let err = ws.evaluate("spiral 10").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProcedureNotFound("spiral".to_string()));
}

#[test]
fn test_not_enough_inputs() {
    let (_dir, mut ws) = workspace();
    let err = ws.evaluate("PRINT SUM 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotEnoughInputs("SUM".to_string()));
}

#[test]
fn test_error_carries_position() {
    let (_dir, mut ws) = workspace();
    let err = ws.evaluate("PRINT 1\nnope").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProcedureNotFound("nope".to_string()));
    let pos = err.pos.expect("position should be known");
    assert_eq!(pos.line, 2);
    assert_eq!(pos.col, 1);
}

#[test]
fn test_deep_recursion_with_locals() {
    let (_dir, mut ws) = workspace();
    ws.read_source(
        "TO sum :n\nIF :n = 0 [OUTPUT 0]\nLOCAL \"rest\nMAKE \"rest sum :n - 1\nOUTPUT :n + :rest\nEND\n",
    )
    .unwrap();
    ws.take_capture();
    ws.evaluate("PRINT sum 100").unwrap();
    assert_eq!(ws.take_capture(), "5050\n");
}

#[test]
fn test_ifelse_value_feeds_expression() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("PRINT IFELSE 1 < 2 [\"yes] [\"no]").unwrap();
    assert_eq!(ws.take_capture(), "yes\n");
}

#[test]
fn test_run_list_from_variable() {
    let (_dir, mut ws) = workspace();
    ws.evaluate("MAKE \"code [PRINT SUM 4 5] RUN :code").unwrap();
    assert_eq!(ws.take_capture(), "9\n");
}

#[test]
fn test_word_enumeration_order() {
    let nodes = parse("Say [ Hello [ World ] ] ( Again )").unwrap();
    let words: Vec<&str> = rlogo::node::words_in(&nodes)
        .map(|w| w.value.as_str())
        .collect();
    assert_eq!(words, ["Say", "Hello", "World", "Again"]);
}

#[test]
fn test_goodbye_is_a_clean_quit() {
    let (_dir, mut ws) = workspace();
    ws.feed_line("GOODBYE").unwrap();
    assert!(ws.quit_requested());
    assert_eq!(ws.take_capture(), "Seeya!\n\n");
}
