//! Control flow: OUTPUT, STOP, REPEAT, IF, IFELSE, RUN, CATCH, THROW,
//! GO, LABEL, TEST, IFTRUE, IFFALSE, WAIT, GOODBYE
//!
//! OUTPUT and STOP unwind via the stop signal, consumed at the
//! enclosing interpreted frame. GO is intercepted in the call
//! dispatcher, which turns the label into a body cursor position; the
//! handlers registered here for GO and LABEL are deliberate no-ops.

use crate::config::FAREWELL;
use crate::error::{Error, ErrorKind};
use crate::eval::eval_instruction_list;
use crate::frame::{CallResult, Signal};
use crate::node::Node;
use crate::workspace::Workspace;

pub fn builtin_output(ws: &mut Workspace, args: &[Node]) -> CallResult {
    ws.set_return_value(args[0].clone())?;
    Ok(Signal::Stop)
}

pub fn builtin_stop(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.signal_stop()?;
    Ok(Signal::Stop)
}

/// Evaluate the body ⌊n⌋ times, stopping early on any unwind.
pub fn builtin_repeat(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let count = args[0].to_number()? as i64;
    for _ in 0..count {
        ws.check_interrupt()?;
        match eval_instruction_list(ws, &args[1], false)? {
            Signal::None | Signal::Value(_) => {}
            sig => return Ok(sig),
        }
    }
    Ok(Signal::None)
}

/// IF cond body, with an optional else list supplied by the dispatcher.
/// The chosen branch's last value is the value of the IF.
pub fn builtin_if(ws: &mut Workspace, args: &[Node]) -> CallResult {
    if args[0].to_boolean()? {
        eval_instruction_list(ws, &args[1], true)
    } else if let Some(else_branch) = args.get(2) {
        eval_instruction_list(ws, else_branch, true)
    } else {
        Ok(Signal::None)
    }
}

pub fn builtin_ifelse(ws: &mut Workspace, args: &[Node]) -> CallResult {
    if args[0].to_boolean()? {
        eval_instruction_list(ws, &args[1], true)
    } else {
        eval_instruction_list(ws, &args[2], true)
    }
}

pub fn builtin_run(ws: &mut Workspace, args: &[Node]) -> CallResult {
    eval_instruction_list(ws, &args[0], true)
}

/// Evaluate the list, swallowing an error that matches the tag. The
/// wildcard tag ERROR catches everything; otherwise only THROWn user
/// errors with the same tag match.
pub fn builtin_catch(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let tag = args[0].word_value()?.to_uppercase();
    match eval_instruction_list(ws, &args[1], true) {
        Ok(sig) => Ok(sig),
        Err(err) => {
            let matches = tag == "ERROR"
                || matches!(&err.kind, ErrorKind::UserError(thrown) if *thrown == tag);
            if matches {
                Ok(Signal::None)
            } else {
                Err(err)
            }
        }
    }
}

pub fn builtin_throw(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let tag = args[0].word_value()?.to_uppercase();
    Err(Error::at(ErrorKind::UserError(tag), &args[0]))
}

/// No-op: GO is resolved by the call dispatcher before this runs.
pub fn builtin_go(_ws: &mut Workspace, _args: &[Node]) -> CallResult {
    Ok(Signal::None)
}

/// No-op marker; it exists so a body can be re-entered at its tag.
pub fn builtin_label(_ws: &mut Workspace, _args: &[Node]) -> CallResult {
    Ok(Signal::None)
}

pub fn builtin_test(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let value = args[0].to_boolean()?;
    ws.set_test_value(value);
    Ok(Signal::None)
}

pub fn builtin_iftrue(ws: &mut Workspace, args: &[Node]) -> CallResult {
    run_on_test(ws, args, true)
}

pub fn builtin_iffalse(ws: &mut Workspace, args: &[Node]) -> CallResult {
    run_on_test(ws, args, false)
}

fn run_on_test(ws: &mut Workspace, args: &[Node], wanted: bool) -> CallResult {
    let Some(value) = ws.test_value() else {
        return Err(Error::at(ErrorKind::NoCurrentTestValue, &args[0]));
    };
    if value == wanted {
        eval_instruction_list(ws, &args[0], true)
    } else {
        Ok(Signal::None)
    }
}

pub fn builtin_wait(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let seconds = args[0].to_number()? as i64;
    if seconds < 1 {
        return Err(Error::bad_input(&args[0]));
    }
    std::thread::sleep(std::time::Duration::from_secs(seconds as u64));
    Ok(Signal::None)
}

pub fn builtin_goodbye(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.print(FAREWELL);
    ws.request_quit();
    Ok(Signal::None)
}

pub fn register(ws: &mut Workspace) {
    ws.register_builtin("OUTPUT", "OP", 1, builtin_output);
    ws.register_builtin("STOP", "", 0, builtin_stop);

    ws.register_builtin("REPEAT", "", 2, builtin_repeat);
    ws.register_builtin("IF", "", 2, builtin_if);
    ws.register_builtin("IFELSE", "", 3, builtin_ifelse);
    ws.register_builtin("RUN", "", 1, builtin_run);

    ws.register_builtin("CATCH", "", 2, builtin_catch);
    ws.register_builtin("THROW", "", 1, builtin_throw);
    ws.register_builtin("GO", "", 1, builtin_go);
    ws.register_builtin("LABEL", "", 1, builtin_label);

    ws.register_builtin("TEST", "", 1, builtin_test);
    ws.register_builtin("IFTRUE", "", 1, builtin_iftrue);
    ws.register_builtin("IFFALSE", "", 1, builtin_iffalse);

    ws.register_builtin("WAIT", "", 1, builtin_wait);
    ws.register_builtin("GOODBYE", "BYE", 0, builtin_goodbye);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::scratch_workspace;

    #[test]
    fn test_repeat_accumulates() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("MAKE \"c 0 REPEAT 3 [MAKE \"c SUM :c 1]").unwrap();
        assert_eq!(ws.get_variable("c").unwrap().to_string(), "3");
    }

    #[test]
    fn test_repeat_doubling() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("MAKE \"x 10 REPEAT 4 [MAKE \"x :x + :x]").unwrap();
        assert_eq!(ws.get_variable("x").unwrap().to_string(), "160");
    }

    #[test]
    fn test_if_branches() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("IF \"true [PRINT 1]").unwrap();
        ws.evaluate("IF \"false [PRINT 2]").unwrap();
        ws.evaluate("IF \"false [PRINT 3] [PRINT 4]").unwrap();
        ws.evaluate("IFELSE \"true [PRINT 5] [PRINT 6]").unwrap();
        assert_eq!(ws.take_capture(), "1\n4\n5\n");
    }

    #[test]
    fn test_if_requires_boolean() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("IF 3 [PRINT 1]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BooleanExpected);
    }

    #[test]
    fn test_stop_and_output_need_a_procedure() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("STOP").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoInterpretedFrame("STOP".to_string()));

        let err = ws.evaluate("OUTPUT 1").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::NoInterpretedFrame("OUTPUT".to_string())
        );
    }

    #[test]
    fn test_output_unwinds_nested_loops() {
        let (_dir, mut ws) = scratch_workspace();
        ws.read_source("TO first\nREPEAT 10 [OUTPUT 7 PRINT \"no]\nEND\n")
            .unwrap();
        ws.evaluate("PRINT first").unwrap();
        assert_eq!(ws.take_capture(), "FIRST defined.\n7\n");
    }

    #[test]
    fn test_stop_ends_only_one_call() {
        let (_dir, mut ws) = scratch_workspace();
        ws.read_source(
            "TO inner\nSTOP\nPRINT \"unreached\nEND\nTO outer\ninner\nPRINT \"reached\nEND\nouter\n",
        )
        .unwrap();
        assert_eq!(
            ws.take_capture(),
            "INNER defined.\nOUTER defined.\nreached\n"
        );
    }

    #[test]
    fn test_run_returns_a_value() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("PRINT RUN [SUM 1 2]").unwrap();
        assert_eq!(ws.take_capture(), "3\n");
    }

    #[test]
    fn test_catch_matching_tag() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("CATCH \"oops [THROW \"oops]").unwrap();
    }

    #[test]
    fn test_catch_wrong_tag_reraises() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("CATCH \"other [THROW \"oops]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UserError("OOPS".to_string()));
    }

    #[test]
    fn test_catch_wildcard_swallows_builtin_errors() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("CATCH \"error [SUM \"a 1]").unwrap();
    }

    #[test]
    fn test_catch_is_case_insensitive() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("CATCH \"OOPS [THROW \"oops]").unwrap();
    }

    #[test]
    fn test_go_jumps_to_label() {
        let (_dir, mut ws) = scratch_workspace();
        ws.read_source(
            "TO count :n\nLABEL \"top\nPRINT :n\nMAKE \"n :n - 1\nIF :n > 0 [GO \"top]\nEND\ncount 3\n",
        )
        .unwrap();
        assert_eq!(ws.take_capture(), "COUNT defined.\n3\n2\n1\n");
    }

    #[test]
    fn test_go_unknown_label() {
        let (_dir, mut ws) = scratch_workspace();
        ws.read_source("TO lost\nGO \"nowhere\nEND\n").unwrap();
        let err = ws.evaluate("lost").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownLabel("NOWHERE".to_string()));
    }

    #[test]
    fn test_go_outside_procedure() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("GO \"top").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoInterpretedFrame("GO".to_string()));
    }

    #[test]
    fn test_iftrue_without_test() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("IFTRUE [PRINT 1]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoCurrentTestValue);
    }

    #[test]
    fn test_throw_tag_is_uppercased() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("THROW \"oops").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UserError("OOPS".to_string()));
    }

    #[test]
    fn test_goodbye_requests_quit() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("GOODBYE").unwrap();
        assert!(ws.quit_requested());
    }

    #[test]
    fn test_wait_rejects_non_positive() {
        let (_dir, mut ws) = scratch_workspace();
        assert!(ws.evaluate("WAIT 0").is_err());
    }
}
