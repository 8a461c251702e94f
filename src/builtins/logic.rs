//! Boolean operations: BOTH, EITHER, NOT
//!
//! BOTH and EITHER back the infix AND and OR; both inputs are already
//! evaluated by the time the primitive runs, so there is no
//! short-circuiting.

use crate::frame::{CallResult, Signal};
use crate::node::Node;
use crate::workspace::Workspace;

pub fn builtin_both(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let x = args[0].to_boolean()?;
    let y = args[1].to_boolean()?;
    Ok(Signal::Value(Node::truth(x && y)))
}

pub fn builtin_either(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let x = args[0].to_boolean()?;
    let y = args[1].to_boolean()?;
    Ok(Signal::Value(Node::truth(x || y)))
}

pub fn builtin_not(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    Ok(Signal::Value(Node::truth(!args[0].to_boolean()?)))
}

pub fn register(ws: &mut Workspace) {
    ws.register_builtin("BOTH", "AND", 2, builtin_both);
    ws.register_builtin("EITHER", "OR", 2, builtin_either);
    ws.register_builtin("NOT", "", 1, builtin_not);
}

#[cfg(test)]
mod tests {
    use crate::workspace::scratch_workspace;

    fn prints(source: &str) -> String {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate(source).unwrap();
        ws.take_capture()
    }

    #[test]
    fn test_both_either_not() {
        assert_eq!(prints("PRINT BOTH \"true \"false"), "FALSE\n");
        assert_eq!(prints("PRINT BOTH \"true \"true"), "TRUE\n");
        assert_eq!(prints("PRINT EITHER \"false \"true"), "TRUE\n");
        assert_eq!(prints("PRINT EITHER \"false \"false"), "FALSE\n");
        assert_eq!(prints("PRINT NOT \"false"), "TRUE\n");
    }

    #[test]
    fn test_infix_and_or() {
        assert_eq!(prints("PRINT (1 < 2) AND (3 < 4)"), "TRUE\n");
        assert_eq!(prints("PRINT (1 > 2) OR (3 < 4)"), "TRUE\n");
        assert_eq!(prints("PRINT (1 > 2) OR (3 > 4)"), "FALSE\n");
        assert_eq!(prints("PRINT \"true AND \"true"), "TRUE\n");
    }

    #[test]
    fn test_boolean_inputs_required() {
        let (_dir, mut ws) = scratch_workspace();
        assert!(ws.evaluate("PRINT NOT 5").is_err());
    }
}
