//! Console I/O: PRINT, FPRINT, TYPE, FTYPE, READLIST, READCHAR, REQUEST
//!
//! PRINT strips the outer brackets from a list, FPRINT keeps them;
//! TYPE and FTYPE are the newline-free variants. The readers consume
//! the current reader, which is the console unless LOAD or POFILE has
//! redirected it.

use crate::config::PROMPT_PRIMARY;
use crate::error::{Error, ErrorKind};
use crate::frame::{CallResult, Signal};
use crate::node::{Node, Word};
use crate::parser::parse;
use crate::workspace::Workspace;

fn write_args(ws: &mut Workspace, args: &[Node], brackets: bool, newline: bool) -> CallResult {
    let text = args
        .iter()
        .map(|n| n.to_text(brackets))
        .collect::<Vec<_>>()
        .join(" ");
    ws.print(&text);
    if newline {
        ws.print("\n");
    }
    Ok(Signal::None)
}

pub fn builtin_print(ws: &mut Workspace, args: &[Node]) -> CallResult {
    write_args(ws, args, false, true)
}

pub fn builtin_fprint(ws: &mut Workspace, args: &[Node]) -> CallResult {
    write_args(ws, args, true, true)
}

pub fn builtin_type(ws: &mut Workspace, args: &[Node]) -> CallResult {
    write_args(ws, args, false, false)
}

pub fn builtin_ftype(ws: &mut Workspace, args: &[Node]) -> CallResult {
    write_args(ws, args, true, false)
}

/// Read one line and return it as a list of its words.
pub fn builtin_readlist(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    read_as_list(ws)
}

/// Prompt, then read as READLIST does.
pub fn builtin_request(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.print(PROMPT_PRIMARY);
    read_as_list(ws)
}

fn read_as_list(ws: &mut Workspace) -> CallResult {
    let Some(line) = ws.files.read_line()? else {
        return Err(Error::new(ErrorKind::Io("end of input".to_string())));
    };
    let mut nodes = parse(&format!("[ {} ]", line))?;
    Ok(Signal::Value(nodes.remove(0)))
}

/// Read a single character as a one-character word.
pub fn builtin_readchar(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    let Some(c) = ws.files.read_char()? else {
        return Err(Error::new(ErrorKind::Io("end of input".to_string())));
    };
    Ok(Signal::Value(Node::Word(Word::lit(c.to_string()))))
}

pub fn register(ws: &mut Workspace) {
    ws.register_variadic("PRINT", "PR", 1, builtin_print);
    ws.register_variadic("FPRINT", "FP", 1, builtin_fprint);
    ws.register_variadic("TYPE", "TY", 1, builtin_type);
    ws.register_variadic("FTYPE", "FTY", 1, builtin_ftype);

    ws.register_builtin("READLIST", "RL", 0, builtin_readlist);
    ws.register_builtin("READCHAR", "RC", 0, builtin_readchar);
    ws.register_builtin("REQUEST", "", 0, builtin_request);
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
    fn test_print_strips_outer_brackets() {
        assert_eq!(prints("PRINT [a [b c] d]"), "a [ b c ] d\n");
        assert_eq!(prints("FPRINT [a [b c] d]"), "[ a [ b c ] d ]\n");
    }

    #[test]
    fn test_type_omits_newline() {
        assert_eq!(prints("TYPE \"a TYPE \"b"), "ab");
        assert_eq!(prints("FTYPE [a b]"), "[ a b ]");
    }

    #[test]
    fn test_print_variadic_in_group() {
        assert_eq!(prints("(PRINT \"a \"b 3)"), "a b 3\n");
        assert_eq!(prints("(PRINT)"), "\n");
    }

    #[test]
    fn test_print_aliases() {
        assert_eq!(prints("PR \"hi"), "hi\n");
    }
}
