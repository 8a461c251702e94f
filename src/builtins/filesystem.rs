//! File primitives: LOAD, SAVE, SAVEL, CATALOG, PREFIX, SETPREFIX,
//! CREATEDIR, ERASEFILE, FILEP, RENAME, POFILE
//!
//! Everything resolves inside the workspace prefix directory. LOAD
//! replays a file through the REPL line machinery, so definitions and
//! top-level instructions behave exactly as if typed; SAVE writes a
//! listing LOAD accepts back.

use crate::builtins::workspace_ops::{print_all_globals, print_all_procedures};
use crate::error::Error;
use crate::frame::{CallResult, Signal};
use crate::node::{Node, Word};
use crate::procedure::Procedure;
use crate::workspace::Workspace;

fn read_registered_file(ws: &mut Workspace, name: &str) -> Result<Vec<String>, Error> {
    ws.files.open(name)?;
    ws.files.set_reader(Some(name))?;
    let mut lines = Vec::new();
    let mut failure = None;
    loop {
        match ws.files.read_line() {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => break,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    ws.files.set_reader(None)?;
    ws.files.close(name)?;
    match failure {
        Some(err) => Err(err),
        None => Ok(lines),
    }
}

/// LOAD "name: interpret the file line by line as the REPL does.
pub fn builtin_load(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    for line in read_registered_file(ws, &name)? {
        ws.feed_line(&line)?;
    }
    Ok(Signal::None)
}

fn with_file_writer(
    ws: &mut Workspace,
    name: &str,
    body: impl FnOnce(&mut Workspace),
) -> Result<(), Error> {
    ws.files.open(name)?;
    ws.files.set_writer(Some(name))?;
    body(ws);
    ws.files.set_writer(None)?;
    ws.files.close(name)
}

/// SAVE "name: every non-buried procedure source plus MAKE lines for
/// every non-buried global.
pub fn builtin_save(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    with_file_writer(ws, &name, |ws| {
        print_all_procedures(ws);
        print_all_globals(ws);
    })?;
    Ok(Signal::None)
}

/// SAVEL names "file: a subset of the procedures, plus the globals.
pub fn builtin_savel(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let names: Vec<String> = match &args[0] {
        Node::Word(w) => vec![w.upper()],
        Node::List(l) | Node::Group(l) => {
            let mut names = Vec::new();
            for item in &l.items {
                names.push(item.word_value()?.to_uppercase());
            }
            names
        }
    };
    let file = args[1].word_value()?.to_string();
    with_file_writer(ws, &file, |ws| {
        for name in &names {
            if let Some(Procedure::Interpreted(p)) = ws.find_procedure(name) {
                if !p.buried.get() {
                    ws.print(&p.source);
                    ws.print("\n");
                }
            }
        }
        print_all_globals(ws);
    })?;
    Ok(Signal::None)
}

pub fn builtin_catalog(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    let heading = format!("{}\n", ws.files.prefix().display());
    ws.print(&heading);
    for name in ws.files.catalog()? {
        let line = format!("  {}\n", name);
        ws.print(&line);
    }
    Ok(Signal::None)
}

pub fn builtin_prefix(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    let prefix = ws.files.prefix().display().to_string();
    Ok(Signal::Value(Node::Word(Word::lit(prefix))))
}

pub fn builtin_setprefix(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let path = args[0].word_value()?.to_string();
    ws.files.set_prefix(&path)?;
    Ok(Signal::None)
}

pub fn builtin_createdir(ws: &mut Workspace, args: &[Node]) -> CallResult {
    ws.files.create_dir(args[0].word_value()?)?;
    Ok(Signal::None)
}

pub fn builtin_erasefile(ws: &mut Workspace, args: &[Node]) -> CallResult {
    ws.files.erase_file(args[0].word_value()?)?;
    Ok(Signal::None)
}

pub fn builtin_filep(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let exists = ws.files.is_file(args[0].word_value()?);
    Ok(Signal::Value(Node::truth(exists)))
}

pub fn builtin_rename(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let from = args[0].word_value()?.to_string();
    let to = args[1].word_value()?.to_string();
    ws.files.rename(&from, &to)?;
    Ok(Signal::None)
}

/// POFILE "name: print the file's contents.
pub fn builtin_pofile(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    for line in read_registered_file(ws, &name)? {
        ws.print(&line);
        ws.print("\n");
    }
    Ok(Signal::None)
}

pub fn register(ws: &mut Workspace) {
    ws.register_builtin("LOAD", "", 1, builtin_load);
    ws.register_builtin("SAVE", "", 1, builtin_save);
    ws.register_builtin("SAVEL", "", 2, builtin_savel);

    ws.register_builtin("CATALOG", "", 0, builtin_catalog);
    ws.register_builtin("PREFIX", "", 0, builtin_prefix);
    ws.register_builtin("SETPREFIX", "", 1, builtin_setprefix);
    ws.register_builtin("CREATEDIR", "", 1, builtin_createdir);
    ws.register_builtin("ERASEFILE", "", 1, builtin_erasefile);
    ws.register_builtin("FILEP", "", 1, builtin_filep);
    ws.register_builtin("RENAME", "", 2, builtin_rename);
    ws.register_builtin("POFILE", "", 1, builtin_pofile);
}
