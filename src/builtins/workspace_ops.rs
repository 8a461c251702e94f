//! Workspace management: the PO listing family, the ER erasure family,
//! the BURY family, and TRACE/UNTRACE
//!
//! Listings print in a form LOAD accepts back: procedure sources
//! verbatim as defined, globals as MAKE lines. Buried entries are
//! exempt from listings and from bulk erasure.

use crate::error::Error;
use crate::frame::{CallResult, Signal};
use crate::node::{Node, Word};
use crate::procedure::Procedure;
use crate::workspace::Workspace;

/// Accept either one word or a flat list of words as a name argument.
fn to_word_list(node: &Node) -> Result<Vec<Word>, Error> {
    match node {
        Node::Word(w) => Ok(vec![w.clone()]),
        Node::List(l) | Node::Group(l) => {
            let mut words = Vec::with_capacity(l.len());
            for item in &l.items {
                match item {
                    Node::Word(w) => words.push(w.clone()),
                    _ => return Err(Error::word_expected(item)),
                }
            }
            Ok(words)
        }
    }
}

fn interpreted_names_sorted(ws: &Workspace) -> Vec<String> {
    let mut names: Vec<String> = ws
        .procedures
        .iter()
        .filter(|(_, p)| matches!(p, Procedure::Interpreted(_)))
        .map(|(name, _)| name.clone())
        .collect();
    names.sort();
    names
}

fn print_source(ws: &mut Workspace, name: &str) {
    if let Some(Procedure::Interpreted(p)) = ws.find_procedure(name) {
        if !p.buried.get() {
            ws.print(&p.source);
            ws.print("\n");
        }
    }
}

fn print_title(ws: &mut Workspace, name: &str) {
    if let Some(Procedure::Interpreted(p)) = ws.find_procedure(name) {
        if !p.buried.get() {
            let mut title = format!("TO {}", p.name);
            for param in &p.parameters {
                title.push_str(&format!(" :{}", param));
            }
            title.push('\n');
            ws.print(&title);
        }
    }
}

fn print_global(ws: &mut Workspace, name: &str) {
    let Some(var) = ws.root_vars().get(name) else {
        return;
    };
    if var.buried {
        return;
    }
    let Some(value) = var.value.clone() else {
        return;
    };
    let quote = if value.as_word().is_some() { "\"" } else { "" };
    let line = format!("MAKE \"{} {}{}\n", name, quote, value.to_text(true));
    ws.print(&line);
}

fn global_names_sorted(ws: &Workspace) -> Vec<String> {
    let mut names: Vec<String> = ws
        .root_vars()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    names.sort();
    names
}

/// POPS: print every non-buried procedure's source.
pub(crate) fn print_all_procedures(ws: &mut Workspace) {
    for name in interpreted_names_sorted(ws) {
        print_source(ws, &name);
    }
}

/// PONS: print every non-buried global as a MAKE line.
pub(crate) fn print_all_globals(ws: &mut Workspace) {
    for name in global_names_sorted(ws) {
        print_global(ws, &name);
    }
}

pub fn builtin_po(ws: &mut Workspace, args: &[Node]) -> CallResult {
    for w in to_word_list(&args[0])? {
        print_source(ws, &w.upper());
    }
    Ok(Signal::None)
}

pub fn builtin_pops(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    print_all_procedures(ws);
    Ok(Signal::None)
}

pub fn builtin_pot(ws: &mut Workspace, args: &[Node]) -> CallResult {
    for w in to_word_list(&args[0])? {
        print_title(ws, &w.upper());
    }
    Ok(Signal::None)
}

pub fn builtin_pots(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    for name in interpreted_names_sorted(ws) {
        print_title(ws, &name);
    }
    Ok(Signal::None)
}

pub fn builtin_pon(ws: &mut Workspace, args: &[Node]) -> CallResult {
    for w in to_word_list(&args[0])? {
        print_global(ws, &w.upper());
    }
    Ok(Signal::None)
}

pub fn builtin_pons(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    print_all_globals(ws);
    Ok(Signal::None)
}

pub fn builtin_poall(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    print_all_procedures(ws);
    if !ws.root_vars().is_empty() {
        ws.print("\n");
        print_all_globals(ws);
    }
    Ok(Signal::None)
}

pub fn builtin_erase(ws: &mut Workspace, args: &[Node]) -> CallResult {
    for w in to_word_list(&args[0])? {
        let name = w.upper();
        if let Some(Procedure::Interpreted(p)) = ws.find_procedure(&name) {
            if !p.buried.get() {
                ws.procedures.remove(&name);
            }
        }
    }
    Ok(Signal::None)
}

pub fn builtin_erps(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.procedures
        .retain(|_, p| !matches!(p, Procedure::Interpreted(ip) if !ip.buried.get()));
    Ok(Signal::None)
}

pub fn builtin_ern(ws: &mut Workspace, args: &[Node]) -> CallResult {
    for w in to_word_list(&args[0])? {
        let name = w.upper();
        let buried = ws.root_vars().get(&name).map(|v| v.buried);
        if buried == Some(false) {
            ws.root_vars_mut().remove(&name);
        }
    }
    Ok(Signal::None)
}

pub fn builtin_erns(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.root_vars_mut().retain(|_, v| v.buried);
    Ok(Signal::None)
}

pub fn builtin_erall(ws: &mut Workspace, args: &[Node]) -> CallResult {
    builtin_erps(ws, args)?;
    builtin_erns(ws, args)
}

fn set_procedure_buried(ws: &mut Workspace, names: &[Word], buried: bool) {
    for w in names {
        if let Some(Procedure::Interpreted(p)) = ws.find_procedure(&w.upper()) {
            p.buried.set(buried);
        }
    }
}

fn set_all_buried(ws: &mut Workspace, buried: bool) {
    for p in ws.procedures.values() {
        if let Procedure::Interpreted(ip) = p {
            ip.buried.set(buried);
        }
    }
    for var in ws.root_vars_mut().values_mut() {
        var.buried = buried;
    }
}

pub fn builtin_bury(ws: &mut Workspace, args: &[Node]) -> CallResult {
    set_procedure_buried(ws, &to_word_list(&args[0])?, true);
    Ok(Signal::None)
}

pub fn builtin_unbury(ws: &mut Workspace, args: &[Node]) -> CallResult {
    set_procedure_buried(ws, &to_word_list(&args[0])?, false);
    Ok(Signal::None)
}

pub fn builtin_buryall(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    set_all_buried(ws, true);
    Ok(Signal::None)
}

pub fn builtin_unburyall(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    set_all_buried(ws, false);
    Ok(Signal::None)
}

fn set_name_buried(ws: &mut Workspace, names: &[Word], buried: bool) {
    for w in names {
        if let Some(var) = ws.root_vars_mut().get_mut(&w.upper()) {
            var.buried = buried;
        }
    }
}

pub fn builtin_buryname(ws: &mut Workspace, args: &[Node]) -> CallResult {
    set_name_buried(ws, &to_word_list(&args[0])?, true);
    Ok(Signal::None)
}

pub fn builtin_unburyname(ws: &mut Workspace, args: &[Node]) -> CallResult {
    set_name_buried(ws, &to_word_list(&args[0])?, false);
    Ok(Signal::None)
}

pub fn builtin_trace(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.set_trace(true);
    Ok(Signal::None)
}

pub fn builtin_untrace(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.set_trace(false);
    Ok(Signal::None)
}

pub fn register(ws: &mut Workspace) {
    ws.register_builtin("PO", "", 1, builtin_po);
    ws.register_builtin("POALL", "", 0, builtin_poall);
    ws.register_builtin("PON", "", 1, builtin_pon);
    ws.register_builtin("PONS", "", 0, builtin_pons);
    ws.register_builtin("POPS", "", 0, builtin_pops);
    ws.register_builtin("POT", "", 1, builtin_pot);
    ws.register_builtin("POTS", "", 0, builtin_pots);

    ws.register_builtin("ERALL", "", 0, builtin_erall);
    ws.register_builtin("ERASE", "", 1, builtin_erase);
    ws.register_builtin("ERN", "", 1, builtin_ern);
    ws.register_builtin("ERNS", "", 0, builtin_erns);
    ws.register_builtin("ERPS", "", 0, builtin_erps);

    ws.register_builtin("BURY", "", 1, builtin_bury);
    ws.register_builtin("BURYALL", "", 0, builtin_buryall);
    ws.register_builtin("BURYNAME", "", 1, builtin_buryname);
    ws.register_builtin("UNBURY", "", 1, builtin_unbury);
    ws.register_builtin("UNBURYALL", "", 0, builtin_unburyall);
    ws.register_builtin("UNBURYNAME", "", 1, builtin_unburyname);

    ws.register_builtin("TRACE", "", 0, builtin_trace);
    ws.register_builtin("UNTRACE", "", 0, builtin_untrace);
}
