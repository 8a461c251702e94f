//! Variables and property lists: MAKE, THING, LOCAL, PPROP, GPROP,
//! REMPROP, PLIST, PPS, ERPROPS
//!
//! MAKE mutates an existing binding wherever the frame chain holds it
//! and otherwise creates a global; LOCAL shadows for the duration of
//! the current call. Property lists hang off variables and are created
//! on first PPROP.

use crate::error::{Error, ErrorKind};
use crate::frame::{CallResult, Signal};
use crate::node::Node;
use crate::workspace::Workspace;

pub fn builtin_make(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    ws.set_variable(&name, args[1].clone());
    Ok(Signal::None)
}

pub fn builtin_thing(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    match ws.get_variable(&name) {
        Some(value) => Ok(Signal::Value(value)),
        None => Err(Error::at(ErrorKind::VariableNotFound(name), &args[0])),
    }
}

pub fn builtin_local(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    ws.create_local(&name);
    Ok(Signal::None)
}

pub fn builtin_pprop(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    let prop = args[1].word_value()?.to_string();
    ws.set_property(&name, &prop, args[2].clone());
    Ok(Signal::None)
}

/// GPROP answers the empty list for a missing property.
pub fn builtin_gprop(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?;
    let prop = args[1].word_value()?;
    let value = ws
        .get_property(name, prop)
        .unwrap_or_else(|| Node::list(Vec::new()));
    Ok(Signal::Value(value))
}

pub fn builtin_remprop(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?.to_string();
    let prop = args[1].word_value()?.to_string();
    ws.remove_property(&name, &prop);
    Ok(Signal::None)
}

/// PLIST name: the properties as a flat [prop value prop value] list.
pub fn builtin_plist(ws: &mut Workspace, args: &[Node]) -> CallResult {
    let name = args[0].word_value()?;
    let mut items = Vec::new();
    for (prop, value) in ws.properties(name) {
        items.push(Node::Word(crate::node::Word::lit(prop)));
        items.push(value);
    }
    Ok(Signal::Value(Node::list(items)))
}

/// PPS: print every property of every global as PPROP lines.
pub fn builtin_pps(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    let mut names: Vec<String> = ws
        .root_vars()
        .iter()
        .filter(|(_, v)| v.props.as_ref().is_some_and(|p| !p.is_empty()))
        .map(|(name, _)| name.clone())
        .collect();
    names.sort();
    for name in names {
        for (prop, value) in ws.properties(&name) {
            let line = format!("PPROP \"{} \"{} {}\n", name, prop, value.to_text(true));
            ws.print(&line);
        }
    }
    Ok(Signal::None)
}

pub fn builtin_erprops(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    ws.clear_properties();
    Ok(Signal::None)
}

pub fn register(ws: &mut Workspace) {
    ws.register_builtin("MAKE", "", 2, builtin_make);
    ws.register_builtin("THING", "", 1, builtin_thing);
    ws.register_builtin("LOCAL", "", 1, builtin_local);

    ws.register_builtin("PPROP", "", 3, builtin_pprop);
    ws.register_builtin("GPROP", "", 2, builtin_gprop);
    ws.register_builtin("REMPROP", "", 2, builtin_remprop);
    ws.register_builtin("PLIST", "", 1, builtin_plist);
    ws.register_builtin("PPS", "", 0, builtin_pps);
    ws.register_builtin("ERPROPS", "", 0, builtin_erprops);
}
