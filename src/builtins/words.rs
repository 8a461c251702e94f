//! Word and list construction: WORD, SENTENCE, LIST, FPUT, LPUT, FIRST,
//! LAST, BUTFIRST, BUTLAST, COUNT, ITEM
//!
//! The selectors treat a word as a sequence of characters and a list as
//! a sequence of members; an empty input is a bad input, not an empty
//! result. WORD, SENTENCE and LIST are variadic inside a group.

use crate::error::Error;
use crate::frame::{CallResult, Signal};
use crate::node::{Node, Word};
use crate::workspace::Workspace;

/// Concatenate word values into one word.
pub fn builtin_word(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let mut value = String::new();
    for arg in args {
        value.push_str(arg.word_value()?);
    }
    Ok(Signal::Value(Node::Word(Word::lit(value))))
}

/// Splice words and list members into one flat list.
pub fn builtin_sentence(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let mut items = Vec::new();
    for arg in args {
        match arg {
            Node::Word(_) => items.push(arg.clone()),
            Node::List(l) | Node::Group(l) => items.extend(l.items.iter().cloned()),
        }
    }
    Ok(Signal::Value(Node::list(items)))
}

/// Collect the arguments, unspliced, into a list.
pub fn builtin_list(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    Ok(Signal::Value(Node::list(args.to_vec())))
}

pub fn builtin_fput(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let Node::List(l) = &args[1] else {
        return Err(Error::list_expected(&args[1]));
    };
    let mut items = Vec::with_capacity(l.len() + 1);
    items.push(args[0].clone());
    items.extend(l.items.iter().cloned());
    Ok(Signal::Value(Node::list(items)))
}

pub fn builtin_lput(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let Node::List(l) = &args[1] else {
        return Err(Error::list_expected(&args[1]));
    };
    let mut items = l.items.clone();
    items.push(args[0].clone());
    Ok(Signal::Value(Node::list(items)))
}

pub fn builtin_first(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    match &args[0] {
        Node::Word(w) => {
            let c = w.value.chars().next().ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(Node::Word(Word::lit(c.to_string()))))
        }
        Node::List(l) | Node::Group(l) => {
            let first = l.items.first().ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(first.clone()))
        }
    }
}

pub fn builtin_last(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    match &args[0] {
        Node::Word(w) => {
            let c = w.value.chars().last().ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(Node::Word(Word::lit(c.to_string()))))
        }
        Node::List(l) | Node::Group(l) => {
            let last = l.items.last().ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(last.clone()))
        }
    }
}

pub fn builtin_butfirst(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    match &args[0] {
        Node::Word(w) => {
            let mut chars = w.value.chars();
            if chars.next().is_none() {
                return Err(Error::bad_input(&args[0]));
            }
            Ok(Signal::Value(Node::Word(Word::lit(chars.as_str()))))
        }
        Node::List(l) | Node::Group(l) => {
            if l.is_empty() {
                return Err(Error::bad_input(&args[0]));
            }
            Ok(Signal::Value(Node::list(l.items[1..].to_vec())))
        }
    }
}

pub fn builtin_butlast(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    match &args[0] {
        Node::Word(w) => {
            let mut value = w.value.clone();
            if value.pop().is_none() {
                return Err(Error::bad_input(&args[0]));
            }
            Ok(Signal::Value(Node::Word(Word::lit(value))))
        }
        Node::List(l) | Node::Group(l) => {
            if l.is_empty() {
                return Err(Error::bad_input(&args[0]));
            }
            Ok(Signal::Value(Node::list(l.items[..l.len() - 1].to_vec())))
        }
    }
}

pub fn builtin_count(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let n = match &args[0] {
        Node::Word(w) => w.value.chars().count(),
        Node::List(l) | Node::Group(l) => l.len(),
    };
    Ok(Signal::Value(Node::number(n as f64)))
}

/// ITEM n thing: one-based selection of a character or member.
pub fn builtin_item(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let ix = args[0].to_number()? as i64;
    if ix <= 0 {
        return Err(Error::bad_input(&args[0]));
    }
    let ix = ix as usize;
    match &args[1] {
        Node::Word(w) => {
            let c = w
                .value
                .chars()
                .nth(ix - 1)
                .ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(Node::Word(Word::lit(c.to_string()))))
        }
        Node::List(l) | Node::Group(l) => {
            let item = l
                .items
                .get(ix - 1)
                .ok_or_else(|| Error::bad_input(&args[0]))?;
            Ok(Signal::Value(item.clone()))
        }
    }
}

pub fn register(ws: &mut Workspace) {
    ws.register_variadic("WORD", "", 2, builtin_word);
    ws.register_variadic("SENTENCE", "SE", 2, builtin_sentence);
    ws.register_variadic("LIST", "", 2, builtin_list);
    ws.register_builtin("FPUT", "", 2, builtin_fput);
    ws.register_builtin("LPUT", "", 2, builtin_lput);
    ws.register_builtin("FIRST", "", 1, builtin_first);
    ws.register_builtin("LAST", "", 1, builtin_last);
    ws.register_builtin("BUTFIRST", "", 1, builtin_butfirst);
    ws.register_builtin("BUTLAST", "", 1, builtin_butlast);
    ws.register_builtin("COUNT", "", 1, builtin_count);
    ws.register_builtin("ITEM", "NTH", 2, builtin_item);
}
