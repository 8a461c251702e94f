// ABOUTME: Procedure registry records and the TO ... END definition reader

use crate::error::{Error, ErrorKind};
use crate::frame::CallResult;
use crate::node::{Node, KEYWORD_END, KEYWORD_TO};
use crate::workspace::Workspace;
use std::cell::Cell;
use std::rc::Rc;

/// Native implementation of a primitive. Parameters arrive already
/// evaluated; instruction-list parameters arrive as unevaluated lists.
pub type BuiltinFn = fn(&mut Workspace, &[Node]) -> CallResult;

#[derive(Debug)]
pub struct BuiltinProcedure {
    pub name: &'static str,
    pub params: usize,
    /// Consumes every remaining expression when called as the first
    /// word of a group, `(SUM 1 2 3)` style.
    pub variadic: bool,
    pub func: BuiltinFn,
}

/// A user procedure defined with TO ... END. The original source text is
/// preserved verbatim for PO and SAVE.
#[derive(Debug)]
pub struct InterpretedProcedure {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Node>,
    pub source: String,
    pub buried: Cell<bool>,
}

/// A registry entry. Cloning shares the record, so short aliases point
/// at the same procedure.
#[derive(Debug, Clone)]
pub enum Procedure {
    Builtin(Rc<BuiltinProcedure>),
    Interpreted(Rc<InterpretedProcedure>),
}

impl Procedure {
    pub fn param_count(&self) -> usize {
        match self {
            Procedure::Builtin(b) => b.params,
            Procedure::Interpreted(p) => p.parameters.len(),
        }
    }

    pub fn variadic(&self) -> bool {
        match self {
            Procedure::Builtin(b) => b.variadic,
            Procedure::Interpreted(_) => false,
        }
    }
}

/// Read one `TO name :p1 :p2 … body END` form starting at `nodes[*ix]`,
/// leaving the index just past END.
pub fn read_procedure(nodes: &[Node], ix: &mut usize) -> Result<InterpretedProcedure, Error> {
    let to = nodes
        .get(*ix)
        .ok_or_else(|| Error::new(ErrorKind::KeywordExpected(KEYWORD_TO.to_string())))?;
    if !to.as_word().is_some_and(|w| w.matches(KEYWORD_TO)) {
        return Err(Error::at(
            ErrorKind::KeywordExpected(KEYWORD_TO.to_string()),
            to,
        ));
    }
    *ix += 1;

    let name_node = nodes
        .get(*ix)
        .ok_or_else(|| Error::new(ErrorKind::WordExpected))?;
    let name = name_node.word_value()?.to_uppercase();
    *ix += 1;

    let mut parameters = Vec::new();
    while let Some(node) = nodes.get(*ix) {
        match node.as_word() {
            Some(w) if w.value.starts_with(':') => {
                parameters.push(w.value[1..].to_string());
                *ix += 1;
            }
            _ => break,
        }
    }

    let body_start = *ix;
    while let Some(node) = nodes.get(*ix) {
        if node.as_word().is_some_and(|w| w.matches(KEYWORD_END)) {
            let body = nodes[body_start..*ix].to_vec();
            *ix += 1;
            return Ok(InterpretedProcedure {
                name,
                parameters,
                body,
                source: String::new(),
                buried: Cell::new(false),
            });
        }
        *ix += 1;
    }

    Err(Error::new(ErrorKind::KeywordExpected(
        KEYWORD_END.to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_read_procedure() {
        let nodes = parse("TO sq :n OUTPUT :n * :n END").unwrap();
        let mut ix = 0;
        let proc = read_procedure(&nodes, &mut ix).unwrap();
        assert_eq!(proc.name, "SQ");
        assert_eq!(proc.parameters, ["n"]);
        assert_eq!(proc.body.len(), 5);
        assert_eq!(ix, nodes.len());
    }

    #[test]
    fn test_read_procedure_no_params() {
        let nodes = parse("TO g END").unwrap();
        let mut ix = 0;
        let proc = read_procedure(&nodes, &mut ix).unwrap();
        assert_eq!(proc.name, "G");
        assert!(proc.parameters.is_empty());
        assert!(proc.body.is_empty());
    }

    #[test]
    fn test_unterminated_definition() {
        let nodes = parse("TO f :x PRINT :x").unwrap();
        let mut ix = 0;
        let err = read_procedure(&nodes, &mut ix).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeywordExpected("END".to_string()));
    }

    #[test]
    fn test_end_matching_is_case_insensitive() {
        let nodes = parse("to g print 1 end").unwrap();
        let mut ix = 0;
        let proc = read_procedure(&nodes, &mut ix).unwrap();
        assert_eq!(proc.name, "G");
        assert_eq!(proc.body.len(), 2);
    }
}
