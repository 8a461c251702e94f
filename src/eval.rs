// ABOUTME: Expression evaluator, call dispatch and instruction-list evaluation

use crate::error::{Error, ErrorKind};
use crate::frame::{no_interpreted_frame, CallResult, Frame, Signal};
use crate::node::{Node, Pos, Word, KEYWORD_GO, KEYWORD_LABEL, KEYWORD_THING};
use crate::procedure::{InterpretedProcedure, Procedure};
use crate::workspace::Workspace;

/// Forward-only position over a node slice. `GO` repositions it via
/// [`Cursor::jump`].
pub struct Cursor<'a> {
    items: &'a [Node],
    ix: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(items: &'a [Node]) -> Self {
        Cursor { items, ix: 0 }
    }

    pub fn peek(&self) -> Option<&'a Node> {
        self.items.get(self.ix)
    }

    pub fn peek_ahead(&self) -> Option<&'a Node> {
        self.items.get(self.ix + 1)
    }

    pub fn advance(&mut self) {
        self.ix += 1;
    }

    pub fn jump(&mut self, ix: usize) {
        self.ix = ix;
    }
}

/// Infix operator table: symbol, the primitive it rewrites to, and its
/// precedence (higher binds tighter). Parenthesised groups are built by
/// the parser, so no bracketing operators appear here.
const INFIX_OPS: [(&str, &str, u8); 12] = [
    ("+", "SUM", 1),
    ("-", "DIFFERENCE", 1),
    ("*", "PRODUCT", 2),
    ("/", "QUOTIENT", 2),
    ("=", "EQUALP", 0),
    ("<>", "NOTEQUALP", 0),
    ("<", "LESSP", 0),
    (">", "GREATERP", 0),
    ("<=", "LESSEQUALP", 0),
    (">=", "GREATEREQUALP", 0),
    ("OR", "EITHER", 0),
    ("AND", "BOTH", 0),
];

fn infix_op(value: &str) -> Option<(&'static str, u8)> {
    if value.len() > 3 {
        return None;
    }
    INFIX_OPS
        .iter()
        .find(|(sym, _, _)| value.eq_ignore_ascii_case(sym))
        .map(|&(_, proc_name, prec)| (proc_name, prec))
}

/// What the previous expression token was; drives the unary-minus rule.
#[derive(Clone, Copy, PartialEq)]
enum Prev {
    Nothing,
    Operator,
    Operand,
}

/// Evaluate one expression starting at the cursor, leaving the cursor
/// just past it. Maintains an operand stack and an operator stack;
/// operators are applied as synthesised calls to their primitives with
/// operands in left-to-right order.
pub fn evaluate_expression(ws: &mut Workspace, cur: &mut Cursor) -> CallResult {
    let mut operands: Vec<Node> = Vec::new();
    let mut ops: Vec<(String, Pos)> = Vec::new();
    let mut expect_op = false;
    let mut prev = Prev::Nothing;

    loop {
        let Some(node) = cur.peek() else { break };
        match node {
            // A list terminates an expression; it is data, not a call.
            Node::List(_) => break,
            Node::Group(g) => {
                if expect_op {
                    break;
                }
                cur.advance();
                match eval_node_stream(ws, &g.items, true)? {
                    Signal::Value(v) => {
                        operands.push(v);
                        expect_op = true;
                    }
                    Signal::None => {}
                    sig => return Ok(sig),
                }
                prev = Prev::Operand;
            }
            Node::Word(w) => {
                if let Some((_, prec)) = infix_op(&w.value) {
                    let unary = w.value == "-" && prev != Prev::Operand && cur.peek_ahead().is_some();
                    if unary {
                        let pos = w.pos;
                        cur.advance();
                        match unary_operand(ws, cur)? {
                            Signal::Value(v) => {
                                let n = v.to_number()?;
                                operands.push(Node::number(0.0 - n));
                                expect_op = true;
                            }
                            Signal::None => {
                                return Err(Error::not_enough_inputs("-", pos));
                            }
                            sig => return Ok(sig),
                        }
                        prev = Prev::Operand;
                    } else {
                        loop {
                            let Some((top, _)) = ops.last() else { break };
                            let (_, top_prec) = infix_op(top).expect("ops stack holds operators");
                            if top_prec < prec {
                                break;
                            }
                            let (sym, sym_pos) = ops.pop().expect("just peeked");
                            if let Some(sig) = apply_operator(ws, &sym, sym_pos, &mut operands)? {
                                return Ok(sig);
                            }
                        }
                        ops.push((w.value.clone(), w.pos));
                        cur.advance();
                        expect_op = false;
                        prev = Prev::Operator;
                    }
                } else if w.literal {
                    if expect_op {
                        break;
                    }
                    operands.push(node.clone());
                    cur.advance();
                    expect_op = true;
                    prev = Prev::Operand;
                } else {
                    if expect_op {
                        break;
                    }
                    match call_procedure(ws, cur, true)? {
                        Signal::Value(v) => {
                            operands.push(v);
                            expect_op = true;
                        }
                        Signal::None => {}
                        sig => return Ok(sig),
                    }
                    prev = Prev::Operand;
                }
            }
        }
    }

    while let Some((sym, pos)) = ops.pop() {
        if let Some(sig) = apply_operator(ws, &sym, pos, &mut operands)? {
            return Ok(sig);
        }
    }

    match operands.pop() {
        Some(v) if operands.is_empty() => Ok(Signal::Value(v)),
        _ => Ok(Signal::None),
    }
}

/// The operand of a unary minus: a group's value, or, for a word, the
/// value of the whole expression evaluated from that point.
fn unary_operand(ws: &mut Workspace, cur: &mut Cursor) -> CallResult {
    match cur.peek() {
        None => Ok(Signal::None),
        Some(Node::Group(g)) => {
            let items = &g.items;
            cur.advance();
            eval_node_stream(ws, items, true)
        }
        Some(n @ Node::List(_)) => Err(Error::number_expected(n)),
        Some(Node::Word(_)) => evaluate_expression(ws, cur),
    }
}

/// Pop the top two operands and apply an infix operator to them as a
/// call to its primitive. Returns an unwind signal, if the call raised
/// one, to be propagated by the caller.
fn apply_operator(
    ws: &mut Workspace,
    sym: &str,
    pos: Pos,
    operands: &mut Vec<Node>,
) -> Result<Option<Signal>, Error> {
    let (proc_name, _) = infix_op(sym).expect("ops stack holds operators");
    if operands.len() < 2 {
        return Err(Error::not_enough_inputs(proc_name, pos));
    }
    let right = operands.pop().expect("checked length");
    let left = operands.pop().expect("checked length");
    let caller = Word::new(proc_name, false, pos);
    match call_with_args(ws, &caller, vec![left, right])? {
        Signal::Value(v) => {
            operands.push(v);
            Ok(None)
        }
        Signal::None => Ok(None),
        sig => Ok(Some(sig)),
    }
}

/// Evaluate a single node. With `with_infix`, a word enters the full
/// expression grammar; without it, a literal is itself and any other
/// word is a bare procedure call.
pub fn evaluate_node(ws: &mut Workspace, cur: &mut Cursor, with_infix: bool) -> CallResult {
    match cur.peek() {
        None => Ok(Signal::None),
        Some(Node::Word(w)) => {
            if with_infix {
                evaluate_expression(ws, cur)
            } else if w.literal {
                let value = Node::Word(w.clone());
                cur.advance();
                Ok(Signal::Value(value))
            } else {
                call_procedure(ws, cur, with_infix)
            }
        }
        Some(Node::Group(g)) => {
            let items = &g.items;
            cur.advance();
            eval_node_stream(ws, items, true)
        }
        Some(n @ Node::List(_)) => {
            let value = n.clone();
            cur.advance();
            Ok(Signal::Value(value))
        }
    }
}

/// Evaluate a sibling sequence of instructions. With `can_return` the
/// last produced value becomes the stream's value; without it any
/// produced value is a `ReturnValueUnused` error. Stop and Jump pass
/// through untouched.
pub fn eval_node_stream(ws: &mut Workspace, nodes: &[Node], can_return: bool) -> CallResult {
    let mut cur = Cursor::new(nodes);
    let mut last: Option<Node> = None;

    while let Some(node) = cur.peek() {
        // A list cannot head a statement; without this the expression
        // evaluator would stop in front of it forever.
        if node.is_list() {
            return Err(Error::word_expected(node));
        }
        ws.check_interrupt()?;
        match evaluate_expression(ws, &mut cur)? {
            Signal::Value(v) => {
                if !can_return {
                    return Err(Error::return_value_unused(&v));
                }
                last = Some(v);
            }
            Signal::None => {}
            sig => return Ok(sig),
        }
    }

    Ok(last.map_or(Signal::None, Signal::Value))
}

/// Evaluate a List (or Group) node used as a body: `REPEAT [...]`,
/// `IF cond [...]`, `RUN list`.
pub fn eval_instruction_list(ws: &mut Workspace, node: &Node, can_return: bool) -> CallResult {
    match node {
        Node::List(l) | Node::Group(l) => eval_node_stream(ws, &l.items, can_return),
        Node::Word(_) => Err(Error::list_expected(node)),
    }
}

/// Dispatch the call whose head word is at the cursor: resolve the
/// procedure, fetch its parameters, push a frame and run it.
pub fn call_procedure(ws: &mut Workspace, cur: &mut Cursor, with_infix: bool) -> CallResult {
    let Some(node) = cur.peek() else {
        return Err(Error::new(ErrorKind::WordExpected));
    };
    let Node::Word(head) = node else {
        return Err(Error::word_expected(node));
    };

    // :name is sugar for THING "name
    if let Some(tail) = head.value.strip_prefix(':') {
        let caller = Word::new(KEYWORD_THING, false, head.pos);
        let arg = Node::word(tail, true, head.pos);
        cur.advance();
        return call_with_args(ws, &caller, vec![arg]);
    }
    if head.literal {
        return Err(Error::at(ErrorKind::ProcedureExpected, node));
    }

    let name = head.upper();
    let Some(proc) = ws.find_procedure(&name) else {
        return Err(Error::at(
            ErrorKind::ProcedureNotFound(head.value.clone()),
            node,
        ));
    };
    cur.advance();

    let greedy = proc.variadic() && head.first_of_group;
    let params = if proc.param_count() > 0 || greedy {
        let want = if greedy { None } else { Some(proc.param_count()) };
        match fetch_parameters(ws, head, &name, cur, want, with_infix)? {
            Fetched::Params(p) => p,
            Fetched::Unwound(sig) => return Ok(sig),
        }
    } else {
        Vec::new()
    };

    // GO is resolved here rather than in its handler: it needs the
    // enclosing procedure's body to turn the label into a cursor index.
    if name == KEYWORD_GO {
        return go_to_label(ws, head, &params);
    }

    run_procedure(ws, proc, head, params)
}

/// Call a procedure directly with pre-evaluated arguments (synthesised
/// operator calls, the :name rewrite).
pub fn call_with_args(ws: &mut Workspace, caller: &Word, args: Vec<Node>) -> CallResult {
    let name = caller.upper();
    let Some(proc) = ws.find_procedure(&name) else {
        return Err(Error::at_pos(
            ErrorKind::ProcedureNotFound(caller.value.clone()),
            caller.pos,
        ));
    };
    run_procedure(ws, proc, caller, args)
}

enum Fetched {
    Params(Vec<Node>),
    Unwound(Signal),
}

/// Fetch procedure parameters from the cursor. Lists pass through as
/// data; everything else is evaluated. `want = None` consumes to the end
/// of the stream (variadic call in a group). IF's optional third list
/// argument is accepted when the next node is a List.
fn fetch_parameters(
    ws: &mut Workspace,
    caller: &Word,
    name: &str,
    cur: &mut Cursor,
    want: Option<usize>,
    with_infix: bool,
) -> Result<Fetched, Error> {
    let mut params = Vec::new();

    loop {
        if want.is_some_and(|n| params.len() == n) {
            break;
        }
        let Some(node) = cur.peek() else { break };
        match node {
            Node::List(_) => {
                params.push(node.clone());
                cur.advance();
            }
            _ => match evaluate_node(ws, cur, with_infix)? {
                Signal::Value(v) => params.push(v),
                Signal::None => {
                    return Err(Error::not_enough_inputs(&caller.value, caller.pos));
                }
                sig => return Ok(Fetched::Unwound(sig)),
            },
        }
    }

    if want.is_some_and(|n| params.len() < n) {
        return Err(Error::not_enough_inputs(&caller.value, caller.pos));
    }

    if name == "IF" && matches!(cur.peek(), Some(Node::List(_))) {
        params.push(cur.peek().expect("just matched").clone());
        cur.advance();
    }

    Ok(Fetched::Params(params))
}

fn run_procedure(ws: &mut Workspace, proc: Procedure, caller: &Word, params: Vec<Node>) -> CallResult {
    match proc {
        Procedure::Builtin(b) => {
            ws.push_frame(Frame::builtin(b.name, caller.clone()));
            let result = (b.func)(ws, &params);
            ws.pop_frame();
            result
        }
        Procedure::Interpreted(p) => {
            ws.trace_call(&p.name);
            ws.push_frame(Frame::interpreted(p.clone(), caller.clone()));
            for (param, value) in p.parameters.iter().zip(params) {
                ws.top_frame_mut().vars.set(param, value);
            }
            let result = run_body(ws, &p);
            let returned = ws.take_return_value();
            ws.pop_frame();
            result?;
            Ok(returned.map_or(Signal::None, Signal::Value))
        }
    }
}

/// Evaluate an interpreted procedure's body. Stop ends the body; Jump
/// repositions the cursor (GO); a stray value is an error.
fn run_body(ws: &mut Workspace, p: &InterpretedProcedure) -> Result<(), Error> {
    let mut cur = Cursor::new(&p.body);
    while let Some(node) = cur.peek() {
        if node.is_list() {
            return Err(Error::word_expected(node));
        }
        ws.check_interrupt()?;
        match evaluate_expression(ws, &mut cur)? {
            Signal::Value(v) => return Err(Error::return_value_unused(&v)),
            Signal::None => {}
            Signal::Stop => break,
            Signal::Jump(ix) => cur.jump(ix),
        }
        if ws.top_interpreted_stopped() {
            break;
        }
    }
    Ok(())
}

/// Resolve `GO tag` to a Jump signal indexing the matching `LABEL tag`
/// in the enclosing interpreted procedure's body.
fn go_to_label(ws: &mut Workspace, caller: &Word, params: &[Node]) -> CallResult {
    let tag_node = params.first().ok_or_else(|| {
        Error::not_enough_inputs(&caller.value, caller.pos)
    })?;
    let tag = tag_node.word_value()?.to_uppercase();

    let Some(procedure) = ws.enclosing_procedure() else {
        return Err(no_interpreted_frame(caller));
    };

    let body = &procedure.body;
    for ix in 0..body.len() {
        let is_label = body[ix]
            .as_word()
            .is_some_and(|w| !w.literal && w.matches(KEYWORD_LABEL));
        if !is_label {
            continue;
        }
        if let Some(next) = body.get(ix + 1).and_then(Node::as_word) {
            if next.upper() == tag {
                return Ok(Signal::Jump(ix));
            }
        }
    }

    Err(Error::at_pos(ErrorKind::UnknownLabel(tag), caller.pos))
}
