// ABOUTME: Parser module turning Logo source text into word/list/group trees

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::char,
    combinator::recognize,
    sequence::preceded,
    IResult, Parser,
};

use crate::error::{Error, ErrorKind};
use crate::node::{ListNode, Node, Pos, Word};

const OPERATOR_CHARS: &str = "+-*/=<>";

/// One lexed token. Operators are ordinary (non-literal) word tokens;
/// brackets and parens drive the tree builder.
#[derive(Debug)]
enum Token {
    Word(Word),
    ListOpen(Pos),
    ListClose(Pos),
    GroupOpen(Pos),
    GroupClose(Pos),
}

/// Parse a complete source text into its top-level node sequence.
pub fn parse(source: &str) -> Result<Vec<Node>, Error> {
    let tokens = lex(source)?;
    let mut ix = 0;
    let nodes = build_nodes(&tokens, &mut ix, None)?;
    debug_assert_eq!(ix, tokens.len());
    Ok(nodes)
}

// ============================================================================
// Lexer
// ============================================================================

fn separators(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == ' ' || c == '\t' || c == '\r' || c == '\n')(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char(';'), take_while(|c| c != '\n'))).parse(input)
}

fn operator(input: &str) -> IResult<&str, &str> {
    // Two-character operators first so "<=" is not lexed as "<", "=".
    alt((
        tag("<="),
        tag(">="),
        tag("<>"),
        tag("+"),
        tag("-"),
        tag("*"),
        tag("/"),
        tag("="),
        tag("<"),
        tag(">"),
    ))
    .parse(input)
}

/// Step a position over consumed text.
fn advance(mut pos: Pos, consumed: &str) -> Pos {
    for c in consumed.chars() {
        if c == '\n' {
            pos.line += 1;
            pos.col = 1;
        } else {
            pos.col += 1;
        }
    }
    pos
}

fn skip_blank<'a>(mut rest: &'a str, pos: &mut Pos) -> &'a str {
    loop {
        let (r, ws) = separators(rest).expect("take_while cannot fail");
        if !ws.is_empty() {
            *pos = advance(*pos, ws);
            rest = r;
            continue;
        }
        if let Ok((r, text)) = comment(rest) {
            *pos = advance(*pos, text);
            rest = r;
            continue;
        }
        return rest;
    }
}

fn is_word_terminator(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n' || c == ';' || c == '[' || c == ']'
        || c == '(' || c == ')'
}

/// Accumulate one word starting at `input`. A leading `"` marks the word
/// literal and is stripped; `\` escapes the next character, letting it
/// join the word regardless of separator or operator status. Returns the
/// word value, its literal flag and the number of bytes consumed.
fn lex_word(input: &str, negative: bool) -> (String, bool, usize) {
    let mut value = String::new();
    let mut literal = false;
    let mut escaped = false;
    let mut end = input.len();

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            value.push(c);
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if i == 0 {
            // The driver only starts a word at a non-terminator; the lone
            // operator reaching here is the minus of a negative literal.
            if c == '"' {
                literal = true;
                continue;
            }
            if c.is_ascii_digit() || negative {
                literal = true;
            }
        } else if is_word_terminator(c) || OPERATOR_CHARS.contains(c) {
            end = i;
            break;
        }
        value.push(c);
    }

    (value, literal, end)
}

fn lex(source: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut pos = Pos::new(1, 1);
    // Tracks whether the previous token could be an operand (a numeric
    // literal, an identifier or a closing paren). This is what
    // disambiguates "x - 1" from "MAKE \"s -1".
    let mut prev_operand = false;

    loop {
        rest = skip_blank(rest, &mut pos);
        let Some(c) = rest.chars().next() else {
            return Ok(tokens);
        };
        let start = pos;

        match c {
            '[' => {
                tokens.push(Token::ListOpen(start));
                prev_operand = false;
                pos.col += 1;
                rest = &rest[1..];
            }
            ']' => {
                tokens.push(Token::ListClose(start));
                prev_operand = false;
                pos.col += 1;
                rest = &rest[1..];
            }
            '(' => {
                tokens.push(Token::GroupOpen(start));
                prev_operand = false;
                pos.col += 1;
                rest = &rest[1..];
            }
            ')' => {
                tokens.push(Token::GroupClose(start));
                prev_operand = true;
                pos.col += 1;
                rest = &rest[1..];
            }
            _ => {
                if let Ok((after, op)) = operator(rest) {
                    let negative = op == "-"
                        && !prev_operand
                        && after.chars().next().is_some_and(|c| c.is_ascii_digit());
                    if !negative {
                        tokens.push(Token::Word(Word::new(op, false, start)));
                        prev_operand = false;
                        pos = advance(pos, op);
                        rest = after;
                        continue;
                    }
                    let (value, literal, len) = lex_word(rest, true);
                    tokens.push(Token::Word(Word::new(value, literal, start)));
                    prev_operand = true;
                    pos = advance(pos, &rest[..len]);
                    rest = &rest[len..];
                    continue;
                }

                // A quoted string literal is not an operand for the
                // negative-number rule; numerals and identifiers are.
                let quoted = rest.starts_with('"');
                let (value, literal, len) = lex_word(rest, false);
                if !value.is_empty() || literal {
                    tokens.push(Token::Word(Word::new(value, literal, start)));
                }
                prev_operand = !quoted;
                pos = advance(pos, &rest[..len]);
                rest = &rest[len..];
            }
        }
    }
}

// ============================================================================
// Tree builder
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Closer {
    List,
    Group,
}

fn build_nodes(
    tokens: &[Token],
    ix: &mut usize,
    closer: Option<Closer>,
) -> Result<Vec<Node>, Error> {
    let mut items = Vec::new();

    while let Some(token) = tokens.get(*ix) {
        match token {
            Token::Word(w) => {
                items.push(Node::Word(w.clone()));
                *ix += 1;
            }
            Token::ListOpen(pos) => {
                *ix += 1;
                let children = build_nodes(tokens, ix, Some(Closer::List))?;
                items.push(Node::List(ListNode::new(children, *pos)));
            }
            Token::GroupOpen(pos) => {
                *ix += 1;
                let mut children = build_nodes(tokens, ix, Some(Closer::Group))?;
                if let Some(Node::Word(w)) = children.first_mut() {
                    w.first_of_group = true;
                }
                items.push(Node::Group(ListNode::new(children, *pos)));
            }
            Token::ListClose(pos) => {
                if closer == Some(Closer::List) {
                    *ix += 1;
                    return Ok(items);
                }
                return Err(Error::at_pos(ErrorKind::BadInput("]".to_string()), *pos));
            }
            Token::GroupClose(pos) => {
                if closer == Some(Closer::Group) {
                    *ix += 1;
                    return Ok(items);
                }
                return Err(Error::at_pos(ErrorKind::BadInput(")".to_string()), *pos));
            }
        }
    }

    if closer.is_some() {
        return Err(Error::new(ErrorKind::UnexpectedEof));
    }
    Ok(items)
}
