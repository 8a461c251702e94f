// ABOUTME: Syntax highlighter for the Logo REPL
// Implements rustyline's Highlighter trait to provide ANSI color codes
// for Logo syntax elements while preserving display width

use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::borrow::Cow;
use std::collections::HashSet;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_BRACKETS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_KEYWORD: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_PRIMITIVE: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_LITERAL: &str = "\x1b[32m"; // Green
const COLOR_VARIABLE: &str = "\x1b[33m"; // Yellow
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)

/// Main highlighter helper for the Logo REPL.
pub struct LogoHelper;

impl LogoHelper {
    pub fn new() -> Self {
        LogoHelper
    }
}

impl Default for LogoHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for LogoHelper {}

impl Completer for LogoHelper {
    type Candidate = String;
}

impl Hinter for LogoHelper {
    type Hint = String;
}

impl Validator for LogoHelper {}

impl Highlighter for LogoHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let keywords = get_keywords();
        let primitives = get_primitives();

        let highlighted = highlight_line(line, &keywords, &primitives);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn is_plain_word_char(c: char) -> bool {
    !c.is_whitespace() && !"[]()+-*/=<>;\":".contains(c)
}

fn push_colored(result: &mut String, color: &str, text: &str) {
    result.push_str(color);
    result.push_str(text);
    result.push_str(COLOR_RESET);
}

/// Tokenize a line and apply syntax highlighting.
fn highlight_line(
    line: &str,
    keywords: &HashSet<&'static str>,
    primitives: &HashSet<&'static str>,
) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Comments: everything from ; to end of line
            ';' => {
                let rest: String = chars[i..].iter().collect();
                push_colored(&mut result, COLOR_COMMENT, &rest);
                i = chars.len();
            }

            // Quoted literal words
            '"' => {
                let start = i;
                i += 1;
                while i < chars.len() && is_plain_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                push_colored(&mut result, COLOR_LITERAL, &word);
            }

            // Variable references
            ':' => {
                let start = i;
                i += 1;
                while i < chars.len() && is_plain_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                push_colored(&mut result, COLOR_VARIABLE, &word);
            }

            // Numbers
            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let number: String = chars[start..i].iter().collect();
                push_colored(&mut result, COLOR_NUMBER, &number);
            }

            // Brackets, parens and operators
            '[' | ']' | '(' | ')' | '+' | '-' | '*' | '/' | '=' | '<' | '>' => {
                push_colored(&mut result, COLOR_BRACKETS, &chars[i].to_string());
                i += 1;
            }

            c if c.is_whitespace() => {
                result.push(c);
                i += 1;
            }

            // Bare words: keywords, primitive names, user procedures
            _ => {
                let start = i;
                while i < chars.len() && is_plain_word_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let upper = word.to_uppercase();
                if keywords.contains(upper.as_str()) {
                    push_colored(&mut result, COLOR_KEYWORD, &word);
                } else if primitives.contains(upper.as_str()) {
                    push_colored(&mut result, COLOR_PRIMITIVE, &word);
                } else {
                    result.push_str(&word);
                }
            }
        }
    }

    result
}

/// Words with definition-level meaning to the REPL.
fn get_keywords() -> HashSet<&'static str> {
    ["TO", "END"].iter().copied().collect()
}

/// Primitive names worth highlighting at the prompt.
fn get_primitives() -> HashSet<&'static str> {
    [
        // Control
        "OUTPUT", "OP", "STOP", "REPEAT", "IF", "IFELSE", "RUN", "CATCH", "THROW", "GO", "LABEL",
        "TEST", "IFTRUE", "IFFALSE", "WAIT", "GOODBYE", "BYE",
        // Arithmetic
        "SUM", "DIFFERENCE", "DIFF", "PRODUCT", "QUOTIENT", "REMAINDER", "MOD", "MAXIMUM", "MAX",
        "MINIMUM", "MIN", "RANDOM", "RND", "SQRT", "POW", "SIN", "COS", "ARCTAN",
        // Predicates and logic
        "EQUALP", "IS", "NOTEQUALP", "GREATERP", "LESSP", "GREATEREQUALP", "LESSEQUALP",
        "NUMBERP", "ZEROP", "WORDP", "SENTENCEP", "EMPTYP", "MEMBERP", "BOTH", "AND", "EITHER",
        "OR", "NOT",
        // Words and lists
        "WORD", "SENTENCE", "SE", "LIST", "FPUT", "LPUT", "FIRST", "LAST", "BUTFIRST", "BUTLAST",
        "COUNT", "ITEM", "NTH",
        // Variables
        "MAKE", "THING", "LOCAL", "PPROP", "GPROP", "REMPROP", "PLIST", "PPS", "ERPROPS",
        // Console
        "PRINT", "PR", "FPRINT", "FP", "TYPE", "TY", "FTYPE", "FTY", "READLIST", "RL", "READCHAR",
        "RC", "REQUEST",
        // Workspace
        "PO", "POALL", "PON", "PONS", "POPS", "POT", "POTS", "ERALL", "ERASE", "ERN", "ERNS",
        "ERPS", "BURY", "BURYALL", "BURYNAME", "UNBURY", "UNBURYALL", "UNBURYNAME", "TRACE",
        "UNTRACE",
        // Files
        "LOAD", "SAVE", "SAVEL", "CATALOG", "PREFIX", "SETPREFIX", "CREATEDIR", "ERASEFILE",
        "FILEP", "RENAME", "POFILE",
    ]
    .iter()
    .copied()
    .collect()
}
