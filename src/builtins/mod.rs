//! # Built-in Primitives
//!
//! The ~100 Logo primitives, organized by category. Each category is a
//! sub-module with a register function that adds its primitives (and
//! their short aliases) to the workspace procedure map.
//!
//! - **[control]**: OUTPUT, STOP, REPEAT, IF, IFELSE, RUN, CATCH, THROW,
//!   GO, LABEL, TEST, IFTRUE, IFFALSE, WAIT, GOODBYE
//! - **[arithmetic]**: SUM, DIFFERENCE, PRODUCT, QUOTIENT, REMAINDER,
//!   MAXIMUM, MINIMUM, RANDOM, RND, SQRT, POW, SIN, COS, ARCTAN
//! - **[predicates]**: EQUALP, IS, NOTEQUALP, GREATERP, LESSP,
//!   GREATEREQUALP, LESSEQUALP, NUMBERP, ZEROP, WORDP, SENTENCEP,
//!   EMPTYP, MEMBERP
//! - **[logic]**: BOTH, EITHER, NOT
//! - **[words]**: WORD, SENTENCE, LIST, FPUT, LPUT, FIRST, LAST,
//!   BUTFIRST, BUTLAST, COUNT, ITEM
//! - **[variables]**: MAKE, THING, LOCAL, PPROP, GPROP, REMPROP, PLIST,
//!   PPS, ERPROPS
//! - **[console]**: PRINT, FPRINT, TYPE, FTYPE, READLIST, READCHAR,
//!   REQUEST
//! - **[workspace_ops]**: PO, POALL, PON, PONS, POPS, POT, POTS, ERALL,
//!   ERASE, ERN, ERNS, ERPS, BURY, BURYALL, BURYNAME, UNBURY, UNBURYALL,
//!   UNBURYNAME, TRACE, UNTRACE
//! - **[filesystem]**: LOAD, SAVE, SAVEL, CATALOG, PREFIX, SETPREFIX,
//!   CREATEDIR, ERASEFILE, FILEP, RENAME, POFILE

use crate::workspace::Workspace;

pub mod arithmetic;
pub mod console;
pub mod control;
pub mod filesystem;
pub mod logic;
pub mod predicates;
pub mod variables;
pub mod words;
pub mod workspace_ops;

/// Register every primitive in the workspace procedure map.
pub fn register_builtins(ws: &mut Workspace) {
    control::register(ws);
    arithmetic::register(ws);
    predicates::register(ws);
    logic::register(ws);
    words::register(ws);
    variables::register(ws);
    console::register(ws);
    workspace_ops::register(ws);
    filesystem::register(ws);
}
