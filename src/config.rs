// ABOUTME: Configuration and constants for the Logo interpreter

use std::path::PathBuf;

pub const VERSION: &str = "1.0.0";

pub const GREETING: &str = "\nWelcome to Logo\n";
pub const FAREWELL: &str = "Seeya!\n\n";

pub const PROMPT_PRIMARY: &str = "? ";
pub const PROMPT_SECONDARY: &str = "> ";

/// REPL history, stored in the directory the interpreter was started in.
pub const HISTORY_FILE: &str = ".logo_history";

/// The workspace prefix: where LOAD, SAVE and CATALOG operate by
/// default.
pub fn default_prefix() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join("logo"),
        None => PathBuf::from("logo"),
    }
}
