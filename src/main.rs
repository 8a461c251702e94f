use clap::Parser;
use rlogo::config::{
    default_prefix, GREETING, HISTORY_FILE, PROMPT_PRIMARY, PROMPT_SECONDARY, VERSION,
};
use rlogo::highlighter::LogoHelper;
use rlogo::workspace::{ReplMode, Workspace, WorkspaceConfig};
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// Classic Logo interpreter
#[derive(Parser, Debug)]
#[command(name = "rlogo")]
#[command(version = VERSION)]
#[command(about = "A classic Logo interpreter")]
#[command(long_about = "A classic Logo interpreter: dynamic scope, workspace \
management, and a line-oriented REPL with TO ... END procedure definitions")]
struct CliArgs {
    /// Screen width in pixels (0 or absent means full screen)
    #[arg(value_name = "WIDTH")]
    width: Option<u32>,

    /// Screen height in pixels (0 or absent means full screen)
    #[arg(value_name = "HEIGHT")]
    height: Option<u32>,

    /// Evaluate a Logo source file before entering the REPL
    #[arg(long = "load", value_name = "FILE")]
    load: Option<PathBuf>,

    /// Workspace prefix directory (default: $HOME/logo)
    #[arg(long = "prefix", value_name = "DIR")]
    prefix: Option<PathBuf>,

    /// Enable call tracing from startup
    #[arg(long = "trace")]
    trace: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config = WorkspaceConfig {
        prefix: args.prefix.unwrap_or_else(default_prefix),
        trace: args.trace,
        screen: (args.width.unwrap_or(0), args.height.unwrap_or(0)),
    };
    let mut ws = Workspace::new(config)?;

    if let Some(path) = &args.load {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        if let Err(e) = ws.read_source(&source) {
            eprintln!("{}", e);
        }
    }

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<LogoHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(rl_config).map_err(|e| format!("Failed to initialize REPL: {}", e))?;
    rl.set_helper(Some(LogoHelper::new()));
    let _ = rl.load_history(HISTORY_FILE);

    ws.print(GREETING);

    loop {
        let prompt = match ws.mode() {
            ReplMode::Normal => PROMPT_PRIMARY,
            ReplMode::Defining | ReplMode::Continuation => PROMPT_SECONDARY,
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if let Err(e) = ws.feed_line(&line) {
                    println!("{}", e);
                }
                if ws.quit_requested() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                ws.cancel_pending();
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}
