// tabletalk CLI - talk to spreadsheets in plain language
// Uploads an Excel workbook to the query service, then turns prompts
// into SQL and prints the rows.

mod clipboard;
mod commands;
mod exit_codes;
mod render;
mod shell;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "ttalk")]
#[command(about = "Ask questions about Excel data in plain language")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Base URL of the query service (overrides settings.json)
    #[arg(long, global = true, env = "TABLETALK_API_BASE")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an Excel workbook and start a session
    #[command(after_help = "\
Examples:
  ttalk upload sales.xlsx
  ttalk upload regions.xls --json")]
    Upload {
        /// Path to the .xlsx or .xls file
        file: PathBuf,

        /// Print the raw JSON response instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Ask a question about the uploaded data
    #[command(after_help = "\
Examples:
  ttalk ask 'Show me the top 5 products by revenue'
  ttalk ask 'What is the average price?' --copy
  ttalk ask 'List customers from New York' --json | jq '.data'")]
    Ask {
        /// Natural-language prompt (words are joined, quoting optional)
        #[arg(required = true)]
        prompt: Vec<String>,

        /// Print the raw JSON response instead of a table
        #[arg(long)]
        json: bool,

        /// Copy the generated SQL to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Show the automatic summary of the current session's data
    Summary {
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,

        /// Re-run the summary query instead of using the cached one
        #[arg(long)]
        refresh: bool,
    },

    /// Show the current session, if any
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the current session on the server and forget it locally
    Reset,

    /// Interactive prompt loop against the current session
    Shell,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: ttalk <command> [options]");
            eprintln!("       ttalk --help for more information");
            Ok(())
        }
        Some(Commands::Upload { file, json }) => commands::cmd_upload(cli.api_base, file, json),
        Some(Commands::Ask { prompt, json, copy }) => {
            commands::cmd_ask(cli.api_base, prompt.join(" "), json, copy)
        }
        Some(Commands::Summary { json, refresh }) => {
            commands::cmd_summary(cli.api_base, json, refresh)
        }
        Some(Commands::Status { json }) => commands::cmd_status(json),
        Some(Commands::Reset) => commands::cmd_reset(cli.api_base),
        Some(Commands::Shell) => shell::cmd_shell(cli.api_base),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn with_code(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn usage_error_carries_exit_code() {
        let err = CliError::usage("bad file").with_hint("expected .xlsx or .xls");
        assert_eq!(err.code, EXIT_USAGE);
        assert_eq!(err.hint.as_deref(), Some("expected .xlsx or .xls"));
    }
}
