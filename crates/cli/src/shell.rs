//! Interactive prompt loop.
//!
//! Unlike the one-shot subcommands, the shell keeps a [`QuerySession`]
//! alive in memory, so results, the data summary, and validation errors
//! accumulate the way they do in a long-lived client. Plain input lines
//! are submitted as prompts; lines starting with `:` are shell commands.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use tabletalk_client::{QuerySession, StoredSession, SAMPLE_PROMPTS};

use crate::{clipboard, commands, render, CliError};

const HELP: &str = "\
commands:
  :upload <file>   upload an .xlsx/.xls file and start a session
  :summary         show the data summary for the current session
  :copy            copy the last generated SQL to the clipboard
  :clear           clear the prompt, result, and error
  :reset           delete the session on the server and start over
  :help            show this help
  :quit            exit the shell
anything else is sent to the service as a prompt";

pub fn cmd_shell(api_base: Option<String>) -> Result<(), CliError> {
    let client = commands::build_client(api_base);
    let mut session = match StoredSession::load() {
        Some(stored) if stored.api_base == client.api_base() => {
            println!("resuming session on table {}", stored.table_name);
            QuerySession::resume(client, stored.session_id, stored.table_name)
        }
        _ => {
            println!("no active session; start with :upload <file>");
            QuerySession::new(client)
        }
    };

    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("ttalk> ");
            let _ = io::stdout().flush();
        }
        let Some(line) = lines.next() else { break };
        let line = match line {
            Ok(l) => l,
            Err(e) => return Err(CliError::with_code(1, format!("stdin: {}", e))),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            if !run_command(&mut session, command) {
                break;
            }
        } else {
            session.set_prompt(line);
            session.submit();
            report(&session);
        }
    }
    Ok(())
}

/// Execute a `:command` line. Returns false when the shell should exit.
fn run_command(session: &mut QuerySession, command: &str) -> bool {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    match name {
        "quit" | "q" | "exit" => return false,
        "help" => println!("{}", HELP),
        "upload" => {
            if arg.is_empty() {
                println!("usage: :upload <file>");
            } else {
                session.upload(Path::new(arg));
                report_upload(session);
            }
        }
        "summary" => match session.summary() {
            Some(summary) => print!("{}", render::render_summary(summary)),
            None => {
                session.analyze();
                match session.summary() {
                    Some(summary) => print!("{}", render::render_summary(summary)),
                    None => println!("no summary available"),
                }
            }
        },
        "copy" => match session.copy_sql(Instant::now()) {
            Some(sql) => match clipboard::copy(&sql) {
                Ok(()) => println!("SQL copied to clipboard"),
                Err(e) => println!("copy failed: {}", e),
            },
            None => println!("nothing to copy yet"),
        },
        "clear" => session.clear(),
        "reset" => {
            session.reset();
            if let Err(e) = StoredSession::delete() {
                log::warn!("could not remove session file: {}", e);
            }
            println!("session cleared");
        }
        other => println!("unknown command :{} (try :help)", other),
    }
    true
}

/// Print the outcome of an upload, persist the session, and suggest
/// starting prompts.
fn report_upload(session: &QuerySession) {
    if let Some(error) = session.error() {
        println!("error: {}", error);
        return;
    }
    if let Some(message) = session.upload_message() {
        println!("{}", message);
    }
    if let (Some(id), Some(table)) = (session.session_id(), session.table_name()) {
        let mut stored = StoredSession::new(
            id.to_string(),
            table.to_string(),
            session.client().api_base().to_string(),
        );
        stored.summary = session.summary().cloned();
        if let Err(e) = stored.save() {
            log::warn!("could not persist session: {}", e);
        }
    }
    if let Some(summary) = session.summary() {
        println!();
        print!("{}", render::render_summary(summary));
    }
    println!("\ntry asking:");
    for prompt in SAMPLE_PROMPTS {
        println!("  - {}", prompt);
    }
}

/// Print the outcome of a submitted prompt.
fn report(session: &QuerySession) {
    if let Some(error) = session.error() {
        println!("error: {}", error);
        return;
    }
    if let Some(result) = session.result() {
        println!("{}", render::render_result(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tabletalk_api_client::TableClient;

    fn session_for(server: &MockServer) -> QuerySession {
        QuerySession::resume(
            TableClient::new(server.base_url()),
            "s-1".to_string(),
            "sales".to_string(),
        )
    }

    #[test]
    fn plain_line_runs_a_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body_includes(r#"{"prompt": "total revenue", "session_id": "s-1"}"#);
            then.status(200)
                .json_body(serde_json::json!({"sql": "SELECT SUM(revenue) FROM sales", "data": []}));
        });
        let mut session = session_for(&server);
        session.set_prompt("total revenue");
        session.submit();
        mock.assert();
        assert!(session.error().is_none());
    }

    #[test]
    fn quit_stops_the_loop() {
        let server = MockServer::start();
        let mut session = session_for(&server);
        assert!(!run_command(&mut session, "quit"));
        assert!(!run_command(&mut session, "q"));
        assert!(run_command(&mut session, "help"));
    }

    #[test]
    fn unknown_command_keeps_running() {
        let server = MockServer::start();
        let mut session = session_for(&server);
        assert!(run_command(&mut session, "frobnicate"));
    }

    #[test]
    fn clear_keeps_the_session() {
        let server = MockServer::start();
        let mut session = session_for(&server);
        session.set_prompt("stale");
        assert!(run_command(&mut session, "clear"));
        assert_eq!(session.prompt(), "");
        assert_eq!(session.session_id(), Some("s-1"));
    }
}
