//! One-shot and interactive run drivers.
//!
//! Glue between the session core and its collaborators: reads user input,
//! submits runs, spawns the engine, and renders the result. All timeline
//! logic lives in `session`; this module only sequences it.

use anyhow::Result;
use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use crate::config::RunConfig;
use crate::engine::client::{self, RunOutcome};
use crate::interrupt;
use crate::output::{formatter, logger};
use crate::session::Session;

/// Answer a single question and exit.
pub fn run_once(question: &str, config: &RunConfig, engine: &str, log: bool) -> Result<()> {
    let mut session = Session::new();
    formatter::print_user_message(question.trim());
    run_turn(&mut session, question, config, engine, log)
}

/// Interactive chat: one run per input line until `exit`, `quit`, or EOF.
pub fn run_chat(config: &RunConfig, engine: &str, log: bool) -> Result<()> {
    let mut session = Session::new();

    loop {
        interrupt::clear_interrupt();

        let Some(line) = read_user_line()? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "exit" || text == "quit" {
            break;
        }

        run_turn(&mut session, text, config, engine, log)?;
    }

    Ok(())
}

/// Submit one turn, stream it to completion, and render the outcome.
fn run_turn(
    session: &mut Session,
    text: &str,
    config: &RunConfig,
    engine: &str,
    log: bool,
) -> Result<()> {
    let request = session.submit(text, config)?;
    let log_file = log.then(logger::setup_log_file);

    session.set_loading(true);
    let result = client::run(engine, &request, session, log_file.as_deref());
    session.set_loading(false);

    match result {
        Ok(RunOutcome::Finished) => render_finished(session),
        Ok(RunOutcome::Cancelled) => {
            // A partial timeline can't be proven complete; discard the lot.
            session.reset();
            formatter::print_cancelled();
        }
        Err(err) => {
            // Stream died without a terminal activity: nothing was archived,
            // and the run stays visibly stopped rather than completed.
            formatter::print_error(&format!("{:#}", err));
            formatter::print_run_stopped();
        }
    }

    Ok(())
}

/// Render the answer and its archived timeline after a clean EOF.
fn render_finished(session: &Session) {
    let Some(message) = session.messages().last().filter(|m| m.is_agent()).cloned() else {
        formatter::print_run_stopped();
        return;
    };

    formatter::print_agent_message(&message);

    if let Some(timeline) = message
        .id
        .as_deref()
        .and_then(|id| session.history_for(id))
    {
        formatter::print_timeline_recap(timeline);
    } else if session.is_finalized() {
        // Terminal activity observed but the answer wasn't archivable
        // (usually a missing message id). Diagnostic only; never fatal.
        formatter::print_error("answer arrived without an id; timeline not archived");
    }
}

/// Read one line of input, prompting when attached to a terminal.
/// Returns `None` on EOF.
fn read_user_line() -> Result<Option<String>> {
    if io::stdin().is_terminal() {
        print!("{} {} ", "you".cyan(), "->".dimmed());
        io::stdout().flush()?;
    }

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
