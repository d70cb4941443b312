//! Engine process spawning and streaming.
//!
//! The engine is any command that reads one JSON run request from stdin and
//! emits NDJSON lifecycle events on stdout until the run completes. This
//! module owns the subprocess lifecycle and pumps each stdout line into the
//! session, one at a time, in delivery order.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::interrupt;
use crate::output::formatter;
use crate::session::{RunRequest, Session};

use super::parser::{self, WireUpdate};

/// How one streamed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stream reached EOF and the engine exited cleanly.
    Finished,
    /// The user interrupted; the engine was killed mid-stream.
    Cancelled,
}

/// Split the configured engine command string into argv.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let argv = shlex::split(command)
        .with_context(|| format!("Failed to parse engine command '{}'", command))?;
    if argv.is_empty() {
        bail!("engine command is empty");
    }
    Ok(argv)
}

/// Spawn the engine, hand it the request, and stream its output into the
/// session until EOF or interrupt. The caller owns the loading flag; this
/// function only moves events and transcript updates.
pub fn run(
    command: &str,
    request: &RunRequest,
    session: &mut Session,
    log_file: Option<&str>,
) -> Result<RunOutcome> {
    let argv = split_command(command)?;

    let mut child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn engine '{}'. Is it installed and in PATH?", argv[0]))?;

    // Hand the request over and close stdin so the engine starts the run.
    {
        let mut stdin = child.stdin.take().context("Failed to open engine stdin")?;
        let payload = serde_json::to_string(request).context("Failed to encode run request")?;
        stdin
            .write_all(payload.as_bytes())
            .and_then(|_| stdin.write_all(b"\n"))
            .context("Failed to write run request to engine")?;
    }

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;
    let stderr_thread = drain_stderr(stderr);

    let outcome = pump(stdout, session, log_file)?;

    if outcome == RunOutcome::Cancelled {
        let _ = child.kill();
        let _ = child.wait();
        let _ = stderr_thread.join();
        return Ok(RunOutcome::Cancelled);
    }

    let status = child.wait().context("Failed to wait for engine process")?;
    let stderr_output = stderr_thread.join().unwrap_or_default();

    if !status.success() {
        if stderr_output.is_empty() {
            bail!("engine exited with status: {}", status);
        } else {
            bail!("engine exited with status: {}\nstderr: {}", status, stderr_output);
        }
    } else if !stderr_output.is_empty() {
        eprintln!("{}", stderr_output);
    }

    Ok(RunOutcome::Finished)
}

/// Read stdout line by line, apply each update to the session, and render
/// newly classified activities. Non-JSON noise on stdout is skipped; the
/// interrupt flag is polled between lines.
fn pump<R: Read>(reader: R, session: &mut Session, log_file: Option<&str>) -> Result<RunOutcome> {
    let mut log_handle = log_file
        .map(File::create)
        .transpose()
        .context("Failed to create log file")?;

    let buf_reader = BufReader::new(reader);
    for line in buf_reader.lines() {
        if interrupt::is_interrupted() {
            return Ok(RunOutcome::Cancelled);
        }

        let line = line.context("Failed to read engine output")?;
        if let Some(handle) = log_handle.as_mut() {
            let _ = writeln!(handle, "{}", line);
        }

        match parser::parse_line(&line) {
            Ok(Some(WireUpdate::Event(event))) => {
                if let Some(activity) = session.ingest(&event) {
                    formatter::print_activity(&activity);
                }
            }
            Ok(Some(WireUpdate::Messages(messages))) => session.replace_messages(messages),
            Ok(None) => {}
            Err(_) => {} // stray non-JSON line; not ours to diagnose
        }
    }

    Ok(RunOutcome::Finished)
}

/// Drain stderr on a separate thread so the engine can't block on a full
/// pipe; the collected output is reported after the process exits.
fn drain_stderr<R: Read + Send + 'static>(stderr: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut output = String::new();
        let mut reader = BufReader::new(stderr);
        let _ = reader.read_to_string(&mut output);
        output.trim().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_handles_plain_binary() {
        assert_eq!(split_command("scout-engine").unwrap(), ["scout-engine"]);
    }

    #[test]
    fn split_command_handles_args_and_quotes() {
        let argv = split_command("python -m engine --config 'my file.toml'").unwrap();
        assert_eq!(argv, ["python", "-m", "engine", "--config", "my file.toml"]);
    }

    #[test]
    fn split_command_rejects_empty() {
        assert!(split_command("").is_err());
        assert!(split_command("   ").is_err());
    }

    #[test]
    fn pump_applies_recorded_stream() {
        use crate::config::RunConfig;

        let mut session = Session::new();
        session
            .submit(
                "q",
                &RunConfig {
                    query_generator_model: "m".into(),
                    reflection_model: "m".into(),
                    answer_model: "m".into(),
                    initial_search_query_count: 1,
                    max_research_loops: 1,
                    thinking: false,
                },
            )
            .unwrap();
        session.set_loading(true);

        let stream = concat!(
            "{\"event_type\": \"chain_start\", \"name\": \"generate_query\"}\n",
            "not json at all\n",
            "{\"messages\": [{\"id\": \"m1\", \"role\": \"ai\", \"content\": \"done\"}]}\n",
            "{\"event_type\": \"chain_start\", \"name\": \"finalize_answer\"}\n",
        );
        let outcome = pump(stream.as_bytes(), &mut session, None).unwrap();

        assert_eq!(outcome, RunOutcome::Finished);
        assert_eq!(session.timeline().len(), 2);
        assert!(session.is_finalized());

        session.set_loading(false);
        assert_eq!(session.history_for("m1").unwrap().len(), 2);
    }
}
