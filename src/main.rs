//! Scout - terminal client for a streaming deep-research agent

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use scout::{cli, config, interrupt, project, run_loop};

fn main() -> ExitCode {
    match run() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = cli::Args::parse_args();

    match args.command {
        Some(cli::Command::Init) => {
            project::init()?;
            Ok(ExitCode::SUCCESS)
        }
        Some(cli::Command::Ask { question, run }) => {
            interrupt::register_signal_handler()?;
            let file = project::discover()?;
            let config = config::RunConfig::resolve(&run.overrides(), &file)?;
            let engine = config::resolve_engine(&run.engine, &file);

            run_loop::run_once(&question, &config, &engine, run.log)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(cli::Command::Chat { run }) => {
            interrupt::register_signal_handler()?;
            let file = project::discover()?;
            let config = config::RunConfig::resolve(&run.overrides(), &file)?;
            let engine = config::resolve_engine(&run.engine, &file);

            run_loop::run_chat(&config, &engine, run.log)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            // Bare `scout` with no subcommand prints help
            cli::Args::parse_from(["scout", "--help"]);
            Ok(ExitCode::SUCCESS)
        }
    }
}
