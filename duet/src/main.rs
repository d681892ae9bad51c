//! Command-line front end for the duet interpreter.
//!
//! Loads a program file, runs it in the requested mode, and prints the answer
//! on stdout. Failures print the error chain on stderr and exit with a code
//! from [`duet::exit_codes`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use duet::core::budget::RunError;
use duet::core::scheduler::Policy;
use duet::exit_codes;
use duet::io::config::{DEFAULT_CONFIG_PATH, DuetConfig, load_config, write_config};
use duet::io::program_file::load_program;
use duet::pair::run_pair;
use duet::recover::{Recovery, run_recover};

#[derive(Parser)]
#[command(name = "duet", version, about = "Interpreter for duet assembly programs")]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default config file if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Decode a program and print its canonical listing.
    Check { program: PathBuf },
    /// Run one machine in sound mode and print the first recovered frequency.
    Recover {
        program: PathBuf,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run two paired machines and print how many values program 1 sent.
    #[command(alias = "duet")]
    Pair {
        program: PathBuf,
        /// Scheduling policy (`alternate` or `burst`); overrides the config.
        #[arg(long)]
        policy: Option<Policy>,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    duet::logging::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Check { program } => cmd_check(&program),
        Command::Recover { program, json } => cmd_recover(&cli.config, &program, json),
        Command::Pair {
            program,
            policy,
            json,
        } => cmd_pair(&cli.config, &program, policy, json),
    }
}

/// Map typed run failures to their exit codes; everything else is invalid input.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::Arithmetic(_)) => exit_codes::FAULT,
        Some(RunError::StepLimit { .. }) => exit_codes::STEP_LIMIT,
        None => exit_codes::INVALID,
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !force && config_path.exists() {
        info!(path = %config_path.display(), "config already exists");
        return Ok(exit_codes::OK);
    }
    write_config(config_path, &DuetConfig::default())
        .with_context(|| format!("write {}", config_path.display()))?;
    Ok(exit_codes::OK)
}

fn cmd_check(program_path: &Path) -> Result<i32> {
    let program = load_program(program_path)?;
    for (index, instruction) in program.iter().enumerate() {
        println!("{index:>4}  {instruction}");
    }
    Ok(exit_codes::OK)
}

fn cmd_recover(config_path: &Path, program_path: &Path, json: bool) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let program = load_program(program_path)?;
    let recovery = run_recover(&program, cfg.max_steps)
        .with_context(|| format!("recover {}", program_path.display()))?;

    if json {
        print_json(&recovery)?;
    }
    match recovery {
        Recovery::Recovered { frequency, .. } => {
            if !json {
                println!("{frequency}");
            }
            Ok(exit_codes::OK)
        }
        Recovery::Halted { .. } => {
            eprintln!("program halted without recovering a frequency");
            Ok(exit_codes::NOT_RECOVERED)
        }
    }
}

fn cmd_pair(
    config_path: &Path,
    program_path: &Path,
    policy: Option<Policy>,
    json: bool,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let program = load_program(program_path)?;
    let mut schedule = cfg.scheduler;
    if let Some(policy) = policy {
        schedule.policy = policy;
    }
    let report = run_pair(&program, schedule, cfg.max_steps)
        .with_context(|| format!("run pair {}", program_path.display()))?;

    if json {
        print_json(&report)?;
    } else {
        println!("{}", report.program_one_sent());
    }
    Ok(exit_codes::OK)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize report")?;
    println!("{payload}");
    Ok(())
}
