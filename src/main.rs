use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::tty::IsTty;

use csh::eval::{LineEditor, LineSource, StreamReader};
use csh::exec::{platform_launcher, BuiltinTable};
use csh::state::Configuration;
use csh::Shell;

/// A minimal interactive command interpreter
#[derive(Parser, Debug)]
#[command(name = "csh", version, about)]
struct Cli {
    /// Read settings from this file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Never use the line editor, even when standard input is a terminal
    #[arg(long)]
    plain: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", Configuration::default().program_name, e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", config.program_name, e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut config = match &cli.config {
        Some(path) => Configuration::from_file(path).context("could not load configuration")?,
        None => Configuration::default(),
    };

    if cli.plain {
        config.line_editing = false;
    }

    Ok(config)
}

fn run(config: &Configuration) -> Result<()> {
    // The table is built once and only ever read afterwards
    let builtins = BuiltinTable::default();
    let shell = Shell::new(config, &builtins, platform_launcher(&config.program_name));

    // The line editor only makes sense when a person is typing
    let mut source: Box<dyn LineSource> = if config.line_editing && io::stdin().is_tty() {
        Box::new(LineEditor::new()?)
    } else {
        Box::new(StreamReader::new(io::stdin().lock(), io::stdout()))
    };

    shell.run(source.as_mut(), &mut io::stdout(), &mut io::stderr())?;
    Ok(())
}

/// Logs go to stderr, and only when `RUST_LOG` asks for them
fn initialize_tracing() {
    use tracing_subscriber::prelude::*;

    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if let Err(err) = init_result {
        tracing::warn!(error = %err, "tracing already initialized; skipping setup");
    }
}
