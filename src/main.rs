//! Enigma simulator.
//!
//! Usage: enigma CONFIG [INPUT [OUTPUT]]
//! INPUT defaults to stdin, OUTPUT to stdout. Set RUST_LOG for diagnostics.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::ExitCode;

use enigma::{config, session, EnigmaError, Result};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    if args.is_empty() || args.len() > 3 {
        return Err(EnigmaError::ConfigError(
            "Only 1, 2, or 3 command-line arguments allowed".into(),
        ));
    }

    let mut machine = config::read_machine(open(&args[0])?)?;
    let input: Box<dyn BufRead> = match args.get(1) {
        Some(path) => Box::new(open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match args.get(2) {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|source| {
            EnigmaError::Open {
                path: path.clone(),
                source,
            }
        })?)),
        None => Box::new(io::stdout().lock()),
    };
    session::process(&mut machine, input, output)
}

fn open(path: &str) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| EnigmaError::Open {
            path: path.to_string(),
            source,
        })
}
