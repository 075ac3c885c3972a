use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use satdl_core::{DecodeSession, Protocol, SessionConfig, SessionError};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Small-satellite downlink decoder", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Session configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild a SIREN image. Output goes next to the input with a .jpg extension
    Siren {
        /// Capture file, hex text or KISS
        infile: String,
    },
    /// Rebuild a Stratosat-TK1 image. Output goes next to the input with a .jpg extension
    Stratosat {
        /// Capture file, hex text or KISS
        infile: String,
    },
    /// Print Stratosat-TK1 housekeeping telemetry
    Telemetry {
        /// Capture file, hex text or KISS
        infile: String,
    },
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage problems are not failures
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("setting default subscriber failed");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(SessionError::InputNotFound(path)) = e.downcast_ref::<SessionError>() {
                println!("File not found: {}", path.display());
            } else {
                error!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load_from_file(path)?,
        None => SessionConfig::default(),
    };

    let (protocol, infile) = match args.command {
        Command::Siren { infile } => (Some(Protocol::Siren), infile),
        Command::Stratosat { infile } => (Some(Protocol::Stratosat), infile),
        Command::Telemetry { infile } => (None, infile),
    };
    config.input_path = Some(infile);

    let Some(protocol) = protocol else {
        let records = DecodeSession::new(config).run_telemetry()?;
        for record in &records {
            println!("{}", record);
        }
        return Ok(());
    };

    config.protocol = protocol;
    info!(protocol = %protocol, "Starting satdl");
    let outcome = DecodeSession::new(config).run()?;
    if let Some(path) = &outcome.output_path {
        println!("Writing image to: {}", path.display());
    }
    Ok(())
}
