use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use directory::config::{Configuration, Policy};
use directory::wire::Payload;
use directory::{Authority, DirectoryError, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file, `directory.yaml` by default.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Check directory user payloads, one object or an array per file.
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the canonical wire form of a payload.
    Normalize { file: PathBuf },
    /// List every known authority.
    Authorities,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = Configuration::default()
        .path(args.config.unwrap_or_default())
        .read();

    let result = match args.cmd {
        Commands::Validate { files } => {
            let failures = validate(&config, &files);
            if config.policy.rejects(failures) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        },
        Commands::Normalize { file } => normalize(&file),
        Commands::Authorities => {
            for authority in Authority::ALL {
                println!("{:<22}{}", authority, authority.description());
            }
            Ok(ExitCode::SUCCESS)
        },
    };

    result.unwrap_or_else(|err| {
        tracing::error!(error = %err, "command failed");
        ExitCode::FAILURE
    })
}

/// Initialize tracing subscriber for logging.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn read_payload(path: &Path) -> Result<Payload> {
    let input =
        std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Payload::parse(&input)
}

/// Report every violation of every user in `files`.
///
/// Returns the number of invalid users plus unreadable files.
fn validate(config: &Configuration, files: &[PathBuf]) -> usize {
    let mut failures = 0usize;

    for file in files {
        let users = match read_payload(file) {
            Ok(payload) => payload.into_users(),
            Err(err) => {
                println!("{}: {err}", file.display());
                failures += 1;
                continue;
            },
        };

        for user in &users {
            match user.validate_with(&config.validation) {
                Ok(()) => println!("{}: {}: ok", file.display(), user.id()),
                Err(violations) => {
                    failures += 1;
                    for violation in &violations {
                        println!(
                            "{}: {}: {violation}",
                            file.display(),
                            user.id()
                        );
                    }
                    if config.policy == Policy::Advisory {
                        tracing::warn!(
                            user_id = user.id(),
                            violations = violations.len(),
                            "keeping inconsistent directory user"
                        );
                    }
                },
            }
        }
    }

    tracing::info!(files = files.len(), failures, "validation finished");
    failures
}

fn normalize(file: &Path) -> Result<ExitCode> {
    let payload = read_payload(file)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(ExitCode::SUCCESS)
}
