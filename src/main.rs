use crate::AppError::ConfigError;
use clap::Parser;
use drum::{decode_file, DrumError};
use std::path::{Path, PathBuf};

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("drum=info"))
        .init();

    // args
    let args = CliArgs::parse();

    // check if pattern files exist
    for path in &args.pattern_files {
        if !path.exists() {
            let err = ConfigError(format!("Pattern file not found {path:?}"));
            return Err(err);
        }
    }

    // decode each file independently
    let mut failures = 0;
    for path in &args.pattern_files {
        log::debug!("Decoding {path:?}");
        if let Err(err) = print_pattern(path, args.json) {
            log::error!("{path:?}: {err}");
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(AppError::ParsingError(format!(
            "{failures} of {} pattern files failed to decode",
            args.pattern_files.len()
        )));
    }
    Ok(())
}

fn print_pattern(path: &Path, json: bool) -> Result<(), AppError> {
    let pattern = decode_file(path)?;
    if json {
        let rendered = serde_json::to_string_pretty(&pattern)
            .map_err(|err| AppError::OtherError(format!("Could not render JSON {err:}")))?;
        println!("{rendered}");
    } else {
        print!("{pattern}");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Paths to `.splice` pattern files.
    #[arg(required = true)]
    pattern_files: Vec<PathBuf>,
    /// Print patterns as JSON instead of step grids.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("I/O error: {0}")]
    IoError(std::io::Error),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<DrumError> for AppError {
    fn from(error: DrumError) -> Self {
        match error {
            DrumError::IoError(e) => Self::IoError(e),
            DrumError::EncodingError(s) => Self::OtherError(s),
            e @ (DrumError::TruncatedInput(_)
            | DrumError::InvalidFormat(_)
            | DrumError::InvalidNoteByte { .. }) => Self::ParsingError(e.to_string()),
        }
    }
}
