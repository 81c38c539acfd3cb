//! Error types for records, configuration, programs and the sandbox

use std::path::PathBuf;

use pop_dom::DomError;
use pop_png::PngError;
use thiserror::Error;

/// Gameplay record (de)serialization errors
#[derive(Debug, Error)]
pub enum RecordError {
    /// Unparsable input or a record without `events`
    #[error("malformed gameplay record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not encode gameplay record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Recorded input must not travel back in time
    #[error("input timestamp {got} is earlier than the previous {previous}")]
    NonMonotonic { previous: f64, got: f64 },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("configuration parsing error: {0}")]
    Parsing(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parsing(Box::new(err))
    }
}

/// Errors a program surfaces while running inside the sandbox
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("document error: {0}")]
    Dom(#[from] DomError),

    #[error("bad frame: {0}")]
    Frame(#[from] PngError),

    /// The host refuses further ticks once the session has ended
    #[error("session already ended")]
    SessionEnded,

    #[error("program failed: {0}")]
    Failed(String),
}

/// Sandbox orchestration errors
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("no gameplay record armed")]
    NotArmed,

    #[error("program returned without ending the session")]
    SessionNotEnded,

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
