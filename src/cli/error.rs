//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Document { .. } | ApplicationError::InvalidDocument { .. } => {
                    crate::exitcode::DATAERR
                }
                ApplicationError::PathNotFound(_) => crate::exitcode::USAGE,
                ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
                ApplicationError::Domain(DomainError::NodeNotFound(_))
                | ApplicationError::Domain(DomainError::RootNotRemovable(_)) => {
                    crate::exitcode::SOFTWARE
                }
            },
        }
    }
}
