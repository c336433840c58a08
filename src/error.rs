//! Error types for the quest navigator.

use uuid::Uuid;

use crate::shell::Screen;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation error: {0}")]
    Shell(#[from] ShellError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Navigation shell errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("Cannot {action} from screen {from}")]
    InvalidTransition { from: Screen, action: &'static str },
}

/// Session and request-boundary errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {id} not found")]
    NotFound { id: Uuid },

    #[error("Wizard is not active (current screen: {screen})")]
    WizardInactive { screen: Screen },

    #[error("Results are not available yet (current screen: {screen})")]
    ResultsUnavailable { screen: Screen },

    #[error("Tag must not be blank")]
    BlankTag,

    #[error("Session limit of {limit} reached")]
    CapacityReached { limit: usize },

    #[error(transparent)]
    Navigation(#[from] ShellError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
