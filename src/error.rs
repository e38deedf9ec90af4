use thiserror::Error;

// Raised when a role identifier is not part of the closed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

// Errors that can come back from the completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Completion backend error: {0}")]
    Backend(String), // Transport, status, or decoding failure talking to the model.

    #[error("Completion cancelled")]
    Cancelled, // The user stopped the request before the backend answered.
}

impl From<reqwest::Error> for CompletionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() {
            CompletionError::Backend(format!("could not reach the model server: {error}"))
        } else {
            CompletionError::Backend(error.to_string())
        }
    }
}

// Session misuse. The UI is expected to prevent these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A request is already in flight")]
    TurnInFlight,
}

// Enum for handling application-level errors from the terminal shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to set logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Home directory not found")]
    NoHomeDir,
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
