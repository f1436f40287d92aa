use grid_core::FileSlot;
use thiserror::Error;

/// Message used when a rejected upload carries no readable `detail`.
pub const UPLOAD_REJECTED_FALLBACK: &str = "Upload rejected by server";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid api base {value:?}: {reason}")]
    InvalidApiBase { value: String, reason: String },
    #[error("invalid poll interval {value:?}: expected a positive number of milliseconds")]
    InvalidPollInterval { value: String },
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Failure of a batch submission. Only `MissingFiles` is raised before any
/// request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("missing required files: {}", slot_list(.missing))]
    MissingFiles { missing: Vec<FileSlot> },
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// No response could be obtained.
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("unexpected upload response: {0}")]
    InvalidResponse(String),
}

/// Failure of a single progress poll. None of these stop polling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    /// The batch is not registered yet; a normal miss, not an error.
    #[error("batch not found")]
    NotFound,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid progress document: {0}")]
    Decode(String),
}

/// Failure of a read-only dashboard request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message} (http {status})")]
    Status { status: u16, message: String },
    #[error("could not reach the server: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

fn slot_list(slots: &[FileSlot]) -> String {
    slots
        .iter()
        .map(|slot| slot.field_name())
        .collect::<Vec<_>>()
        .join(", ")
}
