//! Error types for each pipeline stage, and their mapping to process exit
//! codes for the invoking scheduler.

use thiserror::Error;

/// Errors raised while fetching anniversary candidates.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected page markup: {0}")]
    Markup(String),

    #[error("fallback data error: {0}")]
    Data(String),

    #[error("all anniversary sources failed (tried: {})", tried.join(", "))]
    AllSourcesFailed { tried: Vec<String> },
}

/// Errors raised while talking to the Claude API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed api response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no text content")]
    EmptyResponse,
}

/// Errors raised while generating or validating a web app.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("reply is missing required blocks: {}", missing.join(", "))]
    MissingBlocks { missing: Vec<&'static str> },

    #[error("generated {0} is empty")]
    EmptyFile(&'static str),

    #[error("generated HTML has no document or body structure")]
    InvalidHtml,
}

/// Errors raised while writing apps or index pages to disk.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the git collaborator.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Exit codes surfaced to the invoking scheduler.
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const FETCH_FAILED: u8 = 1;
    pub const GENERATION_FAILED: u8 = 2;
    pub const FILE_OPERATIONS_FAILED: u8 = 3;
    pub const GIT_OPERATIONS_FAILED: u8 = 4;
}
