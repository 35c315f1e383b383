// Domain errors - Error types shared by ports and adapters

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed
    #[error("File system error: {0}")]
    FsFail(String),

    /// External tool exited with a non-zero status
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFail {
        tool: String,
        status: String,
        stderr: String,
    },

    /// Media duration could not be determined
    #[error("Probe failed: {0}")]
    ProbeFail(String),

    /// Transport or HTTP status failure talking to a remote endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Remote edit job reported a failure
    #[error("Remote job failed: {0}")]
    RemoteJob(String),

    /// Remote response lacks an expected field
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DomainError {
    /// Build a tool failure from a finished process
    pub fn tool_fail(tool: &str, status: std::process::ExitStatus, stderr: &[u8]) -> Self {
        DomainError::ToolFail {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Network(err.to_string())
    }
}
