use crate::core_storage::StorageError;
use crate::core_tls::TlsError;
use thiserror::Error;

/// Protocol-engine error taxonomy. Most variants are resolved inside the
/// responsible handler by writing a 4xx/5xx reply; only connection-level
/// faults (I/O, timeout, TLS) propagate out of dispatch and terminate the
/// session.
#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Bad sequence of commands")]
    Sequence,

    #[error("Syntax error in parameters: {0}")]
    Syntax(String),

    #[error("Not logged in")]
    Auth,

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Wrong entry kind: {0}")]
    WrongKind(String),

    #[error("Data connection failed: {0}")]
    DataConnection(String),

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("No passive port available in the configured range")]
    ResourceExhausted,

    #[error("Operation timed out")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for FtpError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(path) => FtpError::NotFound(path),
            StorageError::NotAFile(path) | StorageError::NotADirectory(path) => {
                FtpError::WrongKind(path)
            }
            other => FtpError::Storage(other),
        }
    }
}

impl FtpError {
    /// Connection-level faults tear the session down; everything else is
    /// answered on the control channel and the loop continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FtpError::Io(_) | FtpError::Timeout | FtpError::Tls(_)
        )
    }

    /// The numeric reply a handler sends when it resolves this error
    /// locally.
    pub fn to_ftp_response(&self) -> String {
        match self {
            FtpError::Sequence => "503 Bad sequence of commands.".to_string(),
            FtpError::Syntax(_) => "501 Syntax error in parameters or arguments.".to_string(),
            FtpError::Auth => "530 Not logged in.".to_string(),
            FtpError::NotFound(_) => "550 File or directory does not exist.".to_string(),
            FtpError::WrongKind(_) => "550 Requested action not taken.".to_string(),
            FtpError::DataConnection(_) => "425 Can't open data connection.".to_string(),
            FtpError::UnsupportedParameter(_) => {
                "504 Command not implemented for that parameter.".to_string()
            }
            FtpError::ResourceExhausted => {
                "425 Can't open data connection; no passive port available.".to_string()
            }
            FtpError::Tls(e) => e.to_ftp_response(),
            _ => "451 Requested action aborted. Local error in processing.".to_string(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for FtpError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        FtpError::Timeout
    }
}
