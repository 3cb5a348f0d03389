use std::fmt;

use thiserror::Error;

use crate::driver::Operation;

/// Error reported by the secure engine.
///
/// `code` is the engine's native error number, `reason` the result of its
/// error-to-string facility at the time of failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine error {code}: {reason}")]
pub struct EngineError {
    pub code: i32,
    pub reason: String,
}

impl EngineError {
    pub fn new(code: i32, reason: impl Into<String>) -> Self {
        EngineError {
            code,
            reason: reason.into(),
        }
    }
}

/// Outcome of one I/O callback as seen by the engine.
///
/// `WouldBlock` is not a failure. It tells the engine to give up this call
/// and report "want read" so the session driver can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("would block")]
    WouldBlock,

    #[error("general i/o failure")]
    General,
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No data yet. Never surfaced unless the retry ceiling is exceeded.
    Transient,
    /// Precondition or resource failure for the current operation.
    Resource,
    /// The engine rejected the exchange.
    Protocol,
    /// The retry ceiling was reached.
    Exhausted,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("address resolution failed for {0}")]
    AddressResolution(std::net::Ipv4Addr),

    #[error("failed to load {what}: {source}")]
    Credentials {
        what: Credential,
        #[source]
        source: EngineError,
    },

    #[error("engine setup failed: {0}")]
    Setup(EngineError),

    #[error("datagram length {0} outside 1..={}", crate::adapter::MAX_DATAGRAM)]
    BadLength(usize),

    #[error("no transmit buffer available")]
    BufferUnavailable,

    #[error("link layer refused to send {0} bytes")]
    SendFailed(usize),

    #[error("{op} stuck after {attempts} attempts")]
    Exhausted { op: Operation, attempts: usize },

    #[error("{op} failed: {source}")]
    Engine {
        op: Operation,
        #[source]
        source: EngineError,
    },

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Exhausted { .. } => ErrorKind::Exhausted,
            Error::Engine { .. } | Error::ShortWrite { .. } => ErrorKind::Protocol,
            _ => ErrorKind::Resource,
        }
    }
}

/// Which credential blob failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    CaCertificate,
    Certificate,
    PrivateKey,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Credential::CaCertificate => "CA certificate",
            Credential::Certificate => "certificate",
            Credential::PrivateKey => "private key",
        };
        write!(f, "{}", s)
    }
}
