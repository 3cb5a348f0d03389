//! Interface to the secure-transport engine.
//!
//! The engine (record layer, DTLS 1.3 handshake, certificate validation,
//! key exchange) is an external component. These traits describe what this
//! crate needs from it and what it gives back: a blocking-looking
//! [`Transport`] for datagrams and an [`RngCore`] for entropy.

use rand::RngCore;

use crate::error::{EngineError, IoError};
use crate::Error;

/// Result of one non-blocking engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The call completed.
    Done(T),
    /// The engine needs more incoming data before it can progress.
    WantRead,
    /// The engine needs another outbound send before it can progress.
    WantWrite,
    /// The engine rejected the exchange. Not retryable.
    Failed(EngineError),
}

/// Engine error code used for transport failures.
pub const TRANSPORT_ERROR: i32 = -1;

impl<T> Outcome<T> {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Outcome::WantRead | Outcome::WantWrite)
    }
}

/// How an engine typically reacts to a transport error.
impl<T> From<IoError> for Outcome<T> {
    fn from(e: IoError) -> Self {
        match e {
            IoError::WouldBlock => Outcome::WantRead,
            IoError::General => {
                Outcome::Failed(EngineError::new(TRANSPORT_ERROR, "transport i/o failure"))
            }
        }
    }
}

/// Engine hook told when a receive timed out.
///
/// The engine uses it to schedule retransmission of its current flight.
pub trait FlightTimer {
    fn got_timeout(&mut self);
}

/// The datagram I/O contract the engine consumes.
pub trait Transport {
    /// Receive one datagram into `buf`.
    ///
    /// `Err(IoError::WouldBlock)` means nothing arrived in time. Before
    /// returning it the transport has called `timer.got_timeout()`.
    fn recv(&mut self, buf: &mut [u8], timer: &mut dyn FlightTimer) -> Result<usize, IoError>;

    /// Send one datagram. There is no would-block for sends.
    fn send(&mut self, data: &[u8]) -> Result<usize, IoError>;

    /// The cause behind the last `IoError::General`, if not yet taken.
    ///
    /// The engine only sees the flattened `IoError`. The session driver uses
    /// this to report the local failure instead of the engine's echo of it.
    fn take_error(&mut self) -> Option<Error> {
        None
    }
}

/// Everything an engine call may touch.
pub struct Io<'a> {
    pub transport: &'a mut dyn Transport,
    pub rng: &'a mut dyn RngCore,
}

/// One secure session.
pub trait SecureSession {
    /// Advance the client handshake.
    fn connect(&mut self, io: &mut Io<'_>) -> Outcome<()>;

    /// Read application data into `buf`.
    fn read(&mut self, io: &mut Io<'_>, buf: &mut [u8]) -> Outcome<usize>;

    /// Write application data.
    fn write(&mut self, io: &mut Io<'_>, data: &[u8]) -> Outcome<usize>;

    /// Human readable form of an engine error code.
    fn error_string(&self, code: i32) -> String;

    /// Negotiated cipher suite, once connected.
    fn cipher(&self) -> Option<String>;

    /// Negotiated protocol version, once connected.
    fn version(&self) -> Option<String>;
}

/// Engine-wide context: credentials and policy shared by its sessions.
///
/// Credential blobs are DER. Their content is the engine's concern.
pub trait EngineContext {
    type Session: SecureSession;

    fn load_verify_buffer(&mut self, der: &[u8]) -> Result<(), EngineError>;

    fn use_certificate_buffer(&mut self, der: &[u8]) -> Result<(), EngineError>;

    fn use_private_key_buffer(&mut self, der: &[u8]) -> Result<(), EngineError>;

    /// Require a peer certificate and fail the handshake without one.
    fn set_verify_peer(&mut self, require: bool);

    fn set_cipher_list(&mut self, list: &str) -> Result<(), EngineError>;

    /// Maximum record size the engine may produce.
    fn set_mtu(&mut self, mtu: usize);

    fn new_session(&mut self) -> Result<Self::Session, EngineError>;
}
