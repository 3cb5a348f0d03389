//! Bounded retry driving of non-blocking engine calls.
//!
//! Every engine operation is driven the same way: call it, retry on
//! want-read/want-write, stop on success, on engine failure or when the
//! attempt ceiling is reached. There is no sleeping between attempts; the
//! only wait is the receive poll inside the transport.

use std::fmt;

use crate::engine::{Io, Outcome, SecureSession, Transport};
use crate::rng::Entropy;
use crate::Error;

/// The engine operation being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Establish,
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Establish => "establish",
            Operation::Read => "read",
            Operation::Write => "write",
        };
        write!(f, "{}", s)
    }
}

/// Call `f` until it completes, fails, or has been called `ceiling` times.
///
/// A ceiling of zero behaves as one: the operation is always tried once.
pub fn drive<T, F>(op: Operation, ceiling: usize, mut f: F) -> Result<T, Error>
where
    F: FnMut() -> Outcome<T>,
{
    let mut attempts = 0;

    loop {
        match f() {
            Outcome::Done(v) => {
                trace!("{} done after {} retries", op, attempts);
                return Ok(v);
            }
            Outcome::WantRead | Outcome::WantWrite => {
                attempts += 1;
                if attempts >= ceiling {
                    warn!("{} stuck after {} attempts (want read/write)", op, attempts);
                    return Err(Error::Exhausted { op, attempts });
                }
            }
            Outcome::Failed(source) => {
                warn!("{} failed: {}", op, source);
                return Err(Error::Engine { op, source });
            }
        }
    }
}

/// Replace an engine failure with the transport failure that caused it.
///
/// An engine that saw `IoError::General` reports its own code for it. The
/// transport's recorded cause (no buffer, bad length, link refused) is the
/// one the caller can act on.
fn local_cause<V, T: Transport + ?Sized>(
    transport: &mut T,
    res: Result<V, Error>,
) -> Result<V, Error> {
    if let Err(Error::Engine { op, source }) = &res {
        if let Some(cause) = transport.take_error() {
            debug!("{} failed on transport ({}), engine said: {}", op, cause, source);
            return Err(cause);
        }
    }
    res
}

/// A secure session bound to its transport and entropy source.
///
/// Dropping it releases the engine session.
pub struct Session<'a, S: SecureSession, T: Transport> {
    engine: S,
    transport: T,
    rng: &'a mut Entropy,
    ceiling: usize,
}

impl<'a, S: SecureSession, T: Transport> Session<'a, S, T> {
    pub fn new(engine: S, transport: T, rng: &'a mut Entropy, ceiling: usize) -> Self {
        Session {
            engine,
            transport,
            rng,
            ceiling,
        }
    }

    /// Run the handshake to completion.
    pub fn establish(&mut self) -> Result<(), Error> {
        let Session {
            engine,
            transport,
            rng,
            ceiling,
        } = self;
        transport.take_error();
        let mut io = Io {
            transport: &mut *transport,
            rng: &mut **rng,
        };
        let res = drive(Operation::Establish, *ceiling, || engine.connect(&mut io));
        local_cause(&mut *transport, res)
    }

    /// Read one application record into `buf`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let Session {
            engine,
            transport,
            rng,
            ceiling,
        } = self;
        transport.take_error();
        let mut io = Io {
            transport: &mut *transport,
            rng: &mut **rng,
        };
        let res = drive(Operation::Read, *ceiling, || engine.read(&mut io, &mut *buf));
        local_cause(&mut *transport, res)
    }

    /// Write `data` as one application record.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        let Session {
            engine,
            transport,
            rng,
            ceiling,
        } = self;
        transport.take_error();
        let mut io = Io {
            transport: &mut *transport,
            rng: &mut **rng,
        };
        let res = drive(Operation::Write, *ceiling, || engine.write(&mut io, data));
        let written = local_cause(&mut *transport, res)?;

        if written != data.len() {
            return Err(Error::ShortWrite {
                written,
                expected: data.len(),
            });
        }

        Ok(written)
    }

    pub fn engine(&self) -> &S {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

}
