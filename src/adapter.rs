//! Blocking-style datagram transport on top of a poll-driven link.
//!
//! Receiving spins the link's service routine until the [`ReceiveSlot`]
//! fills or the poll ceiling is hit. Sending is a single synchronous enqueue
//! into the link's transmit buffer.

use std::net::Ipv4Addr;

use crate::engine::{FlightTimer, Transport};
use crate::error::IoError;
use crate::link::LinkLayer;
use crate::slot::ReceiveSlot;
use crate::Error;

/// Largest datagram the adapter will send.
pub const MAX_DATAGRAM: usize = crate::slot::SLOT_CAPACITY;

/// The fixed remote end of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub address: Ipv4Addr,
    pub port: u16,
}

/// Counters kept by the adapter for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStats {
    pub datagrams_in: u64,
    pub bytes_in: u64,
    pub datagrams_out: u64,
    pub bytes_out: u64,
    pub recv_timeouts: u64,
    pub send_errors: u64,
}

pub struct Adapter<'a, L: LinkLayer> {
    link: L,
    slot: &'a mut ReceiveSlot,
    peer: Peer,
    poll_ceiling: u32,
    stats: AdapterStats,
    last_error: Option<Error>,
}

impl<'a, L: LinkLayer> Adapter<'a, L> {
    /// Create an adapter sending from the slot's local port to `peer`.
    ///
    /// `poll_ceiling` bounds the service calls made by one `recv`.
    pub fn new(link: L, slot: &'a mut ReceiveSlot, peer: Peer, poll_ceiling: u32) -> Self {
        Adapter {
            link,
            slot,
            peer,
            poll_ceiling,
            stats: AdapterStats::default(),
            last_error: None,
        }
    }

    pub fn peer(&self) -> Peer {
        self.peer
    }

    pub fn stats(&self) -> AdapterStats {
        self.stats
    }

    /// Poll until the slot holds a datagram. Returns false at the ceiling.
    fn poll_slot(&mut self) -> bool {
        for _ in 0..self.poll_ceiling {
            self.link.service(&mut *self.slot);
            if self.slot.is_ready() {
                return true;
            }
        }
        self.slot.is_ready()
    }

    fn try_send(&mut self, data: &[u8]) -> Result<usize, Error> {
        let len = data.len();

        if len == 0 || len > MAX_DATAGRAM {
            return Err(Error::BadLength(len));
        }

        let tx = self.link.tx_buffer().ok_or(Error::BufferUnavailable)?;
        if tx.len() < len {
            return Err(Error::BufferUnavailable);
        }
        tx[..len].copy_from_slice(data);

        if !self.link.send(self.slot.local_port(), self.peer.port, len) {
            return Err(Error::SendFailed(len));
        }

        Ok(len)
    }
}

impl<'a, L: LinkLayer> Transport for Adapter<'a, L> {
    fn recv(&mut self, buf: &mut [u8], timer: &mut dyn FlightTimer) -> Result<usize, IoError> {
        if !self.poll_slot() {
            self.stats.recv_timeouts += 1;
            timer.got_timeout();
            debug!("Receive timeout after {} polls", self.poll_ceiling);
            return Err(IoError::WouldBlock);
        }

        if self.slot.is_truncated() {
            // Handed over as is. The engine's record checks reject it.
            debug!("Handing truncated datagram of {} bytes", self.slot.len());
        }

        let n = self.slot.take(buf).unwrap_or(0);
        self.stats.datagrams_in += 1;
        self.stats.bytes_in += n as u64;

        trace!("RX handed {} bytes to engine", n);
        Ok(n)
    }

    fn send(&mut self, data: &[u8]) -> Result<usize, IoError> {
        match self.try_send(data) {
            Ok(n) => {
                self.stats.datagrams_out += 1;
                self.stats.bytes_out += n as u64;
                trace!("TX {} bytes to port {}", n, self.peer.port);
                Ok(n)
            }
            Err(e) => {
                self.stats.send_errors += 1;
                warn!("Send to {}:{} failed: {}", self.peer.address, self.peer.port, e);
                self.last_error = Some(e);
                Err(IoError::General)
            }
        }
    }

    fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }
}
