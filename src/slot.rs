//! Capacity-one receive mailbox.
//!
//! The link layer delivers datagrams through [`ArrivalSink::on_arrival`],
//! the transport adapter drains them with [`ReceiveSlot::take`]. There is no
//! queue: a datagram that arrives before the previous one was consumed
//! replaces it. The engine retransmits whole flights, so a lost duplicate
//! costs nothing.

use std::fmt;
use std::net::Ipv4Addr;

use arrayvec::ArrayVec;

/// Largest datagram the slot keeps. Longer datagrams are truncated.
pub const SLOT_CAPACITY: usize = 1600;

/// Receiver of datagrams from the link layer.
///
/// Called synchronously from inside the link's service routine. The
/// implementation must run to completion and must not call back into the
/// link.
pub trait ArrivalSink {
    fn on_arrival(&mut self, source: Ipv4Addr, source_port: u16, dest_port: u16, data: &[u8]);
}

/// The single pending datagram plus its origin.
pub struct ReceiveSlot {
    local_port: u16,
    ready: bool,
    source: Ipv4Addr,
    source_port: u16,
    dest_port: u16,
    /// Bytes the datagram claimed to have on the wire, before truncation.
    wire_len: usize,
    payload: ArrayVec<u8, SLOT_CAPACITY>,
}

impl ReceiveSlot {
    /// Slot accepting datagrams addressed to `local_port` only.
    pub fn new(local_port: u16) -> Self {
        ReceiveSlot {
            local_port,
            ready: false,
            source: Ipv4Addr::UNSPECIFIED,
            source_port: 0,
            dest_port: 0,
            wire_len: 0,
            payload: ArrayVec::new(),
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Change the accepted port. Any pending datagram is dropped.
    pub fn set_local_port(&mut self, port: u16) {
        self.local_port = port;
        self.reset();
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Stored length, never above [`SLOT_CAPACITY`].
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn source(&self) -> (Ipv4Addr, u16) {
        (self.source, self.source_port)
    }

    pub fn dest_port(&self) -> u16 {
        self.dest_port
    }

    /// Whether the pending datagram lost bytes to the capacity limit.
    pub fn is_truncated(&self) -> bool {
        self.wire_len > self.payload.len()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Mark the slot consumed.
    pub fn reset(&mut self) {
        self.ready = false;
        self.payload.clear();
        self.wire_len = 0;
    }

    /// Copy the pending datagram into `buf` and reset the slot.
    ///
    /// Returns `None` when nothing is pending. Bytes that do not fit in
    /// `buf` are discarded with the rest of the datagram.
    pub fn take(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.ready {
            return None;
        }

        let n = self.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&self.payload[..n]);

        if n < self.payload.len() {
            debug!(
                "Receive buffer too small, dropping {} of {} bytes",
                self.payload.len() - n,
                self.payload.len()
            );
        }

        self.reset();
        Some(n)
    }
}

impl ArrivalSink for ReceiveSlot {
    fn on_arrival(&mut self, source: Ipv4Addr, source_port: u16, dest_port: u16, data: &[u8]) {
        if dest_port != self.local_port {
            trace!("Ignore datagram for port {}", dest_port);
            return;
        }

        let capped = data.len().min(SLOT_CAPACITY);

        if self.ready {
            trace!("Overwriting unconsumed datagram of {} bytes", self.len());
        }

        self.payload.clear();
        // Cannot fail, capped to capacity above.
        let _ = self.payload.try_extend_from_slice(&data[..capped]);
        self.source = source;
        self.source_port = source_port;
        self.dest_port = dest_port;
        self.wire_len = data.len();
        self.ready = true;

        trace!(
            "RX {} bytes from {}:{} -> {}",
            data.len(),
            source,
            source_port,
            dest_port
        );
    }
}

impl fmt::Debug for ReceiveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiveSlot")
            .field("local_port", &self.local_port)
            .field("ready", &self.ready)
            .field("len", &self.payload.len())
            .finish()
    }
}
