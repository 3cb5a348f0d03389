//! Link-layer interface consumed by the transport adapter.
//!
//! The link layer owns ARP, Ethernet framing and the UDP header. This crate
//! only needs four things from it, captured by [`LinkLayer`].

use std::net::Ipv4Addr;

use crate::slot::ArrivalSink;

pub mod udp;

/// A poll-driven UDP link.
pub trait LinkLayer {
    /// Drain pending link work.
    ///
    /// Any datagram that completed during this call is handed to `sink`
    /// before returning.
    fn service(&mut self, sink: &mut dyn ArrivalSink);

    /// The outbound buffer for the next [`LinkLayer::send`].
    ///
    /// `None` if the link cannot provide one right now.
    fn tx_buffer(&mut self) -> Option<&mut [u8]>;

    /// Send the first `len` bytes of the transmit buffer to the last
    /// resolved remote address.
    fn send(&mut self, local_port: u16, remote_port: u16, len: usize) -> bool;

    /// Resolve the hardware address of `remote` and make it the send target.
    fn resolve(&mut self, remote: Ipv4Addr) -> bool;
}

impl<L: LinkLayer + ?Sized> LinkLayer for &mut L {
    fn service(&mut self, sink: &mut dyn ArrivalSink) {
        (**self).service(sink)
    }

    fn tx_buffer(&mut self) -> Option<&mut [u8]> {
        (**self).tx_buffer()
    }

    fn send(&mut self, local_port: u16, remote_port: u16, len: usize) -> bool {
        (**self).send(local_port, remote_port, len)
    }

    fn resolve(&mut self, remote: Ipv4Addr) -> bool {
        (**self).resolve(remote)
    }
}
