//! Host link over a non-blocking std UDP socket.
//!
//! Lets the adapter talk to a real DTLS server from a workstation. Address
//! resolution always succeeds since the host stack does its own ARP.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use super::LinkLayer;
use crate::slot::{ArrivalSink, SLOT_CAPACITY};
use crate::Error;

pub struct UdpLink {
    socket: UdpSocket,
    local_port: u16,
    remote: Option<Ipv4Addr>,
    tx: Vec<u8>,
    rx: Vec<u8>,
}

impl UdpLink {
    /// Bind a non-blocking socket on `local`.
    pub fn bind(local: SocketAddrV4) -> Result<Self, Error> {
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        let local_port = socket.local_addr()?.port();

        debug!("UDP link bound to {}:{}", local.ip(), local_port);

        Ok(UdpLink {
            socket,
            local_port,
            remote: None,
            tx: vec![0; SLOT_CAPACITY],
            // Room for one byte more than the slot keeps, so truncation
            // stays observable.
            rx: vec![0; SLOT_CAPACITY + 1],
        })
    }

    /// The bound port, useful when binding to port 0.
    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl LinkLayer for UdpLink {
    /// Deliver at most one datagram. The rest stay queued in the socket
    /// until the slot has been emptied and the link is serviced again.
    fn service(&mut self, sink: &mut dyn ArrivalSink) {
        match self.socket.recv_from(&mut self.rx) {
            Ok((n, std::net::SocketAddr::V4(from))) => {
                sink.on_arrival(*from.ip(), from.port(), self.local_port, &self.rx[..n]);
            }
            Ok((_, from)) => {
                trace!("Ignore non-IPv4 datagram from {}", from);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => warn!("UDP receive failed: {}", e),
        }
    }

    fn tx_buffer(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.tx)
    }

    fn send(&mut self, local_port: u16, remote_port: u16, len: usize) -> bool {
        let Some(remote) = self.remote else {
            warn!("UDP send before address resolution");
            return false;
        };

        if local_port != self.local_port || len > self.tx.len() {
            return false;
        }

        let to = SocketAddrV4::new(remote, remote_port);
        match self.socket.send_to(&self.tx[..len], to) {
            Ok(n) => n == len,
            Err(e) => {
                warn!("UDP send to {} failed: {}", to, e);
                false
            }
        }
    }

    fn resolve(&mut self, remote: Ipv4Addr) -> bool {
        self.remote = Some(remote);
        true
    }
}
