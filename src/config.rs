use std::net::Ipv4Addr;

use crate::adapter::{Peer, MAX_DATAGRAM};
use crate::Error;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    local_mac: [u8; 6],
    local_ip: Ipv4Addr,
    remote_ip: Ipv4Addr,
    local_port: u16,
    remote_port: u16,
    mtu: usize,
    recv_poll_ceiling: u32,
    retry_ceiling: usize,
    cipher_list: String,
    require_peer_certificate: bool,
    message: Vec<u8>,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            local_mac: [0x02, 0x11, 0x22, 0x33, 0x44, 0x55],
            local_ip: Ipv4Addr::new(192, 168, 1, 50),
            remote_ip: Ipv4Addr::new(192, 168, 1, 100),
            local_port: 60000,
            remote_port: 6000,
            mtu: 1200,
            recv_poll_ceiling: 8_000_000,
            retry_ceiling: 300,
            cipher_list: "TLS13-AES128-GCM-SHA256".to_string(),
            require_peer_certificate: true,
            message: b"Hello from LiteX PQC-DTLS 1.3 client".to_vec(),
        }
    }

    /// Hardware address the link layer is brought up with.
    #[inline(always)]
    pub fn local_mac(&self) -> [u8; 6] {
        self.local_mac
    }

    #[inline(always)]
    pub fn local_ip(&self) -> Ipv4Addr {
        self.local_ip
    }

    #[inline(always)]
    pub fn remote_ip(&self) -> Ipv4Addr {
        self.remote_ip
    }

    /// UDP port this client sends from and accepts datagrams on.
    #[inline(always)]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// UDP port of the DTLS server.
    #[inline(always)]
    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    /// The fixed peer of every session made with this config.
    pub fn peer(&self) -> Peer {
        Peer {
            address: self.remote_ip,
            port: self.remote_port,
        }
    }

    /// Max transmission unit.
    ///
    /// The largest record the engine is allowed to produce.
    #[inline(always)]
    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// Link service calls made by one receive before it reports a timeout.
    #[inline(always)]
    pub fn recv_poll_ceiling(&self) -> u32 {
        self.recv_poll_ceiling
    }

    /// Engine calls made by one operation before it is declared stuck.
    #[inline(always)]
    pub fn retry_ceiling(&self) -> usize {
        self.retry_ceiling
    }

    #[inline(always)]
    pub fn cipher_list(&self) -> &str {
        &self.cipher_list
    }

    /// Whether the server must present a certificate.
    #[inline(always)]
    pub fn require_peer_certificate(&self) -> bool {
        self.require_peer_certificate
    }

    /// Application message sent once the handshake completes.
    #[inline(always)]
    pub fn message(&self) -> &[u8] {
        &self.message
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    local_mac: [u8; 6],
    local_ip: Ipv4Addr,
    remote_ip: Ipv4Addr,
    local_port: u16,
    remote_port: u16,
    mtu: usize,
    recv_poll_ceiling: u32,
    retry_ceiling: usize,
    cipher_list: String,
    require_peer_certificate: bool,
    message: Vec<u8>,
}

impl ConfigBuilder {
    /// Set the local hardware address.
    ///
    /// Defaults to the locally administered 02:11:22:33:44:55.
    pub fn local_mac(mut self, mac: [u8; 6]) -> Self {
        self.local_mac = mac;
        self
    }

    /// Set the local IPv4 address.
    ///
    /// Defaults to 192.168.1.50.
    pub fn local_ip(mut self, ip: Ipv4Addr) -> Self {
        self.local_ip = ip;
        self
    }

    /// Set the DTLS server address.
    ///
    /// Defaults to 192.168.1.100.
    pub fn remote_ip(mut self, ip: Ipv4Addr) -> Self {
        self.remote_ip = ip;
        self
    }

    /// Set the local UDP port.
    ///
    /// Defaults to 60000.
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Set the server UDP port.
    ///
    /// Defaults to 6000.
    pub fn remote_port(mut self, port: u16) -> Self {
        self.remote_port = port;
        self
    }

    /// Set the max transmission unit (MTU).
    ///
    /// Defaults to 1200.
    pub fn mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the link service calls per receive.
    ///
    /// Defaults to 8 000 000.
    pub fn recv_poll_ceiling(mut self, polls: u32) -> Self {
        self.recv_poll_ceiling = polls;
        self
    }

    /// Set the engine calls per operation.
    ///
    /// Defaults to 300.
    pub fn retry_ceiling(mut self, attempts: usize) -> Self {
        self.retry_ceiling = attempts;
        self
    }

    /// Set the engine cipher list.
    ///
    /// Defaults to TLS13-AES128-GCM-SHA256.
    pub fn cipher_list(mut self, list: impl Into<String>) -> Self {
        self.cipher_list = list.into();
        self
    }

    /// Set whether the server must present a certificate.
    ///
    /// Defaults to true (mutual authentication).
    pub fn require_peer_certificate(mut self, require: bool) -> Self {
        self.require_peer_certificate = require;
        self
    }

    /// Set the application message.
    pub fn message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = message.into();
        self
    }

    /// Build the configuration.
    ///
    /// Returns `Error::Config` for values no session could work with.
    pub fn build(self) -> Result<Config, Error> {
        if self.retry_ceiling == 0 {
            return Err(Error::Config("retry ceiling must be at least 1".into()));
        }

        if self.mtu == 0 || self.mtu > MAX_DATAGRAM {
            return Err(Error::Config(format!(
                "mtu {} outside 1..={}",
                self.mtu, MAX_DATAGRAM
            )));
        }

        if self.message.is_empty() || self.message.len() > self.mtu {
            return Err(Error::Config(format!(
                "message length {} outside 1..={}",
                self.message.len(),
                self.mtu
            )));
        }

        if self.local_port == 0 || self.remote_port == 0 {
            return Err(Error::Config("ports must be non-zero".into()));
        }

        Ok(Config {
            local_mac: self.local_mac,
            local_ip: self.local_ip,
            remote_ip: self.remote_ip,
            local_port: self.local_port,
            remote_port: self.remote_port,
            mtu: self.mtu,
            recv_poll_ceiling: self.recv_poll_ceiling,
            retry_ceiling: self.retry_ceiling,
            cipher_list: self.cipher_list,
            require_peer_certificate: self.require_peer_certificate,
            message: self.message,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builder()
            .build()
            .expect("Default config should always validate")
    }
}
