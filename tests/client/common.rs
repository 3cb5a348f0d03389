//! Stub link layer and stub engine shared by the client tests.

#![allow(unused)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::rc::Rc;

use rand::RngCore;

use dtls_bridge::{
    ArrivalSink, Config, Credential, EngineContext, EngineError, FlightTimer, Io, LinkLayer,
    Outcome, SecureSession, MAX_DATAGRAM,
};

pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);
pub const CLIENT_HELLO: &[u8] = b"CLIENT_HELLO";

/// A datagram waiting to be delivered by `service`.
struct Pending {
    due_at_poll: u64,
    dest_port: u16,
    source_port: u16,
    data: Vec<u8>,
}

/// Link whose remote end echoes every datagram after `echo_delay` polls.
pub struct EchoLink {
    pub resolvable: bool,
    /// `tx_buffer` hands out a buffer.
    pub tx_available: bool,
    /// `send` accepts the datagram.
    pub accept_send: bool,
    pub echo: bool,
    pub echo_delay: u64,
    /// Deliver echoes to this port instead of the sender's.
    pub misroute_to: Option<u16>,
    pub polls: u64,
    pub resolved: Option<Ipv4Addr>,
    pub sent: Vec<(u16, u16, Vec<u8>)>,
    tx: Vec<u8>,
    pending: VecDeque<Pending>,
}

impl EchoLink {
    pub fn new() -> Self {
        EchoLink {
            resolvable: true,
            tx_available: true,
            accept_send: true,
            echo: true,
            echo_delay: 3,
            misroute_to: None,
            polls: 0,
            resolved: None,
            sent: Vec::new(),
            tx: vec![0; MAX_DATAGRAM],
            pending: VecDeque::new(),
        }
    }

    /// A peer that never answers.
    pub fn silent() -> Self {
        EchoLink {
            echo: false,
            ..EchoLink::new()
        }
    }
}

impl LinkLayer for EchoLink {
    fn service(&mut self, sink: &mut dyn ArrivalSink) {
        self.polls += 1;
        let due = matches!(self.pending.front(), Some(p) if p.due_at_poll <= self.polls);
        if due {
            if let Some(p) = self.pending.pop_front() {
                sink.on_arrival(PEER_IP, p.source_port, p.dest_port, &p.data);
            }
        }
    }

    fn tx_buffer(&mut self) -> Option<&mut [u8]> {
        if !self.tx_available {
            return None;
        }
        Some(&mut self.tx)
    }

    fn send(&mut self, local_port: u16, remote_port: u16, len: usize) -> bool {
        if !self.accept_send {
            return false;
        }
        let data = self.tx[..len].to_vec();
        self.sent.push((local_port, remote_port, data.clone()));

        if self.echo {
            self.pending.push_back(Pending {
                due_at_poll: self.polls + self.echo_delay,
                dest_port: self.misroute_to.unwrap_or(local_port),
                source_port: remote_port,
                data,
            });
        }
        true
    }

    fn resolve(&mut self, remote: Ipv4Addr) -> bool {
        if self.resolvable {
            self.resolved = Some(remote);
        }
        self.resolvable
    }
}

/// Observations made by the stub engine, shared with the test.
#[derive(Debug, Default)]
pub struct Probe {
    pub loaded: Vec<Credential>,
    pub verify_peer: Option<bool>,
    pub cipher_list: Option<String>,
    pub mtu: Option<usize>,
    pub sessions_created: usize,
    pub sessions_dropped: usize,
    pub contexts_dropped: usize,
    pub connect_calls: usize,
    pub read_calls: usize,
    pub write_calls: usize,
    pub timeouts: usize,
}

pub type SharedProbe = Rc<RefCell<Probe>>;

pub fn probe() -> SharedProbe {
    Rc::new(RefCell::new(Probe::default()))
}

struct ProbeTimer(SharedProbe);

impl FlightTimer for ProbeTimer {
    fn got_timeout(&mut self) {
        self.0.borrow_mut().timeouts += 1;
    }
}

/// Plaintext stand-in for a DTLS engine.
///
/// The handshake sends `CLIENT_HELLO` plus 8 random bytes and completes on
/// any reply. Records are passed through unchanged. A connect script, when
/// present, is consumed before the handshake runs.
pub struct StubSession {
    probe: SharedProbe,
    timer: ProbeTimer,
    connect_script: VecDeque<Outcome<()>>,
    hello_sent: bool,
    connected: bool,
}

impl SecureSession for StubSession {
    fn connect(&mut self, io: &mut Io<'_>) -> Outcome<()> {
        self.probe.borrow_mut().connect_calls += 1;

        if let Some(o) = self.connect_script.pop_front() {
            if o == Outcome::Done(()) {
                self.connected = true;
            }
            return o;
        }

        if !self.hello_sent {
            let mut hello = CLIENT_HELLO.to_vec();
            let mut random = [0u8; 8];
            io.rng.fill_bytes(&mut random);
            hello.extend_from_slice(&random);

            if let Err(e) = io.transport.send(&hello) {
                return e.into();
            }
            self.hello_sent = true;
        }

        let mut buf = [0u8; 256];
        match io.transport.recv(&mut buf, &mut self.timer) {
            Ok(_) => {
                self.connected = true;
                Outcome::Done(())
            }
            Err(e) => {
                // Retransmit the whole flight on the next attempt.
                self.hello_sent = false;
                e.into()
            }
        }
    }

    fn read(&mut self, io: &mut Io<'_>, buf: &mut [u8]) -> Outcome<usize> {
        self.probe.borrow_mut().read_calls += 1;
        match io.transport.recv(buf, &mut self.timer) {
            Ok(n) => Outcome::Done(n),
            Err(e) => e.into(),
        }
    }

    fn write(&mut self, io: &mut Io<'_>, data: &[u8]) -> Outcome<usize> {
        self.probe.borrow_mut().write_calls += 1;
        match io.transport.send(data) {
            Ok(n) => Outcome::Done(n),
            Err(e) => e.into(),
        }
    }

    fn error_string(&self, code: i32) -> String {
        format!("stub error {}", code)
    }

    fn cipher(&self) -> Option<String> {
        self.connected.then(|| "TLS13-AES128-GCM-SHA256".to_string())
    }

    fn version(&self) -> Option<String> {
        self.connected.then(|| "DTLSv1.3".to_string())
    }
}

impl Drop for StubSession {
    fn drop(&mut self) {
        self.probe.borrow_mut().sessions_dropped += 1;
    }
}

pub struct StubContext {
    probe: SharedProbe,
    pub fail_on: Option<Credential>,
    pub connect_script: Vec<Outcome<()>>,
}

impl StubContext {
    pub fn new(probe: &SharedProbe) -> Self {
        StubContext {
            probe: Rc::clone(probe),
            fail_on: None,
            connect_script: Vec::new(),
        }
    }

    pub fn session(&mut self) -> StubSession {
        self.new_session().expect("stub session")
    }

    fn load(&mut self, what: Credential, der: &[u8]) -> Result<(), EngineError> {
        if self.fail_on == Some(what) || der.is_empty() {
            return Err(EngineError::new(-140, "ASN parsing error, invalid input"));
        }
        self.probe.borrow_mut().loaded.push(what);
        Ok(())
    }
}

impl EngineContext for StubContext {
    type Session = StubSession;

    fn load_verify_buffer(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.load(Credential::CaCertificate, der)
    }

    fn use_certificate_buffer(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.load(Credential::Certificate, der)
    }

    fn use_private_key_buffer(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.load(Credential::PrivateKey, der)
    }

    fn set_verify_peer(&mut self, require: bool) {
        self.probe.borrow_mut().verify_peer = Some(require);
    }

    fn set_cipher_list(&mut self, list: &str) -> Result<(), EngineError> {
        self.probe.borrow_mut().cipher_list = Some(list.to_string());
        Ok(())
    }

    fn set_mtu(&mut self, mtu: usize) {
        self.probe.borrow_mut().mtu = Some(mtu);
    }

    fn new_session(&mut self) -> Result<StubSession, EngineError> {
        self.probe.borrow_mut().sessions_created += 1;
        Ok(StubSession {
            probe: Rc::clone(&self.probe),
            timer: ProbeTimer(Rc::clone(&self.probe)),
            connect_script: self.connect_script.iter().cloned().collect(),
            hello_sent: false,
            connected: false,
        })
    }
}

impl Drop for StubContext {
    fn drop(&mut self) {
        self.probe.borrow_mut().contexts_dropped += 1;
    }
}

/// Fake DER blobs; the stub engine only checks they are non-empty.
pub const CA: &[u8] = &[0x30, 0x82, 0x01, 0x0a];
pub const CERT: &[u8] = &[0x30, 0x82, 0x02, 0x0b];
pub const KEY: &[u8] = &[0x30, 0x82, 0x03, 0x0c];

/// Config with small ceilings so failing tests finish quickly.
pub fn test_config() -> Config {
    Config::builder()
        .recv_poll_ceiling(50)
        .retry_ceiling(20)
        .build()
        .expect("test config")
}
