//! The client entry point: resolve, set up, handshake, one echo exchange.

use zeroize::Zeroizing;

use crate::adapter::{Adapter, AdapterStats, MAX_DATAGRAM};
use crate::config::Config;
use crate::driver::Session;
use crate::engine::{EngineContext, SecureSession, Transport};
use crate::error::Credential;
use crate::link::LinkLayer;
use crate::rng::Entropy;
use crate::slot::ReceiveSlot;
use crate::util::{format_mac, hex_dump};
use crate::Error;

/// Long-lived state shared by every component of the client.
///
/// Holds the receive slot and the entropy source. Tests create as many
/// independent contexts as they like.
#[derive(Debug)]
pub struct NetContext {
    pub slot: ReceiveSlot,
    pub entropy: Entropy,
}

impl NetContext {
    pub fn new(config: &Config, entropy: Entropy) -> Self {
        NetContext {
            slot: ReceiveSlot::new(config.local_port()),
            entropy,
        }
    }
}

/// DER blobs loaded into the engine context.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    /// CA certificate the server chain is verified against.
    pub ca: &'a [u8],
    /// Client certificate for mutual authentication.
    pub certificate: &'a [u8],
    pub private_key: &'a [u8],
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("ca", &self.ca.len())
            .field("certificate", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct Exchange {
    pub cipher: Option<String>,
    pub version: Option<String>,
    /// Application bytes written.
    pub sent: usize,
    /// Decrypted reply, wiped on drop.
    pub reply: Zeroizing<Vec<u8>>,
    pub stats: AdapterStats,
}

/// Status code for a run: `0` on success, `-1` on any failure.
pub fn exit_code(result: &Result<Exchange, Error>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => -1,
    }
}

/// Resolve the peer, set up the engine, then handshake, write the configured
/// message and read one reply.
///
/// The engine context and the session are dropped on every return path.
pub fn run<C, L>(
    config: &Config,
    credentials: &Credentials<'_>,
    mut link: L,
    mut engine: C,
    net: &mut NetContext,
) -> Result<Exchange, Error>
where
    C: EngineContext,
    L: LinkLayer,
{
    info!("Local MAC: {}", format_mac(&config.local_mac()));
    info!("Local IP: {}", config.local_ip());
    info!("Remote IP: {}", config.remote_ip());
    info!(
        "Local port: {}, server port: {}",
        config.local_port(),
        config.remote_port()
    );

    net.slot.set_local_port(config.local_port());

    debug!("Resolving address for {}", config.remote_ip());
    if !link.resolve(config.remote_ip()) {
        warn!("Address resolution failed for {}", config.remote_ip());
        return Err(Error::AddressResolution(config.remote_ip()));
    }

    configure(&mut engine, config, credentials)?;

    let session = engine.new_session().map_err(Error::Setup)?;
    let adapter = Adapter::new(
        link,
        &mut net.slot,
        config.peer(),
        config.recv_poll_ceiling(),
    );
    let mut session = Session::new(session, adapter, &mut net.entropy, config.retry_ceiling());

    info!("Starting DTLS handshake with {}", config.peer().address);
    session.establish().map_err(|e| explain(&session, e))?;

    let cipher = session.engine().cipher();
    let version = session.engine().version();
    info!("Handshake complete");
    info!("Negotiated cipher: {}", cipher.as_deref().unwrap_or("unknown"));
    info!("Negotiated version: {}", version.as_deref().unwrap_or("unknown"));

    let sent = session
        .write(config.message())
        .map_err(|e| explain(&session, e))?;
    info!("Sent {} bytes of application data", sent);

    let mut reply = Zeroizing::new(vec![0u8; MAX_DATAGRAM]);
    let n = session
        .read(&mut reply[..])
        .map_err(|e| explain(&session, e))?;
    reply.truncate(n);

    info!("Received {} bytes over DTLS", n);
    debug!("Decrypted payload ({} bytes):\n{}", n, hex_dump(&reply));

    let stats = session.transport().stats();
    debug!("{:?}", stats);

    Ok(Exchange {
        cipher,
        version,
        sent,
        reply,
        stats,
    })
}

fn configure<C: EngineContext>(
    engine: &mut C,
    config: &Config,
    credentials: &Credentials<'_>,
) -> Result<(), Error> {
    let steps: [(Credential, &[u8]); 3] = [
        (Credential::CaCertificate, credentials.ca),
        (Credential::Certificate, credentials.certificate),
        (Credential::PrivateKey, credentials.private_key),
    ];

    for (what, der) in steps {
        debug!("Loading {} ({} bytes)", what, der.len());
        let res = match what {
            Credential::CaCertificate => engine.load_verify_buffer(der),
            Credential::Certificate => engine.use_certificate_buffer(der),
            Credential::PrivateKey => engine.use_private_key_buffer(der),
        };
        if let Err(source) = res {
            warn!("Failed to load {}: {}", what, source);
            return Err(Error::Credentials { what, source });
        }
    }

    engine.set_verify_peer(config.require_peer_certificate());
    engine
        .set_cipher_list(config.cipher_list())
        .map_err(Error::Setup)?;
    engine.set_mtu(config.mtu());

    debug!(
        "Engine configured (cipher list {}, verify peer {})",
        config.cipher_list(),
        config.require_peer_certificate()
    );
    Ok(())
}

fn explain<S: SecureSession, T: Transport>(session: &Session<'_, S, T>, e: Error) -> Error {
    if let Error::Engine { source, .. } = &e {
        warn!(
            "Error string: {}",
            session.engine().error_string(source.code)
        );
    }
    e
}
