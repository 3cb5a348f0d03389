//! Bounded-poll UDP transport for a non-blocking DTLS 1.3 engine.
//!
//! A bare-metal network stack delivers datagrams from an interrupt or a poll
//! routine. A secure-transport engine wants a blocking byte pipe plus a
//! source of random bytes. This crate sits in between:
//!
//! * [`ReceiveSlot`] is a capacity-one mailbox filled by the link layer.
//! * [`Adapter`] turns the slot and the link's send primitive into the
//!   engine's [`Transport`], mapping "nothing yet" to would-block after a
//!   fixed number of polls.
//! * [`drive`] and [`Session`] call the engine's non-blocking operations
//!   until they complete, fail, or exceed a retry ceiling.
//! * [`Entropy`] is a seeded xorshift generator for the engine. It is
//!   deterministic and NOT suitable where real entropy is required.
//!
//! Nothing here sleeps or reads a clock. Every wait is a bounded loop.
//!
//! ```text
//! link ─► ArrivalSink ─► ReceiveSlot ─► Adapter::recv ─┐
//!                                                      ▼
//!                              Session::{establish,read,write} ─► engine
//!                                                      │
//! link ◄─ LinkLayer::send ◄─ Adapter::send ◄───────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod adapter;
pub use adapter::{Adapter, AdapterStats, Peer, MAX_DATAGRAM};

mod client;
pub use client::{exit_code, run, Credentials, Exchange, NetContext};

mod config;
pub use config::{Config, ConfigBuilder};

mod driver;
pub use driver::{drive, Operation, Session};

pub mod engine;
pub use engine::{EngineContext, FlightTimer, Io, Outcome, SecureSession, Transport};

mod error;
pub use error::{Credential, EngineError, Error, ErrorKind, IoError};

pub mod link;
pub use link::LinkLayer;

mod rng;
pub use rng::{cycle_sample, Entropy};

mod slot;
pub use slot::{ArrivalSink, ReceiveSlot, SLOT_CAPACITY};

pub mod util;
