// External data representation, a protocol for serializing data to be sent over the network
pub mod xdr;

// Remote procedure call, a protocol build on top of XDR to provide something like C-style function calls over the network
pub mod rpc;

// A protocol using RPC that's meant to communicate with instruments like oscilloscopes, power supplies, waveform generators, etc
pub mod vxi11;

// Framing for binary query responses
pub mod ieee488;

// What the grabber needs from a transport, independent of VXI-11
pub mod bus;

// Supported oscilloscopes, one grabber per model family
pub mod devices;

pub mod registry;
pub mod discovery;
pub mod resolver;
pub mod capture;
pub mod trigger;

pub mod config;
pub mod session;

mod error;

pub use error::{Error, Result};
pub use resolver::ResolvedInstrument;
