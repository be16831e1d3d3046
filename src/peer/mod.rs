//! # Peer Client and Registry (C3, C4)
//!
//! Outbound RPC to other agents speaking the same wire protocol this agent
//! exposes (`server`). Transport errors never escape as exceptions: callers
//! get a typed `{success:false, ...}`/health shape back so they can make
//! local decisions, per the specification's "never raise" contract.

pub mod client;
pub mod registry;

pub use client::PeerClient;
pub use registry::PeerRegistry;
