//! Adapters for the domain ports.

pub mod channel;
pub mod in_memory;
