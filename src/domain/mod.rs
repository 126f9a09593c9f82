//! Domain layer: protocol messages, money, peers, routing and the ports the
//! application layer is written against.

pub mod correlation;
pub mod message;
pub mod money;
pub mod peer;
pub mod ports;
pub mod routing;
