//! Application layer containing the switching logic.
//!
//! [`switch::Switch`] owns the peer registry and routing table and
//! dispatches every request; each peer's traffic passes through a
//! [`pipeline`] of business [`rules`] on the way in and on the way out.

pub mod headers;
pub mod pipeline;
pub mod rules;
pub mod switch;
