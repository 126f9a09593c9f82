use super::correlation::{CorrelationMap, CorrelationStats, RequestMapEntry};
use super::message::{SwitchReply, SwitchRequest};
use super::peer::PeerInfo;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that turns a request into a reply: a composed pipeline, the
/// switch dispatcher or a transport send.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: SwitchRequest) -> Result<SwitchReply>;
}

pub type RequestHandlerRef = Arc<dyn RequestHandler>;

/// A peer transport. The switch does not know how bytes move.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Sends a request to the peer and waits for its reply.
    async fn send_outgoing_request(&self, request: SwitchRequest) -> Result<SwitchReply>;

    /// Installs the handler that requests arriving from the peer are fed to.
    async fn set_incoming_request_handler(&self, handler: RequestHandlerRef);

    /// Feeds a request received from the peer to the installed handler.
    async fn handle_incoming_request(&self, request: SwitchRequest) -> Result<SwitchReply>;
}

pub type EndpointRef = Arc<dyn Endpoint>;

/// Builds the default endpoint for a peer registered without one.
pub trait EndpointFactory: Send + Sync {
    fn create(&self, peer: &PeerInfo) -> Result<EndpointRef>;
}

/// Request/reply correlation state.
///
/// Keys are message ids chosen by the peers, so each key has a single
/// writer; re-recording an id replaces the previous entry.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    async fn record(&self, map: CorrelationMap, id: &str, entry: RequestMapEntry) -> Result<()>;
    async fn get(&self, map: CorrelationMap, id: &str) -> Result<Option<RequestMapEntry>>;

    /// Records that the switch-originated transfer `outgoing_id` carries the
    /// incoming transfer `incoming_id`.
    ///
    /// Relinking the same pair is a no-op. An incoming transfer already
    /// carried by another leg is rejected with `AlreadyExists`.
    async fn link_transfer(&self, outgoing_id: &str, incoming_id: &str) -> Result<()>;

    /// Forgets the leg `outgoing_id` in both directions.
    async fn unlink_transfer(&self, outgoing_id: &str) -> Result<()>;
    async fn incoming_transfer_id(&self, outgoing_id: &str) -> Result<Option<String>>;
    async fn outgoing_transfer_id(&self, incoming_id: &str) -> Result<Option<String>>;

    async fn stats(&self) -> Result<CorrelationStats>;
}

pub type CorrelationStoreRef = Arc<dyn CorrelationStore>;
