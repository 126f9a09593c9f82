use crate::domain::message::{SwitchReply, SwitchRequest};
use crate::domain::peer::PeerInfo;
use crate::domain::ports::{Endpoint, EndpointFactory, EndpointRef, RequestHandlerRef};
use crate::error::{Result, SwitchError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

/// A request the switch handed to a peer's transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub peer_id: String,
    pub request: SwitchRequest,
}

/// An in-process endpoint.
///
/// Outgoing requests are published on a `tokio` channel and acknowledged
/// with `202 Accepted`, the way the protocol's asynchronous callbacks are.
pub struct ChannelEndpoint {
    peer_id: String,
    url: String,
    deliveries: mpsc::UnboundedSender<Delivery>,
    incoming: RwLock<Option<RequestHandlerRef>>,
}

impl ChannelEndpoint {
    pub fn new(peer_id: &str, url: &str, deliveries: mpsc::UnboundedSender<Delivery>) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            url: url.to_string(),
            deliveries,
            incoming: RwLock::new(None),
        }
    }

    /// An endpoint together with the receiving half of its delivery channel.
    pub fn channel(peer_id: &str) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(peer_id, "", tx), rx)
    }
}

#[async_trait]
impl Endpoint for ChannelEndpoint {
    async fn send_outgoing_request(&self, request: SwitchRequest) -> Result<SwitchReply> {
        debug!(peer = %self.peer_id, url = %self.url, kind = %request.kind(), "delivering request");
        self.deliveries
            .send(Delivery {
                peer_id: self.peer_id.clone(),
                request,
            })
            .map_err(|_| SwitchError::Transport {
                peer: self.peer_id.clone(),
                reason: "delivery channel closed".to_string(),
            })?;
        Ok(SwitchReply::accepted())
    }

    async fn set_incoming_request_handler(&self, handler: RequestHandlerRef) {
        *self.incoming.write().await = Some(handler);
    }

    async fn handle_incoming_request(&self, request: SwitchRequest) -> Result<SwitchReply> {
        let handler = self.incoming.read().await.clone();
        match handler {
            Some(handler) => handler.handle(request).await,
            None => Err(SwitchError::Transport {
                peer: self.peer_id.clone(),
                reason: "no incoming request handler installed".to_string(),
            }),
        }
    }
}

/// Creates a [`ChannelEndpoint`] per peer, all publishing onto one channel.
#[derive(Clone)]
pub struct ChannelEndpointFactory {
    deliveries: mpsc::UnboundedSender<Delivery>,
}

impl ChannelEndpointFactory {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (deliveries, rx) = mpsc::unbounded_channel();
        (Self { deliveries }, rx)
    }
}

impl EndpointFactory for ChannelEndpointFactory {
    fn create(&self, peer: &PeerInfo) -> Result<EndpointRef> {
        Ok(Arc::new(ChannelEndpoint::new(
            &peer.id,
            &peer.endpoint_url,
            self.deliveries.clone(),
        )))
    }
}
