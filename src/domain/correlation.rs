use super::message::{HEADER_SOURCE, Headers, MessageBody, MessageKind, SwitchRequest};
use serde::Serialize;
use std::fmt;

/// The request maps kept by the correlation store, one per tracked kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrelationMap {
    QuotePost,
    QuotePut,
    QuoteError,
    TransferPost,
    TransferPut,
    TransferError,
}

impl CorrelationMap {
    /// The map a request of `kind` is tracked in. GETs are not tracked.
    pub fn for_kind(kind: MessageKind) -> Option<Self> {
        match kind {
            MessageKind::QuotePost => Some(CorrelationMap::QuotePost),
            MessageKind::QuotePut => Some(CorrelationMap::QuotePut),
            MessageKind::QuoteError => Some(CorrelationMap::QuoteError),
            MessageKind::TransferPost => Some(CorrelationMap::TransferPost),
            MessageKind::TransferPut => Some(CorrelationMap::TransferPut),
            MessageKind::TransferError => Some(CorrelationMap::TransferError),
            MessageKind::QuoteGet | MessageKind::TransferGet => None,
        }
    }
}

impl fmt::Display for CorrelationMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorrelationMap::QuotePost => "quote post",
            CorrelationMap::QuotePut => "quote put",
            CorrelationMap::QuoteError => "quote error",
            CorrelationMap::TransferPost => "transfer post",
            CorrelationMap::TransferPut => "transfer put",
            CorrelationMap::TransferError => "transfer error",
        };
        f.write_str(name)
    }
}

/// Snapshot of a request as it arrived from a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMapEntry {
    pub headers: Headers,
    pub body: MessageBody,
    pub source_peer_id: String,
}

impl RequestMapEntry {
    pub fn from_request(request: &SwitchRequest, source_peer_id: &str) -> Self {
        Self {
            headers: request.headers.clone(),
            body: request.body.clone(),
            source_peer_id: source_peer_id.to_string(),
        }
    }

    /// The `fspiop-source` the original requester used, falling back to the
    /// peer it came from.
    pub fn requester(&self) -> &str {
        self.headers
            .get(HEADER_SOURCE)
            .map(String::as_str)
            .unwrap_or(self.source_peer_id.as_str())
    }

    /// For a quote-put entry: the FSP that will receive the transfer.
    pub fn recorded_destination(&self) -> &str {
        match &self.body {
            MessageBody::QuotePut(put) => put
                .transfer_destination
                .as_deref()
                .unwrap_or_else(|| self.requester()),
            _ => self.requester(),
        }
    }
}

/// The id a request is tracked under, per kind.
pub fn correlation_id(request: &SwitchRequest) -> Option<&str> {
    match &request.body {
        MessageBody::QuotePost(post) => Some(post.quote_id.as_str()),
        MessageBody::TransferPost(post) => Some(post.transfer_id.as_str()),
        MessageBody::QuoteGet | MessageBody::TransferGet => None,
        _ => request.object_id.as_deref(),
    }
}

/// Entry counts per map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationStats {
    pub quote_post: usize,
    pub quote_put: usize,
    pub quote_error: usize,
    pub transfer_post: usize,
    pub transfer_put: usize,
    pub transfer_error: usize,
    pub transfer_links: usize,
}

impl CorrelationStats {
    pub fn count(&self, map: CorrelationMap) -> usize {
        match map {
            CorrelationMap::QuotePost => self.quote_post,
            CorrelationMap::QuotePut => self.quote_put,
            CorrelationMap::QuoteError => self.quote_error,
            CorrelationMap::TransferPost => self.transfer_post,
            CorrelationMap::TransferPut => self.transfer_put,
            CorrelationMap::TransferError => self.transfer_error,
        }
    }
}
