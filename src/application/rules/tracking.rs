use crate::application::pipeline::{Next, Rule};
use crate::domain::correlation::{CorrelationMap, RequestMapEntry, correlation_id};
use crate::domain::message::{SwitchReply, SwitchRequest};
use crate::domain::ports::CorrelationStoreRef;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Records every incoming POST, PUT and error request in the correlation
/// store, stamped with the peer it came from.
///
/// Always first in a peer's pipeline and always passes the request on.
pub struct TrackRequestsRule {
    peer_id: String,
    store: CorrelationStoreRef,
}

impl TrackRequestsRule {
    pub fn new(peer_id: &str, store: CorrelationStoreRef) -> Self {
        Self {
            peer_id: peer_id.to_string(),
            store,
        }
    }
}

#[async_trait]
impl Rule for TrackRequestsRule {
    fn name(&self) -> &'static str {
        "track-requests"
    }

    async fn incoming(&self, request: SwitchRequest, next: Next<'_>) -> Result<SwitchReply> {
        if let Some(map) = CorrelationMap::for_kind(request.kind())
            && let Some(id) = correlation_id(&request)
        {
            debug!(peer = %self.peer_id, %map, id, "tracking request");
            self.store
                .record(map, id, RequestMapEntry::from_request(&request, &self.peer_id))
                .await?;
        }
        next.run(request).await
    }
}
