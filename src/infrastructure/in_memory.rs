use crate::domain::correlation::{CorrelationMap, CorrelationStats, RequestMapEntry};
use crate::domain::ports::CorrelationStore;
use crate::error::{Result, SwitchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Maps {
    requests: HashMap<CorrelationMap, HashMap<String, RequestMapEntry>>,
    outgoing_to_incoming: HashMap<String, String>,
    incoming_to_outgoing: HashMap<String, String>,
}

/// A thread-safe in-memory correlation store.
///
/// All maps sit behind one `Arc<RwLock<..>>`, so the outgoing/incoming
/// transfer link is always updated in both directions at once. Entries live
/// as long as the store.
#[derive(Default, Clone)]
pub struct InMemoryCorrelationStore {
    maps: Arc<RwLock<Maps>>,
}

impl InMemoryCorrelationStore {
    /// Creates a new, empty in-memory correlation store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CorrelationStore for InMemoryCorrelationStore {
    async fn record(&self, map: CorrelationMap, id: &str, entry: RequestMapEntry) -> Result<()> {
        let mut maps = self.maps.write().await;
        maps.requests
            .entry(map)
            .or_default()
            .insert(id.to_string(), entry);
        Ok(())
    }

    async fn get(&self, map: CorrelationMap, id: &str) -> Result<Option<RequestMapEntry>> {
        let maps = self.maps.read().await;
        Ok(maps
            .requests
            .get(&map)
            .and_then(|entries| entries.get(id))
            .cloned())
    }

    async fn link_transfer(&self, outgoing_id: &str, incoming_id: &str) -> Result<()> {
        let mut maps = self.maps.write().await;
        if let Some(current) = maps.incoming_to_outgoing.get(incoming_id) {
            if current == outgoing_id {
                return Ok(());
            }
            return Err(SwitchError::AlreadyExists {
                id: incoming_id.to_string(),
            });
        }
        if maps.outgoing_to_incoming.contains_key(outgoing_id) {
            return Err(SwitchError::AlreadyExists {
                id: outgoing_id.to_string(),
            });
        }
        maps.incoming_to_outgoing
            .insert(incoming_id.to_string(), outgoing_id.to_string());
        maps.outgoing_to_incoming
            .insert(outgoing_id.to_string(), incoming_id.to_string());
        Ok(())
    }

    async fn unlink_transfer(&self, outgoing_id: &str) -> Result<()> {
        let mut maps = self.maps.write().await;
        if let Some(incoming_id) = maps.outgoing_to_incoming.remove(outgoing_id)
            && maps.incoming_to_outgoing.get(&incoming_id).map(String::as_str) == Some(outgoing_id)
        {
            maps.incoming_to_outgoing.remove(&incoming_id);
        }
        Ok(())
    }

    async fn incoming_transfer_id(&self, outgoing_id: &str) -> Result<Option<String>> {
        let maps = self.maps.read().await;
        Ok(maps.outgoing_to_incoming.get(outgoing_id).cloned())
    }

    async fn outgoing_transfer_id(&self, incoming_id: &str) -> Result<Option<String>> {
        let maps = self.maps.read().await;
        Ok(maps.incoming_to_outgoing.get(incoming_id).cloned())
    }

    async fn stats(&self) -> Result<CorrelationStats> {
        let maps = self.maps.read().await;
        let count = |map: CorrelationMap| maps.requests.get(&map).map_or(0, HashMap::len);
        Ok(CorrelationStats {
            quote_post: count(CorrelationMap::QuotePost),
            quote_put: count(CorrelationMap::QuotePut),
            quote_error: count(CorrelationMap::QuoteError),
            transfer_post: count(CorrelationMap::TransferPost),
            transfer_put: count(CorrelationMap::TransferPut),
            transfer_error: count(CorrelationMap::TransferError),
            transfer_links: maps.outgoing_to_incoming.len(),
        })
    }
}
