use crate::application::headers::{HeaderInputs, rewrite_headers};
use crate::application::pipeline::{Direction, ManagedRule, compose};
use crate::application::rules::{RuleContext, create_rules};
use crate::domain::correlation::{CorrelationMap, CorrelationStats, RequestMapEntry};
use crate::domain::message::{
    HEADER_DATE, MessageBody, MessageKind, SwitchReply, SwitchRequest, TransfersPostRequest,
};
use crate::domain::money::RateTable;
use crate::domain::peer::PeerInfo;
use crate::domain::ports::{
    CorrelationStoreRef, EndpointFactory, EndpointRef, RequestHandler, RequestHandlerRef,
};
use crate::domain::routing::{Route, RouteSummary, RoutingTable};
use crate::error::{NotFoundKind, Result, SwitchError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Process-wide identity of this switch node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Address prefix of the switch itself.
    pub address: String,
    /// FSP id the switch uses as source and as payer of spliced transfers.
    pub id: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            address: "unknown".to_string(),
            id: "fxp".to_string(),
        }
    }
}

struct PeerSlot {
    info: PeerInfo,
    rules: Vec<Arc<ManagedRule>>,
    endpoint: EndpointRef,
    outgoing: RequestHandlerRef,
}

/// A message ready to leave the switch.
struct Outbound {
    next_hop: String,
    request: SwitchRequest,
    /// `(outgoing, incoming)` transfer ids to link once the send is certain.
    link: Option<(String, String)>,
}

/// The switching node: peer registry, routing table and dispatcher.
///
/// Requests from a peer run through that peer's incoming pipeline and end in
/// [`Switch::send_outgoing_request`], which picks the next hop, rebuilds the
/// message and hands it to the next hop's outgoing pipeline.
///
/// Registry, routing table and correlation store are each behind their own
/// lock; no lock is held while a request is in flight.
pub struct Switch {
    identity: RwLock<Identity>,
    peers: RwLock<HashMap<String, PeerSlot>>,
    routing: RwLock<RoutingTable>,
    store: CorrelationStoreRef,
    rule_context: RuleContext,
    endpoints: Arc<dyn EndpointFactory>,
    this: Weak<Switch>,
}

impl Switch {
    /// Creates a new `Switch`.
    ///
    /// # Arguments
    ///
    /// * `identity` - Own address and FSP id.
    /// * `store` - Correlation store shared by every peer's tracking rule.
    /// * `rates` - Exchange rates for the foreign-exchange rule.
    /// * `endpoints` - Creates endpoints for peers added without one.
    pub fn new(
        identity: Identity,
        store: CorrelationStoreRef,
        rates: RateTable,
        endpoints: Arc<dyn EndpointFactory>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            identity: RwLock::new(identity),
            peers: RwLock::new(HashMap::new()),
            routing: RwLock::new(RoutingTable::new()),
            rule_context: RuleContext {
                store: store.clone(),
                rates: Arc::new(rates),
            },
            store,
            endpoints,
            this: this.clone(),
        })
    }

    /// Registers a peer, routes its address to it and starts its pipeline.
    ///
    /// Without an `endpoint` one is created by the endpoint factory.
    pub async fn add_peer(&self, info: PeerInfo, endpoint: Option<EndpointRef>) -> Result<()> {
        info!(
            peer = %info.id,
            address = %info.address,
            asset = %info.asset_code,
            "adding new peer"
        );
        if self.peers.read().await.contains_key(&info.id) {
            return Err(SwitchError::AlreadyExists { id: info.id });
        }

        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => self.endpoints.create(&info).inspect_err(|e| {
                error!(peer = %info.id, error = %e, "failed to create endpoint");
            })?,
        };

        let rules = create_rules(&info, &self.rule_context);
        for rule in &rules {
            if let Err(e) = rule.startup().await {
                error!(peer = %info.id, rule = rule.name(), error = %e, "rule failed to start");
                shutdown_rules(&info.id, &rules).await;
                return Err(e);
            }
        }

        let sender: RequestHandlerRef = Arc::new(TransportSender {
            peer_id: info.id.clone(),
            endpoint: endpoint.clone(),
        });
        let dispatcher: RequestHandlerRef = Arc::new(DispatchHandle {
            switch: self.this.clone(),
        });
        let outgoing = compose(Direction::Outgoing, &rules, sender);
        let incoming = compose(Direction::Incoming, &rules, dispatcher);

        let mut peers = self.peers.write().await;
        if peers.contains_key(&info.id) {
            drop(peers);
            shutdown_rules(&info.id, &rules).await;
            return Err(SwitchError::AlreadyExists { id: info.id });
        }
        {
            let mut routing = self.routing.write().await;
            routing.add_peer(&info.id, info.relation);
            routing.add_route(Route {
                prefix: info.address.clone(),
                peer: info.id.clone(),
                path: Vec::new(),
            })?;
        }
        endpoint.set_incoming_request_handler(incoming).await;
        peers.insert(
            info.id.clone(),
            PeerSlot {
                info,
                rules,
                endpoint,
                outgoing,
            },
        );
        Ok(())
    }

    /// Shuts down the peer's rules in order, then forgets the peer.
    ///
    /// The peer's route stays in the routing table, so requests routed to it
    /// afterwards fail with a missing outgoing handler.
    pub async fn remove_peer(&self, id: &str) -> Result<()> {
        info!(peer = id, "removing peer");
        let rules = self
            .peers
            .read()
            .await
            .get(id)
            .map(|slot| slot.rules.clone())
            .ok_or_else(|| SwitchError::not_found(NotFoundKind::Peer, id))?;

        shutdown_rules(id, &rules).await;
        self.peers.write().await.remove(id);
        Ok(())
    }

    pub async fn peer_info(&self, id: &str) -> Result<PeerInfo> {
        self.peers
            .read()
            .await
            .get(id)
            .map(|slot| slot.info.clone())
            .ok_or_else(|| {
                error!(peer = id, "no peer information found");
                SwitchError::not_found(NotFoundKind::Peer, id)
            })
    }

    pub async fn peers(&self) -> BTreeMap<String, PeerInfo> {
        self.peers
            .read()
            .await
            .iter()
            .map(|(id, slot)| (id.clone(), slot.info.clone()))
            .collect()
    }

    /// The peer's rule instances in pipeline order; empty for unknown peers.
    pub async fn rules(&self, id: &str) -> Vec<Arc<ManagedRule>> {
        self.peers
            .read()
            .await
            .get(id)
            .map(|slot| slot.rules.clone())
            .unwrap_or_default()
    }

    pub async fn peer_endpoint(&self, id: &str) -> Result<EndpointRef> {
        self.peers
            .read()
            .await
            .get(id)
            .map(|slot| slot.endpoint.clone())
            .ok_or_else(|| SwitchError::not_found(NotFoundKind::Endpoint, id))
    }

    /// Feeds a request received from `peer_id` into that peer's pipeline, as
    /// its transport would.
    pub async fn receive(&self, peer_id: &str, request: SwitchRequest) -> Result<SwitchReply> {
        let endpoint = self.peer_endpoint(peer_id).await?;
        endpoint.handle_incoming_request(request).await
    }

    pub async fn set_own_address(&self, address: &str) {
        info!(address, "setting address");
        self.identity.write().await.address = address.to_string();
    }

    pub async fn own_address(&self) -> String {
        self.identity.read().await.address.clone()
    }

    pub async fn set_own_id(&self, id: &str) {
        info!(id, "setting switch id");
        self.identity.write().await.id = id.to_string();
    }

    pub async fn own_id(&self) -> String {
        self.identity.read().await.id.clone()
    }

    pub async fn routes(&self) -> BTreeMap<String, RouteSummary> {
        self.routing.read().await.summary()
    }

    pub async fn next_hop(&self, address: &str) -> Option<String> {
        self.routing.read().await.next_hop(address).map(str::to_string)
    }

    pub fn correlation_store(&self) -> &CorrelationStoreRef {
        &self.store
    }

    pub async fn correlation_stats(&self) -> Result<CorrelationStats> {
        self.store.stats().await
    }

    /// Dispatches a request that has passed its source peer's incoming
    /// pipeline.
    ///
    /// Either the complete outbound message is built and handed to the next
    /// hop, or nothing is sent.
    pub async fn send_outgoing_request(&self, request: SwitchRequest) -> Result<SwitchReply> {
        let kind = request.kind();
        let own_id = self.own_id().await;
        let outbound = self.plan(request, &own_id).await.inspect_err(|e| {
            warn!(%kind, error = %e, "failed to build outgoing request");
        })?;

        let handler = self.outgoing_handler(&outbound.next_hop).await?;
        let linked = match outbound.link {
            Some((outgoing, incoming)) => {
                self.store.link_transfer(&outgoing, &incoming).await?;
                Some(outgoing)
            }
            None => None,
        };

        debug!(
            %kind,
            next_hop = %outbound.next_hop,
            headers = ?outbound.request.headers,
            "sending outgoing request"
        );
        let result = handler.handle(outbound.request).await;
        if let Err(e) = &result
            && let Some(outgoing) = linked
        {
            warn!(%outgoing, error = %e, "transfer leg not sent, unlinking");
            if let Err(e) = self.store.unlink_transfer(&outgoing).await {
                error!(%outgoing, error = %e, "failed to unlink transfer leg");
            }
        }
        result
    }

    async fn outgoing_handler(&self, next_hop: &str) -> Result<RequestHandlerRef> {
        self.peers
            .read()
            .await
            .get(next_hop)
            .map(|slot| slot.outgoing.clone())
            .ok_or_else(|| {
                error!(next_hop, "handler not found for next hop");
                SwitchError::not_found(NotFoundKind::OutgoingHandler, next_hop)
            })
    }

    async fn resolve(&self, address: &str) -> Result<String> {
        self.routing.read().await.resolve(address)
    }

    async fn lookup(&self, map: CorrelationMap, id: &str) -> Result<RequestMapEntry> {
        self.store.get(map, id).await?.ok_or_else(|| {
            error!(%map, id, "no request on record");
            SwitchError::not_found(NotFoundKind::Request(map), id)
        })
    }

    /// The incoming transfer an outgoing leg was spliced from.
    async fn incoming_transfer(&self, outgoing_id: &str) -> Result<(String, RequestMapEntry)> {
        let incoming_id = self
            .store
            .incoming_transfer_id(outgoing_id)
            .await?
            .ok_or_else(|| SwitchError::not_found(NotFoundKind::OutgoingTransfer, outgoing_id))?;
        let entry = self.lookup(CorrelationMap::TransferPost, &incoming_id).await?;
        Ok((incoming_id, entry))
    }

    async fn plan(&self, request: SwitchRequest, own_id: &str) -> Result<Outbound> {
        let kind = request.kind();
        let object_id = match kind {
            MessageKind::QuotePost | MessageKind::TransferPost => String::new(),
            _ => request.require_object_id()?.to_string(),
        };
        let SwitchRequest { headers, body, .. } = request;
        let date = headers.get(HEADER_DATE).map(String::as_str);
        let now = Utc::now();
        let base = HeaderInputs {
            kind,
            date,
            own_id,
            next_hop: "",
            correlation_id: &object_id,
            correlated: None,
        };

        match body {
            MessageBody::QuotePost(post) => {
                let next_hop = self.resolve(post.payee_address()).await?;
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        correlation_id: &post.quote_id,
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(headers, None, MessageBody::QuotePost(post)),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::QuotePut(mut put) => {
                let quote_post = self.lookup(CorrelationMap::QuotePost, &object_id).await?;
                let next_hop = quote_post.source_peer_id.clone();
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        correlated: Some(&quote_post),
                        ..base
                    },
                    now,
                )?;
                put.transfer_destination = Some(own_id.to_string());
                Ok(Outbound {
                    request: SwitchRequest::new(
                        headers,
                        Some(object_id),
                        MessageBody::QuotePut(put),
                    ),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::QuoteError(error) => {
                let quote_post = self.lookup(CorrelationMap::QuotePost, &object_id).await?;
                let next_hop = quote_post.source_peer_id;
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(
                        headers,
                        Some(object_id),
                        MessageBody::QuoteError(error),
                    ),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::QuoteGet => {
                let quote_post = self.lookup(CorrelationMap::QuotePost, &object_id).await?;
                let address = match &quote_post.body {
                    MessageBody::QuotePost(post) => post.payee_address(),
                    _ => "",
                };
                let next_hop = self.resolve(address).await?;
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(headers, Some(object_id), MessageBody::QuoteGet),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::TransferPost(post) => {
                let quote_put = self.lookup(CorrelationMap::QuotePut, &post.quote_id).await?;
                let next_hop = quote_put.source_peer_id.clone();
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        correlation_id: &post.quote_id,
                        correlated: Some(&quote_put),
                        ..base
                    },
                    now,
                )?;

                // A resent transfer goes out again on the leg it already has.
                let (transfer_id, link) =
                    match self.store.outgoing_transfer_id(&post.transfer_id).await? {
                        Some(outgoing) => {
                            info!(
                                incoming = %post.transfer_id,
                                %outgoing,
                                next_hop = %next_hop,
                                "resending transfer leg"
                            );
                            (outgoing, None)
                        }
                        None => {
                            let outgoing = Uuid::new_v4().to_string();
                            info!(
                                incoming = %post.transfer_id,
                                %outgoing,
                                next_hop = %next_hop,
                                "splicing transfer leg"
                            );
                            (outgoing.clone(), Some((outgoing, post.transfer_id.clone())))
                        }
                    };
                // The amount is carried over as is; the next hop's
                // foreign-exchange rule converts it on the way out.
                let leg = TransfersPostRequest {
                    transfer_id,
                    quote_id: post.quote_id,
                    payer_fsp: own_id.to_string(),
                    payee_fsp: quote_put.recorded_destination().to_string(),
                    amount: post.amount,
                    ilp_packet: post.ilp_packet,
                    condition: post.condition,
                    expiration: post.expiration,
                    extension_list: post.extension_list,
                };
                Ok(Outbound {
                    request: SwitchRequest::new(headers, None, MessageBody::TransferPost(leg)),
                    next_hop,
                    link,
                })
            }
            MessageBody::TransferPut(put) => {
                let (incoming_id, transfer_post) = self.incoming_transfer(&object_id).await?;
                let next_hop = transfer_post.source_peer_id.clone();
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        correlated: Some(&transfer_post),
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(
                        headers,
                        Some(incoming_id),
                        MessageBody::TransferPut(put),
                    ),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::TransferError(error) => {
                let (incoming_id, transfer_post) = self.incoming_transfer(&object_id).await?;
                let next_hop = transfer_post.source_peer_id;
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(
                        headers,
                        Some(incoming_id),
                        MessageBody::TransferError(error),
                    ),
                    next_hop,
                    link: None,
                })
            }
            MessageBody::TransferGet => {
                let transfer_post = self.lookup(CorrelationMap::TransferPost, &object_id).await?;
                let outgoing_id = self
                    .store
                    .outgoing_transfer_id(&object_id)
                    .await?
                    .ok_or_else(|| {
                        SwitchError::not_found(NotFoundKind::OutgoingTransfer, object_id.as_str())
                    })?;
                let quote_id = match &transfer_post.body {
                    MessageBody::TransferPost(post) => post.quote_id.as_str(),
                    _ => "",
                };
                let quote_put = self.lookup(CorrelationMap::QuotePut, quote_id).await?;
                let next_hop = quote_put.source_peer_id;
                let headers = rewrite_headers(
                    &HeaderInputs {
                        next_hop: &next_hop,
                        ..base
                    },
                    now,
                )?;
                Ok(Outbound {
                    request: SwitchRequest::new(
                        headers,
                        Some(outgoing_id),
                        MessageBody::TransferGet,
                    ),
                    next_hop,
                    link: None,
                })
            }
        }
    }
}

async fn shutdown_rules(peer_id: &str, rules: &[Arc<ManagedRule>]) {
    for rule in rules {
        if let Err(e) = rule.shutdown().await {
            warn!(peer = peer_id, rule = rule.name(), error = %e, "rule shutdown failed");
        }
    }
}

/// Terminal of every incoming pipeline. Holds the switch weakly so that the
/// endpoints the switch owns do not keep it alive.
struct DispatchHandle {
    switch: Weak<Switch>,
}

#[async_trait]
impl RequestHandler for DispatchHandle {
    async fn handle(&self, request: SwitchRequest) -> Result<SwitchReply> {
        match self.switch.upgrade() {
            Some(switch) => switch.send_outgoing_request(request).await,
            None => Err(SwitchError::InvalidState {
                rule: "dispatch".to_string(),
                state: "switch dropped".to_string(),
            }),
        }
    }
}

/// Terminal of every outgoing pipeline.
struct TransportSender {
    peer_id: String,
    endpoint: EndpointRef,
}

#[async_trait]
impl RequestHandler for TransportSender {
    async fn handle(&self, request: SwitchRequest) -> Result<SwitchReply> {
        self.endpoint
            .send_outgoing_request(request)
            .await
            .map_err(|e| match e {
                SwitchError::Transport { .. } => e,
                other => SwitchError::Transport {
                    peer: self.peer_id.clone(),
                    reason: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::RuleState;
    use crate::domain::peer::RuleSpec;
    use crate::infrastructure::channel::{ChannelEndpoint, ChannelEndpointFactory};
    use crate::infrastructure::in_memory::InMemoryCorrelationStore;

    fn switch_with(endpoints: Arc<dyn EndpointFactory>) -> Arc<Switch> {
        Switch::new(
            Identity::default(),
            Arc::new(InMemoryCorrelationStore::new()),
            RateTable::new(),
            endpoints,
        )
    }

    fn switch() -> Arc<Switch> {
        let (factory, _rx) = ChannelEndpointFactory::new();
        switch_with(Arc::new(factory))
    }

    struct NoTransport;

    impl EndpointFactory for NoTransport {
        fn create(&self, peer: &PeerInfo) -> Result<EndpointRef> {
            Err(SwitchError::Config(format!("no transport for {}", peer.id)))
        }
    }

    #[tokio::test]
    async fn test_added_peer_is_next_hop_for_its_address() {
        let switch = switch();
        switch
            .add_peer(PeerInfo::new("alice", "USD", "moja.alice"), None)
            .await
            .unwrap();

        assert_eq!(switch.next_hop("moja.alice").await.as_deref(), Some("alice"));
        assert_eq!(switch.peer_info("alice").await.unwrap().asset_code, "USD");
        assert!(switch.peer_endpoint("alice").await.is_ok());
    }

    #[tokio::test]
    async fn test_routes_list_each_added_peer() {
        let switch = switch();
        assert!(switch.routes().await.is_empty());
        switch
            .add_peer(PeerInfo::new("alice", "USD", "moja.alice"), None)
            .await
            .unwrap();
        switch
            .add_peer(PeerInfo::new("bob", "XOF", "moja.bob"), None)
            .await
            .unwrap();

        let routes = switch.routes().await;
        assert_eq!(
            routes.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["moja.alice", "moja.bob"]
        );
        assert_eq!(
            routes["moja.alice"],
            RouteSummary {
                next_hop: "alice".to_string(),
                path: Vec::new(),
            }
        );
        assert_eq!(routes["moja.bob"].next_hop, "bob");
    }

    #[tokio::test]
    async fn test_endpoint_failure_leaves_no_peer_behind() {
        let switch = switch_with(Arc::new(NoTransport));
        let peer = PeerInfo::new("alice", "USD", "moja.alice")
            .with_rules(vec![RuleSpec::ForeignExchange]);

        let result = switch.add_peer(peer, None).await;
        assert!(matches!(result, Err(SwitchError::Config(ref m)) if m.contains("alice")));
        assert!(switch.peers().await.is_empty());
        assert!(switch.rules("alice").await.is_empty());
        assert!(switch.routes().await.is_empty());

        // A peer with its own endpoint does not need the factory.
        let (endpoint, _rx) = ChannelEndpoint::channel("alice");
        switch
            .add_peer(PeerInfo::new("alice", "USD", "moja.alice"), Some(Arc::new(endpoint)))
            .await
            .unwrap();
        assert_eq!(switch.next_hop("moja.alice").await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_rules_are_started_on_add_and_stopped_on_remove() {
        let switch = switch();
        let peer = PeerInfo::new("alice", "USD", "moja.alice")
            .with_rules(vec![RuleSpec::ForeignExchange]);
        switch.add_peer(peer, None).await.unwrap();

        let rules = switch.rules("alice").await;
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|rule| rule.state() == RuleState::Started));

        switch.remove_peer("alice").await.unwrap();
        assert!(rules.iter().all(|rule| rule.state() == RuleState::Stopped));
        assert!(switch.rules("alice").await.is_empty());
        assert!(!switch.peers().await.contains_key("alice"));
        assert!(matches!(
            switch.peer_endpoint("alice").await,
            Err(SwitchError::NotFound {
                kind: NotFoundKind::Endpoint,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_peer_is_rejected() {
        let switch = switch();
        let (endpoint, _rx) = ChannelEndpoint::channel("alice");
        switch
            .add_peer(PeerInfo::new("alice", "USD", "moja.alice"), Some(Arc::new(endpoint)))
            .await
            .unwrap();

        let result = switch
            .add_peer(PeerInfo::new("alice", "XOF", "moja.other"), None)
            .await;
        assert!(matches!(result, Err(SwitchError::AlreadyExists { .. })));
        assert_eq!(switch.peer_info("alice").await.unwrap().asset_code, "USD");
    }

    #[tokio::test]
    async fn test_remove_unknown_peer() {
        let switch = switch();
        assert!(matches!(
            switch.remove_peer("nobody").await,
            Err(SwitchError::NotFound {
                kind: NotFoundKind::Peer,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_identity_is_mutable() {
        let switch = switch();
        assert_eq!(switch.own_address().await, "unknown");
        switch.set_own_address("moja.super-remit").await;
        switch.set_own_id("super-remit").await;
        assert_eq!(switch.own_address().await, "moja.super-remit");
        assert_eq!(switch.own_id().await, "super-remit");
    }

    #[tokio::test]
    async fn test_dropped_switch_rejects_incoming() {
        let (endpoint, _rx) = ChannelEndpoint::channel("alice");
        let endpoint: EndpointRef = Arc::new(endpoint);
        {
            let switch = switch();
            switch
                .add_peer(PeerInfo::new("alice", "USD", "moja.alice"), Some(endpoint.clone()))
                .await
                .unwrap();
        }

        let get = SwitchRequest::new(
            Default::default(),
            Some("q1".to_string()),
            MessageBody::QuoteGet,
        );
        assert!(matches!(
            endpoint.handle_incoming_request(get).await,
            Err(SwitchError::InvalidState { .. })
        ));
    }
}
