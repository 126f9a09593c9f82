//! Business rules available to peer pipelines.

pub mod fx;
pub mod tracking;

use crate::application::pipeline::ManagedRule;
use crate::domain::money::RateTable;
use crate::domain::peer::{PeerInfo, RuleSpec};
use crate::domain::ports::CorrelationStoreRef;
use fx::ForeignExchangeRule;
use std::sync::Arc;
use tracking::TrackRequestsRule;

/// Switch-wide collaborators rules are built from.
#[derive(Clone)]
pub struct RuleContext {
    pub store: CorrelationStoreRef,
    pub rates: Arc<RateTable>,
}

/// Instantiates the pipeline for `peer`: request tracking first, then the
/// peer's configured rules in order.
pub fn create_rules(peer: &PeerInfo, context: &RuleContext) -> Vec<Arc<ManagedRule>> {
    std::iter::once(RuleSpec::TrackRequests)
        .chain(
            peer.rules
                .iter()
                .copied()
                .filter(|spec| *spec != RuleSpec::TrackRequests),
        )
        .map(|spec| Arc::new(instantiate(spec, peer, context)))
        .collect()
}

fn instantiate(spec: RuleSpec, peer: &PeerInfo, context: &RuleContext) -> ManagedRule {
    match spec {
        RuleSpec::TrackRequests => {
            ManagedRule::new(TrackRequestsRule::new(&peer.id, context.store.clone()))
        }
        RuleSpec::ForeignExchange => {
            ManagedRule::new(ForeignExchangeRule::new(peer, context.rates.clone()))
        }
    }
}
