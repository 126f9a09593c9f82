use serde::{Deserialize, Serialize};

/// How a peer relates to this switch in the routing hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Peer,
    Parent,
    Child,
}

/// A business rule configured for a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum RuleSpec {
    TrackRequests,
    ForeignExchange,
}

/// Configuration of a directly connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    /// The unique identifier for the peer, also its FSP id.
    pub id: String,
    /// Settlement currency of the peer.
    pub asset_code: String,
    pub asset_scale: u8,
    pub relation: Relation,
    /// Address prefix announced by the peer.
    #[serde(alias = "mojaAddress")]
    pub address: String,
    #[serde(default, alias = "url")]
    pub endpoint_url: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl PeerInfo {
    pub fn new(id: &str, asset_code: &str, address: &str) -> Self {
        Self {
            id: id.to_string(),
            asset_code: asset_code.to_string(),
            asset_scale: 2,
            relation: Relation::Peer,
            address: address.to_string(),
            endpoint_url: String::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<RuleSpec>) -> Self {
        self.rules = rules;
        self
    }
}
