use super::peer::Relation;
use crate::error::{NotFoundKind, Result, SwitchError};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A route towards an address prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub peer: String,
    pub path: Vec<String>,
}

/// Admin view of one routing-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub next_hop: String,
    pub path: Vec<String>,
}

/// Longest-prefix-match table from destination address to next-hop peer.
///
/// Prefixes match on whole address segments: `moja.alice` matches
/// `moja.alice` and `moja.alice.wallet` but not `moja.alicexyz`. The empty
/// prefix is a default route. Adding a prefix that already exists replaces
/// it, so the last registered route wins.
#[derive(Debug, Default)]
pub struct RoutingTable {
    peers: HashMap<String, Relation>,
    routes: BTreeMap<String, Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&mut self, id: &str, relation: Relation) {
        self.peers.insert(id.to_string(), relation);
    }

    /// Adds a route. The peer must have been added first.
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        if !self.peers.contains_key(&route.peer) {
            return Err(SwitchError::not_found(NotFoundKind::Peer, route.peer));
        }
        self.routes.insert(route.prefix.clone(), route);
        Ok(())
    }

    /// Returns the peer id of the longest matching prefix, if any.
    pub fn next_hop(&self, address: &str) -> Option<&str> {
        self.routes
            .values()
            .filter(|route| prefix_matches(&route.prefix, address))
            .max_by_key(|route| route.prefix.len())
            .map(|route| route.peer.as_str())
    }

    /// Like [`next_hop`](Self::next_hop) but treats a miss as unroutable.
    pub fn resolve(&self, address: &str) -> Result<String> {
        self.next_hop(address)
            .map(str::to_string)
            .ok_or_else(|| SwitchError::Unroutable {
                address: address.to_string(),
            })
    }

    pub fn summary(&self) -> BTreeMap<String, RouteSummary> {
        self.routes
            .iter()
            .map(|(prefix, route)| {
                (
                    prefix.clone(),
                    RouteSummary {
                        next_hop: route.peer.clone(),
                        path: route.path.clone(),
                    },
                )
            })
            .collect()
    }
}

fn prefix_matches(prefix: &str, address: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match address.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
