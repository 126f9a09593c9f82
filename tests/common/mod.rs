#![allow(dead_code)]

use mojaswitch::application::switch::{Identity, Switch};
use mojaswitch::domain::message::SwitchRequest;
use mojaswitch::domain::money::RateTable;
use mojaswitch::domain::peer::{PeerInfo, RuleSpec};
use mojaswitch::infrastructure::channel::{ChannelEndpoint, ChannelEndpointFactory, Delivery};
use mojaswitch::infrastructure::in_memory::InMemoryCorrelationStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// A switch with one in-process endpoint per peer, each with its own inbox.
pub struct Network {
    pub switch: Arc<Switch>,
    inboxes: HashMap<String, UnboundedReceiver<Delivery>>,
}

impl Network {
    pub async fn new(peers: Vec<PeerInfo>) -> Self {
        let rates = RateTable::new()
            .with_rate("USD", "XOF", dec!(579.59))
            .unwrap();
        let (factory, _unused) = ChannelEndpointFactory::new();
        let switch = Switch::new(
            Identity::default(),
            Arc::new(InMemoryCorrelationStore::new()),
            rates,
            Arc::new(factory),
        );

        let mut network = Self {
            switch,
            inboxes: HashMap::new(),
        };
        for peer in peers {
            network.add(peer).await;
        }
        network
    }

    pub async fn add(&mut self, peer: PeerInfo) {
        let (endpoint, inbox) = ChannelEndpoint::channel(&peer.id);
        self.inboxes.insert(peer.id.clone(), inbox);
        self.switch
            .add_peer(peer, Some(Arc::new(endpoint)))
            .await
            .unwrap();
    }

    /// Feeds a wire request from `from` into the switch.
    pub async fn send(
        &self,
        from: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> mojaswitch::error::Result<()> {
        let request = SwitchRequest::decode(method, path, headers_from(from), body)?;
        self.switch.receive(from, request).await.map(|_| ())
    }

    /// The next request delivered to `peer`. Panics if there is none.
    pub fn delivered(&mut self, peer: &str) -> SwitchRequest {
        self.inbox(peer)
            .try_recv()
            .unwrap_or_else(|_| panic!("nothing delivered to {peer}"))
            .request
    }

    /// Everything delivered to `peer` so far, in delivery order.
    pub fn drain(&mut self, peer: &str) -> Vec<SwitchRequest> {
        let inbox = self.inbox(peer);
        std::iter::from_fn(|| inbox.try_recv().ok())
            .map(|delivery| delivery.request)
            .collect()
    }

    pub fn nothing_delivered(&mut self, peer: &str) -> bool {
        self.inbox(peer).try_recv().is_err()
    }

    fn inbox(&mut self, peer: &str) -> &mut UnboundedReceiver<Delivery> {
        self.inboxes
            .get_mut(peer)
            .unwrap_or_else(|| panic!("unknown peer {peer}"))
    }
}

/// Alice settles in USD, Bob in XOF; both convert on the way out.
pub fn alice() -> PeerInfo {
    PeerInfo::new("alice", "USD", "moja.alice").with_rules(vec![RuleSpec::ForeignExchange])
}

pub fn bob() -> PeerInfo {
    PeerInfo::new("bob", "XOF", "moja.bob").with_rules(vec![RuleSpec::ForeignExchange])
}

pub fn headers_from(source: &str) -> Vec<(String, String)> {
    vec![
        ("FSPIOP-Source".to_string(), source.to_string()),
        ("Date".to_string(), "Sun, 18 Oct 2026 09:30:00 GMT".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]
}

pub fn quote_post(quote_id: &str, payee_address: &str, amount: Decimal, currency: &str) -> Value {
    json!({
        "quoteId": quote_id,
        "transactionId": format!("tx-{quote_id}"),
        "payee": {
            "partyIdInfo": {
                "partyIdType": "MSISDN",
                "partyIdentifier": "27713803912",
                "partySubIdOrType": payee_address,
                "fspId": "alice"
            }
        },
        "payer": {
            "partyIdInfo": {
                "partyIdType": "MSISDN",
                "partyIdentifier": "27713803913",
                "fspId": "bob"
            }
        },
        "amountType": "RECEIVE",
        "amount": { "amount": amount.to_string(), "currency": currency },
        "transactionType": {
            "scenario": "TRANSFER",
            "initiator": "PAYER",
            "initiatorType": "CONSUMER"
        }
    })
}

pub fn quote_put(amount: Decimal, currency: &str) -> Value {
    json!({
        "transferAmount": { "amount": amount.to_string(), "currency": currency },
        "expiration": "2026-10-18T12:00:00.000Z",
        "ilpPacket": "AQAAAAAAAADIEHByaXZhdGUucGF5ZWVmc3A",
        "condition": "HOr22-H3AfTDHrSkPjJtVPRdKouuMkDXTR4ejlQa8Ks"
    })
}

pub fn transfer_post(transfer_id: &str, quote_id: &str, amount: Decimal, currency: &str) -> Value {
    json!({
        "transferId": transfer_id,
        "quoteId": quote_id,
        "payeeFsp": "fxp",
        "payerFsp": "bob",
        "amount": { "amount": amount.to_string(), "currency": currency },
        "ilpPacket": "AQAAAAAAAADIEHByaXZhdGUucGF5ZWVmc3A",
        "condition": "HOr22-H3AfTDHrSkPjJtVPRdKouuMkDXTR4ejlQa8Ks",
        "expiration": "2026-10-18T12:00:00.000Z"
    })
}

pub fn transfer_put(state: &str) -> Value {
    json!({
        "transferState": state,
        "fulfilment": "oAKAAA",
        "completedTimestamp": "2026-10-18T09:31:00.000Z"
    })
}

pub fn error_callback(code: &str, description: &str) -> Value {
    json!({
        "errorInformation": {
            "errorCode": code,
            "errorDescription": description
        }
    })
}
