mod common;

use common::{Network, alice, bob, headers_from, quote_post, quote_put};
use mojaswitch::domain::message::{HEADER_DESTINATION, MessageKind, SwitchRequest};
use mojaswitch::domain::peer::{PeerInfo, RuleSpec};
use rand::seq::SliceRandom;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use tokio::task::JoinSet;

const QUOTES: usize = 50;

fn requester(i: usize) -> &'static str {
    if i % 2 == 0 { "bob" } else { "dave" }
}

#[tokio::test]
async fn test_interleaved_answers_return_to_their_requesters() {
    let dave =
        PeerInfo::new("dave", "XOF", "moja.dave").with_rules(vec![RuleSpec::ForeignExchange]);
    let mut network = Network::new(vec![alice(), bob(), dave]).await;

    for i in 0..QUOTES {
        network
            .send(
                requester(i),
                "POST",
                "/quotes",
                Some(quote_post(&format!("q{i}"), "moja.alice.1", dec!(579.59), "XOF")),
            )
            .await
            .unwrap();
    }
    for _ in 0..QUOTES {
        assert_eq!(network.delivered("alice").kind(), MessageKind::QuotePost);
    }

    // Alice answers in random order, concurrently
    let mut order: Vec<usize> = (0..QUOTES).collect();
    order.shuffle(&mut rand::thread_rng());
    let mut tasks = JoinSet::new();
    for i in order {
        let switch = network.switch.clone();
        tasks.spawn(async move {
            let request = SwitchRequest::decode(
                "PUT",
                &format!("/quotes/q{i}"),
                headers_from("alice"),
                Some(quote_put(dec!(1), "USD")),
            )
            .unwrap();
            switch.receive("alice", request).await.unwrap();
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    for peer in ["bob", "dave"] {
        let mut answered = BTreeSet::new();
        for delivered in network.drain(peer) {
            assert_eq!(delivered.header(HEADER_DESTINATION), Some(peer));
            assert_eq!(delivered.body.amount().unwrap().amount, dec!(579.59));
            answered.insert(delivered.object_id.unwrap());
        }
        let expected: BTreeSet<String> = (0..QUOTES)
            .filter(|i| requester(*i) == peer)
            .map(|i| format!("q{i}"))
            .collect();
        assert_eq!(answered, expected);
    }
}
