mod common;

use common::{Network, alice, bob, quote_post, quote_put, transfer_post, transfer_put};
use mojaswitch::domain::correlation::CorrelationMap;
use mojaswitch::domain::message::{
    HEADER_ACCEPT, HEADER_CONTENT_TYPE, HEADER_DATE, HEADER_DESTINATION, HEADER_SOURCE,
    MessageBody, MessageKind, QUOTES_MEDIA_TYPE, TRANSFERS_MEDIA_TYPE,
};
use mojaswitch::domain::ports::CorrelationStore;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_quote_post_is_routed_by_payee_address() {
    let mut network = Network::new(vec![alice(), bob()]).await;

    network
        .send(
            "bob",
            "POST",
            "/quotes",
            Some(quote_post("q1", "moja.alice.27713803912", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();

    let delivered = network.delivered("alice");
    assert_eq!(delivered.kind(), MessageKind::QuotePost);
    assert_eq!(delivered.header(HEADER_SOURCE), Some("fxp"));
    assert_eq!(delivered.header(HEADER_DESTINATION), None);
    assert_eq!(delivered.header(HEADER_CONTENT_TYPE), Some(QUOTES_MEDIA_TYPE));
    assert_eq!(delivered.header(HEADER_ACCEPT), Some(QUOTES_MEDIA_TYPE));
    assert_eq!(delivered.header(HEADER_DATE), Some("Sun, 18 Oct 2026 09:30:00 GMT"));

    // Converted into Alice's currency on the way out
    let amount = delivered.body.amount().unwrap();
    assert_eq!(amount.amount, dec!(10));
    assert_eq!(amount.currency, "USD");
    assert!(network.nothing_delivered("bob"));
}

#[tokio::test]
async fn test_full_quote_and_transfer_flow() {
    let mut network = Network::new(vec![alice(), bob()]).await;

    // Quote request from Bob towards Alice's address
    network
        .send(
            "bob",
            "POST",
            "/quotes",
            Some(quote_post("q1", "moja.alice.27713803912", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();
    network.delivered("alice");

    // Alice answers the quote; the answer goes back to Bob
    network
        .send("alice", "PUT", "/quotes/q1", Some(quote_put(dec!(10), "USD")))
        .await
        .unwrap();
    let quote = network.delivered("bob");
    assert_eq!(quote.kind(), MessageKind::QuotePut);
    assert_eq!(quote.object_id.as_deref(), Some("q1"));
    assert_eq!(quote.header(HEADER_SOURCE), Some("fxp"));
    assert_eq!(quote.header(HEADER_DESTINATION), Some("bob"));
    match &quote.body {
        MessageBody::QuotePut(put) => {
            assert_eq!(put.transfer_destination.as_deref(), Some("fxp"));
            assert_eq!(put.transfer_amount.amount, dec!(5795.90));
            assert_eq!(put.transfer_amount.currency, "XOF");
        }
        other => panic!("unexpected body {other:?}"),
    }

    // Bob pays the switch; the switch opens its own leg towards Alice
    network
        .send(
            "bob",
            "POST",
            "/transfers",
            Some(transfer_post("t1", "q1", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();
    let leg = network.delivered("alice");
    assert_eq!(leg.header(HEADER_DESTINATION), Some("alice"));
    assert_eq!(leg.header(HEADER_CONTENT_TYPE), Some(TRANSFERS_MEDIA_TYPE));
    let outgoing_id = match &leg.body {
        MessageBody::TransferPost(post) => {
            assert_ne!(post.transfer_id, "t1");
            assert_eq!(post.quote_id, "q1");
            assert_eq!(post.payer_fsp, "fxp");
            assert_eq!(post.payee_fsp, "alice");
            assert_eq!(post.amount.amount, dec!(10));
            assert_eq!(post.amount.currency, "USD");
            post.transfer_id.clone()
        }
        other => panic!("unexpected body {other:?}"),
    };

    let store = network.switch.correlation_store();
    assert_eq!(
        store.incoming_transfer_id(&outgoing_id).await.unwrap().as_deref(),
        Some("t1")
    );
    assert_eq!(
        store.outgoing_transfer_id("t1").await.unwrap(),
        Some(outgoing_id.clone())
    );

    // Alice fulfils the leg; Bob learns about his own transfer id
    network
        .send(
            "alice",
            "PUT",
            &format!("/transfers/{outgoing_id}"),
            Some(transfer_put("COMMITTED")),
        )
        .await
        .unwrap();
    let fulfilment = network.delivered("bob");
    assert_eq!(fulfilment.kind(), MessageKind::TransferPut);
    assert_eq!(fulfilment.object_id.as_deref(), Some("t1"));
    assert_eq!(fulfilment.header(HEADER_DESTINATION), Some("bob"));
    assert_eq!(fulfilment.header(HEADER_CONTENT_TYPE), Some(TRANSFERS_MEDIA_TYPE));

    let stats = network.switch.correlation_stats().await.unwrap();
    assert_eq!(stats.count(CorrelationMap::QuotePost), 1);
    assert_eq!(stats.count(CorrelationMap::QuotePut), 1);
    assert_eq!(stats.count(CorrelationMap::TransferPost), 1);
    assert_eq!(stats.count(CorrelationMap::TransferPut), 1);
    assert_eq!(stats.transfer_links, 1);
}

#[tokio::test]
async fn test_get_requests_follow_the_recorded_legs() {
    let mut network = Network::new(vec![alice(), bob()]).await;
    network
        .send(
            "bob",
            "POST",
            "/quotes",
            Some(quote_post("q1", "moja.alice.27713803912", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();
    network.delivered("alice");

    network.send("bob", "GET", "/quotes/q1", None).await.unwrap();
    let get = network.delivered("alice");
    assert_eq!(get.kind(), MessageKind::QuoteGet);
    assert_eq!(get.header(HEADER_DESTINATION), Some("alice"));

    network
        .send("alice", "PUT", "/quotes/q1", Some(quote_put(dec!(10), "USD")))
        .await
        .unwrap();
    network.delivered("bob");
    network
        .send(
            "bob",
            "POST",
            "/transfers",
            Some(transfer_post("t1", "q1", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();
    let leg = network.delivered("alice");

    network.send("bob", "GET", "/transfers/t1", None).await.unwrap();
    let get = network.delivered("alice");
    assert_eq!(get.kind(), MessageKind::TransferGet);
    match &leg.body {
        MessageBody::TransferPost(post) => {
            assert_eq!(get.object_id.as_deref(), Some(post.transfer_id.as_str()));
        }
        other => panic!("unexpected body {other:?}"),
    }
}

#[tokio::test]
async fn test_resent_transfer_reuses_its_leg() {
    let mut network = Network::new(vec![alice(), bob()]).await;
    network
        .send(
            "bob",
            "POST",
            "/quotes",
            Some(quote_post("q1", "moja.alice.27713803912", dec!(5795.90), "XOF")),
        )
        .await
        .unwrap();
    network.delivered("alice");
    network
        .send("alice", "PUT", "/quotes/q1", Some(quote_put(dec!(10), "USD")))
        .await
        .unwrap();
    network.delivered("bob");

    // Bob resends his transfer, e.g. after a timeout
    for _ in 0..2 {
        network
            .send(
                "bob",
                "POST",
                "/transfers",
                Some(transfer_post("t1", "q1", dec!(5795.90), "XOF")),
            )
            .await
            .unwrap();
    }
    let leg_ids: Vec<String> = network
        .drain("alice")
        .into_iter()
        .map(|leg| match leg.body {
            MessageBody::TransferPost(post) => post.transfer_id,
            other => panic!("unexpected body {other:?}"),
        })
        .collect();
    assert_eq!(leg_ids.len(), 2);
    assert_eq!(leg_ids[0], leg_ids[1]);

    // A fulfilment of the first leg sent still reaches Bob
    network
        .send(
            "alice",
            "PUT",
            &format!("/transfers/{}", leg_ids[0]),
            Some(transfer_put("COMMITTED")),
        )
        .await
        .unwrap();
    let fulfilment = network.delivered("bob");
    assert_eq!(fulfilment.object_id.as_deref(), Some("t1"));
    assert_eq!(network.switch.correlation_stats().await.unwrap().transfer_links, 1);
}
