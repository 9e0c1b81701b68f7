//! End-to-end cycles: loopback HTTP feed through to an in-memory store.

use catalog_core::{format_timestamp, product_key, FieldValue, ALL_IDS_KEY};
use catalog_sync::{CycleOutcome, ProductSynchronizer, SyncCycle};
use feed_source::{FetchOptions, HttpFeedSource};
use kv_store::{KvStore, MemoryStore};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:g="http://base.google.com/ns/1.0">
  <channel>
    <title>Shop</title>
    <item>
      <g:id>SKU-1</g:id>
      <g:gtin>8590000000011</g:gtin>
      <title>Shampoo</title>
      <g:price currency="EUR">3.49</g:price>
      <g:shipping><g:country>SK</g:country></g:shipping>
    </item>
    <item>
      <title>No identifier</title>
      <g:free_shipping_threshold>40</g:free_shipping_threshold>
    </item>
  </channel>
</rss>"#;

/// Serve `response` to every connection until the test ends.
async fn serve(response: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let response = response.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/export/products.xml")
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Accept connections but never answer.
async fn serve_nothing() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    format!("http://{addr}/export/products.xml")
}

fn cycle_for(url: String) -> SyncCycle<HttpFeedSource, MemoryStore> {
    cycle_with_timeout(url, Duration::from_secs(5))
}

fn cycle_with_timeout(url: String, timeout: Duration) -> SyncCycle<HttpFeedSource, MemoryStore> {
    let options = FetchOptions {
        timeout,
        ..FetchOptions::default()
    };
    SyncCycle::new(
        HttpFeedSource::new(url, options).unwrap(),
        ProductSynchronizer::new(MemoryStore::new()),
    )
}

#[tokio::test]
async fn test_rss_feed_is_mirrored_into_store() {
    let url = serve(http_response("200 OK", RSS_FEED)).await;
    let cycle = cycle_for(url);

    let result = match cycle.run_cycle().await {
        CycleOutcome::Synced(result) => result,
        other => panic!("expected a synced cycle, got {other:?}"),
    };
    assert_eq!(result.count, 2);
    assert_eq!(result.batches, 1);

    let store = cycle.synchronizer().store();
    let mut ids = store.smembers(ALL_IDS_KEY).await.unwrap();
    ids.sort();
    assert_eq!(ids, vec!["SKU-1".to_string(), "product_1".to_string()]);

    let records = cycle.synchronizer().list_all().await.unwrap();
    assert_eq!(records.len(), 2);

    let first = records.iter().find(|r| r.id == "SKU-1").unwrap();
    assert_eq!(first.record.text("title"), Some("Shampoo"));
    assert_eq!(first.last_updated(), Some(result.timestamp.as_str()));
    assert!(!first.record.contains("g:id"));
    assert!(!first.record.contains("g:gtin"));
    assert!(!first.record.contains("g:shipping"));

    // Attributes sit next to the element text.
    match first.record.get("g:price") {
        Some(FieldValue::Map(price)) => {
            assert_eq!(price.get("currency"), Some(&FieldValue::from("EUR")));
            assert_eq!(price.get("_"), Some(&FieldValue::from("3.49")));
        }
        other => panic!("expected price with attributes, got {other:?}"),
    }

    let second = records.iter().find(|r| r.id == "product_1").unwrap();
    assert!(!second.record.contains("g:free_shipping_threshold"));
    assert_eq!(second.record.text("title"), Some("No identifier"));

    let metadata = cycle.synchronizer().get_metadata().await.unwrap();
    assert_eq!(metadata.count, Some(2));
    assert_eq!(metadata.last_update, Some(result.timestamp));
}

#[tokio::test]
async fn test_stored_timestamp_format() {
    let url = serve(http_response(
        "200 OK",
        "<root><product><code>A1</code></product></root>",
    ))
    .await;
    let cycle = cycle_for(url);
    assert!(cycle.run_cycle().await.is_success());

    let body = cycle
        .synchronizer()
        .store()
        .get(&product_key("A1"))
        .await
        .unwrap()
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&body).unwrap();
    let stamp = stored["last_updated"].as_str().unwrap();

    let parsed = chrono::DateTime::parse_from_rfc3339(stamp).unwrap();
    assert_eq!(format_timestamp(parsed.into()), stamp);
    assert!(stamp.ends_with('Z'));
    assert_eq!(stored["code"], "A1");
}

#[tokio::test]
async fn test_http_error_status_is_fetch_failure() {
    let url = serve(http_response("503 Service Unavailable", "busy")).await;
    let cycle = cycle_for(url);

    match cycle.run_cycle().await {
        CycleOutcome::FetchFailed(message) => assert!(message.contains("503")),
        other => panic!("expected a fetch failure, got {other:?}"),
    }
    assert!(cycle.synchronizer().store().is_empty());
}

#[tokio::test]
async fn test_stalled_feed_times_out_without_touching_store() {
    let url = serve_nothing().await;
    let cycle = cycle_with_timeout(url, Duration::from_millis(200));

    let started = std::time::Instant::now();
    match cycle.run_cycle().await {
        CycleOutcome::FetchFailed(message) => assert!(message.contains("Timed out")),
        other => panic!("expected a fetch timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(cycle.synchronizer().store().is_empty());
    assert_eq!(cycle.state(), catalog_sync::CycleState::Idle);
}

#[tokio::test]
async fn test_unrecognized_feed_is_no_records() {
    let url = serve(http_response(
        "200 OK",
        "<catalog><entry><id>1</id></entry></catalog>",
    ))
    .await;
    let cycle = cycle_for(url);

    assert_eq!(cycle.run_cycle().await, CycleOutcome::NoRecords);
    assert!(cycle.synchronizer().store().is_empty());
}
