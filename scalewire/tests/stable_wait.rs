//! Filizola manual reads wait for the scale to settle

mod common;

use std::time::Duration;

use bytes::BytesMut;
use pretty_assertions::assert_eq;
use scalewire::{Protocol, Scale, TransportConfig, Weight};
use tokio::time::Instant;

fn filizola() -> Scale {
    Scale::new(TransportConfig::tcp("127.0.0.1", 9100)).with_protocol(Protocol::Filizola)
}

#[tokio::test(start_paused = true)]
async fn test_unstable_then_settled() {
    let start = Instant::now();
    let mut mock = common::open_link();
    mock.expect_write().returning(|_| Ok(()));
    mock.expect_read().returning(move || {
        if start.elapsed() < Duration::from_secs(2) {
            Ok(BytesMut::from(&b"\x02IIIII"[..]))
        } else {
            Ok(BytesMut::from(&b"\x0201234"[..]))
        }
    });

    let mut scale = filizola();
    scale.connect_with(Box::new(mock)).await.unwrap();

    let weight = scale.read_once().await.unwrap();

    assert_eq!(weight, Weight::from_grams(1234));
    assert!(start.elapsed() < Duration::from_secs(3));

    scale.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_never_settles() {
    let mut scale = filizola();
    scale.connect_with(common::replying(b"\x02IIIII")).await.unwrap();

    let start = Instant::now();
    let weight = scale.read_once().await.unwrap();

    assert_eq!(weight, Weight::UNSTABLE);
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_millis(3500));

    scale.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_toledo_does_not_wait() {
    let mut scale = Scale::new(TransportConfig::tcp("127.0.0.1", 9100));
    scale.connect_with(common::replying(b"\x02IIIII\x03")).await.unwrap();

    let start = Instant::now();
    let weight = scale.read_once().await.unwrap();

    assert_eq!(weight, Weight::UNSTABLE);
    assert!(start.elapsed() < Duration::from_secs(1));

    scale.disconnect().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_negative_weight_ends_wait() {
    let mut scale = filizola();
    scale.connect_with(common::replying(b"\x02NNNNN")).await.unwrap();

    let start = Instant::now();
    assert_eq!(scale.read_once().await.unwrap(), Weight::NEGATIVE);
    assert!(start.elapsed() < Duration::from_secs(1));

    scale.disconnect().await.unwrap();
}
