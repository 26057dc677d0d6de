//! Integration tests for the in-memory channel transport.

use airconsole_transport::{ChannelTransport, Transport, TransportError};

#[test]
fn test_post_delivers_bytes_in_order() {
    let (transport, mut rx) = ChannelTransport::pair();

    transport.post(b"first").unwrap();
    transport.post(b"second").unwrap();

    assert_eq!(rx.try_recv().unwrap(), b"first".to_vec());
    assert_eq!(rx.try_recv().unwrap(), b"second".to_vec());
    assert!(rx.try_recv().is_err(), "nothing else should be queued");
}

#[test]
fn test_post_after_receiver_dropped_returns_closed() {
    let (transport, rx) = ChannelTransport::pair();
    drop(rx);

    assert!(transport.is_closed());
    let result = transport.post(b"lost");
    assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
}

#[test]
fn test_cloned_transports_share_one_receiver() {
    let (transport, mut rx) = ChannelTransport::pair();
    let clone = transport.clone();

    transport.post(b"a").unwrap();
    clone.post(b"b").unwrap();

    assert_eq!(rx.try_recv().unwrap(), b"a".to_vec());
    assert_eq!(rx.try_recv().unwrap(), b"b".to_vec());
}

#[tokio::test]
async fn test_receiver_can_await_posts() {
    let (transport, mut rx) = ChannelTransport::pair();

    transport.post(br#"{"action":"set"}"#).unwrap();

    let received = rx.recv().await.expect("one payload");
    assert_eq!(received, br#"{"action":"set"}"#.to_vec());
}
