use camstream_com::{ComError, ConnectionState, FrameReceiver, Transport, WsTransport};
use tokio::time::{Duration, sleep, timeout};

async fn wait_for_state(
    transport: &WsTransport,
    pred: impl FnMut(&ConnectionState) -> bool,
) -> ConnectionState {
    let mut states = transport.subscribe();
    let state = timeout(Duration::from_secs(5), states.wait_for(pred))
        .await
        .expect("state wait timed out")
        .expect("transport dropped")
        .clone();
    state
}

async fn wait_for_clients(receiver: &FrameReceiver, count: usize) {
    for _ in 0..100 {
        if receiver.client_count().await == count {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("receiver never reached {count} clients");
}

// retries while the small outbound queue is full
async fn send_all(transport: &WsTransport, payloads: &[Vec<u8>]) {
    for payload in payloads {
        loop {
            match transport.send(payload.clone()) {
                Ok(()) => break,
                Err(ComError::QueueFull) => sleep(Duration::from_millis(5)).await,
                Err(e) => panic!("send failed: {e}"),
            }
        }
    }
}

async fn connected_pair() -> (FrameReceiver, WsTransport) {
    let receiver = FrameReceiver::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let transport = WsTransport::new();
    transport
        .connect(&format!("ws://{}", receiver.local_addr()))
        .expect("connect failed");
    let state = wait_for_state(&transport, |s| *s != ConnectionState::Connecting).await;
    assert_eq!(state, ConnectionState::Open);
    wait_for_clients(&receiver, 1).await;
    (receiver, transport)
}

#[tokio::test]
async fn test_frames_arrive_in_order_as_binary_messages() {
    let (mut receiver, transport) = connected_pair().await;

    let payloads: Vec<Vec<u8>> = (0u8..10).map(|i| vec![0xFF, 0xD8, i, 0xFF, 0xD9]).collect();
    send_all(&transport, &payloads).await;

    for expected in &payloads {
        let got = timeout(Duration::from_secs(5), receiver.recv())
            .await
            .expect("recv timed out")
            .expect("recv failed");
        assert_eq!(&got, expected);
    }
}

#[tokio::test]
async fn test_large_payload_is_one_message() {
    let (mut receiver, transport) = connected_pair().await;

    let payload: Vec<u8> = (0..300_000).map(|i| (i % 251) as u8).collect();
    send_all(&transport, std::slice::from_ref(&payload)).await;

    let got = timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed");
    assert_eq!(got.len(), payload.len());
    assert_eq!(got, payload);
}

#[tokio::test]
async fn test_send_before_connect_is_refused() {
    let transport = WsTransport::new();
    assert_eq!(transport.state(), ConnectionState::Closed);
    assert!(matches!(
        transport.send(vec![1, 2, 3]),
        Err(ComError::NotConnected)
    ));
}

#[tokio::test]
async fn test_connect_to_dead_port_ends_in_error() {
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        listener.local_addr().expect("no local addr").port()
    };

    let transport = WsTransport::new();
    transport
        .connect(&format!("ws://127.0.0.1:{port}"))
        .expect("connect should start");

    let state = wait_for_state(&transport, ConnectionState::is_idle).await;
    assert!(
        matches!(state, ConnectionState::Error(_)),
        "expected Error, got {state:?}"
    );
    assert!(matches!(
        transport.send(vec![0]),
        Err(ComError::NotConnected)
    ));
}

#[tokio::test]
async fn test_remote_close_ends_in_closed() {
    let (receiver, transport) = connected_pair().await;

    receiver.close_all().await;

    let state = wait_for_state(&transport, ConnectionState::is_idle).await;
    assert_eq!(state, ConnectionState::Closed);
    assert!(matches!(
        transport.send(vec![0]),
        Err(ComError::NotConnected)
    ));
}

#[tokio::test]
async fn test_explicit_connect_after_remote_close() {
    let (mut receiver, transport) = connected_pair().await;
    receiver.close_all().await;
    wait_for_state(&transport, ConnectionState::is_idle).await;

    transport
        .connect(&format!("ws://{}", receiver.local_addr()))
        .expect("reconnect failed");
    let state = wait_for_state(&transport, |s| *s != ConnectionState::Connecting).await;
    assert_eq!(state, ConnectionState::Open);

    send_all(&transport, &[vec![7, 7, 7]]).await;
    let got = timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed");
    assert_eq!(got, vec![7, 7, 7]);
}

#[tokio::test]
async fn test_close_goes_through_closing_to_closed() {
    let (receiver, transport) = connected_pair().await;

    transport.close();
    assert_eq!(transport.state(), ConnectionState::Closing);

    let state = wait_for_state(&transport, ConnectionState::is_idle).await;
    assert_eq!(state, ConnectionState::Closed);
    assert!(matches!(
        transport.send(vec![0]),
        Err(ComError::NotConnected)
    ));

    wait_for_clients(&receiver, 0).await;
}

#[tokio::test]
async fn test_close_when_idle_does_nothing() {
    let transport = WsTransport::new();
    transport.close();
    assert_eq!(transport.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_inbound_text_is_ignored() {
    let (mut receiver, transport) = connected_pair().await;

    receiver
        .send_text("hello producer")
        .await
        .expect("send_text failed");
    sleep(Duration::from_millis(50)).await;

    assert_eq!(transport.state(), ConnectionState::Open);
    send_all(&transport, &[vec![1]]).await;
    let got = timeout(Duration::from_secs(5), receiver.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed");
    assert_eq!(got, vec![1]);
}

#[tokio::test]
async fn test_connect_while_active_is_refused() {
    let (receiver, transport) = connected_pair().await;

    match transport.connect(&format!("ws://{}", receiver.local_addr())) {
        Err(ComError::AlreadyActive) => {}
        other => panic!("expected AlreadyActive, got {other:?}"),
    }
    assert_eq!(transport.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_invalid_uri_is_rejected() {
    let transport = WsTransport::new();

    for uri in ["not a uri at all", "http://127.0.0.1:3000", "/just/a/path"] {
        match transport.connect(uri) {
            Err(ComError::InvalidUri(_)) => {}
            other => panic!("expected InvalidUri for {uri:?}, got {other:?}"),
        }
    }
    assert_eq!(transport.state(), ConnectionState::Closed);
}

#[test]
fn test_connect_outside_runtime_fails() {
    let transport = WsTransport::new();
    assert!(matches!(
        transport.connect("ws://127.0.0.1:3000"),
        Err(ComError::Io(_))
    ));
    assert_eq!(transport.state(), ConnectionState::Closed);
}
