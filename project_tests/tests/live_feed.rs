//! Live feed against a loopback WebSocket server.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use axum::Router;
use lib_docs::configs::{BuildProfile, ClientConfig, DeviceTarget, ReconnectPolicy};
use lib_docs::core::{NotificationQueue, QueuePhase, QueueTimings};
use lib_docs::documents::NotificationItem;
use lib_docs::ingestors::LiveFeedListener;
use tokio::sync::mpsc;

const DOC_A: &str = r#"{"Timestamp":"2024-01-01T10:00:00Z","UserID":"user1","UserName":"John","DocumentID":"doc1","DocumentTitle":"Doc A"}"#;
const DOC_B: &str = r#"{"Timestamp":"2024-01-01T11:00:00Z","UserID":"user2","UserName":"Jane","DocumentID":"doc2","DocumentTitle":"Doc B"}"#;

#[derive(Clone, Copy)]
enum AfterFrames {
    StayOpen,
    Hangup,
}

struct FeedServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    closed_by_client: mpsc::UnboundedReceiver<()>,
}

impl FeedServer {
    fn url(&self) -> String {
        format!("ws://{}/notifications", self.addr)
    }
}

async fn start_server(frames: Vec<Message>, after: AfterFrames) -> FeedServer {
    let connections = Arc::new(AtomicUsize::new(0));
    let (closed_tx, closed_rx) = mpsc::unbounded_channel();

    let counter = connections.clone();
    let app = Router::new().route(
        "/notifications",
        get(move |ws: WebSocketUpgrade| {
            let frames = frames.clone();
            let counter = counter.clone();
            let closed_tx = closed_tx.clone();
            async move {
                ws.on_upgrade(move |socket| session(socket, frames, after, counter, closed_tx))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FeedServer {
        addr,
        connections,
        closed_by_client: closed_rx,
    }
}

async fn session(
    mut socket: WebSocket,
    frames: Vec<Message>,
    after: AfterFrames,
    counter: Arc<AtomicUsize>,
    closed_tx: mpsc::UnboundedSender<()>,
) {
    counter.fetch_add(1, Ordering::SeqCst);
    for frame in frames {
        if socket.send(frame).await.is_err() {
            return;
        }
    }
    match after {
        AfterFrames::Hangup => {
            let _ = socket.send(Message::Close(None)).await;
            // Finish the close handshake so the client sees a clean close.
            while let Some(Ok(_)) = socket.recv().await {}
        }
        AfterFrames::StayOpen => {
            while let Some(msg) = socket.recv().await {
                match msg {
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            let _ = closed_tx.send(());
        }
    }
}

async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {}", what);
}

type Collected<T> = Arc<Mutex<Vec<T>>>;

fn collecting_listener(url: String) -> (LiveFeedListener<NotificationItem>, Collected<NotificationItem>, Collected<String>) {
    let messages: Collected<NotificationItem> = Arc::default();
    let errors: Collected<String> = Arc::default();
    let (m, e) = (messages.clone(), errors.clone());
    let listener = LiveFeedListener::new(url, move |item| m.lock().unwrap().push(item))
        .on_error(move |err| e.lock().unwrap().push(err.to_string()));
    (listener, messages, errors)
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_feed_continues() {
    let mut server = start_server(
        vec![Message::Text("{not json".into()), Message::Text(DOC_A.into())],
        AfterFrames::StayOpen,
    )
    .await;
    let (listener, messages, errors) = collecting_listener(server.url());
    let handle = listener.spawn();

    wait_until("valid frame", || messages.lock().unwrap().len() == 1).await;
    assert_eq!(messages.lock().unwrap()[0].document_title, "Doc A");
    assert_eq!(errors.lock().unwrap().len(), 1);
    assert!(!handle.is_finished());

    handle.close();
    let closed = tokio::time::timeout(Duration::from_secs(5), server.closed_by_client.recv()).await;
    assert!(matches!(closed, Ok(Some(()))));
}

#[tokio::test]
async fn binary_json_frames_are_decoded() {
    let server = start_server(vec![Message::Binary(DOC_B.as_bytes().to_vec().into())], AfterFrames::StayOpen).await;
    let (listener, messages, errors) = collecting_listener(server.url());
    let _handle = listener.spawn();

    wait_until("binary frame", || messages.lock().unwrap().len() == 1).await;
    assert_eq!(messages.lock().unwrap()[0].user_name, "Jane");
    assert!(errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn dropping_the_handle_closes_the_socket() {
    let mut server = start_server(vec![], AfterFrames::StayOpen).await;
    let (listener, _messages, _errors) = collecting_listener(server.url());
    let handle = listener.spawn();

    wait_until("connection", || server.connections.load(Ordering::SeqCst) == 1).await;
    drop(handle);

    let closed = tokio::time::timeout(Duration::from_secs(5), server.closed_by_client.recv()).await;
    assert!(matches!(closed, Ok(Some(()))));
}

#[tokio::test]
async fn without_reconnect_a_closed_feed_stays_closed() {
    let server = start_server(vec![Message::Text(DOC_A.into())], AfterFrames::Hangup).await;
    let (listener, messages, errors) = collecting_listener(server.url());
    let handle = listener.spawn();

    wait_until("listener exit", || handle.is_finished()).await;
    assert_eq!(messages.lock().unwrap().len(), 1);
    assert!(errors.lock().unwrap().is_empty());
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backoff_policy_reconnects_after_hangup() {
    let server = start_server(vec![Message::Text(DOC_A.into())], AfterFrames::Hangup).await;
    let (listener, messages, _errors) = collecting_listener(server.url());
    let handle = listener
        .with_reconnect(ReconnectPolicy::Backoff {
            base: Duration::from_millis(10),
            max: Duration::from_millis(40),
            max_attempts: Some(3),
        })
        .spawn();

    wait_until("three sessions", || server.connections.load(Ordering::SeqCst) >= 3).await;
    wait_until("three frames", || messages.lock().unwrap().len() >= 3).await;
    handle.close();
}

#[tokio::test]
async fn notification_feed_fills_the_queue() {
    let server = start_server(
        vec![Message::Text(DOC_A.into()), Message::Text(DOC_B.into())],
        AfterFrames::StayOpen,
    )
    .await;

    let mut config = ClientConfig::resolve(BuildProfile::Debug, DeviceTarget::Desktop);
    config.ws_url = format!("ws://{}/", server.addr);

    let queue = NotificationQueue::spawn(QueueTimings::from_millis(60_000, 60_000));
    let handle = LiveFeedListener::notifications(&config, queue.clone()).spawn();

    wait_until("two notifications", || queue.state().total_count == 2).await;
    let state = queue.state();
    assert_eq!(state.phase(), QueuePhase::Showing);
    assert_eq!(
        state.current_notification.map(|n| n.document_title),
        Some("Doc A".to_string())
    );
    assert_eq!(state.queue.len(), 1);

    handle.close();
    queue.shutdown();
}
