//! # Live Feed Listener
//!
//! A receive-only WebSocket client. Each text frame, or binary frame holding
//! UTF-8 JSON, is decoded into the listener's payload type and handed to its
//! message handler. The client never sends application frames; only the
//! close handshake goes out.
//!
//! ## Error handling:
//! - A frame that fails to decode is reported once to the error handler and
//!   dropped. The connection stays open and the next frame is processed.
//! - A failed connect or a broken connection is reported the same way and
//!   ends the session.
//! - Without an error handler, reports go to the log.
//!
//! ## Lifecycle:
//! `spawn` opens the socket on its own task and returns a [`ListenerHandle`].
//! Closing or dropping the handle sends a close frame and releases the
//! socket. Whether a session that ended on its own is retried depends on the
//! [`ReconnectPolicy`]; the default makes one attempt only.

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::configs::{ClientConfig, ReconnectPolicy};
use crate::core::NotificationQueueHandle;
use crate::documents::model::NotificationItem;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Failures reported by a [`LiveFeedListener`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// The WebSocket handshake failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Feed URL.
        url: String,
        /// Underlying WebSocket error.
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// The established connection failed.
    #[error("live feed connection error: {0}")]
    Transport(#[source] tokio_tungstenite::tungstenite::Error),

    /// A frame was not valid JSON for the payload type and was dropped.
    #[error("dropped malformed frame: {source}")]
    Decode {
        /// The raw frame, lossily decoded as UTF-8.
        frame: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Receives every decoded payload.
pub type MessageHandler<T> = Arc<dyn Fn(T) + Send + Sync>;
/// Receives every reported failure.
pub type ErrorHandler = Arc<dyn Fn(FeedError) + Send + Sync>;

enum SessionEnd {
    Cancelled,
    Closed,
}

/// A WebSocket listener decoding JSON frames into `T`.
pub struct LiveFeedListener<T> {
    url: String,
    on_message: MessageHandler<T>,
    on_error: Option<ErrorHandler>,
    reconnect: ReconnectPolicy,
    _payload: PhantomData<fn() -> T>,
}

impl<T> LiveFeedListener<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// A listener for `url` delivering payloads to `on_message`.
    pub fn new<F>(url: impl Into<String>, on_message: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            url: url.into(),
            on_message: Arc::new(on_message),
            on_error: None,
            reconnect: ReconnectPolicy::Never,
            _payload: PhantomData,
        }
    }

    /// Sets the error handler.
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(FeedError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// Sets the reconnect policy.
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Opens the connection on a new task.
    pub fn spawn(self) -> ListenerHandle {
        self.spawn_with_token(CancellationToken::new())
    }

    /// Opens the connection on a new task that stops when `token` is
    /// cancelled.
    pub fn spawn_with_token(self, token: CancellationToken) -> ListenerHandle {
        let task = tokio::spawn(self.run(token.clone()));
        ListenerHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self, token: CancellationToken) {
        let mut attempt: u32 = 0;

        loop {
            log::info!("Connecting to live feed: {}", self.url);
            let connected = tokio::select! {
                _ = token.cancelled() => return,
                res = connect_async(self.url.as_str()) => res,
            };

            match connected {
                Ok((ws_stream, _)) => {
                    log::info!("Live feed connected: {}", self.url);
                    attempt = 0;
                    if let SessionEnd::Cancelled = self.pump(ws_stream, &token).await {
                        return;
                    }
                }
                Err(source) => self.report(FeedError::Connect {
                    url: self.url.clone(),
                    source,
                }),
            }

            let Some(delay) = self.reconnect.delay_for(attempt) else {
                log::info!("Live feed stopped: {}", self.url);
                return;
            };
            attempt += 1;
            log::warn!("Reconnecting to {} in {}ms (attempt {})", self.url, delay.as_millis(), attempt);
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn pump(&self, mut ws_stream: WsStream, token: &CancellationToken) -> SessionEnd {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    if let Err(e) = ws_stream.close(None).await {
                        log::debug!("Live feed close handshake failed: {}", e);
                    }
                    log::info!("Live feed closed: {}", self.url);
                    return SessionEnd::Cancelled;
                }
                msg = ws_stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_bytes()),
                    Some(Ok(Message::Binary(bin))) => self.handle_frame(&bin),
                    Some(Ok(Message::Close(frame))) => {
                        log::info!("Live feed closed by server: {:?}", frame);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        self.report(FeedError::Transport(e));
                        return SessionEnd::Closed;
                    }
                    None => {
                        log::info!("Live feed connection released: {}", self.url);
                        return SessionEnd::Closed;
                    }
                }
            }
        }
    }

    fn handle_frame(&self, frame: &[u8]) {
        let decoded = serde_json::from_slice::<Value>(frame).and_then(|value| {
            if is_empty_payload(&value) {
                return Ok(None);
            }
            serde_json::from_value::<T>(value).map(Some)
        });
        match decoded {
            Ok(Some(payload)) => (self.on_message)(payload),
            Ok(None) => log::debug!("Skipping empty frame: {}", String::from_utf8_lossy(frame)),
            Err(source) => self.report(FeedError::Decode {
                frame: String::from_utf8_lossy(frame).into_owned(),
                source,
            }),
        }
    }

    fn report(&self, error: FeedError) {
        match &self.on_error {
            Some(on_error) => on_error(error),
            None => log::error!("Live feed error: {}", error),
        }
    }
}

// `null`, `false`, `0` and `""` carry no payload.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl LiveFeedListener<NotificationItem> {
    /// The notification feed from `config`, feeding every notification into
    /// `queue`.
    pub fn notifications(config: &ClientConfig, queue: NotificationQueueHandle) -> Self {
        LiveFeedListener::new(config.notification_url(), move |item: NotificationItem| {
            log::debug!("Notification for document {}", item.document_id);
            if !queue.add(item) {
                log::warn!("Notification queue is shut down; notification dropped");
            }
        })
        .with_reconnect(config.reconnect_policy())
    }
}

/// Owns a running listener. Dropping the handle closes the connection.
#[derive(Debug)]
pub struct ListenerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Closes the connection.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the listener task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Waits for the listener task to exit without closing it.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Live feed task failed: {}", e);
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
