use crate::{ComError, ConnectionState};
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_websockets::{ClientBuilder, Message};

/// Frames that may wait for the socket before `send` starts refusing them.
pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

/// Send side of a frame transport, as seen by the pipeline.
pub trait Transport: Send + Sync {
    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Hand one payload to the connection without waiting.
    ///
    /// Fails with `ComError::NotConnected` unless the state is `Open`.
    fn send(&self, payload: Vec<u8>) -> Result<(), ComError>;
}

// channels into one connection task
struct Link {
    generation: u64,
    outbound: mpsc::Sender<Vec<u8>>,
    shutdown: Option<oneshot::Sender<()>>,
}

struct Shared {
    state: watch::Sender<ConnectionState>,
    link: Mutex<Option<Link>>,
}

impl Shared {
    fn lock_link(&self) -> MutexGuard<'_, Option<Link>> {
        self.link.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    // a close() during the handshake wins over the handshake completing
    fn mark_open(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Open;
                true
            } else {
                false
            }
        })
    }

    // last act of a connection task
    fn finish(&self, generation: u64, state: ConnectionState) {
        let mut link = self.lock_link();
        if link.as_ref().is_some_and(|l| l.generation == generation) {
            *link = None;
            self.set_state(state);
        }
    }
}

/// Persistent WebSocket client that delivers each payload as one binary
/// message.
///
/// `send` never waits: payloads go through a small bounded queue to the
/// connection task, and are refused when the connection is not open or the
/// queue is full. Nothing is retried.
pub struct WsTransport {
    shared: Arc<Shared>,
    queue_capacity: usize,
    generation: Mutex<u64>,
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl WsTransport {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            shared: Arc::new(Shared {
                state,
                link: Mutex::new(None),
            }),
            queue_capacity: queue_capacity.max(1),
            generation: Mutex::new(0),
        }
    }

    /// Start connecting to `uri` (`ws://host:port[/path]`) in the background.
    ///
    /// The state moves to `Connecting` immediately, then to `Open` or
    /// `Error(reason)`. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ComError::InvalidUri` if the URI cannot be parsed or is not a
    /// `ws` URI with a host, `ComError::AlreadyActive` if a connection is
    /// connecting, open or closing, and `ComError::Io` outside a runtime.
    pub fn connect(&self, uri: &str) -> Result<(), ComError> {
        let parsed: http::Uri = uri
            .parse()
            .map_err(|e| ComError::InvalidUri(format!("{uri}: {e}")))?;
        if parsed.scheme_str() != Some("ws") {
            return Err(ComError::InvalidUri(format!("{uri}: scheme must be ws")));
        }
        if parsed.host().is_none() {
            return Err(ComError::InvalidUri(format!("{uri}: missing host")));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ComError::Io(std::io::Error::other(e.to_string())))?;

        let mut link = self.shared.lock_link();
        if !self.shared.state.borrow().is_idle() {
            return Err(ComError::AlreadyActive);
        }

        let generation = {
            let mut counter = self.generation.lock().unwrap_or_else(|e| e.into_inner());
            *counter += 1;
            *counter
        };
        let (outbound_tx, outbound_rx) = mpsc::channel(self.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        *link = Some(Link {
            generation,
            outbound: outbound_tx,
            shutdown: Some(shutdown_tx),
        });
        self.shared.set_state(ConnectionState::Connecting);
        drop(link);

        log::info!("connecting to {uri}");
        runtime.spawn(run_connection(
            Arc::clone(&self.shared),
            generation,
            parsed,
            outbound_rx,
            shutdown_rx,
        ));
        Ok(())
    }

    /// Start an orderly shutdown: `Closing`, then `Closed` once the close
    /// frame is out. Does nothing if no connection is active.
    pub fn close(&self) {
        let mut link = self.shared.lock_link();
        let Some(active) = link.as_mut() else {
            return;
        };
        if let Some(shutdown) = active.shutdown.take() {
            self.shared.set_state(ConnectionState::Closing);
            let _ = shutdown.send(());
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Wait until no connection is active (`Closed` or `Error`).
    pub async fn idle(&self) -> ConnectionState {
        let mut receiver = self.subscribe();
        let state = match receiver.wait_for(ConnectionState::is_idle).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    #[cfg(test)]
    fn queued(&self) -> usize {
        self.shared
            .lock_link()
            .as_ref()
            .map_or(0, |l| l.outbound.max_capacity() - l.outbound.capacity())
    }
}

impl Transport for WsTransport {
    fn state(&self) -> ConnectionState {
        self.shared.state.borrow().clone()
    }

    fn send(&self, payload: Vec<u8>) -> Result<(), ComError> {
        // close() and finish() change the state under this lock
        let link = self.shared.lock_link();
        if !self.shared.state.borrow().is_open() {
            return Err(ComError::NotConnected);
        }
        let Some(active) = link.as_ref() else {
            return Err(ComError::NotConnected);
        };
        active.outbound.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ComError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => ComError::NotConnected,
        })
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_connection(
    shared: Arc<Shared>,
    generation: u64,
    uri: http::Uri,
    mut outbound: mpsc::Receiver<Vec<u8>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let endpoint = uri.to_string();

    let builder = ClientBuilder::from_uri(uri);
    let stream = tokio::select! {
        result = builder.connect() => match result {
            Ok((stream, _response)) => stream,
            Err(e) => {
                log::error!("connection to {endpoint} failed: {e}");
                shared.finish(generation, ConnectionState::Error(e.to_string()));
                return;
            }
        },
        _ = &mut shutdown => {
            log::info!("connection to {endpoint} cancelled");
            shared.finish(generation, ConnectionState::Closed);
            return;
        }
    };

    if shared.mark_open() {
        log::info!("connection to {endpoint} opened");
    }

    let (mut sink, mut incoming) = stream.split();

    // None means we initiated the close
    let ended = loop {
        tokio::select! {
            payload = outbound.recv() => {
                let Some(payload) = payload else {
                    break None;
                };
                if let Err(e) = sink.send(Message::binary(payload)).await {
                    log::error!("send to {endpoint} failed: {e}");
                    break Some(ConnectionState::Error(e.to_string()));
                }
            }
            message = incoming.next() => match message {
                Some(Ok(message)) if message.is_close() => {
                    log::info!("{endpoint} closed the connection");
                    break Some(ConnectionState::Closed);
                }
                Some(Ok(message)) => log_inbound(&endpoint, message),
                Some(Err(e)) => {
                    log::error!("connection to {endpoint} failed: {e}");
                    break Some(ConnectionState::Error(e.to_string()));
                }
                None => {
                    log::info!("connection to {endpoint} ended");
                    break Some(ConnectionState::Closed);
                }
            },
            _ = &mut shutdown => break None,
        }
    };

    let state = match ended {
        Some(state) => state,
        None => {
            shared.set_state(ConnectionState::Closing);
            if let Err(e) = sink.close().await {
                log::warn!("close handshake with {endpoint} failed: {e}");
            }
            log::info!("connection to {endpoint} closed");
            ConnectionState::Closed
        }
    };
    shared.finish(generation, state);
}

// inbound traffic carries no control semantics
fn log_inbound(endpoint: &str, message: Message) {
    if let Some(text) = message.as_text() {
        log::info!("message from {endpoint}: {text}");
    } else if message.is_binary() {
        log::debug!(
            "{} byte binary message from {endpoint}",
            message.into_payload().len()
        );
    }
}
