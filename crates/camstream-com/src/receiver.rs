use crate::ComError;
use futures_util::{SinkExt, StreamExt};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    sync::{RwLock, mpsc},
    task::{JoinHandle, JoinSet},
};
use tokio_websockets::{Message, ServerBuilder, WebSocketStream};

type WsSink = futures_util::stream::SplitSink<WebSocketStream<tokio::net::TcpStream>, Message>;

// frames buffered between the reader tasks and `recv`
const FRAME_BACKLOG: usize = 64;

/// WebSocket endpoint collecting binary frames from any number of producers.
pub struct FrameReceiver {
    clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>>,
    rx: mpsc::Receiver<Vec<u8>>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl FrameReceiver {
    /// Bind a TCP listener and start accepting WebSocket connections.
    ///
    /// A background task performs the handshake for each connection and
    /// spawns a reader per client that forwards binary payloads to
    /// [`recv`](Self::recv).
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let clients: Arc<RwLock<HashMap<SocketAddr, WsSink>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let accept_clients = Arc::clone(&clients);
        let (tx, rx) = mpsc::channel(FRAME_BACKLOG);

        // reader tasks live in the accept task, so aborting it aborts them too
        let accept_task = tokio::spawn(async move {
            let mut readers = JoinSet::new();
            loop {
                while readers.try_join_next().is_some() {}

                let (tcp_stream, addr) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        log::warn!("accept error: {e}");
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                        continue;
                    }
                };
                let ws_stream = match ServerBuilder::new().accept(tcp_stream).await {
                    Ok((_request, ws_stream)) => ws_stream,
                    Err(e) => {
                        log::warn!("handshake with {addr} failed: {e}");
                        continue;
                    }
                };
                log::info!("producer {addr} connected");

                let (write_half, mut read_half) = ws_stream.split();
                accept_clients.write().await.insert(addr, write_half);

                let tx = tx.clone();
                let clients = Arc::clone(&accept_clients);
                readers.spawn(async move {
                    loop {
                        match read_half.next().await {
                            Some(Ok(msg)) if msg.is_binary() => {
                                if tx.send(msg.into_payload().to_vec()).await.is_err() {
                                    break;
                                }
                            }
                            // text and control frames carry nothing for us
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                log::warn!("producer {addr} error: {e}");
                                break;
                            }
                            None => {
                                log::info!("producer {addr} disconnected");
                                break;
                            }
                        }
                    }
                    clients.write().await.remove(&addr);
                });
            }
        });

        Ok(Self {
            clients,
            rx,
            accept_task,
            local_addr,
        })
    }

    /// Next binary payload from any producer, in arrival order per producer.
    ///
    /// Returns `ComError::ConnectionClosed` once no more frames can arrive.
    pub async fn recv(&mut self) -> Result<Vec<u8>, ComError> {
        self.rx.recv().await.ok_or(ComError::ConnectionClosed)
    }

    /// Send a text message to every connected producer.
    ///
    /// Producers that fail to receive are dropped from the client map.
    pub async fn send_text(&self, text: &str) -> Result<(), ComError> {
        let msg = Message::text(text.to_string());
        let mut lock = self.clients.write().await;

        let mut failed = Vec::new();
        for (addr, writer) in lock.iter_mut() {
            if let Err(e) = writer.send(msg.clone()).await {
                log::warn!("failed to send to {addr}: {e}");
                failed.push(*addr);
            }
        }
        for addr in failed {
            lock.remove(&addr);
        }
        Ok(())
    }

    /// Close every producer connection with a close frame.
    pub async fn close_all(&self) {
        let mut lock = self.clients.write().await;
        for (addr, mut writer) in lock.drain() {
            if let Err(e) = writer.close().await {
                log::warn!("failed to close {addr}: {e}");
            }
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
