//! TCP accept loop and event fan-out.
//!
//! One task accepts connections, one task pumps the event bus into
//! subscribed connections, and every connection runs its own reader
//! and writer. Fan-out never awaits a full outbound queue: a slow
//! client drops updates instead of stalling its peers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};

use espnode_app::device::Device;
use espnode_app::event_bus::Event;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;
use espnode_proto::message::SubscribeLogsResponse;

use crate::connection::{self, ConnectionHandle, OUTBOUND_QUEUE};
use crate::error::NativeApiError;

/// The native API server: listener, connection registry and fan-out.
pub struct NativeApiServer {
    device: Arc<Device>,
    connections: Arc<Mutex<Vec<Arc<ConnectionHandle>>>>,
    next_id: AtomicU64,
}

impl NativeApiServer {
    /// Create a server for `device`.
    #[must_use]
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            connections: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Bind `addr` and serve until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`NativeApiError::Bind`] when the address is taken and
    /// propagates accept errors.
    pub async fn bind_and_serve(self, addr: SocketAddr) -> Result<(), NativeApiError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| NativeApiError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Propagates accept errors; individual connection failures never
    /// surface here.
    pub async fn serve(self, listener: TcpListener) -> Result<(), NativeApiError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, "native API listening");
        }
        let fan_out = tokio::spawn(fan_out(
            Arc::clone(&self.device),
            Arc::clone(&self.connections),
        ));

        let result = loop {
            match listener.accept().await {
                Ok((stream, peer)) => self.spawn_connection(stream, peer).await,
                Err(err) => break Err(err.into()),
            }
        };
        fan_out.abort();
        result
    }

    async fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(connection = id, %peer, "accepted connection");

        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let handle = Arc::new(ConnectionHandle::new(id, peer, outbound_tx));
        self.connections.lock().await.push(Arc::clone(&handle));

        let (read_half, write_half) = stream.into_split();
        tokio::spawn(connection::write_loop(write_half, outbound_rx));

        let device = Arc::clone(&self.device);
        let connections = Arc::clone(&self.connections);
        tokio::spawn(async move {
            connection::read_loop(&device, &handle, read_half).await;
            // Sole removal point; the handle drops here and the writer
            // drains whatever is still queued.
            connections.lock().await.retain(|c| c.id() != handle.id());
            tracing::debug!(connection = handle.id(), "connection closed");
        });
    }
}

/// Pump bus events into every subscribed connection.
async fn fan_out(device: Arc<Device>, connections: Arc<Mutex<Vec<Arc<ConnectionHandle>>>>) {
    let mut rx = device.bus().subscribe();
    loop {
        match rx.recv().await {
            Ok(Event::StateChange { snapshot, .. }) => {
                for conn in connections.lock().await.iter() {
                    if conn.wants_states() && !conn.try_send(snapshot.clone()) {
                        tracing::warn!(
                            connection = conn.id(),
                            "state update dropped for slow client"
                        );
                    }
                }
            }
            Ok(Event::Log {
                level,
                tag,
                message,
                ..
            }) => {
                if level == LogLevel::None {
                    continue;
                }
                let line = format!("[{}][{}] {}", level.letter(), tag, message);
                let frame = ApiMessage::SubscribeLogsResponse(SubscribeLogsResponse {
                    level,
                    message: line.into_bytes(),
                });
                for conn in connections.lock().await.iter() {
                    if conn.wants_logs()
                        && level <= conn.log_level()
                        && !conn.try_send(frame.clone())
                    {
                        tracing::warn!(connection = conn.id(), "log line dropped for slow client");
                    }
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event fan-out lagged behind the bus");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}
