//! Per-connection protocol state.
//!
//! Each accepted socket gets a reader loop (this module), a writer
//! task draining a bounded outbound queue, and a [`ConnectionHandle`]
//! the server uses to fan bus traffic out. Subscriptions are plain
//! atomic flags: a connection sees no state or log traffic until it
//! asks.

use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use espnode_app::device::Device;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;
use espnode_proto::message::{ConnectResponse, HelloResponse, SubscribeLogsResponse};

use crate::framed;

/// Messages a connection may queue before the writer catches up.
pub const OUTBOUND_QUEUE: usize = 64;

/// Protocol version advertised in the hello exchange.
pub const API_VERSION: (u32, u32) = (1, 10);

/// Shared view of one client connection.
///
/// Owned by the server registry and the reader task; the writer task
/// holds the receiving end of the outbound queue.
pub struct ConnectionHandle {
    id: u64,
    peer: SocketAddr,
    outbound: mpsc::Sender<ApiMessage>,
    wants_states: AtomicBool,
    wants_logs: AtomicBool,
    log_level: AtomicU32,
}

impl ConnectionHandle {
    /// Create a handle for connection `id` from `peer`, sending
    /// through `outbound`.
    #[must_use]
    pub fn new(id: u64, peer: SocketAddr, outbound: mpsc::Sender<ApiMessage>) -> Self {
        Self {
            id,
            peer,
            outbound,
            wants_states: AtomicBool::new(false),
            wants_logs: AtomicBool::new(false),
            log_level: AtomicU32::new(LogLevel::None.as_u32()),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    #[must_use]
    pub fn wants_states(&self) -> bool {
        self.wants_states.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn wants_logs(&self) -> bool {
        self.wants_logs.load(Ordering::Relaxed)
    }

    /// The verbosity ceiling this connection asked for.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_u32(self.log_level.load(Ordering::Relaxed))
    }

    fn subscribe_states(&self) {
        self.wants_states.store(true, Ordering::Relaxed);
    }

    fn subscribe_logs(&self, level: LogLevel) {
        self.log_level.store(level.as_u32(), Ordering::Relaxed);
        self.wants_logs.store(true, Ordering::Relaxed);
    }

    /// Queue a message for this connection, waiting for room.
    ///
    /// Returns `false` when the writer is gone and the connection is
    /// effectively dead.
    pub async fn send(&self, message: ApiMessage) -> bool {
        self.outbound.send(message).await.is_ok()
    }

    /// Queue a message without waiting. Used for bus fan-out, where a
    /// slow client must not stall the others.
    ///
    /// Returns `false` when the queue is full or the writer is gone.
    pub fn try_send(&self, message: ApiMessage) -> bool {
        self.outbound.try_send(message).is_ok()
    }
}

/// Drain the outbound queue onto the socket until it closes or a
/// write fails.
pub async fn write_loop<W>(mut writer: W, mut rx: mpsc::Receiver<ApiMessage>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let payload = message.encode_payload();
        if let Err(err) = framed::write_frame(&mut writer, message.type_id(), &payload).await {
            tracing::debug!(error = %err, "write failed, abandoning connection");
            break;
        }
    }
}

/// Read and dispatch frames until the peer disconnects or violates
/// the protocol.
pub async fn read_loop<R>(device: &Arc<Device>, handle: &Arc<ConnectionHandle>, mut reader: R)
where
    R: AsyncRead + Unpin,
{
    loop {
        match framed::read_frame(&mut reader).await {
            Ok(Some((type_id, payload))) => match ApiMessage::decode(type_id, &payload) {
                Ok(Some(message)) => {
                    if handle_message(device, handle, message).await.is_break() {
                        break;
                    }
                }
                Ok(None) => {
                    device.log(
                        LogLevel::Warn,
                        "api",
                        format!("unknown message type {type_id}, closing connection"),
                    );
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        connection = handle.id(),
                        error = %err,
                        "malformed payload, closing connection"
                    );
                    break;
                }
            },
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(connection = handle.id(), error = %err, "dropping connection");
                break;
            }
        }
    }
}

/// Dispatch one decoded message.
///
/// Session control messages are answered here; anything addressed to
/// an entity goes through the device registry.
pub async fn handle_message(
    device: &Arc<Device>,
    handle: &Arc<ConnectionHandle>,
    message: ApiMessage,
) -> ControlFlow<()> {
    match message {
        ApiMessage::HelloRequest(hello) => {
            device.log(
                LogLevel::Info,
                "api",
                format!("hello from {} ({})", handle.peer(), hello.client_info),
            );
            let response = ApiMessage::HelloResponse(HelloResponse {
                api_version_major: API_VERSION.0,
                api_version_minor: API_VERSION.1,
                server_info: format!("espnode {}", env!("CARGO_PKG_VERSION")),
                name: device.info().name.clone(),
            });
            send_or_break(handle, response).await
        }
        ApiMessage::ConnectRequest(_) => {
            device.log(
                LogLevel::Info,
                "api",
                format!("client {} connected", handle.peer()),
            );
            let response = ApiMessage::ConnectResponse(ConnectResponse {
                invalid_password: false,
            });
            send_or_break(handle, response).await
        }
        ApiMessage::DisconnectRequest => {
            device.log(
                LogLevel::Info,
                "api",
                format!("client {} disconnected", handle.peer()),
            );
            let _ = handle.send(ApiMessage::DisconnectResponse).await;
            ControlFlow::Break(())
        }
        ApiMessage::SubscribeLogsRequest(request) => {
            handle.subscribe_logs(request.level);
            // The subscription is acknowledged with the requested
            // verbosity echoed back.
            let response = ApiMessage::SubscribeLogsResponse(SubscribeLogsResponse {
                level: request.level,
                message: b"Subscribed to logs".to_vec(),
            });
            send_or_break(handle, response).await
        }
        ApiMessage::PingRequest => send_or_break(handle, ApiMessage::PingResponse).await,
        ApiMessage::SubscribeStatesRequest => {
            handle.subscribe_states();
            // Replay the current state of every entity, in key order,
            // before any live updates arrive.
            for entity in device.entities().await {
                if let Some(snapshot) = entity.snapshot().await {
                    if send_or_break(handle, snapshot).await.is_break() {
                        return ControlFlow::Break(());
                    }
                }
            }
            ControlFlow::Continue(())
        }
        ApiMessage::ListEntitiesRequest => {
            for descriptor in device.descriptors().await {
                if send_or_break(handle, descriptor).await.is_break() {
                    return ControlFlow::Break(());
                }
            }
            send_or_break(handle, ApiMessage::ListEntitiesDoneResponse).await
        }
        ApiMessage::DeviceInfoRequest => {
            let response = ApiMessage::DeviceInfoResponse(device.device_info_response());
            send_or_break(handle, response).await
        }
        ApiMessage::SubscribeHomeassistantServicesRequest
        | ApiMessage::GetTimeRequest
        | ApiMessage::SubscribeHomeAssistantStatesRequest => {
            tracing::debug!(
                connection = handle.id(),
                type_id = message.type_id(),
                "recognised but unimplemented subscription, ignoring"
            );
            ControlFlow::Continue(())
        }
        other => {
            device.dispatch_command(&other).await;
            ControlFlow::Continue(())
        }
    }
}

async fn send_or_break(handle: &Arc<ConnectionHandle>, message: ApiMessage) -> ControlFlow<()> {
    if handle.send(message).await {
        ControlFlow::Continue(())
    } else {
        ControlFlow::Break(())
    }
}
