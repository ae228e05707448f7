//! Connection manager — owns the single broker connection of a session.
//!
//! The connection is an owned resource with explicit open/close. Opening is
//! guarded by a valid user id and fails softly: a broker that is down means
//! no realtime updates, never a broken console. On loss, a bounded
//! exponential backoff reconnect restores the subscription set and
//! re-announces presence (configurable; disable to match a
//! connect-once-only policy).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use facilityhub_core::config::broker::BrokerConfig;
use facilityhub_core::types::UserId;
use facilityhub_core::{AppError, AppResult};
use facilityhub_entity::presence::{PresenceStatus, PresenceUpdate};
use facilityhub_entity::session::Session;

use crate::stomp::{Command, Frame};
use crate::topic;

use super::subscription::{Subscription, SubscriptionRegistry};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Lifecycle state of the broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No live socket.
    Disconnected,
    /// Handshake or reconnect in progress.
    Connecting,
    /// STOMP session established.
    Connected,
}

#[derive(Debug)]
enum WriterCommand {
    /// Serialize and send a frame.
    Frame(Frame),
    /// Graceful teardown: DISCONNECT after draining queued frames.
    Shutdown,
}

/// Opens broker connections, at most one per active session.
#[derive(Debug)]
pub struct ConnectionManager {
    config: BrokerConfig,
    active: Arc<AtomicBool>,
}

impl ConnectionManager {
    /// Creates a manager for the configured broker.
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opens the session's broker connection and performs the STOMP
    /// handshake.
    ///
    /// Returns `ErrorKind::Connection` when the broker is unreachable; the
    /// caller must treat that as degraded operation, not a failure.
    pub async fn open(&self, session: &Session) -> AppResult<RealtimeConnection> {
        if session.user_id.into_inner() <= 0 {
            return Err(AppError::connection(
                "Cannot open broker connection without a signed-in user",
            ));
        }

        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::internal(
                "A broker connection is already open for this session",
            ));
        }

        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);

        let timeout = Duration::from_secs(self.config.connect_timeout_seconds);
        let ws = match connect_and_handshake(&self.config.endpoint, timeout).await {
            Ok(ws) => ws,
            Err(e) => {
                let _ = status_tx.send(ConnectionStatus::Disconnected);
                self.active.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let _ = status_tx.send(ConnectionStatus::Connected);

        let (writer_tx, writer_rx) = mpsc::channel(self.config.channel_buffer_size);
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let cancel = CancellationToken::new();

        tokio::spawn(io_loop(
            ws,
            writer_rx,
            subscriptions.clone(),
            status_tx,
            cancel.clone(),
            self.config.clone(),
            session.user_id,
            self.active.clone(),
        ));

        info!(user_id = %session.user_id, endpoint = %self.config.endpoint, "Broker connection established");

        Ok(RealtimeConnection {
            user_id: session.user_id,
            writer_tx,
            status_rx,
            subscriptions,
            next_sub_id: AtomicU64::new(0),
            cancel,
            buffer_size: self.config.channel_buffer_size,
        })
    }
}

/// The session's live broker connection.
#[derive(Debug)]
pub struct RealtimeConnection {
    user_id: UserId,
    writer_tx: mpsc::Sender<WriterCommand>,
    status_rx: watch::Receiver<ConnectionStatus>,
    subscriptions: Arc<SubscriptionRegistry>,
    next_sub_id: AtomicU64,
    cancel: CancellationToken,
    buffer_size: usize,
}

impl RealtimeConnection {
    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// A watch on the connection status, for callers that want to observe
    /// reconnects.
    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// The user this connection belongs to.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Subscribes to a topic. Message bodies arrive on the returned
    /// subscription in broker delivery order.
    pub async fn subscribe(&self, topic: impl Into<String>) -> AppResult<Subscription> {
        let topic = topic.into();
        let id = format!("sub-{}", self.next_sub_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = mpsc::channel(self.buffer_size);

        // Register before the SUBSCRIBE goes out so no delivery races the
        // registry insert.
        self.subscriptions.add(id.clone(), topic.clone(), sender);

        let frame = Frame::subscribe(&id, &topic);
        if self
            .writer_tx
            .send(WriterCommand::Frame(frame))
            .await
            .is_err()
        {
            self.subscriptions.remove(&id);
            return Err(AppError::connection("Broker connection is closed"));
        }

        debug!(subscription = %id, topic = %topic, "Subscribed");

        Ok(Subscription {
            id,
            topic,
            receiver,
        })
    }

    /// Tears down a subscription.
    pub async fn unsubscribe(&self, subscription: Subscription) {
        self.unsubscribe_id(&subscription.id).await;
    }

    /// Tears down a subscription by id. Dropping the registry entry closes
    /// the subscription's channel, so a consumer blocked on `recv` observes
    /// the end of the stream.
    pub async fn unsubscribe_id(&self, id: &str) {
        self.subscriptions.remove(id);
        let frame = Frame::unsubscribe(id);
        let _ = self.writer_tx.send(WriterCommand::Frame(frame)).await;
        debug!(subscription = %id, "Unsubscribed");
    }

    /// Publishes a JSON body to a destination, fire-and-forget. Dropped
    /// silently if the connection is down or the outbound queue is full.
    pub fn publish(&self, destination: &str, body: &str) {
        let frame = Frame::send(destination, body);
        if self.writer_tx.try_send(WriterCommand::Frame(frame)).is_err() {
            debug!(destination = %destination, "Publish dropped, connection unavailable");
        }
    }

    /// Announces the session's presence on the user-status destination.
    pub fn announce(&self, status: PresenceStatus) {
        let update = PresenceUpdate {
            user_id: self.user_id,
            status,
        };
        match serde_json::to_string(&update) {
            Ok(body) => self.publish(topic::USER_STATUS_DESTINATION, &body),
            Err(e) => warn!(error = %e, "Failed to serialize presence update"),
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Announces offline and tears the connection down. Best-effort by
    /// contract: the page may already be unloading, so nothing is retried
    /// and no error is surfaced.
    pub async fn close(&self) {
        self.announce(PresenceStatus::Offline);
        if self.writer_tx.send(WriterCommand::Shutdown).await.is_err() {
            // Writer already gone; make sure the task unwinds.
            self.cancel.cancel();
        }
    }
}

impl Drop for RealtimeConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn stomp_host(endpoint: &str) -> &str {
    let authority = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    let authority = authority.split('/').next().unwrap_or(authority);
    authority.split(':').next().unwrap_or(authority)
}

async fn connect_and_handshake(endpoint: &str, timeout: Duration) -> AppResult<WsStream> {
    let (mut ws, _) = tokio::time::timeout(timeout, connect_async(endpoint))
        .await
        .map_err(|_| AppError::connection("Broker connect timed out"))?
        .map_err(|e| {
            AppError::with_source(
                facilityhub_core::error::ErrorKind::Connection,
                format!("Broker unreachable: {e}"),
                e,
            )
        })?;

    let connect = Frame::connect(stomp_host(endpoint)).serialize();
    ws.send(Message::Text(connect.into()))
        .await
        .map_err(|e| AppError::connection(format!("STOMP handshake send failed: {e}")))?;

    loop {
        let inbound = tokio::time::timeout(timeout, ws.next())
            .await
            .map_err(|_| AppError::connection("STOMP handshake timed out"))?;

        match inbound {
            Some(Ok(Message::Text(text))) => {
                if Frame::is_heartbeat(text.as_str()) {
                    continue;
                }
                let frame = Frame::parse(text.as_str())?;
                match frame.command {
                    Command::Connected => return Ok(ws),
                    Command::Error => {
                        return Err(AppError::connection(format!(
                            "Broker rejected connection: {}",
                            frame.get_header("message").unwrap_or(&frame.body)
                        )));
                    }
                    _ => continue,
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                return Err(AppError::connection(format!("Handshake failed: {e}")));
            }
            None => {
                return Err(AppError::connection("Broker closed during handshake"));
            }
        }
    }
}

enum LoopExit {
    Cancelled,
    Shutdown,
    Lost,
}

#[allow(clippy::too_many_arguments)]
async fn io_loop(
    ws: WsStream,
    mut writer_rx: mpsc::Receiver<WriterCommand>,
    subscriptions: Arc<SubscriptionRegistry>,
    status_tx: watch::Sender<ConnectionStatus>,
    cancel: CancellationToken,
    config: BrokerConfig,
    user_id: UserId,
    active: Arc<AtomicBool>,
) {
    let (mut sink, mut source) = ws.split();

    'session: loop {
        let exit = run_session(&mut sink, &mut source, &mut writer_rx, &subscriptions, &cancel).await;

        match exit {
            LoopExit::Cancelled | LoopExit::Shutdown => {
                let _ = sink
                    .send(Message::Text(Frame::disconnect().serialize().into()))
                    .await;
                let _ = sink.close().await;
                break 'session;
            }
            LoopExit::Lost => {
                if !config.reconnect.enabled {
                    warn!("Broker connection lost, reconnect disabled");
                    break 'session;
                }

                let _ = status_tx.send(ConnectionStatus::Connecting);
                match reconnect(&config, &subscriptions, user_id).await {
                    Some(ws) => {
                        let (new_sink, new_source) = ws.split();
                        sink = new_sink;
                        source = new_source;
                        let _ = status_tx.send(ConnectionStatus::Connected);
                    }
                    None => {
                        warn!("Broker reconnect attempts exhausted");
                        break 'session;
                    }
                }
            }
        }
    }

    let _ = status_tx.send(ConnectionStatus::Disconnected);
    active.store(false, Ordering::SeqCst);
    debug!("Broker io loop terminated");
}

async fn run_session(
    sink: &mut WsSink,
    source: &mut WsSource,
    writer_rx: &mut mpsc::Receiver<WriterCommand>,
    subscriptions: &SubscriptionRegistry,
    cancel: &CancellationToken,
) -> LoopExit {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                return LoopExit::Cancelled;
            }
            cmd = writer_rx.recv() => {
                match cmd {
                    Some(WriterCommand::Frame(frame)) => {
                        if sink
                            .send(Message::Text(frame.serialize().into()))
                            .await
                            .is_err()
                        {
                            return LoopExit::Lost;
                        }
                    }
                    Some(WriterCommand::Shutdown) | None => {
                        return LoopExit::Shutdown;
                    }
                }
            }
            inbound = source.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(subscriptions, text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return LoopExit::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Broker socket error");
                        return LoopExit::Lost;
                    }
                }
            }
        }
    }
}

/// Routes a single inbound text payload. MESSAGE frames are delivered to
/// their subscription in arrival order; everything else is logged.
async fn handle_text(subscriptions: &SubscriptionRegistry, raw: &str) {
    if Frame::is_heartbeat(raw) {
        return;
    }

    let frame = match Frame::parse(raw) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "Unparseable broker frame dropped");
            return;
        }
    };

    match frame.command {
        Command::Message => {
            let Some(id) = frame.get_header("subscription") else {
                warn!("MESSAGE frame without subscription header dropped");
                return;
            };
            let id = id.to_string();
            subscriptions.deliver(&id, frame.body).await;
        }
        Command::Error => {
            warn!(
                message = frame.get_header("message").unwrap_or(&frame.body),
                "Broker reported an error"
            );
        }
        other => {
            debug!(command = %other, "Ignored broker frame");
        }
    }
}

async fn reconnect(
    config: &BrokerConfig,
    subscriptions: &SubscriptionRegistry,
    user_id: UserId,
) -> Option<WsStream> {
    let policy = &config.reconnect;
    let timeout = Duration::from_secs(config.connect_timeout_seconds);

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(Duration::from_millis(policy.delay_ms(attempt))).await;

        match connect_and_handshake(&config.endpoint, timeout).await {
            Ok(mut ws) => match restore_session(&mut ws, subscriptions, user_id).await {
                Ok(()) => {
                    info!(attempt, "Broker connection re-established");
                    return Some(ws);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Reconnected socket failed during restore");
                }
            },
            Err(e) => {
                warn!(attempt, error = %e, "Reconnect attempt failed");
            }
        }
    }

    None
}

/// Re-issues every live subscription and re-announces online presence on a
/// fresh socket.
async fn restore_session(
    ws: &mut WsStream,
    subscriptions: &SubscriptionRegistry,
    user_id: UserId,
) -> AppResult<()> {
    for (id, topic_path) in subscriptions.all() {
        let frame = Frame::subscribe(&id, &topic_path);
        ws.send(Message::Text(frame.serialize().into()))
            .await
            .map_err(|e| AppError::connection(format!("Re-subscribe failed: {e}")))?;
    }

    let update = PresenceUpdate {
        user_id,
        status: PresenceStatus::Online,
    };
    let body = serde_json::to_string(&update)?;
    ws.send(Message::Text(
        Frame::send(topic::USER_STATUS_DESTINATION, &body).serialize().into(),
    ))
    .await
    .map_err(|e| AppError::connection(format!("Presence re-announce failed: {e}")))?;

    Ok(())
}
