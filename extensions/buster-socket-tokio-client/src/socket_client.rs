use crate::SocketClientConfig;
use crate::decode_worker::{DecodeWorker, RawFrame};
use crate::frame_processor::FrameProcessor;
use crate::token_provider::{TokenProvider, authenticated_url};
use buster_socket::SocketError;
use buster_socket::dispatch::{ErrorCallback, RouteDispatcher};
use buster_socket::monitor::{PerformanceMonitor, PerformanceSnapshot};
use buster_socket_caller::{SocketCallerInterface, SocketReadyState};
use futures::future::BoxFuture;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::{self, protocol::Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

type StateChangeHandler = Arc<dyn Fn(SocketReadyState) + Send + Sync>;

/// Current ready state plus the optional observer notified on every change.
#[derive(Clone)]
struct StateReporter {
    state: Arc<Mutex<SocketReadyState>>,
    handler: Arc<Mutex<Option<StateChangeHandler>>>,
}

impl StateReporter {
    fn new(initial: SocketReadyState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
            handler: Arc::new(Mutex::new(None)),
        }
    }

    fn get(&self) -> SocketReadyState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, next: SocketReadyState) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == next {
                return;
            }
            *state = next;
        }

        tracing::info!(state = %next, "Socket state changed");

        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            handler(next);
        }
    }

    fn set_handler(&self, handler: StateChangeHandler) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler.clone());
        handler(self.get());
    }
}

enum Command {
    Send(String),
    Reconnect,
    Disconnect,
}

/// Raised by a reader task when its socket stops yielding frames.
struct ConnectionClosed {
    generation: u64,
}

struct Connection {
    sink: SplitSink<WsStream, WsMessage>,
    generation: u64,
    reader: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Owns the socket. All writes, reconnects and state transitions happen on
/// this task, driven by commands from the client and close notices from the
/// reader.
struct Supervisor {
    config: SocketClientConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
    dispatcher: Arc<RouteDispatcher>,
    state: StateReporter,
    decode_input: UnboundedSender<RawFrame>,
    closed_tx: UnboundedSender<ConnectionClosed>,
    connection: Option<Connection>,
    send_queue: VecDeque<String>,
    last_attempt: Option<Instant>,
    retry_at: Option<Instant>,
    next_generation: u64,
}

impl Supervisor {
    async fn run(
        mut self,
        mut commands: UnboundedReceiver<Command>,
        mut closed_rx: UnboundedReceiver<ConnectionClosed>,
    ) {
        loop {
            let retry_at = self.retry_at;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Send(text)) => self.send(text).await,
                    Some(Command::Reconnect) => self.try_connect(true).await,
                    Some(Command::Disconnect) => self.disconnect().await,
                    None => break,
                },
                Some(closed) = closed_rx.recv() => {
                    let current = self
                        .connection
                        .as_ref()
                        .is_some_and(|c| c.generation == closed.generation);
                    if current {
                        self.handle_closed();
                    }
                },
                _ = tokio::time::sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                    self.try_connect(false).await;
                },
            }
        }

        tracing::debug!("Socket supervisor stopped");
    }

    fn attach(&mut self, stream: WsStream) {
        let (sink, stream) = stream.split();
        let generation = self.next_generation;
        self.next_generation += 1;

        let reader = tokio::spawn(read_loop(
            stream,
            self.decode_input.clone(),
            self.closed_tx.clone(),
            generation,
        ));

        self.connection = Some(Connection {
            sink,
            generation,
            reader,
        });
        self.retry_at = None;
        self.state.set(SocketReadyState::Open);
    }

    async fn send(&mut self, text: String) {
        if self.connection.is_some() {
            self.write(text).await;
            return;
        }

        self.send_queue.push_back(text);
        tracing::debug!(
            queued = self.send_queue.len(),
            "Socket not open, queueing frame"
        );
        self.try_connect(false).await;
    }

    /// Writes one frame to the open socket. A failed write closes the
    /// connection; the frame is not retried.
    async fn write(&mut self, text: String) -> bool {
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };

        match connection.sink.send(WsMessage::Text(text.into())).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to write frame: {}", e);
                self.handle_closed();
                false
            }
        }
    }

    async fn flush_queue(&mut self) {
        if !self.send_queue.is_empty() {
            tracing::debug!(queued = self.send_queue.len(), "Flushing queued frames");
        }

        while self.connection.is_some() {
            let Some(text) = self.send_queue.pop_front() else {
                break;
            };
            self.write(text).await;
        }
    }

    /// Opens a new connection unless one is open. Unforced attempts are
    /// spaced at least `reconnect_delay` apart; a throttled attempt is
    /// rescheduled for when the delay has passed.
    async fn try_connect(&mut self, forced: bool) {
        if self.connection.is_some() {
            return;
        }

        if !forced {
            if let Some(last) = self.last_attempt {
                let earliest = last + self.config.reconnect_delay;
                if Instant::now() < earliest {
                    if self.retry_at.is_none() {
                        tracing::warn!(
                            delay = ?self.config.reconnect_delay,
                            "Reconnect throttled"
                        );
                    }
                    self.retry_at = Some(earliest);
                    return;
                }
            }
        }

        self.last_attempt = Some(Instant::now());
        self.retry_at = None;
        self.state.set(SocketReadyState::Connecting);

        match open_socket(&self.config.url, self.token_provider.as_deref()).await {
            Ok(stream) => {
                tracing::info!(url = %self.config.url, "Reconnected");
                self.attach(stream);
                self.flush_queue().await;
            }
            // Queued frames die with the attempt; the next send tries again.
            Err(e) => {
                tracing::warn!(url = %self.config.url, "Reconnect failed: {}", e);
                self.state.set(SocketReadyState::Closed);

                let dropped = self.send_queue.len();
                self.send_queue.clear();
                let rejected = self
                    .dispatcher
                    .reject_all_pending(SocketError::Disconnected);
                if dropped > 0 || rejected > 0 {
                    tracing::warn!(
                        dropped,
                        rejected,
                        "Discarded queued frames after failed reconnect"
                    );
                }
            }
        }
    }

    async fn disconnect(&mut self) {
        self.retry_at = None;

        if let Some(connection) = self.connection.as_mut() {
            self.state.set(SocketReadyState::Closing);
            if let Err(e) = connection.sink.send(WsMessage::Close(None)).await {
                tracing::debug!("Close frame not sent: {}", e);
            }
        }

        self.handle_closed();
    }

    /// Drops the connection and rejects every outstanding request.
    /// Subscriptions stay registered for the next connection.
    fn handle_closed(&mut self) {
        if self.connection.take().is_none() {
            return;
        }

        self.state.set(SocketReadyState::Closed);
        let rejected = self
            .dispatcher
            .reject_all_pending(SocketError::Disconnected);
        tracing::info!(rejected, "Socket closed");
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    decode_input: UnboundedSender<RawFrame>,
    closed_tx: UnboundedSender<ConnectionClosed>,
    generation: u64,
) {
    while let Some(message) = stream.next().await {
        let raw = match message {
            Ok(WsMessage::Text(text)) => RawFrame::Text(text.as_str().to_owned()),
            Ok(WsMessage::Binary(bytes)) => RawFrame::Binary(bytes),
            Ok(WsMessage::Close(frame)) => {
                tracing::info!(?frame, "Server closed the socket");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Socket read failed: {}", e);
                break;
            }
        };

        tracing::trace!(bytes = raw.len(), "Received frame");
        if decode_input.send(raw).is_err() {
            break;
        }
    }

    let _ = closed_tx.send(ConnectionClosed { generation });
}

async fn open_socket(
    url: &str,
    token_provider: Option<&dyn TokenProvider>,
) -> io::Result<WsStream> {
    let url = match token_provider {
        Some(provider) => match provider.access_token().await.map_err(io::Error::other)? {
            Some(token) => authenticated_url(url, &token)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    SocketError::Unauthorized,
                ));
            }
        },
        None => url.to_string(),
    };

    if url.starts_with("wss://") {
        // rustls needs a process-wide crypto provider; a second install is a no-op error.
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    let (stream, _response) = connect_async(url.as_str())
        .await
        .map_err(|e| match e {
            tungstenite::Error::Io(e) => e,
            other => io::Error::other(other),
        })?;

    Ok(stream)
}

/// A WebSocket client for the Buster real-time API.
///
/// Three tasks run per client: a supervisor owning the socket (writes, send
/// queue, reconnects), a decode worker, and a frame processor feeding the
/// [`RouteDispatcher`] in adaptive batches. Dropping the client stops all of
/// them.
pub struct SocketClient {
    dispatcher: Arc<RouteDispatcher>,
    commands: UnboundedSender<Command>,
    state: StateReporter,
    monitor: Arc<Mutex<PerformanceMonitor>>,
    request_timeout: Duration,
    _decode_worker: DecodeWorker,
    task_handles: Vec<JoinHandle<()>>,
}

impl SocketClient {
    /// Connects to `config.url`. Fails if the first connection attempt fails.
    pub async fn connect(config: SocketClientConfig) -> io::Result<Self> {
        Self::connect_with(config, None).await
    }

    /// Like [`connect`](Self::connect), with the provider's token attached to
    /// every connection attempt.
    pub async fn connect_with_token_provider(
        config: SocketClientConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> io::Result<Self> {
        Self::connect_with(config, Some(token_provider)).await
    }

    async fn connect_with(
        config: SocketClientConfig,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> io::Result<Self> {
        let stream = open_socket(&config.url, token_provider.as_deref()).await?;
        tracing::info!(url = %config.url, "Connected");

        let (command_tx, command_rx) = unbounded_channel::<Command>();
        let (closed_tx, closed_rx) = unbounded_channel::<ConnectionClosed>();

        let dispatcher = Arc::new(RouteDispatcher::new({
            let command_tx = command_tx.clone();
            move |text: String| {
                command_tx
                    .send(Command::Send(text))
                    .map_err(|_| SocketError::Transport("client is shut down".to_string()))
            }
        }));

        let monitor = Arc::new(Mutex::new(PerformanceMonitor::new(
            config.performance_window,
            config.frame_budget,
        )));

        let (decode_worker, decoded) = DecodeWorker::spawn(config.large_frame_threshold);

        let processor = FrameProcessor::new(
            dispatcher.clone(),
            monitor.clone(),
            config.capabilities,
            config.max_backlog,
        );

        let state = StateReporter::new(SocketReadyState::Connecting);
        let request_timeout = config.request_timeout;

        let mut supervisor = Supervisor {
            config,
            token_provider,
            dispatcher: dispatcher.clone(),
            state: state.clone(),
            decode_input: decode_worker.input(),
            closed_tx,
            connection: None,
            send_queue: VecDeque::new(),
            last_attempt: Some(Instant::now()),
            retry_at: None,
            next_generation: 0,
        };
        supervisor.attach(stream);

        let task_handles = vec![
            tokio::spawn(processor.run(decoded)),
            tokio::spawn(supervisor.run(command_rx, closed_rx)),
        ];

        Ok(Self {
            dispatcher,
            commands: command_tx,
            state,
            monitor,
            request_timeout,
            _decode_worker: decode_worker,
            task_handles,
        })
    }

    /// Installs the state-change observer. It is called right away with the
    /// current state, then on every transition.
    pub fn set_state_change_handler(
        &self,
        handler: impl Fn(SocketReadyState) + Send + Sync + 'static,
    ) {
        self.state.set_handler(Arc::new(handler));
    }

    /// Receives errors no listener handled: remote errors on routes without
    /// an `on_error`, and panicking callbacks.
    pub fn set_error_handler(&self, handler: impl Fn(&SocketError) + Send + Sync + 'static) {
        self.dispatcher
            .set_fallback_error_handler(ErrorCallback::new(handler));
    }

    /// Closes the socket. Pending requests are rejected; subscriptions stay,
    /// and the next emitted frame reconnects.
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    /// Connects now if closed, bypassing the reconnect throttle.
    pub fn reconnect(&self) {
        let _ = self.commands.send(Command::Reconnect);
    }

    pub fn performance_snapshot(&self) -> PerformanceSnapshot {
        self.monitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        for handle in &self.task_handles {
            handle.abort();
        }

        self.state.set(SocketReadyState::Closed);
        self.dispatcher
            .reject_all_pending(SocketError::Disconnected);
    }
}

#[async_trait::async_trait]
impl SocketCallerInterface for SocketClient {
    fn get_dispatcher(&self) -> Arc<RouteDispatcher> {
        self.dispatcher.clone()
    }

    fn default_request_timeout(&self) -> Option<Duration> {
        Some(self.request_timeout)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn ready_state(&self) -> SocketReadyState {
        self.state.get()
    }
}
