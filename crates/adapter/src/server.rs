//! TCP server for the dial adapter.
//!
//! One task per client reads lines, validates them and forwards dial input
//! to the control loop through a bounded queue. A dispatcher task fans the
//! loop's outbound messages back out to clients.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;
pub const DEFAULT_MAX_PENDING: usize = 16;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_pending_commands: DEFAULT_MAX_PENDING,
        }
    }
}

impl ServerConfig {
    /// Read `DIAL_ADAPTER_HOST`, `DIAL_ADAPTER_PORT` and
    /// `DIAL_ADAPTER_MAX_PENDING`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("DIAL_ADAPTER_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or("DIAL_ADAPTER_PORT", lookup("DIAL_ADAPTER_PORT"), defaults.port);
        let max_pending_commands = parse_or(
            "DIAL_ADAPTER_MAX_PENDING",
            lookup("DIAL_ADAPTER_MAX_PENDING"),
            defaults.max_pending_commands,
        )
        .max(1);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.trim().parse().unwrap_or_else(|_| {
            log::warn!("{key}={s:?} is not valid; using default");
            default
        }),
    }
}

/// Whether `DIAL_ADAPTER_DISABLED` switches the adapter off
pub fn is_disabled() -> bool {
    std::env::var("DIAL_ADAPTER_DISABLED")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

pub(crate) fn is_truthy(v: &str) -> bool {
    let v = v.trim();
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Fail fast if `host:port` cannot be bound right now
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    let listener = std::net::TcpListener::bind((host, port))?;
    drop(listener);
    Ok(())
}

/// Live connection counts, readable from the control loop
#[derive(Debug, Default)]
pub struct ServerStats {
    clients: AtomicU16,
    streaming: AtomicU16,
}

impl ServerStats {
    pub fn client_count(&self) -> u16 {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn streaming_count(&self) -> u16 {
        self.streaming.load(Ordering::Relaxed)
    }

    fn publish(&self, clients: &[ClientHandle]) {
        let streaming = clients.iter().filter(|c| c.stream_observations).count();
        self.clients
            .store(clients.len().min(u16::MAX as usize) as u16, Ordering::Relaxed);
        self.streaming
            .store(streaming.min(u16::MAX as usize) as u16, Ordering::Relaxed);
    }
}

/// Sent once the listener is bound
#[derive(Debug, Clone)]
pub struct ServerReady {
    pub addr: SocketAddr,
    pub stats: Arc<ServerStats>,
}

struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    demo: RwLock<&'static str>,
    stats: Arc<ServerStats>,
}

impl ServerState {
    async fn update_client(&self, client_id: usize, f: impl FnOnce(&mut ClientHandle)) {
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            f(client);
        }
        self.stats.publish(&clients);
    }

    async fn send_to(&self, client_id: usize, line: Arc<str>) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(line);
        }
    }

    async fn broadcast(&self, line: Arc<str>) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.stream_observations) {
            let _ = c.tx.send(Arc::clone(&line));
        }
    }
}

struct ClientHandle {
    id: usize,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<Arc<str>>,
}

impl ClientHandle {
    /// Record `seq` if it is strictly greater than the last one seen
    fn advance_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

fn encode<T: Serialize>(msg: &T) -> Option<Arc<str>> {
    match serde_json::to_string(msg) {
        Ok(s) => Some(Arc::from(s)),
        Err(e) => {
            log::error!("adapter: failed to encode message: {e}");
            None
        }
    }
}

/// Run the adapter server until the listener fails.
///
/// `command_tx` is the bounded queue into the control loop; `out_rx` carries
/// acks, observations, events and demo changes back out.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<ServerReady>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    log::info!("adapter listening on {bound}");

    let state = Arc::new(ServerState {
        clients: RwLock::new(Vec::new()),
        demo: RwLock::new("tetris"),
        stats: Arc::new(ServerStats::default()),
    });

    if let Some(tx) = ready_tx {
        let _ = tx.send(ServerReady {
            addr: bound,
            stats: Arc::clone(&state.stats),
        });
    }

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::Ack { client_id, ack } => {
                        if let Some(line) = encode(&ack) {
                            state.send_to(client_id, line).await;
                        }
                    }
                    OutboundMessage::Observation(obs) => {
                        if let Some(line) = encode(&obs) {
                            state.broadcast(line).await;
                        }
                    }
                    OutboundMessage::Event(event) => {
                        if let Some(line) = encode(&event) {
                            state.broadcast(line).await;
                        }
                    }
                    OutboundMessage::Demo(name) => {
                        *state.demo.write().await = name;
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("adapter: client {client_id} connected from {addr}");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, &state, command_tx).await {
                log::warn!("adapter: client {client_id} error: {e}");
            }
            log::info!("adapter: client {client_id} disconnected");
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    socket.set_nodelay(true)?;
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<Arc<str>>();
    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.stats.publish(&clients);
    }

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            log::trace!("adapter -> {client_id}: {line}");
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
        }
    });

    let reply = |msg: ErrorMessage| {
        if let Some(line) = encode(&msg) {
            let _ = tx.send(line);
        }
    };

    let mut line = String::new();
    let result: anyhow::Result<()> = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        log::trace!("adapter <- {client_id}: {trimmed}");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let mut accepted = true;
                state
                    .update_client(client_id, |c| {
                        accepted = !c.handshaken || c.advance_seq(hello.seq);
                    })
                    .await;
                if !accepted {
                    reply(create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }

                if !is_supported_version(&hello.protocol_version) {
                    reply(create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!(
                            "protocol version {} not supported (server {})",
                            hello.protocol_version, PROTOCOL_VERSION
                        ),
                    ));
                    break Ok(());
                }

                state
                    .update_client(client_id, |c| {
                        c.handshaken = true;
                        c.last_seq = Some(hello.seq);
                        c.stream_observations = hello.stream_observations;
                    })
                    .await;
                log::info!(
                    "adapter: client {client_id} is {} {} (stream={})",
                    hello.client.name,
                    hello.client.version,
                    hello.stream_observations
                );

                let demo = *state.demo.read().await;
                if let Some(line) = encode(&create_welcome(hello.seq, client_id as u64, demo)) {
                    let _ = tx.send(line);
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                let mut handshaken = false;
                let mut in_order = false;
                state
                    .update_client(client_id, |c| {
                        handshaken = c.handshaken;
                        in_order = handshaken && c.advance_seq(cmd.seq);
                    })
                    .await;
                if !handshaken {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before command",
                    ));
                    continue;
                }
                if !in_order {
                    reply(create_error(
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    ));
                    continue;
                }

                let command = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply(create_error(cmd.seq, ErrorCode::InvalidCommand, message));
                        continue;
                    }
                };

                match command_tx.try_send(InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    command,
                }) {
                    // The loop acks once the input is applied.
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => reply(create_error(
                        cmd.seq,
                        ErrorCode::Backpressure,
                        "command queue is full",
                    )),
                    Err(TrySendError::Closed(_)) => break Ok(()),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                reply(create_error(
                    unknown.seq,
                    ErrorCode::InvalidCommand,
                    "unknown message type",
                ));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {e}"),
                ));
            }
        }
    };

    {
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        state.stats.publish(&clients);
    }

    drop(reply);
    drop(tx);
    let _ = write_task.await;
    result
}

/// Largest detent count a single remote turn may request
pub const MAX_TURN_DETENTS: u32 = 64;

/// Translate a validated command into loop input
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match cmd.input {
        InputName::Turn => match cmd.detents.unwrap_or(1) {
            0 => Err("turn needs a non-zero detent count"),
            n if n.unsigned_abs() > MAX_TURN_DETENTS => {
                Err("turn detent count out of range")
            }
            n => Ok(ClientCommand::Turn(n)),
        },
        InputName::Click => Ok(ClientCommand::Click),
        InputName::Hold => Ok(ClientCommand::Hold),
        InputName::Release => Ok(ClientCommand::Release),
        InputName::Restart => Ok(ClientCommand::Restart),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn config_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 7878);
        assert_eq!(config.max_pending_commands, 16);
    }

    #[test]
    fn config_overrides_and_fallbacks() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DIAL_ADAPTER_HOST", "0.0.0.0"),
            ("DIAL_ADAPTER_PORT", "not-a-port"),
            ("DIAL_ADAPTER_MAX_PENDING", "0"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_pending_commands, 1);
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("yes"));
    }

    #[test]
    fn seq_must_strictly_increase() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut c = ClientHandle {
            id: 1,
            stream_observations: false,
            handshaken: true,
            last_seq: Some(3),
            tx,
        };
        assert!(!c.advance_seq(3));
        assert!(!c.advance_seq(2));
        assert!(c.advance_seq(4));
        assert_eq!(c.last_seq, Some(4));
    }

    #[test]
    fn map_turn_defaults_to_one_detent() {
        let cmd = create_command(1, InputName::Turn, None);
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Turn(1)));
        let cmd = create_command(2, InputName::Turn, Some(0));
        assert!(map_command(&cmd).is_err());
        let cmd = create_command(3, InputName::Restart, Some(5));
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Restart));
    }

    #[test]
    fn map_turn_rejects_oversized_counts() {
        let cmd = create_command(1, InputName::Turn, Some(64));
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Turn(64)));
        let cmd = create_command(2, InputName::Turn, Some(-64));
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Turn(-64)));
        let cmd = create_command(3, InputName::Turn, Some(65));
        assert!(map_command(&cmd).is_err());
        let cmd = create_command(4, InputName::Turn, Some(i32::MAX));
        assert!(map_command(&cmd).is_err());
        let cmd = create_command(5, InputName::Turn, Some(i32::MIN));
        assert!(map_command(&cmd).is_err());
    }
}
