//! Adapter runtime integration.
//!
//! Bridges the synchronous control loop with the async TCP server: the loop
//! drains inbound commands without blocking and pushes acks, observations and
//! events back through an unbounded channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::core::GameSnapshot;
use crate::protocol::{
    build_observation, create_ack, create_event, AckMessage, AckStatus, EventMessage,
    ObservationMessage,
};
use crate::server::{is_disabled, run_server, ServerConfig, ServerReady, ServerStats};
use crate::types::GameEvent;

const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Dial input delivered to the control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Signed detents, positive is clockwise
    Turn(i32),
    Click,
    Hold,
    Release,
    Restart,
}

/// Message from the control loop to the server
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Ack { client_id: usize, ack: AckMessage },
    Observation(ObservationMessage),
    Event(EventMessage),
    /// Demo shown in subsequent welcomes
    Demo(&'static str),
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    port: u16,
    stats: Arc<ServerStats>,
    seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` when `DIAL_ADAPTER_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if is_disabled() {
            log::info!("adapter disabled (DIAL_ADAPTER_DISABLED)");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel::<ServerReady>();

        let rt = Runtime::new().context("failed to create adapter runtime")?;
        let endpoint = format!("{}:{}", config.host, config.port);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                log::error!("adapter server stopped: {e}");
            }
        });

        let ready = rt
            .block_on(async { tokio::time::timeout(READY_TIMEOUT, ready_rx).await })
            .map_err(|_| anyhow!("adapter did not start listening on {endpoint}"))?
            .map_err(|_| anyhow!("adapter failed to bind {endpoint}"))?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            port: ready.addr.port(),
            stats: ready.stats,
            seq: 0,
        })
    }

    /// Bound port (useful when configured with port 0)
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> u16 {
        self.stats.client_count()
    }

    pub fn streaming_count(&self) -> u16 {
        self.stats.streaming_count()
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Acknowledge an applied command
    pub fn ack(&self, cmd: &InboundCommand, applied: bool) {
        let status = if applied {
            AckStatus::Ok
        } else {
            AckStatus::Ignored
        };
        self.send(OutboundMessage::Ack {
            client_id: cmd.client_id,
            ack: create_ack(cmd.seq, status),
        });
    }

    /// Broadcast the puzzle state to streaming clients.
    ///
    /// Skipped entirely while nobody is streaming.
    pub fn publish_observation(&mut self, snap: &GameSnapshot) {
        if self.streaming_count() == 0 {
            return;
        }
        let seq = self.next_seq();
        self.send(OutboundMessage::Observation(build_observation(snap, seq)));
    }

    pub fn publish_events(&mut self, events: &[GameEvent]) {
        if self.streaming_count() == 0 {
            return;
        }
        for &event in events {
            let seq = self.next_seq();
            self.send(OutboundMessage::Event(create_event(seq, event)));
        }
    }

    pub fn set_demo(&self, name: &'static str) {
        self.send(OutboundMessage::Demo(name));
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}
