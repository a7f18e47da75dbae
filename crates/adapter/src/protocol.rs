//! Wire messages for the dial adapter.
//!
//! Every message is one JSON object per line and carries `type`, `seq`
//! (sender-side sequence number) and `ts` (milliseconds since the epoch).

use serde::{Deserialize, Serialize};

use crate::core::GameSnapshot;
use crate::types::{GameEvent, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Version sent in `welcome`; clients must share the major number.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Whether a client's requested version is served by this adapter
pub fn is_supported_version(version: &str) -> bool {
    let major = version.trim().split('.').next().unwrap_or("");
    major == "1"
}

// ============== Client -> Dial ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

/// First message on a connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Remote dial input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub input: InputName,
    /// Signed detent count for `turn`; defaults to one clockwise detent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detents: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputName {
    Turn,
    Click,
    Hold,
    Release,
    Restart,
}

impl InputName {
    pub fn as_str(self) -> &'static str {
        match self {
            InputName::Turn => "turn",
            InputName::Click => "click",
            InputName::Hold => "hold",
            InputName::Release => "release",
            InputName::Restart => "restart",
        }
    }
}

impl<'de> Deserialize<'de> for InputName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("turn") {
            Ok(Self::Turn)
        } else if s.eq_ignore_ascii_case("click") {
            Ok(Self::Click)
        } else if s.eq_ignore_ascii_case("hold") {
            Ok(Self::Hold)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else {
            Err(serde::de::Error::custom("unknown input"))
        }
    }
}

impl Serialize for InputName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============== Dial -> Client ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
    /// Accepted but had no effect (e.g. restart while playing)
    #[serde(rename = "ignored")]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    /// Demo running when the client connected
    pub demo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Puzzle state, broadcast to streaming clients after every redraw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub game_over: bool,
    pub seed: u32,
    pub restarts: u32,
    pub board: BoardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActivePieceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ghost_y: Option<i8>,
    pub next: PieceKindLower,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// 0 = empty, 1-7 = piece kind
    pub cells: [[u8; 10]; 20],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePieceSnapshot {
    pub kind: PieceKindLower,
    pub rotation: RotationLower,
    pub x: i8,
    pub y: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

/// One game event, in emission order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub event: EventName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "moved")]
    Moved,
    #[serde(rename = "rotated")]
    Rotated,
    #[serde(rename = "locked")]
    Locked,
    #[serde(rename = "lines_cleared")]
    LinesCleared,
    #[serde(rename = "game_over")]
    GameOver,
    #[serde(rename = "restarted")]
    Restarted,
}

impl From<GameEvent> for EventName {
    fn from(value: GameEvent) -> Self {
        match value {
            GameEvent::Moved => Self::Moved,
            GameEvent::Rotated => Self::Rotated,
            GameEvent::Locked => Self::Locked,
            GameEvent::LinesCleared(_) => Self::LinesCleared,
            GameEvent::GameOver => Self::GameOver,
            GameEvent::Restarted => Self::Restarted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKindLower {
    #[serde(rename = "i")]
    I,
    #[serde(rename = "o")]
    O,
    #[serde(rename = "t")]
    T,
    #[serde(rename = "s")]
    S,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "j")]
    J,
    #[serde(rename = "l")]
    L,
}

impl From<PieceKind> for PieceKindLower {
    fn from(value: PieceKind) -> Self {
        match value {
            PieceKind::I => Self::I,
            PieceKind::O => Self::O,
            PieceKind::T => Self::T,
            PieceKind::S => Self::S,
            PieceKind::Z => Self::Z,
            PieceKind::J => Self::J,
            PieceKind::L => Self::L,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationLower {
    #[serde(rename = "north")]
    North,
    #[serde(rename = "east")]
    East,
    #[serde(rename = "south")]
    South,
    #[serde(rename = "west")]
    West,
}

impl From<Rotation> for RotationLower {
    fn from(value: Rotation) -> Self {
        match value {
            Rotation::North => Self::North,
            Rotation::East => Self::East,
            Rotation::South => Self::South,
            Rotation::West => Self::West,
        }
    }
}

// ============== Parsing ==============

/// Parsed inbound line
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line.
///
/// A well-formed object with an unrecognized `type` is not an error; it comes
/// back as [`ParsedMessage::Unknown`] so the server can answer it.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: envelope.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Pull `"seq": <digits>` out of a line that failed to parse
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Builders ==============

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        stream_observations: true,
    }
}

pub fn create_command(seq: u64, input: InputName, detents: Option<i32>) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        input,
        detents,
    }
}

pub fn create_welcome(seq: u64, client_id: u64, demo: &str) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        demo: demo.to_string(),
    }
}

/// Acknowledge the command with sequence number `seq`
pub fn create_ack(seq: u64, status: AckStatus) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_event(seq: u64, event: GameEvent) -> EventMessage {
    let lines = match event {
        GameEvent::LinesCleared(n) => Some(n),
        _ => None,
    };
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event: EventName::from(event),
        lines,
    }
}

/// Build an observation from a render snapshot
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        game_over: snap.game_over,
        seed: snap.seed,
        restarts: snap.restarts,
        board: BoardSnapshot {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            cells: snap.board,
        },
        active: snap.active.map(|piece| ActivePieceSnapshot {
            kind: PieceKindLower::from(piece.kind),
            rotation: RotationLower::from(piece.rotation),
            x: piece.x,
            y: piece.y,
        }),
        ghost_y: snap.ghost_y,
        next: PieceKindLower::from(snap.next),
        score: snap.score,
        lines: snap.lines,
        level: snap.level,
        drop_ms: snap.drop_interval_ms,
    }
}

pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameSession;

    #[test]
    fn parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":5,"client":{"name":"sound","version":"0.1"},"protocol_version":"1.0.0","stream_observations":true}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "sound");
                assert!(msg.stream_observations);
            }
            other => panic!("expected hello, got {other:?}"),
        }
    }

    #[test]
    fn parse_command_inputs() {
        let json = r#"{"type":"command","seq":2,"ts":5,"input":"Turn","detents":-3}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Command(cmd) => {
                assert_eq!(cmd.input, InputName::Turn);
                assert_eq!(cmd.detents, Some(-3));
            }
            other => panic!("expected command, got {other:?}"),
        }

        let bad = r#"{"type":"command","seq":3,"ts":5,"input":"spin"}"#;
        assert!(parse_message(bad).is_err());
        assert_eq!(extract_seq_best_effort(bad), Some(3));
    }

    #[test]
    fn unknown_type_keeps_seq() {
        let json = r#"{"type":"control","seq":9,"ts":0}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn version_gate_checks_major_only() {
        assert!(is_supported_version("1.0.0"));
        assert!(is_supported_version("1.7"));
        assert!(is_supported_version("1"));
        assert!(!is_supported_version("2.0.0"));
        assert!(!is_supported_version("10.0"));
    }

    #[test]
    fn event_wire_names() {
        let v = serde_json::to_value(create_event(4, GameEvent::LinesCleared(2))).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"], "lines_cleared");
        assert_eq!(v["lines"], 2);

        let v = serde_json::to_value(create_event(5, GameEvent::GameOver)).unwrap();
        assert_eq!(v["event"], "game_over");
        assert!(v.get("lines").is_none());
    }

    #[test]
    fn observation_mirrors_snapshot() {
        let session = GameSession::new(42, 0);
        let snap = session.snapshot();
        let obs = build_observation(&snap, 7);
        assert_eq!(obs.seq, 7);
        assert!(obs.playable);
        assert_eq!(obs.seed, 42);
        assert_eq!(obs.level, 1);
        assert_eq!(obs.drop_ms, 1000);
        assert_eq!(obs.board.width, 10);
        let active = obs.active.as_ref().unwrap();
        assert_eq!(active.x, 3);
        assert_eq!(active.rotation, RotationLower::North);

        let v = serde_json::to_value(&obs).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["board"]["cells"].as_array().unwrap().len(), 20);
    }
}
