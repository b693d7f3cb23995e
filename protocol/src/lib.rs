use serde::{Deserialize, Serialize};
use std::fmt;

/// ---- Client envelope ----
///
/// Every client request is a `{command, input}` pair. The command picks the
/// move type (`name`, `combine`, `insert`, `remove`, `split`, `undo`,
/// `end`/`done`, `start`, `shuffle`, `deal`); `input` carries the selector
/// tokens for that command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub command: String,
    #[serde(default)]
    pub input: String,
}

impl Event {
    pub fn new(command: impl Into<String>, input: impl Into<String>) -> Self {
        Event {
            command: command.into(),
            input: input.into(),
        }
    }
}

/// ---- Tiles on the wire ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireColor {
    Black,
    Blue,
    Red,
    Green,
}

impl fmt::Display for WireColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireColor::Black => write!(f, "black"),
            WireColor::Blue => write!(f, "blue"),
            WireColor::Red => write!(f, "red"),
            WireColor::Green => write!(f, "green"),
        }
    }
}

/// A piece serializes as `{"joker":true}` or `{"value":N,"color":"red"}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WirePiece {
    Joker { joker: bool },
    Tile { value: u8, color: WireColor },
}

impl WirePiece {
    pub fn joker() -> Self {
        WirePiece::Joker { joker: true }
    }

    pub fn tile(value: u8, color: WireColor) -> Self {
        WirePiece::Tile { value, color }
    }
}

impl fmt::Display for WirePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WirePiece::Joker { .. } => write!(f, "[J]"),
            WirePiece::Tile { value, color } => write!(f, "[{} {}]", value, color),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireSet {
    pub pieces: Vec<WirePiece>,
}

/// Whole-board snapshot pushed after every mutation. `piece` holds the loose
/// pieces sitting on the board outside any set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Vec<WireSet>,
    pub piece: Vec<WirePiece>,
}

/// Per-player private snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RackSnapshot {
    pub rack: Vec<WirePiece>,
}

/// ---- Server-to-client frames ----
///
/// Snapshots go out as their documented JSON shapes; notices are plain text
/// lines so the dumbest possible client can still show them.
#[derive(Debug, Clone)]
pub enum Outbound {
    Game(GameSnapshot),
    Rack(RackSnapshot),
    Notice(String),
}

impl Outbound {
    pub fn into_text(self) -> String {
        match self {
            // These shapes cannot fail to serialize.
            Outbound::Game(snapshot) => serde_json::to_string(&snapshot).unwrap(),
            Outbound::Rack(snapshot) => serde_json::to_string(&snapshot).unwrap(),
            Outbound::Notice(message) => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_wire_shapes() {
        let joker = serde_json::to_string(&WirePiece::joker()).unwrap();
        assert_eq!(joker, r#"{"joker":true}"#);

        let tile = serde_json::to_string(&WirePiece::tile(7, WireColor::Red)).unwrap();
        assert_eq!(tile, r#"{"value":7,"color":"red"}"#);
    }

    #[test]
    fn piece_wire_roundtrip() {
        let parsed: WirePiece = serde_json::from_str(r#"{"joker":true}"#).unwrap();
        assert_eq!(parsed, WirePiece::joker());

        let parsed: WirePiece = serde_json::from_str(r#"{"value":13,"color":"black"}"#).unwrap();
        assert_eq!(parsed, WirePiece::tile(13, WireColor::Black));
    }

    #[test]
    fn event_envelope() {
        let event: Event = serde_json::from_str(r#"{"command":"insert","input":"0 r2 3"}"#).unwrap();
        assert_eq!(event, Event::new("insert", "0 r2 3"));

        // `input` is optional for argument-less commands.
        let event: Event = serde_json::from_str(r#"{"command":"undo"}"#).unwrap();
        assert_eq!(event, Event::new("undo", ""));
    }

    #[test]
    fn game_snapshot_shape() {
        let snapshot = GameSnapshot {
            board: vec![WireSet {
                pieces: vec![
                    WirePiece::tile(4, WireColor::Red),
                    WirePiece::tile(5, WireColor::Red),
                    WirePiece::tile(6, WireColor::Red),
                ],
            }],
            piece: vec![WirePiece::joker()],
        };
        let text = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            text,
            r#"{"board":[{"pieces":[{"value":4,"color":"red"},{"value":5,"color":"red"},{"value":6,"color":"red"}]}],"piece":[{"joker":true}]}"#
        );
    }

    #[test]
    fn rack_snapshot_shape() {
        let snapshot = RackSnapshot {
            rack: vec![WirePiece::tile(1, WireColor::Blue)],
        };
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"rack":[{"value":1,"color":"blue"}]}"#
        );
    }
}
