//! Typed messages carried by the transport protocol.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Position};

/// Serde plumbing for `BTreeMap<usize, _>` fields carried inside the
/// internally tagged [`Message`] enum.
///
/// serde_json's direct deserializer parses integer map keys from JSON
/// strings, but an internally tagged enum buffers its content first and
/// that buffer loses the special key handling, so a `usize`-keyed map fails
/// to round-trip. This module serializes exactly as the default impl does
/// (a JSON object with string keys) and deserializes the keys back through
/// `String`, leaving the wire format byte-for-byte identical.
mod usize_key_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    pub fn serialize<S, V>(map: &BTreeMap<usize, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<usize, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let string_keyed = BTreeMap::<String, V>::deserialize(deserializer)?;
        string_keyed
            .into_iter()
            .map(|(key, value)| {
                key.parse::<usize>()
                    .map(|key| (key, value))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// Envelope for every message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Episode handshake, sent once before any state message.
    GameStart(GameStartMessage),
    /// Perceived state for one decision step.
    State(StateMessage),
    /// Handshake acknowledgement; contents are opaque to the proxy.
    Ack(AckMessage),
    /// Chosen primitive action for the step that sent the state.
    Action(ActionReply),
}

impl Message {
    /// Message kind name, for protocol error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GameStart(_) => "game_start",
            Message::State(_) => "state",
            Message::Ack(_) => "ack",
            Message::Action(_) => "action",
        }
    }
}

/// Establishes the coordinate frame for an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartMessage {
    pub agent_id: usize,
    pub map_width: i32,
    pub map_height: i32,
}

/// One step's perceived state.
///
/// Positions are stored in `(row, column)` board coordinates, already
/// axis-swapped relative to the environment's native `(x, y)`. Hunter
/// entries in `agent_positions` carry the configured observation noise;
/// the hunted agent's entry never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub agent_id: usize,
    /// One entry per live agent; index 0 is the hunted agent.
    #[serde(with = "usize_key_map")]
    pub agent_positions: BTreeMap<usize, Position>,
    pub food_positions: BTreeSet<Position>,
    /// 1.0 while an agent's scared timer is running, else 0.0.
    /// Keys match `agent_positions`.
    #[serde(with = "usize_key_map")]
    pub fragile_agents: BTreeMap<usize, f64>,
    pub wall_positions: BTreeSet<Position>,
    pub legal_actions: Vec<Direction>,
    /// Score delta attributed to the transition into this state.
    pub reward: f64,
    /// The action actually applied last step.
    pub executed_action: Direction,
    pub test_mode: bool,
}

/// Handshake acknowledgement. Receipt is all that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AckMessage {}

/// Reply to a [`StateMessage`].
///
/// The action may be any direction; the receiving proxy is responsible for
/// substituting a fallback when it is illegal for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    pub action: Direction,
}
