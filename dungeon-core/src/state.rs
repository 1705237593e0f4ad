//! The mutable game state and the delta-merge protocol.
//!
//! The state lives for one play session: created from a fixed opening
//! template, mutated in place as the model emits deltas, gone when the
//! process exits.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::merge::deep_merge;

/// Error applying a state delta.
#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("State delta is not a JSON object")]
    NotAnObject,

    #[error("State delta does not fit the game state shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// The full game state: player, location, and chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    pub current_location: Location,
    pub game_log: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hp: i64,
    pub max_hp: i64,
    pub attack_power: i64,
    pub inventory: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub description: String,
    pub npcs: Vec<Npc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Who spoke a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    Player,
    Dm,
}

/// One chat-log line. Append-only, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub role: LogRole,
    pub content: String,
}

impl LogEntry {
    pub fn player(content: impl Into<String>) -> Self {
        Self {
            role: LogRole::Player,
            content: content.into(),
        }
    }

    pub fn dm(content: impl Into<String>) -> Self {
        Self {
            role: LogRole::Dm,
            content: content.into(),
        }
    }
}

impl GameState {
    /// The fixed opening template a new session starts from.
    pub fn new() -> Self {
        Self {
            player: Player {
                name: "Kaelan".to_string(),
                hp: 20,
                max_hp: 20,
                attack_power: 5,
                inventory: vec!["a rusty sword".to_string(), "a healing potion".to_string()],
            },
            current_location: Location {
                name: "The Whispering Cavern".to_string(),
                description: "You find yourself in a dimly lit cavern. The air is damp, \
                    and a faint, eerie whisper seems to echo from the deeper shadows. A \
                    single, narrow passage leads further into the darkness."
                    .to_string(),
                npcs: Vec::new(),
            },
            game_log: vec![LogEntry::dm("Your adventure begins.")],
        }
    }

    /// Merge a state delta into this state.
    ///
    /// The delta is merged over the serialized state tree with
    /// [`deep_merge`] semantics, `player.hp` is clamped into
    /// `[0, max_hp]`, and the result is re-materialized as a typed
    /// state. On any failure the state is left untouched.
    pub fn apply_delta(&mut self, delta: &Value) -> Result<(), DeltaError> {
        if !delta.is_object() {
            return Err(DeltaError::NotAnObject);
        }

        let mut tree = serde_json::to_value(&*self)?;
        deep_merge(&mut tree, delta);
        clamp_hp(&mut tree);

        *self = serde_json::from_value(tree)?;
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep `player.hp` within `[0, max_hp]` after a merge.
fn clamp_hp(tree: &mut Value) {
    let Some(player) = tree.get_mut("player") else {
        return;
    };
    let (Some(hp), Some(max_hp)) = (
        player.get("hp").and_then(Value::as_i64),
        player.get("max_hp").and_then(Value::as_i64),
    ) else {
        return;
    };

    let clamped = hp.clamp(0, max_hp.max(0));
    if clamped != hp {
        tracing::debug!("Clamping hp {hp} into [0, {max_hp}]");
        player["hp"] = clamped.into();
    }
}
