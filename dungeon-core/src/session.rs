//! GameSession - the primary public API for playing.
//!
//! Wraps the Dungeon Master and the game state into a single
//! easy-to-use facade for front ends. State lives in memory for the
//! life of the session; there is no save/load.

use gemini::Gemini;
use thiserror::Error;

use crate::dm::{DmConfig, DmError, DungeonMaster, TurnOutcome};
use crate::state::{GameState, LogEntry};

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("DM error: {0}")]
    Dm(#[from] DmError),

    #[error("No API key configured - set GEMINI_API_KEY environment variable")]
    NoApiKey,
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Model to use for the DM.
    pub model: Option<String>,

    /// Maximum tokens for DM responses.
    pub max_output_tokens: Option<usize>,

    /// Temperature for DM generation.
    pub temperature: Option<f32>,

    /// Extra instructions appended to the DM preamble.
    pub custom_preamble: Option<String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens for responses.
    pub fn with_max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Set temperature for generation.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Append extra instructions to the DM preamble.
    pub fn with_custom_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.custom_preamble = Some(preamble.into());
        self
    }
}

/// One running game: the AI Dungeon Master plus the game state.
pub struct GameSession {
    dm: DungeonMaster,
    state: GameState,
}

impl GameSession {
    /// Create a new game session.
    ///
    /// Requires the `GEMINI_API_KEY` environment variable to be set.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let client = Gemini::from_env().map_err(|_| SessionError::NoApiKey)?;

        let dm_config = DmConfig {
            model: config.model,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            custom_preamble: config.custom_preamble,
        };
        let dm = DungeonMaster::new(&client, dm_config);

        let mut state = GameState::new();
        // Open with the scene description, as the very first DM line.
        let opening = state.current_location.description.clone();
        state.game_log.push(LogEntry::dm(opening));

        Ok(Self { dm, state })
    }

    /// Process a player action and get the turn outcome.
    ///
    /// This is the main gameplay loop entry point.
    pub async fn player_action(&mut self, input: &str) -> Result<TurnOutcome, SessionError> {
        Ok(self.dm.process_input(input, &mut self.state).await?)
    }

    /// The full game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The player character's name.
    pub fn player_name(&self) -> &str {
        &self.state.player.name
    }

    /// Current HP as (current, max).
    pub fn hp_status(&self) -> (i64, i64) {
        (self.state.player.hp, self.state.player.max_hp)
    }

    /// The player's attack power.
    pub fn attack_power(&self) -> i64 {
        self.state.player.attack_power
    }

    /// The player's inventory.
    pub fn inventory(&self) -> &[String] {
        &self.state.player.inventory
    }

    /// The current location name.
    pub fn location_name(&self) -> &str {
        &self.state.current_location.name
    }

    /// The chat log, oldest first.
    pub fn game_log(&self) -> &[LogEntry] {
        &self.state.game_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::new()
            .with_model("gemini-1.5-pro")
            .with_max_output_tokens(2048)
            .with_temperature(0.7)
            .with_custom_preamble("Be brief.");

        assert_eq!(config.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.max_output_tokens, Some(2048));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.custom_preamble.as_deref(), Some("Be brief."));
    }
}
