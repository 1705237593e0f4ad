//! Testing utilities for the game engine.
//!
//! - `MockDm` for deterministic testing without API calls
//! - `TestHarness` for scripted turn scenarios
//! - Assertion helpers for verifying game state

use gemini::{Content, FunctionCall, Part, Role};
use serde_json::Value;

use crate::dm::{self, ToolRound, TurnOutcome};
use crate::state::{GameState, LogEntry};
use crate::tools::ToolRegistry;

/// One scripted model reply.
#[derive(Clone)]
enum ScriptedReply {
    /// Raw model text, fenced JSON block and all.
    Text(String),
    /// A function-call first part, plus the follow-up text the model
    /// "sends" after receiving the tool result.
    ToolCall {
        name: String,
        args: Value,
        followup: String,
    },
}

/// A mock DM that replays scripted model replies.
///
/// Replies run through the real turn machinery: tool calls dispatch
/// through the registry, and reply text goes through the full
/// narrative/delta processing path.
pub struct MockDm {
    /// Scripted replies to return in order.
    replies: Vec<ScriptedReply>,
    /// Index of next reply to return.
    reply_index: usize,
    /// The same registry the real DM dispatches through.
    tools: ToolRegistry,
    /// Payload from the most recent tool dispatch.
    last_tool_response: Option<Value>,
}

impl MockDm {
    /// Create a new mock DM with no scripted replies.
    pub fn new() -> Self {
        Self {
            replies: Vec::new(),
            reply_index: 0,
            tools: ToolRegistry::with_defaults(),
            last_tool_response: None,
        }
    }

    /// Process input and finish the turn with the next scripted reply.
    pub fn process_input(&mut self, input: &str, state: &mut GameState) -> TurnOutcome {
        state.game_log.push(LogEntry::player(input));

        if self.reply_index >= self.replies.len() {
            return dm::finish_turn(state, "The DM has no more scripted replies.");
        }
        let reply = self.replies[self.reply_index].clone();
        self.reply_index += 1;

        match reply {
            ScriptedReply::Text(text) => dm::finish_turn(state, &text),
            ScriptedReply::ToolCall {
                name,
                args,
                followup,
            } => {
                let call_reply = Content {
                    role: Role::Model,
                    parts: vec![Part::FunctionCall(FunctionCall { name, args })],
                };

                match dm::resolve_tool_call(&self.tools, &call_reply) {
                    ToolRound::Respond { payload, .. } => {
                        self.last_tool_response = Some(payload);
                        dm::finish_turn(state, &followup)
                    }
                    ToolRound::Fallback(warning) => {
                        // The un-augmented reply carries no text part.
                        let mut outcome = dm::finish_turn(state, "");
                        outcome.warnings.insert(0, warning);
                        outcome
                    }
                    ToolRound::NoCall => dm::finish_turn(state, ""),
                }
            }
        }
    }

    /// Add a raw text reply to the queue.
    pub fn queue_reply(&mut self, reply: impl Into<String>) {
        self.replies.push(ScriptedReply::Text(reply.into()));
    }

    /// Add a tool-calling reply to the queue.
    pub fn queue_tool_call(
        &mut self,
        name: impl Into<String>,
        args: Value,
        followup: impl Into<String>,
    ) {
        self.replies.push(ScriptedReply::ToolCall {
            name: name.into(),
            args,
            followup: followup.into(),
        });
    }

    /// The payload the most recent tool dispatch produced.
    pub fn last_tool_response(&self) -> Option<&Value> {
        self.last_tool_response.as_ref()
    }

    /// Reset the reply index to replay from the beginning.
    pub fn reset(&mut self) {
        self.reply_index = 0;
    }
}

impl Default for MockDm {
    fn default() -> Self {
        Self::new()
    }
}

/// Test harness for running scripted game scenarios.
pub struct TestHarness {
    /// The mock DM.
    pub dm: MockDm,
    /// The game state.
    pub state: GameState,
}

impl TestHarness {
    /// Create a harness with the opening game state.
    pub fn new() -> Self {
        Self {
            dm: MockDm::new(),
            state: GameState::new(),
        }
    }

    /// Queue a raw model reply.
    pub fn expect_reply(&mut self, reply: impl Into<String>) -> &mut Self {
        self.dm.queue_reply(reply);
        self
    }

    /// Queue a tool-calling reply with its follow-up text.
    pub fn expect_tool_call(
        &mut self,
        name: impl Into<String>,
        args: Value,
        followup: impl Into<String>,
    ) -> &mut Self {
        self.dm.queue_tool_call(name, args, followup);
        self
    }

    /// Send player input and get the turn outcome.
    pub fn input(&mut self, text: &str) -> TurnOutcome {
        self.dm.process_input(text, &mut self.state)
    }

    /// Current player HP as (current, max).
    pub fn player_hp(&self) -> (i64, i64) {
        (self.state.player.hp, self.state.player.max_hp)
    }

    /// The last log entry's content.
    pub fn last_log(&self) -> Option<&str> {
        self.state.game_log.last().map(|e| e.content.as_str())
    }

    /// Number of log entries.
    pub fn log_len(&self) -> usize {
        self.state.game_log.len()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, current: i64, max: i64) {
    let (actual_current, actual_max) = harness.player_hp();
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert the player's inventory matches exactly.
#[track_caller]
pub fn assert_inventory(harness: &TestHarness, items: &[&str]) {
    let actual: Vec<&str> = harness
        .state
        .player
        .inventory
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        actual, items,
        "Expected inventory {items:?}, got {actual:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LogRole;
    use serde_json::json;

    #[test]
    fn test_mock_dm_basic() {
        let mut harness = TestHarness::new();
        harness.expect_reply("You stand in a dusty cavern.");

        let outcome = harness.input("I look around");

        assert_eq!(outcome.narrative, "You stand in a dusty cavern.");
        assert!(!outcome.state_changed);
    }

    #[test]
    fn test_mock_dm_applies_delta() {
        let mut harness = TestHarness::new();
        harness.expect_reply("A rock falls on you!\n```json\n{\"player\": {\"hp\": 14}}\n```");

        let outcome = harness.input("I walk under the ledge");

        assert!(outcome.state_changed);
        assert_hp(&harness, 14, 20);
    }

    #[test]
    fn test_mock_dm_logs_player_then_dm() {
        let mut harness = TestHarness::new();
        harness.expect_reply("Noted.");

        let before = harness.log_len();
        harness.input("I wait");

        assert_eq!(harness.log_len(), before + 2);
        let log = &harness.state.game_log;
        assert_eq!(log[log.len() - 2].role, LogRole::Player);
        assert_eq!(log[log.len() - 2].content, "I wait");
        assert_eq!(log[log.len() - 1].role, LogRole::Dm);
    }

    #[test]
    fn test_mock_dm_default_after_script_runs_out() {
        let mut harness = TestHarness::new();
        let outcome = harness.input("anything");
        assert!(outcome.narrative.contains("no more scripted"));
    }

    #[test]
    fn test_mock_dm_dispatches_tool_calls() {
        let mut harness = TestHarness::new();
        harness.expect_tool_call("roll_dice", json!({"sides": 1}), "A sure thing.");

        let outcome = harness.input("I try my luck");

        assert_eq!(outcome.narrative, "A sure thing.");
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            harness.dm.last_tool_response().unwrap()["result"],
            "The die lands on: 1."
        );
    }
}
