//! AI Dungeon Master turn processor.
//!
//! One call to [`DungeonMaster::process_input`] runs a full player
//! turn: log the input, prompt the model with the serialized game
//! state, resolve at most one tool call, split the reply into
//! narrative and state delta, merge the delta, log the narrative.

use std::fmt;

use gemini::{Chat, Content, Gemini, Part, Request};
use serde_json::json;
use thiserror::Error;

use crate::fence;
use crate::state::{GameState, LogEntry};
use crate::tools::{ToolError, ToolRegistry};

/// Errors from the DM agent.
#[derive(Debug, Error)]
pub enum DmError {
    #[error("Gemini API error: {0}")]
    Api(#[from] gemini::Error),
}

/// Configuration for the Dungeon Master.
#[derive(Debug, Clone, Default)]
pub struct DmConfig {
    /// The model to use (defaults to the client's model).
    pub model: Option<String>,

    /// Maximum tokens for responses.
    pub max_output_tokens: Option<usize>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Extra instructions appended to the turn preamble.
    pub custom_preamble: Option<String>,
}

/// A non-fatal problem during a turn, surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnWarning {
    /// The fenced block did not parse or did not fit the state shape;
    /// the merge was skipped.
    MalformedDelta(String),
    /// The model called a tool that is not registered.
    UnknownTool(String),
    /// A registered tool rejected the call.
    ToolFailed { name: String, reason: String },
}

impl fmt::Display for TurnWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnWarning::MalformedDelta(reason) => {
                write!(f, "The DM did not produce a valid state update ({reason})")
            }
            TurnWarning::UnknownTool(name) => write!(f, "The DM called an unknown tool '{name}'"),
            TurnWarning::ToolFailed { name, reason } => {
                write!(f, "Tool '{name}' failed: {reason}")
            }
        }
    }
}

/// The outcome of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The narrative shown to the player (fenced block stripped).
    pub narrative: String,

    /// Whether a state delta was merged; the view should refresh.
    pub state_changed: bool,

    /// Non-fatal problems encountered along the way.
    pub warnings: Vec<TurnWarning>,
}

/// The AI Dungeon Master.
pub struct DungeonMaster {
    chat: Chat,
    tools: ToolRegistry,
    config: DmConfig,
}

impl DungeonMaster {
    /// Create a Dungeon Master chatting through the given client.
    pub fn new(client: &Gemini, config: DmConfig) -> Self {
        let tools = ToolRegistry::with_defaults();

        let mut request = Request::new().with_tools(tools.declarations());
        if let Some(ref model) = config.model {
            request = request.with_model(model);
        }
        if let Some(max) = config.max_output_tokens {
            request = request.with_max_output_tokens(max);
        }
        if let Some(temp) = config.temperature {
            request = request.with_temperature(temp);
        }

        Self {
            chat: client.start_chat(request),
            tools,
            config,
        }
    }

    /// Process a player's action and update the game state.
    ///
    /// On a transport failure the player's log entry is rolled back
    /// before the error propagates, so the turn can be retried from a
    /// clean log.
    pub async fn process_input(
        &mut self,
        input: &str,
        state: &mut GameState,
    ) -> Result<TurnOutcome, DmError> {
        state.game_log.push(LogEntry::player(input));

        let prompt = build_prompt(state, input, self.config.custom_preamble.as_deref());
        let reply = match self.chat.send_message(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                state.game_log.pop();
                return Err(e.into());
            }
        };

        let mut warnings = Vec::new();

        // Only the first part is inspected, and only one round of tool
        // invocation runs per turn.
        let reply = match resolve_tool_call(&self.tools, &reply) {
            ToolRound::NoCall => reply,
            ToolRound::Respond { name, payload } => {
                match self.chat.send_function_response(&name, payload).await {
                    Ok(followup) => followup,
                    Err(e) => {
                        state.game_log.pop();
                        return Err(e.into());
                    }
                }
            }
            ToolRound::Fallback(warning) => {
                warnings.push(warning);
                reply
            }
        };

        let text = first_part_text(&reply);
        let mut outcome = finish_turn(state, text);
        warnings.append(&mut outcome.warnings);
        outcome.warnings = warnings;
        Ok(outcome)
    }
}

/// How a reply's tool call (if any) was resolved.
#[derive(Debug, PartialEq)]
pub(crate) enum ToolRound {
    /// The first part is not a function call; use the reply as-is.
    NoCall,
    /// The tool ran; send this payload back and use the follow-up.
    Respond {
        name: String,
        payload: serde_json::Value,
    },
    /// The call could not be honored; keep the reply, surface the
    /// warning.
    Fallback(TurnWarning),
}

/// Dispatch the reply's first-part function call through the registry.
pub(crate) fn resolve_tool_call(tools: &ToolRegistry, reply: &Content) -> ToolRound {
    let Some(call) = reply.first_part().and_then(Part::as_function_call) else {
        return ToolRound::NoCall;
    };

    match tools.invoke(&call.name, &call.args) {
        Ok(result) => ToolRound::Respond {
            name: call.name.clone(),
            payload: json!({ "result": result }),
        },
        Err(ToolError::Unknown(name)) => {
            tracing::warn!(tool = %name, "Model called an unregistered tool");
            ToolRound::Fallback(TurnWarning::UnknownTool(name))
        }
        Err(e) => {
            tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
            ToolRound::Fallback(TurnWarning::ToolFailed {
                name: call.name.clone(),
                reason: e.to_string(),
            })
        }
    }
}

/// The text of the first response part, or empty if it carries none.
fn first_part_text(content: &Content) -> &str {
    content
        .first_part()
        .and_then(Part::as_text)
        .unwrap_or_default()
}

/// Finish a turn from the model's final reply text: split narrative
/// from the fenced state block, merge the delta, log the narrative.
///
/// Shared between the real agent and the scripted mock DM.
pub(crate) fn finish_turn(state: &mut GameState, text: &str) -> TurnOutcome {
    let extraction = fence::extract_state_block(text);

    let mut warnings = Vec::new();
    let mut state_changed = false;

    if let Some(payload) = extraction.delta {
        match serde_json::from_str::<serde_json::Value>(&payload) {
            Ok(delta) => match state.apply_delta(&delta) {
                Ok(()) => state_changed = true,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping state update");
                    warnings.push(TurnWarning::MalformedDelta(e.to_string()));
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "AI did not produce valid JSON for state update");
                warnings.push(TurnWarning::MalformedDelta(e.to_string()));
            }
        }
    }

    state.game_log.push(LogEntry::dm(&extraction.narrative));

    TurnOutcome {
        narrative: extraction.narrative,
        state_changed,
        warnings,
    }
}

const PREAMBLE: &str = "You are the Dungeon Master. Your goal is to create a compelling story.";

/// Build the per-turn prompt: preamble, serialized game state,
/// verbatim player input, and the reply contract.
pub(crate) fn build_prompt(state: &GameState, input: &str, custom: Option<&str>) -> String {
    let state_json = serde_json::to_string_pretty(state).unwrap_or_default();

    let mut prompt = String::new();
    prompt.push_str(PREAMBLE);
    if let Some(custom) = custom {
        prompt.push('\n');
        prompt.push_str(custom);
    }
    prompt.push_str("\nCurrent Game State: ");
    prompt.push_str(&state_json);
    prompt.push_str("\nThe player's command is: '");
    prompt.push_str(input);
    prompt.push_str("'\n**Your Task:**\n");
    prompt.push_str("1. Describe what happens next.\n");
    prompt.push_str("2. If a dice roll is needed, call the 'roll_dice' tool.\n");
    prompt.push_str(
        "3. After the description, you MUST output a JSON block with any changes to the \
         game state.\n   The JSON block must start with ```json and end with ```.\n",
    );
    prompt
}
