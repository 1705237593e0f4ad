//! Tools the AI Dungeon Master can invoke.
//!
//! Tool dispatch goes through an explicit registry populated at
//! startup; an unrecognized name is a typed, recoverable error rather
//! than a crashed turn.

use std::collections::HashMap;

use gemini::FunctionDeclaration;
use serde_json::{json, Value};
use thiserror::Error;

use crate::dice;

/// Errors from tool dispatch.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    Unknown(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool {tool} failed: {reason}")]
    Failed { tool: String, reason: String },
}

type ToolHandler = fn(&Value) -> Result<String, ToolError>;

/// Registry mapping tool names to local handlers.
pub struct ToolRegistry {
    handlers: HashMap<String, ToolHandler>,
    declarations: Vec<FunctionDeclaration>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            declarations: Vec::new(),
        }
    }

    /// The registry with the standard game tools registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(roll_dice_declaration(), run_roll_dice);
        registry
    }

    /// Register a tool under the name in its declaration.
    pub fn register(&mut self, declaration: FunctionDeclaration, handler: ToolHandler) {
        self.handlers.insert(declaration.name.clone(), handler);
        self.declarations.push(declaration);
    }

    /// Tool declarations to advertise to the model.
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.declarations.clone()
    }

    /// Invoke a tool by name with the model-supplied arguments.
    pub fn invoke(&self, name: &str, args: &Value) -> Result<String, ToolError> {
        tracing::debug!(tool = name, "Dispatching tool call");
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;
        handler(args)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn roll_dice_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "roll_dice".to_string(),
        description: "Roll a number of dice with a given number of sides. Use this for \
            skill checks, attacks, or any moment where chance should decide the outcome."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "sides": {
                    "type": "integer",
                    "description": "Number of sides per die (e.g. 20 for a d20)"
                },
                "count": {
                    "type": "integer",
                    "description": "Number of dice to roll (default 1)"
                }
            },
            "required": ["sides"]
        }),
    }
}

fn run_roll_dice(args: &Value) -> Result<String, ToolError> {
    let sides = int_arg(args, "sides", "roll_dice")?.ok_or_else(|| ToolError::InvalidArguments {
        tool: "roll_dice".to_string(),
        reason: "missing required argument 'sides'".to_string(),
    })?;
    let count = int_arg(args, "count", "roll_dice")?.unwrap_or(1);

    dice::roll_dice(sides, count).map_err(|e| ToolError::Failed {
        tool: "roll_dice".to_string(),
        reason: e.to_string(),
    })
}

/// Pluck an integer argument. The model may send integers as floats
/// (20.0 for 20), so both forms are accepted.
fn int_arg(args: &Value, key: &str, tool: &str) -> Result<Option<i64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArguments {
                tool: tool.to_string(),
                reason: format!("'{key}' must be a number, got {value}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_advertises_roll_dice() {
        let registry = ToolRegistry::with_defaults();
        let declarations = registry.declarations();

        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "roll_dice");
        assert_eq!(declarations[0].parameters["required"][0], "sides");
    }

    #[test]
    fn test_invoke_roll_dice() {
        let registry = ToolRegistry::with_defaults();
        let result = registry
            .invoke("roll_dice", &json!({"sides": 20, "count": 1}))
            .unwrap();
        assert!(result.starts_with("The die lands on: "));
    }

    #[test]
    fn test_invoke_coerces_float_arguments() {
        let registry = ToolRegistry::with_defaults();
        let result = registry
            .invoke("roll_dice", &json!({"sides": 20.0, "count": 1.0}))
            .unwrap();
        assert!(result.starts_with("The die lands on: "));
    }

    #[test]
    fn test_count_defaults_to_one() {
        let registry = ToolRegistry::with_defaults();
        let result = registry.invoke("roll_dice", &json!({"sides": 6})).unwrap();
        assert!(result.starts_with("The die lands on: "));
    }

    #[test]
    fn test_unknown_tool_is_typed_error() {
        let registry = ToolRegistry::with_defaults();
        let err = registry.invoke("summon_dragon", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::Unknown(name) if name == "summon_dragon"));
    }

    #[test]
    fn test_missing_sides_is_invalid_arguments() {
        let registry = ToolRegistry::with_defaults();
        let err = registry.invoke("roll_dice", &json!({"count": 2})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_non_numeric_sides_is_invalid_arguments() {
        let registry = ToolRegistry::with_defaults();
        let err = registry
            .invoke("roll_dice", &json!({"sides": "twenty"}))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_out_of_range_sides_is_tool_failure() {
        let registry = ToolRegistry::with_defaults();
        let err = registry.invoke("roll_dice", &json!({"sides": 0})).unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));
    }
}
