//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for Gemini's `generateContent`
//! API with:
//! - Non-streaming completions
//! - Function calling (tool use) support
//! - A stateful [`Chat`] handle that carries conversation history

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Model returned no candidates")]
    EmptyResponse,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Start a conversation using this client.
    pub fn start_chat(&self, request: Request) -> Chat {
        Chat {
            client: self.clone(),
            request,
            history: Vec::new(),
        }
    }

    /// Send a completion request and return the model's reply content.
    pub async fn complete(
        &self,
        request: &Request,
        contents: &[Content],
    ) -> Result<Content, Error> {
        let api_request = build_api_request(request, contents);
        let headers = self.build_headers()?;

        let model = request.model.as_deref().unwrap_or(&self.model);
        let response = self
            .client
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content)
            .ok_or(Error::EmptyResponse)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// Per-conversation settings sent with every request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub model: Option<String>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<usize>,
    pub tools: Vec<FunctionDeclaration>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<FunctionDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A message in the conversation: a role plus an ordered list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create a user message carrying a tagged function response.
    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::FunctionResponse(FunctionResponse {
                name: name.into(),
                response,
            })],
        }
    }

    /// The first part of this content, if any.
    pub fn first_part(&self) -> Option<&Part> {
        self.parts.first()
    }

    /// All text parts concatenated.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.as_text())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One part of a message. Gemini parts carry exactly one payload kind,
/// which maps onto an externally tagged enum on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    /// Extract text from a Text part.
    pub fn as_text(&self) -> Option<&str> {
        if let Part::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }

    /// Extract the function call from a FunctionCall part.
    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        if let Part::FunctionCall(call) = self {
            Some(call)
        } else {
            None
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A function result sent back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// A callable tool advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A stateful conversation handle.
///
/// Owns the accumulated history; every send transmits the full history
/// and appends the model's reply to it.
pub struct Chat {
    client: Gemini,
    request: Request,
    history: Vec<Content>,
}

impl Chat {
    /// Send a text message and return the model's reply content.
    pub async fn send_message(&mut self, text: impl Into<String>) -> Result<Content, Error> {
        self.send(Content::user(text)).await
    }

    /// Send a tagged function-response payload as a follow-up message.
    pub async fn send_function_response(
        &mut self,
        name: impl Into<String>,
        response: serde_json::Value,
    ) -> Result<Content, Error> {
        self.send(Content::function_response(name, response)).await
    }

    async fn send(&mut self, content: Content) -> Result<Content, Error> {
        self.history.push(content);
        match self.client.complete(&self.request, &self.history).await {
            Ok(reply) => {
                self.history.push(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                // Keep history consistent with what the model has seen.
                self.history.pop();
                Err(e)
            }
        }
    }

    /// The conversation history so far.
    pub fn history(&self) -> &[Content] {
        &self.history
    }
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiTextPart>,
}

#[derive(Debug, Serialize)]
struct ApiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: Content,
}

fn build_api_request<'a>(request: &Request, contents: &'a [Content]) -> ApiRequest<'a> {
    let system_instruction = request.system.as_ref().map(|text| ApiSystemInstruction {
        parts: vec![ApiTextPart { text: text.clone() }],
    });

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(vec![ApiTool {
            function_declarations: request.tools.clone(),
        }])
    };

    let generation_config = if request.temperature.is_some() || request.max_output_tokens.is_some()
    {
        Some(ApiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        })
    } else {
        None
    };

    ApiRequest {
        contents,
        system_instruction,
        tools,
        generation_config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key");
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_with_model() {
        let client = Gemini::new("test-key").with_model("gemini-1.5-pro");
        assert_eq!(client.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new()
            .with_system("You are the Dungeon Master")
            .with_temperature(0.8)
            .with_max_output_tokens(1024);

        assert!(request.system.is_some());
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.max_output_tokens, Some(1024));
    }

    #[test]
    fn test_part_serialization_shapes() {
        let text = serde_json::to_value(Part::Text("hello".into())).unwrap();
        assert_eq!(text, json!({"text": "hello"}));

        let call = serde_json::to_value(Part::FunctionCall(FunctionCall {
            name: "roll_dice".into(),
            args: json!({"sides": 20}),
        }))
        .unwrap();
        assert_eq!(
            call,
            json!({"functionCall": {"name": "roll_dice", "args": {"sides": 20}}})
        );

        let resp = serde_json::to_value(Part::FunctionResponse(FunctionResponse {
            name: "roll_dice".into(),
            response: json!({"result": "The die lands on: 17."}),
        }))
        .unwrap();
        assert_eq!(
            resp,
            json!({"functionResponse": {
                "name": "roll_dice",
                "response": {"result": "The die lands on: 17."}
            }})
        );
    }

    #[test]
    fn test_part_deserialization() {
        let part: Part =
            serde_json::from_value(json!({"functionCall": {"name": "roll_dice", "args": {"sides": 6.0, "count": 2.0}}}))
                .unwrap();
        let call = part.as_function_call().unwrap();
        assert_eq!(call.name, "roll_dice");
        assert_eq!(call.args["count"], json!(2.0));
    }

    #[test]
    fn test_content_helpers() {
        let content = Content::user("I attack the shadow");
        assert_eq!(content.role, Role::User);
        assert_eq!(content.text(), "I attack the shadow");
        assert!(content.first_part().unwrap().as_function_call().is_none());
    }

    #[test]
    fn test_api_request_omits_empty_sections() {
        let request = Request::new();
        let contents = vec![Content::user("hi")];
        let api = build_api_request(&request, &contents);
        let value = serde_json::to_value(&api).unwrap();

        assert!(value.get("tools").is_none());
        assert!(value.get("generationConfig").is_none());
        assert!(value.get("systemInstruction").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[test]
    fn test_api_request_with_tools() {
        let request = Request::new().with_tools(vec![FunctionDeclaration {
            name: "roll_dice".into(),
            description: "Roll some dice".into(),
            parameters: json!({"type": "object"}),
        }]);
        let contents = vec![Content::user("hi")];
        let api = build_api_request(&request, &contents);
        let value = serde_json::to_value(&api).unwrap();

        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["name"],
            "roll_dice"
        );
    }
}
