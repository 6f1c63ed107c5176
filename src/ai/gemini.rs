//! Google Gemini client - `generateContent` with a JSON response schema

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::{
    PLAN_PROMPT, PlanGenerator, exercise_schema, parse_exercise, parse_plan, plan_schema,
    replacement_prompt,
};
use crate::error::AiError;
use crate::plan::{Exercise, WeeklyPlan};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The key travels in a header so it never ends up in a URL
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    api_base: String,
    client: Client,
}

impl GeminiClient {
    /// A missing key is only reported when a request is made, so a cached
    /// plan stays usable without one.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Send `prompt` and return the raw JSON text of the first candidate
    async fn generate_json(&self, prompt: String, schema: Value) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey(API_KEY_ENV))?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        debug!(model = %self.model, "Sending generateContent request");
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(map_api_error(status.as_u16(), &body));
        }

        extract_text(&body)
    }
}

fn network_error(err: reqwest::Error) -> AiError {
    AiError::Network(err.without_url())
}

/// Prefer the service's own message over the raw body
fn map_api_error(status: u16, body: &str) -> AiError {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_string(), |e| e.message);
    AiError::Api { status, message }
}

fn extract_text(body: &str) -> Result<String, AiError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(AiError::Api { status: 200, message: error.message });
    }

    response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .filter(|t| !t.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

#[async_trait]
impl PlanGenerator for GeminiClient {
    async fn generate_plan(&self) -> Result<WeeklyPlan, AiError> {
        let text = self.generate_json(PLAN_PROMPT.to_string(), plan_schema()).await?;
        parse_plan(&text)
    }

    async fn replace_exercise(
        &self,
        current_name: &str,
        day_focus: &str,
    ) -> Result<Exercise, AiError> {
        let text = self
            .generate_json(replacement_prompt(current_name, day_focus), exercise_schema())
            .await?;
        parse_exercise(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionError;

    #[test]
    fn test_extract_text() {
        let body =
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"days\":[]}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"days":[]}"#);
    }

    #[test]
    fn test_extract_text_empty() {
        assert!(matches!(extract_text(r#"{"candidates":[]}"#), Err(AiError::EmptyResponse)));
        assert!(matches!(
            extract_text(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#),
            Err(AiError::EmptyResponse)
        ));
    }

    #[test]
    fn test_map_api_error() {
        let err = map_api_error(400, r#"{"error":{"code":400,"message":"API key not valid"}}"#);
        assert!(matches!(
            err,
            AiError::Api { status: 400, ref message } if message == "API key not valid"
        ));

        let err = map_api_error(502, "Bad Gateway");
        assert!(matches!(
            err,
            AiError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some("hi".to_string()) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: exercise_schema(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_url_and_builders() {
        let client = GeminiClient::new(Some("k".to_string()))
            .with_model("gemini-2.0-flash")
            .with_api_base("http://localhost:8080/v1beta/");
        assert_eq!(
            client.url(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_network_error_does_not_expose_key() {
        // nothing listens on port 1
        let client = GeminiClient::new(Some("SECRETKEY123".to_string()))
            .with_api_base("http://127.0.0.1:1/v1beta");
        let err = client.generate_plan().await.unwrap_err();
        assert!(matches!(err, AiError::Network(_)));

        let shown = AcquisitionError::from(err).to_string();
        assert!(!shown.contains("SECRETKEY123"), "key leaked: {shown}");
        assert!(!shown.contains("127.0.0.1"), "url leaked: {shown}");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = GeminiClient::new(Some("   ".to_string()));
        let err = client.generate_plan().await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey(API_KEY_ENV)));
    }
}
