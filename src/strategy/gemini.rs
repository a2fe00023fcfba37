//! Gemini client for AI-assisted strategy generation
//!
//! Calls the `generateContent` REST endpoint with a JSON response schema
//! constraining the answer to `{name, description, riskLevel}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StrategyProviderConfig;
use crate::domain::{RiskLevel, Strategy};
use crate::error::{Result, SimError};
use crate::validation;

use super::provider::StrategyProvider;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
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
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Shape the model is asked to answer with
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrategyPayload {
    name: Option<String>,
    description: Option<String>,
    risk_level: Option<String>,
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "The name of the strategy." },
            "description": { "type": "STRING", "description": "A one-sentence description." },
            "riskLevel": {
                "type": "STRING",
                "description": "The assessed risk level.",
                "enum": ["Low", "Medium", "High"]
            }
        },
        "required": ["name", "description", "riskLevel"]
    })
}

fn prompt_for(goal: &str) -> String {
    format!(
        "Based on the user's investment goal of \"{}\", generate a creative and \
         professional-sounding trading strategy. Provide a name, a concise one-sentence \
         description, and assess its risk level as 'Low', 'Medium', or 'High'.",
        goal
    )
}

/// Build a `Strategy` from the model's JSON text; any missing field fails
fn parse_strategy(text: &str) -> Result<Strategy> {
    let payload: StrategyPayload = serde_json::from_str(text.trim())
        .map_err(|e| SimError::Generation(format!("malformed strategy JSON: {}", e)))?;

    let non_empty = |field: Option<String>, label: &str| {
        field
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SimError::Generation(format!("response missing {}", label)))
    };

    let name = non_empty(payload.name, "name")?;
    let description = non_empty(payload.description, "description")?;
    let risk_level: RiskLevel = non_empty(payload.risk_level, "riskLevel")?
        .parse()
        .map_err(|e: SimError| SimError::Generation(e.to_string()))?;

    Ok(Strategy::generated(name, description, risk_level))
}

/// Strategy provider backed by the Gemini API
pub struct GeminiStrategyProvider {
    config: StrategyProviderConfig,
    http: Client,
}

impl GeminiStrategyProvider {
    pub fn new(config: StrategyProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SimError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn request(&self, goal: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt_for(goal)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        debug!(model = %self.config.model, "sending strategy request to Gemini");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini API error: {}", body);
            return Err(SimError::Generation(format!("Gemini API error: {}", status)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SimError::Generation(format!("Failed to parse Gemini response: {}", e)))?;

        body.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| SimError::Generation("Gemini returned no text".into()))
    }
}

#[async_trait]
impl StrategyProvider for GeminiStrategyProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_strategy(&self, goal: &str) -> Result<Strategy> {
        validation::validate_goal(goal)?;
        if !self.is_configured() {
            return Err(SimError::Generation("Gemini API key not configured".into()));
        }

        let result = match self.request(goal.trim()).await {
            Ok(text) => parse_strategy(&text),
            Err(SimError::Http(e)) => Err(SimError::Generation(format!("Gemini unreachable: {}", e))),
            Err(e) => Err(e),
        };

        match &result {
            Ok(strategy) => debug!(name = %strategy.name, risk = %strategy.risk_level, "strategy generated"),
            Err(e) => warn!(error = %e, "Could not generate strategy from AI"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_payload() {
        let strategy = parse_strategy(
            r#"{"name":"Steady Harvest","description":"Collects small gains.","riskLevel":"Low"}"#,
        )
        .unwrap();
        assert_eq!(strategy.name, "Steady Harvest");
        assert_eq!(strategy.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_parse_rejects_incomplete_payload() {
        let missing = parse_strategy(r#"{"name":"Half","riskLevel":"High"}"#).unwrap_err();
        assert!(matches!(missing, SimError::Generation(_)));

        let blank = parse_strategy(r#"{"name":" ","description":"d","riskLevel":"High"}"#);
        assert!(blank.is_err());

        let bad_risk = parse_strategy(r#"{"name":"n","description":"d","riskLevel":"Extreme"}"#);
        assert!(matches!(bad_risk, Err(SimError::Generation(_))));

        assert!(parse_strategy("not json").is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt_for("retire early")),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            json["generationConfig"]["responseSchema"]["required"],
            json!(["name", "description", "riskLevel"])
        );
        assert!(json["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("\"retire early\""));
    }

    #[test]
    fn test_response_text_extraction_shape() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        }))
        .unwrap();
        assert_eq!(body.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_as_generation() {
        let provider = GeminiStrategyProvider::new(StrategyProviderConfig::default()).unwrap();
        let err = provider.generate_strategy("grow").await.unwrap_err();
        assert!(matches!(err, SimError::Generation(_)));
    }
}
