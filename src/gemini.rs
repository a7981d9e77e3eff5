use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::GeminiConfig;
use crate::error::GenerationError;
use crate::models::SuggestedCoordinate;
use crate::orchestrator::{ImageGenerator, SuggestionGenerator};
use crate::prompt::SuggestionRequest;

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *val = Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

fn sniff_image_kind(data: &str) -> &'static str {
    let head = data.get(..data.len().min(16) / 4 * 4).unwrap_or_default();
    match base64::engine::general_purpose::STANDARD.decode(head) {
        Ok(bytes) if bytes.starts_with(b"\x89PNG") => "PNG",
        Ok(bytes) if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) => "JPEG",
        Ok(bytes) if bytes.starts_with(b"RIFF") => "WEBP",
        _ => "Unknown",
    }
}

/// Client for the Gemini `generateContent` endpoint, used for both the text
/// and the image stage.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self { client: Client::new(), config }
    }

    async fn perform_api_call(&self, model: &str, request_body: &Value) -> Result<GeminiResponse, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        info!("🔗 Making request to: {}", url.replace(&self.config.api_key, "***"));
        debug!("📤 Request body: {}", serde_json::to_string_pretty(request_body).unwrap_or_default());

        let response = self.client
            .post(&url)
            .json(request_body)
            .send()
            .await
            .map_err(|e| GenerationError::GenerationFailure(e.to_string().replace(&self.config.api_key, "***")))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| GenerationError::GenerationFailure(e.to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", response_text);
            return Err(GenerationError::GenerationFailure(format!("status={} body={}", status, response_text)));
        }

        if let Ok(mut json_value) = serde_json::from_str::<Value>(&response_text) {
            truncate_base64_in_json(&mut json_value);
            debug!("📥 Raw Gemini API response: {}", json_value);
        }

        serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::GenerationFailure(format!("unreadable response envelope: {}", e)))
    }

    pub async fn generate_suggestion(&self, request: &SuggestionRequest) -> Result<SuggestedCoordinate, GenerationError> {
        info!("Generating coordinate suggestion with {}...", self.config.text_model);

        let payload = json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user_prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.response_schema
            }
        });

        let parsed = self.perform_api_call(&self.config.text_model, &payload).await?;
        let text = extract_text(&parsed);
        if text.trim().is_empty() {
            error!("❌ Text model returned no content");
            return Err(GenerationError::EmptyResponse);
        }

        let coordinate = parse_coordinate(&text)?;
        info!("✅ Suggestion '{}' generated with {} items", coordinate.title, coordinate.items.len());
        Ok(coordinate)
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        info!("🎯 Generating image with {} from prompt (truncated): {}", self.config.image_model, truncate(prompt, 100));

        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let parsed = self.perform_api_call(&self.config.image_model, &payload).await?;
        match extract_first_image(&parsed) {
            Some(inline) => {
                info!(
                    "🖼️ Extracted {} image ({}) from API response: {}",
                    sniff_image_kind(&inline.data),
                    inline.mime_type,
                    truncate(&inline.data, 50)
                );
                Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
            }
            None => {
                info!("⚠️ No image data found in API response");
                Err(GenerationError::NoImageProduced)
            }
        }
    }
}

#[async_trait]
impl SuggestionGenerator for GeminiClient {
    async fn generate_suggestion(&self, request: &SuggestionRequest) -> Result<SuggestedCoordinate, GenerationError> {
        GeminiClient::generate_suggestion(self, request).await
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        GeminiClient::generate_image(self, prompt).await
    }
}

fn parse_coordinate(text: &str) -> Result<SuggestedCoordinate, GenerationError> {
    let coordinate: SuggestedCoordinate = serde_json::from_str(text)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    if coordinate.title.trim().is_empty() {
        return Err(GenerationError::MalformedResponse("title is blank".into()));
    }
    if coordinate.visual_prompt.trim().is_empty() {
        return Err(GenerationError::MalformedResponse("visualPrompt is blank".into()));
    }
    Ok(coordinate)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...[{} chars total]", s.chars().take(max).collect::<String>(), s.chars().count())
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    Text {
        text: String,
        #[serde(default)]
        thought: bool,
    },
    #[allow(dead_code)]
    Other(Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

fn first_parts(resp: &GeminiResponse) -> &[Part] {
    resp.candidates.first().map(|c| c.content.parts.as_slice()).unwrap_or_default()
}

/// Concatenated non-thought text of the first candidate.
fn extract_text(resp: &GeminiResponse) -> String {
    first_parts(resp)
        .iter()
        .filter_map(|p| match p {
            Part::Text { text, thought: false } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn extract_first_image(resp: &GeminiResponse) -> Option<&InlineData> {
    first_parts(resp).iter().find_map(|p| match p {
        Part::Inline { inline_data } if !inline_data.data.is_empty() => Some(inline_data),
        _ => None,
    })
}
