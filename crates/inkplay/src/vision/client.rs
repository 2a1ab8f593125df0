//! Multimodal model client for Gemini, OpenAI and Anthropic.

use super::{Frame, VisionError};
use crate::config::VisionConfig;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

/// Vision provider selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VisionProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI chat completions.
    OpenAi,
    /// Anthropic messages.
    Anthropic,
}

impl VisionProvider {
    /// Environment variable holding the API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            VisionProvider::Gemini => "GEMINI_API_KEY",
            VisionProvider::OpenAi => "OPENAI_API_KEY",
            VisionProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Sends a photograph and a prompt to the configured model.
#[derive(Debug, Clone)]
pub struct VisionClient {
    config: VisionConfig,
    api_key: String,
    http: reqwest::Client,
}

impl VisionClient {
    /// Creates a client.
    #[instrument(skip(config, api_key), fields(provider = %config.provider(), model = %config.model()))]
    pub fn new(config: VisionConfig, api_key: String) -> Self {
        info!("Creating vision client");
        Self {
            config,
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the model's text reply for the photograph.
    #[instrument(skip(self, frame, prompt), fields(provider = %self.config.provider(), model = %self.config.model()))]
    pub async fn interpret(&self, frame: &Frame, prompt: &str) -> Result<String, VisionError> {
        let image = STANDARD.encode(frame.bytes());
        let (url, body) = self.request(frame.media_type(), &image, prompt);

        debug!(%url, image_len = image.len(), "Sending vision request");
        let mut request = self.http.post(&url).json(&body);
        request = match self.config.provider() {
            VisionProvider::Gemini => request.header("x-goog-api-key", self.api_key.as_str()),
            VisionProvider::OpenAi => request.bearer_auth(&self.api_key),
            VisionProvider::Anthropic => request
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", "2023-06-01"),
        };

        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Vision request failed");
            VisionError::new(format!("Vision request failed: {}", e))
        })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| VisionError::new(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Vision API error");
            return Err(VisionError::new(format!(
                "Vision API error {}: {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| VisionError::new(format!("Failed to parse response: {}", e)))?;
        let content = reply_text(*self.config.provider(), &response_json)?;

        info!(content_length = content.len(), "Vision reply received");
        Ok(content)
    }

    fn request(&self, media_type: &str, image: &str, prompt: &str) -> (String, Value) {
        let system = self.config.system_prompt();
        let model = self.config.model();
        let max_tokens = *self.config.max_tokens();

        match self.config.provider() {
            VisionProvider::Gemini => (
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                    model
                ),
                json!({
                    "system_instruction": { "parts": [{ "text": system }] },
                    "contents": [{
                        "role": "user",
                        "parts": [
                            { "text": prompt },
                            { "inline_data": { "mime_type": media_type, "data": image } }
                        ]
                    }],
                    "generationConfig": {
                        "maxOutputTokens": max_tokens,
                        "responseMimeType": "application/json"
                    }
                }),
            ),
            VisionProvider::OpenAi => (
                "https://api.openai.com/v1/chat/completions".to_string(),
                json!({
                    "model": model,
                    "max_tokens": max_tokens,
                    "messages": [
                        { "role": "system", "content": system },
                        {
                            "role": "user",
                            "content": [
                                { "type": "text", "text": prompt },
                                {
                                    "type": "image_url",
                                    "image_url": { "url": format!("data:{};base64,{}", media_type, image) }
                                }
                            ]
                        }
                    ]
                }),
            ),
            VisionProvider::Anthropic => (
                "https://api.anthropic.com/v1/messages".to_string(),
                json!({
                    "model": model,
                    "max_tokens": max_tokens,
                    "system": system,
                    "messages": [{
                        "role": "user",
                        "content": [
                            {
                                "type": "image",
                                "source": { "type": "base64", "media_type": media_type, "data": image }
                            },
                            { "type": "text", "text": prompt }
                        ]
                    }]
                }),
            ),
        }
    }
}

/// Pulls the text out of a provider's response envelope.
fn reply_text(provider: VisionProvider, response: &Value) -> Result<String, VisionError> {
    let text = match provider {
        VisionProvider::Gemini => response["candidates"][0]["content"]["parts"][0]["text"].as_str(),
        VisionProvider::OpenAi => response["choices"][0]["message"]["content"].as_str(),
        VisionProvider::Anthropic => response["content"][0]["text"].as_str(),
    };
    text.map(str::to_string).ok_or_else(|| {
        error!(response = %response, "No text content in vision response");
        VisionError::new(format!("No text content in {} response", provider))
    })
}
