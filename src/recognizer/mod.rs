//! Gemini image recognition client.
//!
//! Sends one `generateContent` request per photo and reduces the response to
//! a single normalized fruit label. Every failure mode (missing key, network,
//! non-2xx status, malformed envelope) collapses into `None` so callers only
//! ever see "label" or "no label".

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed instruction: answer with exactly one lower-case fruit name.
const FRUIT_PROMPT: &str = "Bạn là hệ thống nhận diện trái cây. \
    Hãy nhìn bức ảnh và trả lời DUY NHẤT tên loại trái cây trong ảnh \
    bằng tiếng Việt, viết thường, không dấu câu, không giải thích. \
    Ví dụ: chuối";

/// Turns image bytes into a single classification label.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// `Some(label)` with the label trimmed and lower-cased, or `None`
    /// when no classification could be obtained. Never errors.
    async fn classify(&self, image: &[u8], mime_type: &str) -> Option<String>;
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    // Non-text parts have no `text` field.
    text: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/{}:generateContent", GEMINI_BASE_URL, config.gemini_model),
            api_key: config.gemini_api_key.clone(),
        })
    }

    fn build_request(image_b64: String, mime_type: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: FRUIT_PROMPT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: image_b64,
                        },
                    },
                ],
            }],
        }
    }
}

/// First text part of the first candidate, trimmed and lower-cased.
fn extract_label(response: &GeminiResponse) -> Option<String> {
    let parts = &response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts;

    parts
        .iter()
        .find_map(|p| p.text.as_deref())
        .map(|text| text.trim().to_lowercase())
        .filter(|label| !label.is_empty())
}

#[async_trait]
impl Recognizer for GeminiClient {
    async fn classify(&self, image: &[u8], mime_type: &str) -> Option<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("GEMINI_API_KEY not set, skipping recognition");
            return None;
        };

        if image.is_empty() {
            tracing::warn!("empty image payload, skipping recognition");
            return None;
        }

        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image);
        let request = Self::build_request(image_b64, mime_type);

        tracing::debug!(bytes = image.len(), mime_type, "calling Gemini API");

        let response = match self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Gemini request failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gemini returned an error status");
            return None;
        }

        let envelope: GeminiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Gemini response parse failed: {e}");
                return None;
            }
        };

        let label = extract_label(&envelope);
        match &label {
            Some(label) => tracing::info!(label, "Gemini classification"),
            None => tracing::warn!("Gemini response contained no text candidate"),
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GeminiClient::build_request("aGVsbG8=".to_string(), "image/jpeg");
        let json = serde_json::to_value(&request).expect("serialize failed");

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], FRUIT_PROMPT);
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["data"],
            "aGVsbG8="
        );
    }

    #[test]
    fn test_extract_label_trims_and_lowercases() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{"text": "  Chuối \n"}]
                    }
                }]
            }"#,
        )
        .expect("deserialize failed");

        assert_eq!(extract_label(&response), Some("chuối".to_string()));
    }

    #[test]
    fn test_extract_label_skips_non_text_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            {"inline_data": {"mime_type": "image/png", "data": "x"}},
                            {"text": "xoài"}
                        ]
                    }
                }]
            }"#,
        )
        .expect("deserialize failed");

        assert_eq!(extract_label(&response), Some("xoài".to_string()));
    }

    #[test]
    fn test_extract_label_no_candidates() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates": []}"#).expect("deserialize failed");
        assert_eq!(extract_label(&response), None);

        let response: GeminiResponse = serde_json::from_str("{}").expect("deserialize failed");
        assert_eq!(extract_label(&response), None);
    }

    #[test]
    fn test_extract_label_blank_text() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#,
        )
        .expect("deserialize failed");
        assert_eq!(extract_label(&response), None);
    }

    #[tokio::test]
    async fn test_classify_without_api_key_short_circuits() {
        let config = Config {
            bot_token: "token".into(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-pro".into(),
            admin_user_id: None,
            db_path: "fruits.db".into(),
            update_policy: Default::default(),
        };
        let client = GeminiClient::new(&config).expect("client build failed");

        assert_eq!(client.classify(&[1, 2, 3], "image/jpeg").await, None);
    }

    #[tokio::test]
    async fn test_classify_empty_image_short_circuits() {
        let config = Config {
            bot_token: "token".into(),
            gemini_api_key: Some("key".into()),
            gemini_model: "gemini-2.5-pro".into(),
            admin_user_id: None,
            db_path: "fruits.db".into(),
            update_policy: Default::default(),
        };
        let client = GeminiClient::new(&config).expect("client build failed");

        assert_eq!(client.classify(&[], "image/jpeg").await, None);
    }
}
