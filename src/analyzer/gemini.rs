//! Gemini API連携（generateContent REST）

use super::{AnalysisCapability, InlineImage};
use crate::config::Config;
use crate::error::{PlantScanError, Result};
use async_trait::async_trait;
use plant_scan_common::ModelOutput;
use serde::Serialize;
use serde_json::Value;

/// エラー本文をメッセージに含める最大文字数
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini generateContent クライアント
///
/// APIキーは `x-goog-api-key` ヘッダで送り、URLやエラーメッセージには含めない。
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    temperature: Option<f32>,
    timeout_seconds: u64,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let http = reqwest::Client::builder()
            .timeout(config.analysis_timeout())
            .build()
            .map_err(|e| PlantScanError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, error: reqwest::Error) -> PlantScanError {
        if error.is_timeout() {
            PlantScanError::Timeout {
                operation: "analysis",
                seconds: self.timeout_seconds,
            }
        } else {
            PlantScanError::ApiCall(error.without_url().to_string())
        }
    }
}

#[async_trait]
impl AnalysisCapability for GeminiClient {
    async fn analyze(&self, prompt: &str, image: InlineImage<'_>) -> Result<ModelOutput> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    },
                ],
            }],
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlantScanError::ApiCall(format!(
                "status {}: {}",
                status.as_u16(),
                api_error_message(&body)
            )));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| PlantScanError::ApiParse(e.to_string()))?;

        Ok(ModelOutput::from_value(&value))
    }
}

/// `{"error": {"message": "..."}}` からメッセージを取り出す
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}
