//! Gemini API連携
//!
//! generateContent エンドポイントに画像（inline_data）とプロンプトを送り、
//! レスポンスのテキスト部分を共通パーサーで解釈する。

use super::{AnalysisClient, TREND_CATEGORY_COUNT};
use crate::config::Config;
use crate::encoder::EncodedPayload;
use crate::error::{Result, StockAiError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use stock_ai_common::{
    build_image_prompt_prompt, build_trends_prompt, build_vector_metadata_prompt,
    parse_trend_categories, parse_vector_metadata, TrendCategory, VectorMetadata,
};
use tracing::debug;

/// APIキーはURLに載せずヘッダーで送る（エラー文言にURLが含まれるため）
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
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

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

impl GenerationConfig {
    fn json(schema: serde_json::Value) -> Self {
        Self {
            temperature: None,
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        }
    }
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiResponse {
    /// 最初の候補のテキストを連結（空なら None）
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn metadata_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["title", "description", "tags"]
    })
}

fn trends_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "category": { "type": "STRING" },
                "description": { "type": "STRING" },
                "keywords": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["category", "description", "keywords"]
        }
    })
}

fn image_request(payload: &EncodedPayload, prompt: String, config: Option<GenerationConfig>) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: payload.mime_type.clone(),
                        data: payload.data.clone(),
                    },
                },
                Part::Text { text: prompt },
            ],
        }],
        generation_config: config,
    }
}

fn metadata_from_text(text: Option<String>) -> Result<VectorMetadata> {
    let text = text.ok_or(StockAiError::NoResponse)?;
    parse_vector_metadata(&text).map_err(|e| StockAiError::MalformedResponse(e.to_string()))
}

fn prompt_from_text(text: Option<String>) -> Result<String> {
    text.map(|t| t.trim().to_string())
        .ok_or(StockAiError::NoResponse)
}

fn trends_from_text(text: Option<String>) -> Result<Vec<TrendCategory>> {
    let text = text.ok_or_else(|| StockAiError::Fetch("empty response".into()))?;
    parse_trend_categories(&text).map_err(|e| StockAiError::Fetch(e.to_string()))
}

/// Gemini REST APIクライアント
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.get_api_key()?,
            &config.model,
            &config.api_base_url,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// API呼び出し（共通処理）
    async fn call(&self, request: &GeminiRequest) -> Result<Option<String>> {
        debug!("Sending request to Gemini: model={}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockAiError::ApiCall(format!("status {}: {}", status, body.trim())));
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| StockAiError::MalformedResponse(format!("Gemini envelope: {}", e)))?;
        let text = parsed.text();

        debug!("Gemini response: {} chars", text.as_ref().map_or(0, |t| t.len()));
        Ok(text)
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn generate_vector_metadata(&self, payload: &EncodedPayload) -> Result<VectorMetadata> {
        let request = image_request(
            payload,
            build_vector_metadata_prompt(),
            Some(GenerationConfig::json(metadata_schema())),
        );
        metadata_from_text(self.call(&request).await?)
    }

    async fn generate_image_prompt(
        &self,
        payload: &EncodedPayload,
        theme: Option<&str>,
    ) -> Result<String> {
        let request = image_request(payload, build_image_prompt_prompt(theme), None);
        prompt_from_text(self.call(&request).await?)
    }

    async fn get_trending_keywords(&self) -> Result<Vec<TrendCategory>> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: build_trends_prompt(TREND_CATEGORY_COUNT),
                }],
            }],
            generation_config: Some(GenerationConfig::json(trends_schema())),
        };

        let text = match self.call(&request).await {
            Ok(text) => text,
            Err(StockAiError::MalformedResponse(msg)) => return Err(StockAiError::Fetch(msg)),
            Err(e) => return Err(e),
        };
        trends_from_text(text)
    }
}
