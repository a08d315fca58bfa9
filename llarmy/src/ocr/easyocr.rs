use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;
use crate::error::{LlarmyError, Result};

use super::engine::{Detection, GeneralTextEngine};
use super::language::LanguageList;
use super::loader::DecodedImage;

/// Client for an EasyOCR reader served over HTTP.
///
/// Every request carries its own language list, so the server can build or
/// reuse a reader configured for exactly those languages.
#[derive(Clone, Debug)]
pub struct EasyOcrClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ReadTextRequest<'a> {
    image_base64: String,
    lang_list: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ReadTextResponse {
    results: Vec<Detection>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

impl EasyOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlarmyError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.easyocr_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GeneralTextEngine for EasyOcrClient {
    async fn read_text(
        &self,
        image: &DecodedImage,
        langs: &LanguageList,
    ) -> Result<Vec<Detection>> {
        let request = ReadTextRequest {
            image_base64: STANDARD.encode(image.to_png()?),
            lang_list: langs.as_slice(),
        };

        let resp = self
            .client
            .post(format!("{}/readtext", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let parsed: ReadTextResponse = resp
                .json()
                .await
                .map_err(|e| LlarmyError::Ocr(format!("Failed to parse response: {e}")))?;
            tracing::debug!(
                detections = parsed.results.len(),
                langs = %langs,
                "EasyOCR read complete"
            );
            return Ok(parsed.results);
        }

        let body = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(LlarmyError::UnidentifiedImage(error_detail(&body)))
            }
            _ => Err(LlarmyError::Ocr(format!(
                "EasyOCR request failed: {status} - {body}"
            ))),
        }
    }

    async fn health_check(&self) -> Result<()> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(LlarmyError::Ocr(format!(
                "EasyOCR health check failed: {}",
                resp.status()
            )))
        }
    }
}

/// Pull `detail` out of a JSON error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorResponse { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
