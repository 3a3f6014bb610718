use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, CibusError};
use super::Translator;

#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest<'a> {
    pub q: &'a str,
    pub source: &'a str,
    pub target: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: Option<String>,
    pub error: Option<String>,
}

/// Client for a LibreTranslate-compatible `POST {base}/translate` endpoint
pub struct LibreTranslateClient {
    client: Client,
    base_url: String,
}

impl LibreTranslateClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest { q: text, source, target };

        debug!("Sending translation request to: {} ({} -> {})", url, source, target);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CibusError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CibusError::Translation(format!(
                "Translation API error {}: {}", status, error_text
            )));
        }

        let body: TranslateResponse = response.json().await
            .map_err(|e| CibusError::Translation(format!("Failed to parse response: {}", e)))?;

        match (body.translated_text, body.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(CibusError::Translation(error)),
            (None, None) => Err(CibusError::Translation(
                "Response did not contain translatedText".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<()> {
        let response = self.client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| CibusError::Translation(format!("Failed to connect to {}: {}", self.base_url, e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CibusError::Translation(format!(
                "Translation API at {} answered HTTP {}",
                self.base_url,
                response.status()
            )))
        }
    }
}
