use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, CibusError};
use super::Translator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    #[serde(default)]
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: String,
}

/// Client for the MyMemory `GET {base}/get?q=...&langpair=src|dst` API
pub struct MyMemoryClient {
    client: Client,
    base_url: String,
}

impl MyMemoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// MyMemory spells source auto-detection differently from LibreTranslate.
fn lang_pair(source: &str, target: &str) -> String {
    let source = if source.eq_ignore_ascii_case("auto") { "autodetect" } else { source };
    format!("{}|{}", source, target)
}

/// `responseStatus` is a number on success and sometimes a string on errors.
fn status_code(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Translator for MyMemoryClient {
    fn name(&self) -> &str {
        "mymemory"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/get", self.base_url);
        let pair = lang_pair(source, target);

        debug!("Sending fallback translation request to: {} ({})", url, pair);

        let response = self.client
            .get(&url)
            .query(&[("q", text), ("langpair", pair.as_str())])
            .send()
            .await
            .map_err(|e| CibusError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CibusError::Translation(format!(
                "MyMemory API error {}", response.status()
            )));
        }

        let body: MyMemoryResponse = response.json().await
            .map_err(|e| CibusError::Translation(format!("Failed to parse response: {}", e)))?;

        if let Some(code) = status_code(&body.response_status) {
            if code != 200 {
                return Err(CibusError::Translation(format!(
                    "MyMemory status {}: {}",
                    code,
                    body.response_details.unwrap_or_default()
                )));
            }
        }

        body.response_data
            .map(|data| data.translated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CibusError::Translation("Empty translation received".to_string()))
    }

    async fn health_check(&self) -> Result<()> {
        self.translate("hello", "en", "es").await.map(|_| ())
    }
}
