use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{Result, CibusError};
use crate::models::{Food, IngredientTranslation, TranslationKey};
use super::{ExistingLocales, TranslationStore};

/// PostgREST client for the `foods` and `ingredient_translations` tables
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    foods_table: String,
    translations_table: String,
    order: String,
}

impl RestStore {
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            foods_table: config.foods_table.clone(),
            translations_table: config.translations_table.clone(),
            order: config.order.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    async fn upsert<T: Serialize + ?Sized + Sync>(&self, body: &T) -> Result<()> {
        let url = self.table_url(&self.translations_table);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "resolution=merge-duplicates")
            .json(body)
            .send()
            .await
            .map_err(|e| CibusError::Store(format!("Upsert request failed: {}", e)))?;

        ensure_success(response, "upsert translations").await.map(|_| ())
    }
}

/// Turn a non-2xx response into a store error that carries the body
async fn ensure_success(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(CibusError::Store(format!("Failed to {}: HTTP {} {}", action, status, body)))
}

/// Total from a `Content-Range` header such as `0-0/1234` or `*/0`
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Value of an `in.(...)` filter, quoting ids that would break the list syntax
pub fn in_filter(ids: &[String]) -> String {
    let values: Vec<String> = ids
        .iter()
        .map(|id| {
            if id.contains([',', '(', ')', '"', ' ']) {
                format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                id.clone()
            }
        })
        .collect();
    format!("in.({})", values.join(","))
}

#[async_trait]
impl TranslationStore for RestStore {
    async fn count_foods(&self) -> Result<Option<u64>> {
        let url = self.table_url(&self.foods_table);

        let response = self
            .authorized(self.client.get(&url))
            .header("Prefer", "count=exact")
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| CibusError::Store(format!("Count request failed: {}", e)))?;

        let response = ensure_success(response, "count foods").await?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);

        debug!("Content-Range total for {}: {:?}", self.foods_table, total);
        Ok(total)
    }

    async fn fetch_foods(&self, offset: usize, limit: usize) -> Result<Vec<Food>> {
        let url = self.table_url(&self.foods_table);
        let offset = offset.to_string();
        let limit = limit.to_string();

        let response = self
            .authorized(self.client.get(&url))
            .query(&[
                ("select", "id,name"),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
                ("order", self.order.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CibusError::Store(format!("Fetch request failed: {}", e)))?;

        let response = ensure_success(response, "fetch foods").await?;
        response
            .json()
            .await
            .map_err(|e| CibusError::Store(format!("Failed to parse foods: {}", e)))
    }

    async fn translation_exists(&self, food_id: &str, locale: &str) -> Result<bool> {
        let url = self.table_url(&self.translations_table);
        let id_filter = format!("eq.{}", food_id);
        let locale_filter = format!("eq.{}", locale);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[
                ("ingredient_id", id_filter.as_str()),
                ("locale", locale_filter.as_str()),
                ("select", "id"),
            ])
            .send()
            .await
            .map_err(|e| CibusError::Store(format!("Lookup request failed: {}", e)))?;

        let response = ensure_success(response, "look up translation").await?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| CibusError::Store(format!("Failed to parse lookup: {}", e)))?;

        Ok(!rows.is_empty())
    }

    async fn existing_locales(&self, food_ids: &[String]) -> Result<ExistingLocales> {
        if food_ids.is_empty() {
            return Ok(ExistingLocales::new());
        }

        let url = self.table_url(&self.translations_table);
        let filter = in_filter(food_ids);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("ingredient_id", filter.as_str()), ("select", "ingredient_id,locale")])
            .send()
            .await
            .map_err(|e| CibusError::Store(format!("Lookup request failed: {}", e)))?;

        let response = ensure_success(response, "look up translations").await?;
        let keys: Vec<TranslationKey> = response
            .json()
            .await
            .map_err(|e| CibusError::Store(format!("Failed to parse lookup: {}", e)))?;

        let mut existing = ExistingLocales::new();
        for key in keys {
            existing.entry(key.ingredient_id).or_default().insert(key.locale);
        }
        Ok(existing)
    }

    async fn upsert_translation(&self, row: &IngredientTranslation) -> Result<()> {
        self.upsert(row).await
    }

    async fn upsert_translations(&self, rows: &[IngredientTranslation]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.upsert(rows).await
    }
}
