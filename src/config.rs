use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, CibusError};

// Default values for fields older config files may not carry
fn default_source_language() -> String {
    "en".to_string()
}

fn default_backoff() -> Backoff {
    Backoff::Linear
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

fn default_db_retry_delay_ms() -> u64 {
    1000
}

fn default_foods_table() -> String {
    "foods".to_string()
}

fn default_translations_table() -> String {
    "ingredient_translations".to_string()
}

fn default_order() -> String {
    "name".to_string()
}

fn default_existing_check() -> ExistingCheck {
    ExistingCheck::Batched
}

fn default_write_mode() -> WriteMode {
    WriteMode::PerRow
}

fn default_checkpoint_path() -> String {
    "translation_progress.json".to_string()
}

fn default_fallback_url() -> String {
    "https://api.mymemory.translated.net".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Base URL of a LibreTranslate-compatible service
    pub endpoint: String,
    /// Language the source rows are written in
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after the first failed one
    pub max_retries: u32,
    /// Sleep strategy between attempts
    #[serde(default = "default_backoff")]
    pub backoff: Backoff,
    /// Base sleep between attempts in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// base * (attempt + 1)
    Linear,
    /// base * 2^attempt
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Project URL; REST calls go to {url}/rest/v1/{table}
    pub url: String,
    /// Sent as both the `apikey` header and the bearer token
    pub api_key: String,
    #[serde(default = "default_foods_table")]
    pub foods_table: String,
    #[serde(default = "default_translations_table")]
    pub translations_table: String,
    /// Column used to order pages so offsets stay stable between runs
    #[serde(default = "default_order")]
    pub order: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts for page reads before the run is stopped
    pub max_retries: u32,
    /// Base sleep between page read attempts in milliseconds
    #[serde(default = "default_db_retry_delay_ms")]
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target locales
    pub languages: Vec<String>,
    /// Foods fetched per page
    pub page_size: usize,
    /// Upper bound on in-flight translation requests
    pub max_concurrent_translations: usize,
    /// Upper bound on in-flight data API requests
    pub max_concurrent_db_operations: usize,
    /// Pause between pages
    pub delay_between_batches_ms: u64,
    /// How existing translations are looked up
    #[serde(default = "default_existing_check")]
    pub existing_check: ExistingCheck,
    /// How translated rows are written
    #[serde(default = "default_write_mode")]
    pub write_mode: WriteMode,
    /// Local JSON progress file
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingCheck {
    /// One lookup per (food, locale)
    PerItem,
    /// One `in.(...)` lookup per page
    Batched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// One upsert request per translated row
    PerRow,
    /// One array upsert per page
    Batched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Primary LibreTranslate-compatible upstream
    pub primary_url: String,
    /// MyMemory-compatible upstream tried when the primary fails
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Per-upstream timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate: TranslateConfig {
                endpoint: "http://localhost:8080".to_string(),
                source_language: default_source_language(),
                timeout_secs: 10,
                max_retries: 2,
                backoff: Backoff::Linear,
                retry_base_delay_ms: 500,
            },
            database: DatabaseConfig {
                url: "http://localhost:54321".to_string(),
                api_key: String::new(),
                foods_table: default_foods_table(),
                translations_table: default_translations_table(),
                order: default_order(),
                timeout_secs: 5,
                max_retries: 3,
                retry_base_delay_ms: default_db_retry_delay_ms(),
            },
            pipeline: PipelineConfig {
                languages: vec!["es".to_string(), "de".to_string(), "it".to_string()],
                page_size: 100,
                max_concurrent_translations: 20,
                max_concurrent_db_operations: 10,
                delay_between_batches_ms: 500,
                existing_check: ExistingCheck::Batched,
                write_mode: WriteMode::PerRow,
                checkpoint_path: default_checkpoint_path(),
            },
            proxy: ProxyConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                primary_url: "https://libretranslate.com".to_string(),
                fallback_url: default_fallback_url(),
                timeout_secs: 15,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CibusError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CibusError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CibusError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CibusError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Apply overrides from the process environment (and `.env`, once loaded).
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CIBUS_API_KEY").filter(|v| !v.is_empty()) {
            self.database.api_key = key;
        }
        if let Some(url) = lookup("CIBUS_DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(url) = lookup("CIBUS_TRANSLATE_URL").filter(|v| !v.is_empty()) {
            self.translate.endpoint = url;
        }
    }

    /// Check the values a run depends on before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.languages.is_empty() {
            return Err(CibusError::Config("At least one target language is required".to_string()));
        }
        if self.pipeline.page_size == 0 {
            return Err(CibusError::Config("page_size must be greater than zero".to_string()));
        }
        if self.pipeline.max_concurrent_translations == 0 || self.pipeline.max_concurrent_db_operations == 0 {
            return Err(CibusError::Config("Concurrency limits must be greater than zero".to_string()));
        }
        if self.database.api_key.trim().is_empty() {
            return Err(CibusError::Config(
                "Missing data API key. Set database.api_key or CIBUS_API_KEY".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated language list, dropping blanks.
pub fn parse_languages(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.pipeline.languages, vec!["es", "de", "it"]);
        assert_eq!(parsed.translate.backoff, Backoff::Linear);
        assert_eq!(parsed.pipeline.existing_check, ExistingCheck::Batched);
    }

    #[test]
    fn test_optional_fields_fall_back_to_defaults() {
        let text = r#"
            [translate]
            endpoint = "http://translate.local"
            timeout_secs = 15
            max_retries = 3

            [database]
            url = "https://example.supabase.co"
            api_key = "key"
            timeout_secs = 10
            max_retries = 3

            [pipeline]
            languages = ["fr"]
            page_size = 50
            max_concurrent_translations = 1
            max_concurrent_db_operations = 1
            delay_between_batches_ms = 2000
            write_mode = "batched"

            [proxy]
            host = "127.0.0.1"
            port = 9000
            primary_url = "http://upstream"
            timeout_secs = 5
        "#;
        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.translate.source_language, "en");
        assert_eq!(config.database.translations_table, "ingredient_translations");
        assert_eq!(config.pipeline.write_mode, WriteMode::Batched);
        assert_eq!(config.pipeline.checkpoint_path, "translation_progress.json");
        assert_eq!(config.proxy.fallback_url, "https://api.mymemory.translated.net");
        assert_eq!(config.database.retry_base_delay_ms, 1000);
    }

    #[test]
    fn test_page_reads_use_database_retry_delay() {
        let mut config = Config::default();
        config.translate.retry_base_delay_ms = 10;
        config.database.retry_base_delay_ms = 250;

        let options = crate::pipeline::PipelineOptions::from_config(&config);
        assert_eq!(options.page_retry.base_delay, std::time::Duration::from_millis(250));
        assert_eq!(options.page_retry.max_retries, 2);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CIBUS_API_KEY", "secret"),
            ("CIBUS_TRANSLATE_URL", "http://other:5000"),
            ("CIBUS_DATABASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.api_key, "secret");
        assert_eq!(config.translate.endpoint, "http://other:5000");
        // Empty values do not clobber the file
        assert_eq!(config.database.url, "http://localhost:54321");
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(CibusError::Config(_))));

        let mut config = Config::default();
        config.database.api_key = "key".to_string();
        assert!(config.validate().is_ok());

        config.pipeline.languages.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_languages() {
        assert_eq!(parse_languages("es, DE,,it "), vec!["es", "de", "it"]);
        assert!(parse_languages("").is_empty());
    }
}
