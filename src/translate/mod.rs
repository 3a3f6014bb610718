// Translation backends
//
// Every backend speaks `Translator`, so the bulk pipeline and the local proxy
// can be pointed at any of them:
// - libre: LibreTranslate-compatible `POST /translate`
// - mymemory: MyMemory public API, used as the proxy's fallback
// - fallback: ordered chain that tries backends until one succeeds
// - retry: retry policy wrapped around a single backend

pub mod libre;
pub mod mymemory;
pub mod fallback;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;

pub use fallback::FallbackChain;
pub use libre::LibreTranslateClient;
pub use mymemory::MyMemoryClient;
pub use retry::{RetryPolicy, RetryingTranslator, TranslationOutcome};

use crate::config::ProxyConfig;
use crate::error::Result;

/// Main trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Translate `text` from `source` to `target`
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Check that the backend answers at all
    async fn health_check(&self) -> Result<()>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// LibreTranslate client for the bulk pipeline
    pub fn create_libre(endpoint: &str, timeout: Duration) -> Result<LibreTranslateClient> {
        LibreTranslateClient::new(endpoint, timeout)
    }

    /// Primary upstream followed by the public fallback, as used by the proxy
    pub fn create_proxy_chain(config: &ProxyConfig) -> Result<FallbackChain> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let primary = LibreTranslateClient::new(&config.primary_url, timeout)?;
        let fallback = MyMemoryClient::new(&config.fallback_url, timeout)?;

        Ok(FallbackChain::new(vec![Box::new(primary), Box::new(fallback)]))
    }
}
