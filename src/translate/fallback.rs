use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Result, CibusError};
use super::Translator;

/// Tries each backend in order and returns the first successful answer
pub struct FallbackChain {
    backends: Vec<Box<dyn Translator>>,
}

impl FallbackChain {
    pub fn new(backends: Vec<Box<dyn Translator>>) -> Self {
        Self { backends }
    }

    /// Translate and report which backend answered
    pub async fn translate_with_backend(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<(String, &str)> {
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.translate(text, source, target).await {
                Ok(translation) => {
                    debug!("Translated with {}", backend.name());
                    return Ok((translation, backend.name()));
                }
                Err(e) => {
                    warn!("Backend {} failed, trying next: {}", backend.name(), e);
                    failures.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(CibusError::Translation("No translation backends configured".to_string()));
        }

        Err(CibusError::Translation(format!(
            "All translation backends failed ({})",
            failures.join("; ")
        )))
    }
}

#[async_trait]
impl Translator for FallbackChain {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.translate_with_backend(text, source, target)
            .await
            .map(|(translation, _)| translation)
    }

    /// Healthy when at least one backend is
    async fn health_check(&self) -> Result<()> {
        for backend in &self.backends {
            if backend.health_check().await.is_ok() {
                return Ok(());
            }
        }
        Err(CibusError::Translation("No healthy translation backend".to_string()))
    }
}
