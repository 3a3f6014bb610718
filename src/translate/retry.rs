use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::{Backoff, TranslateConfig};
use super::Translator;

/// How many times to retry a failed call and how long to sleep in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, backoff: Backoff) -> Self {
        Self { max_retries, base_delay, backoff }
    }

    pub fn from_config(config: &TranslateConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
            config.backoff,
        )
    }

    /// Sleep before retry number `attempt + 1` (attempt counts from zero)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(attempt.saturating_add(1)),
            Backoff::Exponential => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
        }
    }
}

/// Result of translating one string after retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The backend produced text that differs from the source
    Translated(String),
    /// The backend echoed the source back; nothing to write
    Unchanged,
    /// Every attempt failed; `fallback` is the untranslated source
    Exhausted { fallback: String, error: String },
}

/// Wraps a backend with a retry policy and an optional in-flight limit
#[derive(Clone)]
pub struct RetryingTranslator {
    inner: Arc<dyn Translator>,
    policy: RetryPolicy,
    limit: Option<Arc<Semaphore>>,
}

impl RetryingTranslator {
    pub fn new(inner: Arc<dyn Translator>, policy: RetryPolicy) -> Self {
        Self { inner, policy, limit: None }
    }

    /// Hold a permit of `limit` for the duration of each attempt
    pub fn with_limit(mut self, limit: Arc<Semaphore>) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn inner(&self) -> &Arc<dyn Translator> {
        &self.inner
    }

    pub async fn translate_text(&self, text: &str, source: &str, target: &str) -> TranslationOutcome {
        let mut attempt = 0;

        loop {
            let result = {
                // Permit covers the request only, not the backoff sleep
                let _permit = match &self.limit {
                    Some(limit) => limit.acquire().await.ok(),
                    None => None,
                };
                self.inner.translate(text, source, target).await
            };

            match result {
                Ok(translation) => {
                    let translation = translation.trim().to_string();
                    if translation.is_empty() || translation == text.trim() {
                        debug!("Translation of '{}' to {} is unchanged", text, target);
                        return TranslationOutcome::Unchanged;
                    }
                    return TranslationOutcome::Translated(translation);
                }
                Err(e) if attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "Retrying translation of '{}' to {} ({}/{}) in {:?}: {}",
                        text, target, attempt + 1, self.policy.max_retries, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        "Translation of '{}' to {} failed after {} retries: {}",
                        text, target, self.policy.max_retries, e
                    );
                    return TranslationOutcome::Exhausted {
                        fallback: text.to_string(),
                        error: e.to_string(),
                    };
                }
            }
        }
    }
}
