// Data API access
//
// The pipeline only talks to `TranslationStore`; `rest` implements it against
// a PostgREST-style `/rest/v1/{table}` interface.

pub mod rest;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

pub use rest::RestStore;

use crate::error::Result;
use crate::models::{Food, IngredientTranslation};

/// Existing locales per ingredient id
pub type ExistingLocales = HashMap<String, HashSet<String>>;

#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Total number of source rows, when the server reports one
    async fn count_foods(&self) -> Result<Option<u64>>;

    /// One page of source rows in stable order
    async fn fetch_foods(&self, offset: usize, limit: usize) -> Result<Vec<Food>>;

    /// Whether `(food_id, locale)` already has a translation
    async fn translation_exists(&self, food_id: &str, locale: &str) -> Result<bool>;

    /// Locales already translated for each of `food_ids`
    async fn existing_locales(&self, food_ids: &[String]) -> Result<ExistingLocales>;

    /// Insert or merge a single translation
    async fn upsert_translation(&self, row: &IngredientTranslation) -> Result<()>;

    /// Insert or merge many translations in one request
    async fn upsert_translations(&self, rows: &[IngredientTranslation]) -> Result<()>;
}
