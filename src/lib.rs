//! Cibus - Bulk food-name translation
//!
//! Pages through a `foods` table behind a PostgREST data API, translates each
//! name into the configured locales with a LibreTranslate-compatible service,
//! and upserts the results into `ingredient_translations`. Progress is
//! checkpointed to a local JSON file so interrupted runs resume where they
//! stopped.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod translate;
pub mod store;
pub mod checkpoint;
pub mod progress;
pub mod pipeline;
pub mod server;
