use serde::{Deserialize, Deserializer, Serialize};

/// A row of the source `foods` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Null on some rows; those are skipped
    #[serde(default)]
    pub name: Option<String>,
}

/// A row of the `ingredient_translations` table.
///
/// `(ingredient_id, locale)` is unique on the server side; writes rely on the
/// upsert merge directive rather than on any check made here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientTranslation {
    #[serde(deserialize_with = "id_as_string")]
    pub ingredient_id: String,
    pub locale: String,
    pub name: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl IngredientTranslation {
    pub fn new(ingredient_id: &str, locale: &str, name: &str) -> Self {
        Self {
            ingredient_id: ingredient_id.to_string(),
            locale: locale.to_string(),
            name: name.to_string(),
            synonyms: Vec::new(),
        }
    }
}

/// Projection used by existence lookups (`select=ingredient_id,locale`).
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationKey {
    #[serde(deserialize_with = "id_as_string")]
    pub ingredient_id: String,
    pub locale: String,
}

/// Ids come back as uuids on some projects and as integers on others.
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
