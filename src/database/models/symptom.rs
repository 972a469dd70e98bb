use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Symptom {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Symptom {
    const TABLE: &'static str = "symptoms";
    const LABEL: &'static str = "Symptom";
    const COLUMNS: &'static str = "id, name, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::text("name")];
    const REQUIRED: &'static [&'static str] = &["name"];
    const SEARCH: &'static [SearchField] = &[SearchField::contains("name", "name")];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostMortemSummary {
    pub id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for PostMortemSummary {
    const TABLE: &'static str = "post_mortem_summaries";
    const LABEL: &'static str = "Post-mortem summary";
    const COLUMNS: &'static str = "id, description, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::text("description")];
    const REQUIRED: &'static [&'static str] = &["description"];
    const SEARCH: &'static [SearchField] = &[SearchField::contains("description", "description")];

    fn id(&self) -> i64 {
        self.id
    }
}
