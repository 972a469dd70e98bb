use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Role {
    const TABLE: &'static str = "roles";
    const LABEL: &'static str = "Role";
    const COLUMNS: &'static str = "id, name, description, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::text("name"), FieldSpec::text("description")];
    const REQUIRED: &'static [&'static str] = &["name"];
    const SEARCH: &'static [SearchField] = &[SearchField::contains("name", "name")];

    fn id(&self) -> i64 {
        self.id
    }
}
