use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthFacility {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for HealthFacility {
    const TABLE: &'static str = "health_facilities";
    const LABEL: &'static str = "Health facility";
    const COLUMNS: &'static str = "id, name, location, contact, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("name"),
        FieldSpec::text("location"),
        FieldSpec::text("contact"),
    ];
    const REQUIRED: &'static [&'static str] = &["name"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("name", "name"),
        SearchField::contains("location", "location"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}
