use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthPractitioner {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub profession: Option<String>,
    pub facility_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for HealthPractitioner {
    const TABLE: &'static str = "health_practitioners";
    const LABEL: &'static str = "Health practitioner";
    const COLUMNS: &'static str =
        "id, first_name, last_name, gender, phone, profession, facility_id, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("first_name"),
        FieldSpec::text("last_name"),
        FieldSpec::text("gender"),
        FieldSpec::text("phone"),
        FieldSpec::text("profession"),
        FieldSpec::int("facility_id"),
    ];
    const REQUIRED: &'static [&'static str] = &["first_name", "last_name"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("first_name", "first_name"),
        SearchField::contains("last_name", "last_name"),
        SearchField::contains("profession", "profession"),
        SearchField::contains("gender", "gender"),
        SearchField::id("facility_id", "facility_id"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}
