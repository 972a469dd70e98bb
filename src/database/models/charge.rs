use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Charge {
    pub id: i64,
    pub charge_title: String,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Charge {
    const TABLE: &'static str = "charges";
    const LABEL: &'static str = "Charge";
    const COLUMNS: &'static str = "id, charge_title, description, severity, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("charge_title"),
        FieldSpec::text("description"),
        FieldSpec::text("severity"),
    ];
    const REQUIRED: &'static [&'static str] = &["charge_title"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("chargetitle", "charge_title"),
        SearchField::contains("charge_title", "charge_title"),
        SearchField::contains("severity", "severity"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}
