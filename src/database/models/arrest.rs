use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Arrest {
    pub id: i64,
    pub arrest_date: NaiveDate,
    pub location: Option<String>,
    pub officer_name: Option<String>,
    pub suspect_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Arrest {
    const TABLE: &'static str = "arrests";
    const LABEL: &'static str = "Arrest";
    const COLUMNS: &'static str =
        "id, arrest_date, location, officer_name, suspect_id, notes, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::date("arrest_date"),
        FieldSpec::text("location"),
        FieldSpec::text("officer_name"),
        FieldSpec::int("suspect_id"),
        FieldSpec::text("notes"),
    ];
    const REQUIRED: &'static [&'static str] = &["arrest_date"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("location", "location"),
        SearchField::contains("officer_name", "officer_name"),
        SearchField::id("suspect_id", "suspect_id"),
        SearchField::date_from("min_arrest_date", "arrest_date"),
        SearchField::date_to("max_arrest_date", "arrest_date"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}
