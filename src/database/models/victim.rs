use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Victim {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub nin: Option<String>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Victim {
    const TABLE: &'static str = "victims";
    const LABEL: &'static str = "Victim";
    const COLUMNS: &'static str = "id, first_name, last_name, gender, dob, phone_number, address, \
        nationality, nin, created_by, updated_by, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("first_name"),
        FieldSpec::text("last_name"),
        FieldSpec::text("gender"),
        FieldSpec::date("dob"),
        FieldSpec::text("phone_number"),
        FieldSpec::text("address"),
        FieldSpec::text("nationality"),
        FieldSpec::text("nin"),
        FieldSpec::text("created_by"),
        FieldSpec::text("updated_by"),
    ];
    const REQUIRED: &'static [&'static str] = &["first_name", "last_name", "created_by"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("firstname", "first_name"),
        SearchField::contains("first_name", "first_name"),
        SearchField::contains("lastname", "last_name"),
        SearchField::contains("last_name", "last_name"),
        SearchField::exact("gender", "gender"),
        SearchField::exact("nationality", "nationality"),
        SearchField::exact("nin", "nin"),
    ];
    const AUDITED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}
