use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

/// Suspect row without its binary columns; `photo` and `fingerprints` are
/// fetched separately through the blob endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Suspect {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub nin: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub status: Option<String>,
    pub has_photo: bool,
    pub has_fingerprints: bool,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Suspect {
    pub const PHOTO: &'static str = "photo";
    pub const FINGERPRINTS: &'static str = "fingerprints";
}

impl Resource for Suspect {
    const TABLE: &'static str = "suspects";
    const LABEL: &'static str = "Suspect";
    const COLUMNS: &'static str = "id, first_name, middle_name, last_name, dob, gender, phone_number, \
        nin, nationality, address, occupation, status, \
        (photo IS NOT NULL AND length(photo) > 0) AS has_photo, \
        (fingerprints IS NOT NULL AND length(fingerprints) > 0) AS has_fingerprints, \
        created_by, updated_by, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("first_name"),
        FieldSpec::text("middle_name"),
        FieldSpec::text("last_name"),
        FieldSpec::date("dob"),
        FieldSpec::text("gender"),
        FieldSpec::text("phone_number"),
        FieldSpec::text("nin"),
        FieldSpec::text("nationality"),
        FieldSpec::text("address"),
        FieldSpec::text("occupation"),
        FieldSpec::text("status"),
        FieldSpec::bytes("fingerprints"),
        FieldSpec::bytes("photo"),
        FieldSpec::text("created_by"),
        FieldSpec::text("updated_by"),
    ];
    const REQUIRED: &'static [&'static str] = &["first_name", "last_name", "created_by"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("first_name", "first_name"),
        SearchField::contains("middle_name", "middle_name"),
        SearchField::contains("last_name", "last_name"),
        SearchField::contains("gender", "gender"),
        SearchField::contains("phone_number", "phone_number"),
        SearchField::contains("nin", "nin"),
        SearchField::contains("nationality", "nationality"),
        SearchField::contains("occupation", "occupation"),
        SearchField::contains("status", "status"),
    ];
    const AUDITED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}
