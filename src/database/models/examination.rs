use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::Resource;
use crate::filter::SearchField;
use crate::record::FieldSpec;

/// Medical examination of a victim
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Examination {
    pub id: i64,
    pub victim_id: Option<i64>,
    pub case_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub exam_date: NaiveDate,
    pub findings: Option<String>,
    pub treatment: Option<String>,
    pub referral: Option<String>,
    pub consent_given: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Examination {
    const TABLE: &'static str = "examinations";
    const LABEL: &'static str = "Examination";
    const COLUMNS: &'static str = "id, victim_id, case_id, facility_id, practitioner_id, exam_date, \
        findings, treatment, referral, consent_given, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::int("victim_id"),
        FieldSpec::int("case_id"),
        FieldSpec::int("facility_id"),
        FieldSpec::int("practitioner_id"),
        FieldSpec::date("exam_date"),
        FieldSpec::text("findings"),
        FieldSpec::text("treatment"),
        FieldSpec::text("referral"),
        FieldSpec::bool("consent_given"),
    ];
    const REQUIRED: &'static [&'static str] = &["exam_date"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::id("victim_id", "victim_id"),
        SearchField::id("case_id", "case_id"),
        SearchField::id("facility_id", "facility_id"),
        SearchField::id("practitioner_id", "practitioner_id"),
        SearchField::date_from("min_exam_date", "exam_date"),
        SearchField::date_to("max_exam_date", "exam_date"),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}
