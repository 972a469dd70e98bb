use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::resource::Resource;
use crate::database::service;
use crate::filter::SearchField;
use crate::record::{Association, FieldSpec};

/// Officer row as returned by the API; the password hash is never selected
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PoliceOfficer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    pub badge_no: String,
    pub phone: String,
    pub post_id: Option<i64>,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
impl Resource for PoliceOfficer {
    const TABLE: &'static str = "police_officers";
    const LABEL: &'static str = "Police officer";
    const COLUMNS: &'static str = "id, first_name, last_name, rank, badge_no, phone, post_id, \
        username, email, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("first_name"),
        FieldSpec::text("last_name"),
        FieldSpec::text("rank"),
        FieldSpec::text("badge_no"),
        FieldSpec::text("phone"),
        FieldSpec::int("post_id"),
        FieldSpec::text("username"),
        FieldSpec::text("email"),
        FieldSpec::secret("password"),
    ];
    const REQUIRED: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "rank",
        "badge_no",
        "phone",
        "post_id",
        "username",
        "email",
        "password",
    ];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("first_name", "first_name"),
        SearchField::contains("last_name", "last_name"),
        SearchField::contains("badge_no", "badge_no"),
        SearchField::contains("username", "username"),
        SearchField::id("post_id", "post_id"),
    ];
    const ASSOCIATIONS: &'static [Association] = &[Association {
        key: "role_ids",
        link_table: "officer_roles",
        owner_column: "officer_id",
        member_column: "role_id",
        member_table: "roles",
    }];

    fn id(&self) -> i64 {
        self.id
    }

    async fn related(pool: &PgPool, id: i64) -> Result<Map<String, Value>, DatabaseError> {
        let roles = service::find_role_names(pool, id).await?;
        let mut extra = Map::new();
        extra.insert("roles".to_string(), Value::from(roles));
        Ok(extra)
    }
}
