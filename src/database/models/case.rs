use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgConnection};

use super::charge::Charge;
use crate::database::manager::DatabaseError;
use crate::database::repository::insert_row;
use crate::database::resource::{Resource, WriteOp};
use crate::filter::SearchField;
use crate::record::{Association, FieldSpec, PatchPolicy, Payload, RecordError, UpdateSet};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Case {
    pub id: i64,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub date_opened: Option<NaiveDate>,
    pub officer_id: Option<i64>,
    pub police_post_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CHARGES: &str = "charges";
const CHARGE_IDS: &str = "charge_ids";

/// Nested charges to store, or `None` when the payload leaves them alone.
/// An empty list counts as absent under `NonZero`.
fn nested_charges(payload: &Payload, policy: PatchPolicy) -> Result<Option<Vec<Map<String, Value>>>, RecordError> {
    match payload.object_list(CHARGES)? {
        Some(charges) if charges.is_empty() && policy == PatchPolicy::NonZero => Ok(None),
        other => Ok(other),
    }
}

#[async_trait]
impl Resource for Case {
    const TABLE: &'static str = "cases";
    const LABEL: &'static str = "Case";
    const COLUMNS: &'static str = "id, case_number, title, description, status, date_opened, \
        officer_id, police_post_id, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("case_number"),
        FieldSpec::text("title"),
        FieldSpec::text("description"),
        FieldSpec::text("status"),
        FieldSpec::date("date_opened"),
        FieldSpec::int("officer_id"),
        FieldSpec::int("police_post_id"),
    ];
    const REQUIRED: &'static [&'static str] = &["case_number", "title"];
    const SEARCH: &'static [SearchField] = &[
        SearchField::contains("case_number", "case_number"),
        SearchField::contains("title", "title"),
        SearchField::contains("status", "status"),
        SearchField::id("police_post_id", "police_post_id"),
        SearchField::id("officer_id", "officer_id"),
    ];
    const ASSOCIATIONS: &'static [Association] = &[
        Association {
            key: "victim_ids",
            link_table: "case_victims",
            owner_column: "case_id",
            member_column: "victim_id",
            member_table: "victims",
        },
        Association {
            key: "suspect_ids",
            link_table: "case_suspects",
            owner_column: "case_id",
            member_column: "suspect_id",
            member_table: "suspects",
        },
        Association {
            key: CHARGE_IDS,
            link_table: "case_charges",
            owner_column: "case_id",
            member_column: "charge_id",
            member_table: "charges",
        },
    ];
    const NESTED: &'static [&'static str] = &[CHARGES];

    fn id(&self) -> i64 {
        self.id
    }

    /// Insert nested `charges` and link them to the case. When the update
    /// carries `charges` without `charge_ids`, the new charges replace the
    /// existing links.
    async fn after_write(
        conn: &mut PgConnection,
        id: i64,
        payload: &Payload,
        op: WriteOp,
        policy: PatchPolicy,
    ) -> Result<(), DatabaseError> {
        let Some(charges) = nested_charges(payload, policy)? else {
            return Ok(());
        };

        if op == WriteOp::Update && !payload.contains(CHARGE_IDS) {
            sqlx::query("DELETE FROM case_charges WHERE case_id = $1")
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }

        for charge in charges {
            let charge = Payload::from_json(charge.into())?;
            let set = UpdateSet::for_create(&charge, Charge::FIELDS, Charge::REQUIRED, &[])?;
            let charge_id = insert_row(&mut *conn, Charge::TABLE, &set.columns).await?;
            sqlx::query(
                "INSERT INTO case_charges (case_id, charge_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(charge_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
