use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::filter::SearchField;
use crate::record::{Association, FieldSpec, Payload, PatchPolicy};

/// Who is performing a write; used to stamp audit columns
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
}

/// A stored entity kind. The constants describe its table and the payload
/// and query surface; the hooks cover nested rows that live in other tables.
#[async_trait]
pub trait Resource:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    /// Human label for messages, e.g. "Victim"
    const LABEL: &'static str;
    /// Select list that maps onto the row struct
    const COLUMNS: &'static str;
    const FIELDS: &'static [FieldSpec];
    const REQUIRED: &'static [&'static str];
    const SEARCH: &'static [SearchField];
    const ASSOCIATIONS: &'static [Association] = &[];
    /// Payload keys consumed by hooks rather than columns
    const NESTED: &'static [&'static str] = &[];
    /// Stamp `created_by` / `updated_by` from the actor
    const AUDITED: bool = false;

    fn id(&self) -> i64;

    /// Runs inside the create transaction before the column set is built
    async fn before_create(_conn: &mut PgConnection, _payload: &mut Payload) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Runs inside the write transaction after the row and its links are
    /// stored. `policy` is the one the column set was built with.
    async fn after_write(
        _conn: &mut PgConnection,
        _id: i64,
        _payload: &Payload,
        _op: WriteOp,
        _policy: PatchPolicy,
    ) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Runs inside the delete transaction before the row itself is removed
    async fn before_delete(_conn: &mut PgConnection, _id: i64) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Extra data embedded in single-record reads
    async fn related(_pool: &PgPool, _id: i64) -> Result<Map<String, Value>, DatabaseError> {
        Ok(Map::new())
    }
}

/// A row plus whatever its resource embeds on single-record reads
#[derive(Debug, Serialize)]
pub struct Record<R> {
    #[serde(flatten)]
    pub row: R,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<R> Record<R> {
    pub fn new(row: R) -> Self {
        Self { row, extra: Map::new() }
    }
}
