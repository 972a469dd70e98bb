//! Turning request payloads into typed column sets for inserts and partial
//! updates.

pub mod field;
pub mod payload;
pub mod update;

pub use field::{FieldKind, FieldSpec};
pub use payload::Payload;
pub use update::{Association, LinkReplace, PatchPolicy, UpdateSet};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("empty update: no recognised fields in payload")]
    EmptyUpdate,
    #[error("missing required fields: {0}")]
    MissingRequired(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}
