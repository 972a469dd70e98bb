use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::field::{is_zero, FieldKind, FieldSpec};
use super::payload::Payload;
use super::RecordError;
use crate::database::value::SqlValue;

/// How an update payload decides which columns to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchPolicy {
    /// Write every allow-listed key that is present; `null` clears the column
    Presence,
    /// Write only present keys holding a non-zero value
    NonZero,
}

impl Default for PatchPolicy {
    fn default() -> Self {
        PatchPolicy::Presence
    }
}

impl FromStr for PatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(PatchPolicy::Presence),
            "non_zero" | "nonzero" | "non-zero" => Ok(PatchPolicy::NonZero),
            other => Err(format!("unknown patch policy: {}", other)),
        }
    }
}

/// Many-to-many link owned by a resource, replaced wholesale on write
#[derive(Debug)]
pub struct Association {
    /// Payload key carrying the member ids, e.g. `role_ids`
    pub key: &'static str,
    pub link_table: &'static str,
    pub owner_column: &'static str,
    pub member_column: &'static str,
    pub member_table: &'static str,
}

#[derive(Debug, Clone)]
pub struct LinkReplace {
    pub association: &'static Association,
    pub ids: Vec<i64>,
}

/// Columns and link replacements extracted from one payload
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    pub columns: Vec<(&'static str, SqlValue)>,
    pub links: Vec<LinkReplace>,
}

impl UpdateSet {
    /// Column set for an insert. Null and absent fields fall back to column
    /// defaults; every `required` field must end up with a value.
    pub fn for_create(
        payload: &Payload,
        fields: &[FieldSpec],
        required: &[&str],
        associations: &'static [Association],
    ) -> Result<Self, RecordError> {
        let mut set = UpdateSet::default();

        for field in fields {
            if let Some(value) = column_value(payload, field)? {
                if !value.is_null() {
                    set.columns.push((field.name, value));
                }
            }
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !set.columns.iter().any(|(c, v)| c == name && !is_blank(v)))
            .collect();
        if !missing.is_empty() {
            return Err(RecordError::MissingRequired(missing.join(", ")));
        }

        for association in associations {
            if let Some(ids) = payload.id_list(association.key)? {
                if !ids.is_empty() {
                    set.links.push(LinkReplace { association, ids });
                }
            }
        }

        Ok(set)
    }

    /// Column set for a partial update. `nested` names payload keys handled by
    /// resource hooks; they count as content for the empty-update check.
    pub fn for_update(
        payload: &Payload,
        fields: &[FieldSpec],
        associations: &'static [Association],
        nested: &[&str],
        policy: PatchPolicy,
    ) -> Result<Self, RecordError> {
        let mut set = UpdateSet::default();

        for field in fields {
            if policy == PatchPolicy::NonZero && is_zero_entry(payload, field) {
                continue;
            }
            if let Some(value) = column_value(payload, field)? {
                set.columns.push((field.name, value));
            }
        }

        for association in associations {
            if let Some(ids) = payload.id_list(association.key)? {
                if policy == PatchPolicy::NonZero && ids.is_empty() {
                    continue;
                }
                set.links.push(LinkReplace { association, ids });
            }
        }

        let has_nested = nested.iter().any(|key| match payload.get(key) {
            Some(v) => policy == PatchPolicy::Presence || !is_zero(v),
            None => false,
        });

        if set.columns.is_empty() && set.links.is_empty() && !has_nested {
            return Err(RecordError::EmptyUpdate);
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.links.is_empty()
    }
}

/// Present value for a field, preferring an uploaded blob for byte columns
fn column_value(payload: &Payload, field: &FieldSpec) -> Result<Option<SqlValue>, RecordError> {
    if field.kind == FieldKind::Bytes {
        if let Some(blob) = payload.blob(field.name) {
            return Ok(Some(SqlValue::Bytes(Some(blob.to_vec()))));
        }
    }
    match payload.get(field.name) {
        Some(value) => field.to_sql(value).map(Some),
        None => Ok(None),
    }
}

fn is_zero_entry(payload: &Payload, field: &FieldSpec) -> bool {
    if field.kind == FieldKind::Bytes {
        if let Some(blob) = payload.blob(field.name) {
            return blob.is_empty();
        }
    }
    payload.get(field.name).map(is_zero).unwrap_or(true)
}

fn is_blank(value: &SqlValue) -> bool {
    match value {
        SqlValue::Text(Some(s)) => s.trim().is_empty(),
        other => other.is_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::text("first_name"),
        FieldSpec::text("last_name"),
        FieldSpec::text("address"),
        FieldSpec::int("post_id"),
        FieldSpec::bool("consent_given"),
        FieldSpec::bytes("photo"),
    ];

    static ROLES: Association = Association {
        key: "role_ids",
        link_table: "officer_roles",
        owner_column: "officer_id",
        member_column: "role_id",
        member_table: "roles",
    };
    static ASSOCIATIONS: [Association; 0] = [];

    fn roles() -> &'static [Association] {
        std::slice::from_ref(&ROLES)
    }

    fn payload(value: serde_json::Value) -> Payload {
        Payload::from_json(value).unwrap()
    }

    #[test]
    fn policy_parses_from_env_strings() {
        assert_eq!("presence".parse::<PatchPolicy>().unwrap(), PatchPolicy::Presence);
        assert_eq!("NON_ZERO".parse::<PatchPolicy>().unwrap(), PatchPolicy::NonZero);
        assert!("sometimes".parse::<PatchPolicy>().is_err());
    }

    #[test]
    fn presence_writes_only_present_keys() {
        let set = UpdateSet::for_update(
            &payload(json!({ "address": "Plot 4" })),
            FIELDS,
            &ASSOCIATIONS,
            &[],
            PatchPolicy::Presence,
        )
        .unwrap();
        assert_eq!(set.columns, vec![("address", SqlValue::text("Plot 4"))]);
    }

    #[test]
    fn presence_null_clears_and_zero_values_are_written() {
        let set = UpdateSet::for_update(
            &payload(json!({ "address": null, "first_name": "", "post_id": 0, "consent_given": false })),
            FIELDS,
            &ASSOCIATIONS,
            &[],
            PatchPolicy::Presence,
        )
        .unwrap();
        assert_eq!(
            set.columns,
            vec![
                ("first_name", SqlValue::text("")),
                ("address", SqlValue::Text(None)),
                ("post_id", SqlValue::Int(Some(0))),
                ("consent_given", SqlValue::Bool(Some(false))),
            ]
        );
    }

    #[test]
    fn non_zero_skips_zero_values() {
        let set = UpdateSet::for_update(
            &payload(json!({ "address": "", "first_name": "Amina", "post_id": 0 })),
            FIELDS,
            &ASSOCIATIONS,
            &[],
            PatchPolicy::NonZero,
        )
        .unwrap();
        assert_eq!(set.columns, vec![("first_name", SqlValue::text("Amina"))]);
    }

    #[test]
    fn all_zero_payload_is_empty_update_under_non_zero() {
        let err = UpdateSet::for_update(
            &payload(json!({ "address": "", "post_id": 0, "consent_given": false, "role_ids": [] })),
            FIELDS,
            roles(),
            &[],
            PatchPolicy::NonZero,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::EmptyUpdate));
    }

    #[test]
    fn unknown_keys_only_is_empty_update() {
        let err = UpdateSet::for_update(
            &payload(json!({ "nickname": "JD", "id": 9 })),
            FIELDS,
            &ASSOCIATIONS,
            &[],
            PatchPolicy::Presence,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::EmptyUpdate));
    }

    #[test]
    fn empty_association_list_replaces_under_presence() {
        let set = UpdateSet::for_update(
            &payload(json!({ "role_ids": [] })),
            FIELDS,
            roles(),
            &[],
            PatchPolicy::Presence,
        )
        .unwrap();
        assert!(set.columns.is_empty());
        assert_eq!(set.links.len(), 1);
        assert!(set.links[0].ids.is_empty());
    }

    #[test]
    fn nested_keys_count_as_content() {
        let set = UpdateSet::for_update(
            &payload(json!({ "charges": [{ "charge_title": "Assault" }] })),
            FIELDS,
            &ASSOCIATIONS,
            &["charges"],
            PatchPolicy::Presence,
        )
        .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn wrong_type_is_invalid() {
        let err = UpdateSet::for_update(
            &payload(json!({ "post_id": "north" })),
            FIELDS,
            &ASSOCIATIONS,
            &[],
            PatchPolicy::Presence,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::InvalidValue { .. }));
    }

    #[test]
    fn create_reports_all_missing_required_fields() {
        let err = UpdateSet::for_create(
            &payload(json!({ "first_name": " ", "address": "Plot 4" })),
            FIELDS,
            &["first_name", "last_name"],
            &ASSOCIATIONS,
        )
        .unwrap_err();
        match err {
            RecordError::MissingRequired(names) => assert_eq!(names, "first_name, last_name"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn create_skips_nulls_and_prefers_blobs() {
        let mut p = payload(json!({ "first_name": "Jane", "last_name": "Doe", "address": null }));
        p.blobs.insert("photo".to_string(), vec![1, 2, 3]);
        let set = UpdateSet::for_create(&p, FIELDS, &["first_name"], &ASSOCIATIONS).unwrap();
        let names: Vec<&str> = set.columns.iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!["first_name", "last_name", "photo"]);
    }
}
