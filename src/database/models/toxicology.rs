use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::quote_identifier;
use crate::database::repository::{insert_row, update_row};
use crate::database::resource::{Resource, WriteOp};
use crate::filter::SearchField;
use crate::record::{FieldSpec, PatchPolicy, Payload, RecordError, UpdateSet};

/// Toxicology / forensic report on a sick or deceased person
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ToxicologyReport {
    pub id: i64,
    pub person_id: Option<i64>,
    pub witness_id: Option<i64>,
    pub practitioner_id: Option<i64>,
    pub police_report_id: Option<i64>,
    pub date_onset: Option<NaiveDate>,
    pub date_hour_of_death: Option<DateTime<Utc>>,
    pub date_hour_of_burial: Option<DateTime<Utc>>,
    pub date_hour_of_exhumation: Option<DateTime<Utc>>,
    pub specimen_sealed_by: Option<String>,
    pub witnessed_by: Option<String>,
    pub handed_over_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PERSON_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name"),
    FieldSpec::text("occupation"),
    FieldSpec::text_list("habits"),
    FieldSpec::int("approximate_age"),
    FieldSpec::text("gender"),
    FieldSpec::text("category"),
    FieldSpec::timestamp("date_hour_of_post_mortem"),
];

const POLICE_REPORT_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("officer_id"),
    FieldSpec::date("date"),
    FieldSpec::bool("is_person_poisoned"),
    FieldSpec::bool("is_suicide_or_accident"),
    FieldSpec::bool("is_deceased_on_treatment"),
    FieldSpec::text("treatment_details"),
];

const PERSON: &str = "person";
const POLICE_REPORT: &str = "police_report";
const SYMPTOM_KEYS: &[&str] = &["symptoms", "person_symptoms"];
const SUMMARY_KEYS: &[&str] = &["summaries", "person_summaries"];
const PERSON_NESTED: &[&str] = &["symptoms", "person_symptoms", "summaries", "person_summaries"];

/// A person's link to a symptom or post-mortem finding, with its state
struct PersonLink {
    member_id: i64,
    state: Option<String>,
}

/// Read `[{<id_key>: 1, state: "severe"}, ...]` from the first present key.
/// `None` when the person payload carries none of the keys.
fn person_links(person: &Payload, keys: &[&str], id_key: &str) -> Result<Option<Vec<PersonLink>>, RecordError> {
    let Some(key) = keys.iter().copied().find(|k| person.contains(k)) else {
        return Ok(None);
    };
    let entries = person.object_list(key)?.unwrap_or_default();
    entries
        .iter()
        .map(|entry| {
            let member_id = entry
                .get(id_key)
                .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
                .ok_or_else(|| RecordError::InvalidValue {
                    field: format!("person.{}.{}", key, id_key),
                    reason: "expected an integer id".to_string(),
                })?;
            let state = entry.get("state").and_then(Value::as_str).map(str::to_string);
            Ok(PersonLink { member_id, state })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Replace the person's symptom and summary links named in the payload;
/// lists that are absent keep their current rows
async fn replace_person_links(
    conn: &mut PgConnection,
    person_id: i64,
    person: &Payload,
) -> Result<(), DatabaseError> {
    if let Some(links) = person_links(person, SYMPTOM_KEYS, "symptom_id")? {
        sqlx::query("DELETE FROM person_symptoms WHERE person_id = $1")
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        for link in links {
            sqlx::query(
                "INSERT INTO person_symptoms (person_id, symptom_id, state) VALUES ($1, $2, $3)
                 ON CONFLICT (person_id, symptom_id) DO UPDATE SET state = EXCLUDED.state",
            )
            .bind(person_id)
            .bind(link.member_id)
            .bind(link.state)
            .execute(&mut *conn)
            .await?;
        }
    }

    if let Some(links) = person_links(person, SUMMARY_KEYS, "post_mortem_summary_id")? {
        sqlx::query("DELETE FROM person_summaries WHERE person_id = $1")
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        for link in links {
            sqlx::query(
                "INSERT INTO person_summaries (person_id, post_mortem_summary_id, state) VALUES ($1, $2, $3)
                 ON CONFLICT (person_id, post_mortem_summary_id) DO UPDATE SET state = EXCLUDED.state",
            )
            .bind(person_id)
            .bind(link.member_id)
            .bind(link.state)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

async fn insert_person(conn: &mut PgConnection, person: &Payload) -> Result<i64, DatabaseError> {
    let set = UpdateSet::for_create(person, PERSON_FIELDS, &[], &[])?;
    let person_id = insert_row(&mut *conn, "persons", &set.columns).await?;
    replace_person_links(&mut *conn, person_id, person).await?;
    Ok(person_id)
}

async fn insert_police_report(conn: &mut PgConnection, report: &Payload) -> Result<i64, DatabaseError> {
    let set = UpdateSet::for_create(report, POLICE_REPORT_FIELDS, &[], &[])?;
    insert_row(&mut *conn, "police_reports", &set.columns).await
}

/// Column set for a nested row update, or `None` when the object only
/// carries link lists (or nothing the policy writes)
fn nested_update(
    payload: &Payload,
    fields: &[FieldSpec],
    nested: &[&str],
    policy: PatchPolicy,
) -> Result<Option<UpdateSet>, RecordError> {
    match UpdateSet::for_update(payload, fields, &[], nested, policy) {
        Ok(set) if set.columns.is_empty() => Ok(None),
        Ok(set) => Ok(Some(set)),
        Err(RecordError::EmptyUpdate) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn point_report_at(conn: &mut PgConnection, id: i64, column: &str, target: i64) -> Result<(), DatabaseError> {
    sqlx::query(&format!(
        "UPDATE toxicology_reports SET {} = $1, updated_at = now() WHERE id = $2",
        quote_identifier(column)
    ))
    .bind(target)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Resource for ToxicologyReport {
    const TABLE: &'static str = "toxicology_reports";
    const LABEL: &'static str = "Toxicology report";
    const COLUMNS: &'static str = "id, person_id, witness_id, practitioner_id, police_report_id, \
        date_onset, date_hour_of_death, date_hour_of_burial, date_hour_of_exhumation, \
        specimen_sealed_by, witnessed_by, handed_over_to, created_at, updated_at";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::int("person_id"),
        FieldSpec::int("witness_id"),
        FieldSpec::int("practitioner_id"),
        FieldSpec::int("police_report_id"),
        FieldSpec::date("date_onset"),
        FieldSpec::timestamp("date_hour_of_death"),
        FieldSpec::timestamp("date_hour_of_burial"),
        FieldSpec::timestamp("date_hour_of_exhumation"),
        FieldSpec::text("specimen_sealed_by"),
        FieldSpec::text("witnessed_by"),
        FieldSpec::text("handed_over_to"),
    ];
    const REQUIRED: &'static [&'static str] = &[];
    const SEARCH: &'static [SearchField] = &[
        SearchField::id("person_id", "person_id"),
        SearchField::id("practitioner_id", "practitioner_id"),
        SearchField::contains("specimen_sealed_by", "specimen_sealed_by"),
        SearchField::contains("handed_over_to", "handed_over_to"),
        SearchField::date_from("min_date_onset", "date_onset"),
        SearchField::date_to("max_date_onset", "date_onset"),
    ];

    const NESTED: &'static [&'static str] = &[PERSON, POLICE_REPORT];

    fn id(&self) -> i64 {
        self.id
    }

    /// Store the nested person and police report first and point the report
    /// at them
    async fn before_create(conn: &mut PgConnection, payload: &mut Payload) -> Result<(), DatabaseError> {
        if let Some(person) = payload.object(PERSON)? {
            let person_id = insert_person(&mut *conn, &person).await?;
            payload.set("person_id", Value::from(person_id));
        }

        if let Some(report) = payload.object(POLICE_REPORT)? {
            let report_id = insert_police_report(&mut *conn, &report).await?;
            payload.set("police_report_id", Value::from(report_id));
        }
        Ok(())
    }

    /// On update, save the nested person and police report in place, or
    /// create them when the report has none yet
    async fn after_write(
        conn: &mut PgConnection,
        id: i64,
        payload: &Payload,
        op: WriteOp,
        policy: PatchPolicy,
    ) -> Result<(), DatabaseError> {
        if op != WriteOp::Update {
            return Ok(());
        }
        let person = payload.object(PERSON)?;
        let report = payload.object(POLICE_REPORT)?;
        if person.is_none() && report.is_none() {
            return Ok(());
        }

        let (person_id, report_id): (Option<i64>, Option<i64>) =
            sqlx::query_as("SELECT person_id, police_report_id FROM toxicology_reports WHERE id = $1")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

        if let Some(person) = person {
            match person_id {
                Some(person_id) => {
                    if let Some(set) = nested_update(&person, PERSON_FIELDS, PERSON_NESTED, policy)? {
                        update_row(&mut *conn, "persons", &set.columns, person_id).await?;
                    }
                    replace_person_links(&mut *conn, person_id, &person).await?;
                }
                None => {
                    let person_id = insert_person(&mut *conn, &person).await?;
                    point_report_at(&mut *conn, id, "person_id", person_id).await?;
                }
            }
        }

        if let Some(report) = report {
            match report_id {
                Some(report_id) => {
                    if let Some(set) = nested_update(&report, POLICE_REPORT_FIELDS, &[], policy)? {
                        update_row(&mut *conn, "police_reports", &set.columns, report_id).await?;
                    }
                }
                None => {
                    let report_id = insert_police_report(&mut *conn, &report).await?;
                    point_report_at(&mut *conn, id, "police_report_id", report_id).await?;
                }
            }
        }
        Ok(())
    }

    /// The person (with its symptom and summary links) and the police report
    /// belong to the report and go with it
    async fn before_delete(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
        let owned: Option<(Option<i64>, Option<i64>)> = sqlx::query_as(
            "SELECT person_id, police_report_id FROM toxicology_reports WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        let Some((person_id, report_id)) = owned else {
            return Ok(());
        };

        if let Some(person_id) = person_id {
            sqlx::query("DELETE FROM person_symptoms WHERE person_id = $1")
                .bind(person_id)
                .execute(&mut *conn)
                .await?;
            sqlx::query("DELETE FROM person_summaries WHERE person_id = $1")
                .bind(person_id)
                .execute(&mut *conn)
                .await?;
            sqlx::query("DELETE FROM persons WHERE id = $1")
                .bind(person_id)
                .execute(&mut *conn)
                .await?;
        }
        if let Some(report_id) = report_id {
            sqlx::query("DELETE FROM police_reports WHERE id = $1")
                .bind(report_id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn related(pool: &PgPool, id: i64) -> Result<Map<String, Value>, DatabaseError> {
        let mut extra = Map::new();

        let person: Option<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(p) FROM persons p
             JOIN toxicology_reports t ON t.person_id = p.id
             WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        if let Some(Value::Object(mut person)) = person {
            let person_id = person.get("id").and_then(Value::as_i64).unwrap_or_default();

            let symptoms: Value = sqlx::query_scalar(
                "SELECT COALESCE(jsonb_agg(jsonb_build_object(
                        'symptom_id', s.id, 'name', s.name, 'state', ps.state) ORDER BY s.id), '[]'::jsonb)
                 FROM person_symptoms ps
                 JOIN symptoms s ON s.id = ps.symptom_id
                 WHERE ps.person_id = $1",
            )
            .bind(person_id)
            .fetch_one(pool)
            .await?;

            let summaries: Value = sqlx::query_scalar(
                "SELECT COALESCE(jsonb_agg(jsonb_build_object(
                        'post_mortem_summary_id', m.id, 'description', m.description, 'state', ps.state)
                        ORDER BY m.id), '[]'::jsonb)
                 FROM person_summaries ps
                 JOIN post_mortem_summaries m ON m.id = ps.post_mortem_summary_id
                 WHERE ps.person_id = $1",
            )
            .bind(person_id)
            .fetch_one(pool)
            .await?;

            person.insert("symptoms".to_string(), symptoms);
            person.insert("summaries".to_string(), summaries);
            extra.insert("person".to_string(), Value::Object(person));
        }

        let police_report: Option<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(r) FROM police_reports r
             JOIN toxicology_reports t ON t.police_report_id = r.id
             WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        if let Some(report) = police_report {
            extra.insert("police_report".to_string(), report);
        }

        Ok(extra)
    }
}
