mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_id(client: &reqwest::Client, url: String, body: Value) -> Result<i64> {
    let res = client.post(url).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    Ok(body["data"]["id"].as_i64().unwrap())
}

async fn count(pool: &sqlx::PgPool, query: &str, id: i64) -> Result<i64> {
    Ok(sqlx::query_scalar(query).bind(id).fetch_one(pool).await?)
}

#[tokio::test]
async fn nested_person_and_police_report_lifecycle() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;
    let pool = common::db().await?;

    let fever = create_id(&client, server.url("/api/symptom"), json!({ "name": common::unique("fever") })).await?;
    let rash = create_id(&client, server.url("/api/symptom"), json!({ "name": common::unique("rash") })).await?;
    let summary = create_id(
        &client,
        server.url("/api/post-mortem-summary"),
        json!({ "description": "Gastric contents collected" }),
    )
    .await?;

    let report_id = create_id(
        &client,
        server.url("/api/toxicology-report"),
        json!({
            "date_onset": "2024-01-05",
            "specimen_sealed_by": "Dr. Achieng",
            "person": {
                "name": "Unknown adult",
                "approximate_age": 35,
                "symptoms": [{ "symptom_id": fever, "state": "severe" }],
                "summaries": [{ "post_mortem_summary_id": summary }]
            },
            "police_report": { "date": "2024-01-06", "is_person_poisoned": true }
        }),
    )
    .await?;
    let item = server.url(&format!("/api/toxicology-report/{}", report_id));

    let body: Value = client.get(&item).send().await?.json().await?;
    let person_id = body["data"]["person_id"].as_i64().unwrap();
    let police_report_id = body["data"]["police_report_id"].as_i64().unwrap();
    assert_eq!(body["data"]["person"]["symptoms"][0]["symptom_id"], fever);

    // Nested objects alone are a valid update; the symptom list is replaced,
    // the summary list is left as it was
    let res = client
        .put(&item)
        .json(&json!({
            "person": { "occupation": "Farmer", "symptoms": [{ "symptom_id": rash }] },
            "police_report": { "treatment_details": "Activated charcoal" }
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let person = &body["data"]["person"];
    assert_eq!(person["occupation"], "Farmer");
    assert_eq!(person["name"], "Unknown adult");
    assert_eq!(person["symptoms"].as_array().unwrap().len(), 1);
    assert_eq!(person["symptoms"][0]["symptom_id"], rash);
    assert_eq!(person["summaries"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["police_report"]["treatment_details"], "Activated charcoal");
    assert_eq!(body["data"]["police_report"]["is_person_poisoned"], true);
    assert_eq!(body["data"]["person_id"], person_id);

    // Deleting the report takes its person, links and police report with it
    let res = client.delete(&item).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM persons WHERE id = $1", person_id).await?, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM person_symptoms WHERE person_id = $1", person_id).await?, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM person_summaries WHERE person_id = $1", person_id).await?, 0);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM police_reports WHERE id = $1", police_report_id).await?,
        0
    );

    // Shared reference data stays
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM symptoms WHERE id = $1", fever).await?, 1);
    Ok(())
}

#[tokio::test]
async fn update_creates_missing_nested_rows() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;

    let report_id = create_id(
        &client,
        server.url("/api/toxicology-report"),
        json!({ "handed_over_to": "Government analyst" }),
    )
    .await?;
    let item = server.url(&format!("/api/toxicology-report/{}", report_id));

    let res = client
        .put(&item)
        .json(&json!({ "police_report": { "date": "2024-02-01" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(body["data"]["police_report_id"].as_i64().is_some());
    assert_eq!(body["data"]["police_report"]["date"], "2024-02-01");
    assert!(body["data"]["person_id"].is_null());

    client.delete(&item).send().await?;
    Ok(())
}
