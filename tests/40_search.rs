mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn victim_search_matches_substrings_and_exact_fields() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;
    let marker = common::unique("Srch");

    for (first, gender) in [("Amina", "female"), ("Aminata", "female"), ("Brian", "male")] {
        let res = client
            .post(server.url("/api/victim"))
            .json(&json!({ "first_name": first, "last_name": marker, "gender": gender }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = client
        .get(server.url(&format!("/api/victims/search?lastname={}&firstname=amin", marker)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["pagination"]["total_items"], 2);

    let body: Value = client
        .get(server.url(&format!("/api/victims/search?last_name={}&gender=male", marker)))
        .send()
        .await?
        .json()
        .await?;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["first_name"], "Brian");
    Ok(())
}

#[tokio::test]
async fn like_wildcards_are_literal() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;
    let marker = common::unique("Wild");

    client
        .post(server.url("/api/victim"))
        .json(&json!({ "first_name": "Plain", "last_name": marker }))
        .send()
        .await?;

    let body: Value = client
        .get(server.url(&format!("/api/victims/search?last_name={}&first_name=%25", marker)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["pagination"]["total_items"], 0);
    Ok(())
}

#[tokio::test]
async fn arrest_date_range_and_invalid_params() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;
    let location = common::unique("Loc");

    for date in ["2023-01-10", "2023-06-15", "2024-02-01"] {
        let res = client
            .post(server.url("/api/arrest"))
            .json(&json!({ "arrest_date": date, "location": location, "officer_name": "Okello" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = client
        .get(server.url(&format!(
            "/api/arrests/search?location={}&min_arrest_date=2023-01-01&max_arrest_date=2023-12-31",
            location
        )))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["pagination"]["total_items"], 2);

    // Unparsable dates are dropped in the default (lenient) mode
    let res = client
        .get(server.url(&format!("/api/arrests/search?location={}&min_arrest_date=yesterday", location)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["pagination"]["total_items"], 3);
    Ok(())
}
