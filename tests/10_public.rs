mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn root_responds_with_plain_text() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Artifacts is running");
    Ok(())
}

#[tokio::test]
async fn health_reports_store_status() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn unreachable_store_fails_health_and_hides_detail() -> Result<()> {
    let server = common::spawn_server_with(Arc::new(common::OfflineStore)).await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["error"], "Database unavailable");

    let res = server.client.get(server.url("/artifacts")).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Internal server error");
    Ok(())
}

#[tokio::test]
async fn list_starts_empty_and_grows() -> Result<()> {
    let server = common::spawn_server().await?;

    let body = server.client.get(server.url("/artifacts")).send().await?.json::<Value>().await?;
    assert_eq!(body, json!([]));

    server.create_artifact(&common::sample_artifact("Vase", "a@x.com"), "a@x.com").await?;
    server.create_artifact(&common::sample_artifact("Spear", "b@x.com"), "b@x.com").await?;

    let body = server.client.get(server.url("/artifacts")).send().await?.json::<Value>().await?;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Vase", "Spear"]);
    Ok(())
}

#[tokio::test]
async fn get_by_id_returns_the_artifact_with_hex_id() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_artifact(&common::sample_artifact("Vase", "a@x.com"), "a@x.com").await?;

    let body = server.get_artifact(&id).await?;
    assert_eq!(body["_id"], json!(id));
    assert_eq!(body["name"], "Vase");
    assert_eq!(body["addedBy"]["email"], "a@x.com");
    Ok(())
}

#[tokio::test]
async fn get_by_unknown_id_returns_null() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/artifacts/64b7f0c2a1b2c3d4e5f60718")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn get_by_malformed_id_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/artifacts/not-an-id")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Invalid artifact ID format");
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn search_requires_a_query() -> Result<()> {
    let server = common::spawn_server().await?;

    for path in ["/search-artifacts", "/search-artifacts?q="] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(res.json::<Value>().await?["error"], "Search query is required");
    }
    Ok(())
}

#[tokio::test]
async fn search_matches_exactly_the_searchable_fields() -> Result<()> {
    let server = common::spawn_server().await?;

    let mut helmet = common::sample_artifact("Helmet", "a@x.com");
    helmet["type"] = json!("Bronze armour");
    let mut mirror = common::sample_artifact("Mirror", "a@x.com");
    mirror["presentLocation"] = json!("BRONZE AGE GALLERY");
    // imageUrl is not searched
    let mut scroll = common::sample_artifact("Scroll", "a@x.com");
    scroll["imageUrl"] = json!("https://images.example.com/bronze.jpg");

    let helmet_id = server.create_artifact(&helmet, "a@x.com").await?;
    let mirror_id = server.create_artifact(&mirror, "a@x.com").await?;
    server.create_artifact(&scroll, "a@x.com").await?;

    let res = server.client.get(server.url("/search-artifacts?q=bronze")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["_id"].as_str())
        .collect();
    assert_eq!(ids, vec![helmet_id.as_str(), mirror_id.as_str()]);
    Ok(())
}

#[tokio::test]
async fn search_treats_the_query_literally() -> Result<()> {
    let server = common::spawn_server().await?;
    server.create_artifact(&common::sample_artifact("Vase", "a@x.com"), "a@x.com").await?;

    let res = server.client.get(server.url("/search-artifacts?q=.*")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}
