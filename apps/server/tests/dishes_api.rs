#![allow(unused)]
//! HTTP contract of the dish endpoints.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::*;

fn detail(body: &[u8]) -> anyhow::Result<String> {
    let json: Value = serde_json::from_slice(body)?;
    Ok(json["detail"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn create_read_update_delete_over_http() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    "/dishes",
                    Some(to_json_body(&json!({
                        "name": "番茄炒蛋",
                        "description": "小雨淅沥"
                    }))?),
                )
                .await?;
            assert_status(status, StatusCode::CREATED, "create");
            let created: Value = serde_json::from_slice(&body)?;
            let id = created["id"].as_i64().expect("numeric id");
            assert_eq!(created["name"], "番茄炒蛋");
            assert_eq!(created["created_at"], created["updated_at"]);

            let (status, _, body) = app
                .request(Method::GET, &format!("/dishes/{id}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "read");
            let read: Value = serde_json::from_slice(&body)?;
            assert_eq!(read, created);

            let (status, _, body) = app
                .request(
                    Method::GET,
                    &format!("/dishes/by-name/{}", urlencoding::encode("番茄炒蛋")),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "read by name");
            let by_name: Value = serde_json::from_slice(&body)?;
            assert_eq!(by_name["id"], id);

            let (status, _, body) = app
                .request(
                    Method::PUT,
                    &format!("/dishes/{id}"),
                    Some(to_json_body(&json!({ "description": "new" }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update");
            let updated: Value = serde_json::from_slice(&body)?;
            assert_eq!(updated["name"], "番茄炒蛋");
            assert_eq!(updated["description"], "new");

            let (status, _, body) = app
                .request(Method::DELETE, &format!("/dishes/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete");
            assert!(body.is_empty());

            let (status, _, _) = app
                .request(Method::DELETE, &format!("/dishes/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "second delete");

            let (status, _, body) = app
                .request(Method::GET, &format!("/dishes/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "read after delete");
            assert!(detail(&body)?.contains("not found"));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_name_is_conflict() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = to_json_body(&json!({ "name": "佛跳墙" }))?;
            let (status, _, _) = app
                .request(Method::POST, "/dishes", Some(payload.clone()))
                .await?;
            assert_status(status, StatusCode::CREATED, "first create");

            let (status, _, body) = app.request(Method::POST, "/dishes", Some(payload)).await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate create");
            assert!(detail(&body)?.contains("佛跳墙"));

            let other = app.create_dish("葱烧海参", None).await?;
            let (status, _, _) = app
                .request(
                    Method::PUT,
                    &format!("/dishes/{}", other.id),
                    Some(to_json_body(&json!({ "name": "佛跳墙" }))?),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "rename onto taken name");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (method, body) in [
                (Method::GET, None),
                (Method::PUT, Some(to_json_body(&json!({ "name": "x" }))?)),
                (Method::DELETE, None),
            ] {
                let (status, _, _) = app.request(method.clone(), "/dishes/999", body).await?;
                assert_status(status, StatusCode::NOT_FOUND, method.as_str());
            }

            let (status, _, _) = app
                .request(Method::GET, "/dishes/by-name/nothing", None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "by name");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn non_numeric_ids_are_unprocessable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (method, body) in [
                (Method::GET, None),
                (Method::PUT, Some(to_json_body(&json!({ "name": "x" }))?)),
                (Method::DELETE, None),
            ] {
                let (status, _, body) = app.request(method.clone(), "/dishes/abc", body).await?;
                assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, method.as_str());
                assert!(!detail(&body)?.is_empty());
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invalid_payloads_are_unprocessable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let long_name = "x".repeat(101);
            let long_description = "y".repeat(501);
            for payload in [
                json!({ "name": "" }),
                json!({ "name": long_name }),
                json!({ "name": "ok", "description": long_description }),
                json!({ "description": "name is required" }),
                json!({ "name": 42 }),
            ] {
                let (status, _, body) = app
                    .request(Method::POST, "/dishes", Some(to_json_body(&payload)?))
                    .await?;
                assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, &payload.to_string());
                assert!(!detail(&body)?.is_empty());
            }

            let (status, _, _) = app
                .request(Method::POST, "/dishes", Some(b"{not json".to_vec()))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed json");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn null_fields_in_update_are_ignored() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let dish = app.create_dish("金汤花胶鸡", Some("rich")).await?;

            let (status, _, body) = app
                .request(
                    Method::PUT,
                    &format!("/dishes/{}", dish.id),
                    Some(to_json_body(&json!({ "name": null, "description": null }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "null patch");
            let unchanged: Value = serde_json::from_slice(&body)?;
            assert_eq!(unchanged["name"], "金汤花胶鸡");
            assert_eq!(unchanged["description"], "rich");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_validates_paging_but_not_sort_key() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for name in ["b", "a", "c"] {
                app.create_dish(name, None).await?;
            }

            for query in [
                "limit=0",
                "limit=101",
                "offset=-1",
                "direction=sideways",
                "limit=abc",
            ] {
                let (status, _, _) = app
                    .request(Method::GET, &format!("/dishes?{query}"), None)
                    .await?;
                assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, query);
            }

            let (status, _, by_id) = app.request(Method::GET, "/dishes?order_by=id", None).await?;
            assert_status(status, StatusCode::OK, "order by id");
            let (status, _, by_bogus) = app
                .request(Method::GET, "/dishes?order_by=description", None)
                .await?;
            assert_status(status, StatusCode::OK, "order by unknown key");
            assert_eq!(by_id, by_bogus);

            let (status, _, body) = app
                .request(
                    Method::GET,
                    "/dishes?order_by=name&direction=DESC&limit=2&offset=0",
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "sorted page");
            let names: Vec<String> = serde_json::from_slice::<Vec<Value>>(&body)?
                .into_iter()
                .filter_map(|d| d["name"].as_str().map(str::to_string))
                .collect();
            assert_eq!(names, ["c", "b"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_search_filters_results() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.create_dish("Tomato Soup", None).await?;
            app.create_dish("Mapo Tofu", Some("spicy, not tomato based")).await?;
            app.create_dish("Fried Rice", None).await?;

            let (status, _, body) = app
                .request(Method::GET, "/dishes?search=TOMATO", None)
                .await?;
            assert_status(status, StatusCode::OK, "search");
            let hits: Vec<Value> = serde_json::from_slice(&body)?;
            assert_eq!(hits.len(), 2);

            let (status, _, body) = app.request(Method::GET, "/dishes", None).await?;
            assert_status(status, StatusCode::OK, "list all");
            let all: Vec<Value> = serde_json::from_slice(&body)?;
            assert_eq!(all.len(), 3);
            Ok(())
        })
    })
    .await
}
