//! Integration tests for the chat session REST endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use dealerchat_entity::employee::EmployeeRole;

#[tokio::test]
async fn test_open_session_creates_then_returns_existing() {
    let app = TestApp::new();
    let exec = app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let form = Uuid::new_v4().to_string();

    let first = app
        .request(
            "POST",
            "/api/chat/sessions",
            Some(json!({ "form_instance_id": form, "customer_name": "Ravi" })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["success"], true);
    assert_eq!(first.body["data"]["status"], "ACTIVE");
    assert_eq!(first.body["data"]["customer_name"], "Ravi");
    assert_eq!(first.body["data"]["employee_id"], exec.id.to_string());
    assert!(first.body["data"]["closed_at"].is_null());

    let second = app
        .request(
            "POST",
            "/api/chat/sessions",
            Some(json!({ "form_instance_id": form })),
            None,
        )
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["id"], first.body["data"]["id"]);
}

#[tokio::test]
async fn test_open_session_defaults_customer_name() {
    let app = TestApp::new();
    app.add_employee("Asha", EmployeeRole::SalesExecutive).await;

    let response = app
        .request(
            "POST",
            "/api/chat/sessions",
            Some(json!({ "form_instance_id": Uuid::new_v4(), "customer_name": "   " })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["customer_name"], "Anonymous Customer");
}

#[tokio::test]
async fn test_open_session_without_available_employee() {
    let app = TestApp::new();
    app.add_employee("Farah", EmployeeRole::Finance).await;

    let response = app
        .request(
            "POST",
            "/api/chat/sessions",
            Some(json!({ "form_instance_id": Uuid::new_v4() })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_open_session_rejects_malformed_body() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/chat/sessions",
            Some(json!({ "form_instance_id": "not-a-uuid" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_and_list_sessions() {
    let app = TestApp::new();
    app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let first = app.open_session(&Uuid::new_v4().to_string(), "A").await;
    let second = app.open_session(&Uuid::new_v4().to_string(), "B").await;

    let response = app
        .request("GET", &format!("/api/chat/sessions/{first}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], first.as_str());

    let list = app.request("GET", "/api/chat/sessions", None, None).await;
    assert_eq!(list.status, StatusCode::OK);
    let ids: Vec<&str> = list.body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|s| s["id"].as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let app = TestApp::new();

    let unknown = app
        .request(
            "GET",
            &format!("/api/chat/sessions/{}", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "NOT_FOUND");

    let malformed = app
        .request("GET", "/api/chat/sessions/42", None, None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_by_form_only_returns_active() {
    let app = TestApp::new();
    let exec = app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let token = app.token_for(&exec);
    let form = Uuid::new_v4().to_string();
    let session = app.open_session(&form, "Ravi").await;

    let found = app
        .request("GET", &format!("/api/chat/session-by-form/{form}"), None, None)
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["data"]["id"], session.as_str());

    let closed = app
        .request(
            "PUT",
            &format!("/api/chat/sessions/{session}/close"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(closed.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/chat/session-by-form/{form}"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_session_by_assignee() {
    let app = TestApp::new();
    let exec = app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let token = app.token_for(&exec);
    let session = app.open_session(&Uuid::new_v4().to_string(), "Ravi").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/chat/sessions/{session}/close"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "Chat session closed successfully");
    assert_eq!(response.body["data"]["session"]["status"], "CLOSED");
    assert!(response.body["data"]["session"]["closed_at"].is_string());

    let again = app
        .request(
            "PUT",
            &format!("/api/chat/sessions/{session}/close"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_close_session_requires_assignee_token() {
    let app = TestApp::new();
    app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let session = app.open_session(&Uuid::new_v4().to_string(), "Ravi").await;
    let path = format!("/api/chat/sessions/{session}/close");

    let missing = app.request("PUT", &path, None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app.request("PUT", &path, None, Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let dealer = app.add_employee("Dev", EmployeeRole::Dealer).await;
    let other = app
        .request("PUT", &path, None, Some(&app.token_for(&dealer)))
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
    assert_eq!(other.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_new_session_goes_to_least_loaded_employee() {
    let app = TestApp::new();
    let first = app.add_employee("Asha", EmployeeRole::SalesExecutive).await;
    let second = app.add_employee("Bilal", EmployeeRole::SalesExecutive).await;

    let a = app.open_session(&Uuid::new_v4().to_string(), "A").await;
    let b = app.open_session(&Uuid::new_v4().to_string(), "B").await;

    let mut assigned = Vec::new();
    for id in [a, b] {
        let response = app
            .request("GET", &format!("/api/chat/sessions/{id}"), None, None)
            .await;
        assigned.push(
            response.body["data"]["employee_id"]
                .as_str()
                .expect("employee id")
                .to_string(),
        );
    }
    assigned.sort();
    let mut expected = vec![first.id.to_string(), second.id.to_string()];
    expected.sort();
    assert_eq!(assigned, expected);
}

#[tokio::test]
async fn test_health_reports_in_memory_store() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "in-memory");
    assert_eq!(response.body["data"]["ws_connections"], 0);
    assert!(response.body["data"]["metrics"]["messages_persisted"].is_u64());
}
