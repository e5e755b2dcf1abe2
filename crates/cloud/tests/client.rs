//! `CloudPlansClient` against a local stand-in for the cloud admin service.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use cloud::{CloudClientConfig, CloudPlansClient, RestApiContext};
use serde_json::{json, Value};

/// Serve `router` on an ephemeral port and return its base URL.
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/rest")
}

fn admin_service() -> Router {
    Router::new()
        .route(
            "/rest/admin/cloud-plan",
            get(|| async {
                Json(json!({
                    "data": {
                        "planId": 7,
                        "monthlyExecutionsLimit": 2500,
                        "activeWorkflowsLimit": -1,
                        "credentialsLimit": -1,
                        "isActive": true,
                        "displayName": "Starter",
                        "expirationDate": "2030-01-01T00:00:00.000Z",
                        "metadata": { "version": "v1", "group": "opt-in", "slug": "starter" }
                    }
                }))
            }),
        )
        .route(
            "/rest/cloud/limits",
            get(|| async { Json(json!({ "data": { "executions": 42, "activeWorkflows": 3 } })) }),
        )
        .route(
            "/rest/admin/auth/login/code",
            get(|headers: HeaderMap| async move {
                let push_ref = headers
                    .get("push-ref")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                Json(json!({ "data": { "code": format!("code-for-{push_ref}") } }))
            }),
        )
}

fn client() -> CloudPlansClient {
    CloudPlansClient::new(&CloudClientConfig::default()).unwrap()
}

#[tokio::test]
async fn fetches_current_plan() {
    let ctx = RestApiContext::new(spawn(admin_service()).await);

    let plan = client().get_current_plan(&ctx).await.unwrap();

    assert_eq!(plan.plan_id, 7);
    assert_eq!(plan.monthly_executions_limit, 2500);
    assert_eq!(plan.active_workflows_limit, -1);
    assert_eq!(plan.display_name, "Starter");
    assert_eq!(plan.metadata.slug, "starter");
    assert!(plan.metadata.trial.is_none());
}

#[tokio::test]
async fn fetches_current_usage() {
    let ctx = RestApiContext::new(spawn(admin_service()).await);

    let usage = client().get_current_usage(&ctx).await.unwrap();

    assert_eq!(usage.executions, 42);
    assert_eq!(usage.active_workflows, 3);
}

#[tokio::test]
async fn login_code_request_carries_push_ref() {
    let base = spawn(admin_service()).await;

    let with_ref = RestApiContext::new(base.clone()).with_push_ref("tab-1");
    let code = client().get_login_code(&with_ref).await.unwrap();
    assert_eq!(code.code, "code-for-tab-1");

    let without_ref = RestApiContext::new(base);
    let code = client().get_login_code(&without_ref).await.unwrap();
    assert_eq!(code.code, "code-for-none");
}

#[tokio::test]
async fn error_status_surfaces_unchanged() {
    let router = Router::new().route(
        "/rest/cloud/limits",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "down" }))) }),
    );
    let ctx = RestApiContext::new(spawn(router).await);

    let err = client().get_current_usage(&ctx).await.unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn body_without_envelope_is_a_decode_error() {
    let router = Router::new().route(
        "/rest/admin/cloud-plan",
        get(|| async { Json(Value::String("not an envelope".into())) }),
    );
    let ctx = RestApiContext::new(spawn(router).await);

    let err = client().get_current_plan(&ctx).await.unwrap_err();

    assert!(err.status().is_none());
    assert!(err.to_string().starts_with("HTTP request failed"));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let ctx = RestApiContext::new(format!("http://{addr}"));

    let err = client().get_current_plan(&ctx).await.unwrap_err();

    assert!(err.status().is_none());
}
