//! Integration tests for `ResourceClient` against an in-process mock backend.
//!
//! Each test spawns its own Axum listener, so they run in parallel without
//! sharing state.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::http::Method;
use serde_json::{json, Value};

use common::{client, CountingHandler, MockBackend, Reply, ScriptedTokens};
use intake_client::{ClientError, ResourceApi, TokenError};
use intake_core::patch::PatchDocument;
use intake_core::query::QueryOptions;
use intake_core::resource::catalog;
use intake_core::types::ETag;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_merges_etag_and_sends_auth() {
    let (backend, base) = MockBackend::spawn(vec![
        Reply::json(200, json!({"id": 5, "firstName": "Ada"})).with_header("etag", "\"v5\""),
    ])
    .await;
    let handler = Arc::new(CountingHandler::default());
    let c = client(&base, Arc::new(ScriptedTokens::ok("tok-1")), handler.clone());

    let entity = c
        .get::<Value>(
            "clientContacts",
            5,
            &QueryOptions::new().api_version(1).fields("id,firstName"),
        )
        .await
        .unwrap();

    assert_eq!(entity.etag, Some(ETag::new("\"v5\"")));
    assert_eq!(entity.value["firstName"], "Ada");
    let merged = entity.merged();
    assert_eq!(merged["etag"], "\"v5\"");
    assert_eq!(merged.as_object().unwrap().len(), 3);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/clientContacts/5/");
    assert_eq!(req.query.as_deref(), Some("apiVersion=1&fields=id%2CfirstName"));
    assert_eq!(req.header("authorization"), Some("bearer tok-1"));
    assert!(req.header("x-request-id").is_some());
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn get_collection_parses_pagination_header() {
    let (backend, base) = MockBackend::spawn(vec![Reply::json(
        200,
        json!([{"id": 1}, {"id": 2}]),
    )
    .with_header(
        "x-pagination",
        r#"{"totalCount":12,"pageSize":2,"currentPage":1,"totalPages":6,"hasNext":true,"hasPrevious":false}"#,
    )])
    .await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );

    let page = c
        .get_collection::<Value>(
            "jobRoles",
            &QueryOptions::new()
                .api_version(1)
                .page_size(2)
                .page_number(1)
                .search_query("audit senior"),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    let meta = page.pagination.as_ref().unwrap();
    assert_eq!(meta.total_count, Some(12));
    assert_eq!(meta.has_next, Some(true));
    let out = page.to_json().unwrap();
    assert_eq!(out["jobRoles"], json!([{"id": 1}, {"id": 2}]));
    assert_eq!(out["paginationMetadata"]["totalPages"], 6);

    let req = &backend.requests()[0];
    assert_eq!(req.path, "/jobRoles/");
    assert_eq!(
        req.query.as_deref(),
        Some("apiVersion=1&pageSize=2&pageNumber=1&searchQuery=audit%20senior")
    );
}

#[tokio::test]
async fn get_collection_without_header_has_no_metadata() {
    let (_backend, base) = MockBackend::spawn(vec![Reply::json(200, json!([]))]).await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );
    let page = c
        .get_collection::<Value>("offices", &QueryOptions::new())
        .await
        .unwrap();
    assert!(page.pagination.is_none());
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn get_collection_tolerates_null_pagination_fields() {
    let (_backend, base) = MockBackend::spawn(vec![Reply::json(200, json!([{"id": 1}]))
        .with_header(
            "x-pagination",
            r#"{"totalCount":1,"hasNext":null,"currentPage":1}"#,
        )])
    .await;
    let handler = Arc::new(CountingHandler::default());
    let c = client(&base, Arc::new(ScriptedTokens::ok("t")), handler.clone());

    let page = c
        .get_collection::<Value>("offices", &QueryOptions::new())
        .await
        .unwrap();
    let meta = page.pagination.unwrap();
    assert_eq!(meta.total_count, Some(1));
    assert_eq!(meta.has_next, None);
    assert_eq!(handler.count(), 0);
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_sends_if_match_and_returns_new_etag_only() {
    let (backend, base) =
        MockBackend::spawn(vec![Reply::empty(204).with_header("etag", "\"v6\"")]).await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );

    let doc = PatchDocument::new()
        .replace("/clientName", json!("Acme LLC"))
        .unwrap();
    let new_etag = c
        .patch(
            "initialSetupResponses",
            9,
            &QueryOptions::new().api_version(1),
            &doc,
            &ETag::new("\"v5\""),
        )
        .await
        .unwrap();

    assert_eq!(new_etag, Some(ETag::new("\"v6\"")));
    let req = &backend.requests()[0];
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.path, "/initialSetupResponses/9");
    assert_eq!(req.query.as_deref(), Some("apiVersion=1"));
    assert_eq!(req.header("if-match"), Some("\"v5\""));
    assert_eq!(req.header("content-type"), Some("application/json-patch+json"));
    assert_eq!(
        req.json(),
        json!([{"op": "replace", "path": "/clientName", "value": "Acme LLC"}])
    );
}

#[tokio::test]
async fn post_returns_created_body_with_etag() {
    let (backend, base) = MockBackend::spawn(vec![
        Reply::json(201, json!({"id": 42, "createdBy": 7})).with_header("etag", "\"v1\""),
    ])
    .await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );

    let created = c
        .post::<_, Value>(
            "newEngagementInstances",
            &QueryOptions::new().api_version(1),
            &json!({"createdBy": 7}),
        )
        .await
        .unwrap();

    assert_eq!(created.id(), Some(42));
    assert_eq!(created.etag, Some(ETag::new("\"v1\"")));
    let req = &backend.requests()[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/newEngagementInstances/");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.json(), json!({"createdBy": 7}));
}

#[tokio::test]
async fn delete_sends_if_match() {
    let (backend, base) = MockBackend::spawn(vec![Reply::empty(204)]).await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );

    c.delete(
        "clientContacts",
        3,
        &QueryOptions::new().api_version(1),
        &ETag::new("\"v2\""),
    )
    .await
    .unwrap();

    let req = &backend.requests()[0];
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.path, "/clientContacts/3/");
    assert_eq!(req.header("if-match"), Some("\"v2\""));
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn rpc_post_returns_raw_body() {
    let (backend, base) =
        MockBackend::spawn(vec![Reply::json(202, json!({"runId": "abc"}))]).await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );

    let body: Value = c
        .rpc_post(
            "/workflows/newEngagement/start",
            &QueryOptions::new(),
            &json!({"newEngagementInstanceId": 42}),
        )
        .await
        .unwrap();

    assert_eq!(body, json!({"runId": "abc"}));
    let req = &backend.requests()[0];
    assert_eq!(req.path, "/workflows/newEngagement/start");
    assert_eq!(req.query, None);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn http_error_is_reported_once_then_returned() {
    let (_backend, base) =
        MockBackend::spawn(vec![Reply::json(412, json!({"error": "etag mismatch"}))]).await;
    let handler = Arc::new(CountingHandler::default());
    let c = client(&base, Arc::new(ScriptedTokens::ok("t")), handler.clone());

    let err = c
        .delete("attachments", 1, &QueryOptions::new(), &ETag::new("old"))
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::Api { status: 412, ref body } if body.contains("etag mismatch"));
    assert_eq!(handler.count(), 1);
    assert_eq!(handler.urls.lock().unwrap()[0], format!("{base}/attachments/1/"));
}

#[tokio::test]
async fn network_failure_is_reported_once() {
    // Reserve a port, then close it so the connection is refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let handler = Arc::new(CountingHandler::default());
    let c = client(
        &format!("http://{addr}"),
        Arc::new(ScriptedTokens::ok("t")),
        handler.clone(),
    );

    let err = c
        .get::<Value>("clients", 1, &QueryOptions::new())
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Request(_));
    assert_eq!(handler.count(), 1);
}

#[tokio::test]
async fn interaction_required_starts_login_and_abandons_request() {
    let (backend, base) = MockBackend::spawn(vec![]).await;
    let tokens = Arc::new(ScriptedTokens::failing(TokenError::InteractionRequired(
        "session expired".into(),
    )));
    let handler = Arc::new(CountingHandler::default());
    let c = client(&base, tokens.clone(), handler.clone());

    let err = c
        .get::<Value>("clients", 1, &QueryOptions::new())
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::ReauthenticationStarted);
    assert_eq!(tokens.interactive_calls.load(Ordering::SeqCst), 1);
    assert!(backend.requests().is_empty());
    assert_eq!(handler.count(), 0);
}

#[tokio::test]
async fn other_token_errors_propagate_without_login() {
    let (backend, base) = MockBackend::spawn(vec![]).await;
    let tokens = Arc::new(ScriptedTokens::failing(TokenError::Provider(
        "network down".into(),
    )));
    let c = client(&base, tokens.clone(), Arc::new(CountingHandler::default()));

    let err = c
        .post::<_, Value>("attachments", &QueryOptions::new(), &json!({}))
        .await
        .unwrap_err();

    assert_matches!(err, ClientError::Auth(TokenError::Provider(_)));
    assert_eq!(tokens.interactive_calls.load(Ordering::SeqCst), 0);
    assert!(backend.requests().is_empty());
}

// ---------------------------------------------------------------------------
// ResourceApi
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resource_api_defaults_version_and_binds_name() {
    let (backend, base) = MockBackend::spawn(vec![
        Reply::json(201, json!({"id": 8, "fileName": "engagement-letter.pdf"}))
            .with_header("etag", "\"a1\""),
        Reply::json(200, json!([])),
    ])
    .await;
    let c = client(
        &base,
        Arc::new(ScriptedTokens::ok("t")),
        Arc::new(CountingHandler::default()),
    );
    let attachments = ResourceApi::new(c, &catalog::ATTACHMENTS);

    let created = attachments
        .post::<_, Value>(&json!({"fileName": "engagement-letter.pdf"}))
        .await
        .unwrap();
    assert_eq!(created.id(), Some(8));
    attachments
        .get_collection::<Value>(QueryOptions::new().filter("fileName eq 'x'"))
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].path, "/attachments/");
    assert_eq!(requests[0].query.as_deref(), Some("apiVersion=1"));
    assert_eq!(
        requests[1].query.as_deref(),
        Some("apiVersion=1&filter=fileName%20eq%20%27x%27")
    );
}
