use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::future::{BoxFuture, FutureExt};
use issues_search::{
    config::AppConfig,
    create_app,
    error::IssuesError,
    fetcher::IssueSource,
    view_model::{IssuesView, ViewChange},
    AppState,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tower::ServiceExt; // for `oneshot`

/// Returns the same payload for every request and remembers the URLs it saw.
struct FixedSource {
    payload: Value,
    urls: Mutex<Vec<String>>,
}

impl IssueSource for FixedSource {
    fn fetch_json(&self, url: String) -> BoxFuture<'_, Result<Value, IssuesError>> {
        self.urls.lock().unwrap().push(url);
        let payload = self.payload.clone();
        async move { Ok(payload) }.boxed()
    }
}

fn fixed_state(payload: Value) -> (Arc<AppState>, Arc<FixedSource>) {
    let source = Arc::new(FixedSource {
        payload,
        urls: Mutex::new(Vec::new()),
    });
    let state = Arc::new(AppState::with_source(
        AppConfig::default(),
        Arc::clone(&source) as Arc<dyn IssueSource>,
    ));
    (state, source)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let state = Arc::new(AppState::new(AppConfig::default()).expect("Failed to create state"));
    let app = create_app(state);

    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "issues-search");
}

#[tokio::test]
async fn test_query_defaults_and_update() {
    let (state, _) = fixed_state(json!([]));
    let app = create_app(state);

    let (status, body) = send(&app, get("/api/query")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "repository": "angular", "owner": "angular", "lookback_days": 7 })
    );

    let update = Request::builder()
        .method("PUT")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"owner":"rust-lang","lookback_days":0}"#))
        .unwrap();
    let (status, body) = send(&app, update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"], "rust-lang");
    assert_eq!(body["repository"], "angular");
    assert_eq!(body["lookback_days"], 0);
}

#[tokio::test]
async fn test_non_integer_lookback_rejected() {
    let (state, _) = fixed_state(json!([]));
    let app = create_app(Arc::clone(&state));

    let update = Request::builder()
        .method("PUT")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"lookback_days":"seven"}"#))
        .unwrap();
    let (status, _) = send(&app, update).await;

    assert!(status.is_client_error());
    assert_eq!(state.view_model.query().lookback_days, 7);
}

#[tokio::test]
async fn test_fetch_then_list_issues() {
    let (state, source) = fixed_state(json!([
        { "title": "A", "body": "b", "user": { "login": "x" } },
        { "title": "B", "body": null, "assignee": { "login": "y" } }
    ]));

    let (loaded_tx, loaded_rx) = oneshot::channel();
    let loaded_tx = Mutex::new(Some(loaded_tx));
    state
        .view_model
        .subscribe(Arc::new(move |change: ViewChange, _: &IssuesView| {
            if change == ViewChange::Loaded {
                if let Some(tx) = loaded_tx.lock().unwrap().take() {
                    let _ = tx.send(());
                }
            }
        }));

    let app = create_app(Arc::clone(&state));
    let fetch = Request::builder()
        .method("POST")
        .uri("/api/issues/fetch")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, fetch).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["generation"], 1);

    loaded_rx.await.unwrap();

    let (status, body) = send(&app, get("/api/issues")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count_visible"], true);
    assert_eq!(body["status"]["state"], "loaded");
    assert_eq!(
        body["issues"],
        json!([
            { "title": "A", "body": "b", "user_login": "x", "assignee_login": "" },
            { "title": "B", "body": "", "user_login": "", "assignee_login": "y" }
        ])
    );

    let urls = source.urls.lock().unwrap().clone();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://api.github.com/repos/angular/angular/issues?since="));
}

#[tokio::test]
async fn test_fetch_with_empty_repository_is_bad_request() {
    let (state, source) = fixed_state(json!([]));
    state.view_model.set_repository("");
    let app = create_app(Arc::clone(&state));

    let fetch = Request::builder()
        .method("POST")
        .uri("/api/issues/fetch")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, fetch).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.urls.lock().unwrap().is_empty());

    let (_, body) = send(&app, get("/api/issues")).await;
    assert_eq!(body["status"]["state"], "failed");
    assert_eq!(body["count_visible"], false);
}

#[test]
fn test_issues_view_contract() {
    // Field names here are what the page bindings read.
    use issues_search::issue::Issue;
    use issues_search::query::QueryParameters;
    use issues_search::view_model::FetchStatus;

    let view = IssuesView {
        query: QueryParameters::default(),
        issues: vec![Issue {
            title: "t".to_string(),
            body: "b".to_string(),
            user_login: "u".to_string(),
            assignee_login: String::new(),
        }],
        count_visible: false,
        status: FetchStatus::Failed("network failure: timeout".to_string()),
        generation: 3,
    };

    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["query"]["lookback_days"], 7);
    assert_eq!(json["issues"][0]["user_login"], "u");
    assert_eq!(json["count_visible"], false);
    assert_eq!(json["status"]["state"], "failed");
    assert_eq!(json["status"]["message"], "network failure: timeout");
    assert_eq!(json["generation"], 3);
}
