use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use clipforge::app::create_app;
use clipforge::config::settings::AppConfig;
use clipforge::modules::asset::model::{Asset, MediaKind};
use clipforge::state::AppState;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower::ServiceExt;

fn test_config(storage_dir: &str) -> AppConfig {
    AppConfig {
        server_port: 0,
        storage_dir: storage_dir.to_string(),
        max_upload_mb: 64,
        allowed_mime_types: "video/mp4,video/webm,image/png".to_string(),
        rate_limit_per_minute: 0,
        convert_workers: 1,
        convert_timeout_secs: 0,
    }
}

fn test_state(dir: &tempfile::TempDir) -> AppState {
    AppState::new(test_config(dir.path().to_str().unwrap()))
}

fn seed_video(state: &AppState, owner: &str) -> Asset {
    state.assets.create(Asset {
        id: 0,
        owner: owner.to_string(),
        kind: MediaKind::Video,
        original_filename: "clip.mkv".into(),
        original_format: "mkv".into(),
        resolution: Some("1920x1080".into()),
        duration_seconds: Some(120.0),
        file_size: 1024,
        path: dir_placeholder(state),
        thumbnail_path: None,
        preview_path: None,
        created_at: OffsetDateTime::now_utc(),
    })
}

fn dir_placeholder(state: &AppState) -> std::path::PathBuf {
    state.storage.originals_dir().join("missing.mkv")
}

fn post_job(body: Value, client: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/jobs")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-client-id", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn job_submission_creates_queued_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    let response = app
        .oneshot(post_job(
            json!({
                "asset_id": asset.id,
                "target_format": "webm",
                "target_resolution": "1280x720"
            }),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let job = &body["data"];
    assert_eq!(job["status"], "queued");
    assert_eq!(job["progress"], 0);
    assert_eq!(job["target_format"], "webm");
    assert!(job["download_url"].is_null());
    assert!(job["error_message"].is_null());

    // Submission only enqueues; the worker pool picks it up separately.
    assert_eq!(state.queue.len(), 1);
}

#[tokio::test]
async fn unsupported_target_format_is_rejected_without_a_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    let response = app
        .oneshot(post_job(
            json!({"asset_id": asset.id, "target_format": "flv"}),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.jobs.list_by_owner("alice").is_empty());
    assert!(state.queue.is_empty());
}

#[tokio::test]
async fn malformed_resolution_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    let response = app
        .oneshot(post_job(
            json!({
                "asset_id": asset.id,
                "target_format": "mp4",
                "target_resolution": "full-hd"
            }),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quality_outside_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    let response = app
        .oneshot(post_job(
            json!({"asset_id": asset.id, "target_format": "mp4", "quality": 99}),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let app = create_app(state).await;

    let response = app
        .oneshot(post_job(
            json!({"asset_id": 4242, "target_format": "mp4"}),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_status_is_owner_scoped() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    let response = app
        .clone()
        .oneshot(post_job(
            json!({"asset_id": asset.id, "target_format": "mp4"}),
            "alice",
        ))
        .await
        .unwrap();
    let job_id = response_json(response).await["data"]["id"].as_i64().unwrap();

    let mine = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/jobs/{}", job_id))
                .header("x-client-id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(mine.status(), StatusCode::OK);

    let theirs = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/jobs/{}", job_id))
                .header("x-client-id", "mallory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(theirs.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_joins_jobs_with_assets_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let asset = seed_video(&state, "alice");
    let app = create_app(state.clone()).await;

    for format in ["mp4", "webm"] {
        let response = app
            .clone()
            .oneshot(post_job(
                json!({"asset_id": asset.id, "target_format": format}),
                "alice",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs")
                .header("x-client-id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["job"]["target_format"], "webm");
    assert_eq!(items[1]["job"]["target_format"], "mp4");
    assert_eq!(items[0]["asset"]["id"].as_i64(), Some(asset.id));
}

#[tokio::test]
async fn admission_control_rejects_excess_submissions() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().to_str().unwrap());
    config.rate_limit_per_minute = 2;
    let state = AppState::new(config);
    let app = create_app(state.clone()).await;

    // Gate runs before any validation or side effect, so even requests for
    // a missing asset consume and exhaust the window.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_job(json!({"asset_id": 1, "target_format": "mp4"}), "alice"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let limited = app
        .clone()
        .oneshot(post_job(json!({"asset_id": 1, "target_format": "mp4"}), "alice"))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another identity is unaffected.
    let other = app
        .oneshot(post_job(json!({"asset_id": 1, "target_format": "mp4"}), "bob"))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_polling_is_not_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().to_str().unwrap());
    config.rate_limit_per_minute = 1;
    let state = AppState::new(config);
    let app = create_app(state).await;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs")
                    .header("x-client-id", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
