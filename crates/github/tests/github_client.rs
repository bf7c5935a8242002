//! Integration tests for `GithubClient` against a mocked GitHub API.
//!
//! Covers:
//! - authentication and API-version headers
//! - variable read/update, including non-success statuses
//! - pull request listing, commit listing, issue fetch, comments
//! - release creation (success and duplicate-tag rejection)
//! - streamed asset upload with progress reporting and error bodies

use std::sync::{Arc, Mutex};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use github::GithubClient;
use pipeline::{
    ApiToken, AssetName, BranchName, GithubConfig, HostError, IssueNumber, IssueTracker,
    NewRelease, ProgressObserver, PullRequestManager, PullRequestNumber, PullRequestState,
    ReleaseId, ReleaseManager, ReleaseTag, RepositoryVariables, UploadProgress, VariableName,
    VersionCode, VersionName,
};

const REPO: &str = "/repos/towbook/towbook-android";

// ============================================================================
// Helpers
// ============================================================================

fn client_for(server: &MockServer) -> GithubClient {
    let config = GithubConfig {
        api_url: server.uri(),
        uploads_url: server.uri(),
        token: ApiToken::new("test-token"),
        ..GithubConfig::default()
    };
    GithubClient::new(&config).expect("client builds")
}

fn counter() -> VariableName {
    VariableName::new("VERSION_CODE").unwrap()
}

fn new_release(prerelease: bool) -> NewRelease {
    NewRelease {
        tag: ReleaseTag::new(VersionName::new(2, 3, 1), VersionCode::new(41)),
        name: "Build 2.3.1-41".to_string(),
        body: "## Issue".to_string(),
        prerelease,
        target: BranchName::new("release").unwrap(),
    }
}

// ============================================================================
// Variables
// ============================================================================

#[tokio::test]
async fn get_variable_sends_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/actions/variables/VERSION_CODE")))
        .and(header("authorization", "Bearer test-token"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "VERSION_CODE", "value": "40"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server).get_variable(&counter()).await.unwrap();
    assert_eq!(value, "40");
}

#[tokio::test]
async fn get_variable_surfaces_not_found_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/actions/variables/VERSION_CODE")))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_variable(&counter())
        .await
        .unwrap_err();
    match err {
        HostError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn update_variable_patches_name_and_value() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{REPO}/actions/variables/VERSION_CODE")))
        .and(body_json(json!({"name": "VERSION_CODE", "value": "41"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .update_variable(&counter(), "41")
        .await
        .unwrap();
}

// ============================================================================
// Pull requests, commits, issues
// ============================================================================

#[tokio::test]
async fn list_pull_requests_passes_state_and_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/pulls")))
        .and(query_param("state", "all"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"number": 90, "title": "Photo fix", "body": "Fixes #812", "html_url": "https://github.com/towbook/towbook-android/pull/90"},
            {"number": 91, "title": "Untitled", "body": null, "html_url": "https://github.com/towbook/towbook-android/pull/91"}
        ])))
        .mount(&server)
        .await;

    let pulls = client_for(&server)
        .list_pull_requests(PullRequestState::All)
        .await
        .unwrap();
    assert_eq!(pulls.len(), 2);
    assert_eq!(pulls[0].number, PullRequestNumber::new(90));
    assert_eq!(pulls[0].body.as_deref(), Some("Fixes #812"));
    assert_eq!(pulls[1].body, None);
}

#[tokio::test]
async fn list_commits_maps_sha_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/pulls/90/commits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"sha": "aaa111", "commit": {"message": "Compress photos"}},
            {"sha": "bbb222", "commit": {"message": "Update build version to 2.3.1-40"}}
        ])))
        .mount(&server)
        .await;

    let commits = client_for(&server)
        .list_commits(PullRequestNumber::new(90))
        .await
        .unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].id.as_str(), "aaa111");
    assert_eq!(commits[1].message, "Update build version to 2.3.1-40");
}

#[tokio::test]
async fn get_issue_and_create_comment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/issues/812")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 812,
            "title": "Driver app freezes",
            "html_url": "https://github.com/towbook/towbook-android/issues/812"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{REPO}/issues/812/comments")))
        .and(body_json(json!({"body": "Available to test"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let issue = client.get_issue(IssueNumber::new(812)).await.unwrap();
    assert_eq!(issue.title, "Driver app freezes");
    client
        .create_comment(IssueNumber::new(812), "Available to test")
        .await
        .unwrap();
}

// ============================================================================
// Releases
// ============================================================================

#[tokio::test]
async fn create_release_posts_full_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{REPO}/releases")))
        .and(body_json(json!({
            "tag_name": "2.3.1-41",
            "target_commitish": "release",
            "name": "Build 2.3.1-41",
            "body": "## Issue",
            "draft": false,
            "prerelease": true,
            "generate_release_notes": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 555,
            "tag_name": "2.3.1-41",
            "html_url": "https://github.com/towbook/towbook-android/releases/tag/2.3.1-41"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let release = client_for(&server)
        .create_release(&new_release(true))
        .await
        .unwrap();
    assert_eq!(release.id, ReleaseId::new(555));
    assert_eq!(release.tag_name, "2.3.1-41");
}

#[tokio::test]
async fn create_release_duplicate_tag_is_rejected_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{REPO}/releases")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{"resource": "Release", "code": "already_exists", "field": "tag_name"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_release(&new_release(false))
        .await
        .unwrap_err();
    assert!(matches!(err, HostError::Status { status: 422, ref body } if body.contains("already_exists")));
}

#[tokio::test]
async fn get_release_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/releases/555")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 555,
            "tag_name": "2.3.1-41",
            "html_url": "https://github.com/towbook/towbook-android/releases/tag/2.3.1-41"
        })))
        .mount(&server)
        .await;

    let release = client_for(&server)
        .get_release(ReleaseId::new(555))
        .await
        .unwrap();
    assert!(release.html_url.ends_with("/releases/tag/2.3.1-41"));
}

// ============================================================================
// Asset uploads
// ============================================================================

#[tokio::test]
async fn upload_asset_streams_file_and_reports_progress() {
    let server = MockServer::start().await;
    let payload = vec![0x5au8; 150 * 1024];

    Mock::given(method("POST"))
        .and(path(format!("{REPO}/releases/555/assets")))
        .and(query_param("name", "towbook-2.3.1-41.apk"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("content-length", payload.len().to_string().as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9001,
            "name": "towbook-2.3.1-41.apk",
            "state": "uploaded",
            "browser_download_url": "https://github.com/towbook/towbook-android/releases/download/2.3.1-41/towbook-2.3.1-41.apk"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("towbook-2.3.1-41.apk");
    std::fs::write(&file, &payload).unwrap();

    let percents = Arc::new(Mutex::new(Vec::new()));
    let sink = percents.clone();
    let observer: ProgressObserver = Arc::new(move |p: &UploadProgress| {
        sink.lock().unwrap().push(p.percent());
    });

    let asset = client_for(&server)
        .upload_asset(
            ReleaseId::new(555),
            &file,
            &AssetName::new("towbook-2.3.1-41.apk").unwrap(),
            Some(observer),
        )
        .await
        .unwrap();

    assert!(asset.is_uploaded());
    assert!(asset.download_url.ends_with("towbook-2.3.1-41.apk"));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, payload);

    let percents = percents.lock().unwrap();
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn upload_asset_failure_carries_remote_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{REPO}/releases/555/assets")))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream storage unavailable"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.apk");
    std::fs::write(&file, b"apk").unwrap();

    let err = client_for(&server)
        .upload_asset(
            ReleaseId::new(555),
            &file,
            &AssetName::new("a.apk").unwrap(),
            None,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("upstream storage unavailable"));
}

#[tokio::test]
async fn upload_asset_missing_file_is_a_local_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client_for(&server)
        .upload_asset(
            ReleaseId::new(555),
            &dir.path().join("missing.apk"),
            &AssetName::new("missing.apk").unwrap(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HostError::LocalFile { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
