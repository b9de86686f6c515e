//! Archive download tests against a mock archive host
//!
//! These tests verify that the fetcher:
//! 1. Requests the branch the caller asked for
//! 2. Falls back to `main` then `master`, one request at a time
//! 3. Reports the first attempt's status when everything fails
//! 4. Sends the user agent and bearer credential

mod common;

use common::{SnapshotBuilder, fetcher_for};
use gitdigest_mcp::gitdigest::{ArchiveSource, DigestError, RepositoryReference};

fn reference(branch: Option<&str>) -> RepositoryReference {
    RepositoryReference {
        owner: "acme".to_string(),
        repo: "demo".to_string(),
        branch_candidate: branch.map(String::from),
    }
}

#[tokio::test]
async fn test_fetch_requested_branch() {
    let mut server = mockito::Server::new_async().await;
    let body = SnapshotBuilder::new("demo", "develop")
        .file("src/lib.rs", "pub fn x() {}")
        .build();
    let develop = server
        .mock("GET", "/acme/demo/zip/develop")
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let fetched = fetcher.fetch(&reference(Some("develop")), None).await.unwrap();

    assert_eq!(fetched.effective_branch, "develop");
    assert_eq!(fetched.root_prefix("demo"), "demo-develop/");

    let mut source = fetched.into_source().unwrap();
    assert_eq!(
        source.read_content("demo-develop/src/lib.rs").unwrap(),
        "pub fn x() {}"
    );
    develop.assert_async().await;
}

#[tokio::test]
async fn test_missing_branch_falls_back_to_main() {
    let mut server = mockito::Server::new_async().await;
    let feature = server
        .mock("GET", "/acme/demo/zip/feature-x")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let main = server
        .mock("GET", "/acme/demo/zip/main")
        .with_status(200)
        .with_body(SnapshotBuilder::new("demo", "main").file("a.txt", "a").build())
        .expect(1)
        .create_async()
        .await;
    let master = server
        .mock("GET", "/acme/demo/zip/master")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let fetched = fetcher.fetch(&reference(Some("feature-x")), None).await.unwrap();

    assert_eq!(fetched.effective_branch, "main");
    feature.assert_async().await;
    main.assert_async().await;
    master.assert_async().await;
}

#[tokio::test]
async fn test_default_branch_falls_back_to_master_without_retrying_main() {
    let mut server = mockito::Server::new_async().await;
    let main = server
        .mock("GET", "/acme/demo/zip/main")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let master = server
        .mock("GET", "/acme/demo/zip/master")
        .with_status(200)
        .with_body(SnapshotBuilder::new("demo", "master").file("a.txt", "a").build())
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let fetched = fetcher.fetch(&reference(None), None).await.unwrap();

    assert_eq!(fetched.effective_branch, "master");
    assert_eq!(fetched.root_prefix("demo"), "demo-master/");
    main.assert_async().await;
    master.assert_async().await;
}

#[tokio::test]
async fn test_all_branches_failing_reports_first_status() {
    let mut server = mockito::Server::new_async().await;
    let _release = server
        .mock("GET", "/acme/demo/zip/release")
        .with_status(404)
        .create_async()
        .await;
    let _main = server
        .mock("GET", "/acme/demo/zip/main")
        .with_status(500)
        .create_async()
        .await;
    let _master = server
        .mock("GET", "/acme/demo/zip/master")
        .with_status(503)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let err = fetcher.fetch(&reference(Some("release")), None).await.unwrap_err();

    match &err {
        DigestError::RepositoryFetch { status, status_text } => {
            assert_eq!(*status, 404);
            assert_eq!(status_text, "Not Found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "Failed to fetch repository: 404 Not Found");
}

#[tokio::test]
async fn test_unauthorized_maps_to_forbidden() {
    let mut server = mockito::Server::new_async().await;
    let _unauthorized = server
        .mock("GET", mockito::Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let err = fetcher.fetch(&reference(None), None).await.unwrap_err();

    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_credential_and_user_agent_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let main = server
        .mock("GET", "/acme/demo/zip/main")
        .match_header("authorization", "Bearer secret-token")
        .match_header(
            "user-agent",
            mockito::Matcher::Regex("^gitdigest-mcp/".to_string()),
        )
        .with_status(200)
        .with_body(SnapshotBuilder::new("demo", "main").file("a.txt", "a").build())
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    fetcher
        .fetch(&reference(None), Some("secret-token"))
        .await
        .unwrap();

    main.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_header_without_credential() {
    let mut server = mockito::Server::new_async().await;
    let main = server
        .mock("GET", "/acme/demo/zip/main")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(SnapshotBuilder::new("demo", "main").file("a.txt", "a").build())
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    fetcher.fetch(&reference(None), None).await.unwrap();

    main.assert_async().await;
}

#[tokio::test]
async fn test_slash_branch_uses_dashed_root_prefix() {
    let mut server = mockito::Server::new_async().await;
    let _feature = server
        .mock("GET", "/acme/demo/zip/feature/login")
        .with_status(200)
        .with_body(
            SnapshotBuilder::new("demo", "feature/login")
                .file("a.txt", "a")
                .build(),
        )
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url());
    let fetched = fetcher
        .fetch(&reference(Some("feature/login")), None)
        .await
        .unwrap();

    assert_eq!(fetched.effective_branch, "feature/login");
    assert_eq!(fetched.root_prefix("demo"), "demo-feature-login/");
}
