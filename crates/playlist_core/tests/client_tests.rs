mod common;

use std::fs;
use std::time::Duration;

use httpmock::prelude::*;
use playlist_core::{
    fetch_playlist, run_sort, ApiErrorKind, AuthError, ClientOptions, ClientSecrets,
    InstalledAppFlow, MoveOperation, PlaylistApi, PlaylistError, SortError, SortOptions,
    StaticToken, YouTubeClient,
};
use serde_json::json;
use tempfile::tempdir;

use common::{titles, TestResult};

fn client_for(server: &MockServer) -> Result<YouTubeClient, PlaylistError> {
    YouTubeClient::new(ClientOptions {
        timeout: Duration::from_secs(5),
        access_token: "test-token".to_string(),
        base_url: Some(server.url("/youtube/v3")),
    })
}

#[tokio::test]
async fn list_items_maps_resources() -> TestResult<()> {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/youtube/v3/playlistItems")
                .query_param("part", "snippet,contentDetails")
                .query_param("playlistId", "PL1")
                .query_param("maxResults", "50")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({
                "kind": "youtube#playlistItemListResponse",
                "nextPageToken": "CAIQAA",
                "items": [
                    {
                        "id": "UExJVEVNMQ",
                        "snippet": {
                            "title": "Match 2024 12 19 18 25 12",
                            "position": 0,
                            "resourceId": {"kind": "youtube#video", "videoId": "vid-1"}
                        },
                        "contentDetails": {"videoId": "vid-1"}
                    },
                    {
                        "id": "UExJVEVNMg",
                        "snippet": {
                            "title": "Trailer",
                            "position": 1,
                            "resourceId": {"kind": "youtube#video", "videoId": "vid-2"}
                        }
                    }
                ]
            }));
        })
        .await;

    let client = client_for(&server)?;
    let page = client.list_items("PL1", None).await?;

    list_mock.assert_async().await;
    assert_eq!(page.next_page_token.as_deref(), Some("CAIQAA"));
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].item_id, "UExJVEVNMQ");
    assert_eq!(page.items[0].video_id, "vid-1");
    assert_eq!(page.items[1].video_id, "vid-2");
    assert_eq!(page.items[1].current_position, 1);
    Ok(())
}

#[tokio::test]
async fn list_items_sends_page_token() -> TestResult<()> {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/youtube/v3/playlistItems")
                .query_param("pageToken", "CAIQAA");
            then.status(200).json_body(json!({"items": []}));
        })
        .await;

    let client = client_for(&server)?;
    let page = client.list_items("PL1", Some("CAIQAA")).await?;

    list_mock.assert_async().await;
    assert!(page.items.is_empty());
    assert!(page.next_page_token.is_none());
    Ok(())
}

#[tokio::test]
async fn item_without_video_id_is_a_protocol_error() -> TestResult<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/youtube/v3/playlistItems");
            then.status(200).json_body(json!({
                "items": [{"id": "orphan", "snippet": {"title": "gone", "position": 0}}]
            }));
        })
        .await;

    let client = client_for(&server)?;
    let err = client.list_items("PL1", None).await.unwrap_err();
    assert!(matches!(err, PlaylistError::InvalidJson(ref msg) if msg.contains("orphan")));
    Ok(())
}

#[tokio::test]
async fn move_item_puts_snippet_body() -> TestResult<()> {
    let server = MockServer::start_async().await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/youtube/v3/playlistItems")
                .query_param("part", "snippet")
                .header("authorization", "Bearer test-token")
                .json_body(json!({
                    "id": "item-7",
                    "snippet": {
                        "playlistId": "PL1",
                        "position": 3,
                        "resourceId": {"kind": "youtube#video", "videoId": "vid-7"}
                    }
                }));
            then.status(200).json_body(json!({"id": "item-7"}));
        })
        .await;

    let client = client_for(&server)?;
    client
        .move_item(&MoveOperation {
            item_id: "item-7".to_string(),
            video_id: "vid-7".to_string(),
            playlist_id: "PL1".to_string(),
            target_position: 3,
        })
        .await?;

    update_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn quota_errors_are_transient() -> TestResult<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/youtube/v3/playlistItems");
            then.status(403).json_body(json!({
                "error": {
                    "code": 403,
                    "message": "The request cannot be completed because you have exceeded your quota.",
                    "errors": [{"reason": "quotaExceeded", "domain": "youtube.quota"}]
                }
            }));
        })
        .await;

    let client = client_for(&server)?;
    let err = fetch_playlist(&client, "PL1").await.unwrap_err();
    assert_eq!(err.pages_fetched, 0);
    assert_eq!(err.kind(), ApiErrorKind::Transient);
    assert!(err.to_string().contains("exceeded your quota"));
    Ok(())
}

#[tokio::test]
async fn unauthorized_and_missing_errors_are_classified() -> TestResult<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/youtube/v3/playlistItems");
            then.status(401).json_body(json!({
                "error": {"code": 401, "message": "Invalid Credentials", "errors": [{"reason": "authError"}]}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/youtube/v3/playlistItems");
            then.status(404).body("not here");
        })
        .await;

    let client = client_for(&server)?;
    let list_err = client.list_items("PL1", None).await.unwrap_err();
    assert_eq!(list_err.kind(), ApiErrorKind::Authorization);

    let move_err = client
        .move_item(&MoveOperation {
            item_id: "i".into(),
            video_id: "v".into(),
            playlist_id: "PL1".into(),
            target_position: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(move_err.kind(), ApiErrorKind::Permanent);
    assert!(move_err.to_string().contains("not here"));
    Ok(())
}

#[tokio::test]
async fn run_sort_reorders_remote_playlist() -> TestResult<()> {
    let server = MockServer::start_async().await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/youtube/v3/playlistItems")
                .query_param("playlistId", "PLsorted");
            then.status(200).json_body(json!({
                "items": [
                    {"id": "i0", "snippet": {"title": "2024 01 01 00 00 00", "position": 0},
                     "contentDetails": {"videoId": "v0"}},
                    {"id": "i1", "snippet": {"title": "no date here", "position": 1},
                     "contentDetails": {"videoId": "v1"}},
                    {"id": "i2", "snippet": {"title": "2023 05 05 05 05 05", "position": 2},
                     "contentDetails": {"videoId": "v2"}}
                ]
            }));
        })
        .await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/youtube/v3/playlistItems")
                .query_param("part", "snippet")
                .header("authorization", "Bearer static-token");
            then.status(200).json_body(json!({}));
        })
        .await;

    let options = SortOptions {
        playlist: "PLsorted".to_string(),
        timeout_secs: 5,
        base_url: Some(server.url("/youtube/v3")),
        ..SortOptions::default()
    };
    let report = run_sort(&StaticToken::new("static-token"), options).await?;

    list_mock.assert_async().await;
    update_mock.assert_hits_async(3).await;
    assert!(report.is_complete_success());
    assert_eq!(
        titles(report.order.items()),
        vec!["2023 05 05 05 05 05", "2024 01 01 00 00 00", "no date here"]
    );
    Ok(())
}

#[tokio::test]
async fn run_sort_halts_on_auth_failure() {
    let options = SortOptions {
        playlist: "PL1".to_string(),
        base_url: Some("http://127.0.0.1:9".to_string()),
        ..SortOptions::default()
    };
    let err = run_sort(&StaticToken::new("  "), options).await.unwrap_err();
    assert!(matches!(err, SortError::Auth(AuthError::MissingCredentials(_))));
}

#[tokio::test]
async fn unreachable_host_is_transient() -> TestResult<()> {
    let client = YouTubeClient::new(ClientOptions {
        timeout: Duration::from_secs(2),
        access_token: "test-token".to_string(),
        base_url: Some("http://127.0.0.1:9".to_string()),
    })?;

    let err = fetch_playlist(&client, "PL1").await.unwrap_err();
    assert_eq!(err.pages_fetched, 0);
    assert!(matches!(err.source, PlaylistError::Request(_)));
    assert_eq!(err.kind(), ApiErrorKind::Transient);
    Ok(())
}

#[tokio::test]
async fn run_sort_reports_client_build_failure_with_context() {
    let options = SortOptions {
        playlist: "PL1".to_string(),
        base_url: Some("http://127.0.0.1:9".to_string()),
        ..SortOptions::default()
    };
    let err = run_sort(&StaticToken::new("bad\ntoken"), options)
        .await
        .unwrap_err();
    match err {
        SortError::Context(message) => {
            assert!(message.starts_with("failed to build API client: "));
            assert!(message.contains("access token is not a valid header"));
        }
        other => panic!("expected a context error, got {other:?}"),
    }
}

#[test]
fn client_secrets_load_from_file() -> TestResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("client_secret.json");
    fs::write(
        &path,
        r#"{"installed": {
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "shh",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "redirect_uris": ["http://localhost"]
        }}"#,
    )?;

    let secrets = ClientSecrets::load(&path)?;
    assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
    assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");

    let flow = InstalledAppFlow::new(secrets);
    assert_eq!(flow.redirect_uri(), "http://127.0.0.1:8080/");
    Ok(())
}

#[test]
fn client_secrets_missing_or_malformed() -> TestResult<()> {
    let dir = tempdir()?;
    let missing = ClientSecrets::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(missing, AuthError::MissingCredentials(_)));

    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"other": {}}"#)?;
    let malformed = ClientSecrets::load(&path).unwrap_err();
    assert!(matches!(malformed, AuthError::InvalidSecrets(_)));
    Ok(())
}
