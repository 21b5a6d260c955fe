use anyhow::Result;
use chrono::{TimeDelta, Utc};
use httpmock::prelude::*;
use serde_json::json;
use smartstore_uploader::{Credentials, PlatformClient, Signer, SmartstoreError, TokenCache};
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "$2a$04$abcdefghijklmnopqrstuu";

fn signer_for(server: &MockServer) -> Signer {
    let http = PlatformClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    Signer::new(http)
}

fn credentials(client_id: &str) -> Credentials {
    Credentials::new(client_id, SECRET)
}

#[tokio::test]
async fn test_exchange_posts_signed_form() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .x_www_form_urlencoded_tuple("client_id", "client-a")
                .x_www_form_urlencoded_tuple("grant_type", "client_credentials")
                .x_www_form_urlencoded_tuple("type", "SELF")
                .x_www_form_urlencoded_key_exists("timestamp")
                .x_www_form_urlencoded_key_exists("client_secret_sign");
            then.status(200).json_body(json!({
                "access_token": "tok-1",
                "expires_in": 10800,
                "token_type": "Bearer"
            }));
        })
        .await;

    let before = Utc::now();
    let token = signer_for(&server).exchange(&credentials("client-a")).await?;

    token_mock.assert_async().await;
    assert_eq!(token.value, "tok-1");
    assert!(token.expires_at >= before + TimeDelta::seconds(10800));
    assert!(token.expires_at <= Utc::now() + TimeDelta::seconds(10800));
    Ok(())
}

#[tokio::test]
async fn test_valid_token_is_exchanged_once() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200)
                .json_body(json!({"access_token": "tok-1", "expires_in": 10800}));
        })
        .await;

    let signer = signer_for(&server);
    let cache = TokenCache::new();
    let creds = credentials("client-a");

    let first = signer.get_valid_token(&cache, &creds).await?;
    let second = signer.get_valid_token(&cache, &creds).await?;

    assert_eq!(first, second);
    token_mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_exchanged_again() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200)
                .json_body(json!({"access_token": "short-lived", "expires_in": 0}));
        })
        .await;

    let signer = signer_for(&server);
    let cache = TokenCache::new();
    let creds = credentials("client-a");

    signer.get_valid_token(&cache, &creds).await?;
    signer.get_valid_token(&cache, &creds).await?;

    token_mock.assert_hits_async(2).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_exchange() -> Result<()> {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200)
                .delay(Duration::from_millis(200))
                .json_body(json!({"access_token": "shared", "expires_in": 10800}));
        })
        .await;

    let signer = Arc::new(signer_for(&server));
    let cache = Arc::new(TokenCache::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let signer = Arc::clone(&signer);
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            signer.get_valid_token(&cache, &credentials("client-a")).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await??.value, "shared");
    }
    token_mock.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_each_client_id_gets_its_own_token() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock_a = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .x_www_form_urlencoded_tuple("client_id", "client-a");
            then.status(200)
                .json_body(json!({"access_token": "tok-a", "expires_in": 10800}));
        })
        .await;
    let mock_b = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .x_www_form_urlencoded_tuple("client_id", "client-b");
            then.status(200)
                .json_body(json!({"access_token": "tok-b", "expires_in": 10800}));
        })
        .await;

    let signer = signer_for(&server);
    let cache = TokenCache::new();

    assert_eq!(signer.get_valid_token(&cache, &credentials("client-a")).await?.value, "tok-a");
    assert_eq!(signer.get_valid_token(&cache, &credentials("client-b")).await?.value, "tok-b");
    assert_eq!(signer.get_valid_token(&cache, &credentials("client-a")).await?.value, "tok-a");

    mock_a.assert_hits_async(1).await;
    mock_b.assert_hits_async(1).await;
    Ok(())
}

#[tokio::test]
async fn test_rejected_signature_is_auth_error_with_upstream_message() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(400).json_body(json!({
                "code": "GW.AUTHN",
                "message": "client_secret_sign is invalid"
            }));
        })
        .await;

    let signer = signer_for(&server);
    let cache = TokenCache::new();
    let result = signer.get_valid_token(&cache, &credentials("client-a")).await;

    match result {
        Err(SmartstoreError::AuthError { message }) => {
            assert!(message.contains("client_secret_sign is invalid"));
        }
        other => panic!("expected AuthError, got {:?}", other),
    }
    assert!(cache.peek("client-a").await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_malformed_token_response_is_auth_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let result = signer_for(&server).exchange(&credentials("client-a")).await;
    assert!(matches!(result, Err(SmartstoreError::AuthError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_timeout_is_retryable_network_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/oauth2/token");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({"access_token": "late", "expires_in": 10800}));
        })
        .await;

    let http = PlatformClient::new(&server.base_url(), Duration::from_millis(200))?;
    let result = Signer::new(http).exchange(&credentials("client-a")).await;

    match result {
        Err(e @ SmartstoreError::NetworkError { timed_out: true, .. }) => assert!(e.is_retryable()),
        other => panic!("expected timed out NetworkError, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_validate_credentials() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .x_www_form_urlencoded_tuple("client_id", "good");
            then.status(200)
                .json_body(json!({"access_token": "tok", "expires_in": 10800}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/oauth2/token")
                .x_www_form_urlencoded_tuple("client_id", "bad");
            then.status(401).json_body(json!({"message": "unknown client"}));
        })
        .await;

    let signer = signer_for(&server);
    assert!(signer.validate_credentials(&credentials("good")).await?);
    assert!(!signer.validate_credentials(&credentials("bad")).await?);

    let malformed = Credentials::new("good", "not-a-bcrypt-salt");
    assert!(!signer.validate_credentials(&malformed).await?);
    Ok(())
}
