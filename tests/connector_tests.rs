//! End-to-end tests for the connector: OAuth exchange, token relaying and
//! API calls against mock servers.

use iaconnector::types::{ApiConfig, OAuthConfig};
use iaconnector::{ApiError, Connector, OAuthError, TokenKind, TokenSource};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK: &str = "https://app/cb";

/// Show library logs with `RUST_LOG=iaconnector=debug cargo test`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn oauth_config(server: &MockServer) -> OAuthConfig {
    OAuthConfig::builder()
        .client_id("c")
        .client_secret("s")
        .redirect_uri(CALLBACK)
        .scope(["read"])
        .base_url(format!("{}/o", server.uri()))
        .build()
}

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig::builder()
        .base_url(format!("{}/app/test/", server.uri()))
        .build()
}

async fn mount_token_endpoint(server: &MockServer, grant: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/o/token/"))
        .and(body_string_contains(format!("grant_type={grant}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Connector with both consumers, logged in with AT1/RT1
async fn logged_in(server: &MockServer) -> Connector {
    init_tracing();
    mount_token_endpoint(
        server,
        "authorization_code",
        json!({"access_token": "AT1", "refresh_token": "RT1", "token_type": "Bearer", "expires_in": 3600}),
    )
    .await;

    let mut connector = Connector::new();
    let state = connector
        .init_oauth(oauth_config(server))
        .unwrap()
        .authorization_url()
        .unwrap()
        .state;
    connector.init_api(api_config(server)).unwrap();

    connector
        .oauth()
        .unwrap()
        .fetch_access_token(&format!("{CALLBACK}?code=abc&state={state}"))
        .await
        .unwrap();
    connector
}

// ============================================================================
// OAuth exchange
// ============================================================================

#[tokio::test]
async fn test_fetch_propagates_to_api() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;

    let oauth = connector.oauth().unwrap();
    assert_eq!(oauth.access_token().unwrap(), "AT1");
    assert_eq!(oauth.renew_token().unwrap(), "RT1");
    let expiry = oauth.token_expiry().expect("expiry is set");
    assert!(expiry > chrono::Utc::now() + chrono::Duration::minutes(59));

    assert_eq!(
        connector.api().unwrap().access_token().as_deref(),
        Some("AT1")
    );

    let requests = server.received_requests().await.unwrap();
    let form = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(form.contains("code=abc"));
    assert!(form.contains("client_id=c"));
    assert!(form.contains("client_secret=s"));
    assert!(form.contains("redirect_uri=https%3A%2F%2Fapp%2Fcb"));
}

#[tokio::test]
async fn test_authorization_url_points_at_provider() {
    let server = MockServer::start().await;
    let mut connector = Connector::new();
    let request = connector
        .init_oauth(oauth_config(&server))
        .unwrap()
        .authorization_url()
        .unwrap();

    let url = url::Url::parse(&request.url).unwrap();
    assert_eq!(url.path(), "/o/authorize/");
    let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "c");
    assert_eq!(params["redirect_uri"], CALLBACK);
    assert_eq!(params["scope"], "read");
    assert_eq!(params["state"], request.state);
}

#[tokio::test]
async fn test_state_mismatch_is_rejected() {
    let server = MockServer::start().await;
    let mut connector = Connector::new();
    connector
        .init_oauth(oauth_config(&server))
        .unwrap()
        .authorization_url()
        .unwrap();

    let err = connector
        .oauth()
        .unwrap()
        .fetch_access_token(&format!("{CALLBACK}?code=abc&state=forged"))
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::StateMismatch));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_denied_authorization() {
    let server = MockServer::start().await;
    let mut connector = Connector::new();
    connector.init_oauth(oauth_config(&server)).unwrap();

    let err = connector
        .oauth()
        .unwrap()
        .fetch_access_token(&format!("{CALLBACK}?error=access_denied"))
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::Authorization { ref error, .. } if error == "access_denied"));
}

#[tokio::test]
async fn test_renew_replaces_and_propagates() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;
    mount_token_endpoint(
        &server,
        "refresh_token",
        json!({"access_token": "AT2", "refresh_token": "RT2", "expires_in": 60}),
    )
    .await;

    let oauth = connector.oauth().unwrap();
    let tokens = oauth.renew_access_token().await.unwrap();
    assert_eq!(tokens.access_token.as_deref(), Some("AT2"));
    assert_eq!(oauth.access_token().unwrap(), "AT2");
    assert_eq!(oauth.renew_token().unwrap(), "RT2");
    assert_eq!(
        connector.api().unwrap().access_token().as_deref(),
        Some("AT2")
    );

    let requests = server.received_requests().await.unwrap();
    let form = String::from_utf8(requests.last().unwrap().body.clone()).unwrap();
    assert!(form.contains("refresh_token=RT1"));
    assert!(form.contains("scope=read"));
}

#[tokio::test]
async fn test_token_endpoint_error_keeps_tokens() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/o/token/"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let oauth = connector.oauth().unwrap();
    let err = oauth.renew_access_token().await.unwrap_err();
    assert!(matches!(err, OAuthError::TokenEndpoint { ref error, .. } if error == "invalid_grant"));

    assert_eq!(oauth.access_token().unwrap(), "AT1");
    assert_eq!(oauth.renew_token().unwrap(), "RT1");
    assert_eq!(
        connector.api().unwrap().access_token().as_deref(),
        Some("AT1")
    );
}

#[tokio::test]
async fn test_renew_without_renew_token() {
    let server = MockServer::start().await;
    let mut connector = Connector::new();
    connector.init_oauth(oauth_config(&server)).unwrap();

    let err = connector
        .oauth()
        .unwrap()
        .renew_access_token()
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::MissingToken(TokenKind::Renew)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_incomplete_token_response() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        "authorization_code",
        json!({"access_token": "AT1", "expires_in": 3600}),
    )
    .await;

    let mut connector = Connector::new();
    connector.init_oauth(oauth_config(&server)).unwrap();
    connector.init_api(api_config(&server)).unwrap();

    let err = connector
        .oauth()
        .unwrap()
        .fetch_access_token(&format!("{CALLBACK}?code=abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, OAuthError::InvalidResponse(_)));
    assert!(connector.api().unwrap().access_token().is_none());
}

// ============================================================================
// API calls through the connector
// ============================================================================

#[tokio::test]
async fn test_api_uses_relayed_token() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/app/test/"))
        .and(header("Authorization", "Bearer AT1"))
        .and(body_partial_json(json!({"method": "getPersonDetails"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"name": "Jan"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let person = connector.api().unwrap().get_person_details().await.unwrap();
    assert_eq!(person["name"], "Jan");
}

#[tokio::test]
async fn test_signup_rejected() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/app/test/"))
        .and(body_partial_json(json!({"method": "activitySignup"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": 412, "message": "full"}})),
        )
        .mount(&server)
        .await;

    let err = connector
        .api()
        .unwrap()
        .activity_signup(7, 0.0, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::SignupRejected { ref message } if message == "full"));
    assert_eq!(err.code(), Some(412));
}

#[tokio::test]
async fn test_api_token_set_directly_reaches_oauth() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;

    connector.api().unwrap().set_access_token("manual");

    let oauth = connector.oauth().unwrap();
    assert_eq!(oauth.access_token().unwrap(), "manual");
    assert_eq!(oauth.renew_token().unwrap(), "RT1");
}

#[tokio::test]
async fn test_external_tokens() {
    let server = MockServer::start().await;
    let connector = logged_in(&server).await;

    connector.propagate_tokens(Some("EXT"), Some("EXT-R"), TokenSource::External);

    let oauth = connector.oauth().unwrap();
    assert_eq!(oauth.access_token().unwrap(), "EXT");
    assert_eq!(oauth.renew_token().unwrap(), "EXT-R");
    assert_eq!(
        connector.api().unwrap().access_token().as_deref(),
        Some("EXT")
    );
}
