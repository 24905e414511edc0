//! services/web/src/adapters/supabase.rs
//!
//! This module contains the adapter for the hosted backend (Supabase). It
//! implements the `AuthService` and `AccessRequestStore` ports from the `core`
//! crate by talking to the provider's auth and REST endpoints with `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use clearcom_core::{
    domain::{AccessRequest, AuthUser, RecoveryTokens, Session},
    ports::{AccessRequestStore, AuthService, PortError, PortResult},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const ACCESS_REQUESTS_TABLE: &str = "access_requests";

/// Why a client could not be built from the supplied settings.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseInitError {
    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the auth and table ports against Supabase.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Creates a new `SupabaseClient`. Only `http`/`https` URLs are accepted.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        timeout: Duration,
    ) -> Result<Self, SupabaseInitError> {
        let parsed = Url::parse(base_url)
            .map_err(|_| SupabaseInitError::InvalidUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(SupabaseInitError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attaches the project key and the bearer token (the user's, or the
    /// project key for anonymous calls).
    fn authorize(&self, request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
    }

    async fn send(&self, request: RequestBuilder) -> PortResult<Response> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("Supabase returned {}: {}", status, body);
        Err(map_status_error(status, &body))
    }

    async fn token_grant<T: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &T,
    ) -> PortResult<Session> {
        let request = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .json(body);
        let response = self.send(self.authorize(request, None)).await?;
        let token: TokenResponse = response.json().await.map_err(map_transport_error)?;
        Ok(token.into_domain())
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct UserRecord {
    id: Uuid,
    email: Option<String>,
}

impl UserRecord {
    fn into_domain(self) -> AuthUser {
        AuthUser {
            id: self.id,
            email: self.email.filter(|e| !e.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserRecord,
}

impl TokenResponse {
    fn into_domain(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + ChronoDuration::seconds(secs))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into_domain(),
        }
    }
}

/// The provider reports errors under different field names depending on
/// which of its services answered.
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn map_transport_error(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout
    } else {
        PortError::Unexpected(e.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &str) -> PortError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return PortError::Unauthorized;
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message);
    if status.is_client_error() {
        PortError::Rejected(message.unwrap_or_else(|| status.to_string()))
    } else {
        PortError::Unexpected(format!(
            "status {}: {}",
            status,
            message.unwrap_or_else(|| body.to_string())
        ))
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthService for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> PortResult<Session> {
        self.token_grant("password", &Credentials { email, password })
            .await
    }

    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> PortResult<()> {
        let request = self
            .http
            .post(self.auth_url("signup"))
            .query(&[("redirect_to", redirect_to)])
            .json(&Credentials { email, password });
        self.send(self.authorize(request, None)).await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> PortResult<()> {
        let request = self
            .http
            .post(self.auth_url("recover"))
            .query(&[("redirect_to", redirect_to)])
            .json(&EmailOnly { email });
        self.send(self.authorize(request, None)).await?;
        Ok(())
    }

    async fn set_session(&self, tokens: &RecoveryTokens) -> PortResult<Session> {
        match self.get_user(&tokens.access_token).await {
            Ok(user) => Ok(Session {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                expires_at: None,
                user,
            }),
            Err(PortError::Unauthorized) if !tokens.refresh_token.is_empty() => {
                self.refresh_session(&tokens.refresh_token).await
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> PortResult<Session> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> PortResult<()> {
        let request = self
            .http
            .put(self.auth_url("user"))
            .json(&PasswordUpdate {
                password: new_password,
            });
        self.send(self.authorize(request, Some(access_token))).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> PortResult<()> {
        let request = self.http.post(self.auth_url("logout"));
        self.send(self.authorize(request, Some(access_token))).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> PortResult<AuthUser> {
        let request = self.http.get(self.auth_url("user"));
        let response = self.send(self.authorize(request, Some(access_token))).await?;
        let user: UserRecord = response.json().await.map_err(map_transport_error)?;
        Ok(user.into_domain())
    }
}

#[async_trait]
impl AccessRequestStore for SupabaseClient {
    async fn insert_access_request(&self, request: &AccessRequest) -> PortResult<()> {
        let builder = self
            .http
            .post(self.rest_url(ACCESS_REQUESTS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&[request]);
        self.send(self.authorize(builder, None)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const USER_ID: &str = "6f1b1c1e-2a7b-4c59-9a0d-3b1f0e5d7c21";

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&server.base_url(), "anon-key", Duration::from_secs(5))
            .expect("mock server URL is valid")
    }

    fn token_body() -> serde_json::Value {
        json!({
            "access_token": "access-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "refresh-1",
            "user": { "id": USER_ID, "email": "ada@example.com" }
        })
    }

    #[test]
    fn rejects_unusable_urls() {
        for url in ["", "not a url", "ftp://example.com", "file:///tmp/x"] {
            assert!(
                SupabaseClient::new(url, "key", Duration::from_secs(1)).is_err(),
                "{url} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn sign_in_returns_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/v1/token")
                .query_param("grant_type", "password")
                .header("apikey", "anon-key")
                .json_body(json!({"email": "ada@example.com", "password": "hunter22"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(token_body());
        });

        let session = client_for(&server)
            .sign_in("ada@example.com", "hunter22")
            .await
            .expect("sign in succeeds");

        mock.assert();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token, "refresh-1");
        assert_eq!(session.email(), Some("ada@example.com"));
        assert_eq!(
            session.expires_at,
            DateTime::<Utc>::from_timestamp(1_900_000_000, 0)
        );
    }

    #[tokio::test]
    async fn bad_credentials_surface_provider_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/v1/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
        });

        let err = client_for(&server)
            .sign_in("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, PortError::Rejected("Invalid login credentials".to_string()));
    }

    #[tokio::test]
    async fn sign_up_forwards_redirect_target() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/v1/signup")
                .query_param("redirect_to", "https://clearcom.example");
            then.status(200).json_body(json!({"id": USER_ID}));
        });

        client_for(&server)
            .sign_up("ada@example.com", "hunter22", "https://clearcom.example")
            .await
            .expect("sign up succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn get_user_maps_401_to_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/auth/v1/user")
                .header("authorization", "Bearer stale");
            then.status(401).json_body(json!({"msg": "JWT expired"}));
        });

        let err = client_for(&server).get_user("stale").await.unwrap_err();
        assert_eq!(err, PortError::Unauthorized);
    }

    #[tokio::test]
    async fn set_session_uses_the_recovery_tokens() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/v1/user")
                .header("authorization", "Bearer X");
            then.status(200)
                .json_body(json!({"id": USER_ID, "email": "ada@example.com"}));
        });

        let session = client_for(&server)
            .set_session(&RecoveryTokens {
                access_token: "X".to_string(),
                refresh_token: "Y".to_string(),
            })
            .await
            .expect("session established");

        mock.assert();
        assert_eq!(session.access_token, "X");
        assert_eq!(session.refresh_token, "Y");
    }

    #[tokio::test]
    async fn access_request_is_inserted_as_single_row() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/access_requests")
                .header("prefer", "return=minimal")
                .header("authorization", "Bearer anon-key")
                .json_body(json!([{"email": "ada@example.com"}]));
            then.status(201);
        });

        client_for(&server)
            .insert_access_request(&AccessRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .expect("insert succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn server_errors_are_unexpected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/rest/v1/access_requests");
            then.status(503).body("upstream down");
        });

        let err = client_for(&server)
            .insert_access_request(&AccessRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(msg) if msg.contains("upstream down")));
    }
}
