//! crates/clearcom_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: every remote
//! capability the application consumes (authentication, the access-request
//! table, text generation) is reached through one of them.

use async_trait::async_trait;

use crate::domain::{AccessRequest, AuthUser, CompletionPrompt, RecoveryTokens, Session};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The backing service has no credentials in this deployment.
    #[error("Service is not configured")]
    NotConfigured,
    #[error("Unauthorized")]
    Unauthorized,
    /// The remote service refused the operation and said why.
    #[error("Rejected by remote service: {0}")]
    Rejected(String),
    #[error("Remote service timed out")]
    Timeout,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges an email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> PortResult<Session>;

    /// Registers a new account. The provider sends a confirmation email whose
    /// link points at `redirect_to`; no session exists until it is followed.
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &str) -> PortResult<()>;

    /// Sends password-reset instructions to `email`.
    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> PortResult<()>;

    /// Establishes a session from the tokens carried by a recovery link.
    async fn set_session(&self, tokens: &RecoveryTokens) -> PortResult<Session>;

    /// Trades a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> PortResult<Session>;

    /// Changes the password of the user owning `access_token`.
    async fn update_password(&self, access_token: &str, new_password: &str) -> PortResult<()>;

    async fn sign_out(&self, access_token: &str) -> PortResult<()>;

    /// Resolves the user behind an access token. `Unauthorized` means the
    /// token is expired or revoked.
    async fn get_user(&self, access_token: &str) -> PortResult<AuthUser>;
}

#[async_trait]
pub trait AccessRequestStore: Send + Sync {
    /// Inserts one row into the remote `access_requests` table.
    async fn insert_access_request(&self, request: &AccessRequest) -> PortResult<()>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a system + user message pair and returns the first choice's text,
    /// or an empty string when the response carried none.
    async fn complete(&self, prompt: &CompletionPrompt) -> PortResult<String>;
}
