//! crates/clearcom_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format,
//! apart from the serde derives needed to carry them over the JSON relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Tone and Flow
//=========================================================================================

/// The style directive injected into every completion instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    #[default]
    Formal,
    SemiFormal,
    Informal,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Formal, Tone::SemiFormal, Tone::Informal];

    /// The exact token embedded in the system instruction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::SemiFormal => "semi-formal",
            Tone::Informal => "informal",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "formal" => Ok(Tone::Formal),
            "semi-formal" | "semiformal" => Ok(Tone::SemiFormal),
            "informal" => Ok(Tone::Informal),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// The two independent generation flows offered on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    #[default]
    Enhance,
    Email,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Enhance => "enhance",
            Flow::Email => "email",
        }
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enhance" => Ok(Flow::Enhance),
            "email" => Ok(Flow::Email),
            other => Err(format!("unknown flow '{}'", other)),
        }
    }
}

//=========================================================================================
// Authentication
//=========================================================================================

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An authentication session issued by the BaaS provider.
///
/// The application treats it as an opaque capability: it is never minted
/// locally, only received from the provider and handed back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl Session {
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

/// The token pair delivered in a password-recovery link fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryTokens {
    pub access_token: String,
    /// Empty when the fragment did not carry one.
    pub refresh_token: String,
}

//=========================================================================================
// Requests
//=========================================================================================

/// A single "request early access" submission from the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRequest {
    pub email: String,
}

/// Free-form text the user wants polished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    pub text: String,
    pub tone: Tone,
}

/// An email to answer plus the user's bullet points for the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraftRequest {
    pub original_email: String,
    pub draft_points: String,
    pub tone: Tone,
}

/// The two messages sent to the chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
}
