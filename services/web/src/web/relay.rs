//! services/web/src/web/relay.rs
//!
//! The server-side half of text generation. The browser submits the user's
//! text, tone and flow; this module validates it, turns it into a prompt and
//! calls the completion service with the credential only the server holds.
//! Both the dashboard forms and the JSON endpoint go through `GenerationService`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use clearcom_core::{
    domain::{CompletionPrompt, EmailDraftRequest, EnhancementRequest, Flow, Session, Tone},
    ports::{CompletionService, PortError},
    validation::{require_text, ValidationError},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::in_flight::InFlightRegistry;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(completion_handler),
    components(schemas(CompletionRequest, CompletionResponse, ErrorBody, ErrorDetail)),
    tags(
        (name = "ClearCom Relay", description = "Server-side text generation for signed-in users.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Generation
//=========================================================================================

/// One unit of work for the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Enhance(EnhancementRequest),
    Email(EmailDraftRequest),
}

impl GenerationRequest {
    pub fn flow(&self) -> Flow {
        match self {
            GenerationRequest::Enhance(_) => Flow::Enhance,
            GenerationRequest::Email(_) => Flow::Email,
        }
    }

    /// Checks the required input and builds the prompt. Draft points may be
    /// empty; the email being answered may not.
    pub fn to_prompt(&self) -> Result<CompletionPrompt, ValidationError> {
        match self {
            GenerationRequest::Enhance(req) => {
                require_text(&req.text, ValidationError::EmptyText)?;
                Ok(req.to_prompt())
            }
            GenerationRequest::Email(req) => {
                require_text(&req.original_email, ValidationError::EmptyEmailContent)?;
                Ok(req.to_prompt())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Text generation is not configured")]
    NotConfigured,
    #[error("A request for this flow is already in progress")]
    InProgress,
    #[error("Completion request failed: {0}")]
    Failed(PortError),
}

impl GenerationError {
    /// The message key shown to the user for this failure in `flow`.
    pub fn translation_key(&self, flow: Flow) -> &'static str {
        match self {
            GenerationError::Validation(e) => e.translation_key(),
            GenerationError::NotConfigured => "dashboard.errors.notConfigured",
            GenerationError::InProgress => "dashboard.errors.inProgress",
            GenerationError::Failed(_) => match flow {
                Flow::Enhance => "dashboard.errors.enhanceFailed",
                Flow::Email => "dashboard.errors.emailFailed",
            },
        }
    }
}

pub struct GenerationService {
    completion: Option<Arc<dyn CompletionService>>,
    in_flight: InFlightRegistry,
    timeout: Duration,
}

impl GenerationService {
    pub fn new(completion: Option<Arc<dyn CompletionService>>, timeout: Duration) -> Self {
        Self {
            completion,
            in_flight: InFlightRegistry::new(),
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// Runs one generation for `user_id`.
    ///
    /// Validation happens before anything else, so empty input never reaches
    /// the network. The in-flight mark for (user, flow) is held for the
    /// duration of the remote call and released on every exit path.
    pub async fn generate(
        &self,
        user_id: Uuid,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let prompt = request.to_prompt()?;
        let completion = self.completion.as_ref().ok_or(GenerationError::NotConfigured)?;

        let flow = request.flow();
        let _guard = self
            .in_flight
            .try_acquire(user_id, flow)
            .ok_or(GenerationError::InProgress)?;

        match tokio::time::timeout(self.timeout, completion.complete(&prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                error!("Completion for the {} flow failed: {}", flow.as_str(), e);
                Err(GenerationError::Failed(e))
            }
            Err(_) => {
                error!(
                    "Completion for the {} flow timed out after {:?}",
                    flow.as_str(),
                    self.timeout
                );
                Err(GenerationError::Failed(PortError::Timeout))
            }
        }
    }
}

//=========================================================================================
// JSON Relay
//=========================================================================================

/// A generation request submitted as JSON.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompletionRequest {
    /// `enhance` or `email`.
    #[schema(value_type = String, example = "enhance")]
    pub kind: Flow,
    /// `formal`, `semi-formal` or `informal`. Defaults to `formal`.
    #[serde(default)]
    #[schema(value_type = String, example = "formal")]
    pub tone: Tone,
    /// The text to enhance, or the email being answered.
    pub text: String,
    /// Points the reply should make. Only read for `email`.
    #[serde(default)]
    pub draft_points: Option<String>,
}

impl From<CompletionRequest> for GenerationRequest {
    fn from(req: CompletionRequest) -> Self {
        match req.kind {
            Flow::Enhance => GenerationRequest::Enhance(EnhancementRequest {
                text: req.text,
                tone: req.tone,
            }),
            Flow::Email => GenerationRequest::Email(EmailDraftRequest {
                original_email: req.text,
                draft_points: req.draft_points.unwrap_or_default(),
                tone: req.tone,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompletionResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Errors returned by the JSON endpoints.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(ValidationError),
    /// The body was not a well-formed completion request.
    #[error("The request body is not a valid completion request")]
    BadRequest,
    #[error("Text generation is not configured")]
    NotConfigured,
    #[error("A request of this kind is already in progress")]
    InProgress,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Authentication service is unavailable")]
    AuthUnavailable,
    #[error("Could not verify the session")]
    SessionCheckFailed,
    #[error("Text generation failed. Please try again.")]
    CompletionFailed,
}

impl RelayError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            RelayError::Validation(_) | RelayError::BadRequest => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            RelayError::NotConfigured | RelayError::AuthUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED")
            }
            RelayError::SessionCheckFailed => {
                (StatusCode::SERVICE_UNAVAILABLE, "SESSION_CHECK_FAILED")
            }
            RelayError::InProgress => (StatusCode::CONFLICT, "IN_PROGRESS"),
            RelayError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            RelayError::CompletionFailed => (StatusCode::BAD_GATEWAY, "COMPLETION_FAILED"),
        }
    }
}

impl From<GenerationError> for RelayError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::Validation(v) => RelayError::Validation(v),
            GenerationError::NotConfigured => RelayError::NotConfigured,
            GenerationError::InProgress => RelayError::InProgress,
            GenerationError::Failed(_) => RelayError::CompletionFailed,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Generate text for the signed-in user.
///
/// The upstream credential never leaves the server. Upstream error bodies are
/// logged, not returned.
#[utoipa::path(
    post,
    path = "/api/completions",
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Generated text", body = CompletionResponse),
        (status = 400, description = "Malformed body or empty required input", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody),
        (status = 409, description = "This flow already has a request in progress", body = ErrorBody),
        (status = 502, description = "The completion service failed", body = ErrorBody),
        (status = 503, description = "Generation or authentication is not configured", body = ErrorBody)
    )
)]
pub async fn completion_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    body: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<CompletionResponse>, RelayError> {
    let Json(req) = body.map_err(|rejection| {
        warn!("Rejected completion request body: {}", rejection.body_text());
        RelayError::BadRequest
    })?;
    let request = GenerationRequest::from(req);
    let result = state
        .generation
        .generate(session.user.id, &request)
        .await
        .map_err(|e| {
            if matches!(e, GenerationError::InProgress) {
                warn!("Duplicate {} submission refused", request.flow().as_str());
            }
            RelayError::from(e)
        })?;
    Ok(Json(CompletionResponse { result }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clearcom_core::ports::PortResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCompletion {
        calls: AtomicUsize,
        prompts: Mutex<Vec<CompletionPrompt>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl CompletionService for RecordingCompletion {
        async fn complete(&self, prompt: &CompletionPrompt) -> PortResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply
                .clone()
                .ok_or_else(|| PortError::Unexpected("upstream exploded".to_string()))
        }
    }

    struct HangingCompletion;

    #[async_trait]
    impl CompletionService for HangingCompletion {
        async fn complete(&self, _prompt: &CompletionPrompt) -> PortResult<String> {
            std::future::pending().await
        }
    }

    fn enhance(text: &str, tone: Tone) -> GenerationRequest {
        GenerationRequest::Enhance(EnhancementRequest {
            text: text.to_string(),
            tone,
        })
    }

    fn service(completion: Arc<dyn CompletionService>) -> GenerationService {
        GenerationService::new(Some(completion), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_completion_service() {
        let completion = Arc::new(RecordingCompletion::default());
        let service = service(completion.clone());

        let err = service
            .generate(Uuid::new_v4(), &enhance(" \n\t ", Tone::Formal))
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::Validation(ValidationError::EmptyText));
        assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn validation_is_reported_before_missing_configuration() {
        let service = GenerationService::new(None, Duration::from_secs(5));
        let err = service
            .generate(Uuid::new_v4(), &enhance("", Tone::Formal))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));

        let err = service
            .generate(Uuid::new_v4(), &enhance("hello", Tone::Formal))
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::NotConfigured);
    }

    #[tokio::test]
    async fn every_tone_reaches_the_system_instruction() {
        let completion = Arc::new(RecordingCompletion {
            reply: Some("ok".to_string()),
            ..Default::default()
        });
        let service = service(completion.clone());
        let user = Uuid::new_v4();

        for tone in Tone::ALL {
            service.generate(user, &enhance("hello", tone)).await.unwrap();
        }

        let prompts = completion.prompts.lock().unwrap();
        for (prompt, tone) in prompts.iter().zip(Tone::ALL) {
            assert!(prompt.system.contains(tone.as_str()), "{}", prompt.system);
        }
    }

    #[tokio::test]
    async fn email_draft_points_may_be_empty() {
        let completion = Arc::new(RecordingCompletion {
            reply: Some("Dear Sam".to_string()),
            ..Default::default()
        });
        let service = service(completion.clone());
        let request = GenerationRequest::Email(EmailDraftRequest {
            original_email: "Can we meet?".to_string(),
            draft_points: String::new(),
            tone: Tone::Informal,
        });

        assert_eq!(service.generate(Uuid::new_v4(), &request).await.unwrap(), "Dear Sam");
        assert_eq!(
            completion.prompts.lock().unwrap()[0].user,
            "Original Email: Can we meet?\n\nDraft Points: "
        );
    }

    #[tokio::test]
    async fn failure_releases_the_flow() {
        let completion = Arc::new(RecordingCompletion::default());
        let service = service(completion);
        let user = Uuid::new_v4();

        let err = service.generate(user, &enhance("hello", Tone::Formal)).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failed(PortError::Unexpected(_))));
        assert!(!service.in_flight().is_active(user, Flow::Enhance));
    }

    #[tokio::test]
    async fn hung_requests_time_out_and_release_the_flow() {
        let service =
            GenerationService::new(Some(Arc::new(HangingCompletion)), Duration::from_millis(20));
        let user = Uuid::new_v4();

        let err = service.generate(user, &enhance("hello", Tone::Formal)).await.unwrap_err();
        assert_eq!(err, GenerationError::Failed(PortError::Timeout));
        assert!(!service.in_flight().is_active(user, Flow::Enhance));
    }

    #[tokio::test]
    async fn duplicate_submission_of_the_same_flow_is_refused() {
        let service = GenerationService::new(Some(Arc::new(HangingCompletion)), Duration::from_secs(60));
        let user = Uuid::new_v4();
        let _held = service.in_flight().try_acquire(user, Flow::Enhance).unwrap();

        let err = service.generate(user, &enhance("hello", Tone::Formal)).await.unwrap_err();
        assert_eq!(err, GenerationError::InProgress);
    }

    #[test]
    fn failure_messages_are_flow_specific() {
        let failed = GenerationError::Failed(PortError::Timeout);
        assert_eq!(failed.translation_key(Flow::Enhance), "dashboard.errors.enhanceFailed");
        assert_eq!(failed.translation_key(Flow::Email), "dashboard.errors.emailFailed");
    }

    #[test]
    fn relay_errors_map_to_documented_statuses() {
        let cases = [
            (RelayError::Validation(ValidationError::EmptyText), 400, "VALIDATION_ERROR"),
            (RelayError::BadRequest, 400, "VALIDATION_ERROR"),
            (RelayError::NotConfigured, 503, "NOT_CONFIGURED"),
            (RelayError::InProgress, 409, "IN_PROGRESS"),
            (RelayError::Unauthorized, 401, "UNAUTHORIZED"),
            (RelayError::CompletionFailed, 502, "COMPLETION_FAILED"),
            (RelayError::SessionCheckFailed, 503, "SESSION_CHECK_FAILED"),
        ];
        for (err, status, code) in cases {
            let (s, c) = err.status_and_code();
            assert_eq!(s.as_u16(), status);
            assert_eq!(c, code);
        }
    }
}
