//! services/web/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::BaasHandle;
use crate::config::Config;
use crate::web::events::AuthEvents;
use crate::web::relay::GenerationService;
use clearcom_core::{i18n::Translator, ports::CompletionService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    /// The one backend handle for the whole process. May be unavailable.
    pub baas: BaasHandle,
    pub generation: GenerationService,
    pub translator: Arc<Translator>,
    pub events: AuthEvents,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        baas: BaasHandle,
        completion: Option<Arc<dyn CompletionService>>,
        translator: Arc<Translator>,
        events: AuthEvents,
    ) -> Self {
        let generation = GenerationService::new(completion, config.completion_timeout);
        Self {
            config,
            baas,
            generation,
            translator,
            events,
        }
    }

    /// Where emailed links (confirmation, password reset) send the user.
    pub fn public_link(&self, path: &str) -> String {
        format!("{}{}", self.config.public_url.trim_end_matches('/'), path)
    }
}
