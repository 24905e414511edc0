//! services/web/src/adapters/baas.rs
//!
//! The single, explicitly owned handle to the hosted backend.
//!
//! Construction never fails: a deployment missing its URL or key (or carrying
//! an unusable one) gets an unavailable handle, and every caller checks for
//! that before issuing a request so the page can say "service unavailable"
//! instead of failing like an ordinary request would.

use clearcom_core::ports::{AccessRequestStore, AuthService};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::adapters::supabase::SupabaseClient;

#[derive(Clone, Default)]
pub struct BaasHandle {
    auth: Option<Arc<dyn AuthService>>,
    access_requests: Option<Arc<dyn AccessRequestStore>>,
}

impl BaasHandle {
    /// Builds the handle from the two configuration values.
    pub fn from_config(url: Option<&str>, anon_key: Option<&str>, timeout: Duration) -> Self {
        let (Some(url), Some(anon_key)) = (url, anon_key) else {
            warn!("Supabase credentials are not configured; auth and access requests are disabled");
            return Self::unavailable();
        };

        match SupabaseClient::new(url, anon_key, timeout) {
            Ok(client) => {
                info!("Supabase client initialized for {}", url);
                let client = Arc::new(client);
                Self {
                    auth: Some(client.clone()),
                    access_requests: Some(client),
                }
            }
            Err(e) => {
                error!("Failed to initialize Supabase client: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Wraps already-built port implementations.
    pub fn from_parts(
        auth: Arc<dyn AuthService>,
        access_requests: Arc<dyn AccessRequestStore>,
    ) -> Self {
        Self {
            auth: Some(auth),
            access_requests: Some(access_requests),
        }
    }

    pub fn is_available(&self) -> bool {
        self.auth.is_some()
    }

    pub fn auth(&self) -> Option<&Arc<dyn AuthService>> {
        self.auth.as_ref()
    }

    pub fn access_requests(&self) -> Option<&Arc<dyn AccessRequestStore>> {
        self.access_requests.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn missing_values_give_an_unavailable_handle() {
        for (url, key) in [
            (None, None),
            (Some("https://abc.supabase.co"), None),
            (None, Some("anon")),
        ] {
            let handle = BaasHandle::from_config(url, key, TIMEOUT);
            assert!(!handle.is_available());
            assert!(handle.auth().is_none());
            assert!(handle.access_requests().is_none());
        }
    }

    #[test]
    fn unusable_url_gives_an_unavailable_handle() {
        let handle = BaasHandle::from_config(Some("::not-a-url::"), Some("anon"), TIMEOUT);
        assert!(!handle.is_available());
    }

    #[test]
    fn complete_configuration_gives_a_live_handle() {
        let handle =
            BaasHandle::from_config(Some("https://abc.supabase.co"), Some("anon"), TIMEOUT);
        assert!(handle.is_available());
        assert!(handle.access_requests().is_some());
    }
}
