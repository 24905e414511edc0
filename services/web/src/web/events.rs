//! services/web/src/web/events.rs
//!
//! Session-change notifications. Handlers publish an `AuthEvent` after each
//! auth operation succeeds; interested parties hold an `AuthSubscription`
//! for as long as they want to hear about them.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: Uuid },
    /// Cookies were cleared; the provider may no longer know whose they were.
    SignedOut,
    /// A recovery link was exchanged for a session.
    PasswordRecovery { user_id: Uuid },
    UserUpdated { user_id: Uuid },
    TokenRefreshed { user_id: Uuid },
}

#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }

    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Waits for the next event. Returns `None` once the channel is closed.
    /// Events missed because the subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Auth event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Logs every auth event until `shutdown` fires.
pub async fn log_auth_events(events: AuthEvents, shutdown: CancellationToken) {
    let mut subscription = events.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = subscription.recv() => match event {
                Some(event) => info!(?event, "auth state changed"),
                None => break,
            },
        }
    }
    info!("Auth event logger stopped.");
}
