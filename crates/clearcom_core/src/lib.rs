pub mod domain;
pub mod i18n;
pub mod ports;
pub mod prompts;
pub mod recovery;
pub mod validation;

pub use domain::{
    AccessRequest, AuthUser, CompletionPrompt, EmailDraftRequest, EnhancementRequest, Flow,
    RecoveryTokens, Session, Tone,
};
pub use i18n::{Locale, Translator};
pub use ports::{AccessRequestStore, AuthService, CompletionService, PortError, PortResult};
pub use validation::ValidationError;
