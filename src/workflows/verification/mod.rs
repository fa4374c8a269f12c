//! Single-use, time-boxed verification codes and the registration flow they gate.
//!
//! A code is issued per identity (replacing any earlier one), mailed through a
//! [`VerificationNotifier`], and consumed by the first matching verification inside
//! its five minute window. Expiry is checked on access and by an optional sweeper.

pub mod code;
pub mod credential;
pub mod domain;
pub mod notifier;
pub mod registration;
pub mod router;
pub mod service;
pub mod store;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use code::{CodeGenerator, OsRngCodeGenerator, SequenceCodeGenerator};
pub use credential::{CredentialError, CredentialHash};
pub use domain::{
    code_ttl, AccountRole, Identity, PendingVerification, VerificationCode, VerificationFailure,
    VerificationPayload, CODE_LENGTH,
};
pub use notifier::{
    code_message, welcome_message, DeliveryError, LoggingNotifier, OutboundMessage,
    VerificationNotifier,
};
pub use registration::{
    AccountDirectory, AccountId, AccountRecord, DirectoryError, NewAccount, PendingRegistration,
    RegistrationError, RegistrationRequest, RegistrationService,
};
pub use router::registration_router;
pub use service::{IssuedCode, VerificationError, VerificationService};
pub use store::{ShardedVerificationStore, VerificationStore};
pub use sweeper::spawn_sweeper;
