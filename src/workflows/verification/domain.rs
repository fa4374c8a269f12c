use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::credential::CredentialHash;

/// Number of digits in an issued code.
pub const CODE_LENGTH: usize = 6;

/// Validity window of an issued code. Not configurable.
pub fn code_ttl() -> Duration {
    Duration::minutes(5)
}

/// Key under which a pending verification is tracked, an email address in practice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-length numeric single-use code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(pub String);

impl VerificationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code has the issued shape: exactly [`CODE_LENGTH`] ASCII digits.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == CODE_LENGTH && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

// Redacted so `?` formatting of pending entries never leaks a live code.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

/// Data handed back once the identity proves ownership of the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPayload {
    pub name: String,
    /// Present only for account types that register with a secret.
    pub secret: Option<CredentialHash>,
}

/// A code awaiting verification for one identity.
#[derive(Debug, Clone)]
pub struct PendingVerification {
    pub identity: Identity,
    pub code: VerificationCode,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payload: VerificationPayload,
}

impl PendingVerification {
    pub fn new(
        identity: Identity,
        code: VerificationCode,
        issued_at: DateTime<Utc>,
        payload: VerificationPayload,
    ) -> Self {
        Self {
            identity,
            code,
            issued_at,
            expires_at: issued_at + code_ttl(),
            payload,
        }
    }

    /// The expiry instant itself is still inside the window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.code.as_str() == candidate
    }
}

/// Reason a verification attempt did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    #[error("no pending verification for this identity")]
    NotFound,
    #[error("verification code expired")]
    Expired,
    #[error("verification code does not match")]
    Invalid,
}

impl VerificationFailure {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationFailure::NotFound => "not_found",
            VerificationFailure::Expired => "expired",
            VerificationFailure::Invalid => "invalid",
        }
    }

    /// Whether another attempt with the same pending entry can still succeed.
    pub const fn is_retryable(self) -> bool {
        matches!(self, VerificationFailure::Invalid)
    }
}

/// Kind of account a verification gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Student,
    Recruiter,
}

impl AccountRole {
    pub const fn label(self) -> &'static str {
        match self {
            AccountRole::Student => "Student",
            AccountRole::Recruiter => "Recruiter",
        }
    }

    /// Recruiters sign in with a secret; students are identified by email alone.
    pub const fn requires_secret(self) -> bool {
        matches!(self, AccountRole::Recruiter)
    }
}
