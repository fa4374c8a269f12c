use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::credential::CredentialHash;
use super::domain::{AccountRole, Identity, VerificationFailure};
use super::notifier::VerificationNotifier;
use super::service::{VerificationError, VerificationService};
use super::store::VerificationStore;

/// Identifier assigned by the account directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

/// A registered student or recruiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub role: AccountRole,
    pub identity: Identity,
    pub name: String,
    pub credential: Option<CredentialHash>,
}

/// Account about to be created once its identity is verified.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub role: AccountRole,
    pub identity: Identity,
    pub name: String,
    pub credential: Option<CredentialHash>,
}

/// Account persistence owned outside this crate.
pub trait AccountDirectory: Send + Sync {
    fn find(
        &self,
        role: AccountRole,
        identity: &Identity,
    ) -> Result<Option<AccountRecord>, DirectoryError>;
    fn create(&self, account: NewAccount) -> Result<AccountRecord, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("account already exists")]
    Conflict,
    #[error("account directory unavailable: {0}")]
    Unavailable(String),
}

/// Raw registration form; fields are optional so blank input surfaces as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Acknowledgement that a code is on its way.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRegistration {
    pub email: Identity,
    pub role: AccountRole,
    pub expires_at: DateTime<Utc>,
}

/// Account creation gated on a verified email.
pub struct RegistrationService<S, N, D> {
    verification: Arc<VerificationService<S, N>>,
    directory: Arc<D>,
}

impl<S, N, D> RegistrationService<S, N, D>
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
    D: AccountDirectory + 'static,
{
    pub fn new(verification: Arc<VerificationService<S, N>>, directory: Arc<D>) -> Self {
        Self {
            verification,
            directory,
        }
    }

    pub fn verification(&self) -> &Arc<VerificationService<S, N>> {
        &self.verification
    }

    /// Validate the form, refuse known identities, then issue and mail a code.
    pub fn register(
        &self,
        role: AccountRole,
        request: RegistrationRequest,
    ) -> Result<PendingRegistration, RegistrationError> {
        let email = required(request.email);
        let name = required(request.name);
        let password = request
            .password
            .filter(|password| !password.trim().is_empty());

        let (email, name, password) = match (role, email, name, password) {
            (AccountRole::Student, Some(email), Some(name), _) => (email, name, None),
            (AccountRole::Recruiter, Some(email), Some(name), Some(password)) => {
                (email, name, Some(password))
            }
            (AccountRole::Student, ..) => {
                return Err(RegistrationError::Validation(
                    "Email and name are required!".to_string(),
                ))
            }
            (AccountRole::Recruiter, ..) => {
                return Err(RegistrationError::Validation(
                    "Email, name, and password are required!".to_string(),
                ))
            }
        };

        let identity = Identity::new(email);
        if self.directory.find(role, &identity)?.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let issued = self
            .verification
            .issue(&identity, &name, password.as_deref())?;

        Ok(PendingRegistration {
            email: identity,
            role,
            expires_at: issued.expires_at,
        })
    }

    /// Consume the code and create the account it was issued for.
    pub fn confirm(
        &self,
        role: AccountRole,
        email: Option<String>,
        code: Option<String>,
    ) -> Result<AccountRecord, RegistrationError> {
        let (Some(email), Some(code)) = (required(email), required(code)) else {
            return Err(RegistrationError::Validation(
                "Email and OTP are required!".to_string(),
            ));
        };
        let identity = Identity::new(email);

        // A recruiter confirm must not consume a registration started without a secret.
        let payload = self
            .verification
            .verify_and_consume_if(&identity, &code, |payload| {
                !role.requires_secret() || payload.secret.is_some()
            })?;

        // Another request may have registered the identity while the code was pending.
        if self.directory.find(role, &identity)?.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }

        let record = self
            .directory
            .create(NewAccount {
                role,
                identity: identity.clone(),
                name: payload.name,
                credential: if role.requires_secret() {
                    payload.secret
                } else {
                    None
                },
            })
            .map_err(|err| match err {
                DirectoryError::Conflict => RegistrationError::AlreadyRegistered,
                other => RegistrationError::Directory(other),
            })?;

        info!(%identity, role = role.label(), account = record.id.0, "account registered");

        if let Err(err) = self
            .verification
            .notifier()
            .send_welcome(&identity, &record.name, role)
        {
            warn!(%identity, error = %err, "welcome mail delivery failed");
        }

        Ok(record)
    }

    /// Check a recruiter's secret against the stored hash.
    pub fn authenticate_recruiter(
        &self,
        email: Option<String>,
        secret: Option<String>,
    ) -> Result<AccountRecord, RegistrationError> {
        let (Some(email), Some(secret)) = (required(email), secret) else {
            return Err(RegistrationError::InvalidCredentials);
        };

        let record = self
            .directory
            .find(AccountRole::Recruiter, &Identity::new(email))?
            .ok_or(RegistrationError::InvalidCredentials)?;

        match &record.credential {
            Some(hash) if hash.verify(&secret) => Ok(record),
            _ => Err(RegistrationError::InvalidCredentials),
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Error raised by the registration flow.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered! Please login instead.")]
    AlreadyRegistered,
    #[error(transparent)]
    Verification(#[from] VerificationFailure),
    #[error(transparent)]
    Issue(#[from] VerificationError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("Invalid credentials!")]
    InvalidCredentials,
}
