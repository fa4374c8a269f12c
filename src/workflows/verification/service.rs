use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};

use super::code::{CodeGenerator, OsRngCodeGenerator};
use super::credential::{CredentialError, CredentialHash};
use super::domain::{
    Identity, PendingVerification, VerificationCode, VerificationFailure, VerificationPayload,
};
use super::notifier::VerificationNotifier;
use super::store::VerificationStore;

/// Issues, reads and consumes single-use verification codes.
pub struct VerificationService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
}

impl<S, N> VerificationService<S, N>
where
    S: VerificationStore + 'static,
    N: VerificationNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self::with_parts(
            store,
            notifier,
            Arc::new(SystemClock),
            Arc::new(OsRngCodeGenerator),
        )
    }

    pub fn with_parts(
        store: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            codes,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Issue a fresh code for `identity`, replacing any pending one, and mail it.
    ///
    /// Whether the identity already owns an account is the caller's concern.
    pub fn issue(
        &self,
        identity: &Identity,
        name: &str,
        secret: Option<&str>,
    ) -> Result<IssuedCode, VerificationError> {
        if identity.as_str().trim().is_empty() {
            return Err(VerificationError::Validation(
                "identity must not be blank".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(VerificationError::Validation(
                "name must not be blank".to_string(),
            ));
        }

        let secret = secret.map(CredentialHash::derive).transpose()?;
        let code = self.codes.generate();
        let entry = PendingVerification::new(
            identity.clone(),
            code.clone(),
            self.clock.now(),
            VerificationPayload {
                name: name.to_string(),
                secret,
            },
        );
        let expires_at = entry.expires_at;

        if self.store.replace(entry).is_some() {
            debug!(%identity, "superseded pending verification");
        }
        info!(%identity, %expires_at, "verification code issued");

        if let Err(err) = self.notifier.send_code(identity, &code, name) {
            warn!(%identity, error = %err, "verification code delivery failed");
        }

        Ok(IssuedCode { code, expires_at })
    }

    /// Name stored with the pending entry, without consuming it.
    pub fn read_name(&self, identity: &Identity) -> Option<String> {
        self.read(identity, |entry| entry.payload.name.clone())
    }

    /// Secret stored with the pending entry, without consuming it.
    pub fn read_secret(&self, identity: &Identity) -> Option<CredentialHash> {
        self.read(identity, |entry| entry.payload.secret.clone())
            .flatten()
    }

    /// Check `code` and consume the entry on success.
    pub fn verify(&self, identity: &Identity, code: &str) -> Result<(), VerificationFailure> {
        self.consume(identity, code, |_| true).map(|_| ())
    }

    /// Check `code` and hand back the payload in the same step that consumes the entry.
    pub fn verify_and_consume(
        &self,
        identity: &Identity,
        code: &str,
    ) -> Result<VerificationPayload, VerificationFailure> {
        self.consume(identity, code, |_| true).map(|entry| entry.payload)
    }

    /// Like [`VerificationService::verify_and_consume`], but only for entries whose
    /// payload satisfies `accept`. A rejected entry reports `NotFound` and stays pending.
    pub fn verify_and_consume_if(
        &self,
        identity: &Identity,
        code: &str,
        accept: impl FnOnce(&VerificationPayload) -> bool,
    ) -> Result<VerificationPayload, VerificationFailure> {
        self.consume(identity, code, accept).map(|entry| entry.payload)
    }

    /// Evict every expired entry. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        self.store.evict_expired(self.clock.now())
    }

    pub fn pending_count(&self) -> usize {
        self.store.len()
    }

    fn read<T>(
        &self,
        identity: &Identity,
        project: impl FnOnce(&PendingVerification) -> T,
    ) -> Option<T> {
        let now = self.clock.now();
        self.store.with_entry(identity, |slot| {
            if evict_if_expired(slot, now) {
                debug!(%identity, "evicted expired verification on read");
                return None;
            }
            slot.as_ref().map(project)
        })
    }

    fn consume(
        &self,
        identity: &Identity,
        code: &str,
        accept: impl FnOnce(&VerificationPayload) -> bool,
    ) -> Result<PendingVerification, VerificationFailure> {
        let now = self.clock.now();
        let outcome = self.store.with_entry(identity, |slot| {
            if evict_if_expired(slot, now) {
                return Err(VerificationFailure::Expired);
            }
            let Some(entry) = slot.as_ref() else {
                return Err(VerificationFailure::NotFound);
            };
            if !accept(&entry.payload) {
                return Err(VerificationFailure::NotFound);
            }
            // A wrong code leaves the entry in place for another attempt.
            if !entry.matches(code) {
                return Err(VerificationFailure::Invalid);
            }
            slot.take().ok_or(VerificationFailure::NotFound)
        });

        match &outcome {
            Ok(_) => info!(%identity, "verification succeeded"),
            Err(failure) => debug!(%identity, reason = failure.label(), "verification failed"),
        }
        outcome
    }
}

fn evict_if_expired(slot: &mut Option<PendingVerification>, now: DateTime<Utc>) -> bool {
    if slot.as_ref().is_some_and(|entry| entry.is_expired(now)) {
        *slot = None;
        true
    } else {
        false
    }
}

/// Code handed back to the caller of [`VerificationService::issue`].
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: VerificationCode,
    pub expires_at: DateTime<Utc>,
}

/// Failure to issue a code.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
