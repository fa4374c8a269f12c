use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::clock::ManualClock;
use crate::workflows::verification::code::SequenceCodeGenerator;
use crate::workflows::verification::domain::{AccountRole, Identity, VerificationCode};
use crate::workflows::verification::notifier::{DeliveryError, VerificationNotifier};
use crate::workflows::verification::registration::{
    AccountDirectory, AccountId, AccountRecord, DirectoryError, NewAccount, RegistrationService,
};
use crate::workflows::verification::service::VerificationService;
use crate::workflows::verification::store::ShardedVerificationStore;

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
}

pub(super) fn identity(raw: &str) -> Identity {
    Identity::new(raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SentMail {
    Code {
        to: Identity,
        code: String,
        name: String,
    },
    Welcome {
        to: Identity,
        name: String,
        role: AccountRole,
    },
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    sent: Mutex<Vec<SentMail>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn last_code_for(&self, to: &Identity) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::Code { to: recipient, code, .. } if &recipient == to => Some(code),
            _ => None,
        })
    }
}

impl VerificationNotifier for MemoryNotifier {
    fn send_code(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        name: &str,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(SentMail::Code {
                to: identity.clone(),
                code: code.as_str().to_string(),
                name: name.to_string(),
            });
        Ok(())
    }

    fn send_welcome(
        &self,
        identity: &Identity,
        name: &str,
        role: AccountRole,
    ) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(SentMail::Welcome {
                to: identity.clone(),
                name: name.to_string(),
                role,
            });
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl VerificationNotifier for FailingNotifier {
    fn send_code(
        &self,
        _identity: &Identity,
        _code: &VerificationCode,
        _name: &str,
    ) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("smtp down".to_string()))
    }

    fn send_welcome(
        &self,
        _identity: &Identity,
        _name: &str,
        _role: AccountRole,
    ) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("smtp down".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    accounts: Mutex<HashMap<(AccountRole, Identity), AccountRecord>>,
}

impl MemoryDirectory {
    pub(super) fn count(&self) -> usize {
        self.accounts.lock().expect("directory mutex poisoned").len()
    }
}

impl AccountDirectory for MemoryDirectory {
    fn find(
        &self,
        role: AccountRole,
        identity: &Identity,
    ) -> Result<Option<AccountRecord>, DirectoryError> {
        let guard = self.accounts.lock().expect("directory mutex poisoned");
        Ok(guard.get(&(role, identity.clone())).cloned())
    }

    fn create(&self, account: NewAccount) -> Result<AccountRecord, DirectoryError> {
        let mut guard = self.accounts.lock().expect("directory mutex poisoned");
        let key = (account.role, account.identity.clone());
        if guard.contains_key(&key) {
            return Err(DirectoryError::Conflict);
        }
        let record = AccountRecord {
            id: AccountId(guard.len() as u64 + 1),
            role: account.role,
            identity: account.identity,
            name: account.name,
            credential: account.credential,
        };
        guard.insert(key, record.clone());
        Ok(record)
    }
}

pub(super) struct UnavailableDirectory;

impl AccountDirectory for UnavailableDirectory {
    fn find(
        &self,
        _role: AccountRole,
        _identity: &Identity,
    ) -> Result<Option<AccountRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn create(&self, _account: NewAccount) -> Result<AccountRecord, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestVerification = VerificationService<ShardedVerificationStore, MemoryNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<TestVerification>,
    pub(super) store: Arc<ShardedVerificationStore>,
    pub(super) notifier: Arc<MemoryNotifier>,
    pub(super) clock: Arc<ManualClock>,
}

/// Service wired to a manual clock and a code sequence of 111111, 222222, 333333.
pub(super) fn harness() -> Harness {
    let store = Arc::new(ShardedVerificationStore::new(4));
    let notifier = Arc::new(MemoryNotifier::default());
    let clock = Arc::new(ManualClock::new(t0()));
    let codes = Arc::new(
        SequenceCodeGenerator::new(["111111", "222222", "333333"]).expect("codes supplied"),
    );
    let service = Arc::new(VerificationService::with_parts(
        store.clone(),
        notifier.clone(),
        clock.clone(),
        codes,
    ));
    Harness {
        service,
        store,
        notifier,
        clock,
    }
}

pub(super) fn registration(
    harness: &Harness,
) -> (
    Arc<RegistrationService<ShardedVerificationStore, MemoryNotifier, MemoryDirectory>>,
    Arc<MemoryDirectory>,
) {
    let directory = Arc::new(MemoryDirectory::default());
    let service = Arc::new(RegistrationService::new(
        harness.service.clone(),
        directory.clone(),
    ));
    (service, directory)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
