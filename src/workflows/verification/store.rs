use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::domain::{Identity, PendingVerification};

/// Storage for pending verifications, at most one per identity.
///
/// Implementations must run each closure passed to [`VerificationStore::with_entry`]
/// while holding exclusive access to that identity's slot, and must not block
/// callers working on other identities for longer than a map lookup.
pub trait VerificationStore: Send + Sync {
    /// Store `entry`, returning whatever it superseded.
    fn replace(&self, entry: PendingVerification) -> Option<PendingVerification>;

    /// Run `f` against the identity's slot. Leaving `None` in the slot removes the entry.
    fn with_entry<R>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&mut Option<PendingVerification>) -> R,
    ) -> R;

    /// Drop every entry that is expired at `now`, returning how many were removed.
    fn evict_expired(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Shard = Mutex<HashMap<Identity, PendingVerification>>;

/// In-memory store split into independently locked shards keyed by identity hash.
pub struct ShardedVerificationStore {
    shards: Box<[Shard]>,
    hasher: RandomState,
}

impl ShardedVerificationStore {
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, identity: &Identity) -> &Shard {
        let index = self.hasher.hash_one(identity) as usize % self.shards.len();
        &self.shards[index]
    }
}

impl Default for ShardedVerificationStore {
    fn default() -> Self {
        Self::new(crate::config::VerificationConfig::DEFAULT_SHARDS)
    }
}

impl VerificationStore for ShardedVerificationStore {
    fn replace(&self, entry: PendingVerification) -> Option<PendingVerification> {
        let mut shard = self.shard(&entry.identity).lock().expect("store shard poisoned");
        shard.insert(entry.identity.clone(), entry)
    }

    fn with_entry<R>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&mut Option<PendingVerification>) -> R,
    ) -> R {
        let mut shard = self.shard(identity).lock().expect("store shard poisoned");
        let mut slot = shard.remove(identity);
        let result = f(&mut slot);
        if let Some(entry) = slot {
            shard.insert(identity.clone(), entry);
        }
        result
    }

    fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                let mut shard = shard.lock().expect("store shard poisoned");
                let before = shard.len();
                shard.retain(|_, entry| !entry.is_expired(now));
                before - shard.len()
            })
            .sum()
    }

    fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().expect("store shard poisoned").len())
            .sum()
    }
}
