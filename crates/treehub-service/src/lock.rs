//! Per-user mutual exclusion for structural mutations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;
use uuid::Uuid;

/// Hands out one exclusive token per user.
///
/// The map of user mutexes is populated lazily and never shrinks. Locks
/// are not reentrant: acquiring twice for the same user from one task
/// deadlocks.
#[derive(Debug, Clone, Default)]
pub struct UserLockManager {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UserLockManager {
    /// Create an empty lock manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Wait until no one else holds `user_id`'s lock, then take it.
    pub async fn acquire(&self, user_id: Uuid) -> UserLockGuard {
        let guard = self.mutex_for(user_id).lock_owned().await;
        trace!(user_id = %user_id, "Acquired matter lock");
        UserLockGuard {
            user_id,
            _guard: guard,
        }
    }

    /// Take `user_id`'s lock only if it is free right now.
    pub fn try_acquire(&self, user_id: Uuid) -> Option<UserLockGuard> {
        let guard = self.mutex_for(user_id).try_lock_owned().ok()?;
        Some(UserLockGuard {
            user_id,
            _guard: guard,
        })
    }

    /// Whether some task currently holds `user_id`'s lock.
    pub fn is_locked(&self, user_id: Uuid) -> bool {
        self.locks
            .get(&user_id)
            .is_some_and(|mutex| mutex.try_lock().is_err())
    }

    /// Number of users that have ever taken a lock.
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one user's lock. Released on drop.
#[derive(Debug)]
pub struct UserLockGuard {
    user_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl UserLockGuard {
    /// The user this guard locks.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Release the lock.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        trace!(user_id = %self.user_id, "Released matter lock");
    }
}
