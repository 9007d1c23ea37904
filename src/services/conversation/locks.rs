use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

pub type ChatGuard = OwnedMutexGuard<()>;

/// Serializes turns per chat. Entries are weak, so a chat with no turn in
/// flight holds no memory beyond a dead pointer until the next sweep.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<Uuid, Weak<AsyncMutex<()>>>>,
}

impl ChatLocks {
    pub async fn acquire(&self, chat_id: Uuid) -> ChatGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.retain(|_, lock| lock.strong_count() > 0);
            match map.get(&chat_id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    map.insert(chat_id, Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }
}
