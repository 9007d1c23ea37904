use super::clock::Clock;
use super::locks::ChatGuard;
use crate::configuration::ConversationSettings;
use crate::models::{Chat, Message, Role};
use crate::storage::{ConversationStore, StoreError};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Writes the assistant side of a turn once the stream has ended. Runs
/// detached from the request, and holds the chat lock until it is done.
pub struct Finalizer {
    store: Arc<dyn ConversationStore>,
    clock: Arc<dyn Clock>,
    chat: Chat,
    user_message_at: DateTime<Utc>,
    attempts: usize,
    backoff: Duration,
    guard: ChatGuard,
}

impl Finalizer {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        clock: Arc<dyn Clock>,
        chat: Chat,
        user_message_at: DateTime<Utc>,
        settings: &ConversationSettings,
        guard: ChatGuard,
    ) -> Self {
        Self {
            store,
            clock,
            chat,
            user_message_at,
            attempts: settings.persist_attempts.max(1),
            backoff: Duration::from_millis(settings.persist_backoff_ms),
            guard,
        }
    }

    pub fn spawn(self, content: String) -> JoinHandle<()> {
        let span = tracing::info_span!("Finalize turn", chat_id = %self.chat.id);
        tokio::spawn(self.run(content).instrument(span))
    }

    async fn run(self, content: String) {
        let Finalizer {
            store,
            clock,
            mut chat,
            user_message_at,
            attempts,
            backoff,
            guard,
        } = self;

        // strictly after the user message so the pair can never swap places
        let at = clock
            .now()
            .max(user_message_at + ChronoDuration::microseconds(1));
        let message = Message::new(chat.id, chat.user_id, Role::Assistant, content, at);

        let stored = with_retry(attempts, backoff, "assistant message", || {
            store.create_message(&message)
        })
        .await;
        if let Err(err) = stored {
            tracing::error!(code = "c-015", "Failed to persist assistant message: {}", err);
            return;
        }

        chat.touch(at);
        let updated = with_retry(attempts, backoff, "chat update", || store.update_chat(&chat)).await;
        if let Err(err) = updated {
            tracing::error!(code = "c-016", "Failed to update chat: {}", err);
            return;
        }

        drop(guard);
        tracing::info!(message_id = %message.id, "turn finalized");
    }
}

/// Retries transient store failures with exponential backoff. `NotFound`
/// is final.
pub(super) async fn with_retry<T, F, Fut>(
    attempts: usize,
    backoff: Duration,
    what: &str,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut delay = backoff;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(StoreError::NotFound) => return Err(StoreError::NotFound),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                tracing::warn!(attempt, "{} failed, retrying in {:?}: {}", what, delay, err);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}
