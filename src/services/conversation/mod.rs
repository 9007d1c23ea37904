//! Turn orchestration: validates a turn, resolves its chat, rebuilds the
//! context window, streams the completion back and persists both sides.

mod clock;
mod finalize;
mod locks;
mod relay;
mod turn;


pub use clock::{Clock, SystemClock};
pub use locks::ChatLocks;
pub use relay::BodyStream;
pub use turn::{Turn, TurnTarget};

use crate::configuration::ConversationSettings;
use crate::connectors::{CompletionConnector, FragmentStream};
use crate::forms::ConversationForm;
use crate::models::{Chat, Message, MessageContent, Role};
use crate::services::ServiceError;
use crate::storage::{ConversationStore, StoreError};
use chrono::Duration as ChronoDuration;
use finalize::Finalizer;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

pub struct TurnResponse {
    pub chat_id: Uuid,
    pub body: BodyStream,
}

impl std::fmt::Debug for TurnResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnResponse")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

pub struct ConversationOrchestrator {
    store: Arc<dyn ConversationStore>,
    completion: Arc<dyn CompletionConnector>,
    clock: Arc<dyn Clock>,
    locks: ChatLocks,
    settings: ConversationSettings,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        completion: Arc<dyn CompletionConnector>,
        clock: Arc<dyn Clock>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            store,
            completion,
            clock,
            locks: ChatLocks::default(),
            settings,
        }
    }

    #[tracing::instrument(name = "Conversation turn.", skip(self, form), fields(user_id = ?identity))]
    pub async fn handle_turn(
        &self,
        identity: Option<Uuid>,
        form: ConversationForm,
    ) -> Result<TurnResponse, ServiceError> {
        let user_id =
            identity.ok_or_else(|| ServiceError::unauthorized("c-001", "Unauthorized request"))?;
        let turn = Turn::try_from(form)?;
        tracing::debug!(client_created_at = %turn.client_created_at, "turn validated");

        let (chat, guard, mut window) = match &turn.target {
            TurnTarget::NewChat { ai_model_version } => {
                let chat = self
                    .store
                    .create_chat(
                        user_id,
                        Chat::title_from(&turn.content),
                        ai_model_version.clone(),
                        self.clock.now(),
                    )
                    .await
                    .map_err(|err| {
                        ServiceError::persistence("c-009", format!("Failed to create chat: {}", err))
                    })?;
                tracing::info!(chat_id = %chat.id, "chat created");
                let guard = self.locks.acquire(chat.id).await;
                (chat, guard, Vec::new())
            }
            TurnTarget::Continue { chat_id } => {
                let guard = self.locks.acquire(*chat_id).await;
                let chat = self.owned_chat(*chat_id, user_id).await?;
                let window = self
                    .store
                    .get_message_context_by_chat_id(chat.id)
                    .await
                    .map_err(|err| {
                        ServiceError::persistence("c-008", format!("Failed to load context: {}", err))
                    })?;
                (chat, guard, window)
            }
        };

        // strictly after the previous reply, whose stamp is `last_updated`
        let user_at = match &turn.target {
            TurnTarget::NewChat { .. } => self.clock.now(),
            TurnTarget::Continue { .. } => self
                .clock
                .now()
                .max(chat.last_updated + ChronoDuration::microseconds(1)),
        };
        let mut user_message = Message::new(chat.id, user_id, Role::User, turn.content, user_at);
        user_message.is_edited = turn.is_edited;
        if let Err(err) = self.store.create_message(&user_message).await {
            if matches!(turn.target, TurnTarget::NewChat { .. }) {
                self.discard_empty_chat(chat.id).await;
            }
            return Err(ServiceError::persistence(
                "c-010",
                format!("Failed to save message: {}", err),
            ));
        }
        window.push(user_message.context());

        let deadline = Instant::now() + Duration::from_secs(self.settings.stream_timeout_secs);
        let (upstream, first) = self.open(window, &chat.ai_model_version, deadline).await?;

        let chat_id = chat.id;
        let finalizer = Finalizer::new(
            self.store.clone(),
            self.clock.clone(),
            chat,
            user_message.created_at,
            &self.settings,
            guard,
        );

        let body = match first {
            Some(first) => relay::relay(upstream, Some(first), deadline, finalizer),
            None => {
                // finished without output; nothing left to poll
                finalizer.spawn(String::new());
                stream::empty().boxed()
            }
        };

        Ok(TurnResponse { chat_id, body })
    }

    /// Removes a chat created by a turn that failed before storing anything.
    async fn discard_empty_chat(&self, chat_id: Uuid) {
        match self.store.delete_chat(chat_id).await {
            Ok(()) => tracing::info!(%chat_id, "empty chat discarded"),
            Err(err) => tracing::error!(%chat_id, "Failed to discard empty chat: {}", err),
        }
    }

    async fn owned_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<Chat, ServiceError> {
        let chat = self.store.get_chat_by_id(chat_id).await.map_err(|err| match err {
            StoreError::NotFound => ServiceError::not_found("c-006", "Chat not found"),
            other => ServiceError::persistence("c-008", format!("Failed to load chat: {}", other)),
        })?;

        if !chat.is_owned_by(&user_id) {
            return Err(ServiceError::forbidden(
                "c-007",
                "You do not have access to this chat",
            ));
        }
        Ok(chat)
    }

    /// Opens the completion stream and waits for its first non-empty
    /// fragment, so that failures before any output stay reportable.
    async fn open(
        &self,
        window: Vec<MessageContent>,
        model_version: &str,
        deadline: Instant,
    ) -> Result<(FragmentStream, Option<String>), ServiceError> {
        let elapsed = || ServiceError::timeout("c-012", "Completion request timed out");

        let mut upstream = timeout_at(
            deadline,
            self.completion.stream_completion(window, model_version),
        )
        .await
        .map_err(|_| elapsed())?
        .map_err(|err| ServiceError::upstream("c-011", format!("Completion request failed: {}", err)))?;

        loop {
            match timeout_at(deadline, upstream.next()).await.map_err(|_| elapsed())? {
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => return Ok((upstream, Some(fragment))),
                Some(Err(err)) => {
                    return Err(ServiceError::upstream(
                        "c-013",
                        format!("Completion stream failed: {}", err),
                    ))
                }
                None => return Ok((upstream, None)),
            }
        }
    }
}
