mod common;

use chatrelay::models::{Message, NewUser, Role};
use chatrelay::storage::{ConversationStore, ModelCatalog, PgStore, StoreError, UserStore};
use chrono::{Duration, Utc};
use uuid::Uuid;

async fn store() -> Option<PgStore> {
    match common::configure_database().await {
        Ok(pool) => Some(PgStore::new(pool)),
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            None
        }
    }
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.into(),
        email: format!("{}@example.com", name),
        password_hash: "hash".into(),
    }
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let Some(store) = store().await else { return };

    let alice = store.create_user(new_user("alice")).await.unwrap();
    let found = store.get_user_by_id(alice.id).await.unwrap();
    assert_eq!(found.username, "alice");
    assert!(found.is_active);
    let err = store.create_user(new_user("alice")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "{:?}", err);

    let missing = store.get_user_by_username("nobody").await.unwrap_err();
    assert_eq!(missing, StoreError::NotFound);
}

#[tokio::test]
async fn messages_come_back_in_creation_order_and_writes_are_idempotent() {
    let Some(store) = store().await else { return };

    let user = store.create_user(new_user("bob")).await.unwrap();
    let now = Utc::now();
    let chat = store
        .create_chat(user.id, "Hi".into(), "v1".into(), now)
        .await
        .unwrap();

    let question = Message::new(chat.id, user.id, Role::User, "Hi".into(), now);
    let answer = Message::new(
        chat.id,
        user.id,
        Role::Assistant,
        "Hello!".into(),
        now + Duration::milliseconds(1),
    );
    store.create_message(&answer).await.unwrap();
    store.create_message(&question).await.unwrap();
    store.create_message(&answer).await.unwrap();

    let messages = store.get_messages_by_chat_id(chat.id).await.unwrap();
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant]);

    let context = store.get_message_context_by_chat_id(chat.id).await.unwrap();
    assert_eq!(context.len(), 2);
    assert_eq!(context[1].content, "Hello!");
}

#[tokio::test]
async fn history_sorts_by_recency_and_delete_cascades() {
    let Some(store) = store().await else { return };

    let user = store.create_user(new_user("carol")).await.unwrap();
    let now = Utc::now();
    let older = store
        .create_chat(user.id, "older".into(), "v1".into(), now)
        .await
        .unwrap();
    let mut newer = store
        .create_chat(user.id, "newer".into(), "v1".into(), now)
        .await
        .unwrap();
    newer.touch(now + Duration::seconds(5));
    store.update_chat(&newer).await.unwrap();

    let chats = store.get_chats_by_user_id(user.id, true).await.unwrap();
    let ids: Vec<Uuid> = chats.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let message = Message::new(older.id, user.id, Role::User, "x".into(), now);
    store.create_message(&message).await.unwrap();
    store.delete_chat(older.id).await.unwrap();

    assert_eq!(store.get_chat_by_id(older.id).await.unwrap_err(), StoreError::NotFound);
    assert!(store.get_messages_by_chat_id(older.id).await.unwrap().is_empty());
    assert_eq!(store.delete_chat(older.id).await.unwrap_err(), StoreError::NotFound);

    let late = Message::new(older.id, user.id, Role::Assistant, "late".into(), now);
    assert_eq!(store.create_message(&late).await.unwrap_err(), StoreError::NotFound);
}

#[tokio::test]
async fn seeded_models_are_listed() {
    let Some(store) = store().await else { return };

    let models = store.list_active_models().await.unwrap();
    assert_eq!(models.len(), 4);
}
