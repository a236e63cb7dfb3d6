use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time;

use crate::common::{ChatId, CreateChatRequest, SendMessageRequest, Session};
use crate::network::ChatApi;

use super::state::ChatState;

/// Result of one message load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLoad {
    NoActiveChat,
    Applied,
    /// A newer load already rendered, or the chat changed meanwhile.
    Stale,
    /// The request failed or ran past its deadline.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text or no active chat; nothing was sent.
    Skipped,
    /// The request finished, successfully or not.
    Completed,
}

/// Clears the poll slot when the poll future finishes or is dropped.
struct PollSlot<'a>(&'a AtomicBool);

impl Drop for PollSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Keeps the local chat state in step with the backend.
///
/// Cheap to clone; clones share state, so operations can run on spawned
/// tasks. Every network failure is logged and swallowed.
#[derive(Clone)]
pub struct ChatSyncClient {
    api: Arc<dyn ChatApi>,
    state: Arc<Mutex<ChatState>>,
    poll_in_flight: Arc<AtomicBool>,
}

impl ChatSyncClient {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ChatState::new())),
            poll_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.lock().clone()
    }

    pub fn active_chat(&self) -> Option<ChatId> {
        self.state.lock().active_chat.clone()
    }

    pub fn reset(&self) {
        self.state.lock().clear();
    }

    pub async fn load_chats(&self, session: &Session) {
        if self.reload_chat_list(session).await.is_some() {
            self.load_messages(session).await;
        }
    }

    /// Fetch the chat list and select the first chat when none is active.
    ///
    /// Returns the chat it selected; its messages are not loaded yet.
    pub async fn reload_chat_list(&self, session: &Session) -> Option<ChatId> {
        let chats = match self.api.list_chats(session).await {
            Ok(chats) => chats,
            Err(err) => {
                log::warn!("Failed to load chats: {err}");
                return None;
            }
        };

        log::debug!("Loaded {} chats", chats.len());
        let first = self.state.lock().replace_chats(chats);
        if let Some(chat_id) = &first {
            self.select_chat(chat_id.clone());
        }
        first
    }

    /// Mark `chat_id` active right away, before any messages arrive.
    pub fn select_chat(&self, chat_id: ChatId) {
        log::info!("Opening chat #{chat_id}");
        self.state.lock().activate(chat_id);
    }

    pub async fn open_chat(&self, session: &Session, chat_id: ChatId) -> MessageLoad {
        self.select_chat(chat_id);
        self.load_messages(session).await
    }

    pub async fn load_messages(&self, session: &Session) -> MessageLoad {
        let ticket = self.state.lock().begin_message_load();
        let Some(ticket) = ticket else {
            return MessageLoad::NoActiveChat;
        };

        log::debug!(
            "Loading messages for chat #{} as {} (seq {})",
            ticket.chat_id,
            session.display_name(),
            ticket.seq
        );

        let messages = match self.api.list_messages(&ticket.chat_id).await {
            Ok(messages) => messages,
            Err(err) => {
                log::warn!("Failed to load messages for chat #{}: {err}", ticket.chat_id);
                return MessageLoad::Failed;
            }
        };

        let applied = self.state.lock().apply_messages(&ticket, messages);
        if applied {
            MessageLoad::Applied
        } else {
            log::debug!("Discarding stale messages response (seq {})", ticket.seq);
            MessageLoad::Stale
        }
    }

    /// Timer entry point. Returns `None` when a previous poll is still running.
    ///
    /// A poll that has not finished within `deadline` is dropped and reported
    /// as failed, which frees the slot for the next tick.
    pub async fn poll(&self, session: &Session, deadline: Duration) -> Option<MessageLoad> {
        if self
            .poll_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Previous poll still in flight; skipping tick");
            return None;
        }

        let _slot = PollSlot(&self.poll_in_flight);
        match time::timeout(deadline, self.load_messages(session)).await {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                log::warn!("Poll gave no answer within {deadline:?}; abandoning it");
                Some(MessageLoad::Failed)
            }
        }
    }

    pub async fn send_message(
        &self,
        session: &Session,
        text: &str,
        anonymous_toggle: bool,
    ) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SendOutcome::Skipped;
        }
        let Some(chat_id) = self.active_chat() else {
            return SendOutcome::Skipped;
        };

        let request = SendMessageRequest {
            content: content.to_string(),
            is_anonymous: anonymous_toggle || !session.is_authenticated(),
            chat_id,
        };

        if let Err(err) = self.api.send_message(session, &request).await {
            log::warn!("Failed to send message to chat #{}: {err}", request.chat_id);
        }

        self.load_messages(session).await;
        SendOutcome::Completed
    }

    /// Returns `false` when the name is blank and nothing was sent.
    pub async fn create_new_chat(&self, session: &Session, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let request = CreateChatRequest {
            name: name.to_string(),
        };
        match self.api.create_chat(session, &request).await {
            Ok(()) => log::info!("Created chat `{name}`"),
            Err(err) => log::warn!("Failed to create chat `{name}`: {err}"),
        }

        self.load_chats(session).await;
        true
    }

    pub async fn add_user_to_chat(
        &self,
        session: &Session,
        chat_id: &ChatId,
        username: &str,
    ) -> Option<String> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }

        match self.api.add_user_to_chat(session, chat_id, username).await {
            Ok(status) => {
                log::info!("Add `{username}` to chat #{chat_id}: {status}");
                self.load_chats(session).await;
                Some(status)
            }
            Err(err) => {
                log::warn!("Failed to add `{username}` to chat #{chat_id}: {err}");
                Some(err.to_string())
            }
        }
    }
}
