use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::common::{
    ANONYMOUS_SENDER, Chat, ChatId, ChatMember, ChatMessage, CreateChatRequest,
    SendMessageRequest, Session,
};
use crate::error::{ApiError, ApiResult};

use super::api::ChatApi;

const GUEST_SENDER: &str = "Guest";

#[derive(Debug, Default)]
struct MockData {
    chats: Vec<Chat>,
    messages: BTreeMap<ChatId, Vec<ChatMessage>>,
    next_chat_id: i64,
}

/// In-memory backend that mirrors the server's observable behaviour.
///
/// Seeded with the server's "General Chat" (id 1). Sender names follow the
/// server rule: anonymous posts become `Anonymous`, signed-in posts the
/// username, everything else `Guest`.
#[derive(Debug)]
pub struct MockChatApi {
    data: Mutex<MockData>,
    requests: AtomicUsize,
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::with_chats(vec![Chat::new(1, "General Chat")])
    }

    pub fn with_chats(chats: Vec<Chat>) -> Self {
        let next_chat_id = chats
            .iter()
            .filter_map(|chat| chat.id.as_str().parse::<i64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            data: Mutex::new(MockData {
                chats,
                messages: BTreeMap::new(),
                next_chat_id,
            }),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn seed_messages(&self, chat_id: impl Into<ChatId>, messages: Vec<ChatMessage>) {
        self.data.lock().messages.insert(chat_id.into(), messages);
    }

    /// Number of API calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn now_iso() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn sender_name(session: &Session, is_anonymous: bool) -> String {
    if is_anonymous {
        ANONYMOUS_SENDER.to_string()
    } else {
        session
            .username
            .clone()
            .filter(|_| session.is_authenticated())
            .unwrap_or_else(|| GUEST_SENDER.to_string())
    }
}

fn require_auth(session: &Session) -> ApiResult<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(ApiError::status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Authentication required"}"#,
        ))
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn list_chats(&self, _session: &Session) -> ApiResult<Vec<Chat>> {
        self.record();
        Ok(self.data.lock().chats.clone())
    }

    async fn list_messages(&self, chat_id: &ChatId) -> ApiResult<Vec<ChatMessage>> {
        self.record();
        Ok(self
            .data
            .lock()
            .messages
            .get(chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(
        &self,
        session: &Session,
        request: &SendMessageRequest,
    ) -> ApiResult<()> {
        self.record();
        let mut data = self.data.lock();
        if !data.chats.iter().any(|chat| chat.id == request.chat_id) {
            return Err(ApiError::status(
                StatusCode::NOT_FOUND,
                r#"{"detail":"Chat not found"}"#,
            ));
        }

        data.messages
            .entry(request.chat_id.clone())
            .or_default()
            .push(ChatMessage {
                sender: sender_name(session, request.is_anonymous),
                content: request.content.clone(),
                timestamp: now_iso(),
            });
        Ok(())
    }

    async fn create_chat(&self, session: &Session, request: &CreateChatRequest) -> ApiResult<()> {
        self.record();
        require_auth(session)?;

        let mut data = self.data.lock();
        let id = data.next_chat_id;
        data.next_chat_id += 1;
        data.chats.push(Chat {
            id: ChatId::from(id),
            name: request.name.clone(),
            members: Some(vec![ChatMember {
                id: None,
                username: session.username.clone(),
            }]),
        });
        Ok(())
    }

    async fn add_user_to_chat(
        &self,
        session: &Session,
        chat_id: &ChatId,
        username: &str,
    ) -> ApiResult<String> {
        self.record();
        require_auth(session)?;

        let mut data = self.data.lock();
        let Some(chat) = data.chats.iter_mut().find(|chat| &chat.id == chat_id) else {
            return Err(ApiError::status(
                StatusCode::NOT_FOUND,
                r#"{"detail":"Chat not found"}"#,
            ));
        };

        let members = chat.members.get_or_insert_with(Vec::new);
        if members
            .iter()
            .any(|member| member.username.as_deref() == Some(username))
        {
            return Ok("User already in chat".to_string());
        }

        members.push(ChatMember {
            id: None,
            username: Some(username.to_string()),
        });
        Ok("User added to chat".to_string())
    }
}
