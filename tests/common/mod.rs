#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use rust_rest_chat::common::{
    Chat, ChatId, ChatMessage, CreateChatRequest, SendMessageRequest, Session,
};
use rust_rest_chat::error::{ApiError, ApiResult};
use rust_rest_chat::network::ChatApi;
use tokio::sync::oneshot;

pub fn message(sender: &str, content: &str) -> ChatMessage {
    ChatMessage {
        sender: sender.into(),
        content: content.into(),
        timestamp: "2024-05-01T10:15:30.000000".into(),
    }
}

pub fn signed_in(username: &str) -> Session {
    Session::new(Some(format!("token-{username}")), Some(username.to_string()))
}

/// Backend whose message responses resolve only when the test releases them.
///
/// Each `list_messages` call takes the next gate in creation order.
pub struct GatedApi {
    chats: Vec<Chat>,
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<ChatMessage>>>>,
    message_requests: AtomicUsize,
}

impl GatedApi {
    pub fn new(chats: Vec<Chat>) -> Self {
        Self {
            chats,
            gates: Mutex::new(VecDeque::new()),
            message_requests: AtomicUsize::new(0),
        }
    }

    pub fn gate(&self) -> oneshot::Sender<Vec<ChatMessage>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }

    pub fn message_requests(&self) -> usize {
        self.message_requests.load(Ordering::SeqCst)
    }

    /// Yield to spawned tasks until `count` message requests have been issued.
    pub async fn wait_for_requests(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.message_requests() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("message request was never issued");
    }
}

#[async_trait]
impl ChatApi for GatedApi {
    async fn list_chats(&self, _session: &Session) -> ApiResult<Vec<Chat>> {
        Ok(self.chats.clone())
    }

    async fn list_messages(&self, _chat_id: &ChatId) -> ApiResult<Vec<ChatMessage>> {
        let gate = self.gates.lock().pop_front();
        self.message_requests.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| ApiError::status(StatusCode::SERVICE_UNAVAILABLE, "gate dropped")),
            None => Ok(Vec::new()),
        }
    }

    async fn send_message(
        &self,
        _session: &Session,
        _request: &SendMessageRequest,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn create_chat(
        &self,
        _session: &Session,
        _request: &CreateChatRequest,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn add_user_to_chat(
        &self,
        _session: &Session,
        _chat_id: &ChatId,
        _username: &str,
    ) -> ApiResult<String> {
        Ok("User added to chat".to_string())
    }
}
