use async_trait::async_trait;

use crate::common::{Chat, ChatId, ChatMessage, CreateChatRequest, SendMessageRequest, Session};
use crate::error::ApiResult;

/// Backend operations the sync client depends on.
///
/// Implemented over HTTP by [`super::HttpChatApi`] and in memory by
/// [`super::MockChatApi`].
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /chats/` with the session's bearer token.
    async fn list_chats(&self, session: &Session) -> ApiResult<Vec<Chat>>;

    /// `GET /messages?chat_id={id}`, unauthenticated.
    async fn list_messages(&self, chat_id: &ChatId) -> ApiResult<Vec<ChatMessage>>;

    /// `POST /send_message`; the response body is ignored.
    async fn send_message(&self, session: &Session, request: &SendMessageRequest)
    -> ApiResult<()>;

    /// `POST /chats/`; the response body is ignored.
    async fn create_chat(&self, session: &Session, request: &CreateChatRequest) -> ApiResult<()>;

    /// `POST /chats/{chat_id}/add_user/{username}`, returning the server's status text.
    async fn add_user_to_chat(
        &self,
        session: &Session,
        chat_id: &ChatId,
        username: &str,
    ) -> ApiResult<String>;
}
