use super::types::{ChatId, Session};

/// Commands the UI sends down to the sync worker.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    LoadChats,
    OpenChat(ChatId),
    /// Compose-box text as typed; the worker trims it.
    SendMessage {
        text: String,
        anonymous: bool,
    },
    CreateChat {
        name: String,
    },
    AddUserToChat {
        chat_id: ChatId,
        username: String,
    },
    /// Replace the session (token obtained outside this client).
    SetSession(Session),
    Logout,
}
