use crate::common::{Chat, ChatId, ChatMessage};

/// Pure chat state; the view is a projection of this.
///
/// Message loads are ordered by a sequence number taken when the request is
/// issued. A response only lands if it is newer than the last one rendered
/// and its chat is still the active one.
///
/// `version` goes up on every visible change, so snapshots taken from the
/// shared state can be ordered by whoever receives them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub chats: Vec<Chat>,
    pub active_chat: Option<ChatId>,
    pub messages: Vec<ChatMessage>,
    issued_seq: u64,
    rendered_seq: u64,
    version: u64,
}

/// Handle for one in-flight message load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTicket {
    pub seq: u64,
    pub chat_id: ChatId,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget chats and messages. Sequence numbers keep counting so responses
    /// issued before the reset can never land afterwards.
    pub fn clear(&mut self) {
        self.chats.clear();
        self.active_chat = None;
        self.messages.clear();
        self.rendered_seq = self.issued_seq;
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the chat list; returns the chat to activate when none is active yet.
    pub fn replace_chats(&mut self, chats: Vec<Chat>) -> Option<ChatId> {
        self.chats = chats;
        self.version += 1;
        if self.active_chat.is_some() {
            return None;
        }
        self.chats.first().map(|chat| chat.id.clone())
    }

    /// Make `chat_id` the active chat. Known or not, it becomes active.
    pub fn activate(&mut self, chat_id: ChatId) {
        if self.active_chat.as_ref() != Some(&chat_id) {
            self.messages.clear();
        }
        self.active_chat = Some(chat_id);
        self.version += 1;
    }

    pub fn begin_message_load(&mut self) -> Option<MessageTicket> {
        let chat_id = self.active_chat.clone()?;
        self.issued_seq += 1;
        Some(MessageTicket {
            seq: self.issued_seq,
            chat_id,
        })
    }

    /// Replace the message list with a fetched snapshot unless it is stale.
    pub fn apply_messages(&mut self, ticket: &MessageTicket, messages: Vec<ChatMessage>) -> bool {
        if ticket.seq <= self.rendered_seq {
            return false;
        }
        if self.active_chat.as_ref() != Some(&ticket.chat_id) {
            return false;
        }

        self.rendered_seq = ticket.seq;
        self.messages = messages;
        self.version += 1;
        true
    }
}
