//! Deterministic projection of [`ChatState`] into what the screen shows.
//!
//! Nothing here touches egui, so the rules are testable on their own.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::common::{ANONYMOUS_SENDER, Chat, ChatId, ChatMessage, Session};
use crate::sync::ChatState;

pub const NO_CHAT_HEADER: &str = "Select a chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSide {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListItem {
    pub id: ChatId,
    pub name: String,
    pub avatar: String,
    pub member_count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub side: MessageSide,
    pub sender_label: Option<String>,
    pub content: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub username: String,
    pub header: String,
    pub chats: Vec<ChatListItem>,
    pub messages: Vec<MessageBubble>,
}

impl ChatView {
    pub fn active_items(&self) -> impl Iterator<Item = &ChatListItem> {
        self.chats.iter().filter(|item| item.active)
    }
}

pub fn project(state: &ChatState, session: &Session) -> ChatView {
    let active = state.active_chat.as_ref();

    ChatView {
        username: session.display_name().to_string(),
        header: active
            .map(|id| format!("Chat #{id}"))
            .unwrap_or_else(|| NO_CHAT_HEADER.to_string()),
        chats: state
            .chats
            .iter()
            .map(|chat| chat_item(chat, active))
            .collect(),
        messages: state.messages.iter().map(message_bubble).collect(),
    }
}

fn chat_item(chat: &Chat, active: Option<&ChatId>) -> ChatListItem {
    let member_count = chat
        .members
        .as_ref()
        .map(Vec::len)
        .filter(|count| *count > 0)
        .unwrap_or(1);

    ChatListItem {
        id: chat.id.clone(),
        name: chat.name.clone(),
        avatar: chat.name.chars().next().map(String::from).unwrap_or_default(),
        member_count,
        active: active == Some(&chat.id),
    }
}

/// Side is decided by the literal sender name, not by who is signed in.
///
/// Anonymous posts render as incoming, everything else (the user's own
/// messages and everyone else's) as outgoing.
pub fn classify(sender: &str) -> MessageSide {
    if sender == ANONYMOUS_SENDER {
        MessageSide::Incoming
    } else {
        MessageSide::Outgoing
    }
}

fn message_bubble(message: &ChatMessage) -> MessageBubble {
    let side = classify(&message.sender);
    MessageBubble {
        side,
        sender_label: (side == MessageSide::Outgoing).then(|| message.sender.clone()),
        content: message.content.clone(),
        time: format_time(&message.timestamp),
    }
}

/// Wall-clock time of an ISO-8601 timestamp.
///
/// Timestamps without an offset are taken as local time already; unparseable
/// input is shown verbatim.
pub fn format_time(timestamp: &str) -> String {
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%H:%M:%S").to_string();
    }
    if let Ok(aware) = DateTime::parse_from_rfc3339(timestamp) {
        return aware.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    timestamp.to_string()
}

impl fmt::Display for MessageBubble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.side {
            MessageSide::Incoming => "<",
            MessageSide::Outgoing => ">",
        };
        match &self.sender_label {
            Some(sender) => write!(f, "[{}] {marker} {sender}: {}", self.time, self.content),
            None => write!(f, "[{}] {marker} {}", self.time, self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChatMember;

    fn message(sender: &str, content: &str, timestamp: &str) -> ChatMessage {
        ChatMessage {
            sender: sender.into(),
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }

    fn state_with(chats: Vec<Chat>, active: Option<i64>) -> ChatState {
        let mut state = ChatState::new();
        state.replace_chats(chats);
        if let Some(id) = active {
            state.activate(ChatId::from(id));
        }
        state
    }

    #[test]
    fn anonymous_sender_is_incoming_without_label() {
        let bubble = message_bubble(&message("Anonymous", "hi", "2024-05-01T10:15:30.123456"));
        assert_eq!(bubble.side, MessageSide::Incoming);
        assert_eq!(bubble.sender_label, None);
        assert_eq!(bubble.content, "hi");
        assert_eq!(bubble.time, "10:15:30");
    }

    #[test]
    fn named_sender_is_outgoing_with_label() {
        let bubble = message_bubble(&message("Bob", "hey", "2024-05-01T10:15:30"));
        assert_eq!(bubble.side, MessageSide::Outgoing);
        assert_eq!(bubble.sender_label.as_deref(), Some("Bob"));
    }

    #[test]
    fn exactly_one_item_is_active() {
        let state = state_with(
            vec![Chat::new(1, "A"), Chat::new(2, "B"), Chat::new(3, "C")],
            Some(2),
        );
        let view = project(&state, &Session::anonymous());

        let active: Vec<_> = view.active_items().map(|item| item.id.clone()).collect();
        assert_eq!(active, vec![ChatId::from(2)]);
        assert_eq!(view.header, "Chat #2");
    }

    #[test]
    fn unknown_active_chat_marks_nothing_but_sets_header() {
        let state = state_with(vec![Chat::new(1, "A")], Some(42));
        let view = project(&state, &Session::anonymous());

        assert_eq!(view.active_items().count(), 0);
        assert_eq!(view.header, "Chat #42");
    }

    #[test]
    fn header_and_username_defaults() {
        let view = project(&ChatState::new(), &Session::anonymous());
        assert_eq!(view.header, NO_CHAT_HEADER);
        assert_eq!(view.username, "Guest");
    }

    #[test]
    fn member_count_defaults_to_one() {
        let mut crowded = Chat::new(1, "Team");
        crowded.members = Some(vec![
            ChatMember {
                id: Some(1),
                username: Some("alice".into()),
            },
            ChatMember {
                id: Some(2),
                username: Some("bob".into()),
            },
        ]);
        let mut empty = Chat::new(2, "Empty");
        empty.members = Some(Vec::new());

        let state = state_with(vec![crowded, empty, Chat::new(3, "")], None);
        let view = project(&state, &Session::anonymous());

        let counts: Vec<_> = view.chats.iter().map(|item| item.member_count).collect();
        assert_eq!(counts, [2, 1, 1]);
        assert_eq!(view.chats[0].avatar, "T");
        assert_eq!(view.chats[2].avatar, "");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        assert_eq!(format_time("yesterday"), "yesterday");
    }

    #[test]
    fn bubble_text_line() {
        let bubble = message_bubble(&message("Bob", "hey", "2024-05-01T10:15:30"));
        assert_eq!(bubble.to_string(), "[10:15:30] > Bob: hey");
    }
}
