use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sender name the server substitutes for anonymous posts.
pub const ANONYMOUS_SENDER: &str = "Anonymous";

/// Chat identifier as the backend hands it out.
///
/// The server sends integers while ids picked from the rendered list are
/// strings, so both forms are accepted and compared by their text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ChatId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ChatId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChatId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawChatId::deserialize(deserializer)? {
            RawChatId::Number(id) => Self::from(id),
            RawChatId::Text(id) => Self(id),
        })
    }
}

impl Serialize for ChatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(id) if id.to_string() == self.0 => serializer.serialize_i64(id),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// Member entry the backend may attach to a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    #[serde(default)]
    pub members: Option<Vec<ChatMember>>,
}

impl Chat {
    pub fn new(id: impl Into<ChatId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: None,
        }
    }
}

/// One message as returned by `GET /messages`.
///
/// `timestamp` stays the server's ISO-8601 text; it is only parsed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub is_anonymous: bool,
    pub chat_id: ChatId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub name: String,
}

/// Explicit auth context handed to every client operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub username: Option<String>,
}

impl Session {
    pub fn new(access_token: Option<String>, username: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|token| !token.is_empty()),
            username: username.filter(|name| !name.is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Guest")
    }
}
