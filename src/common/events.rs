use super::types::Session;
use crate::sync::ChatState;

/// Events the sync worker sends back up to the UI.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Fresh copy of the chat state after any change.
    StateChanged(ChatState),
    /// A send finished (either way); the compose box should be cleared.
    MessageSent,
    /// A create-chat request finished; the new-chat field should be closed.
    ChatCreated,
    /// Server reply to an add-user request, or the error text.
    MemberAdded(String),
    SessionChanged(Session),
}
