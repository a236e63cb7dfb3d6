use crate::common::{Session, SyncEvent};
use crate::sync::ChatState;

use super::view::{self, ChatView};

/// Local UI state: the last chat snapshot plus the text fields being edited.
pub struct AppState {
    pub chat: ChatState,
    pub session: Session,
    pub input_text: String,
    pub anonymous: bool,
    pub new_chat_name: String,
    pub invite_username: String,
    /// Sign-in form shown while no token is stored.
    pub login_username: String,
    pub login_token: String,
    /// Last server reply worth showing (add-user status).
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            chat: ChatState::new(),
            session,
            input_text: String::new(),
            anonymous: false,
            new_chat_name: String::new(),
            invite_username: String::new(),
            login_username: String::new(),
            login_token: String::new(),
            notice: None,
        }
    }

    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            // Snapshots are published from several tasks and may arrive out
            // of order.
            SyncEvent::StateChanged(chat) => {
                if chat.version() >= self.chat.version() {
                    self.chat = chat;
                }
            }
            SyncEvent::MessageSent => self.input_text.clear(),
            SyncEvent::ChatCreated => self.new_chat_name.clear(),
            SyncEvent::MemberAdded(status) => {
                self.invite_username.clear();
                self.notice = Some(status);
            }
            SyncEvent::SessionChanged(session) => {
                self.session = session;
                self.anonymous = false;
                self.login_token.clear();
                self.notice = None;
            }
        }
    }

    pub fn view(&self) -> ChatView {
        view::project(&self.chat, &self.session)
    }

    /// Session typed into the sign-in form, if a token was entered.
    pub fn session_from_form(&self) -> Option<Session> {
        let session = Session::new(
            Some(self.login_token.trim().to_string()),
            Some(self.login_username.trim().to_string()),
        );
        session.is_authenticated().then_some(session)
    }
}
