use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{Session, SyncCommand, SyncEvent};

use super::components::{
    chat_area, input_bar,
    sidebar::{self, SidebarActions},
};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<SyncCommand>,
    event_receiver: mpsc::Receiver<SyncEvent>,
}

impl ChatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: Session,
        dark_mode: bool,
        command_sender: mpsc::Sender<SyncCommand>,
        event_receiver: mpsc::Receiver<SyncEvent>,
    ) -> Self {
        cc.egui_ctx.set_visuals(if dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        Self {
            state: AppState::new(session),
            command_sender,
            event_receiver,
        }
    }

    fn handle_sync_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply(event);
        }
    }

    fn send_command(&mut self, command: SyncCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to sync loop: {err}");
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_sync_events();
        let view = self.state.view();

        egui::SidePanel::left("chat_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                let actions: SidebarActions = sidebar::render(ui, &mut self.state, &view.chats);
                if let Some(chat_id) = actions.open_chat {
                    self.send_command(SyncCommand::OpenChat(chat_id));
                }
                if let Some(name) = actions.create_chat {
                    self.send_command(SyncCommand::CreateChat { name });
                }
                if actions.logout {
                    self.send_command(SyncCommand::Logout);
                }
                if let Some(session) = actions.sign_in {
                    self.send_command(SyncCommand::SetSession(session));
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(view.header.as_str());

            if let Some(chat_id) = self.state.chat.active_chat.clone() {
                if self.state.session.is_authenticated() {
                    if let Some(username) = chat_area::render_invite(
                        ui,
                        &mut self.state.invite_username,
                        self.state.notice.as_deref(),
                    ) {
                        self.send_command(SyncCommand::AddUserToChat { chat_id, username });
                    }
                }
            }
            ui.separator();

            chat_area::render(ui, &view.messages);

            ui.separator();
            if let Some(text) =
                input_bar::render(ui, &mut self.state.input_text, &mut self.state.anonymous)
            {
                let anonymous = self.state.anonymous;
                self.send_command(SyncCommand::SendMessage { text, anonymous });
            }
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
