use eframe::egui;

use crate::common::{ChatId, Session};
use crate::ui::state::AppState;
use crate::ui::view::ChatListItem;

#[derive(Default)]
pub struct SidebarActions {
    pub open_chat: Option<ChatId>,
    pub create_chat: Option<String>,
    pub logout: bool,
    pub sign_in: Option<Session>,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState, chats: &[ChatListItem]) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(state.session.display_name()).strong());
        if state.session.is_authenticated() && ui.button("Log out").clicked() {
            actions.logout = true;
        }
    });
    if !state.session.is_authenticated() {
        sign_in_form(ui, state, &mut actions);
    }
    ui.separator();

    ui.heading("Chats");
    if chats.is_empty() {
        ui.label("No chats yet");
    }

    for item in chats {
        let response = ui.horizontal(|ui| {
            ui.label(egui::RichText::new(item.avatar.as_str()).strong());
            ui.vertical(|ui| {
                let name = ui.selectable_label(item.active, item.name.as_str());
                ui.label(egui::RichText::new(format!("Members: {}", item.member_count)).weak());
                name
            })
            .inner
        });
        if response.inner.clicked() {
            actions.open_chat = Some(item.id.clone());
        }
    }

    if state.session.is_authenticated() {
        ui.separator();
        ui.label("New chat:");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut state.new_chat_name);
            if ui.button("Create").clicked() {
                actions.create_chat = Some(state.new_chat_name.clone());
            }
        });
    }

    actions
}

fn sign_in_form(ui: &mut egui::Ui, state: &mut AppState, actions: &mut SidebarActions) {
    egui::Grid::new("sign_in").num_columns(2).show(ui, |ui| {
        ui.label("Username");
        ui.text_edit_singleline(&mut state.login_username);
        ui.end_row();
        ui.label("Token");
        ui.add(egui::TextEdit::singleline(&mut state.login_token).password(true));
        ui.end_row();
    });
    if ui.button("Sign in").clicked() {
        actions.sign_in = state.session_from_form();
    }
}
