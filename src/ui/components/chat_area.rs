use eframe::egui;

use crate::ui::view::{MessageBubble, MessageSide};

pub fn render(ui: &mut egui::Ui, messages: &[MessageBubble]) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .max_height((ui.available_height() - 40.0).max(0.0))
        .show(ui, |ui| {
            for message in messages {
                let layout = match message.side {
                    MessageSide::Incoming => egui::Layout::left_to_right(egui::Align::TOP),
                    MessageSide::Outgoing => egui::Layout::right_to_left(egui::Align::TOP),
                };
                ui.with_layout(layout, |ui| {
                    ui.group(|ui| {
                        ui.vertical(|ui| {
                            if let Some(sender) = &message.sender_label {
                                ui.label(egui::RichText::new(sender.as_str()).strong());
                            }
                            ui.label(message.content.as_str());
                            ui.label(egui::RichText::new(message.time.as_str()).small().weak());
                        });
                    });
                });
            }
        });
}

/// Add-user row under the header; returns the name to invite.
pub fn render_invite(ui: &mut egui::Ui, username: &mut String, notice: Option<&str>) -> Option<String> {
    let mut invite = None;
    ui.horizontal(|ui| {
        ui.label("Add user:");
        ui.text_edit_singleline(username);
        if ui.button("Add").clicked() {
            invite = Some(username.clone());
        }
        if let Some(notice) = notice {
            ui.label(egui::RichText::new(notice).weak());
        }
    });
    invite
}
