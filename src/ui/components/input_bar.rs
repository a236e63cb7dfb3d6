use eframe::egui;

/// Compose row. Returns the text to send; the box is cleared once the send
/// has completed, not here.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, anonymous: &mut bool) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(input_text);
        ui.checkbox(anonymous, "Anonymous");
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    send.then(|| input_text.clone())
}
