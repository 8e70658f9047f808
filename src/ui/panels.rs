use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(snap) = &state.snapshot {
            let name = snap
                .table
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{} lecturas · {} columnas · {name}",
                snap.table.len(),
                snap.table.column_names().len()
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.show_session_panel, "session_state")
            .clicked()
        {
            state.show_session_panel = !state.show_session_panel;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Tab strip
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

// ---------------------------------------------------------------------------
// Session debug panel
// ---------------------------------------------------------------------------

/// Render the session_state side panel.
pub fn session_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("session_state");
    ui.separator();
    ui.monospace(format!("toggle_inside: {}", state.toggles.inside));
    ui.monospace(format!("toggle_outside: {}", state.toggles.outside));
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir dataset domótico")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Switching dataset to {}", path.display());
        state.open_dataset(path);
    }
}
