use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{control, dataset, panels, visualization};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DomoticPanelApp {
    pub state: AppState,
}

impl DomoticPanelApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DomoticPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Re-run the pipeline if the last frame changed a widget ----
        self.state.run_pending();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: session flags ----
        if self.state.show_session_panel {
            egui::SidePanel::right("session_panel")
                .default_width(200.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::session_panel(ui, &self.state);
                });
        }

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Los datos que nos rodean");
            ui.label(RichText::new("Uso de datos en aplicaciones domóticas 🚀").strong());
            ui.add_space(4.0);
            panels::tab_bar(ui, &mut self.state);
            ui.separator();

            match render_tab(ui, &mut self.state) {
                Ok(true) => {
                    self.state.request_rerun();
                    ctx.request_repaint();
                }
                Ok(false) => {}
                Err(e) => {
                    log::error!("Render pass failed: {e:#}");
                    self.state.snapshot = None;
                    self.state.status_message = Some(format!("Error: {e:#}"));
                }
            }
        });
    }
}

/// Render the active tab. `Ok(true)` when a widget value changed.
fn render_tab(ui: &mut Ui, state: &mut AppState) -> anyhow::Result<bool> {
    let Some(snapshot) = state.snapshot.clone() else {
        let msg = state
            .status_message
            .as_deref()
            .unwrap_or("Cargando dataset…");
        let retry = ui
            .vertical_centered(|ui: &mut Ui| {
                ui.add_space(40.0);
                ui.label(RichText::new(msg).color(Color32::RED).heading());
                ui.button("Reintentar").clicked()
            })
            .inner;
        return Ok(retry);
    };

    match state.tab {
        Tab::Control => {
            let icons = state.icons.as_ref().context("lamp icons not loaded")?;
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    control::show(ui, &mut state.controls, &mut state.toggles, icons, &snapshot)
                })
                .inner
        }
        Tab::Visualization => ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                visualization::show(ui, &mut state.controls, &snapshot)
            })
            .inner,
        Tab::Dataset => Ok(dataset::show(ui, &mut state.controls.column_group, &snapshot)),
    }
}
