use anyhow::Result;
use eframe::egui::{self, Ui};

use crate::assets::LampIcons;
use crate::state::{Controls, Snapshot, ToggleState};
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Control tab – lights and thermostat (decorative only)
// ---------------------------------------------------------------------------

/// Render the control tab. Returns whether any widget value changed.
pub fn show(
    ui: &mut Ui,
    controls: &mut Controls,
    toggles: &mut ToggleState,
    icons: &LampIcons,
    snapshot: &Snapshot,
) -> Result<bool> {
    let mut changed = false;

    ui.group(|ui: &mut Ui| {
        ui.strong("Control de iluminación");
        ui.columns(3, |cols| {
            changed |= lamp(
                &mut cols[0],
                "Luces Interior",
                &mut toggles.inside,
                controls.brightness_inside,
                icons,
            );
            changed |= lamp(
                &mut cols[1],
                "Luces Exterior",
                &mut toggles.outside,
                controls.brightness_outside,
                icons,
            );

            let ui = &mut cols[2];
            ui.group(|ui: &mut Ui| {
                changed |= ui
                    .add(
                        egui::Slider::new(&mut controls.brightness_inside, 0..=255)
                            .text("Nivel de brillo - Interior"),
                    )
                    .changed();
            });
            ui.group(|ui: &mut Ui| {
                changed |= ui
                    .add(
                        egui::Slider::new(&mut controls.brightness_outside, 0..=255)
                            .text("Nivel de brillo - Exterior"),
                    )
                    .changed();
            });
        });
    });

    ui.add_space(8.0);

    let actual = snapshot.sample.temperature;
    let mut chart = Ok(());
    ui.group(|ui: &mut Ui| {
        ui.strong("Control de temperatura");
        ui.horizontal(|ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                ui.label(format!("🌡 Temperatura actual: {actual} °C"));
                changed |= ui
                    .add(
                        egui::Slider::new(&mut controls.temperature_set, 0..=50)
                            .text("Temperatura deseada"),
                    )
                    .changed();
            });
            ui.add_space(24.0);
            chart = charts::setpoint_chart(ui, f64::from(controls.temperature_set), actual);
        });
    });
    chart?;

    Ok(changed)
}

fn lamp(ui: &mut Ui, label: &str, lit: &mut bool, brightness: u8, icons: &LampIcons) -> bool {
    let changed = ui.toggle_value(lit, label).changed();
    ui.add(icons.image(*lit).fit_to_exact_size(egui::vec2(50.0, 50.0)));
    ui.label(format!("🔆 Nivel de brillo: {brightness}"));
    changed
}
