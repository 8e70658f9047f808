use anyhow::Result;
use eframe::egui::{self, Ui};

use crate::data::model::TIMESTAMP_FORMAT;
use crate::data::stats::Summary;
use crate::state::{Controls, SeriesLength, Snapshot};
use crate::ui::charts::{self, Gauge};

// ---------------------------------------------------------------------------
// Visualization tab – gauges, history and correlation
// ---------------------------------------------------------------------------

/// Render the visualization tab. Returns whether the series length changed.
pub fn show(ui: &mut Ui, controls: &mut Controls, snapshot: &Snapshot) -> Result<bool> {
    let sample = &snapshot.sample;

    let mut gauges = Ok(());
    ui.group(|ui: &mut Ui| {
        ui.strong(format!(
            "Humedad / Temperatura ({})",
            sample.timestamp.format(TIMESTAMP_FORMAT)
        ));
        ui.columns(2, |cols| {
            gauges = Gauge::humidity(sample.humidity)
                .show(&mut cols[0])
                .and_then(|()| Gauge::temperature(sample.temperature).show(&mut cols[1]));
        });
    });
    gauges?;

    ui.add_space(8.0);

    let mut changed = false;
    ui.group(|ui: &mut Ui| {
        ui.strong("Humedad / Temperatura Histórico");
        changed = series_length_slider(ui, &mut controls.series_length);
        charts::history_chart(ui, &snapshot.table, controls.series_length.get());

        for line in summary_lines(&snapshot.summary) {
            ui.label(line);
        }
    });

    ui.add_space(8.0);

    ui.group(|ui: &mut Ui| {
        charts::correlation_heatmap(ui, &snapshot.correlation);
        ui.strong("Correlación de datos");
        for note in charts::correlation_notes(&snapshot.correlation) {
            ui.label(note);
        }
    });

    Ok(changed)
}

/// Extremes text under the history chart, one decimal like the gauges.
fn summary_lines(s: &Summary) -> [String; 4] {
    [
        format!(
            "🔥 La temperatura máxima registrada en noviembre fue de {:.1} °C.",
            s.temperature.1
        ),
        format!(
            "❄ La temperatura mínima registrada en noviembre fue de {:.1} °C.",
            s.temperature.0
        ),
        format!("☔ La humedad máxima registrada en noviembre fue de {:.1} %.", s.humidity.1),
        format!("💧 La humedad mínima registrada en noviembre fue de {:.1} %.", s.humidity.0),
    ]
}

/// Select-slider over the fixed series lengths.
fn series_length_slider(ui: &mut Ui, length: &mut SeriesLength) -> bool {
    let last = SeriesLength::OPTIONS.len() - 1;
    let mut index = length.index();
    let response = ui.add(
        egui::Slider::new(&mut index, 0..=last)
            .text("Seleccione la cantidad de datos a graficar")
            .custom_formatter(|v, _| {
                SeriesLength::from_index(v as usize)
                    .map(|l| l.get().to_string())
                    .unwrap_or_default()
            })
            .custom_parser(|s| {
                let len = s.trim().parse::<usize>().ok()?;
                SeriesLength::new(len).map(|l| l.index() as f64)
            }),
    );
    match SeriesLength::from_index(index) {
        Some(next) if response.changed() && next != *length => {
            *length = next;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_keeps_one_decimal_on_whole_numbers() {
        let lines = summary_lines(&Summary {
            temperature: (12.0, 20.0),
            humidity: (41.25, 88.0),
        });
        assert!(lines[0].contains("de 20.0 °C"), "{}", lines[0]);
        assert!(lines[1].contains("de 12.0 °C"), "{}", lines[1]);
        assert!(lines[2].contains("de 88.0 %"), "{}", lines[2]);
        assert!(lines[3].contains("de 41.2 %") || lines[3].contains("de 41.3 %"), "{}", lines[3]);
    }
}
