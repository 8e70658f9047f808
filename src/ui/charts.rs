use std::f32::consts::{FRAC_PI_4, PI};

use anyhow::{bail, ensure, Result};
use chrono::DateTime;
use eframe::egui::{self, epaint::TextShape, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color;
use crate::data::model::{Column, SensorTable, TIMESTAMP_FORMAT};
use crate::data::stats::CorrelationMatrix;

// ---------------------------------------------------------------------------
// Gauge
// ---------------------------------------------------------------------------

/// A coloured band drawn under the gauge bar.
#[derive(Debug, Clone, Copy)]
pub struct GaugeStep {
    pub from: f64,
    pub to: f64,
    pub color: Color32,
}

/// Radial indicator for a single value on a bounded axis.
#[derive(Debug, Clone)]
pub struct Gauge {
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub suffix: &'static str,
    pub bar_color: Color32,
    pub steps: Vec<GaugeStep>,
    /// Red marker across the arc.
    pub threshold: Option<f64>,
    /// When set, the signed difference to this value is shown under the number.
    pub delta_reference: Option<f64>,
}

impl Gauge {
    pub fn humidity(value: f64) -> Self {
        Gauge {
            title: "Humedad",
            min: 0.0,
            max: 100.0,
            value,
            suffix: " %",
            bar_color: color::HUMIDITY,
            steps: Vec::new(),
            threshold: None,
            delta_reference: None,
        }
    }

    pub fn temperature(value: f64) -> Self {
        Gauge {
            title: "Temperatura",
            min: -15.0,
            max: 75.0,
            value,
            suffix: " °C",
            bar_color: Color32::from_rgb(0x1f, 0x3b, 0x8c),
            steps: vec![
                GaugeStep {
                    from: 0.0,
                    to: 50.0,
                    color: color::GAUGE_BAND,
                },
                GaugeStep {
                    from: -15.0,
                    to: 0.0,
                    color: color::GAUGE_COLD_BAND,
                },
            ],
            threshold: Some(40.0),
            delta_reference: Some(25.0),
        }
    }

    /// Reject values the gauge cannot place on its axis.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.value.is_finite(),
            "{}: value is missing ({})",
            self.title,
            self.value
        );
        if self.value < self.min || self.value > self.max {
            bail!(
                "{}: {} is outside the gauge range [{}, {}]",
                self.title,
                self.value,
                self.min,
                self.max
            );
        }
        Ok(())
    }

    /// Position of `v` along the axis, 0 at `min` and 1 at `max`.
    pub fn fraction(&self, v: f64) -> f32 {
        ((v - self.min) / (self.max - self.min)).clamp(0.0, 1.0) as f32
    }

    pub fn delta(&self) -> Option<f64> {
        self.delta_reference.map(|r| self.value - r)
    }

    pub fn show(&self, ui: &mut Ui) -> Result<()> {
        self.validate()?;

        let width = ui.available_width().min(400.0);
        let (response, painter) = ui.allocate_painter(Vec2::new(width, 230.0), Sense::hover());
        let rect = response.rect;

        let radius = (rect.width() * 0.38).min(rect.height() * 0.6);
        let center = Pos2::new(rect.center().x, rect.top() + 40.0 + radius);
        let thickness = radius * 0.3;
        let mid = radius - thickness / 2.0;

        painter.text(
            Pos2::new(rect.center().x, rect.top() + 4.0),
            Align2::CENTER_TOP,
            self.title,
            FontId::proportional(18.0),
            ui.visuals().text_color(),
        );

        painter.add(arc(center, mid, 0.0, 1.0, Stroke::new(thickness, ui.visuals().faint_bg_color)));
        for step in &self.steps {
            painter.add(arc(
                center,
                mid,
                self.fraction(step.from),
                self.fraction(step.to),
                Stroke::new(thickness, step.color),
            ));
        }
        painter.add(arc(
            center,
            mid,
            0.0,
            self.fraction(self.value),
            Stroke::new(thickness * 0.5, self.bar_color),
        ));

        if let Some(threshold) = self.threshold {
            let half = thickness * 0.75 / 2.0;
            let dir = direction(self.fraction(threshold));
            painter.line_segment(
                [center + dir * (mid - half), center + dir * (mid + half)],
                Stroke::new(4.0, color::GAUGE_THRESHOLD),
            );
        }

        let small = FontId::proportional(12.0);
        let muted = ui.visuals().weak_text_color();
        painter.text(
            center + Vec2::new(-mid, 6.0),
            Align2::CENTER_TOP,
            format!("{}", self.min),
            small.clone(),
            muted,
        );
        painter.text(
            center + Vec2::new(mid, 6.0),
            Align2::CENTER_TOP,
            format!("{}", self.max),
            small,
            muted,
        );

        painter.text(
            center,
            Align2::CENTER_BOTTOM,
            format!("{:.1}{}", self.value, self.suffix),
            FontId::proportional(30.0),
            ui.visuals().strong_text_color(),
        );

        if let Some(delta) = self.delta() {
            let (arrow, colour) = if delta >= 0.0 {
                ("▲", color::DELTA_UP)
            } else {
                ("▼", color::DELTA_DOWN)
            };
            painter.text(
                center + Vec2::new(0.0, 22.0),
                Align2::CENTER_TOP,
                format!("{arrow}{:.1}", delta.abs()),
                FontId::proportional(18.0),
                colour,
            );
        }
        Ok(())
    }
}

/// Unit vector for an axis fraction: left at 0, up at 0.5, right at 1.
fn direction(fraction: f32) -> Vec2 {
    let theta = PI * (1.0 - fraction);
    Vec2::new(theta.cos(), -theta.sin())
}

fn arc(center: Pos2, radius: f32, from: f32, to: f32, stroke: Stroke) -> Shape {
    let segments = 48;
    let points = (0..=segments)
        .map(|i| {
            let f = from + (to - from) * i as f32 / segments as f32;
            center + direction(f) * radius
        })
        .collect();
    Shape::line(points, stroke)
}

// ---------------------------------------------------------------------------
// Setpoint vs. actual temperature
// ---------------------------------------------------------------------------

/// Shares of a 100 % stacked bar for the setpoint and the measured value.
///
/// Magnitudes are stacked, so sub-zero readings still give shares in [0, 1].
/// Two zero values give an empty bar.
pub fn setpoint_shares(set: f64, actual: f64) -> Result<(f64, f64)> {
    ensure!(
        set.is_finite() && actual.is_finite(),
        "cannot normalise setpoint {set} against actual {actual}"
    );
    let total = set.abs() + actual.abs();
    if total == 0.0 {
        return Ok((0.0, 0.0));
    }
    Ok((set.abs() / total, actual.abs() / total))
}

pub fn setpoint_chart(ui: &mut Ui, set: f64, actual: f64) -> Result<()> {
    let (set_share, actual_share) = setpoint_shares(set, actual)?;

    let set_bars = BarChart::new(vec![Bar::new(0.0, set_share).width(0.6)])
        .name("Set")
        .color(color::SETPOINT);
    let actual_bars = BarChart::new(vec![Bar::new(0.0, actual_share).width(0.6)])
        .name("Actual")
        .color(color::ACTUAL)
        .stack_on(&[&set_bars]);

    Plot::new("setpoint_chart")
        .legend(Legend::default())
        .width(150.0)
        .height(200.0)
        .show_x(false)
        .include_y(0.0)
        .include_y(1.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(set_bars);
            plot_ui.bar_chart(actual_bars);
        });
    Ok(())
}

// ---------------------------------------------------------------------------
// History line chart
// ---------------------------------------------------------------------------

/// `[unix seconds, value]` points of the first `len` readings.
pub fn history_points(table: &SensorTable, column: Column, len: usize) -> Vec<[f64; 2]> {
    table
        .head(len)
        .iter()
        .filter_map(|r| {
            let x = r.timestamp.and_utc().timestamp() as f64;
            column.value(r).map(|y| [x, y])
        })
        .collect()
}

fn format_unix(secs: f64, fmt: &str) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|t| t.naive_utc().format(fmt).to_string())
        .unwrap_or_default()
}

pub fn history_chart(ui: &mut Ui, table: &SensorTable, len: usize) {
    let temperature: PlotPoints = history_points(table, Column::Temperature, len).into();
    let humidity: PlotPoints = history_points(table, Column::Humidity, len).into();

    Plot::new("history_chart")
        .legend(Legend::default())
        .height(280.0)
        .x_axis_label(Column::Timestamp.name())
        .x_axis_formatter(|mark, _range| format_unix(mark.value, "%d/%m %H:%M"))
        .label_formatter(|name, value| {
            let when = format_unix(value.x, TIMESTAMP_FORMAT);
            if name.is_empty() {
                when
            } else {
                format!("{name}: {:.1}\n{when}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(temperature)
                    .name(Column::Temperature.name())
                    .color(color::TEMPERATURE)
                    .width(1.5),
            );
            plot_ui.line(
                Line::new(humidity)
                    .name(Column::Humidity.name())
                    .color(color::HUMIDITY)
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const HEATMAP_LEFT: f32 = 150.0;
const HEATMAP_BOTTOM: f32 = 120.0;
const COLORBAR_WIDTH: f32 = 70.0;

pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let columns = matrix.columns();
    let n = columns.len();
    if n == 0 {
        return;
    }

    ui.label(egui::RichText::new("Matriz de Correlación - Consumo Eléctrico").heading());

    let width = ui.available_width().min(640.0);
    let grid = (width - HEATMAP_LEFT - COLORBAR_WIDTH).max(120.0);
    let cell = grid / n as f32;
    let (response, painter) =
        ui.allocate_painter(Vec2::new(width, grid + HEATMAP_BOTTOM), Sense::hover());
    let origin = response.rect.min + Vec2::new(HEATMAP_LEFT, 0.0);
    let text_color = ui.visuals().text_color();
    let label_font = FontId::proportional(12.0);

    // First matrix row at the bottom.
    let cell_rect = |i: usize, j: usize| {
        Rect::from_min_size(
            origin + Vec2::new(j as f32 * cell, (n - 1 - i) as f32 * cell),
            Vec2::splat(cell),
        )
    };

    for i in 0..n {
        for j in 0..n {
            let r = matrix.at(i, j);
            let fill = color::spectral(r, -1.0, 1.0);
            let rect = cell_rect(i, j).shrink(0.5);
            painter.rect_filled(rect, 0.0, fill);
            let text = if r.is_nan() { "NaN".to_string() } else { format!("{r:.2}") };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                text,
                label_font.clone(),
                color::text_on(fill),
            );
        }

        // Row label.
        painter.text(
            Pos2::new(origin.x - 6.0, cell_rect(i, 0).center().y),
            Align2::RIGHT_CENTER,
            columns[i].name(),
            label_font.clone(),
            text_color,
        );

        // Column label, rotated under the grid.
        let galley = painter.layout_no_wrap(columns[i].name().to_string(), label_font.clone(), text_color);
        let anchor = Pos2::new(cell_rect(i, i).center().x, origin.y + grid + 6.0);
        painter.add(TextShape::new(anchor, galley, text_color).with_angle(FRAC_PI_4));
    }

    // Colour bar from -1 (bottom) to +1 (top).
    let bar_left = origin.x + grid + 16.0;
    let steps = 64;
    let step_h = grid / steps as f32;
    for s in 0..steps {
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
        let rect = Rect::from_min_size(
            Pos2::new(bar_left, origin.y + s as f32 * step_h),
            Vec2::new(14.0, step_h + 0.5),
        );
        painter.rect_filled(rect, 0.0, color::spectral(value, -1.0, 1.0));
    }
    for (value, y) in [(1.0, 0.0), (0.0, grid / 2.0), (-1.0, grid)] {
        painter.text(
            Pos2::new(bar_left + 18.0, origin.y + y),
            Align2::LEFT_CENTER,
            format!("{value:.0}"),
            label_font.clone(),
            text_color,
        );
    }

    if let Some(pos) = response.hover_pos() {
        if let Some((i, j)) = heatmap_cell_at(pos - origin, cell, n) {
            response.on_hover_text_at_pointer(format!(
                "{} × {}: {:.3}",
                columns[i].name(),
                columns[j].name(),
                matrix.at(i, j)
            ));
        }
    }
}

/// Matrix `(row, column)` under a point relative to the grid's top-left corner.
/// Rows are drawn bottom-up.
fn heatmap_cell_at(local: Vec2, cell: f32, n: usize) -> Option<(usize, usize)> {
    let grid = cell * n as f32;
    if n == 0 || local.x < 0.0 || local.y < 0.0 || local.x >= grid || local.y >= grid {
        return None;
    }
    let slot = ((local.y / cell) as usize).min(n - 1);
    let j = ((local.x / cell) as usize).min(n - 1);
    Some((n - 1 - slot, j))
}

/// Interpretation paragraph for the heatmap, centred on electric consumption.
pub fn correlation_notes(matrix: &CorrelationMatrix) -> Vec<String> {
    let target = Column::ElectricConsumption;
    let (positive, negative) = matrix.strongest_with(target);

    let mut notes = vec!["Valores cercanos a 1.0: correlación positiva fuerte.".to_string()];
    if let Some((col, r)) = positive {
        notes.push(format!(
            "    Ejemplo: {target} y {col} ({r:.3}) -> valores altos de {col} se asocian con mayor consumo eléctrico."
        ));
    }
    notes.push("Valores cercanos a -1.0: correlación negativa fuerte.".to_string());
    if let Some((col, r)) = negative {
        notes.push(format!(
            "    Ejemplo: {target} y {col} ({r:.3}) -> valores altos de {col} se asocian con menor consumo eléctrico."
        ));
    }
    notes.push("Valores cercanos a 0: correlación débil o inexistente.".to_string());
    notes
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::data::model::reading;
    use crate::data::stats::correlate;

    #[test]
    fn temperature_gauge_layout() {
        let g = Gauge::temperature(31.0);
        assert_eq!(g.threshold, Some(40.0));
        assert_eq!(g.delta(), Some(6.0));
        assert_eq!(g.fraction(-15.0), 0.0);
        assert_eq!(g.fraction(75.0), 1.0);
        assert!((g.fraction(30.0) - 0.5).abs() < 1e-6);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn gauge_rejects_missing_and_out_of_range_values() {
        assert!(Gauge::humidity(f64::NAN).validate().is_err());
        assert!(Gauge::humidity(100.5).validate().is_err());
        assert!(Gauge::temperature(-15.1).validate().is_err());
        assert!(Gauge::humidity(0.0).validate().is_ok());
        assert_eq!(Gauge::humidity(50.0).delta(), None);
    }

    #[test]
    fn direction_spans_upper_half() {
        let left = direction(0.0);
        let top = direction(0.5);
        let right = direction(1.0);
        assert!((left.x + 1.0).abs() < 1e-6);
        assert!((top.y + 1.0).abs() < 1e-6);
        assert!((right.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn setpoint_shares_sum_to_one() {
        let (s, a) = setpoint_shares(24.0, 16.0).unwrap();
        assert!((s - 0.6).abs() < 1e-12);
        assert!((s + a - 1.0).abs() < 1e-12);
        assert_eq!(setpoint_shares(0.0, 0.0).unwrap(), (0.0, 0.0));
        assert!(setpoint_shares(24.0, f64::NAN).is_err());
    }

    #[test]
    fn setpoint_shares_with_sub_zero_temperature() {
        for (set, actual) in [(0.0, -5.0), (3.0, -5.0), (10.0, -5.0), (50.0, -15.0)] {
            let (s, a) = setpoint_shares(set, actual).unwrap();
            assert!((0.0..=1.0).contains(&s), "{set} vs {actual}: {s}");
            assert!((0.0..=1.0).contains(&a), "{set} vs {actual}: {a}");
            assert!((s + a - 1.0).abs() < 1e-12);
        }
        let (s, a) = setpoint_shares(10.0, -5.0).unwrap();
        assert!((s - 2.0 / 3.0).abs() < 1e-12);
        assert!((a - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn heatmap_hit_test_flips_rows_and_stays_in_bounds() {
        let cell = 40.0;
        // Top-left slot shows the last matrix row.
        assert_eq!(heatmap_cell_at(Vec2::new(1.0, 1.0), cell, 6), Some((5, 0)));
        // Bottom-right slot shows the first row, last column.
        assert_eq!(heatmap_cell_at(Vec2::new(239.0, 239.0), cell, 6), Some((0, 5)));
        // Just inside the far edge never indexes past the matrix.
        let edge = 240.0_f32 - f32::EPSILON * 240.0;
        let (i, j) = heatmap_cell_at(Vec2::new(edge, edge), cell, 6).unwrap();
        assert!(i < 6 && j < 6);
        assert_eq!(heatmap_cell_at(Vec2::new(240.0, 10.0), cell, 6), None);
        assert_eq!(heatmap_cell_at(Vec2::new(-0.5, 10.0), cell, 6), None);
        assert_eq!(heatmap_cell_at(Vec2::new(1.0, 1.0), cell, 0), None);
    }

    #[test]
    fn history_points_take_leading_rows() {
        let table = SensorTable::new(
            Path::new("mem.csv"),
            (0..10).map(|h| reading(h, 15.0 + h as f64, 70.0)).collect(),
        );
        let pts = history_points(&table, Column::Temperature, 4);
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0][1], 15.0);
        assert_eq!(pts[1][0] - pts[0][0], 3600.0);
        assert_eq!(history_points(&table, Column::Humidity, 3200).len(), 10);
        assert!(history_points(&table, Column::Timestamp, 50).is_empty());
    }

    #[test]
    fn notes_name_strongest_partners() {
        let table = SensorTable::new(
            Path::new("mem.csv"),
            vec![
                reading(0, 10.0, 80.0),
                reading(1, 20.0, 60.0),
                reading(2, 30.0, 40.0),
            ],
        );
        let m = correlate(&table, &Column::NUMERIC);
        let notes = correlation_notes(&m);
        assert!(notes.iter().any(|n| n.contains("(1.000) -> valores altos")));
        assert!(notes.iter().any(|n| n.contains("electric_consumption y humidity (-1.000)")));
    }
}
