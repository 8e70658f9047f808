use eframe::egui::{Ui, RichText};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::filter::{ColumnGroup, Projection};
use crate::state::Snapshot;

// ---------------------------------------------------------------------------
// Dataset tab – column-group filter and table
// ---------------------------------------------------------------------------

/// Render the dataset browser. Returns whether the column group changed.
pub fn show(ui: &mut Ui, group: &mut ColumnGroup, snapshot: &Snapshot) -> bool {
    ui.label("A continuación se muestra el dataset utilizado para esta aplicación.");
    ui.label(RichText::new("Aclaración: los datos fueron generados por una IA.").italics());
    ui.add_space(4.0);

    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Filtrar:");
        for option in ColumnGroup::ALL {
            changed |= ui.selectable_value(group, option, option.label()).changed();
        }
    });
    ui.separator();

    let projection = Projection::new(&snapshot.table, *group);
    let header = projection.header();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(TableColumn::auto().at_least(90.0), header.len())
        .header(22.0, |mut row| {
            for name in &header {
                row.col(|ui: &mut Ui| {
                    ui.strong(*name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, projection.len(), |mut row| {
                let cells = projection.row(row.index());
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });

    changed
}
