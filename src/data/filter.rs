use super::model::{Column, SensorReading, SensorTable};

// ---------------------------------------------------------------------------
// Column groups shown by the dataset browser
// ---------------------------------------------------------------------------

/// The fixed column projections offered by the dataset view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnGroup {
    Clima,
    Seguridad,
    ConsumoElectrico,
    #[default]
    Todos,
}

impl ColumnGroup {
    pub const ALL: [ColumnGroup; 4] = [
        ColumnGroup::Clima,
        ColumnGroup::Seguridad,
        ColumnGroup::ConsumoElectrico,
        ColumnGroup::Todos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColumnGroup::Clima => "Clima",
            ColumnGroup::Seguridad => "Seguridad",
            ColumnGroup::ConsumoElectrico => "Consumo eléctrico",
            ColumnGroup::Todos => "Todos los campos",
        }
    }

    /// Columns of this group, timestamp first.
    pub fn columns(self) -> &'static [Column] {
        match self {
            ColumnGroup::Clima => &[Column::Timestamp, Column::Temperature, Column::Humidity],
            ColumnGroup::Seguridad => &[
                Column::Timestamp,
                Column::PirSensor,
                Column::DoorOpening,
                Column::Gases,
            ],
            ColumnGroup::ConsumoElectrico => &[Column::Timestamp, Column::ElectricConsumption],
            ColumnGroup::Todos => &Column::ALL,
        }
    }
}

/// A column projection over a borrowed table.
pub struct Projection<'a> {
    pub columns: &'static [Column],
    rows: &'a [SensorReading],
}

impl<'a> Projection<'a> {
    pub fn new(table: &'a SensorTable, group: ColumnGroup) -> Self {
        Projection {
            columns: group.columns(),
            rows: &table.readings,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Display text of every projected cell in row `index`.
    pub fn row(&self, index: usize) -> Vec<String> {
        let reading = &self.rows[index];
        self.columns.iter().map(|c| c.display(reading)).collect()
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}
