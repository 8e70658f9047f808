use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Display format used for timestamps throughout the UI.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Column – the seven named columns of the sensor table
// ---------------------------------------------------------------------------

/// A column of the sensor table, in source-file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Timestamp,
    Temperature,
    Humidity,
    PirSensor,
    DoorOpening,
    Gases,
    ElectricConsumption,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Timestamp,
        Column::Temperature,
        Column::Humidity,
        Column::PirSensor,
        Column::DoorOpening,
        Column::Gases,
        Column::ElectricConsumption,
    ];

    /// The six numeric columns (everything after the timestamp).
    pub const NUMERIC: [Column; 6] = [
        Column::Temperature,
        Column::Humidity,
        Column::PirSensor,
        Column::DoorOpening,
        Column::Gases,
        Column::ElectricConsumption,
    ];

    /// Header name as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Temperature => "temperature",
            Column::Humidity => "humidity",
            Column::PirSensor => "pir_sensor",
            Column::DoorOpening => "door_opening",
            Column::Gases => "gases",
            Column::ElectricConsumption => "electric_consumption",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Numeric value of this column for a reading. `None` for the timestamp.
    pub fn value(self, reading: &SensorReading) -> Option<f64> {
        match self {
            Column::Timestamp => None,
            Column::Temperature => Some(reading.temperature),
            Column::Humidity => Some(reading.humidity),
            Column::PirSensor => Some(f64::from(reading.pir_sensor)),
            Column::DoorOpening => Some(f64::from(reading.door_opening)),
            Column::Gases => Some(reading.gases),
            Column::ElectricConsumption => Some(reading.electric_consumption),
        }
    }

    /// Cell text for the dataset browser.
    pub fn display(self, reading: &SensorReading) -> String {
        match self {
            Column::Timestamp => reading.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            Column::PirSensor => reading.pir_sensor.to_string(),
            Column::DoorOpening => reading.door_opening.to_string(),
            other => match other.value(reading) {
                Some(v) => format!("{v}"),
                None => String::new(),
            },
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// SensorReading – one row of the table
// ---------------------------------------------------------------------------

/// A single sensor reading (one row of the source file).
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Motion detected (0/1).
    pub pir_sensor: u8,
    /// Door open (0/1).
    pub door_opening: u8,
    /// Gas concentration, ppm.
    pub gases: f64,
    /// kWh over the sampling interval.
    pub electric_consumption: f64,
}

// ---------------------------------------------------------------------------
// SensorTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All readings of one source file, in file order.
#[derive(Debug, Clone)]
pub struct SensorTable {
    pub source: PathBuf,
    pub readings: Vec<SensorReading>,
}

impl SensorTable {
    pub fn new(source: &Path, readings: Vec<SensorReading>) -> Self {
        SensorTable {
            source: source.to_path_buf(),
            readings,
        }
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Column names in file order. Always the seven named columns.
    pub fn column_names(&self) -> Vec<&'static str> {
        Column::ALL.iter().map(|c| c.name()).collect()
    }

    /// Iterate the numeric values of one column. Empty for the timestamp.
    pub fn values(&self, column: Column) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().filter_map(move |r| column.value(r))
    }

    /// The first `n` readings (all of them if the table is shorter).
    pub fn head(&self, n: usize) -> &[SensorReading] {
        &self.readings[..n.min(self.readings.len())]
    }
}

#[cfg(test)]
pub(crate) fn reading(hour: u32, temperature: f64, humidity: f64) -> SensorReading {
    use chrono::NaiveDate;

    SensorReading {
        timestamp: NaiveDate::from_ymd_opt(2024, 11, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid test timestamp"),
        temperature,
        humidity,
        pir_sensor: (hour % 2) as u8,
        door_opening: 0,
        gases: 400.0 + hour as f64,
        electric_consumption: temperature * 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_round_trip() {
        for col in Column::ALL {
            assert_eq!(Column::from_name(col.name()), Some(col));
        }
        assert_eq!(Column::from_name("lux"), None);
    }

    #[test]
    fn timestamp_has_no_numeric_value() {
        let r = reading(3, 20.5, 60.0);
        assert_eq!(Column::Timestamp.value(&r), None);
        assert_eq!(Column::Temperature.value(&r), Some(20.5));
        assert_eq!(Column::PirSensor.value(&r), Some(1.0));
        assert_eq!(Column::Timestamp.display(&r), "2024-11-01 03:00:00");
    }

    #[test]
    fn head_is_bounded_by_table_length() {
        let table = SensorTable::new(
            Path::new("mem.csv"),
            (0..5).map(|h| reading(h, 20.0, 50.0)).collect(),
        );
        assert_eq!(table.head(3).len(), 3);
        assert_eq!(table.head(3200).len(), 5);
        assert_eq!(table.column_names().len(), 7);
    }
}
