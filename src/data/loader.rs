use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Column, SensorReading, SensorTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    fn parse(row: usize, message: impl Into<String>) -> Self {
        LoadError::Parse {
            row,
            message: message.into(),
        }
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sensor table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the seven sensor columns
/// * `.parquet` – same column names, numeric or string typed
pub fn load_file(path: &Path) -> Result<SensorTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

/// Parse a timestamp as written by pandas / spreadsheets / chrono.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ---------------------------------------------------------------------------
// Per-path cache
// ---------------------------------------------------------------------------

/// Loaded tables keyed by the path they were requested with.
///
/// A hit returns the same `Arc` without touching the filesystem. Failed loads
/// are not cached, so a later call retries.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: HashMap<PathBuf, Arc<SensorTable>>,
}

impl DatasetCache {
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SensorTable>, LoadError> {
        if let Some(table) = self.tables.get(path) {
            log::debug!("dataset cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(path)?);
        log::info!("Loaded {} readings from {}", table.len(), path.display());
        self.tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    temperature: f64,
    humidity: f64,
    pir_sensor: u8,
    door_opening: u8,
    gases: f64,
    electric_consumption: f64,
}

impl CsvRow {
    fn into_reading(self, row: usize) -> Result<SensorReading, LoadError> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| LoadError::parse(row, format!("bad timestamp '{}'", self.timestamp)))?;
        Ok(SensorReading {
            timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            pir_sensor: self.pir_sensor,
            door_opening: self.door_opening,
            gases: self.gases,
            electric_consumption: self.electric_consumption,
        })
    }
}

/// CSV layout: header row with column names, one reading per line.
/// Columns are matched by name; extra columns are ignored.
fn load_csv(path: &Path) -> Result<SensorTable, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::parse(0, e.to_string()))?
        .clone();
    let present: Vec<Column> = headers
        .iter()
        .filter_map(|h| Column::from_name(h.trim()))
        .collect();
    if let Some(missing) = Column::ALL.iter().find(|c| !present.contains(c)) {
        return Err(LoadError::MissingColumn(missing.name()));
    }

    let mut readings = Vec::new();
    for (i, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_no = i + 1;
        let row = result.map_err(|e| LoadError::parse(row_no, e.to_string()))?;
        readings.push(row.into_reading(row_no)?);
    }

    Ok(SensorTable::new(path, readings))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by pandas or polars.
///
/// Numeric columns may be any integer or float type; the timestamp column may
/// be a string or an Arrow timestamp, both are normalised through a cast.
fn load_parquet(path: &Path) -> Result<SensorTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let reader = builder.build()?;

    let mut readings = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let timestamps = cast(column(&batch, Column::Timestamp)?, &DataType::Utf8)?;
        let timestamps = timestamps.as_string::<i32>();

        let mut numeric = Vec::with_capacity(Column::NUMERIC.len());
        for col in Column::NUMERIC {
            numeric.push(cast(column(&batch, col)?, &DataType::Float64)?);
        }
        let numeric: Vec<_> = numeric
            .iter()
            .map(|a| a.as_primitive::<Float64Type>())
            .collect();

        let offset = readings.len();
        for row in 0..batch.num_rows() {
            let row_no = offset + row + 1;
            if timestamps.is_null(row) {
                return Err(LoadError::parse(row_no, "null timestamp"));
            }
            let raw = timestamps.value(row);
            let timestamp = parse_timestamp(raw)
                .ok_or_else(|| LoadError::parse(row_no, format!("bad timestamp '{raw}'")))?;

            let mut values = [0.0_f64; 6];
            for (slot, (col, array)) in values
                .iter_mut()
                .zip(Column::NUMERIC.iter().zip(numeric.iter()))
            {
                if array.is_null(row) {
                    return Err(LoadError::parse(row_no, format!("null {col}")));
                }
                *slot = array.value(row);
            }

            readings.push(SensorReading {
                timestamp,
                temperature: values[0],
                humidity: values[1],
                pir_sensor: flag(values[2], row_no, Column::PirSensor)?,
                door_opening: flag(values[3], row_no, Column::DoorOpening)?,
                gases: values[4],
                electric_consumption: values[5],
            });
        }
    }

    Ok(SensorTable::new(path, readings))
}

fn column(batch: &RecordBatch, col: Column) -> Result<&ArrayRef, LoadError> {
    batch
        .schema()
        .index_of(col.name())
        .map(|idx| batch.column(idx))
        .map_err(|_| LoadError::MissingColumn(col.name()))
}

fn flag(v: f64, row: usize, col: Column) -> Result<u8, LoadError> {
    if v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&v) {
        Ok(v as u8)
    } else {
        Err(LoadError::parse(row, format!("{col} is not a small integer: {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "timestamp,temperature,humidity,pir_sensor,door_opening,gases,electric_consumption\n";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    fn bundled_sample() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets")
            .join("domotics_dataset_november2024_103r.csv")
    }

    #[test]
    fn bundled_sample_has_103_rows() {
        let table = load_file(&bundled_sample()).unwrap();
        assert_eq!(table.len(), 103);
        assert_eq!(
            table.column_names(),
            vec![
                "timestamp",
                "temperature",
                "humidity",
                "pir_sensor",
                "door_opening",
                "gases",
                "electric_consumption"
            ]
        );
        // File order is preserved.
        assert!(table
            .readings
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/nonexistent/dir/readings.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}2024-11-01 00:00:00,20.1,55.0,0,0,400,1.2\n\
             2024-11-01 01:00:00,warm,55.0,0,0,400,1.2\n"
        );
        let path = write_csv(&dir, "bad.csv", &body);
        match load_file(&path).unwrap_err() {
            LoadError::Parse { row, .. } => assert_eq!(row, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "short.csv",
            "timestamp,temperature,humidity\n2024-11-01 00:00:00,20.1,55.0\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("pir_sensor")), "{err:?}");
    }

    #[test]
    fn columns_are_matched_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "shuffled.csv",
            "humidity,timestamp,extra,temperature,gases,pir_sensor,door_opening,electric_consumption\n\
             61.5,2024-11-02T10:30:00,x,22.5,410.0,1,0,1.75\n",
        );
        let table = load_file(&path).unwrap();
        let r = &table.readings[0];
        assert_eq!(r.temperature, 22.5);
        assert_eq!(r.humidity, 61.5);
        assert_eq!(r.pir_sensor, 1);
        assert_eq!(r.electric_consumption, 1.75);
    }

    #[test]
    fn parquet_with_integer_flags() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("timestamp", DataType::Utf8, false),
            Field::new("temperature", DataType::Float64, false),
            Field::new("humidity", DataType::Float64, false),
            Field::new("pir_sensor", DataType::Int64, false),
            Field::new("door_opening", DataType::Int64, false),
            Field::new("gases", DataType::Float64, false),
            Field::new("electric_consumption", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![
                    "2024-11-01 00:00:00",
                    "2024-11-01 01:00:00",
                ])),
                Arc::new(Float64Array::from(vec![18.0, 19.5])),
                Arc::new(Float64Array::from(vec![70.0, 66.0])),
                Arc::new(Int64Array::from(vec![0, 1])),
                Arc::new(Int64Array::from(vec![0, 1])),
                Arc::new(Float64Array::from(vec![401.0, 455.5])),
                Arc::new(Float64Array::from(vec![0.4, 0.7])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.readings[1].pir_sensor, 1);
        assert_eq!(table.readings[1].gases, 455.5);
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("readings.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref e) if e == "xlsx"));
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2024-11-01 13:00:00").is_some());
        assert!(parse_timestamp("2024-11-01T13:00:00.250").is_some());
        assert!(parse_timestamp("01/11/2024").is_none());
    }

    #[test]
    fn cache_returns_same_table_for_same_path() {
        let mut cache = DatasetCache::default();
        let a = cache.get_or_load(&bundled_sample()).unwrap();
        let b = cache.get_or_load(&bundled_sample()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_keep_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("later.csv");
        let mut cache = DatasetCache::default();
        assert!(matches!(
            cache.get_or_load(&path),
            Err(LoadError::NotFound(_))
        ));

        let body = format!("{HEADER}2024-11-01 00:00:00,20.1,55.0,0,0,400,1.2\n");
        write_csv(&dir, "later.csv", &body);
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 1);
    }
}
