use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const ROWS: usize = 103;
const DEFAULT_OUTPUT: &str = "sample_data.csv";

#[derive(Debug, Serialize)]
struct Row {
    timestamp: String,
    temperature: f64,
    humidity: f64,
    pir_sensor: u8,
    door_opening: u8,
    gases: f64,
    electric_consumption: f64,
}

/// Box-Muller transform for a normal sample.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(1e-15..1.0);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn round(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

/// Hourly readings from 2024-11-01 00:00 with a daily temperature cycle.
/// Humidity falls and consumption rises with temperature; motion raises gas
/// and consumption readings.
fn generate(rng: &mut StdRng) -> Vec<Row> {
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 11, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");

    (0..ROWS)
        .map(|i| {
            let ts = start + Duration::hours(i as i64);
            let hour = ts.hour() as f64;
            let daily = ((hour - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin();

            let temperature = 21.0 + 6.0 * daily + gauss(rng, 0.0, 0.8);
            let humidity = (62.0 - 3.2 * (temperature - 21.0) + gauss(rng, 0.0, 2.5)).clamp(20.0, 95.0);
            let awake = (7.0..=23.0).contains(&hour);
            let pir = u8::from(awake && rng.gen_bool(0.45));
            let door = u8::from(pir == 1 && rng.gen_bool(0.3));
            let gases = (gauss(rng, 410.0, 25.0) + 40.0 * f64::from(pir)).max(0.0);
            let consumption =
                (0.9 + 0.18 * (temperature - 21.0) + 0.25 * f64::from(pir) + gauss(rng, 0.0, 0.08)).max(0.05);

            Row {
                timestamp: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                temperature: round(temperature, 1),
                humidity: round(humidity, 1),
                pir_sensor: pir,
                door_opening: door,
                gases: round(gases, 1),
                electric_consumption: round(consumption, 3),
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
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
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.timestamp.as_str()))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.temperature))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.humidity))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.pir_sensor)))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| i64::from(r.door_opening)))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.gases))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.electric_consumption))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let mut rng = StdRng::seed_from_u64(2024);
    let rows = generate(&mut rng);

    match output.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(&rows, &output)?,
        Some("parquet") | Some("pq") => write_parquet(&rows, &output)?,
        other => bail!("Unsupported output extension: {other:?}"),
    }

    log::info!("Wrote {} readings to {}", rows.len(), output.display());
    println!("Wrote {} readings to {}", rows.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_leaves_bundled_dataset_alone() {
        assert!(!Path::new(DEFAULT_OUTPUT).starts_with("assets"));
    }

    #[test]
    fn generates_hourly_rows_in_range() {
        let rows = generate(&mut StdRng::seed_from_u64(2024));
        assert_eq!(rows.len(), ROWS);
        assert_eq!(rows[0].timestamp, "2024-11-01 00:00:00");
        assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(rows.iter().all(|r| (-15.0..=75.0).contains(&r.temperature)));
        assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.humidity)));
    }
}
