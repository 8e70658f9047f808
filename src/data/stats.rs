use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use xxhash_rust::xxh3::Xxh3;

use super::model::{Column, SensorReading, SensorTable};

// ---------------------------------------------------------------------------
// Sampling and ranges
// ---------------------------------------------------------------------------

/// One uniformly random reading. `None` for an empty table.
pub fn sample<'a, R: Rng + ?Sized>(table: &'a SensorTable, rng: &mut R) -> Option<&'a SensorReading> {
    table.readings.choose(rng)
}

/// Minimum and maximum of a numeric column.
///
/// `None` when the table is empty or the column has no numeric values.
pub fn column_range(table: &SensorTable, column: Column) -> Option<(f64, f64)> {
    table.values(column).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Global extremes shown under the history chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub temperature: (f64, f64),
    pub humidity: (f64, f64),
}

impl Summary {
    pub fn of(table: &SensorTable) -> Option<Summary> {
        Some(Summary {
            temperature: column_range(table, Column::Temperature)?,
            humidity: column_range(table, Column::Humidity)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric matrix of Pearson coefficients, row-major over `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    columns: Vec<Column>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|&c| c == a)?;
        let j = self.columns.iter().position(|&c| c == b)?;
        Some(self.at(i, j))
    }

    /// Entry by row/column position.
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.columns.len() + j]
    }

    /// Strongest positive and strongest negative partner of `column`.
    /// NaN entries and the diagonal are skipped.
    pub fn strongest_with(&self, column: Column) -> (Option<(Column, f64)>, Option<(Column, f64)>) {
        let partners: Vec<(Column, f64)> = self
            .columns
            .iter()
            .filter(|&&c| c != column)
            .filter_map(|&c| self.get(column, c).map(|r| (c, r)))
            .filter(|(_, r)| !r.is_nan())
            .collect();

        let positive = partners
            .iter()
            .copied()
            .filter(|(_, r)| *r > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        let negative = partners
            .iter()
            .copied()
            .filter(|(_, r)| *r < 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        (positive, negative)
    }
}

/// Pearson correlation between every pair of `columns`.
///
/// Diagonal entries are 1.0. Off-diagonal entries involving a column with
/// zero variance are NaN.
pub fn correlate(table: &SensorTable, columns: &[Column]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = columns.iter().map(|&c| table.values(c).collect()).collect();
    let centered: Vec<Vec<f64>> = series
        .iter()
        .map(|xs| {
            let mean = xs.iter().sum::<f64>() / xs.len() as f64;
            xs.iter().map(|x| x - mean).collect()
        })
        .collect();
    let sum_sq: Vec<f64> = centered
        .iter()
        .map(|xs| xs.iter().map(|x| x * x).sum())
        .collect();

    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        values[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let denom = (sum_sq[i] * sum_sq[j]).sqrt();
            let r = if denom == 0.0 || denom.is_nan() {
                f64::NAN
            } else {
                let cov: f64 = centered[i]
                    .iter()
                    .zip(&centered[j])
                    .map(|(x, y)| x * y)
                    .sum();
                (cov / denom).clamp(-1.0, 1.0)
            };
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

/// Content hash of the subset `correlate` would read.
fn subset_hash(table: &SensorTable, columns: &[Column]) -> u64 {
    let mut hasher = Xxh3::new();
    for &col in columns {
        hasher.update(col.name().as_bytes());
        hasher.update(&[0]);
        for v in table.values(col) {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    hasher.digest()
}

/// Correlation matrices keyed by the content hash of their input subset.
#[derive(Debug, Default)]
pub struct CorrelationCache {
    entries: HashMap<u64, Arc<CorrelationMatrix>>,
}

impl CorrelationCache {
    pub fn get_or_compute(&mut self, table: &SensorTable, columns: &[Column]) -> Arc<CorrelationMatrix> {
        let key = subset_hash(table, columns);
        if let Some(matrix) = self.entries.get(&key) {
            log::debug!("correlation cache hit ({key:016x})");
            return Arc::clone(matrix);
        }
        let matrix = Arc::new(correlate(table, columns));
        self.entries.insert(key, Arc::clone(&matrix));
        matrix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
