/// Data layer: sensor table, loading, statistics and column groups.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SensorTable   (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  sample, min/max, correlation (cached per content)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  column group → projection for the dataset view
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
