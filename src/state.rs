use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::LampIcons;
use crate::config::DashboardConfig;
use crate::data::filter::ColumnGroup;
use crate::data::loader::DatasetCache;
use crate::data::model::{Column, SensorReading, SensorTable};
use crate::data::stats::{self, CorrelationCache, CorrelationMatrix, Summary};

// ---------------------------------------------------------------------------
// Widget-level state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Control,
    Visualization,
    Dataset,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Control, Tab::Visualization, Tab::Dataset];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Control => "Control",
            Tab::Visualization => "Visualización de datos",
            Tab::Dataset => "Dataset",
        }
    }
}

/// Session light switches. Both start off and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleState {
    pub inside: bool,
    pub outside: bool,
}

/// Number of leading readings drawn by the history chart.
///
/// Only the values in [`SeriesLength::OPTIONS`] can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesLength(usize);

impl SeriesLength {
    pub const OPTIONS: [usize; 7] = [50, 100, 200, 400, 800, 1600, 3200];

    pub fn new(len: usize) -> Option<Self> {
        Self::OPTIONS.contains(&len).then_some(SeriesLength(len))
    }

    /// Option by position, for the select-slider.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::OPTIONS.get(index).map(|&len| SeriesLength(len))
    }

    pub fn index(self) -> usize {
        Self::OPTIONS
            .iter()
            .position(|&len| len == self.0)
            .unwrap_or_default()
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for SeriesLength {
    fn default() -> Self {
        SeriesLength(100)
    }
}

/// Current values of the decorative controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub brightness_inside: u8,
    pub brightness_outside: u8,
    /// Temperature setpoint, °C, in [0, 50].
    pub temperature_set: u8,
    pub series_length: SeriesLength,
    pub column_group: ColumnGroup,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            brightness_inside: 50,
            brightness_outside: 25,
            temperature_set: 24,
            series_length: SeriesLength::default(),
            column_group: ColumnGroup::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-pass view model
// ---------------------------------------------------------------------------

/// Everything the views read, produced by one pipeline re-run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<SensorTable>,
    pub sample: SensorReading,
    pub summary: Summary,
    pub correlation: Arc<CorrelationMatrix>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Dataset the pipeline reads; starts at `config.dataset_path`.
    pub dataset_path: PathBuf,

    pub toggles: ToggleState,
    pub controls: Controls,
    pub tab: Tab,

    /// Whether the session_state side panel is shown.
    pub show_session_panel: bool,

    /// Output of the last successful re-run. `None` after a failed one.
    pub snapshot: Option<Snapshot>,

    /// Lamp icons, read on the first re-run.
    pub icons: Option<LampIcons>,

    /// Error of the last failed pass, shown in the UI.
    pub status_message: Option<String>,

    datasets: DatasetCache,
    correlations: CorrelationCache,
    rng: StdRng,
    rerun_requested: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: DashboardConfig, rng: StdRng) -> Self {
        Self {
            dataset_path: config.dataset_path.clone(),
            config,
            toggles: ToggleState::default(),
            controls: Controls::default(),
            tab: Tab::default(),
            show_session_panel: false,
            snapshot: None,
            icons: None,
            status_message: None,
            datasets: DatasetCache::default(),
            correlations: CorrelationCache::default(),
            rng,
            rerun_requested: true,
        }
    }

    /// Mark the pipeline for re-execution on the next frame.
    pub fn request_rerun(&mut self) {
        self.rerun_requested = true;
    }

    /// Switch to another dataset file; it is loaded on the next re-run.
    pub fn open_dataset(&mut self, path: PathBuf) {
        self.dataset_path = path;
        self.request_rerun();
    }

    /// Run the pipeline if a widget changed since the last pass.
    pub fn run_pending(&mut self) {
        if !self.rerun_requested {
            return;
        }
        self.rerun_requested = false;
        match self.rerun() {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Render pass failed: {e:#}");
                self.snapshot = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Loader → statistics → snapshot. Cached steps return immediately; the
    /// random sample is drawn fresh every time.
    fn rerun(&mut self) -> Result<Snapshot> {
        log::debug!("re-running pipeline for {}", self.dataset_path.display());

        if self.icons.is_none() {
            self.icons = Some(LampIcons::load(&self.config)?);
        }

        let table = self
            .datasets
            .get_or_load(&self.dataset_path)
            .with_context(|| format!("loading {}", self.dataset_path.display()))?;

        ensure!(!table.is_empty(), "{} has no readings", self.dataset_path.display());

        let sample = stats::sample(&table, &mut self.rng)
            .cloned()
            .context("dataset has no readings")?;
        let summary = Summary::of(&table).context("dataset has no readings")?;
        let correlation = self.correlations.get_or_compute(&table, &Column::NUMERIC);
        log::debug!(
            "cached: {} table(s), {} correlation matri(ces)",
            self.datasets.len(),
            self.correlations.len()
        );

        Ok(Snapshot {
            table,
            sample,
            summary,
            correlation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn bundled_config() -> DashboardConfig {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        DashboardConfig {
            dataset_path: assets.join("domotics_dataset_november2024_103r.csv"),
            assets_dir: assets,
            ..Default::default()
        }
    }

    fn seeded(config: DashboardConfig) -> AppState {
        AppState::with_rng(config, StdRng::seed_from_u64(42))
    }

    #[test]
    fn series_length_only_accepts_fixed_options() {
        for len in SeriesLength::OPTIONS {
            assert_eq!(SeriesLength::new(len).map(SeriesLength::get), Some(len));
        }
        for len in [0, 49, 75, 150, 3201, 6400] {
            assert_eq!(SeriesLength::new(len), None);
        }
        assert_eq!(SeriesLength::from_index(7), None);
        assert_eq!(SeriesLength::default().get(), 100);
        assert_eq!(SeriesLength::default().index(), 1);
    }

    #[test]
    fn session_starts_with_both_lights_off() {
        let state = seeded(bundled_config());
        assert_eq!(state.toggles, ToggleState { inside: false, outside: false });
        assert_eq!(state.controls.brightness_inside, 50);
        assert_eq!(state.controls.brightness_outside, 25);
        assert_eq!(state.controls.temperature_set, 24);
        assert_eq!(state.controls.column_group, ColumnGroup::Todos);
    }

    #[test]
    fn first_pass_builds_snapshot() {
        let mut state = seeded(bundled_config());
        state.run_pending();
        let snap = state.snapshot.as_ref().expect("snapshot");
        assert_eq!(snap.table.len(), 103);
        let (lo, hi) = snap.summary.temperature;
        assert!(lo <= snap.sample.temperature && snap.sample.temperature <= hi);
        assert_eq!(snap.correlation.columns(), &Column::NUMERIC);
        assert!(state.status_message.is_none());
        assert!(state.icons.is_some());
    }

    #[test]
    fn rerun_reuses_cached_table_and_matrix() {
        let mut state = seeded(bundled_config());
        state.run_pending();
        let first = state.snapshot.clone().unwrap();

        state.request_rerun();
        state.run_pending();
        let second = state.snapshot.clone().unwrap();
        assert!(Arc::ptr_eq(&first.table, &second.table));
        assert!(Arc::ptr_eq(&first.correlation, &second.correlation));
    }

    #[test]
    fn no_rerun_without_request() {
        let mut state = seeded(bundled_config());
        state.run_pending();
        let before = state.snapshot.clone().unwrap().sample;
        for _ in 0..20 {
            state.run_pending();
            assert_eq!(state.snapshot.as_ref().unwrap().sample, before);
        }
    }

    #[test]
    fn missing_dataset_aborts_the_pass() {
        let mut state = seeded(bundled_config());
        state.run_pending();
        state.open_dataset(PathBuf::from("/nonexistent/november.csv"));
        state.run_pending();
        assert!(state.snapshot.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("not found"), "{msg}");
    }

    #[test]
    fn header_only_dataset_aborts_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(
            &path,
            "timestamp,temperature,humidity,pir_sensor,door_opening,gases,electric_consumption\n",
        )
        .unwrap();

        let mut state = seeded(bundled_config());
        state.open_dataset(path);
        state.run_pending();
        assert!(state.snapshot.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("has no readings"), "{msg}");
    }

    #[test]
    fn missing_assets_abort_the_pass() {
        let cfg = DashboardConfig {
            assets_dir: PathBuf::from("/nonexistent/assets"),
            ..bundled_config()
        };
        let mut state = seeded(cfg);
        state.run_pending();
        assert!(state.snapshot.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("lamp_on.svg"));
    }
}
