use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;

use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Lamp icons
// ---------------------------------------------------------------------------

/// SVG bytes of the two lamp icons, read once from the asset directory.
#[derive(Clone)]
pub struct LampIcons {
    on: Arc<[u8]>,
    off: Arc<[u8]>,
}

impl LampIcons {
    /// Read `lamp_on.svg` and `lamp_off.svg`. Both must exist.
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            on: read_asset(&config.asset("lamp_on.svg"))?,
            off: read_asset(&config.asset("lamp_off.svg"))?,
        })
    }

    /// Image widget for the given lamp state. Decoded by the egui_extras SVG loader.
    pub fn image(&self, lit: bool) -> egui::Image<'static> {
        let (uri, bytes) = if lit {
            ("bytes://lamp_on.svg", &self.on)
        } else {
            ("bytes://lamp_off.svg", &self.off)
        };
        egui::Image::from_bytes(uri, Arc::clone(bytes))
    }
}

fn read_asset(path: &Path) -> Result<Arc<[u8]>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading asset {}", path.display()))?;
    Ok(bytes.into())
}

// ---------------------------------------------------------------------------
// Window icon
// ---------------------------------------------------------------------------

/// Decode a PNG into viewport icon data.
pub fn window_icon(path: &Path) -> Result<egui::IconData> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(egui::IconData {
        rgba: img.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn bundled_config() -> DashboardConfig {
        DashboardConfig {
            assets_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            ..Default::default()
        }
    }

    #[test]
    fn bundled_icons_load() {
        let icons = LampIcons::load(&bundled_config()).unwrap();
        assert!(icons.on.starts_with(b"<svg"));
        assert!(icons.off.starts_with(b"<svg"));
        assert_ne!(icons.on, icons.off);
    }

    #[test]
    fn missing_icon_is_an_error() {
        let cfg = DashboardConfig {
            assets_dir: PathBuf::from("/nonexistent/assets"),
            ..Default::default()
        };
        let err = LampIcons::load(&cfg).err().unwrap();
        assert!(format!("{err:#}").contains("lamp_on.svg"));
    }

    #[test]
    fn bundled_window_icon_decodes() {
        let icon = window_icon(&bundled_config().asset("icon.png")).unwrap();
        assert_eq!((icon.width, icon.height), (32, 32));
        assert_eq!(icon.rgba.len(), 32 * 32 * 4);
    }
}
