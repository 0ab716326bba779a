//! # Configuration
//!
//! Startup defaults for the demo shell: window size, base tool settings,
//! grid visibility. Loaded from `config.toml` under the user preference
//! directory; any missing field falls back to its compiled-in default, and
//! an unreadable or malformed file degrades to the full defaults with a
//! warning rather than refusing to start.

use scrawl_core::color::Rgba8;
use scrawl_core::tool::ToolState;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Viewport size at startup, pixels.
    pub window_width: u32,
    pub window_height: u32,
    /// Base stroke width (diameter), canvas units.
    pub stroke_width: f32,
    /// Pressure sensitivity on launch.
    pub pressure: bool,
    /// Reference grid on launch.
    pub grid: bool,
    /// Launch ink as `[r, g, b]`.
    pub color: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 640,
            stroke_width: 4.0,
            pressure: true,
            grid: false,
            color: [20, 20, 24],
        }
    }
}

impl Config {
    const FILENAME: &'static str = "config.toml";

    /// Parse from TOML text. Missing fields default; unknown fields are an
    /// error, so typos don't silently vanish.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from the preference directory, or default.
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(mut path) = preferences_dir() else {
            log::warn!("no preference directory available, using default config");
            return Self::default();
        };
        path.push(Self::FILENAME);
        match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("failed to read {}: {e}", path.display());
                Self::default()
            }
            Ok(text) => match Self::from_toml(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("malformed {}: {e}", path.display());
                    Self::default()
                }
            },
        }
    }

    /// Tool state these defaults describe.
    #[must_use]
    pub fn tool(&self) -> ToolState {
        ToolState {
            width: self.stroke_width,
            pressure: self.pressure,
            color: Rgba8::opaque(self.color[0], self.color[1], self.color[2]),
            ..ToolState::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = Config::from_toml("stroke_width = 7.5\ngrid = true\n").unwrap();
        assert_eq!(config.stroke_width, 7.5);
        assert!(config.grid);
        assert_eq!(config.window_width, Config::default().window_width);
    }

    #[test]
    fn malformed_input_is_an_error_not_a_panic() {
        assert!(Config::from_toml("stroke_width = \"wide\"").is_err());
        assert!(Config::from_toml("not_a_field = 1").is_err());
        assert!(Config::from_toml("}{").is_err());
    }

    #[test]
    fn tool_defaults_round_trip() {
        let config = Config::default();
        let tool = config.tool();
        assert_eq!(tool.width, config.stroke_width);
        assert!(!tool.eraser);
        assert!(!tool.handwriting);
    }
}
