//! Generator configuration (fish shape, batch size, output). Loaded from fishgen.ron at startup.

use fish_procgen::{FishParams, FishPreset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent generator settings. Loaded from `fishgen.ron` in the current directory
/// unless another path is given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishgenConfig {
    /// Shape parameters. Unset fields take the built-in defaults.
    #[serde(default)]
    pub fish: FishParams,
    /// Start from a named preset instead of `fish`; `fish.seed` and `fish.jitter` still apply.
    #[serde(default)]
    pub preset: Option<FishPreset>,
    /// Number of fish to generate; fish `i` uses seed `fish.seed + i`.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Directory OBJ files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Write one Wavefront OBJ per fish.
    #[serde(default = "default_true")]
    pub write_obj: bool,
}

fn default_count() -> u32 {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("fish_out")
}
fn default_true() -> bool {
    true
}

impl Default for FishgenConfig {
    fn default() -> Self {
        Self {
            fish: FishParams::default(),
            preset: None,
            count: default_count(),
            output_dir: default_output_dir(),
            write_obj: default_true(),
        }
    }
}

impl FishgenConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        } else {
            log::info!("No config at {:?}, using defaults", path);
        }
        Self::default()
    }

    /// Save config to `path`. Logs on error.
    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Parameters for the first fish: the preset (if any) with this config's seed and jitter.
    pub fn fish_params(&self) -> FishParams {
        match self.preset {
            Some(preset) => FishParams {
                seed: self.fish.seed,
                jitter: self.fish.jitter,
                ..preset.params()
            },
            None => self.fish.clone(),
        }
    }
}

pub fn default_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("fishgen.ron")
}
