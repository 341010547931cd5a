use std::env;
use std::path::PathBuf;

use layers::{LayerStackConfig, DEFAULT_OPACITY};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_STORE_DIR: &str = "data/layers";

/// Values given on the command line. Anything left out falls back to the
/// environment, then to the built-in default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub user_id: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub tile_size: Option<u32>,
    pub fly_duration_ms: Option<u32>,
    pub default_opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub backend_url: String,
    pub user_id: String,
    pub store_dir: PathBuf,
    pub tile_size: u32,
    pub fly_duration_ms: u32,
    pub default_opacity: f64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let stack = LayerStackConfig::default();
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            tile_size: stack.tile_size,
            fly_duration_ms: stack.fly_duration_ms,
            default_opacity: DEFAULT_OPACITY,
        }
    }
}

impl ExplorerConfig {
    pub fn resolve(overrides: Overrides) -> Self {
        Self::resolve_with(overrides, |key| env::var(key).ok())
    }

    fn resolve_with(overrides: Overrides, var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let opacity = overrides
            .default_opacity
            .unwrap_or_else(|| env_var_f64(&var, "EXPLORER_DEFAULT_OPACITY", defaults.default_opacity));
        Self {
            backend_url: overrides
                .backend_url
                .or_else(|| var("EXPLORER_BACKEND_URL"))
                .unwrap_or(defaults.backend_url),
            user_id: overrides
                .user_id
                .or_else(|| var("EXPLORER_USER_ID"))
                .unwrap_or(defaults.user_id),
            store_dir: overrides
                .store_dir
                .or_else(|| var("EXPLORER_STORE_DIR").map(PathBuf::from))
                .unwrap_or(defaults.store_dir),
            tile_size: overrides
                .tile_size
                .unwrap_or_else(|| env_var_u32(&var, "EXPLORER_TILE_SIZE", defaults.tile_size)),
            fly_duration_ms: overrides.fly_duration_ms.unwrap_or_else(|| {
                env_var_u32(&var, "EXPLORER_FLY_DURATION_MS", defaults.fly_duration_ms)
            }),
            default_opacity: if (0.0..=1.0).contains(&opacity) {
                opacity
            } else {
                defaults.default_opacity
            },
        }
    }

    pub fn stack_config(&self) -> LayerStackConfig {
        LayerStackConfig {
            tile_size: self.tile_size,
            fly_duration_ms: self.fly_duration_ms,
            ..LayerStackConfig::default()
        }
    }
}

fn env_var_u32(var: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_var_f64(var: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{ExplorerConfig, Overrides};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_flags_or_environment() {
        let config = ExplorerConfig::resolve_with(Overrides::default(), env(&[]));
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.default_opacity, 0.8);
    }

    #[test]
    fn flags_beat_environment_beats_defaults() {
        let vars = env(&[
            ("EXPLORER_BACKEND_URL", "http://eo.internal:9000"),
            ("EXPLORER_USER_ID", "env-user"),
            ("EXPLORER_TILE_SIZE", "512"),
        ]);
        let overrides = Overrides {
            user_id: Some("flag-user".to_string()),
            store_dir: Some(PathBuf::from("/tmp/layers")),
            ..Overrides::default()
        };
        let config = ExplorerConfig::resolve_with(overrides, vars);
        assert_eq!(config.backend_url, "http://eo.internal:9000");
        assert_eq!(config.user_id, "flag-user");
        assert_eq!(config.store_dir, PathBuf::from("/tmp/layers"));
        assert_eq!(config.tile_size, 512);
        assert_eq!(config.stack_config().tile_size, 512);
    }

    #[test]
    fn malformed_values_fall_back() {
        let vars = env(&[
            ("EXPLORER_TILE_SIZE", "huge"),
            ("EXPLORER_FLY_DURATION_MS", "-5"),
            ("EXPLORER_DEFAULT_OPACITY", "3.5"),
        ]);
        let config = ExplorerConfig::resolve_with(Overrides::default(), vars);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.fly_duration_ms, 1000);
        assert_eq!(config.default_opacity, 0.8);
    }
}
