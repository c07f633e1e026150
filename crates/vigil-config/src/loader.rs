//! Config file discovery and layered loading.
//!
//! Layers, lowest to highest precedence:
//! 1. Embedded `defaults.toml`
//! 2. User config (`<config dir>/vigil/config.toml`)
//! 3. Explicit file (`--config`), which must exist
//! 4. `VIGIL_*` environment overrides

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: usize = 1_048_576;

/// Inputs to [`load_with`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file.
    pub explicit: Option<PathBuf>,
    /// Directory holding the user `config.toml`. Discovered when `None`.
    pub user_dir: Option<PathBuf>,
    /// Skip the user layer entirely.
    pub skip_user: bool,
    /// Environment snapshot. Read from the process when `None`.
    pub env: Option<HashMap<String, String>>,
}

/// A validated config plus the files that contributed to it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: Config,
    /// Files merged, in order.
    pub loaded_files: Vec<PathBuf>,
}

/// The platform config directory for Vigil, if one can be determined.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vigil").map(|d| d.config_dir().to_path_buf())
}

/// Load with the default layer discovery.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an
/// environment override is invalid, or validation fails.
pub fn load(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    load_with(LoadOptions {
        explicit: explicit.map(Path::to_path_buf),
        ..Default::default()
    })
}

/// Load with explicit options.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(options: LoadOptions) -> ConfigResult<LoadedConfig> {
    let mut merged: toml::Value = toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })?;
    let mut loaded_files = Vec::new();

    if !options.skip_user {
        let user_dir = options.user_dir.clone().or_else(user_config_dir);
        if let Some(dir) = user_dir {
            let path = dir.join("config.toml");
            if let Some(overlay) = try_load_file(&path)? {
                deep_merge(&mut merged, &overlay);
                info!(path = %path.display(), "loaded user config");
                loaded_files.push(path);
            }
        }
    }

    if let Some(path) = options.explicit {
        let overlay = try_load_file(&path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        deep_merge(&mut merged, &overlay);
        info!(path = %path.display(), "loaded config file");
        loaded_files.push(path);
    }

    let env_vars = options.env.unwrap_or_else(collect_env_vars);
    let env_count = apply_env_overrides(&mut merged, &env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment overrides");
    }

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;

    Ok(LoadedConfig {
        config,
        loaded_files,
    })
}

/// Read and parse a file, returning `None` if it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Recursively merge `overlay` into `base`. Tables merge key by key;
/// everything else is replaced.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated(env: &[(&str, &str)]) -> LoadOptions {
        LoadOptions {
            skip_user: true,
            env: Some(
                env.iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_match_struct_defaults() {
        let from_file: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(from_file, Config::default());
    }

    #[test]
    fn test_load_defaults_only() {
        let loaded = load_with(isolated(&[])).unwrap();
        assert!(loaded.loaded_files.is_empty());
        assert_eq!(loaded.config.limits.max_steps, 6);
        assert_eq!(loaded.config.approval.request_ttl_secs, 300);
    }

    #[test]
    fn test_layer_precedence() {
        let user = TempDir::new().unwrap();
        std::fs::write(
            user.path().join("config.toml"),
            "[limits]\nmax_steps = 4\nchar_budget = 1000\n",
        )
        .unwrap();
        let explicit = user.path().join("explicit.toml");
        std::fs::write(&explicit, "[limits]\nmax_steps = 3\n").unwrap();

        let loaded = load_with(LoadOptions {
            explicit: Some(explicit.clone()),
            user_dir: Some(user.path().to_path_buf()),
            skip_user: false,
            env: Some(HashMap::from([("VIGIL_MAX_STEPS".to_owned(), "2".to_owned())])),
        })
        .unwrap();

        assert_eq!(loaded.config.limits.max_steps, 2);
        assert_eq!(loaded.config.limits.char_budget, 1000);
        assert_eq!(loaded.loaded_files.len(), 2);
        assert_eq!(loaded.loaded_files[1], explicit);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let mut options = isolated(&[]);
        options.explicit = Some(dir.path().join("nope.toml"));
        assert!(matches!(load_with(options), Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[limits\nmax_steps = ").unwrap();
        let mut options = isolated(&[]);
        options.explicit = Some(path);
        assert!(matches!(load_with(options), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typed.toml");
        std::fs::write(&path, "[limits]\nmax_steps = \"six\"\n").unwrap();
        let mut options = isolated(&[]);
        options.explicit = Some(path);
        assert!(matches!(load_with(options), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_validation_runs_after_merge() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[approval]\ntoken_ttl_secs = 0\n").unwrap();
        let mut options = isolated(&[]);
        options.explicit = Some(path);
        assert!(matches!(load_with(options), Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_env_overrides_workspace_and_bind() {
        let loaded = load_with(isolated(&[
            ("VIGIL_WORKSPACE_ROOT", "/srv/project"),
            ("VIGIL_BIND", "0.0.0.0:9000"),
            ("VIGIL_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(loaded.config.workspace.root, Some(PathBuf::from("/srv/project")));
        assert_eq!(loaded.config.server.bind, "0.0.0.0:9000");
        assert_eq!(loaded.config.logging.level, "debug");
    }

    #[test]
    fn test_deep_merge_keeps_siblings() {
        let mut base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        deep_merge(&mut base, &overlay);
        assert_eq!(base["a"]["x"].as_integer(), Some(1));
        assert_eq!(base["a"]["y"].as_integer(), Some(3));
        assert_eq!(base["b"]["z"].as_integer(), Some(4));
    }
}
