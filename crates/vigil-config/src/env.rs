//! Environment variable overrides.
//!
//! Unlike file layers, these always win over whatever the files set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// How an override value is parsed into TOML.
#[derive(Clone, Copy)]
enum Kind {
    Text,
    Integer,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: Kind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "VIGIL_WORKSPACE_ROOT",
        field_path: "workspace.root",
        kind: Kind::Text,
    },
    EnvMapping {
        var_name: "VIGIL_BIND",
        field_path: "server.bind",
        kind: Kind::Text,
    },
    EnvMapping {
        var_name: "VIGIL_LOG",
        field_path: "logging.level",
        kind: Kind::Text,
    },
    EnvMapping {
        var_name: "VIGIL_MAX_STEPS",
        field_path: "limits.max_steps",
        kind: Kind::Integer,
    },
];

/// Snapshot the `VIGIL_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("VIGIL_"))
        .collect()
}

/// Apply every mapped, non-empty variable in `env_vars` to `merged`.
///
/// Returns the number of overrides applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a numeric variable does not parse.
pub fn apply_env_overrides<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name).map(|v| v.trim()) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        let value = match mapping.kind {
            Kind::Text => toml::Value::String(raw.to_owned()),
            Kind::Integer => {
                let n: i64 = raw.parse().map_err(|_| ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("expected an integer, got '{raw}'"),
                })?;
                toml::Value::Integer(n)
            },
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var override"
        );
        set_field(merged, mapping.field_path, value);
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Set a dotted path, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}
