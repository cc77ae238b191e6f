//! TOML configuration.
//!
//! Two files are read, both optional:
//!
//! - `~/.config/graphwalk/config.toml` (user scope, located via `dirs`)
//! - `graphwalk.toml` in the project directory (project scope)
//!
//! Project keys override user keys table by table. The merged table is then
//! deserialized into [`GraphwalkConfig`], where every missing key takes its
//! default. [`ConfigHolder`] keeps both the merged table and the defaults so
//! that dotted paths like `traversal.order` can be looked up directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;

use crate::dfs::Strategy;
use crate::options::TraversalOrder;

/// File name of the project-scope config.
pub const PROJECT_CONFIG_FILE: &str = "graphwalk.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphwalkConfig {
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    #[serde(default = "default_true")]
    pub directed: bool,
    #[serde(default)]
    pub order: TraversalOrder,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub detect_cycles: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            directed: default_true(),
            order: TraversalOrder::default(),
            strategy: Strategy::default(),
            detect_cycles: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Property holding a node's children in tree documents.
    #[serde(default = "default_children")]
    pub children: String,
    /// Field identifying a node. Unset means content hashing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            children: default_children(),
            id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `pretty`, `text` or `json`; unset means TTY detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn default_children() -> String {
    "children".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Ok(Table::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let table = toml::from_str::<Table>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), keys = table.len(), "loaded config");
    Ok(table)
}

/// Raw `graphwalk.toml` from `project_root`, empty if absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or is not valid TOML.
pub fn load_project_config(project_root: &Path) -> Result<Table> {
    load_table(&project_root.join(PROJECT_CONFIG_FILE))
}

/// Path of the user-scope config, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("graphwalk/config.toml"))
}

/// Raw user config, empty if absent.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or is not valid TOML.
pub fn load_user_config() -> Result<Table> {
    let Some(path) = user_config_path() else {
        return Ok(Table::new());
    };
    load_table(&path)
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(incoming) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge(existing, incoming);
                } else {
                    base.insert(key, Value::Table(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Load user and project config and merge them, project winning.
///
/// # Errors
///
/// Fails if either file is unreadable or invalid, or if the merged values do
/// not fit the config schema.
pub fn resolve_config(project_root: &Path) -> Result<ConfigHolder> {
    let mut table = load_user_config()?;
    merge(&mut table, load_project_config(project_root)?);
    ConfigHolder::new(table)
}

// ---------------------------------------------------------------------------
// ConfigHolder
// ---------------------------------------------------------------------------

/// Merged configuration with dotted-path lookup.
#[derive(Debug, Clone)]
pub struct ConfigHolder {
    raw: Table,
    defaults: Table,
    settings: GraphwalkConfig,
}

impl ConfigHolder {
    /// Validate `raw` against the schema.
    ///
    /// # Errors
    ///
    /// Fails if a known key holds a value of the wrong type, such as
    /// `order = "sideways"`.
    pub fn new(raw: Table) -> Result<Self> {
        let settings: GraphwalkConfig = Value::Table(raw.clone())
            .try_into()
            .context("Invalid graphwalk configuration")?;
        let defaults = match Value::try_from(GraphwalkConfig::default())
            .context("Failed to serialize default configuration")?
        {
            Value::Table(table) => table,
            _ => Table::new(),
        };
        Ok(Self {
            raw,
            defaults,
            settings,
        })
    }

    /// Typed view of the merged configuration.
    #[must_use]
    pub const fn settings(&self) -> &GraphwalkConfig {
        &self.settings
    }

    /// Look up a dotted path such as `traversal.order`.
    ///
    /// Checks the loaded files first, then the built-in defaults. Returns
    /// `None` when neither has the path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.raw, path).or_else(|| lookup(&self.defaults, path))
    }

    /// Effective configuration (defaults filled in) as a TOML table.
    #[must_use]
    pub fn effective(&self) -> Table {
        let mut table = self.defaults.clone();
        merge(&mut table, self.raw.clone());
        table
    }
}

fn lookup<'t>(table: &'t Table, path: &str) -> Option<&'t Value> {
    let mut segments = path.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}
