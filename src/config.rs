//! Generator configuration (`pyglue.toml`)
//!
//! ```toml
//! [runtime]
//! path = "::pyglue_runtime"
//!
//! [module]
//! doc = "Geometry helpers."
//! multiple_interpreters = "not-supported"   # supported | per-interpreter-gil
//! gil = "used"                              # not-used
//!
//! [functions]
//! exclude = ["_*", "debug_*"]
//!
//! [functions.docs]
//! scale = "Scale a value."
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GenError, Result};

pub const CONFIG_FILE_NAME: &str = "pyglue.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub module: ModuleConfig,

    #[serde(default)]
    pub functions: FunctionsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Path the generated code names the runtime crate by
    #[serde(default = "default_runtime_path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    #[serde(default)]
    pub doc: Option<String>,

    #[serde(default)]
    pub multiple_interpreters: MultipleInterpretersMode,

    #[serde(default)]
    pub gil: GilUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultipleInterpretersMode {
    #[default]
    NotSupported,
    Supported,
    PerInterpreterGil,
}

impl MultipleInterpretersMode {
    /// Variant name of the runtime's `MultipleInterpreters`
    pub fn runtime_variant(self) -> &'static str {
        match self {
            Self::NotSupported => "NotSupported",
            Self::Supported => "Supported",
            Self::PerInterpreterGil => "PerInterpreterGilSupported",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GilUsage {
    #[default]
    Used,
    NotUsed,
}

impl GilUsage {
    /// Variant name of the runtime's `GilMode`
    pub fn runtime_variant(self) -> &'static str {
        match self {
            Self::Used => "Used",
            Self::NotUsed => "NotUsed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionsConfig {
    /// Glob patterns over function names to leave out
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Doc strings overriding the ones in the symbol files
    #[serde(default)]
    pub docs: HashMap<String, String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { path: default_runtime_path() }
    }
}

fn default_runtime_path() -> String {
    "::pyglue_runtime".to_string()
}

impl GenConfig {
    /// Load configuration from a `pyglue.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(GenError::io(path))?;
        toml::from_str(&content).map_err(|source| GenError::Toml { path: path.to_path_buf(), source })
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GenError::Config(e.to_string()))
    }

    /// Find `pyglue.toml` in `start` or its parents
    ///
    /// Returns the defaults when there is none; a file that exists but does
    /// not parse is an error.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>)> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                debug!(path = %config_path.display(), "loading generator config");
                let config = Self::load(&config_path)?;
                config.validate()?;
                return Ok((config, Some(config_path)));
            }
            current = dir.parent();
        }

        Ok((Self::default(), None))
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !crate::convention::is_path(&self.runtime.path) {
            return Err(GenError::Config(format!("runtime path `{}` is not a Rust path", self.runtime.path)));
        }
        self.exclude_patterns().map(drop)
    }

    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>> {
        self.functions
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| GenError::Pattern { pattern: pattern.clone(), source })
            })
            .collect()
    }

    /// Doc override for `function`, if any
    pub fn doc_for(&self, function: &str) -> Option<&str> {
        self.functions.docs.get(function).map(String::as_str)
    }
}
