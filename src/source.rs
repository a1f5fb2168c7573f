//! Symbol manifests - where function signatures come from
//!
//! A module's signatures live in `<dir>/<module>.symbols.json`, optionally
//! split across partitions `<dir>/<module>.<part>.symbols.json`. Partitions
//! are read in file-name order after the main file.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GenError, Result};
use crate::signature::FunctionSignature;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolManifest {
    pub module: String,

    #[serde(default)]
    pub functions: Vec<FunctionSignature>,
}

impl SymbolManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(GenError::io(path))?;
        serde_json::from_str(&content).map_err(|source| GenError::Json { path: path.to_path_buf(), source })
    }
}

/// Manifest files for `module` under `directory`, main file first
pub fn manifest_paths(directory: &Path, module: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let main = directory.join(format!("{module}.symbols.json"));
    if main.is_file() {
        paths.push(main);
    }

    let pattern = format!(
        "{}/{}.*.symbols.json",
        Pattern::escape(&directory.to_string_lossy()),
        Pattern::escape(module)
    );
    let entries = glob::glob(&pattern).map_err(|source| GenError::Pattern { pattern: pattern.clone(), source })?;

    let mut partitions = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| GenError::Io {
            path: e.path().to_path_buf(),
            source: std::io::Error::from(e),
        })?;
        partitions.push(path);
    }
    partitions.sort();
    paths.extend(partitions);

    Ok(paths)
}

/// All signatures recorded for `module`
pub fn load_signatures(directory: &Path, module: &str) -> Result<Vec<FunctionSignature>> {
    let paths = manifest_paths(directory, module)?;
    if paths.is_empty() {
        return Err(GenError::NoSymbols { module: module.to_string(), directory: directory.to_path_buf() });
    }

    let mut functions = Vec::new();
    for path in &paths {
        let manifest = SymbolManifest::load(path)?;
        if manifest.module != module {
            return Err(GenError::Config(format!(
                "{} describes module `{}`, expected `{module}`",
                path.display(),
                manifest.module
            )));
        }
        debug!(path = %path.display(), functions = manifest.functions.len(), "loaded symbol manifest");
        functions.extend(manifest.functions);
    }

    Ok(functions)
}
