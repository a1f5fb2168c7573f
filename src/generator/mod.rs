//! Glue generator
//!
//! Pipeline: load signatures → drop excluded → validate and classify every
//! function → render both artifacts → write the ones that changed. Nothing
//! is written unless every function in the module is supported.

pub mod descriptor;
pub mod glue;
pub mod writer;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::GenConfig;
use crate::convention::{is_identifier, CallingConvention};
use crate::errors::{GenError, Result};
use crate::signature::FunctionSignature;
use crate::source;

pub use descriptor::render_module;
pub use glue::render_functions;
pub use writer::write_if_changed;

/// Inputs of one `gen` run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Directory holding the symbol manifests
    pub symbols: PathBuf,
    /// Module whose functions are exposed
    pub module: String,
    /// Source directory of that module; `pyglue.toml` is searched from here
    pub input: PathBuf,
    pub output: PathBuf,
    /// Name the interpreter imports the extension module by
    pub target: String,
}

/// Where the two artifacts for a target go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub functions: PathBuf,
    pub module: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output: &Path, target: &str) -> Self {
        Self {
            functions: output.join(format!("PythonFunctions+{target}.rs")),
            module: output.join(format!("PythonModule+{target}.rs")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannedFunction {
    pub signature: FunctionSignature,
    pub convention: CallingConvention,
    pub doc: Option<String>,
}

/// A fully validated generation job
#[derive(Debug, Clone)]
pub struct Plan {
    pub module: String,
    pub target: String,
    pub config: GenConfig,
    pub config_path: Option<PathBuf>,
    pub functions: Vec<PlannedFunction>,
    pub excluded: Vec<String>,
    pub artifacts: ArtifactPaths,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub artifacts: ArtifactPaths,
    pub exposed: usize,
    pub functions_written: bool,
    pub module_written: bool,
}

/// Validate `request` and everything it refers to, without writing
#[instrument(skip_all, fields(module = %request.module, target = %request.target))]
pub fn plan(request: &GenerateRequest) -> Result<Plan> {
    if !is_identifier(&request.target) {
        return Err(GenError::Config(format!("target `{}` is not a valid module name", request.target)));
    }
    if !request.input.is_dir() {
        return Err(GenError::Config(format!("input directory {} does not exist", request.input.display())));
    }

    let (config, config_path) = GenConfig::discover(&request.input)?;
    config.validate()?;

    let planned = plan_functions(source::load_signatures(&request.symbols, &request.module)?, &config)?;

    Ok(Plan {
        module: request.module.clone(),
        target: request.target.clone(),
        config,
        config_path,
        functions: planned.functions,
        excluded: planned.excluded,
        artifacts: ArtifactPaths::new(&request.output, &request.target),
    })
}

struct PlannedFunctions {
    functions: Vec<PlannedFunction>,
    excluded: Vec<String>,
}

fn plan_functions(signatures: Vec<FunctionSignature>, config: &GenConfig) -> Result<PlannedFunctions> {
    let excludes = config.exclude_patterns()?;
    let mut seen = HashSet::new();
    let mut functions = Vec::with_capacity(signatures.len());
    let mut excluded = Vec::new();

    for signature in signatures {
        if excludes.iter().any(|pattern| pattern.matches(&signature.name)) {
            debug!(function = %signature.name, "excluded by config");
            excluded.push(signature.name);
            continue;
        }

        let convention = CallingConvention::select(&signature)?;
        if !seen.insert(signature.name.clone()) {
            return Err(GenError::invalid(&signature.name, "defined more than once"));
        }

        let doc = config.doc_for(&signature.name).map(str::to_string).or_else(|| signature.doc.clone());
        debug!(function = %signature.name, %convention, "planned");
        functions.push(PlannedFunction { signature, convention, doc });
    }

    Ok(PlannedFunctions { functions, excluded })
}

/// Render both artifacts: `(functions, module)`
pub fn render(plan: &Plan) -> (String, String) {
    (render_functions(plan), render_module(plan))
}

/// Run a full `gen`
pub fn generate(request: &GenerateRequest) -> Result<GenerationReport> {
    let plan = plan(request)?;
    let (functions, module) = render(&plan);

    let functions_written = write_if_changed(&plan.artifacts.functions, &functions)?;
    let module_written = write_if_changed(&plan.artifacts.module, &module)?;

    info!(
        module = %plan.module,
        target = %plan.target,
        exposed = plan.functions.len(),
        excluded = plan.excluded.len(),
        functions_written,
        module_written,
        "generated extension glue"
    );

    Ok(GenerationReport {
        artifacts: plan.artifacts,
        exposed: plan.functions.len(),
        functions_written,
        module_written,
    })
}
