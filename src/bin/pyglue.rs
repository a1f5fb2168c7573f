//! pyglue command-line front end

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, Level};

use pyglue::{generate, init_logging, plan, GenerateRequest, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "pyglue", version, about = "Expose Rust functions as CPython extension modules")]
struct Cli {
    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value_t = Verbosity::Warn)]
    log_level: Verbosity,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = Format::Compact)]
    log_format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate glue functions and the module descriptor
    Gen(ModuleArgs),
    /// Validate inputs and print the artifacts `gen` would write
    Prepare(ModuleArgs),
}

#[derive(Args)]
struct ModuleArgs {
    /// Directory holding `<module>.symbols.json`
    #[arg(long)]
    symbols: PathBuf,
    /// Module whose functions are exposed
    #[arg(long)]
    module: String,
    /// Source directory of the module (pyglue.toml is looked up from here)
    #[arg(long)]
    input: PathBuf,
    /// Output directory for the generated files
    #[arg(long)]
    output: PathBuf,
    /// Extension module name as imported by Python
    #[arg(long)]
    target: String,
}

impl From<ModuleArgs> for GenerateRequest {
    fn from(args: ModuleArgs) -> Self {
        Self {
            symbols: args.symbols,
            module: args.module,
            input: args.input,
            output: args.output,
            target: args.target,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Verbosity> for Level {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Error => Level::ERROR,
            Verbosity::Warn => Level::WARN,
            Verbosity::Info => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Trace => Level::TRACE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Compact,
    Json,
}

impl From<Format> for LogFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pretty => LogFormat::Pretty,
            Format::Compact => LogFormat::Compact,
            Format::Json => LogFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _guard = init_logging(
        LogConfig::new()
            .with_level(cli.log_level.into())
            .with_format(cli.log_format.into()),
    );

    if let Err(e) = run(cli.command) {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Gen(args) => {
            let request = GenerateRequest::from(args);
            let report = generate(&request)
                .with_context(|| format!("generating glue for module `{}`", request.module))?;

            for (path, written) in [
                (&report.artifacts.functions, report.functions_written),
                (&report.artifacts.module, report.module_written),
            ] {
                let status = if written { "wrote" } else { "unchanged" };
                println!("{status} {}", path.display());
            }
            println!("{} function(s) exposed", report.exposed);
        }
        Commands::Prepare(args) => {
            let request = GenerateRequest::from(args);
            let plan = plan(&request).with_context(|| format!("preparing module `{}`", request.module))?;

            if let Some(config) = &plan.config_path {
                println!("config {}", config.display());
            }
            for function in &plan.functions {
                println!("function {} ({})", function.signature.name, function.convention);
            }
            for name in &plan.excluded {
                println!("excluded {name}");
            }
            println!("artifact {}", plan.artifacts.functions.display());
            println!("artifact {}", plan.artifacts.module.display());
        }
    }
    Ok(())
}
