//! Schemedit CLI - inspect and edit schematic circuit files from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use schemedit::{
    locate_component, locate_module, locate_pin, merge_modules, move_module, rotate90_component,
    rotate90_module, Circuit, CircuitStats, EditorConfig, Position,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "schemedit")]
#[command(about = "Circuit schematic editing tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Editor configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Log editing steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise modules, components and traces
    Stats {
        /// Circuit file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Report what lies under a canvas point
    Locate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        layer: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Look for a component and pin inside this module
        #[arg(long)]
        module: Option<String>,

        /// Treat the module as focused (zoomed onto the canvas centre)
        #[arg(long)]
        zoomed: bool,
    },

    /// Move a module to a layer position
    MoveModule {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        layer: String,

        #[arg(long)]
        module: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Write the edited circuit here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn a module, or one of its components, a quarter turn
    Rotate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        layer: String,

        #[arg(long)]
        module: String,

        #[arg(long)]
        component: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge modules of a layer into one
    Merge {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        layer: String,

        /// Module to merge (repeat for each)
        #[arg(long = "module", required = true)]
        modules: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let format = cli.format;

    match cli.command {
        Commands::Stats { file } => handle_stats(&file, &format),
        Commands::Locate {
            file,
            layer,
            x,
            y,
            module,
            zoomed,
        } => handle_locate(&file, &layer, Position::new(x, y), module.as_deref(), zoomed, &config, &format),
        Commands::MoveModule {
            file,
            layer,
            module,
            x,
            y,
            output,
        } => {
            let mut circuit = load(&file)?;
            move_module(&mut circuit, &layer, &module, Position::new(x, y))?;
            let summary = format!("Moved {} to ({}, {})", module, x, y);
            write_circuit(&circuit, output.as_deref(), &summary, &format)
        }
        Commands::Rotate {
            file,
            layer,
            module,
            component,
            output,
        } => {
            let mut circuit = load(&file)?;
            let summary = match component {
                Some(component) => {
                    rotate90_component(&mut circuit, &layer, &module, &component)?;
                    let angle = circuit.module(&layer, &module)?.component(&component)?.angle;
                    format!("Rotated {} in {} to {} degrees", component, module, angle)
                }
                None => {
                    rotate90_module(&mut circuit, &layer, &module)?;
                    let angle = circuit.module(&layer, &module)?.angle;
                    format!("Rotated {} to {} degrees", module, angle)
                }
            };
            write_circuit(&circuit, output.as_deref(), &summary, &format)
        }
        Commands::Merge {
            file,
            layer,
            modules,
            output,
        } => {
            let mut circuit = load(&file)?;
            let refs: Vec<&str> = modules.iter().map(String::as_str).collect();
            let merged = merge_modules(&mut circuit, &layer, &refs, &config)?;
            let summary = format!("Merged {} into {}", modules.join(", "), merged);
            write_circuit(&circuit, output.as_deref(), &summary, &format)
        }
    }
}

fn load(file: &Path) -> Result<Circuit> {
    Circuit::load(file).with_context(|| format!("Failed to read circuit {}", file.display()))
}

/// Save to `output` and report, or print the circuit itself when there is
/// no output file.
fn write_circuit(
    circuit: &Circuit,
    output: Option<&Path>,
    summary: &str,
    format: &OutputFormat,
) -> Result<()> {
    let Some(path) = output else {
        println!("{}", circuit.to_json()?);
        return Ok(());
    };

    circuit
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    match format {
        OutputFormat::Human => println!("{}\nWrote {}", summary, path.display()),
        OutputFormat::Json => {
            let report = serde_json::json!({
                "summary": summary,
                "output": path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn handle_stats(file: &Path, format: &OutputFormat) -> Result<()> {
    let circuit = load(file)?;
    let stats = CircuitStats::of(&circuit);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Human => {
            println!("\nFile: {}", file.display());
            println!("{}", "─".repeat(60));
            println!("  Layers:              {}", stats.layer_count);
            println!("  Modules:             {}", stats.module_count);
            println!("  Parts:               {}", stats.part_count);
            println!("  Pads:                {}", stats.pad_count);
            println!("  Internal traces:     {}", stats.internal_trace_count);
            println!("  Inter-module traces: {}", stats.inter_module_trace_count);

            if !stats.modules.is_empty() {
                println!("\n  Modules:");
                for module in &stats.modules {
                    println!(
                        "    - {}: {} parts, {} pads, {} traces, {} groups",
                        module.reference,
                        module.part_count,
                        module.pad_count,
                        module.trace_count,
                        module.group_count
                    );
                }
            }
        }
    }
    Ok(())
}

fn handle_locate(
    file: &Path,
    layer_ref: &str,
    pointer: Position,
    module_ref: Option<&str>,
    zoomed: bool,
    config: &EditorConfig,
    format: &OutputFormat,
) -> Result<()> {
    let circuit = load(file)?;
    let layer = circuit.layer(layer_ref)?;

    let (module, component, pin) = match module_ref {
        Some(module_ref) => {
            let module = layer.module(layer_ref, module_ref)?;
            let component = locate_component(pointer, Some(module), zoomed, config);
            let pin = locate_pin(pointer, component, Some(module), zoomed, config);
            (Some(module_ref), component, pin)
        }
        None => (locate_module(pointer, Some(layer)), None, None),
    };

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "module": module,
                "component": component,
                "pin": pin,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => match (module, component, pin) {
            (None, _, _) => println!("Nothing at ({}, {})", pointer.x, pointer.y),
            (Some(m), None, _) if module_ref.is_none() => println!("Module {}", m),
            (Some(m), None, _) => println!("No component of {} at ({}, {})", m, pointer.x, pointer.y),
            (Some(m), Some(c), None) => println!("Component {} in module {}", c, m),
            (Some(m), Some(c), Some(p)) => println!("Pin {} of component {} in module {}", p, c, m),
        },
    }
    Ok(())
}
