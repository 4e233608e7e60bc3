//! Merge example: merge modules of a circuit file and report what changed.

use schemedit::prelude::*;
use schemedit::{merge_modules, CircuitStats};
use std::path::Path;

fn main() -> Result<(), EditorError> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/three_modules.json".to_string());
    let path = Path::new(&path);
    let modules: Vec<String> = args.collect();

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example merge_modules [circuit.json] [MODULE...]");
        std::process::exit(1);
    }

    let mut circuit = Circuit::load(path)?;
    let layer = circuit.layers.keys().next().cloned().unwrap_or_default();
    let modules: Vec<String> = if modules.is_empty() {
        circuit.layer(&layer)?.modules.keys().cloned().collect()
    } else {
        modules
    };
    let refs: Vec<&str> = modules.iter().map(String::as_str).collect();

    let before = CircuitStats::of(&circuit);
    let merged = merge_modules(&mut circuit, &layer, &refs, &EditorConfig::default())?;
    let after = CircuitStats::of(&circuit);

    println!("Merged {} modules on layer {} into {}", refs.len(), layer, merged);
    println!("Modules: {} -> {}", before.module_count, after.module_count);
    println!(
        "Inter-module traces: {} -> {}",
        before.inter_module_trace_count, after.inter_module_trace_count
    );
    for module in &after.modules {
        println!(
            "  {}: {} parts, {} pads, {} traces",
            module.reference, module.part_count, module.pad_count, module.trace_count
        );
    }
    Ok(())
}
