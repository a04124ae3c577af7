//! Check command - materialize every builtin under the configured heap

use anyhow::{anyhow, Result};
use colored::*;
use ember_config::Config;
use ember_runtime::{RuntimeError, Vm, VmOptions};
use serde_json::{json, Value};

/// Outcome of compiling one builtin
struct CheckResult {
    path: String,
    bytes: usize,
    error: Option<RuntimeError>,
}

/// Compile every builtin and report failures
///
/// Executables stay rooted until the end of the run, so the heap limit
/// applies to the whole table at once.
pub fn run(config: &Config, json_output: bool, no_color: bool) -> Result<()> {
    if no_color {
        colored::control::set_override(false);
    }

    let vm = Vm::with_options(VmOptions::from_config(config));
    let mut rooted = Vec::new();
    let mut results = Vec::new();

    for wrapper in vm.builtin_functions().iter() {
        let family = wrapper.family().name;
        for (descriptor, result) in wrapper.materialize_all(&vm) {
            let path = format!("{}.{}", family, descriptor.name);
            match result {
                Ok(executable) => {
                    results.push(CheckResult {
                        path,
                        bytes: executable.allocated_bytes(),
                        error: None,
                    });
                    rooted.push(executable);
                }
                Err(error) => results.push(CheckResult {
                    path,
                    bytes: 0,
                    error: Some(error),
                }),
            }
        }
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let stats = vm.gc_stats();

    if json_output {
        let entries: Vec<Value> = results.iter().map(result_json).collect();
        let output = json!({
            "results": entries,
            "checked": results.len(),
            "failed": failed,
            "liveBytes": vm.heap().bytes_allocated(),
            "peakBytes": stats.peak_bytes,
            "collections": stats.collections,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for result in &results {
            match &result.error {
                None => println!("{} {} ({} bytes)", "ok".green(), result.path, result.bytes),
                Some(error) => {
                    println!("{} {}", "FAIL".red().bold(), result.path);
                    match error.diagnostic() {
                        Some(diagnostic) => eprint!("{}", diagnostic.to_human_string()),
                        None => eprintln!("  {}", error),
                    }
                }
            }
        }
        println!();
        let summary = format!(
            "{} builtins checked, {} failed, {} bytes live, {} collections",
            results.len(),
            failed,
            vm.heap().bytes_allocated(),
            stats.collections
        );
        if failed == 0 {
            println!("{}", summary.green());
        } else {
            println!("{}", summary.red());
        }
    }

    drop(rooted);
    if failed > 0 {
        return Err(anyhow!("{} builtin(s) failed to compile", failed));
    }
    Ok(())
}

fn result_json(result: &CheckResult) -> Value {
    match &result.error {
        None => json!({ "builtin": result.path, "ok": true, "bytes": result.bytes }),
        Some(error) => json!({
            "builtin": result.path,
            "ok": false,
            "error": error.to_string(),
            "diagnostic": error.diagnostic(),
        }),
    }
}
