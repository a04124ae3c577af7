//! Names command - print the exported public/private name table

use anyhow::Result;
use ember_config::Config;
use ember_runtime::{Vm, VmOptions};
use serde_json::{json, Value};

pub fn run(config: &Config, json_output: bool) -> Result<()> {
    let vm = Vm::with_options(VmOptions::from_config(config));
    vm.export_names();
    let names = vm.property_names();

    if json_output {
        let entries: Vec<Value> = names
            .entries()
            .map(|(public, private)| {
                json!({
                    "public": public.as_str(),
                    "private": private.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = names
        .entries()
        .map(|(public, _)| public.as_str().len())
        .max()
        .unwrap_or(0);
    for (public, private) in names.entries() {
        println!("{:<width$} -> {}", public.as_str(), private, width = width);
    }
    Ok(())
}
