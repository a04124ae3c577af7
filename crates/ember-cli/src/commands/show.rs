//! Show command - compile a single builtin and describe the result

use super::visibility_str;
use anyhow::{anyhow, Result};
use ember_config::Config;
use ember_runtime::builtins;
use ember_runtime::{RuntimeError, Vm, VmOptions};
use serde_json::json;

pub fn run(config: &Config, path: &str, show_body: bool, json_output: bool) -> Result<()> {
    let (family, descriptor) =
        builtins::lookup(path).ok_or_else(|| anyhow!("Unknown builtin: {}", path))?;

    let vm = Vm::with_options(VmOptions::from_config(config));
    let executable = match vm.materialize(family, descriptor.name) {
        Ok(executable) => executable,
        Err(RuntimeError::MalformedBuiltin { name, diagnostic }) => {
            if json_output {
                println!("{}", diagnostic.to_json_string()?);
            } else {
                eprint!("{}", diagnostic.to_human_string());
            }
            return Err(anyhow!("Builtin {} failed to compile", name));
        }
        Err(error) => return Err(error.into()),
    };

    let parameters: Vec<&str> = executable.parameters().iter().map(|p| p.as_str()).collect();
    let body = executable.body_span();

    if json_output {
        let mut output = json!({
            "builtin": path,
            "name": executable.name().as_str(),
            "codeName": executable.source().origin(),
            "parameters": parameters,
            "arity": executable.arity(),
            "strict": executable.is_strict(),
            "visibility": executable.visibility(),
            "constructorKind": executable.constructor_kind(),
            "constructAbility": executable.construct_ability(),
            "body": { "start": body.start, "end": body.end },
            "bytes": executable.allocated_bytes(),
        });
        if show_body {
            output["source"] = json!(executable.body_text());
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", path);
    println!("  name:        {}", executable.name());
    println!("  code name:   {}", executable.source().origin());
    println!("  parameters:  ({})", parameters.join(", "));
    println!("  arity:       {}", executable.arity());
    println!("  strict:      {}", executable.is_strict());
    println!("  visibility:  {}", visibility_str(executable.visibility()));
    println!("  construct:   {}", executable.can_construct());
    println!("  body:        {}..{}", body.start, body.end);
    println!("  heap bytes:  {}", executable.allocated_bytes());
    if show_body {
        println!();
        println!("{}", executable.body_text());
    }
    Ok(())
}
