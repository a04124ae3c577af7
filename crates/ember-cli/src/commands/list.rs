//! List command - print the builtin descriptor table

use super::{select_families, visibility_str};
use anyhow::Result;
use ember_runtime::builtins::{BuiltinDescriptor, BuiltinFamily};
use serde_json::{json, Value};

/// Print every descriptor of the selected families in declaration order
pub fn run(family: Option<&str>, json_output: bool) -> Result<()> {
    let families = select_families(family)?;

    if json_output {
        let listing: Vec<Value> = families.iter().map(|family| family_json(family)).collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for family in families {
        println!("{} ({} builtins)", family.name, family.len());
        for descriptor in family.iter() {
            println!("  {}", describe(descriptor));
        }
    }
    Ok(())
}

fn describe(descriptor: &BuiltinDescriptor) -> String {
    let mut line = format!(
        "{:<24} {:<8}",
        format!("{}({})", descriptor.name, descriptor.argument_count),
        visibility_str(descriptor.visibility)
    );
    if descriptor.can_construct() {
        line.push_str(" constructor");
    }
    if let Some(display) = descriptor.override_name {
        line.push_str(&format!(" as {}", display));
    }
    line.trim_end().to_string()
}

fn family_json(family: &BuiltinFamily) -> Value {
    let builtins: Vec<Value> = family
        .iter()
        .map(|descriptor| {
            json!({
                "name": descriptor.name,
                "codeName": descriptor.code_name(),
                "argumentCount": descriptor.argument_count,
                "length": descriptor.length,
                "visibility": descriptor.visibility,
                "constructAbility": descriptor.construct_ability,
                "constructorKind": descriptor.constructor_kind,
                "overrideName": descriptor.override_name,
            })
        })
        .collect();

    json!({
        "family": family.name,
        "builtins": builtins,
    })
}
