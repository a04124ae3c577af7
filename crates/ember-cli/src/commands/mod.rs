pub mod check;
pub mod list;
pub mod names;
pub mod show;

use ember_runtime::builtins::{self, BuiltinFamily};
use ember_runtime::Visibility;

/// Resolve a `--family` filter to the families it selects
pub(crate) fn select_families(filter: Option<&str>) -> anyhow::Result<Vec<&'static BuiltinFamily>> {
    match filter {
        Some(name) => builtins::family(name)
            .map(|family| vec![family])
            .ok_or_else(|| anyhow::anyhow!("Unknown builtin family: {}", name)),
        None => Ok(builtins::families().to_vec()),
    }
}

pub(crate) fn visibility_str(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Private => "private",
    }
}
