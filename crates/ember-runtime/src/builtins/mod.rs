//! Builtin descriptor table
//!
//! Builtins are grouped into families, one per guest source file. Each family
//! is a `'static` slice of [`BuiltinDescriptor`]s in declaration order; that
//! order is the iteration order, the export order, and the order the CLI lists
//! them in.

pub mod table;
pub mod weak;
pub mod wrapper;

use serde::Serialize;

pub use table::families;
pub use weak::{SlotStatus, WeakSlot};
pub use wrapper::{BuiltinFunctions, BuiltinResult, BuiltinsWrapper, CacheStats};

/// Whether a builtin may be invoked with `new`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructAbility {
    CanConstruct,
    CannotConstruct,
}

/// Constructor flavor of a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructorKind {
    None,
    Base,
    Extends,
}

/// Whether a builtin is installed as a public property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Public,
    /// Reachable only through its private name
    Private,
}

/// One builtin function, fixed at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinDescriptor {
    /// Family the builtin was generated from
    pub family: &'static str,
    /// Natural name
    pub name: &'static str,
    /// Guest source text, a parenthesized function expression
    pub source: &'static str,
    /// Declared length of `source` in bytes
    pub length: usize,
    /// Parameter count declared by the generator
    pub argument_count: u32,
    pub construct_ability: ConstructAbility,
    pub constructor_kind: ConstructorKind,
    pub visibility: Visibility,
    /// Display name used instead of `name`
    pub override_name: Option<&'static str>,
}

impl BuiltinDescriptor {
    /// Source origin of this builtin, e.g. `processObjectInternalsBindingCode`
    pub fn code_name(&self) -> String {
        let mut code_name = String::with_capacity(self.family.len() + self.name.len() + 4);
        code_name.push_str(self.family);
        let mut chars = self.name.chars();
        if let Some(first) = chars.next() {
            code_name.extend(first.to_uppercase());
            code_name.push_str(chars.as_str());
        }
        code_name.push_str("Code");
        code_name
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Identifier the builtin is exported and displayed under
    pub fn public_facing_name(&self) -> &'static str {
        self.override_name.unwrap_or(self.name)
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn can_construct(&self) -> bool {
        self.construct_ability == ConstructAbility::CanConstruct
    }
}

/// Builtins generated from one guest source file
#[derive(Debug)]
pub struct BuiltinFamily {
    pub name: &'static str,
    pub descriptors: &'static [BuiltinDescriptor],
}

impl BuiltinFamily {
    pub fn descriptors(&self) -> &'static [BuiltinDescriptor] {
        self.descriptors
    }

    pub fn iter(&self) -> std::slice::Iter<'static, BuiltinDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'static BuiltinDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Natural names in declaration order
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> {
        self.descriptors.iter().map(|d| d.name)
    }
}

/// Find a family compiled into the binary by name
pub fn family(name: &str) -> Option<&'static BuiltinFamily> {
    families().iter().copied().find(|f| f.name == name)
}

/// Resolve a `family.name` path to its descriptor
pub fn lookup(path: &str) -> Option<(&'static BuiltinFamily, &'static BuiltinDescriptor)> {
    let (family_name, name) = path.split_once('.')?;
    let family = family(family_name)?;
    Some((family, family.get(name)?))
}

#[cfg(test)]
mod tests {
    use super::table::{CONSOLE_OBJECT, PROCESS_OBJECT_INTERNALS};
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("binding", "processObjectInternalsBindingCode")]
    #[case("getStdioWriteStream", "processObjectInternalsGetStdioWriteStreamCode")]
    #[case("getStdinStream", "processObjectInternalsGetStdinStreamCode")]
    fn test_code_names(#[case] name: &str, #[case] expected: &str) {
        let descriptor = PROCESS_OBJECT_INTERNALS.get(name).unwrap();
        assert_eq!(descriptor.code_name(), expected);
    }

    #[test]
    fn test_declaration_order() {
        let names: Vec<_> = PROCESS_OBJECT_INTERNALS.function_names().collect();
        assert_eq!(names, vec!["binding", "getStdioWriteStream", "getStdinStream"]);
    }

    #[test]
    fn test_public_facing_name_prefers_override() {
        let iterator = CONSOLE_OBJECT.get("asyncIterator").unwrap();
        assert_eq!(iterator.public_facing_name(), "[Symbol.asyncIterator]");
        let write = CONSOLE_OBJECT.get("write").unwrap();
        assert_eq!(write.public_facing_name(), "write");
    }

    #[test]
    fn test_declared_lengths_match_sources() {
        for family in families() {
            for descriptor in family.iter() {
                assert_eq!(descriptor.length, descriptor.source_len(), "{}", descriptor.name);
            }
        }
    }

    #[test]
    fn test_lookup_path() {
        let (family, descriptor) = lookup("consoleObject.write").unwrap();
        assert_eq!(family.name, "consoleObject");
        assert_eq!(descriptor.argument_count, 1);
        assert!(lookup("consoleObject.log").is_none());
        assert!(lookup("write").is_none());
    }
}
