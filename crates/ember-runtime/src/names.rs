//! Public and private identifiers for builtins
//!
//! Every builtin is known under two names. The public-facing [`Identifier`] is
//! what user code could see (the natural name or a display override). The
//! [`PrivateName`] is a unique symbol that only internal code holds; it is the
//! sole way to invoke a private builtin and never shows up in enumeration.

use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Interned-style identifier compared by content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Identifier(Rc<str>);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static NEXT_PRIVATE_NAME: AtomicU64 = AtomicU64::new(1);

/// Unique private symbol
///
/// Equality and hashing use the symbol's id only. Two private names with the
/// same description are different names.
#[derive(Debug, Clone)]
pub struct PrivateName {
    id: u64,
    description: Identifier,
}

impl PrivateName {
    /// Mint a fresh private name
    pub fn new(description: impl Into<Identifier>) -> Self {
        Self {
            id: NEXT_PRIVATE_NAME.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> &Identifier {
        &self.description
    }
}

impl PartialEq for PrivateName {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PrivateName {}

impl Hash for PrivateName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for PrivateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.description)
    }
}

/// Two-way table between public-facing identifiers and private names
///
/// Entries keep the order they were first registered in. Registering the same
/// pair again is a no-op, so exporting a family's names twice leaves the table
/// exactly as one export did.
#[derive(Debug, Clone, Default)]
pub struct PropertyNames {
    entries: Vec<(Identifier, PrivateName)>,
    by_private: HashMap<PrivateName, usize>,
    /// Most recent registration for each public identifier
    by_public: HashMap<Identifier, usize>,
}

impl PropertyNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `public` with `private`
    ///
    /// A private name maps to exactly one public identifier; re-registering it
    /// under a different identifier replaces the old association in place.
    pub fn append_external_name(&mut self, public: Identifier, private: PrivateName) {
        if let Some(&index) = self.by_private.get(&private) {
            let previous = &self.entries[index].0;
            if *previous == public {
                return;
            }
            if self.by_public.get(previous) == Some(&index) {
                let previous = previous.clone();
                self.by_public.remove(&previous);
            }
            self.entries[index].0 = public.clone();
            self.by_public.insert(public, index);
            return;
        }

        let index = self.entries.len();
        self.by_private.insert(private.clone(), index);
        self.by_public.insert(public.clone(), index);
        self.entries.push((public, private));
    }

    /// Private name registered for a public identifier
    pub fn private_for(&self, public: &str) -> Option<&PrivateName> {
        self.by_public.get(public).map(|&i| &self.entries[i].1)
    }

    /// Public identifier a private name is exported under
    pub fn public_for(&self, private: &PrivateName) -> Option<&Identifier> {
        self.by_private.get(private).map(|&i| &self.entries[i].0)
    }

    pub fn contains_private(&self, private: &PrivateName) -> bool {
        self.by_private.contains_key(private)
    }

    /// All mappings in registration order
    pub fn entries(&self) -> impl Iterator<Item = (&Identifier, &PrivateName)> {
        self.entries.iter().map(|(public, private)| (public, private))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identifier_serializes_as_string() {
        let json = serde_json::to_string(&Identifier::new("[Symbol.asyncIterator]")).unwrap();
        assert_eq!(json, "\"[Symbol.asyncIterator]\"");
    }

    #[test]
    fn test_private_names_compare_by_identity() {
        let a = PrivateName::new("write");
        let b = PrivateName::new("write");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.to_string(), "@write");
    }

    #[test]
    fn test_append_is_idempotent() {
        let mut names = PropertyNames::new();
        let private = PrivateName::new("binding");
        names.append_external_name(Identifier::new("binding"), private.clone());
        names.append_external_name(Identifier::new("binding"), private.clone());

        assert_eq!(names.len(), 1);
        assert_eq!(names.private_for("binding"), Some(&private));
        assert_eq!(names.public_for(&private).map(Identifier::as_str), Some("binding"));
    }

    #[test]
    fn test_same_public_name_in_two_families_keeps_both_private_names() {
        let mut names = PropertyNames::new();
        let first = PrivateName::new("write");
        let second = PrivateName::new("write");
        names.append_external_name(Identifier::new("write"), first.clone());
        names.append_external_name(Identifier::new("write"), second.clone());

        assert_eq!(names.len(), 2);
        assert!(names.contains_private(&first));
        assert_eq!(names.private_for("write"), Some(&second));
    }

    #[test]
    fn test_reregistering_private_name_replaces_public() {
        let mut names = PropertyNames::new();
        let private = PrivateName::new("asyncIterator");
        names.append_external_name(Identifier::new("asyncIterator"), private.clone());
        names.append_external_name(Identifier::new("[Symbol.asyncIterator]"), private.clone());

        assert_eq!(names.len(), 1);
        assert_eq!(names.private_for("asyncIterator"), None);
        assert_eq!(names.private_for("[Symbol.asyncIterator]"), Some(&private));
    }

    #[test]
    fn test_entries_keep_registration_order() {
        let mut names = PropertyNames::new();
        for name in ["binding", "getStdioWriteStream", "getStdinStream"] {
            names.append_external_name(Identifier::new(name), PrivateName::new(name));
        }
        let order: Vec<&str> = names.entries().map(|(public, _)| public.as_str()).collect();
        assert_eq!(order, vec!["binding", "getStdioWriteStream", "getStdinStream"]);
    }
}
