//! Minimal object model consuming builtins
//!
//! Objects have two property spaces. Public properties are keyed by
//! [`Identifier`] and may be enumerable. Private slots are keyed by
//! [`PrivateName`] and are invisible to public lookup and enumeration.
//! Builtin-backed properties start out lazy and are linked into a function
//! object on first read.

pub mod function;
pub mod global;

pub use function::FunctionObject;
pub use global::GlobalObject;

use crate::builtins::BuiltinFamily;
use crate::names::{Identifier, PrivateName};
use crate::value::{RuntimeError, RuntimeResult, Value};
use crate::vm::Vm;
use std::cell::RefCell;
use std::collections::HashMap;

/// Stored property value
#[derive(Debug, Clone)]
pub enum Property {
    Value(Value),
    /// Builtin not yet linked into a function object
    LazyBuiltin {
        family: &'static BuiltinFamily,
        name: &'static str,
    },
}

#[derive(Debug)]
struct Slot {
    property: Property,
    enumerable: bool,
}

/// Ordinary object
#[derive(Debug, Default)]
pub struct JsObject {
    public: RefCell<Vec<(Identifier, Slot)>>,
    private: RefCell<HashMap<PrivateName, Slot>>,
}

impl JsObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or overwrite a public property
    pub fn define(&self, name: Identifier, property: Property, enumerable: bool) {
        let mut public = self.public.borrow_mut();
        let slot = Slot {
            property,
            enumerable,
        };
        match public.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = slot,
            None => public.push((name, slot)),
        }
    }

    /// Define or overwrite a private slot
    pub fn define_private(&self, name: PrivateName, property: Property) {
        self.private.borrow_mut().insert(
            name,
            Slot {
                property,
                enumerable: false,
            },
        );
    }

    /// Read a public property, linking a lazy builtin if needed
    pub fn get(&self, vm: &Vm, name: &str) -> RuntimeResult<Value> {
        let property = self
            .public
            .borrow()
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, slot)| slot.property.clone())
            .ok_or_else(|| RuntimeError::NotFound {
                name: name.to_string(),
            })?;

        let (value, reified) = reify(vm, property)?;
        if reified {
            if let Some((_, slot)) = self
                .public
                .borrow_mut()
                .iter_mut()
                .find(|(key, _)| key.as_str() == name)
            {
                slot.property = Property::Value(value.clone());
            }
        }
        Ok(value)
    }

    /// Read a private slot, linking a lazy builtin if needed
    pub fn get_private(&self, vm: &Vm, name: &PrivateName) -> RuntimeResult<Value> {
        let property = self
            .private
            .borrow()
            .get(name)
            .map(|slot| slot.property.clone())
            .ok_or_else(|| RuntimeError::NotFound {
                name: name.to_string(),
            })?;

        let (value, reified) = reify(vm, property)?;
        if reified {
            if let Some(slot) = self.private.borrow_mut().get_mut(name) {
                slot.property = Property::Value(value.clone());
            }
        }
        Ok(value)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.public
            .borrow()
            .iter()
            .any(|(key, _)| key.as_str() == name)
    }

    pub fn has_private(&self, name: &PrivateName) -> bool {
        self.private.borrow().contains_key(name)
    }

    /// Whether a public property is still an unlinked builtin
    pub fn is_lazy(&self, name: &str) -> bool {
        self.public.borrow().iter().any(|(key, slot)| {
            key.as_str() == name && matches!(slot.property, Property::LazyBuiltin { .. })
        })
    }

    /// Enumerable public property names in definition order
    pub fn keys(&self) -> Vec<Identifier> {
        self.public
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Turn a stored property into a value; the flag reports whether linking ran
///
/// No object borrow is held here, since linking may compile.
fn reify(vm: &Vm, property: Property) -> RuntimeResult<(Value, bool)> {
    match property {
        Property::Value(value) => Ok((value, false)),
        Property::LazyBuiltin { family, name } => {
            let function = vm.generate(family, name)?;
            Ok((Value::Function(function), true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::table::CONSOLE_OBJECT;

    #[test]
    fn test_define_overwrites_in_place() {
        let vm = Vm::new();
        let object = JsObject::new();
        object.define(Identifier::new("a"), Property::Value(Value::Number(1.0)), true);
        object.define(Identifier::new("b"), Property::Value(Value::Null), false);
        object.define(Identifier::new("a"), Property::Value(Value::Number(2.0)), true);

        assert_eq!(object.get(&vm, "a").unwrap(), Value::Number(2.0));
        assert_eq!(object.keys(), vec![Identifier::new("a")]);
        assert!(object.has_own("b"));
    }

    #[test]
    fn test_lazy_builtin_links_once() {
        let vm = Vm::new();
        let object = JsObject::new();
        object.define(
            Identifier::new("write"),
            Property::LazyBuiltin {
                family: &CONSOLE_OBJECT,
                name: "write",
            },
            true,
        );
        assert!(object.is_lazy("write"));

        let first = object.get(&vm, "write").unwrap();
        let second = object.get(&vm, "write").unwrap();
        assert!(!object.is_lazy("write"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_private_slots_are_not_public() {
        let vm = Vm::new();
        let object = JsObject::new();
        let private = PrivateName::new("secret");
        object.define_private(private.clone(), Property::Value(Value::Bool(true)));

        assert_eq!(object.get_private(&vm, &private).unwrap(), Value::Bool(true));
        assert!(matches!(
            object.get(&vm, "secret"),
            Err(RuntimeError::NotFound { .. })
        ));
        assert!(object.keys().is_empty());
    }
}
