//! Global object with builtin-backed properties

use crate::builtins::Visibility;
use crate::names::Identifier;
use crate::object::{JsObject, Property};
use crate::vm::Vm;
use std::ops::Deref;
use tracing::debug;

/// The VM's global object
///
/// Construction exports the VM's builtin names, then installs every builtin
/// lazily: a private slot for each one, plus an enumerable public property
/// for the public ones.
#[derive(Debug)]
pub struct GlobalObject {
    object: JsObject,
}

impl GlobalObject {
    pub fn new(vm: &Vm) -> Self {
        vm.export_names();

        let object = JsObject::new();
        let mut public = 0;
        let mut private = 0;

        for wrapper in vm.builtin_functions().iter() {
            let family = wrapper.family();
            for (descriptor, private_name) in wrapper.entries() {
                let lazy = Property::LazyBuiltin {
                    family,
                    name: descriptor.name,
                };

                object.define_private(private_name.clone(), lazy.clone());
                private += 1;

                if descriptor.visibility == Visibility::Public {
                    object.define(
                        Identifier::new(descriptor.public_facing_name()),
                        lazy,
                        true,
                    );
                    public += 1;
                }
            }
        }

        debug!(vm = %vm.id(), public, private, "installed builtin properties");
        Self { object }
    }
}

impl Deref for GlobalObject {
    type Target = JsObject;

    fn deref(&self) -> &JsObject {
        &self.object
    }
}
