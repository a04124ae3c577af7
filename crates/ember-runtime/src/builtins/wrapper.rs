//! Per-VM builtin wrappers
//!
//! A [`BuiltinsWrapper`] is created for each family when a VM starts. It binds
//! every descriptor's source to the VM, owns one weak cache slot and one
//! private name per builtin, and materializes executables on demand.

use crate::builtins::{BuiltinDescriptor, BuiltinFamily, SlotStatus, WeakSlot};
use crate::compiler::{CompileError, CompileRequest, UnlinkedFunctionExecutable};
use crate::names::{Identifier, PrivateName, PropertyNames};
use crate::source::SourceBinding;
use crate::value::{RuntimeError, RuntimeResult};
use crate::vm::{Vm, VmId};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

/// A descriptor paired with the outcome of materializing it
pub type BuiltinResult = (
    &'static BuiltinDescriptor,
    RuntimeResult<Rc<UnlinkedFunctionExecutable>>,
);

/// Cache performance statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compile
    pub misses: u64,
    /// Executables reclaimed by the collector
    pub reclaimed: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bindings, cache slots, and private names for one family on one VM
#[derive(Debug)]
pub struct BuiltinsWrapper {
    family: &'static BuiltinFamily,
    bindings: Vec<SourceBinding>,
    slots: Vec<WeakSlot<UnlinkedFunctionExecutable>>,
    private_names: Vec<PrivateName>,
    stats: Cell<CacheStats>,
}

impl BuiltinsWrapper {
    pub fn new(family: &'static BuiltinFamily, vm: VmId) -> Self {
        Self {
            family,
            bindings: family
                .iter()
                .map(|descriptor| SourceBinding::new(descriptor, vm))
                .collect(),
            slots: family.iter().map(|_| WeakSlot::new()).collect(),
            private_names: family
                .iter()
                .map(|descriptor| PrivateName::new(descriptor.name))
                .collect(),
            stats: Cell::new(CacheStats::default()),
        }
    }

    pub fn family(&self) -> &'static BuiltinFamily {
        self.family
    }

    pub fn binding(&self, name: &str) -> Option<&SourceBinding> {
        self.family.index_of(name).map(|i| &self.bindings[i])
    }

    /// Identifier the builtin is exported under
    pub fn public_name(&self, name: &str) -> Option<Identifier> {
        self.family
            .get(name)
            .map(|descriptor| Identifier::new(descriptor.public_facing_name()))
    }

    /// Private name internal code invokes the builtin through
    pub fn private_name(&self, name: &str) -> Option<&PrivateName> {
        self.family.index_of(name).map(|i| &self.private_names[i])
    }

    /// Descriptors paired with their private names, in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&'static BuiltinDescriptor, &PrivateName)> {
        self.family.iter().zip(self.private_names.iter())
    }

    /// Return the builtin's executable, compiling it if the cache is empty
    pub fn materialize(
        &self,
        vm: &Vm,
        name: &str,
    ) -> RuntimeResult<Rc<UnlinkedFunctionExecutable>> {
        let index = self
            .family
            .index_of(name)
            .ok_or_else(|| RuntimeError::UnknownBuiltin {
                family: self.family.name.to_string(),
                name: name.to_string(),
            })?;
        let slot = &self.slots[index];

        if let Some(executable) = slot.try_get() {
            self.record(|stats| stats.hits += 1);
            trace!(family = self.family.name, builtin = name, "builtin cache hit");
            return Ok(executable);
        }
        self.record(|stats| stats.misses += 1);

        let binding = &self.bindings[index];
        let request = CompileRequest::for_binding(binding);

        // No slot borrow is held here, so the compiler may re-enter
        let compiled = vm
            .compiler()
            .compile(vm, request)
            .map_err(|error| match error {
                CompileError::Malformed(diagnostic) => RuntimeError::MalformedBuiltin {
                    name: binding.source().origin().to_string(),
                    diagnostic,
                },
                CompileError::Runtime(error) => error,
            })?;

        // A reentrant call may have filled the slot while we compiled
        if let Some(existing) = slot.try_get() {
            debug!(
                family = self.family.name,
                builtin = name,
                "discarding duplicate compilation"
            );
            return Ok(existing);
        }

        let executable = Rc::new(compiled);
        slot.store(Rc::clone(&executable));
        Ok(executable)
    }

    /// Materialize every builtin in declaration order
    ///
    /// A failure does not stop the rest of the family; each builtin gets its
    /// own result.
    pub fn materialize_all(&self, vm: &Vm) -> Vec<BuiltinResult> {
        self.family
            .iter()
            .map(|descriptor| (descriptor, self.materialize(vm, descriptor.name)))
            .collect()
    }

    pub fn slot_status(&self, name: &str) -> Option<SlotStatus> {
        self.family.index_of(name).map(|i| self.slots[i].status())
    }

    /// Drop the cached executable so the next use recompiles
    ///
    /// Refused while any caller still holds the executable.
    pub fn invalidate(&self, name: &str) -> bool {
        self.family
            .index_of(name)
            .is_some_and(|i| self.slots[i].invalidate())
    }

    /// Register every builtin's public-to-private mapping
    pub fn export_names(&self, names: &mut PropertyNames) {
        for (descriptor, private) in self.entries() {
            names.append_external_name(
                Identifier::new(descriptor.public_facing_name()),
                private.clone(),
            );
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    pub(crate) fn mark(&self) -> usize {
        self.slots.iter().filter(|slot| slot.mark()).count()
    }

    pub(crate) fn sweep(&self) -> usize {
        let reclaimed = self.slots.iter().filter(|slot| slot.sweep()).count();
        self.record(|stats| stats.reclaimed += reclaimed as u64);
        reclaimed
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

/// All builtin wrappers of one VM, in family registration order
#[derive(Debug)]
pub struct BuiltinFunctions {
    wrappers: Vec<BuiltinsWrapper>,
}

impl BuiltinFunctions {
    pub fn new(families: &[&'static BuiltinFamily], vm: VmId) -> Self {
        Self {
            wrappers: families
                .iter()
                .map(|family| BuiltinsWrapper::new(*family, vm))
                .collect(),
        }
    }

    pub fn get(&self, family: &str) -> Option<&BuiltinsWrapper> {
        self.wrappers.iter().find(|w| w.family.name == family)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuiltinsWrapper> {
        self.wrappers.iter()
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Combined statistics across families
    pub fn stats(&self) -> CacheStats {
        self.wrappers
            .iter()
            .map(BuiltinsWrapper::stats)
            .fold(CacheStats::default(), |acc, s| CacheStats {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
                reclaimed: acc.reclaimed + s.reclaimed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::table::{CONSOLE_OBJECT, PROCESS_OBJECT_INTERNALS};

    #[test]
    fn test_bindings_follow_declaration_order() {
        let wrapper = BuiltinsWrapper::new(&PROCESS_OBJECT_INTERNALS, VmId::next());
        let origins: Vec<&str> = wrapper
            .family()
            .function_names()
            .map(|name| wrapper.binding(name).unwrap().source().origin())
            .collect();
        assert_eq!(
            origins,
            vec![
                "processObjectInternalsBindingCode",
                "processObjectInternalsGetStdioWriteStreamCode",
                "processObjectInternalsGetStdinStreamCode",
            ]
        );
    }

    #[test]
    fn test_private_names_are_distinct_per_wrapper() {
        let a = BuiltinsWrapper::new(&CONSOLE_OBJECT, VmId::next());
        let b = BuiltinsWrapper::new(&CONSOLE_OBJECT, VmId::next());
        assert_ne!(a.private_name("write"), b.private_name("write"));
        assert_eq!(
            a.public_name("asyncIterator").unwrap().as_str(),
            "[Symbol.asyncIterator]"
        );
        assert!(a.private_name("log").is_none());
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            reclaimed: 0,
        };
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
