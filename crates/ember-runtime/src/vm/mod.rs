//! The Ember virtual machine
//!
//! A [`Vm`] owns everything builtin-related that is per-VM: the source
//! bindings and weak caches (through [`BuiltinFunctions`]), the exported
//! [`PropertyNames`], the compiler entry point, and heap accounting.
//!
//! A VM is single-threaded. It holds `Rc` and `RefCell` state and is neither
//! `Send` nor `Sync`; run one VM per thread. Only the `'static` descriptor
//! table is shared between VMs.

pub mod frame;

use crate::builtins::{families, BuiltinFamily, BuiltinFunctions, BuiltinsWrapper};
use crate::compiler::{BuiltinCompiler, FunctionCompiler, UnlinkedFunctionExecutable};
use crate::heap::{Allocation, GcStats, Heap};
use crate::names::PropertyNames;
use crate::object::FunctionObject;
use crate::value::{RuntimeError, RuntimeResult};
use ember_config::loader::DEFAULT_GC_THRESHOLD;
use ember_config::Config;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub use frame::CallFrame;

static NEXT_VM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique VM identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VmId(u64);

impl VmId {
    pub fn next() -> Self {
        VmId(NEXT_VM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vm#{}", self.0)
    }
}

/// VM construction options
#[derive(Debug, Clone)]
pub struct VmOptions {
    /// Hard ceiling on live executable bytes
    pub heap_limit: Option<usize>,
    /// Live bytes that trigger a collection before the next allocation
    pub gc_threshold: usize,
    /// Collect before every allocation
    pub gc_stress: bool,
    /// Families to bind, in registration order
    pub families: Vec<&'static BuiltinFamily>,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            heap_limit: None,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            gc_stress: false,
            families: families().to_vec(),
        }
    }
}

impl VmOptions {
    /// Options from loaded configuration, binding every built-in family
    pub fn from_config(config: &Config) -> Self {
        Self {
            heap_limit: config.heap_limit(),
            gc_threshold: config.gc_threshold(),
            gc_stress: config.gc_stress(),
            ..Self::default()
        }
    }
}

/// Virtual machine instance
pub struct Vm {
    id: VmId,
    heap: Heap,
    builtins: BuiltinFunctions,
    names: RefCell<PropertyNames>,
    compiler: Box<dyn BuiltinCompiler>,
}

impl Vm {
    /// Create a VM with default options and the default compiler
    pub fn new() -> Self {
        Self::with_options(VmOptions::default())
    }

    pub fn with_options(options: VmOptions) -> Self {
        Self::with_compiler(options, FunctionCompiler)
    }

    /// Create a VM that materializes builtins through `compiler`
    pub fn with_compiler(options: VmOptions, compiler: impl BuiltinCompiler + 'static) -> Self {
        let id = VmId::next();
        debug!(
            vm = %id,
            families = options.families.len(),
            heap_limit = ?options.heap_limit,
            gc_threshold = options.gc_threshold,
            gc_stress = options.gc_stress,
            "creating vm"
        );

        Self {
            id,
            heap: Heap::new(options.heap_limit, options.gc_threshold, options.gc_stress),
            builtins: BuiltinFunctions::new(&options.families, id),
            names: RefCell::new(PropertyNames::new()),
            compiler: Box::new(compiler),
        }
    }

    pub fn id(&self) -> VmId {
        self.id
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn compiler(&self) -> &dyn BuiltinCompiler {
        self.compiler.as_ref()
    }

    pub fn builtin_functions(&self) -> &BuiltinFunctions {
        &self.builtins
    }

    /// Wrapper bound for `family`
    pub fn builtins(&self, family: &BuiltinFamily) -> RuntimeResult<&BuiltinsWrapper> {
        self.builtins
            .get(family.name)
            .ok_or_else(|| RuntimeError::UnknownFamily {
                family: family.name.to_string(),
            })
    }

    /// Executable for a builtin, compiled on first use
    pub fn materialize(
        &self,
        family: &BuiltinFamily,
        name: &str,
    ) -> RuntimeResult<Rc<UnlinkedFunctionExecutable>> {
        self.builtins(family)?.materialize(self, name)
    }

    /// Link a builtin's executable into a callable function object
    pub fn generate(&self, family: &BuiltinFamily, name: &str) -> RuntimeResult<Rc<FunctionObject>> {
        let executable = self.materialize(family, name)?;
        Ok(Rc::new(FunctionObject::new(executable)))
    }

    /// Register every builtin's public-to-private mapping
    pub fn export_names(&self) {
        let mut names = self.names.borrow_mut();
        for wrapper in self.builtins.iter() {
            wrapper.export_names(&mut names);
        }
        debug!(vm = %self.id, entries = names.len(), "exported builtin names");
    }

    /// Snapshot of the exported name table
    ///
    /// The snapshot is detached from the VM, so holding it never blocks a
    /// later `export_names`.
    pub fn property_names(&self) -> PropertyNames {
        self.names.borrow().clone()
    }

    /// Charge `bytes` to the heap, collecting first if needed
    pub fn allocate(&self, bytes: usize) -> RuntimeResult<Allocation> {
        if self.heap.should_collect(bytes) {
            self.collect_garbage();
        }
        self.heap.try_allocate(bytes).map_err(|error| {
            warn!(vm = %self.id, %error, "builtin allocation failed");
            error
        })
    }

    /// Mark phase: flag cached executables nothing else references
    pub fn mark(&self) -> usize {
        self.builtins.iter().map(BuiltinsWrapper::mark).sum()
    }

    /// Sweep phase: reclaim flagged executables
    pub fn sweep(&self) -> usize {
        self.builtins.iter().map(BuiltinsWrapper::sweep).sum()
    }

    /// Full collection; returns the number of reclaimed executables
    pub fn collect_garbage(&self) -> usize {
        let before = self.heap.bytes_allocated();
        self.mark();
        let reclaimed = self.sweep();
        self.heap.record_collection(before, reclaimed);

        debug!(
            vm = %self.id,
            reclaimed,
            bytes_before = before,
            bytes_after = self.heap.bytes_allocated(),
            "collection finished"
        );
        reclaimed
    }

    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("id", &self.id)
            .field("heap", &self.heap)
            .field("builtins", &self.builtins)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::table::{CONSOLE_OBJECT, PROCESS_OBJECT_INTERNALS};

    #[test]
    fn test_vm_ids_are_unique() {
        assert_ne!(Vm::new().id(), Vm::new().id());
    }

    #[test]
    fn test_materialize_is_cached() {
        let vm = Vm::new();
        let first = vm.materialize(&CONSOLE_OBJECT, "write").unwrap();
        let second = vm.materialize(&CONSOLE_OBJECT, "write").unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        let stats = vm.builtins(&CONSOLE_OBJECT).unwrap().stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_unknown_builtin() {
        let vm = Vm::new();
        assert_eq!(
            vm.materialize(&PROCESS_OBJECT_INTERNALS, "exit").unwrap_err(),
            RuntimeError::UnknownBuiltin {
                family: "processObjectInternals".to_string(),
                name: "exit".to_string(),
            }
        );
    }

    #[test]
    fn test_unbound_family() {
        let vm = Vm::with_options(VmOptions {
            families: vec![&CONSOLE_OBJECT],
            ..VmOptions::default()
        });
        assert!(matches!(
            vm.builtins(&PROCESS_OBJECT_INTERNALS),
            Err(RuntimeError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn test_collect_reclaims_unrooted_executables() {
        let vm = Vm::new();
        drop(vm.materialize(&CONSOLE_OBJECT, "write").unwrap());
        let held = vm.materialize(&CONSOLE_OBJECT, "asyncIterator").unwrap();

        assert_eq!(vm.collect_garbage(), 1);
        assert_eq!(vm.heap().bytes_allocated(), held.allocated_bytes());
        assert_eq!(vm.gc_stats().collections, 1);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.project.heap = Some(ember_config::HeapConfig {
            limit: Some(4096),
            gc_threshold: Some(1024),
            stress: Some(true),
        });

        let options = VmOptions::from_config(&config);
        assert_eq!(options.heap_limit, Some(4096));
        assert_eq!(options.gc_threshold, 1024);
        assert!(options.gc_stress);
        assert_eq!(options.families.len(), families().len());
    }
}
