//! Ember runtime
//!
//! Builtin registration and lazy compilation for the Ember VM. Parts of the
//! standard library are written in the guest language itself; this crate turns
//! the fixed table of those sources into per-VM executables that are compiled
//! on first use, held weakly so the collector can reclaim them, and reached
//! from internal code through private names that user code cannot enumerate.
//!
//! # Example
//!
//! ```
//! use ember_runtime::builtins::table::PROCESS_OBJECT_INTERNALS;
//! use ember_runtime::object::GlobalObject;
//! use ember_runtime::{Value, Vm};
//!
//! let vm = Vm::new();
//! let global = GlobalObject::new(&vm);
//!
//! let private = vm.builtins(&PROCESS_OBJECT_INTERNALS).unwrap()
//!     .private_name("getStdinStream")
//!     .unwrap()
//!     .clone();
//! let Value::Function(stdin) = global.get_private(&vm, &private).unwrap() else {
//!     panic!("expected a function");
//! };
//! assert_eq!(stdin.length(), 3);
//! let frame = stdin.call(Value::Undefined, &[Value::Number(0.0), Value::Null, Value::Null]);
//! assert_eq!(frame.argument_count(), 3);
//! assert!(global.get(&vm, "getStdinStream").is_err());
//! ```

pub mod builtins;
pub mod compiler;
pub mod diagnostic;
pub mod heap;
pub mod names;
pub mod object;
pub mod source;
pub mod span;
pub mod value;
pub mod vm;

pub use builtins::{
    BuiltinDescriptor, BuiltinFamily, ConstructAbility, ConstructorKind, Visibility,
};
pub use compiler::{
    BuiltinCompiler, CompileError, CompileRequest, FunctionCompiler, UnlinkedFunctionExecutable,
};
pub use diagnostic::Diagnostic;
pub use names::{Identifier, PrivateName, PropertyNames};
pub use value::{RuntimeError, RuntimeResult, Value};
pub use vm::{Vm, VmId, VmOptions};
