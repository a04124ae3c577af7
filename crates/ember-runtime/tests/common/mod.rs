//! Shared test utilities for the builtin cache tests

#![allow(dead_code)]

use ember_runtime::builtins::table::CONSOLE_OBJECT;
use ember_runtime::{
    BuiltinCompiler, BuiltinDescriptor, BuiltinFamily, CompileError, CompileRequest,
    ConstructAbility, ConstructorKind, FunctionCompiler, RuntimeError,
    UnlinkedFunctionExecutable, Visibility, Vm, VmOptions,
};
use std::cell::Cell;
use std::rc::Rc;

const POINT_CODE: &str = "(function (x, y) {\n  \"use strict\";\n  this.x = x;\n  this.y = y;\n})";
const DERIVED_CODE: &str = "(function (x, y, z = 0) {\n  super(x, y);\n  this.z = z;\n})";
const HIDDEN_CODE: &str = "(function (key) {\n  \"use strict\";\n  return @registry[key];\n})";

/// Constructible builtins, plus a private builtin with a display override
pub static TEST_CONSTRUCTORS: BuiltinFamily = BuiltinFamily {
    name: "testConstructors",
    descriptors: &[
        BuiltinDescriptor {
            family: "testConstructors",
            name: "Point",
            source: POINT_CODE,
            length: POINT_CODE.len(),
            argument_count: 2,
            construct_ability: ConstructAbility::CanConstruct,
            constructor_kind: ConstructorKind::Base,
            visibility: Visibility::Public,
            override_name: None,
        },
        BuiltinDescriptor {
            family: "testConstructors",
            name: "Point3",
            source: DERIVED_CODE,
            length: DERIVED_CODE.len(),
            argument_count: 2,
            construct_ability: ConstructAbility::CanConstruct,
            constructor_kind: ConstructorKind::Extends,
            visibility: Visibility::Public,
            override_name: None,
        },
        BuiltinDescriptor {
            family: "testConstructors",
            name: "lookup",
            source: HIDDEN_CODE,
            length: HIDDEN_CODE.len(),
            argument_count: 1,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: Some("registryLookup"),
        },
    ],
};

const UNCLOSED_CODE: &str = "(function (a, b) {\n  return [a, b;\n})";
const MISCOUNTED_CODE: &str = "(function (a, b) {\n  return a;\n})";

/// Builtins whose sources do not compile
pub static BROKEN: BuiltinFamily = BuiltinFamily {
    name: "broken",
    descriptors: &[
        BuiltinDescriptor {
            family: "broken",
            name: "unclosed",
            source: UNCLOSED_CODE,
            length: UNCLOSED_CODE.len(),
            argument_count: 2,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: None,
        },
        BuiltinDescriptor {
            family: "broken",
            name: "miscounted",
            source: MISCOUNTED_CODE,
            length: MISCOUNTED_CODE.len(),
            argument_count: 3,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: None,
        },
    ],
};

/// VM binding only the given families
pub fn vm_with(families: &[&'static BuiltinFamily]) -> Vm {
    Vm::with_options(VmOptions {
        families: families.to_vec(),
        ..VmOptions::default()
    })
}

/// Heap bytes one executable of `family.name` is charged
pub fn executable_size(family: &'static BuiltinFamily, name: &str) -> usize {
    let vm = vm_with(&[family]);
    vm.materialize(family, name)
        .expect("builtin compiles")
        .allocated_bytes()
}

/// Compiler counting how often it runs
#[derive(Default, Clone)]
pub struct CountingCompiler {
    pub calls: Rc<Cell<usize>>,
}

impl BuiltinCompiler for CountingCompiler {
    fn compile(
        &self,
        vm: &Vm,
        request: CompileRequest,
    ) -> Result<UnlinkedFunctionExecutable, CompileError> {
        self.calls.set(self.calls.get() + 1);
        FunctionCompiler.compile(vm, request)
    }
}

/// Compiler that materializes `console.write` from inside its own compilation
#[derive(Default, Clone)]
pub struct ReentrantCompiler {
    pub calls: Rc<Cell<usize>>,
}

impl BuiltinCompiler for ReentrantCompiler {
    fn compile(
        &self,
        vm: &Vm,
        request: CompileRequest,
    ) -> Result<UnlinkedFunctionExecutable, CompileError> {
        self.calls.set(self.calls.get() + 1);
        if request.name.as_str() == "write" && self.calls.get() == 1 {
            let inner = vm.materialize(&CONSOLE_OBJECT, "write")?;
            assert_eq!(inner.name().as_str(), "write");
        }
        FunctionCompiler.compile(vm, request)
    }
}

/// Unwrap an out-of-memory error
pub fn expect_oom(result: Result<Rc<UnlinkedFunctionExecutable>, RuntimeError>) -> (usize, usize) {
    match result {
        Err(RuntimeError::OutOfMemory {
            requested, limit, ..
        }) => (requested, limit),
        other => panic!("expected OutOfMemory, got {:?}", other.map(|e| e.name().clone())),
    }
}
