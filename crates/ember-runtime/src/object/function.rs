//! Function objects linked from builtin executables

use crate::builtins::ConstructorKind;
use crate::compiler::UnlinkedFunctionExecutable;
use crate::names::Identifier;
use crate::object::JsObject;
use crate::value::{RuntimeError, RuntimeResult, Value};
use crate::vm::CallFrame;
use std::rc::Rc;

/// Callable wrapping a builtin executable
///
/// Holding a function object roots its executable, so the collector keeps the
/// cached executable alive as long as the function is reachable.
#[derive(Debug)]
pub struct FunctionObject {
    executable: Rc<UnlinkedFunctionExecutable>,
    name: Identifier,
    length: u32,
}

impl FunctionObject {
    pub fn new(executable: Rc<UnlinkedFunctionExecutable>) -> Self {
        Self {
            name: executable.name().clone(),
            length: executable.arity(),
            executable,
        }
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    /// Function `length` property
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn executable(&self) -> &Rc<UnlinkedFunctionExecutable> {
        &self.executable
    }

    /// Enter the function with `this` and `args`
    pub fn call(&self, this: Value, args: &[Value]) -> CallFrame {
        let mut frame = CallFrame::new(
            self.name.clone(),
            self.executable.parameters(),
            this,
            args,
        );
        frame.strict = self.executable.is_strict();
        frame
    }

    /// Enter the function through `new`
    pub fn construct(&self, args: &[Value]) -> RuntimeResult<CallFrame> {
        if !self.executable.can_construct() {
            return Err(RuntimeError::NotAConstructor {
                name: self.name.to_string(),
            });
        }

        let this = match self.executable.constructor_kind() {
            // Derived constructors get `this` from super()
            ConstructorKind::Extends => Value::Undefined,
            ConstructorKind::Base | ConstructorKind::None => {
                Value::Object(Rc::new(JsObject::new()))
            }
        };

        let mut frame = self.call(this, args);
        frame.is_construct = true;
        Ok(frame)
    }
}
