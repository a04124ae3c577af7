//! Call frames for builtin invocation

use crate::names::Identifier;
use crate::value::Value;

/// Activation record produced by calling a builtin function object
///
/// Parameters are bound positionally. Missing arguments bind `undefined`;
/// extra arguments stay reachable through `arguments` but bind to no
/// parameter. A rest parameter collects nothing here since the frame has no
/// array value to hold the remainder.
///
/// ```text
/// function (fd_, rawRequire, Bun) called with (0, req):
///
/// locals:    [fd_ = 0][rawRequire = req][Bun = undefined]
/// arguments: [0][req]
/// ```
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Function name (for debugging and error messages)
    pub function_name: Identifier,
    /// Receiver; `undefined` for a derived constructor until `super()`
    pub this: Value,
    /// Arguments exactly as passed
    pub arguments: Vec<Value>,
    /// Parameters bound to arguments, in declaration order
    pub locals: Vec<(Identifier, Value)>,
    pub strict: bool,
    /// Whether the frame was entered through `new`
    pub is_construct: bool,
}

impl CallFrame {
    pub fn new(
        function_name: Identifier,
        parameters: &[Identifier],
        this: Value,
        arguments: &[Value],
    ) -> Self {
        let locals = parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                (
                    parameter.clone(),
                    arguments.get(i).cloned().unwrap_or_default(),
                )
            })
            .collect();

        Self {
            function_name,
            this,
            arguments: arguments.to_vec(),
            locals,
            strict: false,
            is_construct: false,
        }
    }

    /// Value bound to a parameter
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .find(|(parameter, _)| parameter.as_str() == name)
            .map(|(_, value)| value)
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_bind_undefined() {
        let params = [Identifier::new("fd_"), Identifier::new("rawRequire")];
        let frame = CallFrame::new(
            Identifier::new("getStdioWriteStream"),
            &params,
            Value::Undefined,
            &[Value::Number(1.0)],
        );
        assert_eq!(frame.local("fd_"), Some(&Value::Number(1.0)));
        assert_eq!(frame.local("rawRequire"), Some(&Value::Undefined));
        assert_eq!(frame.local("Bun"), None);
        assert_eq!(frame.argument_count(), 1);
    }
}
