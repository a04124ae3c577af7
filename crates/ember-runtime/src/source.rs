//! Builtin source bound to a VM

use crate::builtins::BuiltinDescriptor;
use crate::span::Span;
use crate::vm::VmId;
use std::rc::Rc;

/// Immutable source text with its origin
#[derive(Debug, Clone)]
pub struct SourceCode {
    text: &'static str,
    origin: Rc<str>,
}

impl SourceCode {
    pub fn new(text: &'static str, origin: impl AsRef<str>) -> Self {
        Self {
            text,
            origin: Rc::from(origin.as_ref()),
        }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Name diagnostics report as the file, the builtin's code name
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text covered by `span`, clamped to the source
    pub fn slice(&self, span: Span) -> &'static str {
        let end = span.end.min(self.text.len());
        let start = span.start.min(end);
        self.text.get(start..end).unwrap_or("")
    }
}

/// One descriptor's source bound to one VM
///
/// Created with the VM's builtin wrappers and dropped with them.
#[derive(Debug)]
pub struct SourceBinding {
    descriptor: &'static BuiltinDescriptor,
    vm: VmId,
    source: SourceCode,
}

impl SourceBinding {
    pub fn new(descriptor: &'static BuiltinDescriptor, vm: VmId) -> Self {
        Self {
            descriptor,
            vm,
            source: SourceCode::new(descriptor.source, descriptor.code_name()),
        }
    }

    pub fn descriptor(&self) -> &'static BuiltinDescriptor {
        self.descriptor
    }

    pub fn vm(&self) -> VmId {
        self.vm
    }

    pub fn source(&self) -> &SourceCode {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_clamps() {
        let source = SourceCode::new("(function () {})", "test");
        assert_eq!(source.slice(Span::new(1, 9)), "function");
        assert_eq!(source.slice(Span::new(10, 100)), "() {})");
        assert_eq!(source.slice(Span::new(50, 60)), "");
    }
}
