//! Compiled builtin executables

use crate::builtins::{ConstructAbility, ConstructorKind, Visibility};
use crate::compiler::parser::FunctionHeader;
use crate::compiler::CompileRequest;
use crate::heap::Allocation;
use crate::names::Identifier;
use crate::source::SourceCode;
use crate::span::Span;

/// VM-internal compiled form of a builtin function
///
/// "Unlinked" because it is not yet tied to a function object; linking
/// happens in [`Vm::generate`](crate::vm::Vm::generate). The executable owns
/// an [`Allocation`], so its bytes stay charged to the VM until the last
/// reference drops.
#[derive(Debug)]
pub struct UnlinkedFunctionExecutable {
    name: Identifier,
    parameters: Vec<Identifier>,
    arity: u32,
    strict: bool,
    body: Span,
    visibility: Visibility,
    constructor_kind: ConstructorKind,
    construct_ability: ConstructAbility,
    source: SourceCode,
    allocation: Allocation,
}

impl UnlinkedFunctionExecutable {
    pub fn new(request: CompileRequest, header: FunctionHeader, allocation: Allocation) -> Self {
        Self {
            name: request.name,
            parameters: header.parameters,
            arity: header.arity,
            strict: header.strict,
            body: header.body,
            visibility: request.visibility,
            constructor_kind: request.constructor_kind,
            construct_ability: request.construct_ability,
            source: request.source,
            allocation,
        }
    }

    /// Bytes to charge the heap for an executable built from `header`
    pub fn estimated_size(source: &SourceCode, header: &FunctionHeader) -> usize {
        std::mem::size_of::<Self>()
            + source.len()
            + header
                .parameters
                .iter()
                .map(|p| std::mem::size_of::<Identifier>() + p.as_str().len())
                .sum::<usize>()
    }

    /// Display name (the override when the descriptor has one)
    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn parameters(&self) -> &[Identifier] {
        &self.parameters
    }

    /// Function `length`: parameters before the first default or rest one
    pub fn arity(&self) -> u32 {
        self.arity
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn body_span(&self) -> Span {
        self.body
    }

    pub fn body_text(&self) -> &'static str {
        self.source.slice(self.body)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn constructor_kind(&self) -> ConstructorKind {
        self.constructor_kind
    }

    pub fn construct_ability(&self) -> ConstructAbility {
        self.construct_ability
    }

    pub fn can_construct(&self) -> bool {
        self.construct_ability == ConstructAbility::CanConstruct
    }

    pub fn source(&self) -> &SourceCode {
        &self.source
    }

    /// Bytes this executable holds on its VM's heap
    pub fn allocated_bytes(&self) -> usize {
        self.allocation.bytes()
    }
}
