//! Compiler entry point for builtin source
//!
//! The VM calls a [`BuiltinCompiler`] whenever a builtin must be
//! (re)materialized. [`FunctionCompiler`] is the default: it parses the
//! function header, checks it against the descriptor, and charges the result
//! to the VM heap.

pub mod executable;
pub mod lexer;
pub mod parser;
pub mod token;

use crate::builtins::{ConstructAbility, ConstructorKind, Visibility};
use crate::diagnostic::{error_codes, Diagnostic};
use crate::names::Identifier;
use crate::source::{SourceBinding, SourceCode};
use crate::span::Span;
use crate::value::RuntimeError;
use crate::vm::Vm;
use thiserror::Error;
use tracing::debug;

pub use executable::UnlinkedFunctionExecutable;
pub use parser::{parse_function, FunctionHeader};

/// Everything the compiler needs to build one executable
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub source: SourceCode,
    /// Externally visible identifier
    pub name: Identifier,
    pub visibility: Visibility,
    pub constructor_kind: ConstructorKind,
    pub construct_ability: ConstructAbility,
    /// Parameter count the descriptor declares
    pub argument_count: u32,
    /// Source length the descriptor declares
    pub declared_length: usize,
}

impl CompileRequest {
    pub fn for_binding(binding: &SourceBinding) -> Self {
        let descriptor = binding.descriptor();
        Self {
            source: binding.source().clone(),
            name: Identifier::new(descriptor.public_facing_name()),
            visibility: descriptor.visibility,
            constructor_kind: descriptor.constructor_kind,
            construct_ability: descriptor.construct_ability,
            argument_count: descriptor.argument_count,
            declared_length: descriptor.length,
        }
    }
}

/// Compilation failure
#[derive(Debug, Error)]
pub enum CompileError {
    /// Source does not compile or contradicts its descriptor
    #[error("{0}")]
    Malformed(Box<Diagnostic>),
    /// VM refused the allocation
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CompileError {
    pub fn malformed(diagnostic: Diagnostic) -> Self {
        CompileError::Malformed(Box::new(diagnostic))
    }
}

/// Compiler entry point the VM materializes builtins through
///
/// Implementations may call back into the VM, including materializing other
/// builtins or the one being compiled.
pub trait BuiltinCompiler {
    fn compile(
        &self,
        vm: &Vm,
        request: CompileRequest,
    ) -> Result<UnlinkedFunctionExecutable, CompileError>;
}

/// Default compiler for parenthesized function expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct FunctionCompiler;

impl BuiltinCompiler for FunctionCompiler {
    fn compile(
        &self,
        vm: &Vm,
        request: CompileRequest,
    ) -> Result<UnlinkedFunctionExecutable, CompileError> {
        let source = &request.source;

        if request.declared_length != source.len() {
            let span = Span::new(0, source.len());
            return Err(CompileError::malformed(
                Diagnostic::error_with_code(
                    error_codes::SOURCE_LENGTH_MISMATCH,
                    format!(
                        "declared length {} does not match source length {}",
                        request.declared_length,
                        source.len()
                    ),
                    span,
                )
                .with_file(source.origin())
                .with_help("regenerate the builtin table"),
            ));
        }

        let header = parse_function(source).map_err(CompileError::malformed)?;

        if header.arity != request.argument_count {
            return Err(CompileError::malformed(
                Diagnostic::error_with_code(
                    error_codes::ARGUMENT_COUNT_MISMATCH,
                    format!(
                        "'{}' declares {} argument(s) but its source takes {}",
                        request.name, request.argument_count, header.arity
                    ),
                    header.parameters_span,
                )
                .with_file(source.origin())
                .located_in(source.text(), header.parameters_span)
                .with_label(format!("{} parameter(s) here", header.arity)),
            ));
        }

        let bytes = UnlinkedFunctionExecutable::estimated_size(source, &header);
        let allocation = vm.allocate(bytes)?;

        debug!(
            builtin = %request.name,
            origin = source.origin(),
            arity = header.arity,
            strict = header.strict,
            bytes,
            "compiled builtin"
        );

        Ok(UnlinkedFunctionExecutable::new(request, header, allocation))
    }
}
