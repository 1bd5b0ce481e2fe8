mod codegen;
mod ir;
mod symbol;

pub use codegen::CodeGen;
pub use ir::{ArithOp, Label, Segment, IR};
pub use symbol::{Symbol, SymbolError, SymbolKind, SymbolScope, SymbolTable};

use crate::{parsing::Ident, tokens::Span};
use smol_str::SmolStr;
use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Name that is neither a variable in scope nor usable as a class.
    UndefinedSymbol { name: SmolStr, span: Span },
    /// Name declared twice in the same scope level.
    DuplicateDefinition {
        name: SmolStr,
        existing: SymbolKind,
        span: Span,
    },
    /// Valid syntax that can't be represented in VM code.
    UnsupportedConstruct { msg: String, span: Span },
}

impl CompileError {
    pub(crate) fn undefined(name: &Ident) -> Self {
        CompileError::UndefinedSymbol {
            name: name.name.clone(),
            span: name.token.span.clone(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            CompileError::UndefinedSymbol { span, .. }
            | CompileError::DuplicateDefinition { span, .. }
            | CompileError::UnsupportedConstruct { span, .. } => span,
        }
    }
}

impl error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::UndefinedSymbol { name, .. } => write!(f, "undefined symbol '{name}'"),
            CompileError::DuplicateDefinition { name, existing, .. } => {
                write!(f, "duplicate definition, '{name}' is already defined as {existing} variable")
            }
            CompileError::UnsupportedConstruct { msg, .. } => write!(f, "unsupported construct: {msg}"),
        }
    }
}
