//! Compilation unit.
use super::{class::Class, Parse, ParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};

/// One source file, holding exactly one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub class: Class,
}

impl Parse for CompilationUnit {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let class = Class::parse(input)?;

        // Nothing may follow the class body.
        input.consume(TokenKind::EOS)?;

        Ok(CompilationUnit { class })
    }
}
