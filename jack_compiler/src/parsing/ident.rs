use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};
use smol_str::SmolStr;

/// Class, subroutine or variable name.
///
/// Whether a name refers to a class or a variable is only known once
/// it's resolved against the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub token: Token,
    pub name: SmolStr,
}

impl Ident {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl Parse for Ident {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = SmolStr::from(input.span_fragment(&token.span));
        Ok(Ident { token, name })
    }
}
