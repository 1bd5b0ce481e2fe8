mod block;
mod class;
mod delim;
mod expr;
mod func;
mod ident;
mod literal;
mod stmts;
mod unit;

pub use block::*;
pub use class::*;
pub use delim::*;
pub use expr::*;
pub use func::*;
pub use ident::*;
pub use literal::*;
pub use stmts::*;
pub use unit::*;

use crate::{
    token_stream::{TokenError, TokenStream},
    tokens::{Span, Token},
};
use std::{error::Error, fmt};

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Token(TokenError),
    /// Integer constant that can't be represented.
    Integer { token: Token },
}

impl ParseError {
    /// Location of the token the parser stopped at.
    pub fn span(&self) -> &Span {
        match self {
            Self::Token(err) => &err.encountered().span,
            Self::Integer { token } => &token.span,
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Token(err) => write!(f, "syntax error: {err}"),
            Self::Integer { .. } => write!(f, "syntax error: invalid integer constant"),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        ParseError::Token(err)
    }
}
