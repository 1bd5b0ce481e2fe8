use super::{stmts::Stmt, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Symbol, Token},
};

/// Statement list surrounded by braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub left_brace: Token,
    pub statements: Statements,
    pub right_brace: Token,
}

/// Zero or more statements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statements {
    pub stmts: Vec<Stmt>,
}

impl Parse for Block {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_brace = input.consume(Symbol::LeftBrace)?;
        let statements = Statements::parse(input)?;
        let right_brace = input.consume(Symbol::RightBrace)?;

        Ok(Block {
            left_brace,
            statements,
            right_brace,
        })
    }
}

impl Parse for Statements {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.enter()?;
        let mut stmts = vec![];

        while let Some(stmt) = Stmt::parse(input)? {
            stmts.push(stmt);
        }

        input.leave();
        Ok(Self { stmts })
    }
}
