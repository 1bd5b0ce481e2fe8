//! Statement parsing.
use super::{
    block::Block,
    expr::{Expression, Index, SubroutineCall},
    ident::Ident,
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, Token, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    Return(ReturnStmt),
}

/// Assignment to a variable or array element.
///
/// # Example
///
/// ```text
/// let a[i] = x + 1;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetStmt {
    pub keyword: Token,
    pub name: Ident,
    pub index: Option<Index>,
    pub eq: Token,
    pub rhs: Expression,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub keyword: Token,
    pub left_paren: Token,
    pub cond: Expression,
    pub right_paren: Token,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseBranch {
    pub keyword: Token,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub keyword: Token,
    pub left_paren: Token,
    pub cond: Expression,
    pub right_paren: Token,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStmt {
    pub keyword: Token,
    pub call: SubroutineCall,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expression>,
    pub semicolon: Token,
}

/// Allowed to fail because the lookahead is here and not in the statement list.
impl Parse for Stmt {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        use Keyword as K;

        let keyword = match input.peek_kind() {
            TokenKind::Keyword(keyword) => keyword,
            _ => return Ok(None),
        };

        let stmt = match keyword {
            K::Let => LetStmt::parse(input).map(Stmt::Let)?,
            K::If => IfStmt::parse(input).map(Stmt::If)?,
            K::While => WhileStmt::parse(input).map(Stmt::While)?,
            K::Do => DoStmt::parse(input).map(Stmt::Do)?,
            K::Return => ReturnStmt::parse(input).map(Stmt::Return)?,
            _ => return Ok(None),
        };

        Ok(Some(stmt))
    }
}

impl Parse for LetStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::Let)?;
        let name = Ident::parse(input)?;
        let index = match input.peek_kind() {
            TokenKind::Symbol(Symbol::LeftBracket) => Some(Index::parse(input)?),
            _ => None,
        };
        let eq = input.consume(Symbol::Eq)?;
        let rhs = Expression::parse(input)?;
        let semicolon = input.consume(Symbol::Semicolon)?;

        Ok(LetStmt {
            keyword,
            name,
            index,
            eq,
            rhs,
            semicolon,
        })
    }
}

impl Parse for IfStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::If)?;
        let left_paren = input.consume(Symbol::LeftParen)?;
        let cond = Expression::parse(input)?;
        let right_paren = input.consume(Symbol::RightParen)?;
        let then_block = Block::parse(input)?;

        let else_branch = match input.match_token(Keyword::Else) {
            Some(keyword) => Some(ElseBranch {
                keyword,
                block: Block::parse(input)?,
            }),
            None => None,
        };

        Ok(IfStmt {
            keyword,
            left_paren,
            cond,
            right_paren,
            then_block,
            else_branch,
        })
    }
}

impl Parse for WhileStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::While)?;
        let left_paren = input.consume(Symbol::LeftParen)?;
        let cond = Expression::parse(input)?;
        let right_paren = input.consume(Symbol::RightParen)?;
        let body = Block::parse(input)?;

        Ok(WhileStmt {
            keyword,
            left_paren,
            cond,
            right_paren,
            body,
        })
    }
}

impl Parse for DoStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::Do)?;
        let call = SubroutineCall::parse(input)?;
        let semicolon = input.consume(Symbol::Semicolon)?;

        Ok(DoStmt {
            keyword,
            call,
            semicolon,
        })
    }
}

impl Parse for ReturnStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::Return)?;
        let value = match input.peek_kind() {
            TokenKind::Symbol(Symbol::Semicolon) => None,
            _ => Some(Expression::parse(input)?),
        };
        let semicolon = input.consume(Symbol::Semicolon)?;

        Ok(ReturnStmt {
            keyword,
            value,
            semicolon,
        })
    }
}
