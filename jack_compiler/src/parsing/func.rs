use super::{
    block::Statements,
    class::{ReturnType, Type},
    delim::{Comma, Delimited},
    ident::Ident,
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, Token, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineDec {
    pub keyword: Token,
    pub kind: SubroutineKind,
    pub ret: ReturnType,
    pub name: Ident,
    pub left_paren: Token,
    pub params: ParameterList,
    pub right_paren: Token,
    pub body: SubroutineBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    pub params: Delimited<Param, Comma>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: Type,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineBody {
    pub left_brace: Token,
    pub vars: Vec<VarDec>,
    pub statements: Statements,
    pub right_brace: Token,
}

/// Local variable declaration.
///
/// # Example
///
/// ```text
/// var Array a, b;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDec {
    pub keyword: Token,
    pub ty: Type,
    pub names: Delimited<Ident, Comma>,
    pub semicolon: Token,
}

impl SubroutineBody {
    /// Number of local variable names declared in the body.
    pub fn local_count(&self) -> usize {
        self.vars.iter().map(|var| var.names.len()).sum()
    }
}

/// Allowed to fail because the lookahead is here and not in the class body.
impl Parse for SubroutineDec {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        let kind = match input.peek_kind() {
            TokenKind::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(Keyword::Function) => SubroutineKind::Function,
            TokenKind::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => return Ok(None),
        };

        let keyword = input.next_token();
        let ret = ReturnType::parse(input)?;
        let name = Ident::parse(input)?;
        let left_paren = input.consume(Symbol::LeftParen)?;
        let params = ParameterList::parse(input)?;
        let right_paren = input.consume(Symbol::RightParen)?;
        let body = SubroutineBody::parse(input)?;

        Ok(Some(SubroutineDec {
            keyword,
            kind,
            ret,
            name,
            left_paren,
            params,
            right_paren,
            body,
        }))
    }
}

impl Parse for ParameterList {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let params = Delimited::<Param, Comma>::parse(input)?;
        Ok(ParameterList { params })
    }
}

/// Parse one parameter definition.
///
/// Allowed to fail because the lookahead is here and not in the delimiter list.
impl Parse for Param {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        if !Type::starts_with(input.peek_kind()) {
            return Ok(None);
        }

        Ok(Some(Param {
            ty: Type::parse(input)?,
            name: Ident::parse(input)?,
        }))
    }
}

impl Parse for SubroutineBody {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_brace = input.consume(Symbol::LeftBrace)?;

        let mut vars = vec![];
        while let Some(var) = VarDec::parse(input)? {
            vars.push(var);
        }

        let statements = Statements::parse(input)?;
        let right_brace = input.consume(Symbol::RightBrace)?;

        Ok(SubroutineBody {
            left_brace,
            vars,
            statements,
            right_brace,
        })
    }
}

impl Parse for VarDec {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        let keyword = match input.match_token(Keyword::Var) {
            Some(token) => token,
            None => return Ok(None),
        };
        let ty = Type::parse(input)?;
        let names = Delimited::parse_with(input, true, |input| Ident::parse(input).map(Some))?;
        let semicolon = input.consume(Symbol::Semicolon)?;

        Ok(Some(VarDec {
            keyword,
            ty,
            names,
            semicolon,
        }))
    }
}
