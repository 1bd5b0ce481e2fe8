//! Class level declarations.
use super::{
    delim::{Comma, Delimited},
    func::SubroutineDec,
    ident::Ident,
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Symbol, Token, TokenKind},
};

/// ```text
/// class Name { classVarDec* subroutineDec* }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub keyword: Token,
    pub name: Ident,
    pub left_brace: Token,
    pub vars: Vec<ClassVarDec>,
    pub subroutines: Vec<SubroutineDec>,
    pub right_brace: Token,
}

/// Static or field declaration.
///
/// # Example
///
/// ```text
/// field int x, y;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVarDec {
    pub keyword: Token,
    pub kind: ClassVarKind,
    pub ty: Type,
    pub names: Delimited<Ident, Comma>,
    pub semicolon: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

/// Declared type of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int(Token),
    Char(Token),
    Boolean(Token),
    /// User defined or library class.
    Class(Ident),
}

impl Type {
    /// Type name as recorded in the symbol table.
    pub fn name(&self) -> &str {
        match self {
            Self::Int(_) => Keyword::Int.as_str(),
            Self::Char(_) => Keyword::Char.as_str(),
            Self::Boolean(_) => Keyword::Boolean.as_str(),
            Self::Class(ident) => ident.as_str(),
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            Self::Int(token) | Self::Char(token) | Self::Boolean(token) => token,
            Self::Class(ident) => &ident.token,
        }
    }

    /// Test whether the token kind can start a type.
    pub fn starts_with(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean) | TokenKind::Ident
        )
    }
}

/// Return type of a subroutine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void(Token),
    Type(Type),
}

impl Parse for Class {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(Keyword::Class)?;
        let name = Ident::parse(input)?;
        let left_brace = input.consume(Symbol::LeftBrace)?;

        let mut vars = vec![];
        while let Some(var) = ClassVarDec::parse(input)? {
            vars.push(var);
        }

        let mut subroutines = vec![];
        while let Some(subroutine) = SubroutineDec::parse(input)? {
            subroutines.push(subroutine);
        }

        let right_brace = input.consume(Symbol::RightBrace)?;

        Ok(Class {
            keyword,
            name,
            left_brace,
            vars,
            subroutines,
            right_brace,
        })
    }
}

/// Allowed to fail because the lookahead is here and not in the class body.
impl Parse for ClassVarDec {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        let kind = match input.peek_kind() {
            TokenKind::Keyword(Keyword::Static) => ClassVarKind::Static,
            TokenKind::Keyword(Keyword::Field) => ClassVarKind::Field,
            _ => return Ok(None),
        };

        let keyword = input.next_token();
        let ty = Type::parse(input)?;
        let names = Delimited::parse_with(input, true, |input| Ident::parse(input).map(Some))?;
        let semicolon = input.consume(Symbol::Semicolon)?;

        Ok(Some(ClassVarDec {
            keyword,
            kind,
            ty,
            names,
            semicolon,
        }))
    }
}

impl Parse for Type {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.peek_kind() {
            TokenKind::Keyword(Keyword::Int) => Ok(Type::Int(input.next_token())),
            TokenKind::Keyword(Keyword::Char) => Ok(Type::Char(input.next_token())),
            TokenKind::Keyword(Keyword::Boolean) => Ok(Type::Boolean(input.next_token())),
            TokenKind::Ident => Ident::parse(input).map(Type::Class),
            _ => Err(input
                .unexpected("expected type 'int', 'char', 'boolean' or a class name")
                .into()),
        }
    }
}

impl Parse for ReturnType {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.match_token(Keyword::Void) {
            Some(token) => Ok(ReturnType::Void(token)),
            None => Type::parse(input).map(ReturnType::Type),
        }
    }
}
