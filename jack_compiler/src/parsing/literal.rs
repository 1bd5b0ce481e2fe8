//! Literal values.
use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, Token, TokenKind},
};
use smol_str::SmolStr;

/// Integer constant, `0..=32767`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntConst {
    pub token: Token,
    pub value: u16,
}

/// String constant with its quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrConst {
    pub token: Token,
    pub value: SmolStr,
}

/// One of `true`, `false`, `null` or `this`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordConst {
    pub token: Token,
    pub value: KeywordValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordValue {
    True,
    False,
    Null,
    This,
}

impl KeywordValue {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::True => Some(Self::True),
            Keyword::False => Some(Self::False),
            Keyword::Null => Some(Self::Null),
            Keyword::This => Some(Self::This),
            _ => None,
        }
    }
}

impl Parse for IntConst {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Integer)?;
        match input.token_text(&token).parse::<u16>() {
            Ok(value) => Ok(IntConst { token, value }),
            Err(_) => Err(ParseError::Integer { token }),
        }
    }
}

impl Parse for StrConst {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::String)?;
        let value = SmolStr::from(input.token_text(&token));
        Ok(StrConst { token, value })
    }
}

impl Parse for KeywordConst {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.peek_kind() {
            TokenKind::Keyword(keyword) => match KeywordValue::from_keyword(keyword) {
                Some(value) => Ok(KeywordConst {
                    token: input.next_token(),
                    value,
                }),
                None => Err(input.unexpected("expected keyword constant").into()),
            },
            _ => Err(input.unexpected("expected keyword constant").into()),
        }
    }
}
