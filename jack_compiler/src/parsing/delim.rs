//! Delimited list.
use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Symbol, Token, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited<T, D> {
    pub items: Vec<DelimitedItem<T, D>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedItem<T, D> {
    pub item: T,
    pub delim: Option<D>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comma {
    pub token: Token,
}

impl<T, D> Delimited<T, D>
where
    D: Parse<Output = Option<D>, Err = ParseError>,
{
    /// Parse a list of items separated by delimiters.
    ///
    /// The item parser returns `None` when the current token can't
    /// start an item. That ends an empty list, unless `required` is set.
    /// After a delimiter an item is always required.
    pub fn parse_with<F>(input: &mut TokenStream, required: bool, mut item: F) -> Result<Self, ParseError>
    where
        F: FnMut(&mut TokenStream) -> Result<Option<T>, ParseError>,
    {
        let mut items = vec![];

        let mut next = item(input)?;
        if next.is_none() && required {
            return Err(input.unexpected("expected at least one item").into());
        }

        while let Some(value) = next.take() {
            let delim = D::parse(input)?;
            let more = delim.is_some();
            items.push(DelimitedItem { item: value, delim });

            if more {
                next = item(input)?;
                if next.is_none() {
                    return Err(input.unexpected("expected item after delimiter").into());
                }
            }
        }

        Ok(Delimited { items })
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|item| &item.item)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T, D> Parse for Delimited<T, D>
where
    T: Parse<Output = Option<T>, Err = ParseError>,
    D: Parse<Output = Option<D>, Err = ParseError>,
{
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        Self::parse_with(input, false, T::parse)
    }
}

/// Parse a comma token into an AST node.
///
/// Allowed to fail because the lookahead is here and not in the delimiter list.
impl Parse for Comma {
    type Output = Option<Self>;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Option<Self>, ParseError> {
        Ok(input
            .match_token(TokenKind::Symbol(Symbol::Comma))
            .map(|token| Comma { token }))
    }
}
