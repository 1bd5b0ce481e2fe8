//! Expressions.
//!
//! The grammar has no operator precedence. An expression is a flat
//! list of terms joined by binary operators, evaluated left to right.
//! Grouping is done explicitly with parentheses.
use super::{
    delim::{Comma, Delimited},
    ident::Ident,
    literal::{IntConst, KeywordConst, KeywordValue, StrConst},
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{Symbol, Token, TokenKind},
};

/// ```text
/// term (op term)*
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub head: Term,
    pub tail: Vec<(Op, Term)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub token: Token,
    pub kind: BinOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    And, // &
    Or,  // |
    Lt,  // <
    Gt,  // >
    Eq,  // =
}

impl BinOp {
    #[rustfmt::skip]
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::Plus    => Some(Self::Add),
            Symbol::Minus   => Some(Self::Sub),
            Symbol::Star    => Some(Self::Mul),
            Symbol::Slash   => Some(Self::Div),
            Symbol::Amp     => Some(Self::And),
            Symbol::Pipe    => Some(Self::Or),
            Symbol::Less    => Some(Self::Lt),
            Symbol::Greater => Some(Self::Gt),
            Symbol::Eq      => Some(Self::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Integer(IntConst),
    String(StrConst),
    Keyword(KeywordConst),
    Paren(ParenExpr),
    Unary(UnaryExpr),
    Var(Ident),
    Index(IndexExpr),
    Call(SubroutineCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub left_paren: Token,
    pub expr: Box<Expression>,
    pub right_paren: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub term: Box<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryOp {
    pub token: Token,
    pub kind: UnaryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryKind {
    /// Arithmetic negation `-`
    Neg,
    /// Bitwise not `~`
    Not,
}

/// Array element access `name[expr]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub name: Ident,
    pub index: Index,
}

/// Bracketed array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub left_bracket: Token,
    pub expr: Box<Expression>,
    pub right_bracket: Token,
}

/// ```text
/// name(args)
/// receiver.name(args)
/// ```
///
/// The receiver is either a variable or a class name, which
/// is only decided during code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineCall {
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub left_paren: Token,
    pub args: ExpressionList,
    pub right_paren: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: Ident,
    pub dot: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionList {
    pub exprs: Delimited<Expression, Comma>,
}

impl ExpressionList {
    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Expression> {
        self.exprs.iter()
    }
}

impl Parse for Expression {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.enter()?;
        let head = Term::parse(input)?;
        let mut tail = vec![];

        while let TokenKind::Symbol(symbol) = input.peek_kind() {
            match BinOp::from_symbol(symbol) {
                Some(kind) => {
                    let op = Op {
                        token: input.next_token(),
                        kind,
                    };
                    tail.push((op, Term::parse(input)?));
                }
                None => break,
            }
        }

        input.leave();
        Ok(Expression { head, tail })
    }
}

impl Parse for Term {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        // Unary operators recurse without an enclosing expression.
        input.enter()?;
        let term = parse_term(input)?;
        input.leave();
        Ok(term)
    }
}

fn parse_term(input: &mut TokenStream) -> Result<Term, ParseError> {
    use Symbol as S;
    use TokenKind as T;

    match input.peek_kind() {
        T::Integer => IntConst::parse(input).map(Term::Integer),
        T::String => StrConst::parse(input).map(Term::String),
        T::Keyword(keyword) if KeywordValue::from_keyword(keyword).is_some() => {
            KeywordConst::parse(input).map(Term::Keyword)
        }
        T::Symbol(S::LeftParen) => {
            let left_paren = input.next_token();
            let expr = Box::new(Expression::parse(input)?);
            let right_paren = input.consume(S::RightParen)?;
            Ok(Term::Paren(ParenExpr {
                left_paren,
                expr,
                right_paren,
            }))
        }
        T::Symbol(symbol @ (S::Minus | S::Tilde)) => {
            let kind = match symbol {
                S::Minus => UnaryKind::Neg,
                _ => UnaryKind::Not,
            };
            let op = UnaryOp {
                token: input.next_token(),
                kind,
            };
            let term = Box::new(Term::parse(input)?);
            Ok(Term::Unary(UnaryExpr { op, term }))
        }
        T::Ident => match input.peek_nth(1).kind {
            T::Symbol(S::LeftParen | S::Dot) => SubroutineCall::parse(input).map(Term::Call),
            T::Symbol(S::LeftBracket) => {
                let name = Ident::parse(input)?;
                let index = Index::parse(input)?;
                Ok(Term::Index(IndexExpr { name, index }))
            }
            _ => Ident::parse(input).map(Term::Var),
        },
        _ => Err(input.unexpected("expected term").into()),
    }
}

impl Parse for Index {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_bracket = input.consume(Symbol::LeftBracket)?;
        let expr = Box::new(Expression::parse(input)?);
        let right_bracket = input.consume(Symbol::RightBracket)?;

        Ok(Index {
            left_bracket,
            expr,
            right_bracket,
        })
    }
}

impl Parse for SubroutineCall {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        // The token after the leading name decides between
        // `name(...)` and `receiver.name(...)`.
        let receiver = match input.peek_nth(1).kind {
            TokenKind::Symbol(Symbol::Dot) => Some(Receiver {
                name: Ident::parse(input)?,
                dot: input.consume(Symbol::Dot)?,
            }),
            _ => None,
        };
        let name = Ident::parse(input)?;
        let left_paren = input.consume(Symbol::LeftParen)?;
        let args = ExpressionList::parse(input)?;
        let right_paren = input.consume(Symbol::RightParen)?;

        Ok(SubroutineCall {
            receiver,
            name,
            left_paren,
            args,
            right_paren,
        })
    }
}

impl Parse for ExpressionList {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let exprs = Delimited::parse_with(input, false, |input| match input.peek_kind() {
            TokenKind::Symbol(Symbol::RightParen) => Ok(None),
            _ => Expression::parse(input).map(Some),
        })?;

        Ok(ExpressionList { exprs })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_expr(source: &str) -> Expression {
        let mut stream = TokenStream::from_source(source).unwrap();
        let expr = Expression::parse(&mut stream).unwrap();
        assert!(stream.at_end(), "trailing tokens in {source:?}");
        expr
    }

    #[test]
    fn test_parse_flat_binary() {
        let expr = parse_expr("1 + 2 * 3");
        assert!(matches!(expr.head, Term::Integer(IntConst { value: 1, .. })));
        let ops = expr.tail.iter().map(|(op, _)| op.kind).collect::<Vec<_>>();
        assert_eq!(ops, vec![BinOp::Add, BinOp::Mul]);
    }

    #[test]
    fn test_parse_term_lookahead() {
        assert!(matches!(parse_expr("x").head, Term::Var(_)));
        assert!(matches!(parse_expr("x[1]").head, Term::Index(_)));
        assert!(matches!(parse_expr("x(1)").head, Term::Call(SubroutineCall { receiver: None, .. })));
        assert!(matches!(
            parse_expr("x.y()").head,
            Term::Call(SubroutineCall { receiver: Some(_), .. })
        ));
    }

    #[test]
    fn test_parse_unary_binds_to_term() {
        let expr = parse_expr("-x + ~(y)");
        match &expr.head {
            Term::Unary(UnaryExpr { op, term }) => {
                assert_eq!(op.kind, UnaryKind::Neg);
                assert!(matches!(**term, Term::Var(_)));
            }
            other => panic!("unexpected term {other:?}"),
        }
        assert_eq!(expr.tail.len(), 1);
        assert!(matches!(expr.tail[0].1, Term::Unary(UnaryExpr { op: UnaryOp { kind: UnaryKind::Not, .. }, .. })));
    }

    #[test]
    fn test_parse_call_args() {
        let expr = parse_expr("Math.max(a, b + 1, f())");
        match expr.head {
            Term::Call(call) => {
                assert_eq!(call.receiver.unwrap().name.as_str(), "Math");
                assert_eq!(call.name.as_str(), "max");
                assert_eq!(call.args.len(), 3);
            }
            other => panic!("unexpected term {other:?}"),
        }
    }

    #[test]
    fn test_parse_trailing_comma_fails() {
        let mut stream = TokenStream::from_source("f(a, )").unwrap();
        assert!(Expression::parse(&mut stream).is_err());
    }
}
