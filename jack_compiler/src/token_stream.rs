//! Buffered stream of tokens for look ahead.
use crate::{
    lex::{tokenize, LexError},
    tokens::{Span, Token, TokenKind},
};

use std::{error, fmt};

/// Deepest nesting of expressions, terms and statement lists
/// the parser accepts.
pub const MAX_DEPTH: usize = 128;

/// Cursor over a fully lexed token buffer.
///
/// Peeking never moves the cursor, so `peek` and `peek_nth` can be
/// called any number of times. Only the consuming methods advance,
/// and the cursor never moves backwards.
///
/// The buffer always ends in an [`TokenKind::EOS`] token. Peeking or
/// consuming past the end keeps returning that token.
pub struct TokenStream<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    /// Current nesting of recursive productions.
    depth: usize,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str, mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::EOS) {
            let end = source_code.len() as u32;
            tokens.push(Token::new(TokenKind::EOS, Span::new(end, 0)));
        }

        Self {
            tokens,
            cursor: 0,
            depth: 0,
            original: source_code,
        }
    }

    /// Lex the source and wrap the result in a stream.
    pub fn from_source(source_code: &'a str) -> Result<Self, LexError> {
        Ok(Self::new(source_code, tokenize(source_code)?))
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Helper function to extract the span's string fragment
    /// from the original source code.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.original)
    }

    /// Lexical value of the given token.
    #[inline]
    pub fn token_text(&self, token: &Token) -> &'a str {
        token.text(self.original)
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// Look ahead `n` tokens past the current one, without advancing
    /// the cursor. `peek_nth(0)` is the current token.
    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.cursor + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Indicates whether the cursor is on the end-of-source token.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::EOS
    }

    /// Consumes the current token regardless of type.
    pub fn next_token(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EOS {
            self.cursor += 1;
        }
        token
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Does not consume the token if the kinds do not match.
    pub fn match_token(&mut self, token_kind: impl Into<TokenKind>) -> Option<Token> {
        if self.peek_kind() == token_kind.into() {
            Some(self.next_token())
        } else {
            None
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a [`TokenError`] is returned and the cursor is not advanced.
    pub fn consume(&mut self, token_kind: impl Into<TokenKind>) -> Result<Token, TokenError> {
        let token_kind = token_kind.into();
        match self.match_token(token_kind) {
            Some(token) => Ok(token),
            None => Err(TokenError::Mismatch {
                expected: token_kind,
                encountered: self.peek().clone(),
            }),
        }
    }

    /// Descend into a nested expression, term or statement list.
    ///
    /// Fails once nesting reaches [`MAX_DEPTH`], so deeply nested source
    /// is rejected before the recursive parser exhausts the stack.
    pub fn enter(&mut self) -> Result<(), TokenError> {
        if self.depth >= MAX_DEPTH {
            return Err(TokenError::Nesting {
                encountered: self.peek().clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Return from a nested production entered with [`TokenStream::enter`].
    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Build an error for the current token.
    #[inline(never)]
    #[cold]
    pub fn unexpected(&self, msg: impl ToString) -> TokenError {
        TokenError::Unexpected {
            encountered: self.peek().clone(),
            msg: msg.to_string(),
        }
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: TokenKind,
        encountered: Token,
    },
    Unexpected {
        encountered: Token,
        msg: String,
    },
    /// Nesting deeper than [`MAX_DEPTH`].
    Nesting {
        encountered: Token,
    },
}

impl TokenError {
    pub fn encountered(&self) -> &Token {
        match self {
            Self::Mismatch { encountered, .. }
            | Self::Unexpected { encountered, .. }
            | Self::Nesting { encountered } => encountered,
        }
    }
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch {
                expected,
                encountered,
            } => write!(
                f,
                "encountered unexpected {}, expected {}",
                encountered.kind, expected
            ),
            E::Unexpected { encountered, msg } => {
                write!(f, "encountered unexpected {}, {}", encountered.kind, msg)
            }
            E::Nesting { .. } => write!(f, "nesting exceeds maximum depth of {MAX_DEPTH}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokens::{Keyword, Symbol};

    #[test]
    fn test_peek_is_idempotent() {
        let stream = TokenStream::from_source("foo.bar()").unwrap();
        assert_eq!(stream.peek_kind(), TokenKind::Ident);
        assert_eq!(stream.peek_kind(), TokenKind::Ident);
        assert_eq!(stream.peek_nth(1).kind, TokenKind::Symbol(Symbol::Dot));
        assert_eq!(stream.peek_nth(2).kind, TokenKind::Ident);
        assert_eq!(stream.peek_kind(), TokenKind::Ident);
    }

    #[test]
    fn test_peek_past_end() {
        let mut stream = TokenStream::from_source("x").unwrap();
        assert_eq!(stream.peek_nth(5).kind, TokenKind::EOS);
        stream.next_token();
        assert!(stream.at_end());
        stream.next_token();
        assert!(stream.at_end());
    }

    #[test]
    fn test_consume_mismatch_does_not_advance() {
        let mut stream = TokenStream::from_source("let x").unwrap();
        let err = stream.consume(Symbol::Semicolon).unwrap_err();
        assert!(matches!(err, TokenError::Mismatch { .. }));
        assert_eq!(stream.peek_kind(), TokenKind::Keyword(Keyword::Let));

        let token = stream.consume(Keyword::Let).unwrap();
        assert_eq!(stream.span_fragment(&token.span), "let");
        assert_eq!(stream.peek_kind(), TokenKind::Ident);
    }

    #[test]
    fn test_nesting_limit() {
        let mut stream = TokenStream::from_source("x").unwrap();
        for _ in 0..MAX_DEPTH {
            stream.enter().unwrap();
        }
        assert!(matches!(stream.enter(), Err(TokenError::Nesting { .. })));

        stream.leave();
        assert!(stream.enter().is_ok());
    }

    #[test]
    fn test_new_appends_eos() {
        let stream = TokenStream::new("", vec![]);
        assert!(stream.at_end());
    }
}
