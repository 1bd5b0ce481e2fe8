//! Lexical analysis (tokenizer)
use crate::tokens::{Keyword, Span, Symbol, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use log::trace;
use std::{error, fmt, iter::Iterator, str::CharIndices};

/// Largest value an integer constant may take.
pub const MAX_INTEGER: u16 = 32767;

/// Lex the whole source into a token buffer.
///
/// The last token is always [`TokenKind::EOS`]. Lexing stops at
/// the first error.
pub fn tokenize(source_code: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source_code)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

/// Lexical analyzer.
pub struct Lexer<'a> {
    source: SourceText<'a>,
    /// Start absolute byte position of the current token
    /// in the source.
    token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: 0,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Whitespace and comments between tokens are discarded. Once the
    /// source is exhausted every call returns an [`TokenKind::EOS`] token.
    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        loop {
            self.consume_whitespace();
            self.start_token();

            let next_char = match self.source.peek_char() {
                Some(c) => c,
                None => return Ok(self.make_token(T::EOS)),
            };

            match next_char {
                '/' => match self.source.peek_char2() {
                    (_, Some('/')) => self.consume_line_comment(),
                    (_, Some('*')) => self.consume_block_comment()?,
                    _ => {
                        self.source.next_char();
                        return Ok(self.make_token(T::Symbol(Symbol::Slash)));
                    }
                },
                '"'               => return self.consume_string(),
                '0'..='9'         => return self.consume_number(),
                '_' | 'a'..='z'
                    | 'A'..='Z'   => return Ok(self.consume_ident()),
                _ => match Symbol::parse(next_char) {
                    Some(symbol) => {
                        self.source.next_char();
                        return Ok(self.make_token(T::Symbol(symbol)));
                    }
                    None => {
                        self.source.next_char();
                        return Err(LexError::UnknownCharacter {
                            character: next_char,
                            span: self.make_span(),
                        });
                    }
                },
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.offset();
    }

    /// Span from the start of the current token up to the cursor.
    fn make_span(&mut self) -> Span {
        let end = self.source.offset();
        debug_assert!(end >= self.token_start);
        Span::new(self.token_start as u32, (end - self.token_start) as u32)
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        Token {
            span: self.make_span(),
            kind,
        }
    }

    fn fragment(&mut self) -> &'a str {
        let original = self.source.original;
        self.make_span().fragment(original)
    }

    fn consume_whitespace(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if is_whitespace(c) {
                self.source.next_char();
            } else {
                break;
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn consume_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a block comment up to and including the first `*/`.
    ///
    /// Block comments don't nest.
    fn consume_block_comment(&mut self) -> Result<(), LexError> {
        // Opening `/*`
        self.source.next_char();
        self.source.next_char();

        loop {
            match self.source.next_char() {
                Some('*') => {
                    if self.source.peek_char() == Some('/') {
                        self.source.next_char();
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment(self.make_span())),
            }
        }
    }

    fn consume_string(&mut self) -> Result<Token, LexError> {
        // Opening quote
        self.source.next_char();

        loop {
            match self.source.peek_char() {
                Some('"') => {
                    self.source.next_char();
                    return Ok(self.make_token(TokenKind::String));
                }
                Some('\n') | Some('\r') | None => {
                    return Err(LexError::UnterminatedString(self.make_span()));
                }
                Some(_) => {
                    self.source.next_char();
                }
            }
        }
    }

    fn consume_number(&mut self) -> Result<Token, LexError> {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        // Identifiers can't start with a digit, so `12abc` is
        // rejected as a whole instead of being split in two.
        if matches!(self.source.peek_char(), Some(c) if is_letter(c)) {
            while matches!(self.source.peek_char(), Some(c) if is_letter_or_digit(c)) {
                self.source.next_char();
            }
            return Err(LexError::MalformedNumber(self.make_span()));
        }

        let in_range = self
            .fragment()
            .parse::<u16>()
            .map(|value| value <= MAX_INTEGER)
            .unwrap_or(false);

        if in_range {
            Ok(self.make_token(TokenKind::Integer))
        } else {
            Err(LexError::IntegerOverflow(self.make_span()))
        }
    }

    fn consume_ident(&mut self) -> Token {
        while matches!(self.source.peek_char(), Some(c) if is_letter_or_digit(c)) {
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };
        self.make_token(token_kind)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000C}' // form feed
            | '\u{000D}' // carriage return
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields every token up to and including [`TokenKind::EOS`], or up
/// to and including the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        match result {
            Ok(Token {
                kind: TokenKind::EOS,
                ..
            })
            | Err(_) => self.done = true,
            _ => {}
        }
        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    /// Keep reference to the source so the lexer can
    /// slice fragments from it.
    original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// `MultiPeek` advances its peek cursor on every peek, so each
    /// lookahead helper here resets it before and after to stay idempotent.
    chars: MultiPeek<CharIndices<'a>>,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
        }
    }

    /// Advance the cursor and return the consumed character.
    fn next_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    /// Peeks the next unconsumed character.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        let c = self.chars.peek().map(|(_, c)| *c);
        self.chars.reset_peek();
        c
    }

    /// Two character lookahead.
    fn peek_char2(&mut self) -> (Option<char>, Option<char>) {
        self.chars.reset_peek();
        let pair = (
            self.chars.peek().map(|(_, c)| *c),
            self.chars.peek().map(|(_, c)| *c),
        );
        self.chars.reset_peek();
        pair
    }

    /// Byte offset of the next unconsumed character.
    fn offset(&mut self) -> usize {
        self.chars.reset_peek();
        let offset = self
            .chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.original.len());
        self.chars.reset_peek();
        offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Character that can't start any token.
    UnknownCharacter { character: char, span: Span },
    /// String constant missing its closing quote on the same line.
    UnterminatedString(Span),
    /// Block comment missing its closing `*/`.
    UnterminatedComment(Span),
    /// Integer constant larger than [`MAX_INTEGER`].
    IntegerOverflow(Span),
    /// Digits immediately followed by letters.
    MalformedNumber(Span),
}

impl LexError {
    pub fn span(&self) -> &Span {
        match self {
            Self::UnknownCharacter { span, .. } => span,
            Self::UnterminatedString(span)
            | Self::UnterminatedComment(span)
            | Self::IntegerOverflow(span)
            | Self::MalformedNumber(span) => span,
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownCharacter { character, .. } => {
                write!(f, "unknown character {character:?}")
            }
            Self::UnterminatedString(_) => write!(f, "unterminated string constant"),
            Self::UnterminatedComment(_) => write!(f, "unterminated block comment"),
            Self::IntegerOverflow(_) => {
                write!(f, "integer constant exceeds maximum of {MAX_INTEGER}")
            }
            Self::MalformedNumber(_) => write!(f, "malformed integer constant"),
        }
    }
}
