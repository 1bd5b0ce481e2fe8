//! Tokens
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { span, kind }
    }

    /// Text of the token as it appears in the source.
    #[inline]
    pub fn fragment<'a>(&self, source: &'a str) -> &'a str {
        self.span.fragment(source)
    }

    /// Lexical value of the token.
    ///
    /// Same as the fragment, except string constants have
    /// their surrounding quotes removed.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        let fragment = self.fragment(source);
        match self.kind {
            TokenKind::String => fragment
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(fragment),
            _ => fragment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    /// Identifier in the set of reserved words.
    Keyword(Keyword),
    /// Single character punctuation or operator.
    Symbol(Symbol),

    // ------------------------------------------------------------------------
    // Complex
    /// Decimal integer literal in the range `0..=32767`
    Integer,
    /// String literal, span includes the quotes
    String,
    Ident,

    // ------------------------------------------------------------------------
    // Special
    /// End-of-source
    EOS,
}

impl TokenKind {
    /// Tag used when the token is rendered as XML.
    pub fn xml_tag(&self) -> &'static str {
        match self {
            Self::Keyword(_) => "keyword",
            Self::Symbol(_) => "symbol",
            Self::Integer => "integerConstant",
            Self::String => "stringConstant",
            Self::Ident => "identifier",
            Self::EOS => "eos",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Self::Symbol(symbol) => write!(f, "symbol '{symbol}'"),
            Self::Integer => write!(f, "integer constant"),
            Self::String => write!(f, "string constant"),
            Self::Ident => write!(f, "identifier"),
            Self::EOS => write!(f, "end of source"),
        }
    }
}

impl From<Keyword> for TokenKind {
    fn from(keyword: Keyword) -> Self {
        Self::Keyword(keyword)
    }
}

impl From<Symbol> for TokenKind {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Declarations
    Class,       // class
    Constructor, // constructor
    Function,    // function
    Method,      // method
    Field,       // field
    Static,      // static
    Var,         // var

    // ------------------------------------------------------------------------
    // Types
    Int,         // int
    Char,        // char
    Boolean,     // boolean
    Void,        // void

    // ------------------------------------------------------------------------
    // Constants
    True,        // true
    False,       // false
    Null,        // null
    This,        // this

    // ------------------------------------------------------------------------
    // Statements
    Let,         // let
    Do,          // do
    If,          // if
    Else,        // else
    While,       // while
    Return,      // return
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            // ----------------------------------------------------------------
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            // ----------------------------------------------------------------
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            // ----------------------------------------------------------------
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Punctuation and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Symbol {
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Amp,          // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~
}

impl Symbol {
    #[rustfmt::skip]
    pub fn parse(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::LeftBrace),
            '}' => Some(Self::RightBrace),
            '(' => Some(Self::LeftParen),
            ')' => Some(Self::RightParen),
            '[' => Some(Self::LeftBracket),
            ']' => Some(Self::RightBracket),
            '.' => Some(Self::Dot),
            ',' => Some(Self::Comma),
            ';' => Some(Self::Semicolon),
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Star),
            '/' => Some(Self::Slash),
            '&' => Some(Self::Amp),
            '|' => Some(Self::Pipe),
            '<' => Some(Self::Less),
            '>' => Some(Self::Greater),
            '=' => Some(Self::Eq),
            '~' => Some(Self::Tilde),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_char(&self) -> char {
        match self {
            Self::LeftBrace    => '{',
            Self::RightBrace   => '}',
            Self::LeftParen    => '(',
            Self::RightParen   => ')',
            Self::LeftBracket  => '[',
            Self::RightBracket => ']',
            Self::Dot          => '.',
            Self::Comma        => ',',
            Self::Semicolon    => ';',
            Self::Plus         => '+',
            Self::Minus        => '-',
            Self::Star         => '*',
            Self::Slash        => '/',
            Self::Amp          => '&',
            Self::Pipe         => '|',
            Self::Less         => '<',
            Self::Greater      => '>',
            Self::Eq           => '=',
            Self::Tilde        => '~',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// One-based line and column of the start of the span.
    ///
    /// Columns count characters, not bytes.
    pub fn line_column(&self, text: &str) -> (usize, usize) {
        let index = (self.index as usize).min(text.len());
        let before = &text[..index];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        const NEWLINE: char = '\n';
        const RETURN: char = '\r';

        let mut chars = text.char_indices().peekable();
        let mut start = 0;
        let mut end = text.len();

        while let Some((i, c)) = chars.next() {
            if i < self.index as usize {
                if c == NEWLINE {
                    // Span not found yet, move the starting cursor to the next line.

                    if chars.peek().map(|(_, c)| *c) == Some(RETURN) {
                        chars.next();
                    }

                    // Line starts at the character after the newline (\n) and carriage return (\r)
                    start = chars.peek().map(|(i, _)| *i).unwrap_or(text.len());
                }
            } else if c == NEWLINE {
                // End the line when we encounter a newline after the start of the token.
                // Newline tokens (and on Windows the carriage return character)
                // will now be included in the line span.
                end = i + 1;

                if chars.peek().map(|(_, c)| *c) == Some(RETURN) {
                    chars.next();
                    end += 1;
                }

                break;
            }
        }

        let line_span = Span {
            index: start as u32,
            size: end as u32 - start as u32,
        };

        (&text[start..end], line_span)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "let x = 12;";

        let spans = &[
            Span::new(0, 3),  // let
            Span::new(4, 1),  // x
            Span::new(6, 1),  // =
            Span::new(8, 2),  // 12
            Span::new(10, 1), // ;
        ];

        assert_eq!(spans[0].fragment(CODE), "let");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "12");
        assert_eq!(spans[4].fragment(CODE), ";");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "------------\n....here....\n------------";

        let span = Span::new(17, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....\n");
        assert_eq!(line_span, Span { index: 13, size: 13 });
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "....here....";

        let span = Span::new(4, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "....here....");
        assert_eq!(line_span, Span { index: 0, size: 12 });
    }

    #[test]
    fn test_span_line_column() {
        const CODE: &str = "class Main {\n  field int x;\n}";

        assert_eq!(Span::new(0, 5).line_column(CODE), (1, 1));
        assert_eq!(Span::new(6, 4).line_column(CODE), (1, 7));
        // `int` on the second line
        assert_eq!(Span::new(21, 3).line_column(CODE), (2, 9));
        assert_eq!(Span::new(28, 1).line_column(CODE), (3, 1));
    }

    #[test]
    fn test_keyword_round_trip() {
        for text in ["class", "method", "boolean", "null", "while", "return"] {
            let keyword = Keyword::parse(text).unwrap();
            assert_eq!(keyword.as_str(), text);
        }
        assert_eq!(Keyword::parse("Class"), None);
        assert_eq!(Keyword::parse("classy"), None);
    }

    #[test]
    fn test_string_text_strips_quotes() {
        const CODE: &str = "\"hi there\"";
        let token = Token::new(TokenKind::String, Span::new(0, 10));
        assert_eq!(token.fragment(CODE), "\"hi there\"");
        assert_eq!(token.text(CODE), "hi there");
    }
}
