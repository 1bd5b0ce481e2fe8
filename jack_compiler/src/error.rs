//! Result and errors.
use crate::{compile::CompileError, lex::LexError, parsing::ParseError, tokens::Span};
use std::fmt::{self, Display, Formatter};

pub type JackResult<T> = std::result::Result<T, JackError>;

/// Failure to compile one unit, located in its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JackError {
    /// Name of the unit, usually its file name.
    pub unit: String,
    pub kind: ErrorKind,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Lex(LexError),
    Parse(ParseError),
    Compile(CompileError),
}

/// Position of an error within its unit's source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// One-based line number.
    pub line: usize,
    /// One-based column number.
    pub column: usize,
    /// Text of the offending line, without its line ending.
    pub source_line: String,
    /// Number of characters the caret underline spans.
    pub width: usize,
}

impl JackError {
    pub fn new(unit: impl ToString, source: &str, kind: impl Into<ErrorKind>) -> Self {
        let kind = kind.into();
        let location = Location::from_span(kind.span(), source);
        Self {
            unit: unit.to_string(),
            kind,
            location: Some(location),
        }
    }

    /// Error without source information.
    pub fn bare(unit: impl ToString, kind: impl Into<ErrorKind>) -> Self {
        Self {
            unit: unit.to_string(),
            kind: kind.into(),
            location: None,
        }
    }
}

impl ErrorKind {
    pub fn span(&self) -> &Span {
        match self {
            Self::Lex(err) => err.span(),
            Self::Parse(err) => err.span(),
            Self::Compile(err) => err.span(),
        }
    }
}

impl Location {
    pub fn from_span(span: &Span, source: &str) -> Self {
        let (line, column) = span.line_column(source);
        let (text, _) = span.surrounding_line(source);
        let source_line = text.trim_end_matches(&['\n', '\r'][..]).to_string();

        // Underline at least one character, and never past the end of the line.
        let remaining = source_line.chars().count().saturating_sub(column - 1);
        let width = span.fragment(source).chars().count().clamp(1, remaining.max(1));

        Self {
            line,
            column,
            source_line,
            width,
        }
    }
}

impl std::error::Error for JackError {}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => {
                writeln!(f, "{}:{}:{}: {}", self.unit, location.line, location.column, self.kind)?;
                writeln!(f, "  {}", location.source_line)?;
                write!(
                    f,
                    "  {}{}",
                    " ".repeat(location.column - 1),
                    "^".repeat(location.width)
                )
            }
            None => write!(f, "{}: {}", self.unit, self.kind),
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lexical error: {err}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Compile(err) => write!(f, "compile error: {err}"),
        }
    }
}

impl From<LexError> for ErrorKind {
    fn from(err: LexError) -> Self {
        ErrorKind::Lex(err)
    }
}

impl From<ParseError> for ErrorKind {
    fn from(err: ParseError) -> Self {
        ErrorKind::Parse(err)
    }
}

impl From<CompileError> for ErrorKind {
    fn from(err: CompileError) -> Self {
        ErrorKind::Compile(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_caret() {
        const SOURCE: &str = "class Main {\n  let x = @;\n}\n";
        let err = LexError::UnknownCharacter {
            character: '@',
            span: Span::new(23, 1),
        };
        let err = JackError::new("Main.jack", SOURCE, err);

        let location = err.location.as_ref().unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 11);
        assert_eq!(location.source_line, "  let x = @;");
        let expected = format!(
            "Main.jack:2:11: lexical error: unknown character '@'\n    let x = @;\n{}^",
            " ".repeat(12)
        );
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_render_at_end_of_source() {
        const SOURCE: &str = "class Main {";
        let err = LexError::UnterminatedComment(Span::new(12, 0));
        let err = JackError::new("Main.jack", SOURCE, err);
        let location = err.location.as_ref().unwrap();
        assert_eq!(location.line, 1);
        assert_eq!(location.column, 13);
        assert_eq!(location.width, 1);
    }
}
