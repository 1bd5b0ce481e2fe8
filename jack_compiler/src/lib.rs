pub mod compile;
pub mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;
pub mod xml;

pub use compile::IR;
pub use error::{JackError, JackResult};

use log::debug;
use parsing::{CompilationUnit, Parse};
use std::io;

/// Lex and parse one unit into its syntax tree.
pub fn parse_str(unit: &str, source: &str) -> JackResult<CompilationUnit> {
    // Lexical analysis
    debug!("{unit}: lexing");
    let tokens = lex::tokenize(source).map_err(|err| JackError::new(unit, source, err))?;

    // Syntactic analysis
    debug!("{unit}: parsing {} tokens", tokens.len());
    let mut stream = token_stream::TokenStream::new(source, tokens);
    let tree = CompilationUnit::parse(&mut stream).map_err(|err| JackError::new(unit, source, err))?;

    Ok(tree)
}

/// Compile the source of one unit into VM instructions.
///
/// The unit name only identifies the source in errors. Function
/// names are qualified by the class declared in the source.
pub fn compile_str(unit: &str, source: &str) -> JackResult<Vec<IR>> {
    let tree = parse_str(unit, source)?;

    // Code generation
    let code = compile::CodeGen::new()
        .compile(&tree)
        .map_err(|err| JackError::new(unit, source, err))?;

    Ok(code)
}

/// Render instructions as VM text, one instruction per line.
pub fn render(code: &[IR]) -> String {
    let mut buf = String::new();
    for ir in code {
        buf.push_str(&ir.to_string());
        buf.push('\n');
    }
    buf
}

/// Write instructions as VM text, one instruction per line.
pub fn write_vm(code: &[IR], mut writer: impl io::Write) -> io::Result<()> {
    for ir in code {
        writeln!(writer, "{ir}")?;
    }
    writer.flush()
}
