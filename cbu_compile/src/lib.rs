pub mod environment;
pub mod error;
pub mod eval;
pub mod interpret;
pub mod registry;
pub mod stdlib;
pub mod types;

use std::io::Write;

use cbu_syntax::{lex::Lexer, token::Token};
use error::Error;
use interpret::Interpreter;
use log::trace;

/// Lexes and runs `source`, writing program output to `out`. Returns
/// the diagnostics collected along the way.
pub fn run(source: &str, out: &mut dyn Write) -> Vec<Error> {
    trace!("Lexing {source}");
    let tokens = Lexer::new(source).lex_all();
    run_tokens(tokens, out)
}

pub fn run_tokens(tokens: Vec<Token>, out: &mut dyn Write) -> Vec<Error> {
    trace!("Interpreting {tokens:#?}");
    let mut interpreter = Interpreter::new(tokens, out);
    interpreter.run();
    let (_, diagnostics) = interpreter.into_parts();
    diagnostics
}

/// The closing line of a run: a success message, or the number of
/// diagnostics that follow it.
pub fn summary(diagnostics: &[Error]) -> String {
    if diagnostics.is_empty() {
        "Program is valid.".to_string()
    } else {
        format!("Found {} error(s) in program:", diagnostics.len())
    }
}

/// One line of the `--tokens` listing.
pub fn token_line(token: &Token) -> String {
    format!(
        "Token: {:?}\tLexeme: {} [line {}, column {}]",
        token.kind, token.lexeme, token.line, token.column
    )
}
