pub mod lex;
pub mod token;
