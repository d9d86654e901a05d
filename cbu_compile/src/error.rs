use std::fmt::Display;

use crate::types::Value;

/// A diagnostic recorded during interpretation. Diagnostics never
/// abort a run; they are reported once the program has finished.
pub type Error = String;

/// Non-local control transfer raised by `dön`. It unwinds statement
/// execution up to the nearest function call, or ends the run.
#[derive(Debug, PartialEq)]
pub enum Exception {
    Return(Value),
}

#[derive(Debug)]
pub enum ErrorMsg {
    // Statement errors
    Expected,
    UnexpectedStatement,
    InvalidIdent,
    AlreadyDeclared,
    UndeclaredVar,
    TypeMismatch,
    InfiniteLoop,
    // Expression errors
    ExpectedExpr,
    ExpectedCondition,
    InvalidInteger,
    InvalidDecimal,
    // Call errors
    InvalidCall,
    UnknownFunction,
    UnreadableFile,
}

impl Display for ErrorMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Expected => "expected",
            Self::UnexpectedStatement => "unexpected statement:",
            Self::InvalidIdent => "expected a valid variable name, found",
            Self::AlreadyDeclared => "variable already declared:",
            Self::UndeclaredVar => "undeclared variable:",
            Self::TypeMismatch => "type mismatch:",
            Self::InfiniteLoop => "suspected infinite loop: repeated",
            Self::ExpectedExpr => "expected expression, found",
            Self::ExpectedCondition => "expected condition, found",
            Self::InvalidInteger => "invalid integer:",
            Self::InvalidDecimal => "invalid decimal:",
            Self::InvalidCall => "unknown function or wrong number of arguments:",
            Self::UnknownFunction => "unknown function:",
            Self::UnreadableFile => "could not read file:",
        })
    }
}

pub fn make(msg: ErrorMsg, ctx: impl Display) -> Error {
    format!("{} {}", msg, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(make(ErrorMsg::UndeclaredVar, "x"), "undeclared variable: x");
        assert_eq!(
            make(ErrorMsg::InfiniteLoop, "100 times"),
            "suspected infinite loop: repeated 100 times"
        );
    }
}
