use std::{fmt::Display, ops::Range};

use cbu_syntax::token::TokenKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Decimal(f64),
    Text(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(n) => f.write_str(&decimal_repr(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Debug formatting keeps the decimal point on whole values, but not
/// on the mantissa of exponent forms such as `1e16`.
fn decimal_repr(n: f64) -> String {
    let repr = format!("{n:?}");
    match repr.split_once('e') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0e{exp}"),
        _ => repr,
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Decimal(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// The declared type of a variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarType {
    Int,
    Decimal,
    Text,
}

impl VarType {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let ty = match kind {
            TokenKind::INT => Self::Int,
            TokenKind::DECIMAL => Self::Decimal,
            TokenKind::TEXT => Self::Text,
            _ => return None,
        };
        Some(ty)
    }

    /// Converts `value` into the form stored for a variable of this
    /// type, or returns `None` if the two are incompatible. Whole
    /// decimals narrow into integers.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (Self::Int, Value::Int(n)) => Some(Value::Int(n)),
            (Self::Int, Value::Decimal(n)) if n.fract() == 0.0 => Some(Value::Int(n.trunc() as i64)),
            (Self::Decimal, v @ (Value::Int(_) | Value::Decimal(_))) => Some(v),
            (Self::Text, v @ Value::Text(_)) => Some(v),
            _ => None,
        }
    }
}

/// A user function found by the registry pass. The body is a range of
/// indices into the token buffer it was discovered in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Func {
    pub name: String,
    pub params: Vec<String>,
    pub body: Range<usize>,
}

impl Display for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fonksiyon {}({})", self.name, self.params.join(", "))
    }
}

impl Func {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
