use std::fs;

use chrono::Local;
use log::debug;

use crate::{
    error::{make, Error, ErrorMsg},
    types::Value,
};

/// Functions available to every program without a definition. A user
/// function with the same name takes precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `uzunluk(kelime)`: number of characters in a text
    Length,
    /// `karesi(sayı)`: square of a number, always a decimal
    Square,
    /// `tarih()`: today's date as `YYYY-MM-DD`
    Date,
    /// `oku(yol)`: contents of a file as text
    ReadFile,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "uzunluk" => Self::Length,
            "karesi" => Self::Square,
            "tarih" => Self::Date,
            "oku" => Self::ReadFile,
            _ => return None,
        };
        Some(builtin)
    }

    /// Applies the built-in to its optional argument. Arguments of the
    /// wrong kind are not errors and produce a neutral value. A file that
    /// cannot be read yields the diagnostic together with empty text.
    pub fn call(self, arg: Option<Value>) -> Result<Value, (Error, Value)> {
        debug!("Call builtin {self:?} with {arg:?}");
        Ok(match (self, arg) {
            (Self::Length, Some(Value::Text(s))) => Value::Int(s.chars().count() as i64),
            (Self::Length, _) => Value::Int(0),
            (Self::Square, arg) => match arg.as_ref().and_then(Value::as_number) {
                Some(n) => Value::Decimal(n.powi(2)),
                None => Value::Int(0),
            },
            (Self::Date, _) => Value::Text(today()),
            (Self::ReadFile, Some(Value::Text(path))) => match fs::read_to_string(&path) {
                Ok(contents) => Value::Text(contents),
                Err(e) => {
                    debug!("Reading {path} failed: {e}");
                    return Err((
                        make(ErrorMsg::UnreadableFile, path),
                        Value::Text(String::default()),
                    ));
                }
            },
            (Self::ReadFile, _) => Value::Text(String::default()),
        })
    }
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
