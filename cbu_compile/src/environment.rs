use std::collections::HashMap;

use log::debug;

use crate::types::{Func, Value, VarType};

/// The tables owned by one interpreter instance. A function call clones
/// the caller's `Env` into the callee and merges the callee's values
/// back afterwards; there is no parent chain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Env {
    types: HashMap<String, VarType>,
    values: HashMap<String, Value>,
    functions: HashMap<String, Func>,
}

impl Env {
    /// Records the declared type of `name`. Returns `false` and leaves
    /// the existing entry alone if `name` was already declared.
    pub fn declare(&mut self, name: &str, ty: VarType) -> bool {
        if self.types.contains_key(name) {
            return false;
        }
        debug!("Declare {name}: {ty:?}");
        self.types.insert(name.to_string(), ty);
        true
    }

    pub fn type_of(&self, name: &str) -> Option<VarType> {
        self.types.get(name).copied()
    }

    /// Unset variables read as integer zero.
    pub fn get(&self, name: &str) -> Value {
        debug!("Get {name}");
        self.values.get(name).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        debug!("Set {name} -> {value:?}");
        self.values.insert(name.to_string(), value);
    }

    pub fn define_func(&mut self, func: Func) {
        debug!("Register {func}");
        self.functions.insert(func.name.clone(), func);
    }

    pub fn func(&self, name: &str) -> Option<&Func> {
        self.functions.get(name)
    }

    /// Copies every value of a finished callee into this env, overwriting
    /// same-named entries. Types and functions stay as they are.
    pub fn merge(&mut self, callee: Env) {
        debug!("Merge {} values from callee", callee.values.len());
        self.values.extend(callee.values);
    }
}
