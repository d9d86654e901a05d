use std::rc::Rc;

use cbu_syntax::token::TokenKind;
use log::debug;

use crate::{
    error::{make, ErrorMsg},
    interpret::Interpreter,
    stdlib::Builtin,
    types::{Func, Value},
};

impl Interpreter<'_> {
    /// `cond (('&&' | '||') cond)*`, folded left to right. Both sides are
    /// always evaluated.
    pub(crate) fn eval_logical(&mut self) -> bool {
        let mut result = self.eval_cond();
        while let Some(op) = self
            .peek_kind()
            .filter(|k| matches!(k, TokenKind::AND | TokenKind::OR))
        {
            self.advance();
            let rhs = self.eval_cond();
            result = match op {
                TokenKind::AND => result && rhs,
                _ => result || rhs,
            };
        }
        result
    }

    /// `expr op expr`. Whatever token follows the left operand is taken
    /// as the operator; anything but a numeric comparison is false.
    fn eval_cond(&mut self) -> bool {
        let lhs = self.eval_expr();
        let Some(op) = self.peek_kind() else {
            self.error(ErrorMsg::ExpectedCondition, "end of input");
            return false;
        };
        self.advance();
        let rhs = self.eval_expr();

        let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
            return false;
        };
        match op {
            TokenKind::EQUAL_EQUAL => a == b,
            TokenKind::BANG_EQUAL => a != b,
            TokenKind::LESS => a < b,
            TokenKind::LESS_EQUAL => a <= b,
            TokenKind::GREATER => a > b,
            TokenKind::GREATER_EQUAL => a >= b,
            _ => false,
        }
    }

    /// Arithmetic has no precedence: the whole rest of the expression
    /// after an operator is the right operand, so `10 - 3 + 2` is
    /// `10 - (3 + 2)`.
    pub(crate) fn eval_expr(&mut self) -> Value {
        let Some(mut value) = self.eval_primary() else {
            return Value::Int(0);
        };
        while let Some(op) = self.peek_kind().filter(|k| k.is_arithmetic()) {
            self.advance();
            let rhs = self.eval_expr();
            value = arithmetic(op, &value, &rhs);
        }
        value
    }

    fn eval_primary(&mut self) -> Option<Value> {
        let Some((kind, lexeme)) = self.peek().map(|t| (t.kind, t.lexeme.clone())) else {
            self.error(ErrorMsg::ExpectedExpr, "end of input");
            return None;
        };
        let value = match kind {
            TokenKind::LPAREN => {
                self.advance();
                let value = self.eval_expr();
                self.expect(TokenKind::RPAREN);
                value
            }
            TokenKind::NUMBER => {
                self.advance();
                self.parse_number(&lexeme)
            }
            TokenKind::STRING => {
                self.advance();
                Value::Text(lexeme)
            }
            TokenKind::IDENT if self.peek_next_kind() == Some(TokenKind::LPAREN) => {
                self.eval_call()
            }
            TokenKind::IDENT => {
                self.advance();
                self.env.get(&lexeme)
            }
            _ => {
                let found = self.found();
                self.error(ErrorMsg::ExpectedExpr, found);
                return None;
            }
        };
        Some(value)
    }

    fn parse_number(&mut self, lexeme: &str) -> Value {
        if lexeme.contains('.') {
            match lexeme.parse() {
                Ok(n) => Value::Decimal(n),
                Err(_) => {
                    self.error(ErrorMsg::InvalidDecimal, lexeme);
                    Value::Int(0)
                }
            }
        } else {
            match lexeme.parse() {
                Ok(n) => Value::Int(n),
                Err(_) => {
                    self.error(ErrorMsg::InvalidInteger, lexeme);
                    Value::Int(0)
                }
            }
        }
    }

    /// `name(args)`. User functions shadow built-ins of the same name.
    fn eval_call(&mut self) -> Value {
        let name = self.advance().map(|t| t.lexeme.clone()).unwrap_or_default();
        self.expect(TokenKind::LPAREN);
        match self.env.func(&name).cloned() {
            Some(func) => self.call_func(func),
            None => self.call_builtin(&name),
        }
    }

    fn call_builtin(&mut self, name: &str) -> Value {
        let arg = (!self.check(TokenKind::RPAREN)).then(|| self.eval_expr());
        self.expect(TokenKind::RPAREN);
        let Some(builtin) = Builtin::from_name(name) else {
            self.diagnostics.push(make(ErrorMsg::UnknownFunction, name));
            return Value::Int(0);
        };
        match builtin.call(arg) {
            Ok(value) => value,
            Err((error, value)) => {
                self.diagnostics.push(error);
                value
            }
        }
    }

    /// Runs `func` in a fresh interpreter seeded with copies of this
    /// interpreter's tables. Every value the callee ends up with is
    /// merged back, parameters and non-parameters alike.
    fn call_func(&mut self, func: Func) -> Value {
        let mut args = vec![];
        if !self.check(TokenKind::RPAREN) {
            loop {
                args.push(self.eval_expr());
                if self.advance_if(TokenKind::COMMA).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RPAREN);

        if func.arity() != args.len() {
            self.diagnostics
                .push(make(ErrorMsg::InvalidCall, &func.name));
            return Value::Int(0);
        }

        let mut env = self.env.clone();
        for (param, arg) in func.params.iter().zip(args) {
            env.set(param, arg);
        }
        debug!("Call {func}");
        let mut callee = Interpreter::with_env(
            Rc::clone(&self.tokens),
            func.body.clone(),
            env,
            &mut *self.out,
        );
        let result = callee.run();
        let (env, diagnostics) = callee.into_parts();
        self.env.merge(env);
        self.diagnostics.extend(diagnostics);
        debug!("{} returned {result:?}", func.name);
        result.unwrap_or_default()
    }
}

/// Combines two numeric operands in floating point. Division and
/// modulo by zero give zero and always produce decimals; any other
/// whole result becomes an integer. Non-numeric operands give zero.
fn arithmetic(op: TokenKind, lhs: &Value, rhs: &Value) -> Value {
    let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
        return Value::Int(0);
    };
    let result = match op {
        TokenKind::PLUS => a + b,
        TokenKind::MINUS => a - b,
        TokenKind::STAR => a * b,
        TokenKind::SLASH | TokenKind::MODULO if b == 0.0 => 0.0,
        TokenKind::SLASH => a / b,
        TokenKind::MODULO => a % b,
        _ => return Value::Int(0),
    };
    match op {
        TokenKind::SLASH | TokenKind::MODULO => Value::Decimal(result),
        _ if result.fract() == 0.0 => Value::Int(result as i64),
        _ => Value::Decimal(result),
    }
}
