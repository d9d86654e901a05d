use std::{fmt::Display, io::Write, ops::Range, rc::Rc};

use cbu_syntax::token::{Token, TokenKind};
use log::{debug, trace, warn};

use crate::{
    environment::Env,
    error::{make, Error, ErrorMsg, Exception},
    registry,
    types::{Value, VarType},
};

/// Number of times a loop body may run before the loop is abandoned.
pub const MAX_LOOP_COUNT: usize = 100;

/// Parses and executes statements straight off the token buffer. There
/// is no syntax tree: loop bodies and function bodies are executed by
/// moving the cursor back over their tokens, so every iteration and
/// every call re-reads them from scratch.
pub struct Interpreter<'a> {
    pub(crate) tokens: Rc<[Token]>,
    pub(crate) span: Range<usize>,
    pub(crate) pos: usize,
    pub env: Env,
    pub(crate) diagnostics: Vec<Error>,
    pub(crate) out: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(tokens: Vec<Token>, out: &'a mut dyn Write) -> Self {
        let tokens: Rc<[Token]> = tokens.into();
        let span = 0..tokens.len();
        Self::with_env(tokens, span, Env::default(), out)
    }

    /// An interpreter over `span` of a shared token buffer, starting
    /// with the given tables. Used for function calls.
    pub(crate) fn with_env(
        tokens: Rc<[Token]>,
        span: Range<usize>,
        env: Env,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            pos: span.start,
            tokens,
            span,
            env,
            diagnostics: Vec::default(),
            out,
        }
    }

    pub fn diagnostics(&self) -> &[Error] {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (Env, Vec<Error>) {
        (self.env, self.diagnostics)
    }

    /// Registers the functions defined in the span, then executes it
    /// from the start. Returns the value of a `dön` that reached this
    /// level, which also ends the run early.
    pub fn run(&mut self) -> Option<Value> {
        for func in registry::register(&self.tokens, self.span.clone()) {
            self.env.define_func(func);
        }
        self.pos = self.span.start;
        trace!("Executing tokens {:?}", self.span);
        match self.exec_while(|i| !i.is_at_end()) {
            Ok(()) => None,
            Err(Exception::Return(value)) => {
                debug!("Run ended by return of {value}");
                Some(value)
            }
        }
    }

    /// Executes statements while `cond` holds. A statement that leaves
    /// the cursor where it was is stepped over by one token.
    fn exec_while<F>(&mut self, cond: F) -> Result<(), Exception>
    where
        F: Fn(&Self) -> bool,
    {
        while cond(self) {
            let before = self.pos;
            self.exec_stmt()?;
            if self.pos == before {
                self.pos += 1;
            }
        }
        Ok(())
    }

    pub(crate) fn exec_stmt(&mut self) -> Result<(), Exception> {
        let Some(kind) = self.peek_kind() else {
            return Ok(());
        };
        if let Some(ty) = VarType::from_token(kind) {
            self.exec_declaration(ty);
            return Ok(());
        }
        match kind {
            TokenKind::FN => self.skip_function(),
            TokenKind::IDENT => self.exec_assignment(),
            TokenKind::PRINT => self.exec_print(),
            TokenKind::IF | TokenKind::THEN => return self.exec_if(),
            TokenKind::LOOP => return self.exec_loop(),
            TokenKind::RETURN => return self.exec_return(),
            _ => {
                let lexeme = self.peek().map(|t| t.lexeme.clone()).unwrap_or_default();
                self.error(ErrorMsg::UnexpectedStatement, lexeme);
            }
        }
        Ok(())
    }

    fn exec_declaration(&mut self, ty: VarType) {
        // Consume the type keyword
        self.advance();
        let Some(name) = self.advance_if(TokenKind::IDENT).map(|t| t.lexeme.clone()) else {
            let found = self.found();
            self.error(ErrorMsg::InvalidIdent, found);
            return;
        };
        if !self.env.declare(&name, ty) {
            self.diagnostics.push(make(ErrorMsg::AlreadyDeclared, &name));
        }
        self.expect(TokenKind::EQUAL);
        let value = self.eval_expr();
        // Checked against the type written here, even on a re-declaration
        self.store(&name, ty, value);
        self.expect(TokenKind::SEMICOLON);
    }

    fn exec_assignment(&mut self) {
        let name = self.peek().map(|t| t.lexeme.clone()).unwrap_or_default();
        let Some(ty) = self.env.type_of(&name) else {
            self.diagnostics.push(make(ErrorMsg::UndeclaredVar, &name));
            self.expect(TokenKind::IDENT);
            self.expect(TokenKind::EQUAL);
            self.eval_expr();
            self.expect(TokenKind::SEMICOLON);
            return;
        };
        self.expect(TokenKind::IDENT);
        self.expect(TokenKind::EQUAL);
        let value = self.eval_expr();
        self.store(&name, ty, value);
        self.expect(TokenKind::SEMICOLON);
    }

    fn store(&mut self, name: &str, ty: VarType, value: Value) {
        match ty.coerce(value) {
            Some(value) => self.env.set(name, value),
            None => self.diagnostics.push(make(ErrorMsg::TypeMismatch, name)),
        }
    }

    fn exec_print(&mut self) {
        self.expect(TokenKind::PRINT);
        self.expect(TokenKind::LPAREN);
        let value = self.eval_expr();
        if let Err(e) = writeln!(self.out, "{value}") {
            warn!("Failed to write output: {e}");
        }
        self.expect(TokenKind::RPAREN);
        self.expect(TokenKind::SEMICOLON);
    }

    /// `eğer (koşul) ise { ... }`. There is no else branch. A false
    /// condition skips to the first closing brace without counting
    /// nested blocks.
    fn exec_if(&mut self) -> Result<(), Exception> {
        self.expect(TokenKind::IF);
        self.expect(TokenKind::LPAREN);
        let condition = self.eval_logical();
        self.expect(TokenKind::RPAREN);
        self.expect(TokenKind::THEN);
        self.expect(TokenKind::LBRACE);

        if condition {
            self.exec_while(|i| !i.check(TokenKind::RBRACE) && !i.is_at_end())?;
        } else {
            while !self.check(TokenKind::RBRACE) && !self.is_at_end() {
                self.advance();
            }
        }
        self.expect(TokenKind::RBRACE);
        Ok(())
    }

    /// `döngü (koşul) { ... }`. The condition and body spans are located
    /// once, then replayed until the condition fails or the iteration
    /// limit is hit.
    fn exec_loop(&mut self) -> Result<(), Exception> {
        self.expect(TokenKind::LOOP);
        self.expect(TokenKind::LPAREN);

        let cond_start = self.pos;
        let mut depth = 1;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::LPAREN => depth += 1,
                TokenKind::RPAREN => depth -= 1,
                _ => (),
            }
            if depth == 0 {
                break;
            }
            self.advance();
        }
        self.expect(TokenKind::RPAREN);
        self.expect(TokenKind::LBRACE);

        let body_start = self.pos;
        depth = 1;
        while depth > 0 {
            let Some(kind) = self.peek_kind() else {
                break;
            };
            match kind {
                TokenKind::LBRACE => depth += 1,
                TokenKind::RBRACE => depth -= 1,
                _ => (),
            }
            self.advance();
        }
        let body_end = self.pos.saturating_sub(1).max(body_start);
        let after_loop = self.pos;
        debug!("Loop condition at {cond_start}, body {body_start}..{body_end}");

        let mut iterations = 0;
        loop {
            self.pos = cond_start;
            if !self.eval_logical() {
                break;
            }
            self.pos = body_start;
            self.exec_while(|i| i.pos < body_end)?;

            iterations += 1;
            if iterations >= MAX_LOOP_COUNT {
                self.diagnostics.push(make(
                    ErrorMsg::InfiniteLoop,
                    format!("{MAX_LOOP_COUNT} times"),
                ));
                break;
            }
        }
        trace!("Loop finished after {iterations} iterations");
        self.pos = after_loop;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), Exception> {
        self.expect(TokenKind::RETURN);
        let value = self.eval_expr();
        self.expect(TokenKind::SEMICOLON);
        debug!("Return {value}");
        Err(Exception::Return(value))
    }

    /// Definitions were registered before execution started, so only
    /// the cursor has to move past them.
    fn skip_function(&mut self) {
        // Consume the keyword and the name
        self.advance();
        self.advance();
        if self.advance_if(TokenKind::LPAREN).is_some() {
            while !self.check(TokenKind::RPAREN) && !self.is_at_end() {
                self.advance();
            }
            self.advance_if(TokenKind::RPAREN);
        }
        if self.advance_if(TokenKind::LBRACE).is_some() {
            let mut depth = 1;
            while depth > 0 {
                match self.peek_kind() {
                    Some(TokenKind::LBRACE) => depth += 1,
                    Some(TokenKind::RBRACE) => depth -= 1,
                    Some(_) => (),
                    None => break,
                }
                self.advance();
            }
        }
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens[..self.span.end].get(self.pos)
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens[..self.span.end].get(self.pos + 1).map(|t| t.kind)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.span.end
    }

    pub(crate) fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens[..self.span.end].get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn advance_if(&mut self, kind: TokenKind) -> Option<&Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    /// Consumes a token of `kind`, or records what was found instead
    /// and leaves the cursor alone.
    pub(crate) fn expect(&mut self, kind: TokenKind) {
        if self.advance_if(kind).is_none() {
            let found = self.found();
            self.error(ErrorMsg::Expected, format!("{kind:?}, found {found}"));
        }
    }

    /// Describes the token under the cursor for diagnostics.
    pub(crate) fn found(&self) -> String {
        match self.peek() {
            Some(t) => format!("{:?} ({})", t.kind, t.lexeme),
            None => "end of input".to_string(),
        }
    }

    /// Records a diagnostic located at the token under the cursor.
    pub(crate) fn error(&mut self, msg: ErrorMsg, ctx: impl Display) {
        let mut error = make(msg, ctx);
        if let Some(t) = self.peek() {
            error.push_str(&format!(" [{},{}]", t.line, t.column));
        }
        self.diagnostics.push(error);
    }
}
