use std::ops::Range;

use cbu_syntax::token::{Token, TokenKind};
use log::trace;

use crate::types::Func;

/// Scans `range` of `tokens` once for function definitions, in source
/// order. A whole body is skipped as one unit, so definitions nested
/// inside another body are only found when that body is itself scanned,
/// i.e. when the enclosing function is called.
pub fn register(tokens: &[Token], range: Range<usize>) -> Vec<Func> {
    let end = range.end.min(tokens.len());
    let kind_at = |pos: usize| (pos < end).then(|| tokens[pos].kind);

    let mut funcs = vec![];
    let mut pos = range.start;
    while pos < end {
        if tokens[pos].kind != TokenKind::FN {
            pos += 1;
            continue;
        }
        // Skip the keyword, the next token names the function
        pos += 1;
        if pos >= end {
            break;
        }
        let name = tokens[pos].lexeme.clone();
        pos += 1;

        let mut params = vec![];
        if kind_at(pos) == Some(TokenKind::LPAREN) {
            pos += 1;
            while kind_at(pos) == Some(TokenKind::IDENT) {
                params.push(tokens[pos].lexeme.clone());
                pos += 1;
                if kind_at(pos) == Some(TokenKind::COMMA) {
                    pos += 1;
                }
            }
            // Consume the closing parenthesis, or whatever ended the list
            pos += 1;
        }

        if kind_at(pos) == Some(TokenKind::LBRACE) {
            pos += 1;
            let body_start = pos;
            let mut depth = 1;
            while let Some(kind) = kind_at(pos).filter(|_| depth > 0) {
                match kind {
                    TokenKind::LBRACE => depth += 1,
                    TokenKind::RBRACE => depth -= 1,
                    _ => (),
                }
                pos += 1;
            }
            // Excludes the closing brace. An unterminated body loses
            // its last token instead.
            let body_end = (pos - 1).max(body_start);
            let func = Func {
                name,
                params,
                body: body_start..body_end,
            };
            trace!("Found {func} with body {:?}", func.body);
            funcs.push(func);
        }
    }
    funcs
}
