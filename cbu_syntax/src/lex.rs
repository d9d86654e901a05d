use crate::token::{Token, TokenKind, EXTENDED_LETTERS};
use std::str::Lines;

/// Reads the source one physical line at a time and produces tokens
/// on demand. Lexing never fails: malformed input turns into
/// `MALFORMED_STRING` or `OTHER` tokens for the interpreter to report.
#[derive(Debug)]
pub struct Lexer<'a> {
    lines: Lines<'a>,
    line: Vec<char>,
    line_no: usize,
    current: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            line: Vec::default(),
            line_no: 0,
            current: 0,
        }
    }

    pub fn lex_all(self) -> Vec<Token> {
        self.collect()
    }

    /// Returns the next token, or `None` once the source is exhausted.
    pub fn lex(&mut self) -> Option<Token> {
        loop {
            if self.current >= self.line.len() {
                self.next_line()?;
                continue;
            }
            self.strip_comment();
            self.advance_while(char::is_whitespace);
            if self.current >= self.line.len() {
                self.line.clear();
                self.current = 0;
                continue;
            }

            let start = self.current;
            let c = self.advance()?;
            let token = match c {
                '"' => self.lex_string(start),
                '=' => self.lookahead_for_token('=', TokenKind::EQUAL_EQUAL, TokenKind::EQUAL, start),
                '!' => self.lookahead_for_token('=', TokenKind::BANG_EQUAL, TokenKind::BANG, start),
                '<' => self.lookahead_for_token('=', TokenKind::LESS_EQUAL, TokenKind::LESS, start),
                '>' => self.lookahead_for_token(
                    '=',
                    TokenKind::GREATER_EQUAL,
                    TokenKind::GREATER,
                    start,
                ),
                '&' => self.lookahead_for_token('&', TokenKind::AND, TokenKind::AMPERSAND, start),
                '|' => self.lookahead_for_token('|', TokenKind::OR, TokenKind::PIPE, start),
                '+' => self.lookahead_for_token('+', TokenKind::INCREMENT, TokenKind::PLUS, start),
                '-' => self.lookahead_for_token('-', TokenKind::DECREMENT, TokenKind::MINUS, start),
                _ => {
                    if let Some(t) = TokenKind::from_char(c) {
                        self.make_token(t, start)
                    } else if is_ident_start(c) {
                        self.lex_ident(start)
                    } else if c.is_ascii_digit() {
                        self.lex_number(start)
                    } else {
                        self.make_token(TokenKind::OTHER, start)
                    }
                }
            };
            return Some(token);
        }
    }

    fn lex_ident(&mut self, start: usize) -> Token {
        self.advance_while(is_ident_continue);
        let kind = TokenKind::from_keyword(&self.lexeme_from(start)).unwrap_or(TokenKind::IDENT);
        self.make_token(kind, start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let mut seen_dot = false;
        while let Some(c) = self.advance_if(|c| c.is_ascii_digit() || (!seen_dot && c == '.')) {
            seen_dot |= c == '.';
        }
        self.make_token(TokenKind::NUMBER, start)
    }

    /// Strings may span lines. Once a line is exhausted the next raw line
    /// is pulled in without comment stripping, and a newline is recorded
    /// in the literal.
    fn lex_string(&mut self, start: usize) -> Token {
        let mut text = String::default();
        loop {
            match self.advance() {
                Some('"') => break,
                Some(c) => text.push(c),
                None => {
                    if self.next_line().is_none() {
                        return Token::new(TokenKind::MALFORMED_STRING, text, self.line_no, start);
                    }
                    text.push('\n');
                }
            }
        }
        Token::new(TokenKind::STRING, text, self.line_no, start)
    }

    /// Everything from the first `//` on the current line is dropped,
    /// even when it sits inside a string literal.
    fn strip_comment(&mut self) {
        if let Some(idx) = self.line.windows(2).position(|w| w == ['/', '/']) {
            self.line.truncate(idx);
        }
    }

    fn next_line(&mut self) -> Option<()> {
        let line = self.lines.next()?;
        self.line = line.chars().collect();
        self.line_no += 1;
        self.current = 0;
        Some(())
    }

    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, self.lexeme_from(start), self.line_no, start)
    }

    fn lexeme_from(&self, start: usize) -> String {
        self.line[start..self.current].iter().collect()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.line.get(self.current).copied()?;
        self.current += 1;
        Some(c)
    }

    fn advance_if<F>(&mut self, cond: F) -> Option<char>
    where
        F: FnOnce(char) -> bool,
    {
        if self.line.get(self.current).filter(|&&c| cond(c)).is_some() {
            self.advance()
        } else {
            None
        }
    }

    fn advance_while<F>(&mut self, cond: F) -> Option<usize>
    where
        F: Fn(char) -> bool,
    {
        let mut count: usize = 0;
        while self.advance_if(&cond).is_some() {
            count += 1;
        }
        count.ne(&0).then_some(count)
    }

    fn lookahead_for_token(
        &mut self,
        match_char: char,
        if_match: TokenKind,
        no_match: TokenKind,
        start: usize,
    ) -> Token {
        if self.advance_if(|c| c == match_char).is_some() {
            self.make_token(if_match, start)
        } else {
            self.make_token(no_match, start)
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.lex()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || EXTENDED_LETTERS.contains(c) || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || EXTENDED_LETTERS.contains(c) || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    fn lexemes(input: &str) -> Vec<String> {
        Lexer::new(input).map(|t| t.lexeme).collect()
    }

    #[test]
    fn declaration() {
        let tokens = Lexer::new("tamsayı x = 5;").lex_all();
        assert_eq!(
            tokens,
            vec![
                Token::new(INT, "tamsayı".to_string(), 1, 0),
                Token::new(IDENT, "x".to_string(), 1, 8),
                Token::new(EQUAL, "=".to_string(), 1, 10),
                Token::new(NUMBER, "5".to_string(), 1, 12),
                Token::new(SEMICOLON, ";".to_string(), 1, 13),
            ]
        );
    }

    #[test]
    fn positions_across_lines() {
        let tokens = Lexer::new("yaz(a);\n\n   b = 1;").lex_all();
        let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(
            positions,
            vec![(1, 0), (1, 3), (1, 4), (1, 5), (1, 6), (3, 3), (3, 5), (3, 7), (3, 8)]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("== != <= >= && || ++ -- = ! < > & | + - * / % ( ) { } ; , ."),
            vec![
                EQUAL_EQUAL, BANG_EQUAL, LESS_EQUAL, GREATER_EQUAL, AND, OR, INCREMENT, DECREMENT,
                EQUAL, BANG, LESS, GREATER, AMPERSAND, PIPE, PLUS, MINUS, STAR, SLASH, MODULO,
                LPAREN, RPAREN, LBRACE, RBRACE, SEMICOLON, COMMA, DOT,
            ]
        );
        // The longest operator wins over its one-character prefix
        assert_eq!(kinds("a<=b"), vec![IDENT, LESS_EQUAL, IDENT]);
        assert_eq!(kinds("i+++1"), vec![IDENT, INCREMENT, PLUS, NUMBER]);
    }

    #[test]
    fn other_chars() {
        let tokens = Lexer::new("a # $").lex_all();
        assert_eq!(tokens[1].kind, OTHER);
        assert_eq!(tokens[1].lexeme, "#");
        assert_eq!(tokens[2].kind, OTHER);
        assert_eq!(tokens[2].column, 4);
    }

    #[test]
    fn keywords_and_idents() {
        assert_eq!(
            kinds("tamsayı ondalikli kelime yaz eğer ise değilse döngü durdur devam fonksiyon dön"),
            vec![INT, DECIMAL, TEXT, PRINT, IF, THEN, ELSE, LOOP, BREAK, CONTINUE, FN, RETURN]
        );
        assert_eq!(kinds("şehir _x2 ıslak yazı"), vec![IDENT, IDENT, IDENT, IDENT]);
        assert_eq!(lexemes("ağaç1_"), vec!["ağaç1_"]);
    }

    #[test]
    fn numbers() {
        assert_eq!(lexemes("42 3.14"), vec!["42", "3.14"]);
        assert_eq!(kinds("1.2.3"), vec![NUMBER, DOT, NUMBER]);
        assert_eq!(lexemes("1.2.3"), vec!["1.2", ".", "3"]);
        assert_eq!(lexemes("7."), vec!["7."]);
        // A digit cannot start an identifier
        assert_eq!(kinds("9abc"), vec![NUMBER, IDENT]);
    }

    #[test]
    fn comments() {
        assert_eq!(kinds("x = 1; // yorum\ny = 2;"), vec![
            IDENT, EQUAL, NUMBER, SEMICOLON, IDENT, EQUAL, NUMBER, SEMICOLON
        ]);
        assert_eq!(kinds("// sadece yorum"), vec![]);
        assert_eq!(lexemes("a/b"), vec!["a", "/", "b"]);
    }

    #[test]
    fn comment_inside_string_truncates() {
        let tokens = Lexer::new("yaz(\"http://x\");").lex_all();
        // The line is cut at `//`, leaving an unterminated string
        assert_eq!(tokens[2].kind, MALFORMED_STRING);
        assert_eq!(tokens[2].lexeme, "http:");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn strings() {
        let tokens = Lexer::new("kelime s = \"merhaba dünya\";").lex_all();
        assert_eq!(tokens[3], Token::new(STRING, "merhaba dünya".to_string(), 1, 11));
        assert_eq!(tokens[4].kind, SEMICOLON);
        assert_eq!(tokens[4].column, 26);
    }

    #[test]
    fn multiline_string() {
        let tokens = Lexer::new("s = \"bir\niki\";").lex_all();
        assert_eq!(tokens[2], Token::new(STRING, "bir\niki".to_string(), 2, 4));
        assert_eq!(tokens[3], Token::new(SEMICOLON, ";".to_string(), 2, 4));
    }

    #[test]
    fn string_across_empty_line() {
        let tokens = Lexer::new("\"a\n\nb\" ;").lex_all();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, STRING);
        assert_eq!(tokens[0].lexeme, "a\n\nb");
        assert_eq!(tokens[0].line, 3);
        assert_eq!(tokens[1].kind, SEMICOLON);
    }

    #[test]
    fn unterminated_string() {
        let tokens = Lexer::new("yaz(\"açık\n  kalan").lex_all();
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[2],
            Token::new(MALFORMED_STRING, "açık\n  kalan".to_string(), 2, 4)
        );
    }

    #[test]
    fn lazy_and_finite() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.lex().map(|t| t.lexeme), Some("a".to_string()));
        assert_eq!(lexer.lex().map(|t| t.lexeme), Some("b".to_string()));
        assert_eq!(lexer.lex(), None);
        assert_eq!(lexer.lex(), None);
    }
}
