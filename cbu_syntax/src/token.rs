use std::fmt::Display;

/// The enum variants are in SCREAMING_SNAKE_CASE as they technically
/// represent constants, but Rust does not allow const enum variants.
#[allow(nonstandard_style)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // Symbols
    LPAREN,
    RPAREN,
    LBRACE,
    RBRACE,
    COMMA,
    DOT,
    SEMICOLON,
    // Arithmetic
    PLUS,
    MINUS,
    STAR,
    SLASH,
    MODULO,
    INCREMENT,
    DECREMENT,
    // Comparisons
    EQUAL_EQUAL,
    BANG_EQUAL,
    LESS,
    LESS_EQUAL,
    GREATER,
    GREATER_EQUAL,
    // Logical
    AND,
    OR,
    BANG,
    AMPERSAND,
    PIPE,
    // Literals
    IDENT,
    NUMBER,
    STRING,
    MALFORMED_STRING,
    // Keywords
    INT,
    DECIMAL,
    TEXT,
    PRINT,
    IF,
    THEN,
    ELSE,
    LOOP,
    BREAK,
    CONTINUE,
    FN,
    RETURN,
    // Miscellaneous tokens
    EQUAL,
    OTHER,
}

/// Letters of the Turkish alphabet which are accepted in identifiers
/// in addition to the usual alphabetic characters.
pub const EXTENDED_LETTERS: &str = "ğĞşŞöÖüÜçÇıİ";

impl TokenKind {
    pub fn from_char(c: char) -> Option<Self> {
        let token = match c {
            '(' => Self::LPAREN,
            ')' => Self::RPAREN,
            '{' => Self::LBRACE,
            '}' => Self::RBRACE,
            ',' => Self::COMMA,
            '.' => Self::DOT,
            ';' => Self::SEMICOLON,
            '+' => Self::PLUS,
            '-' => Self::MINUS,
            '*' => Self::STAR,
            '/' => Self::SLASH,
            '%' => Self::MODULO,
            '=' => Self::EQUAL,
            '!' => Self::BANG,
            '<' => Self::LESS,
            '>' => Self::GREATER,
            '&' => Self::AMPERSAND,
            '|' => Self::PIPE,
            _ => return None,
        };
        Some(token)
    }

    pub fn from_keyword(kw: &str) -> Option<Self> {
        let token = match kw {
            "tamsayı" => Self::INT,
            "ondalikli" => Self::DECIMAL,
            "kelime" => Self::TEXT,
            "yaz" => Self::PRINT,
            "eğer" => Self::IF,
            "ise" => Self::THEN,
            "değilse" => Self::ELSE,
            "döngü" => Self::LOOP,
            "durdur" => Self::BREAK,
            "devam" => Self::CONTINUE,
            "fonksiyon" => Self::FN,
            "dön" => Self::RETURN,
            _ => return None,
        };
        Some(token)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::PLUS | Self::MINUS | Self::STAR | Self::SLASH | Self::MODULO
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lexeme)
    }
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme,
            line,
            column,
        }
    }
}
