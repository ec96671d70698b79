use crate::error::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Newline,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,

    // One or two character operators
    EqualEqual,
    BangEqual,
    AndAnd,
    OrOr,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Classified lexemes
    Identifier,
    Number,

    // Keywords
    Print,
    If,
    Else,
    While,

    // Special
    Illegal,
    Eof,
}

/// Maps a maximal identifier to its keyword kind, or `Identifier`.
pub fn lookup_keyword(ident: &str) -> TokenKind {
    match ident {
        "print" => TokenKind::Print,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        _ => TokenKind::Identifier,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the lexeme; empty for `Eof`.
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: String, span: Span) -> Self {
        Self {
            kind,
            literal,
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// On-demand tokenizer. Positions are character offsets so spans line up with
/// the diagnostics renderer.
pub struct Lexer {
    source: Vec<char>,
    /// Offset of `ch`.
    position: usize,
    /// Offset of the character after `ch`.
    read_position: usize,
    /// Character under examination; NUL once past the end.
    ch: char,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut lexer = Self {
            source: source.chars().collect(),
            position: 0,
            read_position: 0,
            ch: '\0',
        };
        lexer.read_char();
        lexer
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let kind = match self.ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '\n' => TokenKind::Newline,
            '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Assign),
            '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
            '!' => self.either('=', TokenKind::BangEqual, TokenKind::Illegal),
            '&' => self.either('&', TokenKind::AndAnd, TokenKind::Illegal),
            '|' => self.either('|', TokenKind::OrOr, TokenKind::Illegal),
            '\0' => {
                return Token::new(TokenKind::Eof, String::new(), Span::new(start, start));
            }
            c if c.is_ascii_alphabetic() => {
                let literal = self.read_while(|c| c.is_ascii_alphabetic());
                let kind = lookup_keyword(&literal);
                return Token::new(kind, literal, Span::new(start, self.position));
            }
            c if c.is_ascii_digit() => {
                let literal = self.read_while(|c| c.is_ascii_digit());
                return Token::new(TokenKind::Number, literal, Span::new(start, self.position));
            }
            _ => TokenKind::Illegal,
        };

        self.read_char();
        let literal: String = self.source[start..self.position].iter().collect();
        Token::new(kind, literal, Span::new(start, self.position))
    }

    fn read_char(&mut self) {
        self.ch = self.source.get(self.read_position).copied().unwrap_or('\0');
        self.position = self.read_position;
        if self.read_position < self.source.len() {
            self.read_position += 1;
        }
    }

    fn peek_char(&self) -> char {
        self.source.get(self.read_position).copied().unwrap_or('\0')
    }

    /// Consumes the first character of a possible pair. If the next one is
    /// `second` it is consumed too and `pair` is returned.
    fn either(&mut self, second: char, pair: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek_char() == second {
            self.read_char();
            pair
        } else {
            single
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while self.ch != '\0' && accept(self.ch) {
            self.read_char();
        }
        self.source[start..self.position].iter().collect()
    }

    // Newline is significant, so only spaces and tabs are skipped.
    fn skip_whitespace(&mut self) {
        while self.ch == ' ' || self.ch == '\t' {
            self.read_char();
        }
    }
}

/// Yields every token before `Eof`, then stops.
impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}
