//! Part 21 (ISO 10303-21) tokenizer.
//!
//! Produces keywords (hyphens allowed, as in `END-ISO-10303-21`), `#id`
//! references, strings with `''` escapes, integers and reals, `.ENUM.`
//! values and punctuation. `/* ... */` comments are skipped.

use crate::error::ImportError;

/// A token in a STEP exchange file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword or type name, upper-cased.
    Keyword(String),
    /// Entity reference, `#123` becomes `EntityRef(123)`.
    EntityRef(u64),
    /// String literal without its quotes.
    String(String),
    Real(f64),
    Integer(i64),
    /// Enumeration, `.T.` becomes `Enum("T")`.
    Enum(String),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Equals,
    /// Derived value marker `*`.
    Asterisk,
    /// Unset value marker `$`.
    Dollar,
}

/// Position in the source, 1-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

/// A token with the position it starts at.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub pos: Position,
}

/// Lexer over raw STEP bytes.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenizes the entire input.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Lexer`] at the first malformed token.
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>, ImportError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<SpannedToken>, ImportError> {
        self.skip_whitespace_and_comments()?;

        let Some(ch) = self.peek_char() else {
            return Ok(None);
        };
        let pos = Position {
            line: self.line,
            col: self.col,
        };

        let token = match ch {
            b'(' => self.single(Token::LParen),
            b')' => self.single(Token::RParen),
            b',' => self.single(Token::Comma),
            b';' => self.single(Token::Semicolon),
            b'=' => self.single(Token::Equals),
            b'*' => self.single(Token::Asterisk),
            b'$' => self.single(Token::Dollar),
            b'#' => self.read_entity_ref()?,
            b'\'' => self.read_string()?,
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number()?,
            b'.' => self.read_enum()?,
            b'-' | b'+' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit() || c == b'.') => {
                self.read_number()?
            }
            b'0'..=b'9' => self.read_number()?,
            b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'!' => self.read_keyword(),
            _ => {
                return Err(ImportError::lexer(
                    self.line,
                    self.col,
                    format!("unexpected character '{}'", char::from(ch)),
                ));
            }
        };

        Ok(Some(SpannedToken { token, pos }))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn peek_char(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ImportError> {
        loop {
            while self.peek_char().is_some_and(|c| c.is_ascii_whitespace()) {
                self.advance();
            }

            if self.peek_char() == Some(b'/') && self.peek_at(1) == Some(b'*') {
                let (line, col) = (self.line, self.col);
                self.advance();
                self.advance();
                loop {
                    match (self.peek_char(), self.peek_at(1)) {
                        (Some(b'*'), Some(b'/')) => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        (Some(_), _) => {
                            self.advance();
                        }
                        (None, _) => {
                            return Err(ImportError::lexer(line, col, "unterminated comment"));
                        }
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn read_entity_ref(&mut self) -> Result<Token, ImportError> {
        let (line, col) = (self.line, self.col);
        self.advance();

        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(ImportError::lexer(line, col, "expected digits after '#'"));
        }
        let id = digits
            .parse()
            .map_err(|_| ImportError::lexer(line, col, format!("invalid entity id: {digits}")))?;
        Ok(Token::EntityRef(id))
    }

    fn read_string(&mut self) -> Result<Token, ImportError> {
        let (line, col) = (self.line, self.col);
        self.advance();

        let mut content = Vec::new();
        loop {
            match self.advance() {
                None => return Err(ImportError::lexer(line, col, "unterminated string")),
                Some(b'\'') => {
                    if self.peek_char() == Some(b'\'') {
                        content.push(b'\'');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(ch) => content.push(ch),
            }
        }
        Ok(Token::String(String::from_utf8_lossy(&content).into_owned()))
    }

    fn read_enum(&mut self) -> Result<Token, ImportError> {
        let (line, col) = (self.line, self.col);
        self.advance();

        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if self.advance() != Some(b'.') {
            return Err(ImportError::lexer(line, col, "unterminated enumeration"));
        }
        if name.is_empty() {
            return Err(ImportError::lexer(line, col, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_ascii_uppercase()))
    }

    fn read_number(&mut self) -> Result<Token, ImportError> {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();
        let mut is_real = false;

        if let Some(sign @ (b'-' | b'+')) = self.peek_char() {
            text.push(char::from(sign));
            self.advance();
        }
        text.push_str(&self.take_while(|c| c.is_ascii_digit()));

        // A trailing '.' with no digits ("1.") is still a real.
        if self.peek_char() == Some(b'.') {
            is_real = true;
            self.advance();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if let Some(e @ (b'E' | b'e')) = self.peek_char() {
            is_real = true;
            text.push(char::from(e));
            self.advance();
            if let Some(sign @ (b'-' | b'+')) = self.peek_char() {
                text.push(char::from(sign));
                self.advance();
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if is_real {
            text.parse()
                .map(Token::Real)
                .map_err(|_| ImportError::lexer(line, col, format!("invalid real: {text}")))
        } else {
            text.parse()
                .map(Token::Integer)
                .map_err(|_| ImportError::lexer(line, col, format!("invalid integer: {text}")))
        }
    }

    fn read_keyword(&mut self) -> Token {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'!');
        Token::Keyword(name.to_ascii_uppercase())
    }
}
