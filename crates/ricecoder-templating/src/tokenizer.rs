//! Template tokenizer
//!
//! Splits raw template text into literal text and `{{...}}` tags. The
//! tokenizer never fails; an unterminated `{{` is emitted as text and any
//! further interpretation is left to the parser.

/// Opening tag delimiter
pub const TAG_OPEN: &str = "{{";

/// Closing tag delimiter
pub const TAG_CLOSE: &str = "}}";

/// Source position, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number
    pub line: usize,
    /// Column number, counted in characters
    pub column: usize,
}

impl Position {
    /// Position of the first character of a template
    pub const START: Position = Position { line: 1, column: 1 };

    /// Position reached after consuming `text` from here
    fn advance(mut self, text: &str) -> Self {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

/// A lexical unit of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, preserved exactly
    Text {
        /// Raw text
        content: String,
        /// Position of the first character
        position: Position,
    },
    /// Content between `{{` and `}}`, trimmed
    Tag {
        /// Trimmed tag content
        content: String,
        /// The tag exactly as written, delimiters included
        raw: String,
        /// Position of the opening delimiter
        position: Position,
    },
}

impl Token {
    /// Source position of the token
    pub fn position(&self) -> Position {
        match self {
            Token::Text { position, .. } | Token::Tag { position, .. } => *position,
        }
    }

    /// Reproduce the token exactly as it appeared in the template
    pub fn to_source(&self) -> String {
        match self {
            Token::Text { content, .. } => content.clone(),
            Token::Tag { raw, .. } => raw.clone(),
        }
    }
}

/// Wrap tag content in delimiters
pub fn tag_source(content: &str) -> String {
    format!("{}{}{}", TAG_OPEN, content, TAG_CLOSE)
}

/// Template tokenizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a tokenizer
    pub fn new() -> Self {
        Self
    }

    /// Split template text into tokens in source order
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = text;
        let mut position = Position::START;

        while !rest.is_empty() {
            let Some(open) = rest.find(TAG_OPEN) else {
                tokens.push(Token::Text {
                    content: rest.to_string(),
                    position,
                });
                break;
            };

            if open > 0 {
                let literal = &rest[..open];
                tokens.push(Token::Text {
                    content: literal.to_string(),
                    position,
                });
                position = position.advance(literal);
                rest = &rest[open..];
            }

            let inner = &rest[TAG_OPEN.len()..];
            let Some(close) = inner.find(TAG_CLOSE) else {
                // Unterminated tag: keep the remainder verbatim
                tokens.push(Token::Text {
                    content: rest.to_string(),
                    position,
                });
                break;
            };

            let consumed = TAG_OPEN.len() + close + TAG_CLOSE.len();
            tokens.push(Token::Tag {
                content: inner[..close].trim().to_string(),
                raw: rest[..consumed].to_string(),
                position,
            });

            position = position.advance(&rest[..consumed]);
            rest = &rest[consumed..];
        }

        tokens
    }
}
