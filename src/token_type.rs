use std::fmt;

/// The `TokenType` enum represents the different types of tokens that can be recognized by the lexer.
/// Each variant corresponds to a specific type of token, such as keywords, literals, or punctuation.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Single-character tokens.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,
    QUESTION,
    COLON,

    // One or two character tokens.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,
    PLUS_EQUAL,
    MINUS_EQUAL,
    STAR_EQUAL,
    SLASH_EQUAL,

    // Literals.
    IDENT,
    STRING,
    NUMBER,

    // Keywords.
    AND,
    BREAK,
    CLASS,
    CONTINUE,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    EOF,
}

impl TokenType {
    /// maps an identifier-shaped word onto its keyword, if it is one
    pub fn keyword(word: &str) -> Option<TokenType> {
        let kind = match word {
            "and" => TokenType::AND,
            "break" => TokenType::BREAK,
            "class" => TokenType::CLASS,
            "continue" => TokenType::CONTINUE,
            "else" => TokenType::ELSE,
            "false" => TokenType::FALSE,
            "fun" => TokenType::FUN,
            "for" => TokenType::FOR,
            "if" => TokenType::IF,
            "nil" => TokenType::NIL,
            "or" => TokenType::OR,
            "print" => TokenType::PRINT,
            "return" => TokenType::RETURN,
            "super" => TokenType::SUPER,
            "this" => TokenType::THIS,
            "true" => TokenType::TRUE,
            "var" => TokenType::VAR,
            "while" => TokenType::WHILE,
            _ => return None,
        };
        Some(kind)
    }

    /// For compound assignments (`+=` and friends) returns the arithmetic operator
    /// the assignment desugars into, together with its lexeme.
    pub fn compound_base(self) -> Option<(TokenType, &'static str)> {
        match self {
            TokenType::PLUS_EQUAL => Some((TokenType::PLUS, "+")),
            TokenType::MINUS_EQUAL => Some((TokenType::MINUS, "-")),
            TokenType::STAR_EQUAL => Some((TokenType::STAR, "*")),
            TokenType::SLASH_EQUAL => Some((TokenType::SLASH, "/")),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::QUESTION => "QUESTION",
            TokenType::COLON => "COLON",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::PLUS_EQUAL => "PLUS_EQUAL",
            TokenType::MINUS_EQUAL => "MINUS_EQUAL",
            TokenType::STAR_EQUAL => "STAR_EQUAL",
            TokenType::SLASH_EQUAL => "SLASH_EQUAL",
            TokenType::IDENT => "IDENTIFIER",
            TokenType::STRING => "STRING",
            TokenType::NUMBER => "NUMBER",
            TokenType::AND => "AND",
            TokenType::BREAK => "BREAK",
            TokenType::CLASS => "CLASS",
            TokenType::CONTINUE => "CONTINUE",
            TokenType::ELSE => "ELSE",
            TokenType::FALSE => "FALSE",
            TokenType::FUN => "FUN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::NIL => "NIL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::EOF => "EOF",
        }
    }
}

/// literal payload carried by NUMBER, STRING, TRUE and FALSE tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) if *n == n.trunc() => write!(f, "{n}.0"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Str(s) => write!(f, "{s}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// holds the type
    pub kind: TokenType,
    /// holds the characters as they appear in the source
    pub lexeme: String,
    /// decoded value for literal tokens
    pub literal: Option<Literal>,
    /// 1-based source line
    pub line: usize,
    /// byte offset of the lexeme, used to label diagnostics
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenType, lexeme: impl Into<String>, line: usize, offset: usize) -> Self {
        Self { kind, lexeme: lexeme.into(), literal: None, line, offset }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Builds a token that never appeared in the source, positioned at `from`.
    ///
    /// Used when desugaring `x += e` into `x = x + e`.
    pub fn synthetic(kind: TokenType, lexeme: &str, from: &Token) -> Self {
        Self { kind, lexeme: lexeme.to_string(), literal: None, line: from.line, offset: from.offset }
    }

    /// the byte range covered by this token, for `miette` labels
    pub fn span(&self) -> (usize, usize) {
        (self.offset, self.lexeme.len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = &self.lexeme;
        let kind = self.kind.name();
        match (&self.kind, &self.literal) {
            (TokenType::EOF, _) => write!(f, "EOF  null"),
            (TokenType::TRUE | TokenType::FALSE, _) | (_, None) => write!(f, "{kind} {origin} null"),
            (_, Some(literal)) => write!(f, "{kind} {origin} {literal}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(TokenType::keyword("while"), Some(TokenType::WHILE));
        assert_eq!(TokenType::keyword("continue"), Some(TokenType::CONTINUE));
        assert_eq!(TokenType::keyword("whilst"), None);
    }

    #[test]
    fn compound_operators_map_to_their_base() {
        assert_eq!(TokenType::PLUS_EQUAL.compound_base(), Some((TokenType::PLUS, "+")));
        assert_eq!(TokenType::SLASH_EQUAL.compound_base(), Some((TokenType::SLASH, "/")));
        assert_eq!(TokenType::EQUAL.compound_base(), None);
    }

    #[test]
    fn display_matches_tokenize_format() {
        let number = Token::new(TokenType::NUMBER, "42", 1, 0).with_literal(Literal::Number(42.0));
        assert_eq!(number.to_string(), "NUMBER 42 42.0");

        let string = Token::new(TokenType::STRING, "\"hi\"", 1, 0).with_literal(Literal::Str("hi".into()));
        assert_eq!(string.to_string(), "STRING \"hi\" hi");

        let ident = Token::new(TokenType::IDENT, "foo", 1, 0);
        assert_eq!(ident.to_string(), "IDENTIFIER foo null");

        let eof = Token::new(TokenType::EOF, "", 3, 10);
        assert_eq!(eof.to_string(), "EOF  null");
    }

    #[test]
    fn synthetic_token_keeps_position() {
        let plus_equal = Token::new(TokenType::PLUS_EQUAL, "+=", 7, 40);
        let plus = Token::synthetic(TokenType::PLUS, "+", &plus_equal);
        assert_eq!(plus.kind, TokenType::PLUS);
        assert_eq!(plus.lexeme, "+");
        assert_eq!((plus.line, plus.offset), (7, 40));
    }
}
