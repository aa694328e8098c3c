use crate::token_type::{Literal, Token, TokenType};
use miette::{Diagnostic, Error, LabeledSpan, SourceSpan};
use thiserror::Error;

/// The `Lexer` struct is responsible for tokenizing the input string.
/// It holds the entire input string, the remaining unprocessed part of the string,
/// and the current byte index and line for tracking the position in the string.
/// The `Lexer` struct implements the `Iterator` trait, allowing it to produce tokens one at a time.
#[derive(Debug)]
pub struct Lexer<'de> {
    /// holds the entire String
    whole: &'de str,
    /// holds the remainder of the String
    rest: &'de str,
    /// to keep track of the index we're at
    byte: usize,
    /// current 1-based line
    line: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Self { whole: input, rest: input, byte: 0, line: 1 }
    }

    /// the line the lexer has reached so far
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Scans the whole input, collecting tokens and lexical errors separately.
///
/// The token list always ends with exactly one `EOF` token.
pub fn scan(input: &str) -> (Vec<Token>, Vec<Error>) {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in lexer.by_ref() {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    tokens.push(Token::new(TokenType::EOF, "", lexer.line(), input.len()));
    (tokens, errors)
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    /// Scanning goes on after an `Err`, so a single stray character does not hide
    /// the rest of the tokens.
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest;
            let mut chars = rest.chars();

            let c = chars.next()?;
            // `c_at` represents the byte-index where this character begins at the string
            let c_at = self.byte;
            let c_str = &rest[..c.len_utf8()];
            let c_onwards = rest;
            let line = self.line;

            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            /// multi character tokens
            enum Started {
                String,
                Number,
                Ident,
                /// represents <=, <, >=, >, =, ==, !=, +=, -=, *=
                IfEqualElse(TokenType, TokenType),
                /// to handle /, /= and //
                Slash,
            }

            let just = move |kind: TokenType| Some(Ok(Token::new(kind, c_str, line, c_at)));

            let started = match c {
                '(' => return just(TokenType::LEFT_PAREN),
                ')' => return just(TokenType::RIGHT_PAREN),
                '{' => return just(TokenType::LEFT_BRACE),
                '}' => return just(TokenType::RIGHT_BRACE),
                ',' => return just(TokenType::COMMA),
                '.' => return just(TokenType::DOT),
                ';' => return just(TokenType::SEMICOLON),
                '?' => return just(TokenType::QUESTION),
                ':' => return just(TokenType::COLON),
                '\n' => {
                    self.line += 1;
                    continue;
                },
                c if c.is_whitespace() => continue,
                '/' => Started::Slash,
                '"' => Started::String,
                '0'..='9' => Started::Number,
                'a'..='z' | 'A'..='Z' | '_' => Started::Ident,
                '+' => Started::IfEqualElse(TokenType::PLUS_EQUAL, TokenType::PLUS),
                '-' => Started::IfEqualElse(TokenType::MINUS_EQUAL, TokenType::MINUS),
                '*' => Started::IfEqualElse(TokenType::STAR_EQUAL, TokenType::STAR),
                '=' => Started::IfEqualElse(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
                '<' => Started::IfEqualElse(TokenType::LESS_EQUAL, TokenType::LESS),
                '>' => Started::IfEqualElse(TokenType::GREATER_EQUAL, TokenType::GREATER),
                '!' => Started::IfEqualElse(TokenType::BANG_EQUAL, TokenType::BANG),
                _ => {
                    return Some(Err(SingleTokenError {
                        src: self.whole.to_string(),
                        token: c,
                        err_span: SourceSpan::from(c_at..self.byte),
                        line,
                    }
                    .into()));
                },
            };

            break match started {
                Started::IfEqualElse(yes, no) => {
                    if self.rest.starts_with('=') {
                        let span = &c_onwards[..c.len_utf8() + 1];
                        self.rest = &self.rest[1..];
                        self.byte += 1;

                        Some(Ok(Token::new(yes, span, line, c_at)))
                    } else {
                        just(no)
                    }
                },
                Started::Slash => {
                    if self.rest.starts_with('/') {
                        // comment: the newline itself is left for the whitespace arm
                        let line_end = self.rest.find('\n').unwrap_or(self.rest.len());
                        self.byte += line_end;
                        self.rest = &self.rest[line_end..];
                        continue;
                    } else if self.rest.starts_with('=') {
                        self.rest = &self.rest[1..];
                        self.byte += 1;
                        Some(Ok(Token::new(TokenType::SLASH_EQUAL, &c_onwards[..2], line, c_at)))
                    } else {
                        just(TokenType::SLASH)
                    }
                },
                Started::String => {
                    let after = self.rest;
                    if let Some(end) = after.find('"') {
                        let contents = &after[..end];
                        // include both quotes in the lexeme
                        let literal = &c_onwards[..end + 2];

                        self.line += contents.matches('\n').count();
                        self.byte += end + 1;
                        self.rest = &after[end + 1..];

                        Some(Ok(Token::new(TokenType::STRING, literal, line, c_at)
                            .with_literal(Literal::Str(contents.to_string()))))
                    } else {
                        let e = StringTerminationError {
                            src: self.whole.to_string(),
                            err_span: SourceSpan::from(c_at..self.whole.len()),
                            line,
                        };

                        self.line += after.matches('\n').count();
                        self.byte += after.len();
                        self.rest = &after[after.len()..];

                        Some(Err(e.into()))
                    }
                },
                Started::Ident => {
                    let first_non_ident = c_onwards
                        .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '0'..='9'))
                        .unwrap_or(c_onwards.len());

                    let literal = &c_onwards[..first_non_ident];
                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    let kind = TokenType::keyword(literal).unwrap_or(TokenType::IDENT);
                    let token = Token::new(kind, literal, line, c_at);

                    Some(Ok(match kind {
                        TokenType::TRUE => token.with_literal(Literal::Bool(true)),
                        TokenType::FALSE => token.with_literal(Literal::Bool(false)),
                        _ => token,
                    }))
                },
                Started::Number => {
                    let mut end = c_onwards
                        .find(|c: char| !c.is_ascii_digit())
                        .unwrap_or(c_onwards.len());

                    // a fractional part needs at least one digit after the dot
                    let after = &c_onwards[end..];
                    if after.starts_with('.') && after[1..].starts_with(|c: char| c.is_ascii_digit()) {
                        let fraction = after[1..]
                            .find(|c: char| !c.is_ascii_digit())
                            .unwrap_or(after.len() - 1);
                        end += 1 + fraction;
                    }

                    let literal = &c_onwards[..end];
                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    let n: f64 = match literal.parse() {
                        Ok(n) => n,
                        Err(e) => {
                            return Some(Err(miette::miette! {
                                labels = vec![
                                    LabeledSpan::at(c_at..self.byte, "this numeric literal"),
                                ],
                                "{e}",
                            }
                            .with_source_code(self.whole.to_string())));
                        },
                    };

                    Some(Ok(Token::new(TokenType::NUMBER, literal, line, c_at).with_literal(Literal::Number(n))))
                },
            };
        }
    }
}

#[derive(Diagnostic, Debug, Error)]
#[error("[line {line}] Error: Unexpected character: {token}")]
#[diagnostic(code(lox::lex::unexpected_character))]
pub struct SingleTokenError {
    #[source_code]
    pub src: String,

    pub token: char,

    #[label = "this input character"]
    pub err_span: SourceSpan,

    pub line: usize,
}

impl SingleTokenError {
    pub fn line(&self) -> usize {
        self.line
    }
}

#[derive(Diagnostic, Debug, Error)]
#[error("[line {line}] Error: Unterminated string.")]
#[diagnostic(code(lox::lex::unterminated_string))]
pub struct StringTerminationError {
    #[source_code]
    pub src: String,

    #[label = "this string literal"]
    pub err_span: SourceSpan,

    pub line: usize,
}

impl StringTerminationError {
    pub fn line(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenType> {
        let (tokens, errors) = scan(input);
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuation_and_operators() {
        assert_eq!(
            kinds("( ) { } , . ; ? : ! != = == < <= > >= + += - -= * *= / /="),
            vec![
                TokenType::LEFT_PAREN,
                TokenType::RIGHT_PAREN,
                TokenType::LEFT_BRACE,
                TokenType::RIGHT_BRACE,
                TokenType::COMMA,
                TokenType::DOT,
                TokenType::SEMICOLON,
                TokenType::QUESTION,
                TokenType::COLON,
                TokenType::BANG,
                TokenType::BANG_EQUAL,
                TokenType::EQUAL,
                TokenType::EQUAL_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::PLUS,
                TokenType::PLUS_EQUAL,
                TokenType::MINUS,
                TokenType::MINUS_EQUAL,
                TokenType::STAR,
                TokenType::STAR_EQUAL,
                TokenType::SLASH,
                TokenType::SLASH_EQUAL,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn separated_equals_are_two_tokens() {
        assert_eq!(kinds("= ="), vec![TokenType::EQUAL, TokenType::EQUAL, TokenType::EOF]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("var breaker = break; continue fun _x1"),
            vec![
                TokenType::VAR,
                TokenType::IDENT,
                TokenType::EQUAL,
                TokenType::BREAK,
                TokenType::SEMICOLON,
                TokenType::CONTINUE,
                TokenType::FUN,
                TokenType::IDENT,
                TokenType::EOF,
            ]
        );
    }

    #[test]
    fn number_literals() {
        let (tokens, _) = scan("12 3.5 7. .5");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal.clone()).collect();
        assert_eq!(
            literals,
            vec![
                Some(Literal::Number(12.0)),
                Some(Literal::Number(3.5)),
                Some(Literal::Number(7.0)),
                None, // trailing dot
                None, // leading dot
                Some(Literal::Number(5.0)),
                None, // EOF
            ]
        );
    }

    #[test]
    fn strings_span_lines() {
        let (tokens, errors) = scan("\"a\nb\" x");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".into())));
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn comments_and_lines() {
        let (tokens, _) = scan("a // ignored ( )\nb\n\nc");
        let lines: Vec<_> = tokens.iter().map(|t| (t.lexeme.as_str(), t.line)).collect();
        assert_eq!(lines, vec![("a", 1), ("b", 2), ("c", 4), ("", 4)]);
    }

    #[test]
    fn offsets_point_into_source() {
        let source = "print  foo;";
        let (tokens, _) = scan(source);
        let foo = &tokens[1];
        assert_eq!(&source[foo.offset..foo.offset + foo.lexeme.len()], "foo");
    }

    #[test]
    fn unexpected_character_keeps_scanning() {
        let (tokens, errors) = scan("1 @ 2");
        assert_eq!(errors.len(), 1);
        let err = errors[0].downcast_ref::<SingleTokenError>().expect("single token error");
        assert_eq!(err.token, '@');
        assert_eq!(err.line(), 1);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_string() {
        let (tokens, errors) = scan("\n\"oops");
        assert_eq!(errors.len(), 1);
        let err = errors[0].downcast_ref::<StringTerminationError>().expect("termination error");
        assert_eq!(err.line(), 2);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenType::EOF);
    }
}
