//! Precedence table for the left-associative binary levels of the grammar.
//!
//! From loosest to tightest:
//! `or` → `and` → equality → ternary → comparison → term → factor → unary.
//! The ternary level is not a plain binary level; [`Level::operand`] reports
//! where the parser has to step out of the table.
use crate::token_type::TokenType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
}

/// what sits directly below a binary level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Level(Level),
    Ternary,
    Unary,
}

impl Level {
    pub fn operators(self) -> &'static [TokenType] {
        match self {
            Level::Or => &[TokenType::OR],
            Level::And => &[TokenType::AND],
            Level::Equality => &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Level::Comparison => &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Level::Term => &[TokenType::MINUS, TokenType::PLUS],
            Level::Factor => &[TokenType::SLASH, TokenType::STAR],
        }
    }

    pub fn operand(self) -> Operand {
        match self {
            Level::Or => Operand::Level(Level::And),
            Level::And => Operand::Level(Level::Equality),
            Level::Equality => Operand::Ternary,
            Level::Comparison => Operand::Level(Level::Term),
            Level::Term => Operand::Level(Level::Factor),
            Level::Factor => Operand::Unary,
        }
    }

    /// `and` / `or` build short-circuiting logical nodes instead of binary ones
    pub fn is_logical(self) -> bool {
        matches!(self, Level::Or | Level::And)
    }
}
