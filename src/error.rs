//! Syntax and runtime diagnostics

use crate::token_type::{Token, TokenType};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

fn token_span(token: &Token) -> SourceSpan {
    SourceSpan::from(token.span())
}

/// A grammar rule failed to match.
///
/// Reported and recovered from; the statement it occurred in is dropped.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
#[diagnostic(code(lox::parse))]
pub struct ParseError {
    pub line: usize,
    /// ` at 'lexeme'` or ` at end`
    pub location: String,
    pub message: String,

    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        let location = match token.kind {
            TokenType::EOF => " at end".to_string(),
            _ => format!(" at '{}'", token.lexeme),
        };
        ParseError { line: token.line, location, message: message.into(), span: token_span(token) }
    }
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeError,
    UndefinedVariable,
    NotCallable,
    ArityMismatch,
    /// call depth exceeded `Config::max_call_depth`
    StackOverflow,
}

/// Runtime error during interpretation; aborts the current run.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
#[error("{message}\n[line {line}]")]
#[diagnostic(code(lox::runtime))]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,

    #[label("here")]
    pub span: SourceSpan,
}

impl RuntimeError {
    fn new(kind: ErrorKind, token: &Token, message: String) -> Self {
        RuntimeError { kind, message, line: token.line, span: token_span(token) }
    }

    pub fn operand_must_be_number(op: &Token) -> Self {
        Self::new(
            ErrorKind::TypeError,
            op,
            format!("Operator '{}': operand must be a number.", op.lexeme),
        )
    }

    pub fn operands_must_be_numbers(op: &Token) -> Self {
        Self::new(
            ErrorKind::TypeError,
            op,
            format!("Operator '{}': operands must be numbers.", op.lexeme),
        )
    }

    pub fn operands_must_be_numbers_or_strings(op: &Token) -> Self {
        Self::new(
            ErrorKind::TypeError,
            op,
            format!("Operator '{}': operands must be two numbers or two strings.", op.lexeme),
        )
    }

    pub fn undefined_variable(name: &Token) -> Self {
        Self::new(ErrorKind::UndefinedVariable, name, format!("Undefined variable '{}'.", name.lexeme))
    }

    pub fn not_callable(paren: &Token) -> Self {
        Self::new(ErrorKind::NotCallable, paren, "Can only call functions.".to_string())
    }

    pub fn arity_mismatch(paren: &Token, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            paren,
            format!("Wrong number of arguments: expected {expected} but got {got}."),
        )
    }

    pub fn stack_overflow(paren: &Token) -> Self {
        Self::new(ErrorKind::StackOverflow, paren, "Stack overflow.".to_string())
    }
}
