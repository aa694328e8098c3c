// src/parser.rs
//
// Recursive descent over a scanned token list. Every binary level below
// assignment is driven by the table in `binds`.
use crate::asth::{Atom, Expr, FunctionDecl, Jump, Stmt};
use crate::binds::{Level, Operand};
use crate::error::ParseError;
use crate::stack::ensure_sufficient_stack;
use crate::token_type::{Token, TokenType};
use std::mem;
use std::rc::Rc;

type ParseResult<T> = Result<T, ParseError>;

const MAX_ARGUMENTS: usize = 255;

/// keywords that start a statement; error recovery stops in front of them
const STATEMENT_STARTS: &[TokenType] = &[
    TokenType::CLASS,
    TokenType::FUN,
    TokenType::VAR,
    TokenType::FOR,
    TokenType::IF,
    TokenType::WHILE,
    TokenType::PRINT,
    TokenType::RETURN,
];

/// defines the Parser Struct
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// number of `while`/`for` bodies we are inside of, reset by function bodies
    loop_depth: usize,
    /// number of function bodies we are inside of
    function_depth: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    /// creates a new Parser
    ///
    /// A trailing `EOF` token is added if the list does not already end in one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenType::EOF) {
            let (line, offset) = tokens.last().map_or((1, 0), |t| (t.line, t.offset + t.lexeme.len()));
            tokens.push(Token::new(TokenType::EOF, "", line, offset));
        }

        Self { tokens, current: 0, loop_depth: 0, function_depth: 0, errors: Vec::new() }
    }

    /// Parses the whole token list.
    ///
    /// Statements that fail to parse are left out and their errors returned
    /// alongside everything that did parse.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        tracing::debug!(statements = statements.len(), errors = self.errors.len(), "parsed program");
        (statements, self.errors)
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.check(TokenType::FUN) && self.check_next(TokenType::IDENT) {
            self.advance();
            self.function_declaration()
        } else if self.matches(&[TokenType::VAR]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                tracing::debug!(line = e.line, message = %e.message, "syntax error, synchronizing");
                self.errors.push(e);
                self.synchronize();
                None
            },
        }
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::IDENT, "Expect function name.")?;
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after function name.")?;
        let decl = self.function_rest(Some(name))?;
        Ok(Stmt::Function(decl))
    }

    /// parameter list and body, starting right after the opening paren
    fn function_rest(&mut self, name: Option<Token>) -> ParseResult<Rc<FunctionDecl>> {
        let mut params = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.errors.push(ParseError::at(&token, "Can't have more than 255 parameters."));
                }

                params.push(self.consume(TokenType::IDENT, "Expect parameter name.")?);

                if !self.matches(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;
        self.consume(TokenType::LEFT_BRACE, "Expect '{' before function body.")?;

        // loops outside the function do not make `break` valid inside it
        let enclosing_loops = mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        self.loop_depth = enclosing_loops;

        Ok(Rc::new(FunctionDecl { name, params, body: body? }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::IDENT, "Expect variable name.")?;

        let initializer = if self.matches(&[TokenType::EQUAL]) { Some(self.expression()?) } else { None };

        self.consume(TokenType::SEMICOLON, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        let Some(kind) = self.match_any(&[
            TokenType::PRINT,
            TokenType::LEFT_BRACE,
            TokenType::IF,
            TokenType::WHILE,
            TokenType::FOR,
            TokenType::BREAK,
            TokenType::CONTINUE,
            TokenType::RETURN,
        ]) else {
            return self.expression_statement();
        };

        match kind {
            TokenType::PRINT => {
                let value = self.expression()?;
                self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;
                Ok(Stmt::Print(value))
            },
            TokenType::LEFT_BRACE => Ok(Stmt::Block(self.block()?)),
            TokenType::IF => self.if_statement(),
            TokenType::WHILE => self.while_statement(),
            TokenType::FOR => self.for_statement(),
            TokenType::BREAK => self.jump_statement(Jump::Break),
            TokenType::CONTINUE => self.jump_statement(Jump::Continue),
            TokenType::RETURN => self.return_statement(),
            _ => unreachable!("by the match_any list above"),
        }
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        if self.matches(&[TokenType::SEMICOLON]) {
            Ok(Stmt::Expression { expr, echo: false })
        } else if self.is_at_end() {
            // trailing bare expression: the REPL prints its value
            Ok(Stmt::Expression { expr, echo: true })
        } else {
            Err(self.error_at_peek("Expect ';' after expression."))
        }
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let cond = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let yes = Box::new(self.statement()?);
        let no = if self.matches(&[TokenType::ELSE]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If { cond, yes, no })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let cond = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;

        let body = self.loop_body()?;
        Ok(Stmt::While { cond, body: Box::new(body), increment: None })
    }

    /// `for (init; cond; incr) body` becomes `{ init; while (cond) body }` with
    /// `incr` attached to the loop, so it also runs after a `continue`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenType::SEMICOLON]) {
            None
        } else if self.matches(&[TokenType::VAR]) {
            Some(self.var_declaration()?)
        } else {
            let expr = self.expression()?;
            self.consume(TokenType::SEMICOLON, "Expect ';' after loop initializer.")?;
            Some(Stmt::Expression { expr, echo: false })
        };

        let cond = if self.check(TokenType::SEMICOLON) { None } else { Some(self.expression()?) };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenType::RIGHT_PAREN) { None } else { Some(self.expression()?) };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let body = self.loop_body()?;

        let looped = Stmt::While {
            cond: cond.unwrap_or(Expr::Literal(Atom::Bool(true))),
            body: Box::new(body),
            increment,
        };

        Ok(match initializer {
            Some(init) => Stmt::Block(vec![init, looped]),
            None => looped,
        })
    }

    fn loop_body(&mut self) -> ParseResult<Stmt> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn jump_statement(&mut self, kind: Jump) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        if self.loop_depth == 0 {
            return Err(ParseError::at(&keyword, format!("{} without enclosing loop.", keyword.lexeme)));
        }

        self.consume(TokenType::SEMICOLON, &format!("Expect ';' after '{}'.", keyword.lexeme))?;
        Ok(Stmt::Jump { keyword, kind })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        if self.function_depth == 0 {
            return Err(ParseError::at(&keyword, "Can't return from top-level code."));
        }

        let value = if self.check(TokenType::SEMICOLON) { None } else { Some(self.expression()?) };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    /// comma expression: evaluates left to right and keeps the last value
    fn expression(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.comma())
    }

    fn comma(&mut self) -> ParseResult<Expr> {
        let mut expr = self.assignment()?;

        while self.matches(&[TokenType::COMMA]) {
            let op = self.previous().clone();
            let right = self.assignment()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.binary(Level::Or)?;

        if self
            .match_any(&[
                TokenType::EQUAL,
                TokenType::PLUS_EQUAL,
                TokenType::MINUS_EQUAL,
                TokenType::STAR_EQUAL,
                TokenType::SLASH_EQUAL,
            ])
            .is_some()
        {
            let op = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable(name) = &expr {
                let value = match op.kind.compound_base() {
                    Some((kind, lexeme)) => Expr::Binary {
                        left: Box::new(expr.clone()),
                        op: Token::synthetic(kind, lexeme, &op),
                        right: Box::new(value),
                    },
                    None => value,
                };

                return Ok(Expr::Assign { name: name.clone(), value: Box::new(value) });
            }

            // reported, but parsing carries on
            self.errors.push(ParseError::at(&op, "Invalid assignment target."));
        }

        Ok(expr)
    }

    fn binary(&mut self, level: Level) -> ParseResult<Expr> {
        let mut expr = self.operand(level)?;

        while self.matches(level.operators()) {
            let op = self.previous().clone();
            let right = self.operand(level)?;

            expr = if level.is_logical() {
                Expr::Logical { left: Box::new(expr), op, right: Box::new(right) }
            } else {
                Expr::Binary { left: Box::new(expr), op, right: Box::new(right) }
            };
        }

        Ok(expr)
    }

    fn operand(&mut self, level: Level) -> ParseResult<Expr> {
        match level.operand() {
            Operand::Level(next) => self.binary(next),
            Operand::Ternary => self.ternary(),
            Operand::Unary => self.unary(),
        }
    }

    /// `cond ? yes : no`, right-associative through the else arm
    fn ternary(&mut self) -> ParseResult<Expr> {
        let cond = self.binary(Level::Comparison)?;

        if !self.matches(&[TokenType::QUESTION]) {
            return Ok(cond);
        }

        let yes = self.binary(Level::Comparison)?;
        self.consume(TokenType::COLON, "Expect ':' after then branch of ternary expression.")?;
        let no = self.ternary()?;

        Ok(Expr::Ternary { cond: Box::new(cond), yes: Box::new(yes), no: Box::new(no) })
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenType::BANG, TokenType::MINUS]) {
            let op = self.previous().clone();
            let right = ensure_sufficient_stack(|| self.unary())?;
            return Ok(Expr::Unary { op, right: Box::new(right) });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.matches(&[TokenType::LEFT_PAREN]) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.errors.push(ParseError::at(&token, "Can't have more than 255 arguments."));
                }

                // arguments sit above the comma operator
                arguments.push(self.assignment()?);

                if !self.matches(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;
        Ok(Expr::Call { callee: Box::new(callee), paren, arguments })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();

        if !matches!(
            token.kind,
            TokenType::FALSE
                | TokenType::TRUE
                | TokenType::NIL
                | TokenType::NUMBER
                | TokenType::STRING
                | TokenType::IDENT
                | TokenType::LEFT_PAREN
                | TokenType::FUN
        ) {
            // the offending token is left for synchronize
            return Err(ParseError::at(&token, "Expect expression."));
        }
        self.advance();

        let expr = match token.kind {
            TokenType::FALSE => Expr::Literal(Atom::Bool(false)),
            TokenType::TRUE => Expr::Literal(Atom::Bool(true)),
            TokenType::NIL => Expr::Literal(Atom::Nil),
            TokenType::NUMBER | TokenType::STRING => {
                Expr::Literal(token.literal.map_or(Atom::Nil, Atom::from))
            },
            TokenType::IDENT => Expr::Variable(token),
            TokenType::LEFT_PAREN => {
                let inner = self.expression()?;
                self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;
                Expr::Grouping(Box::new(inner))
            },
            TokenType::FUN => {
                self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'fun'.")?;
                Expr::Function(self.function_rest(None)?)
            },
            _ => unreachable!("checked above"),
        };

        Ok(expr)
    }

    /// Discards tokens until the next statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenType::SEMICOLON {
                return;
            }

            if STATEMENT_STARTS.contains(&self.peek().kind) {
                return;
            }

            self.advance();
        }
    }

    fn match_any(&mut self, kinds: &[TokenType]) -> Option<TokenType> {
        let kind = self.peek().kind;
        if !self.is_at_end() && kinds.contains(&kind) {
            self.advance();
            Some(kind)
        } else {
            None
        }
    }

    fn matches(&mut self, kinds: &[TokenType]) -> bool {
        self.match_any(kinds).is_some()
    }

    fn consume(&mut self, kind: TokenType, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error_at_peek(message))
    }

    fn error_at_peek(&self, message: &str) -> ParseError {
        ParseError::at(self.peek(), message)
    }

    fn check(&self, kind: TokenType) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn check_next(&self, kind: TokenType) -> bool {
        self.tokens.get(self.current + 1).is_some_and(|t| t.kind == kind)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::EOF
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}
