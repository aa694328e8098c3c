//! in src/evaluator.rs
//!
//! Walks the syntax tree against a chain of environments.

use crate::asth::{Expr, Jump, Stmt};
use crate::builtin;
use crate::config::Config;
use crate::environment::{child_env, EnvRef, Environment};
use crate::error::RuntimeError;
use crate::function::Callable;
use crate::output::Output;
use crate::stack::ensure_sufficient_stack;
use crate::token_type::{Token, TokenType};
use crate::value::Value;
use std::rc::Rc;

/// How a statement finished.
///
/// Every statement returns one; sequences stop at the first non-`Normal`
/// signal and hand it to their caller. Loops consume `Break`/`Continue`,
/// function calls consume `Return`.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub type Exec = Result<Signal, RuntimeError>;
pub type Eval = Result<Value, RuntimeError>;

/// Contains the evaluator that walks the AST to form the result
pub struct Evaluator {
    globals: EnvRef,
    /// innermost scope of whatever is executing right now
    environment: EnvRef,
    output: Output,
    config: Config,
    call_depth: usize,
}

impl Evaluator {
    /// Creates an evaluator whose global scope already holds the natives.
    pub fn new(config: Config, output: Output) -> Self {
        let mut globals = Environment::new();
        builtin::register(&mut globals);
        let globals = globals.into_ref();

        Self { environment: Rc::clone(&globals), globals, output, config, call_depth: 0 }
    }

    /// default config, printing into a buffer
    pub fn buffered() -> Self {
        Self::new(Config::default(), Output::buffer())
    }

    pub fn globals(&self) -> EnvRef {
        Rc::clone(&self.globals)
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Executes statements in order, stopping at the first runtime error.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = statements.len()))]
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                tracing::debug!(line = e.line, kind = ?e.kind, "runtime error, aborting run");
                return Err(e);
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Exec {
        ensure_sufficient_stack(|| self.execute_inner(stmt))
    }

    fn execute_inner(&mut self, stmt: &Stmt) -> Exec {
        match stmt {
            Stmt::Expression { expr, echo } => {
                let value = self.evaluate(expr)?;
                if *echo {
                    self.output.println(&value.to_string());
                }
                Ok(Signal::Normal)
            },
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.println(&value.to_string());
                Ok(Signal::Normal)
            },
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.lexeme.as_str(), value);
                Ok(Signal::Normal)
            },
            Stmt::Block(statements) => {
                let scope = child_env(&self.environment);
                self.execute_block(statements, scope)
            },
            Stmt::If { cond, yes, no } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.execute(yes)
                } else if let Some(no) = no {
                    self.execute(no)
                } else {
                    Ok(Signal::Normal)
                }
            },
            Stmt::While { cond, body, increment } => {
                while self.evaluate(cond)?.is_truthy() {
                    match self.execute(body)? {
                        Signal::Break => break,
                        Signal::Return(value) => return Ok(Signal::Return(value)),
                        Signal::Normal | Signal::Continue => {},
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }
                Ok(Signal::Normal)
            },
            Stmt::Jump { kind: Jump::Break, .. } => Ok(Signal::Break),
            Stmt::Jump { kind: Jump::Continue, .. } => Ok(Signal::Continue),
            Stmt::Function(decl) => {
                let function = Callable::function(Rc::clone(decl), Rc::clone(&self.environment));
                let name = decl.name.as_ref().map_or("", |n| n.lexeme.as_str());
                self.environment.borrow_mut().define(name, Value::Callable(function));
                Ok(Signal::Normal)
            },
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            },
        }
    }

    /// Runs `statements` with `scope` as the current environment.
    ///
    /// The previous environment is restored whichever way the block ends.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], scope: EnvRef) -> Exec {
        let previous = std::mem::replace(&mut self.environment, scope);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Exec {
        for stmt in statements {
            match self.execute(stmt)? {
                Signal::Normal => {},
                signal => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> Eval {
        ensure_sufficient_stack(|| self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> Eval {
        match expr {
            Expr::Literal(atom) => Ok(Value::from(atom)),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, right } => {
                let right = self.evaluate(right)?;
                match op.kind {
                    TokenType::MINUS => match right.as_number() {
                        Some(n) => Ok(Value::Number(-n)),
                        None => Err(RuntimeError::operand_must_be_number(op)),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!("parser only builds unary - and !"),
                }
            },
            Expr::Binary { left, op, right } if op.kind == TokenType::COMMA => {
                self.evaluate(left)?;
                self.evaluate(right)
            },
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(op, left, right)
            },
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left)?;
                let decided = match op.kind {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            },
            Expr::Ternary { cond, yes, no } => {
                // all three operands are evaluated before choosing
                let cond = self.evaluate(cond)?;
                let yes = self.evaluate(yes)?;
                let no = self.evaluate(no)?;

                Ok(match (&yes, &no) {
                    (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_)) => {
                        if cond.is_truthy() {
                            yes
                        } else {
                            no
                        }
                    },
                    _ => Value::Nil,
                })
            },
            Expr::Variable(name) => {
                let value = self.environment.borrow().get(&name.lexeme);
                value.ok_or_else(|| RuntimeError::undefined_variable(name))
            },
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                let assigned = self.environment.borrow_mut().assign(&name.lexeme, value.clone());
                if assigned {
                    Ok(value)
                } else {
                    Err(RuntimeError::undefined_variable(name))
                }
            },
            Expr::Call { callee, paren, arguments } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call(callee, paren, values)
            },
            Expr::Function(decl) => {
                Ok(Value::Callable(Callable::function(Rc::clone(decl), Rc::clone(&self.environment))))
            },
        }
    }

    fn call(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> Eval {
        let function = match callee {
            Value::Callable(function) => function,
            other => {
                tracing::debug!(callee = other.type_name(), line = paren.line, "call on a non-callable value");
                return Err(RuntimeError::not_callable(paren));
            },
        };

        if arguments.len() != function.arity() {
            return Err(RuntimeError::arity_mismatch(paren, function.arity(), arguments.len()));
        }

        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::stack_overflow(paren));
        }

        tracing::trace!(function = %function, depth = self.call_depth, "call");

        self.call_depth += 1;
        let result = function.call(self, arguments);
        self.call_depth -= 1;
        result
    }
}

fn binary(op: &Token, left: Value, right: Value) -> Eval {
    let value = match op.kind {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(a), Value::String(b)) => Value::String(a + &b),
            _ => return Err(RuntimeError::operands_must_be_numbers_or_strings(op)),
        },
        TokenType::EQUAL_EQUAL => Value::Bool(left == right),
        TokenType::BANG_EQUAL => Value::Bool(left != right),
        _ => {
            let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
                return Err(RuntimeError::operands_must_be_numbers(op));
            };

            match op.kind {
                TokenType::MINUS => Value::Number(a - b),
                TokenType::STAR => Value::Number(a * b),
                TokenType::SLASH => Value::Number(a / b),
                TokenType::GREATER => Value::Bool(a > b),
                TokenType::GREATER_EQUAL => Value::Bool(a >= b),
                TokenType::LESS => Value::Bool(a < b),
                TokenType::LESS_EQUAL => Value::Bool(a <= b),
                _ => unreachable!("parser never builds binary {:?}", op.kind),
            }
        },
    };

    Ok(value)
}
