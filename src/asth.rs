/// src/asth.rs
/// syntax tree produced by the parser and walked by the evaluator
use crate::token_type::{Literal, Token};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    String(String),
    Number(f64),
    Nil,
    Bool(bool),
}

impl From<Literal> for Atom {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(n) => Atom::Number(n),
            Literal::Str(s) => Atom::String(s),
            Literal::Bool(b) => Atom::Bool(b),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::String(s) => write!(f, "{s}"),
            Atom::Number(n) => {
                if *n == n.trunc() {
                    write!(f, "{n}.0")
                } else {
                    write!(f, "{n}")
                }
            },
            Atom::Nil => write!(f, "nil"),
            Atom::Bool(b) => write!(f, "{b:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Break,
    Continue,
}

/// Parameters and body shared by function declarations and function literals.
///
/// Held behind an `Rc` so that every function value created from it points at
/// the same body instead of copying the tree.
#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    /// `None` for `fun (a, b) { ... }` literals
    pub name: Option<Token>,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Atom),
    Grouping(Box<Expr>),
    Unary {
        op: Token,
        right: Box<Expr>,
    },
    /// arithmetic, comparison, equality and the comma operator
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    /// `and` / `or`
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        yes: Box<Expr>,
        no: Box<Expr>,
    },
    Variable(Token),
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        /// closing paren, for error positions
        paren: Token,
        arguments: Vec<Expr>,
    },
    Function(Rc<FunctionDecl>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `echo` marks a trailing bare expression whose value is printed (REPL style)
    Expression {
        expr: Expr,
        echo: bool,
    },
    Print(Expr),
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        yes: Box<Stmt>,
        no: Option<Box<Stmt>>,
    },
    /// `increment` is only set by `for` desugaring and runs after every iteration,
    /// including one cut short by `continue`
    While {
        cond: Expr,
        body: Box<Stmt>,
        increment: Option<Expr>,
    },
    Jump {
        keyword: Token,
        kind: Jump,
    },
    Function(Rc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Token]) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", p.lexeme)?;
    }
    write!(f, ")")
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    for s in body {
        write!(f, " {s}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(atom) => write!(f, "{atom}"),
            Expr::Grouping(inner) => write!(f, "(group {inner})"),
            Expr::Unary { op, right } => write!(f, "({} {right})", op.lexeme),
            Expr::Binary { left, op, right } | Expr::Logical { left, op, right } => {
                write!(f, "({} {left} {right})", op.lexeme)
            },
            Expr::Ternary { cond, yes, no } => write!(f, "(?: {cond} {yes} {no})"),
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
            Expr::Assign { name, value } => write!(f, "(= {} {value})", name.lexeme),
            Expr::Call { callee, arguments, .. } => {
                write!(f, "(call {callee}")?;
                for a in arguments {
                    write!(f, " {a}")?
                }
                write!(f, ")")
            },
            Expr::Function(decl) => {
                write!(f, "(fun ")?;
                write_params(f, &decl.params)?;
                write_body(f, &decl.body)?;
                write!(f, ")")
            },
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression { expr, echo: false } => write!(f, "(; {expr})"),
            Stmt::Expression { expr, echo: true } => write!(f, "(echo {expr})"),
            Stmt::Print(expr) => write!(f, "(print {expr})"),
            Stmt::Var { name, initializer: Some(init) } => write!(f, "(var {} {init})", name.lexeme),
            Stmt::Var { name, initializer: None } => write!(f, "(var {})", name.lexeme),
            Stmt::Block(statements) => {
                write!(f, "(block")?;
                write_body(f, statements)?;
                write!(f, ")")
            },
            Stmt::If { cond, yes, no } => {
                write!(f, "(if {cond} {yes}")?;
                if let Some(no) = no {
                    write!(f, " {no}")?
                }
                write!(f, ")")
            },
            Stmt::While { cond, body, increment } => {
                write!(f, "(while {cond} {body}")?;
                if let Some(increment) = increment {
                    write!(f, " {increment}")?
                }
                write!(f, ")")
            },
            Stmt::Jump { kind: Jump::Break, .. } => write!(f, "(break)"),
            Stmt::Jump { kind: Jump::Continue, .. } => write!(f, "(continue)"),
            Stmt::Function(decl) => {
                let name = decl.name.as_ref().map_or("", |n| n.lexeme.as_str());
                write!(f, "(def {name} ")?;
                write_params(f, &decl.params)?;
                write_body(f, &decl.body)?;
                write!(f, ")")
            },
            Stmt::Return { value: Some(value), .. } => write!(f, "(return {value})"),
            Stmt::Return { value: None, .. } => write!(f, "(return)"),
        }
    }
}
