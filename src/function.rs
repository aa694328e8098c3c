//! Callable values: natives and user-defined functions share one contract

use crate::asth::FunctionDecl;
use crate::builtin::BuiltinFn;
use crate::environment::{child_env, EnvRef};
use crate::error::RuntimeError;
use crate::evaluator::{Evaluator, Signal};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: BuiltinFn,
}

/// A function value: the declaration plus the scope it was created in.
pub struct LoxFunction {
    pub decl: Rc<FunctionDecl>,
    pub closure: EnvRef,
}

#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
}

impl Callable {
    pub fn function(decl: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        Callable::Function(Rc::new(LoxFunction { decl, closure }))
    }

    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.decl.arity(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Native(native) => native.name,
            Callable::Function(function) => {
                function.decl.name.as_ref().map_or("anonymous", |name| name.lexeme.as_str())
            },
        }
    }

    /// Runs the callable with already evaluated arguments.
    ///
    /// The caller has checked the argument count against [`Callable::arity`].
    pub fn call(&self, evaluator: &mut Evaluator, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        match self {
            Callable::Native(native) => Ok((native.func)(&arguments)),
            Callable::Function(function) => {
                let env = child_env(&function.closure);
                {
                    let mut scope = env.borrow_mut();
                    for (param, argument) in function.decl.params.iter().zip(arguments) {
                        scope.define(param.lexeme.as_str(), argument);
                    }
                }

                match evaluator.execute_block(&function.decl.body, env)? {
                    Signal::Return(value) => Ok(value),
                    // the parser keeps break/continue from escaping a function body
                    Signal::Normal | Signal::Break | Signal::Continue => Ok(Value::Nil),
                }
            },
        }
    }

    /// identity comparison
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(function) => match &function.decl.name {
                Some(name) => write!(f, "<fn {}>", name.lexeme),
                None => write!(f, "<fn>"),
            },
        }
    }
}

// environments can hold the function that closes over them, so Debug must not recurse
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
