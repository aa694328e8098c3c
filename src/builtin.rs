use crate::environment::Environment;
use crate::function::{Callable, NativeFunction};
use crate::value::Value;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub type BuiltinFn = fn(&[Value]) -> Value;

/// `clock()`: seconds since the Unix epoch, with sub-second precision
pub fn clock() -> Callable {
    Callable::Native(Rc::new(NativeFunction {
        name: "clock",
        arity: 0,
        func: |_args| {
            let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
            Value::Number(elapsed.as_secs_f64())
        },
    }))
}

/// Seeds the global scope with every native function.
pub fn register(globals: &mut Environment) {
    for native in [clock()] {
        let name = native.name().to_string();
        globals.define(name, Value::Callable(native));
    }
}
