use crate::error::LoxError;
use crate::lexer::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope in the chain. Scopes are shared: a closure keeps its defining
/// scope alive after the block that created it has exited.
#[derive(Debug, Default)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_enclosing(enclosing: Rc<Environment>) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Binds `name` in this scope, replacing any earlier binding.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, LoxError> {
        if let Some(value) = self.values.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        match self.enclosing {
            Some(ref enclosing) => enclosing.get(name),
            None => Err(undefined_variable(name)),
        }
    }

    /// Writes to the nearest scope that already binds `name`.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), LoxError> {
        if let Some(slot) = self.values.borrow_mut().get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }

        match self.enclosing {
            Some(ref enclosing) => enclosing.assign(name, value),
            None => Err(undefined_variable(name)),
        }
    }

    /// The scope `distance` links up the chain, if the chain is that long.
    pub fn ancestor(self: &Rc<Self>, distance: usize) -> Option<Rc<Environment>> {
        let mut environment = Rc::clone(self);
        for _ in 0..distance {
            environment = Rc::clone(environment.enclosing.as_ref()?);
        }
        Some(environment)
    }

    /// Reads `name` from exactly the scope `distance` links up, without walking further.
    pub fn get_at(self: &Rc<Self>, distance: usize, name: &str) -> Option<Value> {
        let environment = self.ancestor(distance)?;
        let value = environment.values.borrow().get(name).cloned();
        value
    }
}

fn undefined_variable(name: &Token) -> LoxError {
    LoxError::runtime_error(
        name.span.clone(),
        name.line,
        format!("Undefined variable '{}'.", name.lexeme),
    )
}
