use crate::ast::{Expr, Program, Stmt};
use crate::callable::{Callable, LoxClass, LoxFunction, NativeFunction};
use crate::environment::Environment;
use crate::error::{LoxError, Span};
use crate::lexer::{Token, TokenType};
use crate::value::Value;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Deepest chain of active calls before the evaluator reports a stack overflow.
pub const MAX_CALL_DEPTH: usize = 64;

/// How a statement finished. `Return` unwinds to the enclosing function call,
/// keeping the `return` keyword for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return { value: Value, keyword: Token },
}

pub struct Evaluator {
    globals: Rc<Environment>,
    environment: Rc<Environment>,
    output: Box<dyn Write>,
    call_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Evaluator whose `print` statements write to `output`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        globals.define(
            "clock",
            Value::Native(Rc::new(NativeFunction::new("clock", 0, native_clock))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            output,
            call_depth: 0,
        }
    }

    pub fn globals(&self) -> &Rc<Environment> {
        &self.globals
    }

    pub fn interpret(&mut self, program: &Program) -> Result<(), LoxError> {
        for statement in &program.statements {
            if let Flow::Return { keyword, .. } = self.execute(statement)? {
                return Err(runtime_error(&keyword, "Can't return from top-level code."));
            }
        }
        self.output.flush().map_err(output_error)?;
        Ok(())
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow, LoxError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
            }
            Stmt::Print { expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value).map_err(output_error)?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
            }
            Stmt::Block { statements } => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                return self.execute_block(statements, environment);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Return { .. } = self.execute(body)? {
                        return Ok(flow);
                    }
                }
            }
            Stmt::Function(declaration) => {
                let function =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);
                self.environment
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
            }
            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return {
                    value,
                    keyword: keyword.clone(),
                });
            }
            Stmt::Class { name, methods } => {
                let mut table = HashMap::new();
                for method in methods {
                    let is_initializer = method.name.lexeme == "init";
                    let function = LoxFunction::new(
                        Rc::clone(method),
                        Rc::clone(&self.environment),
                        is_initializer,
                    );
                    table.insert(method.name.lexeme.clone(), Rc::new(function));
                }

                let class = LoxClass::new(&name.lexeme, None, table);
                self.environment
                    .define(&name.lexeme, Value::Class(Rc::new(class)));
            }
        }

        Ok(Flow::Normal)
    }

    /// Runs `statements` in `environment`, restoring the current scope on
    /// every exit path. Stops early when a statement returns.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<Environment>,
    ) -> Result<Flow, LoxError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, LoxError> {
        match expr {
            Expr::Literal { value } => Ok(Value::from(value)),
            Expr::Grouping { expr } => self.evaluate(expr),
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand)?;
                match operator.token_type {
                    TokenType::Minus => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(runtime_error(operator, "Operand must be a number.")),
                    },
                    TokenType::Bang => Ok(Value::Bool(!operand.is_truthy())),
                    _ => Err(runtime_error(operator, "Unknown unary operator.")),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                // `and` / `or` yield whichever operand decided the result
                match operator.token_type {
                    TokenType::Or if left.is_truthy() => return Ok(left),
                    TokenType::And if !left.is_truthy() => return Ok(left),
                    TokenType::Or | TokenType::And => return self.evaluate(right),
                    _ => {}
                }

                let right = self.evaluate(right)?;
                binary_op(operator, left, right)
            }
            Expr::Variable { name } => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                other => Err(runtime_error_with_help(
                    name,
                    "Only instances have properties.",
                    format!("Tried to read '{}' from a {}.", name.lexeme, other.type_name()),
                )),
            },
            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;
                    instance.set(name, value.clone());
                    Ok(value)
                }
                other => Err(runtime_error_with_help(
                    name,
                    "Only instances have fields.",
                    format!("Tried to set '{}' on a {}.", name.lexeme, other.type_name()),
                )),
            },
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let callable: &dyn Callable = match &callee {
                    Value::Function(function) => function.as_ref() as &dyn Callable,
                    Value::Native(native) => native.as_ref() as &dyn Callable,
                    Value::Class(class) => class as &dyn Callable,
                    _ => {
                        return Err(runtime_error(paren, "Can only call functions and classes."))
                    }
                };

                if values.len() != callable.arity() {
                    return Err(runtime_error(
                        paren,
                        &format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(runtime_error_with_help(
                        paren,
                        "Stack overflow.",
                        format!("More than {} calls were active at once.", MAX_CALL_DEPTH),
                    ));
                }

                self.call_depth += 1;
                let result = callable.call(self, values);
                self.call_depth -= 1;
                result
            }
            Expr::This { keyword } => self.environment.get(keyword),
        }
    }
}

fn binary_op(operator: &Token, left: Value, right: Value) -> Result<Value, LoxError> {
    match operator.token_type {
        TokenType::Plus => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
            (l, r) => Err(runtime_error_with_help(
                operator,
                "Operands must be two numbers or two strings.",
                format!("Cannot add {} and {}.", l.type_name(), r.type_name()),
            )),
        },
        TokenType::Minus => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(l - r))
        }
        TokenType::Star => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(l * r))
        }
        TokenType::Slash => {
            let (l, r) = number_operands(operator, &left, &right)?;
            if r == 0.0 {
                Err(runtime_error(operator, "Division by zero"))
            } else {
                Ok(Value::Number(l / r))
            }
        }
        TokenType::Greater => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(l > r))
        }
        TokenType::GreaterEqual => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(l >= r))
        }
        TokenType::Less => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(l < r))
        }
        TokenType::LessEqual => {
            let (l, r) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(l <= r))
        }
        TokenType::EqualEqual => Ok(Value::Bool(left == right)),
        TokenType::BangEqual => Ok(Value::Bool(left != right)),
        _ => Err(runtime_error(operator, "Unknown binary operator.")),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64), LoxError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(runtime_error_with_help(
            operator,
            "Operands must be numbers.",
            format!(
                "'{}' got {} and {}.",
                operator.lexeme,
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

fn runtime_error(token: &Token, message: &str) -> LoxError {
    LoxError::runtime_error(token.span.clone(), token.line, message.to_string())
}

fn runtime_error_with_help(token: &Token, message: &str, help: String) -> LoxError {
    LoxError::runtime_error_with_help(token.span.clone(), token.line, message.to_string(), help)
}

fn output_error(error: io::Error) -> LoxError {
    LoxError::runtime_error(Span::single(0), 0, format!("Failed to write output: {}", error))
}

fn native_clock(_arguments: &[Value]) -> Value {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    Value::Number(seconds)
}
