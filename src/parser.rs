use crate::ast::{Expr, FunctionDecl, LiteralValue, Program, Stmt};
use crate::error::{LoxError, Reporter, Span};
use crate::lexer::{Literal, Token, TokenType};
use std::rc::Rc;

/// Parameters and arguments past this count are reported, but still parsed.
pub const MAX_ARGUMENTS: usize = 255;

/// Deepest statement/expression nesting accepted before parsing gives up on
/// the construct. Keeps recursive descent inside the thread's stack.
pub const MAX_NESTING: usize = 100;

/// Raised once a syntax error has been reported; unwinds to the nearest
/// declaration so the parser can resynchronize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'r> {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    reporter: &'r mut dyn Reporter,
}

impl<'r> Parser<'r> {
    pub fn new(mut tokens: Vec<Token>, reporter: &'r mut dyn Reporter) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (line, end) = tokens
                .last()
                .map(|t| (t.line, t.span.end))
                .unwrap_or((1, 0));
            tokens.push(Token::new(TokenType::Eof, String::new(), None, line, Span::single(end)));
        }

        Self {
            tokens,
            current: 0,
            depth: 0,
            reporter,
        }
    }

    pub fn parse(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }

        Program { statements }
    }

    /// Recovery boundary: a declaration that fails to parse is dropped.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_types(&[TokenType::Class]) {
            self.class_declaration()
        } else if self.match_types(&[TokenType::Fun]) {
            self.function("function").map(|decl| Stmt::Function(Rc::new(decl)))
        } else if self.match_types(&[TokenType::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(statement) => Some(statement),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::Identifier, "Expect class name.")?.clone();
        self.consume_with_help(
            TokenType::LeftBrace,
            "Expect '{' before class body.",
            "A class body is a list of methods: class Name { method() { ... } }".to_string(),
        )?;

        let mut methods = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            methods.push(Rc::new(self.function("method")?));
        }

        self.consume(TokenType::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, methods })
    }

    fn function(&mut self, kind: &str) -> ParseResult<FunctionDecl> {
        let name = self
            .consume(TokenType::Identifier, &format!("Expect {} name.", kind))?
            .clone();
        self.consume(TokenType::LeftParen, &format!("Expect '(' after {} name.", kind))?;

        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                params.push(self.consume(TokenType::Identifier, "Expect parameter name.")?.clone());
                if params.len() == MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have 255 or more parameters.");
                }
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after parameters.")?;

        self.consume(TokenType::LeftBrace, &format!("Expect '{{' before {} body.", kind))?;
        let body = self.block()?;

        Ok(FunctionDecl { name, params, body })
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenType::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.match_types(&[TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume_with_help(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
            "Variable declarations end with ';': var name = value;".to_string(),
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_kind)
    }

    fn statement_kind(&mut self) -> ParseResult<Stmt> {
        if self.match_types(&[TokenType::For]) {
            self.for_statement()
        } else if self.match_types(&[TokenType::If]) {
            self.if_statement()
        } else if self.match_types(&[TokenType::Print]) {
            self.print_statement()
        } else if self.match_types(&[TokenType::Return]) {
            self.return_statement()
        } else if self.match_types(&[TokenType::While]) {
            self.while_statement()
        } else if self.match_types(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block {
                statements: self.block()?,
            })
        } else {
            self.expression_statement()
        }
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.declaration() {
                statements.push(statement);
            }
        }

        self.consume_with_help(
            TokenType::RightBrace,
            "Expect '}' after block.",
            "Block statements must be closed with '}' after the opening '{'.".to_string(),
        )?;
        Ok(statements)
    }

    /// `for` has no node of its own; it becomes a `while` wrapped in blocks.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_types(&[TokenType::Semicolon]) {
            None
        } else if self.match_types(&[TokenType::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenType::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenType::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![body, Stmt::Expression { expr: increment }],
            };
        }

        let condition = condition.unwrap_or(Expr::Literal {
            value: LiteralValue::Bool(true),
        });
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block {
                statements: vec![initializer, body],
            };
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume_with_help(
            TokenType::LeftParen,
            "Expect '(' after 'if'.",
            "If statements require parentheses around the condition: if (condition) { ... }".to_string(),
        )?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_types(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expr })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let value = if !self.check(TokenType::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume_with_help(
            TokenType::Semicolon,
            "Expect ';' after expression.",
            "Every statement ends with ';'.".to_string(),
        )?;
        Ok(Stmt::Expression { expr })
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_types(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = Box::new(self.nested(Self::assignment)?);

            return match expr {
                Expr::Variable { name } => Ok(Expr::Assign { name, value }),
                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value,
                }),
                other => {
                    // Reported, not raised: the left side stands and parsing goes on.
                    self.error(&equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        self.left_fold(&[TokenType::Or], Self::and)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        self.left_fold(&[TokenType::And], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_fold(&[TokenType::BangEqual, TokenType::EqualEqual], Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_fold(
            &[
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_fold(&[TokenType::Minus, TokenType::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_fold(&[TokenType::Slash, TokenType::Star], Self::unary)
    }

    /// Runs `parse` one nesting level deeper, refusing once the limit is hit.
    fn nested<T>(&mut self, parse: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            let token = self.peek().clone();
            return Err(self.error_with_help(
                &token,
                "Too much nesting.",
                "Split deeply nested expressions or blocks into smaller pieces.",
            ));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// One left-associative binary level: `operand (op operand)*`.
    fn left_fold(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while self.match_types(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let operator = self.previous().clone();
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_types(&[TokenType::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.match_types(&[TokenType::Dot]) {
                let name = self
                    .consume(TokenType::Identifier, "Expect property name after '.'.")?
                    .clone();
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenType::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if arguments.len() == MAX_ARGUMENTS {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have 255 or more arguments.");
                }
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let paren = self
            .consume_with_help(
                TokenType::RightParen,
                "Expect ')' after arguments.",
                "Function calls must be closed with ')' after the arguments. Example: func(arg1, arg2)"
                    .to_string(),
            )?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();

        let expr = match token.token_type {
            TokenType::False => Expr::Literal {
                value: LiteralValue::Bool(false),
            },
            TokenType::True => Expr::Literal {
                value: LiteralValue::Bool(true),
            },
            TokenType::Nil => Expr::Literal {
                value: LiteralValue::Nil,
            },
            TokenType::Number | TokenType::String => {
                let value = match token.literal {
                    Some(Literal::Number(n)) => LiteralValue::Number(n),
                    Some(Literal::Str(s)) => LiteralValue::Str(s),
                    None => LiteralValue::Nil,
                };
                Expr::Literal { value }
            }
            TokenType::This => Expr::This { keyword: token },
            TokenType::Identifier => Expr::Variable { name: token },
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "Expect ')' after expression.",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                return Ok(Expr::Grouping {
                    expr: Box::new(expr),
                });
            }
            _ => {
                let help = match token.token_type {
                    TokenType::RightParen => "Found ')' without matching '('.",
                    TokenType::RightBrace => "Found '}' without matching '{'.",
                    TokenType::Eof => "Reached end of input while expecting an expression.",
                    _ => "Expected a literal value, variable, or parenthesized expression here.",
                };
                return Err(self.error_with_help(&token, "Expect expression.", help));
            }
        };

        self.advance();
        Ok(expr)
    }

    /// Skips tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                break;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => break,
                _ => {}
            }

            self.advance();
        }

        log::debug!(
            "parser resynchronized at line {} before '{}'",
            self.peek().line,
            self.peek().lexeme
        );
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for &token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> ParseResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            let token = self.peek().clone();
            Err(self.error(&token, message))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> ParseResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            let token = self.peek().clone();
            Err(self.error_with_help(&token, message, &help))
        }
    }

    fn error(&mut self, token: &Token, message: &str) -> ParseError {
        let error = LoxError::parse_error(token.span.clone(), token.line, message.to_string());
        self.emit(token, error)
    }

    fn error_with_help(&mut self, token: &Token, message: &str, help: &str) -> ParseError {
        let error = LoxError::parse_error_with_help(
            token.span.clone(),
            token.line,
            message.to_string(),
            help.to_string(),
        );
        self.emit(token, error)
    }

    fn emit(&mut self, token: &Token, error: LoxError) -> ParseError {
        let error = if token.token_type == TokenType::Eof {
            error
        } else {
            error.at_lexeme(&token.lexeme)
        };
        self.reporter.report(error);
        ParseError
    }
}
