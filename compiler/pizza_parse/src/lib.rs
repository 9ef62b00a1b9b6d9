//! Recursive descent parser for Pizza.
//!
//! Binary expressions use Pratt precedence climbing over a dynamic operator
//! table: the table starts with the built-in operators and grows at runtime
//! when a `base binary<op> …` definition is lowered successfully, so later
//! source lines observe the new operator. The parser holds a single cooked
//! token of lookahead shared with the lexer.
//!
//! Every parse function returns `Result`; the driver reports a failure as
//! one `LogError:` line, consumes one token, and re-enters its loop.

mod op_table;

use std::fmt;

use pizza_ast::{Expr, Function, Prototype, PrototypeKind};
use pizza_lexer::{Token, TokenStream};

pub use op_table::OperatorTable;

/// A parse failure, reported to the user as `LogError: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parser state: the token source, one token of lookahead, and the
/// operator-precedence table.
pub struct Parser {
    tokens: TokenStream,
    cur: Token,
    ops: OperatorTable,
}

impl Parser {
    /// Create a parser over a token stream. The lookahead starts out as
    /// `Eof`; callers must [`bump`](Parser::bump) once before parsing (the
    /// driver prints its prompt first, then primes).
    pub fn new(tokens: TokenStream) -> Self {
        Parser {
            tokens,
            cur: Token::Eof,
            ops: OperatorTable::new(),
        }
    }

    /// The current lookahead token.
    pub fn current(&self) -> &Token {
        &self.cur
    }

    /// Advance to the next token.
    pub fn bump(&mut self) -> &Token {
        self.cur = self.tokens.next_token();
        &self.cur
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.ops
    }

    /// Mutable access for the code generator, which registers user-defined
    /// binary operators while lowering their definitions.
    pub fn operators_mut(&mut self) -> &mut OperatorTable {
        &mut self.ops
    }

    /// `base <prototype> <expr>`.
    pub fn parse_definition(&mut self) -> Result<Function, ParseError> {
        self.bump();
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function::new(proto, body))
    }

    /// `sauce <prototype>`.
    pub fn parse_extern(&mut self) -> Result<Prototype, ParseError> {
        self.bump();
        self.parse_prototype()
    }

    /// Any expression, including binary operator chains.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_unary()?;
        self.parse_binop_rhs(0, lhs)
    }

    /// Precedence of the lookahead when it is a declared binary operator.
    fn tok_precedence(&self) -> Option<i32> {
        match self.cur {
            Token::Raw(c) => self.ops.precedence(c),
            _ => None,
        }
    }

    fn parse_binop_rhs(&mut self, min_prec: i32, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            let Some(tok_prec) = self.tok_precedence() else {
                return Ok(lhs);
            };
            if tok_prec < min_prec {
                return Ok(lhs);
            }
            let op = match self.cur {
                Token::Raw(c) => c,
                _ => return Ok(lhs),
            };
            self.bump();

            let mut rhs = self.parse_unary()?;

            // If the operator after the right-hand side binds tighter, let
            // it take the right-hand side first.
            let next_prec = self.tok_precedence().unwrap_or(-1);
            if tok_prec < next_prec {
                rhs = self.parse_binop_rhs(tok_prec + 1, rhs)?;
            }

            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    /// A raw operator character other than `(`, `,`, `{` prefixes a unary
    /// expression; anything else is a primary.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.cur {
            Token::Raw(c) if c != '(' && c != ',' && c != '{' => {
                self.bump();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    opcode: c,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.cur {
            Token::Identifier(_) => self.parse_identifier_expr(),
            Token::Number(_) => self.parse_number_expr(),
            Token::Raw('(') => self.parse_paren_expr(),
            Token::Raw('{') => self.parse_scope_expr(),
            Token::If => self.parse_if_expr(),
            Token::For => self.parse_for_expr(),
            Token::Topping => self.parse_var_expr(),
            _ => Err(ParseError::new(
                "unknown token when expecting an expression",
            )),
        }
    }

    fn ident(&self) -> Option<String> {
        match &self.cur {
            Token::Identifier(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn raw_char(&self) -> Option<char> {
        match self.cur {
            Token::Raw(c) => Some(c),
            _ => None,
        }
    }

    fn expect_raw(&mut self, c: char, message: &str) -> Result<(), ParseError> {
        if self.raw_char() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(ParseError::new(message))
        }
    }

    /// Variable reference, or call when a `(` follows the identifier.
    fn parse_identifier_expr(&mut self) -> Result<Expr, ParseError> {
        let name = self
            .ident()
            .ok_or_else(|| ParseError::new("expected identifier"))?;
        self.bump();

        if self.raw_char() != Some('(') {
            return Ok(Expr::Variable(name));
        }
        self.bump();

        let mut args = Vec::new();
        if self.raw_char() != Some(')') {
            loop {
                args.push(self.parse_expression()?);
                if self.raw_char() == Some(')') {
                    break;
                }
                self.expect_raw(',', "Expected ')' or ',' in argument list")?;
            }
        }
        self.bump();

        Ok(Expr::Call { callee: name, args })
    }

    fn parse_number_expr(&mut self) -> Result<Expr, ParseError> {
        let value = match self.cur {
            Token::Number(v) => v,
            _ => return Err(ParseError::new("expected number")),
        };
        self.bump();
        Ok(Expr::Number(value))
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        let inner = self.parse_expression()?;
        self.expect_raw(')', "expected ')'")?;
        Ok(inner)
    }

    /// `{ expr; expr; … }`. Each sub-expression must be followed by `;` or
    /// by the closing `}`; a trailing `;` is allowed.
    fn parse_scope_expr(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        let mut body = Vec::new();
        while self.raw_char() != Some('}') {
            if self.cur == Token::Eof {
                return Err(ParseError::new("expected '}' at end of scope block"));
            }
            body.push(self.parse_expression()?);
            match self.raw_char() {
                Some(';') => {
                    self.bump();
                }
                Some('}') => break,
                _ => return Err(ParseError::new("expected ';' or '}' in scope block")),
            }
        }
        self.bump();
        Ok(Expr::Scope(body))
    }

    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        let cond = self.parse_expression()?;

        if self.cur != Token::Then {
            return Err(ParseError::new("expected then"));
        }
        self.bump();
        let then_branch = self.parse_expression()?;

        if self.cur != Token::Else {
            return Err(ParseError::new("expected else"));
        }
        self.bump();
        let else_branch = self.parse_expression()?;

        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `for id = start, end [, step] in body`.
    fn parse_for_expr(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        let var = self
            .ident()
            .ok_or_else(|| ParseError::new("expected identifier after for"))?;
        self.bump();

        self.expect_raw('=', "expected '=' after for")?;
        let start = self.parse_expression()?;

        self.expect_raw(',', "expected ',' after for start value")?;
        let end = self.parse_expression()?;

        let step = if self.raw_char() == Some(',') {
            self.bump();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        if self.cur != Token::In {
            return Err(ParseError::new("expected 'in' after for"));
        }
        self.bump();
        let body = self.parse_expression()?;

        Ok(Expr::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
        })
    }

    /// `topping a[=init](, b[=init])* [in body]`.
    fn parse_var_expr(&mut self) -> Result<Expr, ParseError> {
        self.bump();
        if self.ident().is_none() {
            return Err(ParseError::new("expected identifier after topping"));
        }

        let mut bindings = Vec::new();
        loop {
            let name = self
                .ident()
                .ok_or_else(|| ParseError::new("expected identifier list after topping"))?;
            self.bump();

            let init = if self.raw_char() == Some('=') {
                self.bump();
                Some(self.parse_expression()?)
            } else {
                None
            };
            bindings.push((name, init));

            if self.raw_char() != Some(',') {
                break;
            }
            self.bump();
        }

        let body = if self.cur == Token::In {
            self.bump();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expr::Var { bindings, body })
    }

    /// `name(a b c)` | `unary<op>(a)` | `binary<op> [prec](a b)`.
    /// Parameter names are whitespace-separated.
    fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        enum ProtoShape {
            Plain,
            Unary,
            Binary(u32),
        }

        let (name, shape) = match &self.cur {
            Token::Identifier(name) => {
                let name = name.clone();
                self.bump();
                (name, ProtoShape::Plain)
            }
            Token::Unary => {
                self.bump();
                let op = self
                    .raw_char()
                    .ok_or_else(|| ParseError::new("Expected unary operator"))?;
                self.bump();
                (format!("unary{op}"), ProtoShape::Unary)
            }
            Token::Binary => {
                self.bump();
                let op = self
                    .raw_char()
                    .ok_or_else(|| ParseError::new("Expected binary operator"))?;
                self.bump();

                let precedence = match self.cur {
                    Token::Number(value) => {
                        if !(1.0..=100.0).contains(&value) {
                            return Err(ParseError::new("Invalid precedence: must be 1..100"));
                        }
                        self.bump();
                        value as u32
                    }
                    _ => 30,
                };
                (format!("binary{op}"), ProtoShape::Binary(precedence))
            }
            _ => return Err(ParseError::new("Expected function name in prototype")),
        };

        self.expect_raw('(', "Expected '(' in prototype")?;
        let mut params = Vec::new();
        while let Some(param) = self.ident() {
            params.push(param);
            self.bump();
        }
        if self.raw_char() != Some(')') {
            return Err(ParseError::new("Expected ')' in prototype"));
        }
        self.bump();

        let kind = match shape {
            ProtoShape::Plain => PrototypeKind::Function,
            ProtoShape::Unary => {
                if params.len() != 1 {
                    return Err(ParseError::new("Invalid number of operands for operator"));
                }
                PrototypeKind::UnaryOp
            }
            ProtoShape::Binary(precedence) => {
                if params.len() != 2 {
                    return Err(ParseError::new("Invalid number of operands for operator"));
                }
                PrototypeKind::BinaryOp { precedence }
            }
        };

        Ok(Prototype::new(name, params, kind))
    }
}
