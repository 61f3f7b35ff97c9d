use crate::error::EquationError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Name of the single unknown
pub const UNKNOWN: &str = "x";

/// Deepest chain of parentheses, signs and exponents accepted
pub const MAX_NESTING: usize = 64;

/// Most operator and function nodes in one equation
pub const MAX_NODES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Exp,
    Ln,
    Log,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Function::Sqrt),
            "exp" => Some(Function::Exp),
            "ln" => Some(Function::Ln),
            "log" => Some(Function::Log),
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    /// `log` is the natural logarithm, like `ln`.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Function::Sqrt => v.sqrt(),
            Function::Exp => v.exp(),
            Function::Ln | Function::Log => v.ln(),
            Function::Sin => v.sin(),
            Function::Cos => v.cos(),
            Function::Tan => v.tan(),
            Function::Abs => v.abs(),
        }
    }
}

/// Expression tree for one side of an equation
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// The unknown `x`
    Unknown,
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        arg: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// A parsed `lhs = rhs`. Input without `=` has `rhs = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

/// Recursive-descent parser for equations in `x`.
///
/// Precedence from loosest: `+ -`, `* /` and juxtaposition, unary sign, `^`
/// (right associative).
///
/// Nesting and tree size are capped at [`MAX_NESTING`] and [`MAX_NODES`] so
/// every later tree walk has bounded depth.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            nodes: 0,
        }
    }

    pub fn parse(source: &str) -> Result<Equation, EquationError> {
        let mut parser = Parser::new(Lexer::tokenize(source));
        parser.parse_equation()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), EquationError> {
        if self.peek_kind() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> EquationError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => EquationError::Parse(format!(
                "expected {expected}, found '{}' at position {}",
                t.text, t.span.start
            )),
            _ => EquationError::Parse(format!("expected {expected}, found end of input")),
        }
    }

    fn count_node(&mut self) -> Result<(), EquationError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(EquationError::Parse(format!(
                "more than {MAX_NODES} operations in one equation"
            )));
        }
        Ok(())
    }

    fn parse_equation(&mut self) -> Result<Equation, EquationError> {
        let lhs = self.parse_expr()?;

        let rhs = if self.peek_kind() == TokenKind::Eq {
            self.advance();
            self.parse_expr()?
        } else {
            Expr::Number(0.0)
        };

        match self.peek_kind() {
            TokenKind::Eof => Ok(Equation { lhs, rhs }),
            TokenKind::Eq => Err(EquationError::Parse("more than one '='".to_string())),
            _ => Err(self.unexpected("operator or end of input")),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, EquationError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr, EquationError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            self.count_node()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EquationError> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, right) = match self.peek_kind() {
                TokenKind::Star => {
                    self.advance();
                    (BinaryOp::Mul, self.parse_unary()?)
                }
                TokenKind::Slash => {
                    self.advance();
                    (BinaryOp::Div, self.parse_unary()?)
                }
                // Implicit multiplication: `2x`, `3(x + 1)`, `x sin(x)`
                TokenKind::Number | TokenKind::Ident | TokenKind::LParen => {
                    (BinaryOp::Mul, self.parse_power()?)
                }
                _ => break,
            };
            self.count_node()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Every nested operand passes through here, so this is where depth is bounded.
    fn parse_unary(&mut self) -> Result<Expr, EquationError> {
        if self.depth >= MAX_NESTING {
            return Err(EquationError::Parse(format!(
                "expression nested more than {MAX_NESTING} levels deep"
            )));
        }
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Expr, EquationError> {
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                let inner = self.parse_unary()?;
                self.count_node()?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, EquationError> {
        let base = self.parse_primary()?;

        if self.peek_kind() == TokenKind::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            self.count_node()?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EquationError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.advance().ok_or_else(|| self.unexpected("number"))?;
                let value: f64 = token
                    .text
                    .parse()
                    .map_err(|_| EquationError::Parse(format!("invalid number '{}'", token.text)))?;
                Ok(Expr::Number(value))
            }
            TokenKind::Ident => {
                let token = self.advance().ok_or_else(|| self.unexpected("identifier"))?;
                self.parse_identifier(&token)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            _ => Err(self.unexpected("number, identifier, or '('")),
        }
    }

    fn parse_identifier(&mut self, token: &Token) -> Result<Expr, EquationError> {
        let name = token.text.as_str();
        if name == UNKNOWN {
            return Ok(Expr::Unknown);
        }
        match name {
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => {}
        }

        let Some(function) = Function::from_name(name) else {
            return Err(EquationError::Parse(format!("unknown symbol '{name}'")));
        };

        self.expect(TokenKind::LParen, &format!("'(' after {name}"))?;
        let arg = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.count_node()?;
        Ok(Expr::Call {
            function,
            arg: Box::new(arg),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Expr {
        Expr::Number(v)
    }

    #[test]
    fn test_parse_equation_sides() {
        let eq = Parser::parse("x^2 + 7 = 43").unwrap();
        assert_eq!(
            eq.lhs,
            Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Pow, Expr::Unknown, num(2.0)),
                num(7.0)
            )
        );
        assert_eq!(eq.rhs, num(43.0));
    }

    #[test]
    fn test_missing_equals_means_zero() {
        let eq = Parser::parse("x - 1").unwrap();
        assert_eq!(eq.rhs, num(0.0));
    }

    #[test]
    fn test_implicit_multiplication() {
        let eq = Parser::parse("2x").unwrap();
        assert_eq!(eq.lhs, Expr::binary(BinaryOp::Mul, num(2.0), Expr::Unknown));

        // `3x^2` is `3 * (x^2)`
        let eq = Parser::parse("3x^2").unwrap();
        assert_eq!(
            eq.lhs,
            Expr::binary(
                BinaryOp::Mul,
                num(3.0),
                Expr::binary(BinaryOp::Pow, Expr::Unknown, num(2.0))
            )
        );

        let eq = Parser::parse("2(x + 1)").unwrap();
        assert!(matches!(eq.lhs, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_unary_minus_and_power() {
        // -x^2 is -(x^2)
        let eq = Parser::parse("-x^2").unwrap();
        assert_eq!(
            eq.lhs,
            Expr::Neg(Box::new(Expr::binary(BinaryOp::Pow, Expr::Unknown, num(2.0))))
        );

        // Right associative with a signed exponent
        let eq = Parser::parse("2^-x^2").unwrap();
        assert_eq!(
            eq.lhs,
            Expr::binary(
                BinaryOp::Pow,
                num(2.0),
                Expr::Neg(Box::new(Expr::binary(BinaryOp::Pow, Expr::Unknown, num(2.0))))
            )
        );
    }

    #[test]
    fn test_functions_and_constants() {
        let eq = Parser::parse("sqrt(x) = pi").unwrap();
        assert_eq!(
            eq.lhs,
            Expr::Call {
                function: Function::Sqrt,
                arg: Box::new(Expr::Unknown)
            }
        );
        assert_eq!(eq.rhs, num(std::f64::consts::PI));
    }

    #[test]
    fn test_errors() {
        for (source, fragment) in [
            ("y + 1 = 0", "unknown symbol 'y'"),
            ("X = 1", "unknown symbol 'X'"),
            ("x = 1 = 2", "more than one '='"),
            ("(x + 1", "expected ')'"),
            ("x +", "end of input"),
            ("x < 3", "found '<'"),
            ("sin x", "'(' after sin"),
            ("x # 2", "found '#'"),
            ("1.2.3x = 0", "invalid number '1.2.3'"),
        ] {
            match Parser::parse(source) {
                Err(EquationError::Parse(message)) => {
                    assert!(message.contains(fragment), "{source}: {message}")
                }
                other => panic!("{source}: expected parse error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}x{} = 1", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
        assert!(Parser::parse(&ok).is_ok());

        let deep = format!("{}x{} = 1", "(".repeat(10_000), ")".repeat(10_000));
        match Parser::parse(&deep) {
            Err(EquationError::Parse(message)) => assert!(message.contains("nested"), "{message}"),
            other => panic!("expected nesting error, got {other:?}"),
        }

        let signs = format!("{}x = 1", "-".repeat(10_000));
        assert!(matches!(Parser::parse(&signs), Err(EquationError::Parse(_))));
    }

    #[test]
    fn test_node_limit() {
        let long = vec!["x"; 100_000].join(" + ");
        match Parser::parse(&long) {
            Err(EquationError::Parse(message)) => {
                assert!(message.contains("operations"), "{message}")
            }
            other => panic!("expected size error, got {other:?}"),
        }
        assert!(Parser::parse(&vec!["x"; 100].join(" + ")).is_ok());
    }
}
