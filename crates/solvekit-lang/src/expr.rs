use tracing::debug;

use crate::error::LpError;
use crate::lexer::{Lexer, Token, TokenKind};

/// One variable with its accumulated coefficient.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Spelling of the first occurrence
    pub name: String,
    pub coefficient: f64,
}

/// A sparse linear expression keyed by case-insensitive variable name.
///
/// Terms keep the order in which their variables first appeared.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    terms: Vec<Term>,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a whole string as one additive expression.
    pub fn parse(source: &str) -> Result<Self, LpError> {
        let tokens = Lexer::tokenize(source);
        Self::from_tokens(&tokens, source)
    }

    /// Scan `tokens` with the term grammar. `clause` is only used in errors.
    pub fn from_tokens(tokens: &[Token], clause: &str) -> Result<Self, LpError> {
        TermScanner::new(clause).scan(tokens)
    }

    /// Add `coefficient` to `name`, creating the term if needed.
    pub fn add_term(&mut self, name: &str, coefficient: f64) {
        match self.position(name) {
            Some(i) => self.terms[i].coefficient += coefficient,
            None => self.terms.push(Term {
                name: name.to_string(),
                coefficient,
            }),
        }
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.terms[i].coefficient)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn negated(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|t| Term {
                    name: t.name.clone(),
                    coefficient: -t.coefficient,
                })
                .collect(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.terms.iter().position(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Scanner state between tokens.
#[derive(Debug, Clone, Copy)]
enum State<'t> {
    /// Nothing pending
    Start,
    /// A bare sign was read
    Signed(f64),
    /// A numeric literal (with its sign) was read
    Scaled(f64, &'t Token),
}

/// Finite-state scanner for `[sign] [number] identifier` terms.
///
/// Tokens that cannot start or continue a term are dropped along with any
/// pending coefficient, so bare constants never reach the expression.
struct TermScanner<'c> {
    clause: &'c str,
}

impl<'c> TermScanner<'c> {
    fn new(clause: &'c str) -> Self {
        Self { clause }
    }

    fn scan(&self, tokens: &[Token]) -> Result<LinearExpression, LpError> {
        let mut expr = LinearExpression::new();
        let mut state = State::Start;

        for token in tokens {
            state = match (state, token.kind) {
                (_, TokenKind::Ident) => {
                    let coefficient = self.resolve(state)?;
                    expr.add_term(&token.text, coefficient);
                    State::Start
                }
                (State::Scaled(_, pending), TokenKind::Plus | TokenKind::Minus) => {
                    self.drop_constant(pending);
                    State::Signed(sign_of(token.kind))
                }
                (_, TokenKind::Plus | TokenKind::Minus) => State::Signed(sign_of(token.kind)),
                (State::Start, TokenKind::Number) => State::Scaled(1.0, token),
                (State::Signed(sign), TokenKind::Number) => State::Scaled(sign, token),
                (State::Scaled(_, pending), TokenKind::Number) => {
                    self.drop_constant(pending);
                    State::Scaled(1.0, token)
                }
                (State::Scaled(_, pending), _) => {
                    self.drop_constant(pending);
                    State::Start
                }
                (_, _) => State::Start,
            };
        }

        if let State::Scaled(_, pending) = state {
            self.drop_constant(pending);
        }

        Ok(expr)
    }

    fn resolve(&self, state: State<'_>) -> Result<f64, LpError> {
        match state {
            State::Start => Ok(1.0),
            State::Signed(sign) => Ok(sign),
            State::Scaled(sign, literal) => {
                let value: f64 = literal.text.parse().map_err(|_| LpError::NumericParseFailure {
                    literal: literal.text.clone(),
                    clause: self.clause.to_string(),
                })?;
                Ok(sign * value)
            }
        }
    }

    fn drop_constant(&self, literal: &Token) {
        debug!(
            component = "compiler",
            operation = "scan_terms",
            status = "skipped",
            literal = %literal.text,
            clause = self.clause,
            "Dropped constant term"
        );
    }
}

fn sign_of(kind: TokenKind) -> f64 {
    if kind == TokenKind::Minus { -1.0 } else { 1.0 }
}
