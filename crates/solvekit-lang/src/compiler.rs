use tracing::{debug, info};

use crate::error::LpError;
use crate::expr::LinearExpression;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::model::{Bound, Constraint, LpModel, ObjectiveSense, Relation};
use crate::options::STRICT_EPSILON;

/// Compiler for the semicolon-delimited LP notation.
///
/// ```text
/// Maximize 5A + 3B; A >= 8; A <= 20; A + B <= 40
/// ```
///
/// The first non-empty clause is the objective, every later clause is a
/// constraint of the form `expression relation number`.
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    /// Offset applied to strict `<` / `>` bounds
    epsilon: f64,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            epsilon: STRICT_EPSILON,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Compile a whole problem into an [`LpModel`].
    pub fn compile(&self, source: &str) -> Result<LpModel, LpError> {
        let mut clauses = source.split(';').map(str::trim).filter(|c| !c.is_empty());

        let Some(objective) = clauses.next() else {
            return Err(LpError::MissingObjective {
                clause: source.trim().to_string(),
            });
        };

        let (sense, expression) = self.compile_objective(objective)?;
        let mut model = LpModel::new(sense);
        model.set_objective(expression);

        for clause in clauses {
            let constraint = self.compile_constraint(clause)?;
            model.add_constraint(constraint);
        }

        let order: Vec<&str> = model.creation_order().collect();
        debug!(
            component = "compiler",
            operation = "compile",
            status = "success",
            creation_order = ?order,
            "Variable creation order"
        );
        info!(
            component = "compiler",
            operation = "compile",
            status = "success",
            sense = ?model.sense,
            variables = model.num_variables() as u64,
            constraints = model.constraints.len() as u64,
            "Compiled LP model"
        );

        Ok(model)
    }

    /// Parse `Maximize ...` / `Minimize ...` into a sense and an expression.
    pub fn compile_objective(
        &self,
        clause: &str,
    ) -> Result<(ObjectiveSense, LinearExpression), LpError> {
        let tokens = Lexer::tokenize(clause);

        let sense = tokens
            .first()
            .filter(|t| t.kind == TokenKind::Ident)
            .and_then(|t| ObjectiveSense::from_keyword(&t.text))
            .ok_or_else(|| LpError::MissingObjective {
                clause: clause.to_string(),
            })?;

        if let Some(token) = tokens.iter().find(|t| t.kind.is_relation()) {
            return Err(LpError::MalformedObjective {
                clause: clause.to_string(),
                reason: format!("unexpected relational operator '{}'", token.text),
            });
        }

        let expression = LinearExpression::from_tokens(&tokens[1..], clause)?;
        Ok((sense, expression))
    }

    /// Parse one `expression relation number` clause.
    pub fn compile_constraint(&self, clause: &str) -> Result<Constraint, LpError> {
        let tokens = Lexer::tokenize(clause);

        let Some(at) = tokens.iter().position(|t| t.kind.is_relation()) else {
            return Err(malformed(clause, "no relational operator"));
        };

        let relation = relation_of(tokens[at].kind)
            .ok_or_else(|| malformed(clause, "no relational operator"))?;
        let rhs = self.parse_rhs(&tokens[at + 1..], clause)?;
        let expression = LinearExpression::from_tokens(&tokens[..at], clause)?;

        Ok(Constraint {
            clause: clause.to_string(),
            expression,
            bound: Bound::from_relation(relation, rhs, self.epsilon),
        })
    }

    /// Right-hand side: one optionally signed literal and nothing else.
    fn parse_rhs(&self, tokens: &[Token], clause: &str) -> Result<f64, LpError> {
        let (sign, rest) = match tokens.first().map(|t| t.kind) {
            Some(TokenKind::Minus) => (-1.0, &tokens[1..]),
            Some(TokenKind::Plus) => (1.0, &tokens[1..]),
            _ => (1.0, tokens),
        };

        match rest {
            [literal, eof] if literal.kind == TokenKind::Number && eof.kind == TokenKind::Eof => {
                let value: f64 = literal
                    .text
                    .parse()
                    .map_err(|_| malformed(clause, &format!("invalid number '{}'", literal.text)))?;
                Ok(sign * value)
            }
            _ => Err(malformed(clause, "right-hand side must be a single number")),
        }
    }
}

fn relation_of(kind: TokenKind) -> Option<Relation> {
    match kind {
        TokenKind::Le => Some(Relation::Le),
        TokenKind::Ge => Some(Relation::Ge),
        TokenKind::Lt => Some(Relation::Lt),
        TokenKind::Gt => Some(Relation::Gt),
        TokenKind::Eq => Some(Relation::Eq),
        _ => None,
    }
}

fn malformed(clause: &str, reason: &str) -> LpError {
    LpError::MalformedConstraint {
        clause: clause.to_string(),
        reason: reason.to_string(),
    }
}
