//! # Formula Expressions
//!
//! Administrator-authored arithmetic expressions over named inputs.
//!
//! Expressions support the four arithmetic operators with standard
//! precedence, parentheses, unary minus, decimal literals and input
//! identifiers. They are parsed once at fee-rule load time; evaluation
//! only walks the already-validated tree.
//!
//! Intermediate values are rounded to 6 decimal places (half-up) at
//! every node, keeping results reproducible regardless of evaluation
//! order.
//!
//! # Examples
//!
//! ```
//! use seaquote::domain::formula::expression::Expr;
//! use seaquote::domain::value_objects::ServiceInputs;
//! use rust_decimal::Decimal;
//!
//! let expr = Expr::parse("grt * 0.025 * days").unwrap();
//! let inputs = ServiceInputs::new()
//!     .with("grt", Decimal::new(20_000, 0))
//!     .with("days", Decimal::new(3, 0));
//!
//! assert_eq!(expr.evaluate(&inputs).unwrap(), Decimal::new(1_500, 0));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::arithmetic::{CheckedArithmetic, round_rate};
use crate::domain::value_objects::ServiceInputs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

impl BinaryOp {
    const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// A parsed arithmetic expression.
///
/// Serialized as its textual form, so persisted fee rules carry the
/// administrator's original notation and parsing happens exactly once
/// per load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expr {
    /// A decimal literal.
    Number(Decimal),
    /// A named input reference.
    Ident(String),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Parses an expression from its textual form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormula` on any syntax error:
    /// unbalanced parentheses, dangling operators, malformed numbers or
    /// unexpected characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use seaquote::domain::formula::expression::Expr;
    ///
    /// assert!(Expr::parse("(grt + 500) * 0.15").is_ok());
    /// assert!(Expr::parse("grt *").is_err());
    /// assert!(Expr::parse("grt % 2").is_err());
    /// ```
    pub fn parse(source: &str) -> DomainResult<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser::new(tokens);
        let expr = parser.parse_expression(0)?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Evaluates the expression against the given inputs.
    ///
    /// Every node's value is rounded to 6 decimal places before being
    /// folded into its parent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownIdentifier` for identifiers absent
    /// from `inputs` and `DomainError::DivisionByZero` for a zero
    /// divisor.
    pub fn evaluate(&self, inputs: &ServiceInputs) -> DomainResult<Decimal> {
        match self {
            Self::Number(value) => Ok(round_rate(*value)),
            Self::Ident(name) => inputs
                .get(name)
                .map(round_rate)
                .ok_or_else(|| DomainError::UnknownIdentifier(name.clone())),
            Self::Binary { op, lhs, rhs } => {
                let left = lhs.evaluate(inputs)?;
                let right = rhs.evaluate(inputs)?;
                let value = match op {
                    BinaryOp::Add => left.safe_add(right)?,
                    BinaryOp::Sub => left.safe_sub(right)?,
                    BinaryOp::Mul => left.safe_mul(right)?,
                    BinaryOp::Div => left.safe_div(right)?,
                };
                Ok(round_rate(value))
            }
        }
    }

    /// Collects every identifier referenced by the expression.
    #[must_use]
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Number(_) => {}
            Self::Ident(name) => {
                names.insert(name.clone());
            }
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_identifiers(names);
                rhs.collect_identifiers(names);
            }
        }
    }

    /// Returns the nesting depth of the expression tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Number(_) | Self::Ident(_) => 1,
            Self::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
        }
    }

    fn fmt_with_parent(&self, f: &mut fmt::Formatter<'_>, parent: u8, right_side: bool) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                let needs_parens = prec < parent || (prec == parent && right_side);
                if needs_parens {
                    write!(f, "(")?;
                }
                lhs.fmt_with_parent(f, prec, false)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_with_parent(f, prec, true)?;
                if needs_parens {
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_parent(f, 0, false)
    }
}

impl FromStr for Expr {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Expr {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Op(BinaryOp),
    LeftParen,
    RightParen,
}

fn tokenize(source: &str) -> DomainResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LeftParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RightParen);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Add));
            }
            '-' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Sub));
            }
            '*' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Mul));
            }
            '/' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Div));
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = Decimal::from_str(&literal).map_err(|_| {
                    DomainError::InvalidFormula(format!("malformed number '{literal}'"))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        name.push(d.to_ascii_lowercase());
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => {
                return Err(DomainError::InvalidFormula(format!(
                    "unexpected character '{other}'"
                )));
            }
        }
    }

    if tokens.is_empty() {
        return Err(DomainError::InvalidFormula("empty expression".to_string()));
    }

    Ok(tokens)
}

// ============================================================================
// Parser (precedence climbing)
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_expression(&mut self, min_precedence: u8) -> DomainResult<Expr> {
        let mut lhs = self.parse_primary()?;

        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if op.precedence() < min_precedence {
                break;
            }
            self.advance();
            let rhs = self.parse_expression(op.precedence() + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> DomainResult<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Ident(name)),
            Some(Token::LeftParen) => {
                let inner = self.parse_expression(0)?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(inner),
                    _ => Err(DomainError::InvalidFormula(
                        "unbalanced parentheses".to_string(),
                    )),
                }
            }
            // Unary minus desugars to `0 - x`.
            Some(Token::Op(BinaryOp::Sub)) => {
                let operand = self.parse_primary()?;
                Ok(Expr::Binary {
                    op: BinaryOp::Sub,
                    lhs: Box::new(Expr::Number(Decimal::ZERO)),
                    rhs: Box::new(operand),
                })
            }
            Some(token) => Err(DomainError::InvalidFormula(format!(
                "unexpected token {token:?}"
            ))),
            None => Err(DomainError::InvalidFormula(
                "expression ended unexpectedly".to_string(),
            )),
        }
    }

    fn expect_end(&mut self) -> DomainResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(DomainError::InvalidFormula(format!(
                "trailing token {token:?}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn eval(source: &str, inputs: &ServiceInputs) -> DomainResult<Decimal> {
        Expr::parse(source).unwrap().evaluate(inputs)
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_simple_product() {
            let expr = Expr::parse("grt * 0.025 * days").unwrap();
            assert_eq!(
                expr.identifiers().into_iter().collect::<Vec<_>>(),
                vec!["days".to_string(), "grt".to_string()]
            );
        }

        #[test]
        fn rejects_trailing_operator() {
            assert!(Expr::parse("grt *").is_err());
        }

        #[test]
        fn rejects_unknown_operator() {
            assert!(Expr::parse("grt % 2").is_err());
        }

        #[test]
        fn rejects_unbalanced_parens() {
            assert!(Expr::parse("(grt + 1").is_err());
            assert!(Expr::parse("grt + 1)").is_err());
        }

        #[test]
        fn rejects_empty_source() {
            assert!(Expr::parse("   ").is_err());
        }

        #[test]
        fn rejects_malformed_number() {
            assert!(Expr::parse("1.2.3 + grt").is_err());
        }

        #[test]
        fn identifiers_are_lowercased() {
            let expr = Expr::parse("GRT + Days").unwrap();
            let idents: Vec<String> = expr.identifiers().into_iter().collect();
            assert_eq!(idents, vec!["days".to_string(), "grt".to_string()]);
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn respects_precedence() {
            let inputs = ServiceInputs::new();
            assert_eq!(eval("2 + 3 * 4", &inputs).unwrap(), dec("14"));
            assert_eq!(eval("(2 + 3) * 4", &inputs).unwrap(), dec("20"));
            assert_eq!(eval("10 - 4 - 3", &inputs).unwrap(), dec("3"));
        }

        #[test]
        fn division_is_left_associative() {
            let inputs = ServiceInputs::new();
            assert_eq!(eval("100 / 5 / 2", &inputs).unwrap(), dec("10"));
        }

        #[test]
        fn unary_minus() {
            let inputs = ServiceInputs::new().with("x", dec("5"));
            assert_eq!(eval("-x + 10", &inputs).unwrap(), dec("5"));
        }

        #[test]
        fn unknown_identifier_fails() {
            let result = eval("grt * 2", &ServiceInputs::new());
            assert_eq!(
                result,
                Err(DomainError::UnknownIdentifier("grt".to_string()))
            );
        }

        #[test]
        fn division_by_zero_fails() {
            let inputs = ServiceInputs::new().with("qty", dec("0"));
            assert_eq!(eval("100 / qty", &inputs), Err(DomainError::DivisionByZero));
        }

        #[test]
        fn intermediates_round_to_six_places() {
            // 1 / 3 = 0.333333 (6 dp) before multiplying back up.
            let inputs = ServiceInputs::new();
            assert_eq!(eval("1 / 3 * 3", &inputs).unwrap(), dec("0.999999"));
        }

        #[test]
        fn worked_example_from_rate_sheet() {
            let inputs = ServiceInputs::new()
                .with("grt", dec("20000"))
                .with("days", dec("3"));
            assert_eq!(eval("grt * 0.025 * days", &inputs).unwrap(), dec("1500"));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn display_reparses_to_same_tree() {
            for source in [
                "grt * 0.025 * days",
                "(2 + 3) * 4",
                "base + grt * rate",
                "a - (b - c)",
                "a / (b * c)",
            ] {
                let expr = Expr::parse(source).unwrap();
                let printed = expr.to_string();
                let reparsed = Expr::parse(&printed).unwrap();
                assert_eq!(expr, reparsed, "{source} printed as {printed}");
            }
        }

        #[test]
        fn serde_roundtrips_as_text() {
            let expr = Expr::parse("base + grt * 0.15").unwrap();
            let json = serde_json::to_string(&expr).unwrap();
            assert_eq!(json, "\"base + grt * 0.15\"");
            let back: Expr = serde_json::from_str(&json).unwrap();
            assert_eq!(expr, back);
        }
    }

    mod depth {
        use super::*;

        #[test]
        fn leaf_depth_is_one() {
            assert_eq!(Expr::parse("42").unwrap().depth(), 1);
        }

        #[test]
        fn nested_depth_grows() {
            assert!(Expr::parse("((a + b) * c) / d").unwrap().depth() >= 3);
        }
    }
}
