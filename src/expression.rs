// Copyright 2021 Rigetti Computing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroI32;
use std::str::FromStr;

use lexical::{format, to_string_with_options, WriteFloatOptions};
use once_cell::sync::Lazy;

use crate::instruction::MemoryReference;
use crate::parser::{lex, parse_expression, ParseError};
use crate::program::SyntaxError;

/// The different possible types of errors that could occur during expression evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// There wasn't enough information to completely evaluate an expression.
    #[error("expression does not evaluate to a constant")]
    Incomplete,

    /// The expression evaluates to a complex number, not a real one.
    #[error("expression does not evaluate to a real number")]
    NotAReal,
}

/// An arithmetic expression as it appears in gate parameters, frame
/// attributes, and pulse arguments.
///
/// Expressions are immutable value trees; separately parsing the same text
/// always yields structurally equal expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A reference to a declared memory location, such as `theta[0]`.
    Address(MemoryReference),
    FunctionCall {
        function: ExpressionFunction,
        expression: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    Number(f64),
    PiConstant,
    Prefix {
        operator: PrefixOperator,
        expression: Box<Expression>,
    },
    /// A parameter variable, such as `%theta`.
    Variable(String),
}

/// Hash value helper: turn a hashable thing into a u64.
fn hash_to_u64<T: Hash>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

impl Hash for Expression {
    // Implemented by hand since we can't derive with f64s hidden inside.
    // Commutative operations hash the same regardless of operand order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        use std::cmp::{max_by_key, min_by_key};
        use Expression::*;
        match self {
            Address(m) => {
                "Address".hash(state);
                m.hash(state);
            }
            FunctionCall {
                function,
                expression,
            } => {
                "FunctionCall".hash(state);
                function.hash(state);
                expression.hash(state);
            }
            Infix {
                left,
                operator,
                right,
            } => {
                "Infix".hash(state);
                operator.hash(state);
                match operator {
                    InfixOperator::Plus | InfixOperator::Star => {
                        let (a, b) = (
                            min_by_key(left, right, hash_to_u64),
                            max_by_key(left, right, hash_to_u64),
                        );
                        a.hash(state);
                        b.hash(state);
                    }
                    _ => {
                        left.hash(state);
                        right.hash(state);
                    }
                }
            }
            Number(n) => {
                "Number".hash(state);
                // f64 isn't hashable; use the binary representation.
                n.to_bits().hash(state);
            }
            PiConstant => {
                "PiConstant".hash(state);
            }
            Prefix {
                operator,
                expression,
            } => {
                "Prefix".hash(state);
                operator.hash(state);
                expression.hash(state);
            }
            Variable(v) => {
                "Variable".hash(state);
                v.hash(state);
            }
        }
    }
}

impl Expression {
    /// Evaluate an expression to a real number, using a map of variable
    /// values for any `%variable` operands encountered.
    ///
    /// Returns [`EvaluationError::Incomplete`] if the expression contains a
    /// variable missing from the map or a memory reference, whose value is
    /// not known until runtime.
    pub fn evaluate(&self, variables: &HashMap<String, f64>) -> Result<f64, EvaluationError> {
        use Expression::*;
        match self {
            Address(_) => Err(EvaluationError::Incomplete),
            FunctionCall {
                function,
                expression,
            } => {
                let value = expression.evaluate(variables)?;
                match function {
                    // cis(x) = cos(x) + i*sin(x) is only real for multiples
                    // of pi, which is not worth special-casing.
                    ExpressionFunction::Cis => Err(EvaluationError::NotAReal),
                    ExpressionFunction::Cosine => Ok(value.cos()),
                    ExpressionFunction::Exponent => Ok(value.exp()),
                    ExpressionFunction::Sine => Ok(value.sin()),
                    ExpressionFunction::SquareRoot => Ok(value.sqrt()),
                }
            }
            Infix {
                left,
                operator,
                right,
            } => {
                let left = left.evaluate(variables)?;
                let right = right.evaluate(variables)?;
                Ok(match operator {
                    InfixOperator::Caret => left.powf(right),
                    InfixOperator::Plus => left + right,
                    InfixOperator::Minus => left - right,
                    InfixOperator::Slash => left / right,
                    InfixOperator::Star => left * right,
                })
            }
            Number(number) => Ok(*number),
            PiConstant => Ok(PI),
            Prefix {
                operator,
                expression,
            } => {
                let value = expression.evaluate(variables)?;
                Ok(match operator {
                    PrefixOperator::Minus => -value,
                    PrefixOperator::Plus => value,
                })
            }
            Variable(name) => variables
                .get(name)
                .copied()
                .ok_or(EvaluationError::Incomplete),
        }
    }

    /// Return, if any, the memory references contained within this expression.
    pub fn get_memory_references(&self) -> Vec<&MemoryReference> {
        match self {
            Expression::Address(reference) => vec![reference],
            Expression::FunctionCall { expression, .. } => expression.get_memory_references(),
            Expression::Infix { left, right, .. } => {
                let mut result = left.get_memory_references();
                result.extend(right.get_memory_references());
                result
            }
            Expression::Number(_) => vec![],
            Expression::PiConstant => vec![],
            Expression::Prefix { expression, .. } => expression.get_memory_references(),
            Expression::Variable(_) => vec![],
        }
    }
}

impl FromStr for Expression {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        let (remainder, expression) = parse_expression(&tokens)
            .map_err(|err| SyntaxError::from(ParseError::from_nom_err(err, &tokens)))?;
        if !remainder.is_empty() {
            return Err(ParseError::from_internal(
                crate::parser::InternalParseError::from_kind(
                    remainder,
                    crate::parser::ParserErrorKind::ExpectedToken {
                        actual: remainder[0].as_token().clone(),
                        expected: "end of expression".to_owned(),
                    },
                ),
                &tokens,
            )
            .into());
        }
        Ok(expression)
    }
}

static FORMAT_REAL_OPTIONS: Lazy<WriteFloatOptions> = Lazy::new(|| {
    WriteFloatOptions::builder()
        .negative_exponent_break(NonZeroI32::new(-5))
        .positive_exponent_break(NonZeroI32::new(15))
        .trim_floats(true)
        .build()
        .expect("options are valid")
});

/// Format an f64 in a Quil-compatible way: no trailing `.0` on whole numbers,
/// scientific notation only outside a reasonable exponent range.
pub(crate) fn format_real(value: f64) -> String {
    const FORMAT: u128 = format::STANDARD;
    to_string_with_options::<_, FORMAT>(value, &FORMAT_REAL_OPTIONS)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Expression::*;
        match self {
            Address(memory_reference) => write!(f, "{memory_reference}"),
            FunctionCall {
                function,
                expression,
            } => write!(f, "{function}({expression})"),
            Infix {
                left,
                operator,
                right,
            } => {
                // The operand on the non-associating side needs parentheses
                // even at equal precedence. `^` associates right, the rest
                // associate left.
                let (left_precedence, right_precedence) = match operator {
                    InfixOperator::Caret => (operator.precedence() + 1, operator.precedence()),
                    _ => (operator.precedence(), operator.precedence() + 1),
                };
                write_operand(f, left, left_precedence)?;
                write!(f, "{operator}")?;
                write_operand(f, right, right_precedence)
            }
            Number(value) => write!(f, "{}", format_real(*value)),
            PiConstant => write!(f, "pi"),
            Prefix {
                operator,
                expression,
            } => {
                write!(f, "{operator}")?;
                write_operand(f, expression, InfixOperator::Star.precedence())
            }
            Variable(value) => write!(f, "%{value}"),
        }
    }
}

/// Writes the operand, parenthesizing it if it binds more loosely than its parent.
fn write_operand(
    f: &mut fmt::Formatter,
    operand: &Expression,
    parent_precedence: u8,
) -> fmt::Result {
    let needs_parentheses = match operand {
        Expression::Infix { operator, .. } => operator.precedence() < parent_precedence,
        Expression::Prefix { .. } => parent_precedence > InfixOperator::Plus.precedence(),
        _ => false,
    };
    if needs_parentheses {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

/// A function usable within an expression, applied to a parenthesized argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExpressionFunction {
    #[strum(serialize = "cis")]
    Cis,
    #[strum(serialize = "cos")]
    Cosine,
    #[strum(serialize = "exp")]
    Exponent,
    #[strum(serialize = "sin")]
    Sine,
    #[strum(serialize = "sqrt")]
    SquareRoot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum PrefixOperator {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum InfixOperator {
    #[strum(serialize = "^")]
    Caret,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "*")]
    Star,
}

impl InfixOperator {
    fn precedence(&self) -> u8 {
        match self {
            InfixOperator::Plus | InfixOperator::Minus => 1,
            InfixOperator::Star | InfixOperator::Slash => 2,
            InfixOperator::Caret => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::f64::consts::PI;
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::Expression;

    #[rstest]
    #[case("1", 1.0)]
    #[case("1.5e2", 150.0)]
    #[case("pi", PI)]
    #[case("pi/2", PI / 2.0)]
    #[case("-pi/2", -PI / 2.0)]
    #[case("1+2*3", 7.0)]
    #[case("(1+2)*3", 9.0)]
    #[case("2^3", 8.0)]
    #[case("cos(0)", 1.0)]
    #[case("sqrt(4)", 2.0)]
    fn evaluates_constants(#[case] input: &str, #[case] expected: f64) {
        let expression = Expression::from_str(input).unwrap();
        let value = expression.evaluate(&HashMap::new()).unwrap();
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn evaluates_variables() {
        let expression = Expression::from_str("%theta/2").unwrap();
        let variables: HashMap<String, f64> = [("theta".to_owned(), PI)].into_iter().collect();
        let value = expression.evaluate(&variables).unwrap();
        assert!((value - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn incomplete_evaluation() {
        let expression = Expression::from_str("%undefined+1").unwrap();
        assert!(expression.evaluate(&HashMap::new()).is_err());
    }

    #[test]
    fn cis_parses_but_does_not_evaluate() {
        let expression = Expression::from_str("cis(pi/4)").unwrap();
        assert_eq!(
            expression.evaluate(&HashMap::new()),
            Err(super::EvaluationError::NotAReal)
        );
    }

    #[rstest]
    #[case("pi/2")]
    #[case("%theta*2")]
    #[case("(1+2)*3")]
    #[case("-pi")]
    #[case("2^3^2")]
    #[case("(2^3)^2")]
    #[case("cos(%phase)")]
    #[case("cis(%phase)")]
    #[case("theta[1]")]
    fn display_round_trips(#[case] input: &str) {
        let expression = Expression::from_str(input).unwrap();
        let reparsed = Expression::from_str(&expression.to_string()).unwrap();
        assert_eq!(expression, reparsed);
    }
}
