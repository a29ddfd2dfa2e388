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

use std::str::FromStr;

use nom::sequence::delimited;

use crate::expression::{
    Expression, ExpressionFunction, InfixOperator, PrefixOperator,
};
use crate::parser::common::parse_memory_reference;
use crate::parser::lexer::Operator;
use crate::parser::macros::{expected_token, token, unexpected_eof};
use crate::parser::{first_token, split_first_token, ParserInput, ParserResult, Token};

/// Binding strength of an infix operator, used to decide how far to the right
/// an operand extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Sum,
    Product,
    Exponentiation,
}

fn get_precedence(token: Option<&Token>) -> Precedence {
    match token {
        Some(Token::Operator(operator)) => match operator {
            Operator::Plus | Operator::Minus => Precedence::Sum,
            Operator::Star | Operator::Slash => Precedence::Product,
            Operator::Caret => Precedence::Exponentiation,
        },
        _ => Precedence::Lowest,
    }
}

/// Parse an expression at the head of the current input, for as long as the
/// expression continues.
pub(crate) fn parse_expression<'a>(input: ParserInput<'a>) -> ParserResult<'a, Expression> {
    parse(input, Precedence::Lowest)
}

/// Recursively parse an expression as long as operator precedence is
/// satisfied.
fn parse<'a>(input: ParserInput<'a>, precedence: Precedence) -> ParserResult<'a, Expression> {
    let (mut input, mut left) = parse_atom(input)?;
    while get_precedence(first_token(input)) > precedence {
        let (remainder, next) = parse_infix(input, left)?;
        left = next;
        input = remainder;
    }
    Ok((input, left))
}

fn parse_atom<'a>(input: ParserInput<'a>) -> ParserResult<'a, Expression> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Integer(value), remainder)) => {
            Ok((remainder, Expression::Number(*value as f64)))
        }
        Some((Token::Float(value), remainder)) => Ok((remainder, Expression::Number(*value))),
        Some((Token::Variable(name), remainder)) => {
            Ok((remainder, Expression::Variable(name.clone())))
        }
        Some((Token::Operator(Operator::Minus), remainder)) => {
            prefix(PrefixOperator::Minus, remainder)
        }
        Some((Token::Operator(Operator::Plus), remainder)) => {
            prefix(PrefixOperator::Plus, remainder)
        }
        Some((Token::LParenthesis, remainder)) => {
            let (remainder, expression) = parse_expression(remainder)?;
            let (remainder, _) = token!(RParenthesis)(remainder)?;
            Ok((remainder, expression))
        }
        Some((Token::Identifier(name), remainder)) => {
            if name == "pi" {
                Ok((remainder, Expression::PiConstant))
            } else if let Ok(function) = ExpressionFunction::from_str(name) {
                if matches!(first_token(remainder), Some(Token::LParenthesis)) {
                    parse_function_call(function, remainder)
                } else {
                    // An identifier that merely spells a function name is an
                    // ordinary memory reference.
                    parse_address(input)
                }
            } else {
                parse_address(input)
            }
        }
        Some((other_token, _)) => {
            expected_token!(input, other_token, "an expression".to_owned())
        }
    }
}

/// A unary operator binds as tightly as multiplication, so `-pi/2` negates
/// `pi` alone and `-2^2` negates the full power.
fn prefix<'a>(
    operator: PrefixOperator,
    input: ParserInput<'a>,
) -> ParserResult<'a, Expression> {
    let (input, expression) = parse(input, Precedence::Product)?;
    Ok((
        input,
        Expression::Prefix {
            operator,
            expression: Box::new(expression),
        },
    ))
}

fn parse_function_call<'a>(
    function: ExpressionFunction,
    input: ParserInput<'a>,
) -> ParserResult<'a, Expression> {
    let (input, expression) = delimited(
        token!(LParenthesis),
        parse_expression,
        token!(RParenthesis),
    )(input)?;
    Ok((
        input,
        Expression::FunctionCall {
            function,
            expression: Box::new(expression),
        },
    ))
}

fn parse_address<'a>(input: ParserInput<'a>) -> ParserResult<'a, Expression> {
    let (input, memory_reference) = parse_memory_reference(input)?;
    Ok((input, Expression::Address(memory_reference)))
}

fn parse_infix<'a>(input: ParserInput<'a>, left: Expression) -> ParserResult<'a, Expression> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Operator(token_operator), remainder)) => {
            let (operator, right_precedence) = match token_operator {
                Operator::Plus => (InfixOperator::Plus, Precedence::Sum),
                Operator::Minus => (InfixOperator::Minus, Precedence::Sum),
                Operator::Star => (InfixOperator::Star, Precedence::Product),
                Operator::Slash => (InfixOperator::Slash, Precedence::Product),
                // Exponentiation associates right, so its right operand parses
                // at a lower bound than the operator itself.
                Operator::Caret => (InfixOperator::Caret, Precedence::Product),
            };
            let (remainder, right) = parse(remainder, right_precedence)?;
            Ok((
                remainder,
                Expression::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
            ))
        }
        Some((other_token, _)) => {
            expected_token!(input, other_token, "an infix operator".to_owned())
        }
    }
}
