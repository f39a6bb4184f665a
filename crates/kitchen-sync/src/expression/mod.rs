//! # Decay Expression Evaluator
//!
//! Orders carry their own decay formula, e.g. `shelfLife - (1 + decayRate)*orderAge`.
//! Evaluating it is two steps:
//!
//! 1. **Substitution** - the names `shelfLife`, `decayRate` and `orderAge` are
//!    replaced textually by their current values.
//! 2. **Parsing** - the resulting arithmetic is parsed and folded to an `f64`.
//!
//! ## Grammar
//!
//! Lowest to highest precedence, every binary level left-associative:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := power (('*' | '/') power)*
//! power   := term ('^' term)*            -- 2^3^2 == (2^3)^2 == 64
//! term    := number | '-' term | '(' sum ')'
//! number  := ['+' | '-'] [digits '.'] digits
//! ```
//!
//! Whitespace is ignored around every token. Parentheses and unary minus may
//! nest at most [`MAX_NESTING`] deep; anything deeper is refused with
//! [`EvalError::TooDeep`].

pub mod error;

pub use error::*;

use nom::{
    branch::alt,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// The formula used when an order does not bring its own.
pub const DEFAULT_DECAY_FORMULA: &str = "shelfLife - (1 + decayRate)*orderAge";

/// Deepest nesting of parentheses and unary minus the parser accepts.
pub const MAX_NESTING: usize = 64;

type ParseResult<'a, T> = IResult<&'a str, T>;

/// Substitutes the three decay variables into `formula` and evaluates it.
///
/// `order_age` is in whole seconds.
pub fn evaluate(
    formula: &str,
    shelf_life: f64,
    decay_rate: f64,
    order_age: u64,
) -> Result<f64, EvalError> {
    parse_expression(&substitute(formula, shelf_life, decay_rate, order_age))
}

/// Replaces the variable names in `formula` with their values.
pub fn substitute(formula: &str, shelf_life: f64, decay_rate: f64, order_age: u64) -> String {
    formula
        .replace("shelfLife", &shelf_life.to_string())
        .replace("decayRate", &decay_rate.to_string())
        .replace("orderAge", &order_age.to_string())
}

/// Parses and evaluates an arithmetic expression that contains no variables.
pub fn parse_expression(expression: &str) -> Result<f64, EvalError> {
    match all_consuming(|input| sum(input, 0))(expression) {
        Ok((_, value)) if value.is_finite() => Ok(value),
        Ok(_) => Err(EvalError::NonFinite(expression.to_string())),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => {
            Err(EvalError::TooDeep {
                expression: expression.to_string(),
                limit: MAX_NESTING,
            })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(EvalError::Malformed {
            expression: expression.to_string(),
            remaining: e.input.to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(EvalError::Malformed {
            expression: expression.to_string(),
            remaining: String::new(),
        }),
    }
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> ParseResult<'_, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            opt(pair(digit1, char('.'))),
            digit1,
        ))),
        |text: &str| text.parse::<f64>(),
    )(input)
}

fn term(input: &str, depth: usize) -> ParseResult<'_, f64> {
    if depth > MAX_NESTING {
        return Err(nom::Err::Failure(Error::new(input, ErrorKind::TooLarge)));
    }
    ws(alt((
        number,
        map(preceded(char('-'), |i| term(i, depth + 1)), |value: f64| -value),
        delimited(char('('), |i| sum(i, depth + 1), char(')')),
    )))(input)
}

fn power(input: &str, depth: usize) -> ParseResult<'_, f64> {
    let (input, first) = term(input, depth)?;
    let (input, rest) = many0(preceded(ws(char('^')), |i| term(i, depth)))(input)?;
    Ok((input, rest.into_iter().fold(first, f64::powf)))
}

fn product(input: &str, depth: usize) -> ParseResult<'_, f64> {
    let (input, first) = power(input, depth)?;
    let (input, rest) = many0(pair(ws(one_of("*/")), |i| power(i, depth)))(input)?;
    let value = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => acc * rhs,
        _ => acc / rhs,
    });
    Ok((input, value))
}

fn sum(input: &str, depth: usize) -> ParseResult<'_, f64> {
    let (input, first) = product(input, depth)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), |i| product(i, depth)))(input)?;
    let value = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    });
    Ok((input, value))
}
