//! JSON path parser
//!
//! Parses path expressions into a [`JsonPath`].
//!
//! # Supported Syntax
//!
//! ```text
//! $                      root (optional)
//! .name  ['name']        member
//! .*  [*]                every member / element
//! [0]  [-1]              index
//! [1:5]  [::2]           slice
//! [0,2]  ['a','b']       union
//! ..name  ..*            recursive descent
//! [?(@.price < 10)]      filter
//! [?(@.isbn)]            existence filter
//! ```

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{map, map_opt, map_res, opt, recognize, value},
    multi::{many0, separated_list1},
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use serde_json::Value;

use super::ast::*;
use crate::query::error::PathError;

/// Deepest bracket or parenthesis nesting accepted in a path
const MAX_NESTING: usize = 64;

/// Parse a path expression
pub fn parse_path(input: &str) -> Result<JsonPath, PathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PathError::syntax(input, "empty path"));
    }
    if nesting_depth(trimmed) > MAX_NESTING {
        return Err(PathError::syntax(
            input,
            format!("nested deeper than {} levels", MAX_NESTING),
        ));
    }

    match root_path(trimmed) {
        Ok((remaining, path)) => {
            if remaining.is_empty() {
                Ok(path)
            } else {
                Err(PathError::syntax(
                    input,
                    format!("unexpected input at '{}'", remaining),
                ))
            }
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(PathError::syntax(
            input,
            format!("unexpected input at '{}'", e.input),
        )),
        Err(nom::Err::Incomplete(_)) => Err(PathError::syntax(input, "incomplete path")),
    }
}

/// Maximum nesting of `[` and `(` outside quoted names
fn nesting_depth(input: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0;
    let mut quote = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// `$` followed by segments; a bare leading member name is accepted too
fn root_path(input: &str) -> IResult<&str, JsonPath> {
    let (input, root) = opt(char('$'))(input)?;
    let (input, first) = match root {
        Some(_) => (input, None),
        None => opt(map(member_name, |name| Segment::Child(name_selector(name))))(input)?,
    };
    let (input, rest) = many0(segment)(input)?;

    let segments = first.into_iter().chain(rest).collect();
    Ok((input, JsonPath { segments }))
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(
            preceded(
                tag(".."),
                alt((wildcard, map(member_name, name_selector), bracket_selector)),
            ),
            Segment::Descendant,
        ),
        map(
            preceded(char('.'), alt((wildcard, map(member_name, name_selector)))),
            Segment::Child,
        ),
        map(bracket_selector, Segment::Child),
    ))(input)
}

fn name_selector(name: &str) -> Selector {
    Selector::Name(name.to_string())
}

fn member_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

fn wildcard(input: &str) -> IResult<&str, Selector> {
    value(Selector::Wildcard, char('*'))(input)
}

fn bracket_selector(input: &str) -> IResult<&str, Selector> {
    delimited(
        pair(char('['), multispace0),
        alt((filter_selector, selector_list)),
        pair(multispace0, char(']')),
    )(input)
}

fn selector_list(input: &str) -> IResult<&str, Selector> {
    map(
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            single_selector,
        ),
        |mut list| {
            if list.len() == 1 {
                list.remove(0)
            } else {
                Selector::Union(list)
            }
        },
    )(input)
}

fn single_selector(input: &str) -> IResult<&str, Selector> {
    alt((
        wildcard,
        map(quoted_string, Selector::Name),
        slice_selector,
        map(integer, Selector::Index),
    ))(input)
}

fn slice_selector(input: &str) -> IResult<&str, Selector> {
    let colon = || delimited(multispace0, char(':'), multispace0);

    let (input, start) = opt(integer)(input)?;
    let (input, _) = colon()(input)?;
    let (input, end) = opt(integer)(input)?;
    let (input, step) = opt(preceded(colon(), opt(integer)))(input)?;

    Ok((
        input,
        Selector::Slice {
            start,
            end,
            step: step.flatten(),
        },
    ))
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    alt((single_quoted, double_quoted))(input)
}

fn single_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        map(
            opt(escaped_transform(is_not("\\'"), '\\', escape_char)),
            |s| s.unwrap_or_default(),
        ),
        char('\''),
    )(input)
}

fn double_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\""), '\\', escape_char)),
            |s| s.unwrap_or_default(),
        ),
        char('"'),
    )(input)
}

fn escape_char(input: &str) -> IResult<&str, &str> {
    alt((
        value("\\", char('\\')),
        value("'", char('\'')),
        value("\"", char('"')),
        value("/", char('/')),
    ))(input)
}

/// `?(@... op literal)`, `?@...` or `?(@...)`
fn filter_selector(input: &str) -> IResult<&str, Selector> {
    let (input, _) = char('?')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, expr) = alt((
        delimited(
            pair(char('('), multispace0),
            filter_expr,
            pair(multispace0, char(')')),
        ),
        filter_expr,
    ))(input)?;

    Ok((input, Selector::Filter(expr)))
}

fn filter_expr(input: &str) -> IResult<&str, FilterExpr> {
    let (input, _) = char('@')(input)?;
    let (input, path) = many0(segment)(input)?;
    let (input, comparison) = opt(tuple((
        preceded(multispace0, comparison_op),
        preceded(multispace0, literal),
    )))(input)?;

    Ok((input, FilterExpr { path, comparison }))
}

fn comparison_op(input: &str) -> IResult<&str, Comparison> {
    alt((
        value(Comparison::Eq, tag("==")),
        value(Comparison::Ne, tag("!=")),
        value(Comparison::Le, tag("<=")),
        value(Comparison::Ge, tag(">=")),
        value(Comparison::Lt, tag("<")),
        value(Comparison::Gt, tag(">")),
    ))(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(quoted_string, Value::String),
        value(Value::Bool(true), tag("true")),
        value(Value::Bool(false), tag("false")),
        value(Value::Null, tag("null")),
        number_literal,
    ))(input)
}

fn number_literal(input: &str) -> IResult<&str, Value> {
    map_opt(recognize_float, |s: &str| {
        if let Ok(n) = s.parse::<i64>() {
            Some(Value::from(n))
        } else {
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        }
    })(input)
}
