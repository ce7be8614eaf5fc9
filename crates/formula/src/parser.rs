use crate::error::FormulaError;
use model::{
    core::value::Value,
    schema::{FormulaExpr, FormulaOp},
};
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;
use tracing::debug;

#[derive(Parser)]
#[grammar = "grammar/formula.pest"]
struct FormulaParser;

pub fn parse(source: &str) -> Result<FormulaExpr, FormulaError> {
    let formula = FormulaParser::parse(Rule::formula, source)
        .map_err(|e| FormulaError::Parse(e.to_string()))?
        .next()
        .ok_or_else(|| FormulaError::Parse("empty input".into()))?;

    let body = formula
        .into_inner()
        .next()
        .ok_or_else(|| FormulaError::Parse("empty input".into()))?;

    let expr = build(body)?;
    debug!(source, ?expr, "Parsed formula");
    Ok(expr)
}

fn build(pair: Pair<Rule>) -> Result<FormulaExpr, FormulaError> {
    match pair.as_rule() {
        Rule::comparison | Rule::concat | Rule::additive | Rule::term => build_binary(pair),
        Rule::unary => build_unary(pair),
        Rule::call => build_call(pair),
        Rule::column => {
            let name = pair
                .into_inner()
                .next()
                .map(|p| p.as_str().trim().to_string())
                .ok_or_else(|| FormulaError::Parse("empty column reference".into()))?;
            Ok(FormulaExpr::column(name))
        }
        Rule::number => parse_number(pair.as_str()).map(FormulaExpr::Literal),
        Rule::string => {
            let text = pair
                .into_inner()
                .next()
                .map(|p| p.as_str())
                .unwrap_or_default();
            Ok(FormulaExpr::literal(text))
        }
        Rule::boolean => Ok(FormulaExpr::literal(
            pair.as_str().eq_ignore_ascii_case("true"),
        )),
        Rule::null_lit => Ok(FormulaExpr::Literal(Value::Null)),
        _ => Err(FormulaError::Unexpected(pair.as_str().to_string())),
    }
}

/// Left-folds `operand (op operand)*`.
fn build_binary(pair: Pair<Rule>) -> Result<FormulaExpr, FormulaError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| FormulaError::Parse("missing operand".into()))?;
    let mut acc = build(first)?;

    while let Some(op) = inner.next() {
        let op = match op.as_str() {
            "&" => FormulaOp::Concat,
            "+" => FormulaOp::Add,
            "-" => FormulaOp::Subtract,
            "*" => FormulaOp::Multiply,
            "/" => FormulaOp::Divide,
            "=" | "==" => FormulaOp::Eq,
            "<>" | "!=" => FormulaOp::Neq,
            ">" => FormulaOp::Gt,
            ">=" => FormulaOp::Gte,
            "<" => FormulaOp::Lt,
            "<=" => FormulaOp::Lte,
            other => return Err(FormulaError::Unexpected(other.to_string())),
        };
        let rhs = inner
            .next()
            .ok_or_else(|| FormulaError::Parse("missing right operand".into()))?;
        acc = FormulaExpr::binary(op, acc, build(rhs)?);
    }

    Ok(acc)
}

fn build_unary(pair: Pair<Rule>) -> Result<FormulaExpr, FormulaError> {
    let mut negations = 0;
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::neg {
            negations += 1;
            continue;
        }
        let mut expr = build(inner)?;
        for _ in 0..negations {
            expr = FormulaExpr::Negate(Box::new(expr));
        }
        return Ok(expr);
    }
    Err(FormulaError::Parse("missing operand".into()))
}

fn build_call(pair: Pair<Rule>) -> Result<FormulaExpr, FormulaError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_ascii_uppercase())
        .ok_or_else(|| FormulaError::Parse("missing function name".into()))?;
    let args = inner.map(build).collect::<Result<Vec<_>, _>>()?;
    Ok(FormulaExpr::call(name, args))
}

fn parse_number(text: &str) -> Result<Value, FormulaError> {
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Value::Int(int));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| FormulaError::InvalidNumber(text.to_string()))
}
