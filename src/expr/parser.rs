//! Parser for the restricted expression DSL.
//!
//! Converts an expression string into an [`Expression`] tree using a PEST
//! grammar. The grammar is deliberately closed: comparisons, boolean
//! combinators, arithmetic, field-path lookups and function calls, nothing
//! else. Parsing happens once at compile time; evaluation happens per
//! snapshot.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::{Expression, Operator, UnaryOperator, Value};
use crate::error::FormError;

/// Parser for expression strings in form conditions and derivations.
#[derive(Parser)]
#[grammar = "expr/grammar.pest"]
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parses the input into an expression AST.
    pub fn parse_expression(input: &str) -> Result<Expression, FormError> {
        let pairs = Self::parse(Rule::complete_expr, input)
            .map_err(|e| FormError::InvalidExpression(format!("Parse error: {}", e)))?;

        let expr_pair = pairs
            .into_iter()
            .next()
            .ok_or_else(|| FormError::InvalidExpression("Empty expression".to_string()))?;

        Self::build_ast(expr_pair)
    }

    fn build_ast(pair: Pair<Rule>) -> Result<Expression, FormError> {
        match pair.as_rule() {
            Rule::expr => {
                let inner = pair.into_inner().next().ok_or_else(Self::empty_rule)?;
                Self::build_ast(inner)
            }
            Rule::logic_expr => Self::parse_binary_chain(pair, Self::logic_operator),
            Rule::comp_expr => Self::parse_binary_chain(pair, Self::comp_operator),
            Rule::add_expr => Self::parse_binary_chain(pair, Self::add_operator),
            Rule::mul_expr => Self::parse_binary_chain(pair, Self::mul_operator),
            Rule::pow_expr => Self::parse_binary_chain(pair, Self::pow_operator),
            Rule::unary_expr => Self::parse_unary_expr(pair),
            Rule::atom => Self::parse_atom(pair),
            other => Err(FormError::InvalidExpression(format!(
                "Unexpected rule: {:?}",
                other
            ))),
        }
    }

    /// All binary precedence levels share one left-associative chain shape:
    /// operand, then zero or more (operator, operand) pairs.
    fn parse_binary_chain(
        pair: Pair<Rule>,
        to_operator: fn(&str) -> Result<Operator, FormError>,
    ) -> Result<Expression, FormError> {
        let mut pairs = pair.into_inner();

        let first = pairs.next().ok_or_else(Self::empty_rule)?;
        let mut expr = Self::build_ast(first)?;

        while let Some(op_pair) = pairs.next() {
            let operator = to_operator(op_pair.as_str())?;
            let right_pair = pairs.next().ok_or_else(Self::empty_rule)?;
            let right = Self::build_ast(right_pair)?;

            expr = Expression::BinaryOp {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logic_operator(op: &str) -> Result<Operator, FormError> {
        match op {
            "&&" => Ok(Operator::And),
            "||" => Ok(Operator::Or),
            other => Err(Self::unknown_operator(other)),
        }
    }

    fn comp_operator(op: &str) -> Result<Operator, FormError> {
        match op {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            other => Err(Self::unknown_operator(other)),
        }
    }

    fn add_operator(op: &str) -> Result<Operator, FormError> {
        match op {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            other => Err(Self::unknown_operator(other)),
        }
    }

    fn mul_operator(op: &str) -> Result<Operator, FormError> {
        match op {
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            other => Err(Self::unknown_operator(other)),
        }
    }

    fn pow_operator(op: &str) -> Result<Operator, FormError> {
        match op {
            "^" => Ok(Operator::Power),
            other => Err(Self::unknown_operator(other)),
        }
    }

    fn parse_unary_expr(pair: Pair<Rule>) -> Result<Expression, FormError> {
        let mut pairs = pair.into_inner().peekable();

        let mut unary_ops = Vec::new();
        while let Some(op_pair) = pairs.peek() {
            if op_pair.as_rule() != Rule::unary_op {
                break;
            }
            let op = match op_pair.as_str() {
                "-" => UnaryOperator::Negate,
                "!" => UnaryOperator::Not,
                other => return Err(Self::unknown_operator(other)),
            };
            unary_ops.push(op);
            pairs.next();
        }

        let atom_pair = pairs.next().ok_or_else(Self::empty_rule)?;
        let mut expr = Self::build_ast(atom_pair)?;

        // Apply right to left
        for op in unary_ops.into_iter().rev() {
            expr = Expression::UnaryOp {
                operator: op,
                expr: Box::new(expr),
            };
        }

        Ok(expr)
    }

    fn parse_atom(pair: Pair<Rule>) -> Result<Expression, FormError> {
        let inner = pair.into_inner().next().ok_or_else(Self::empty_rule)?;

        match inner.as_rule() {
            Rule::number => {
                let n = inner
                    .as_str()
                    .parse::<f64>()
                    .map_err(|e| FormError::InvalidExpression(format!("Invalid number: {}", e)))?;
                Ok(Expression::Literal(Value::Number(n)))
            }
            Rule::string => {
                // Strip the surrounding quotes
                let s = inner.as_str();
                let s = &s[1..s.len() - 1];
                Ok(Expression::Literal(Value::String(s.to_string())))
            }
            Rule::boolean => match inner.as_str() {
                "true" => Ok(Expression::Literal(Value::Boolean(true))),
                "false" => Ok(Expression::Literal(Value::Boolean(false))),
                other => Err(FormError::InvalidExpression(format!(
                    "Invalid boolean: {}",
                    other
                ))),
            },
            Rule::null => Ok(Expression::Literal(Value::Null)),
            Rule::function_call => Self::parse_function_call(inner),
            Rule::path => {
                let segments = inner
                    .into_inner()
                    .map(|seg| seg.as_str().to_string())
                    .collect();
                Ok(Expression::Path(segments))
            }
            Rule::expr => Self::build_ast(inner),
            other => Err(FormError::InvalidExpression(format!(
                "Unexpected rule in atom: {:?}",
                other
            ))),
        }
    }

    fn parse_function_call(pair: Pair<Rule>) -> Result<Expression, FormError> {
        let mut pairs = pair.into_inner();

        let name = pairs
            .next()
            .ok_or_else(Self::empty_rule)?
            .as_str()
            .to_string();

        let mut args = Vec::new();
        for arg_pair in pairs {
            args.push(Self::build_ast(arg_pair)?);
        }

        Ok(Expression::FunctionCall { name, args })
    }

    fn empty_rule() -> FormError {
        FormError::InvalidExpression("Unexpected empty rule".to_string())
    }

    fn unknown_operator(op: &str) -> FormError {
        FormError::InvalidExpression(format!("Unknown operator: {}", op))
    }
}
