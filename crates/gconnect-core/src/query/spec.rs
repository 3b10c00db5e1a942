//! Ordered `field<operator>value` parameter sets.
//!
//! A `QuerySpec` is serialized the same way whether it ends up in a URL
//! query string or in a form-encoded POST body.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConnectError, Result};

/// Comparison operator between a field and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Operator {
    /// Wire form of the operator as the portal expects it
    pub fn encoded(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::GreaterThan => "%3E",
            Operator::GreaterThanOrEqual => "%3E=",
            Operator::LessThan => "%3C",
            Operator::LessThanOrEqual => "%3C=",
        }
    }
}

impl FromStr for Operator {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Operator::Equal),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            other => Err(ConnectError::invalid_parameter(format!(
                "Unsupported operator: {:?}",
                other
            ))),
        }
    }
}

/// Scalar value of a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Integer(n) => write!(f, "{}", n),
            QueryValue::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Integer(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl TryFrom<serde_json::Value> for QueryValue {
    type Error = ConnectError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(QueryValue::Text(s)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(QueryValue::Integer(i)),
                None => n.as_f64().map(QueryValue::Float).ok_or_else(|| {
                    ConnectError::invalid_parameter(format!("Unrepresentable number: {}", n))
                }),
            },
            other => Err(ConnectError::invalid_parameter(format!(
                "Query values must be a string or a number, got {}",
                other
            ))),
        }
    }
}

impl QueryValue {
    /// NaN and infinities have no numeric wire form
    fn check(self) -> Result<Self> {
        match self {
            QueryValue::Float(n) if !n.is_finite() => Err(ConnectError::invalid_parameter(
                format!("Query values must be finite numbers, got {}", n),
            )),
            value => Ok(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    field: String,
    operator: Operator,
    value: QueryValue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    entries: Vec<Entry>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, parsing the operator from its textual form.
    ///
    /// Only `=`, `>`, `>=`, `<` and `<=` are accepted, and floats must be
    /// finite. Setting a field twice keeps the first position but the
    /// latest operator and value.
    pub fn set(
        &mut self,
        field: &str,
        operator: &str,
        value: impl Into<QueryValue>,
    ) -> Result<&mut Self> {
        let operator = operator.parse::<Operator>()?;
        let value = value.into().check()?;
        Ok(self.set_with(field, operator, value))
    }

    /// Set a field from a dynamic JSON value. Only strings and numbers are
    /// accepted.
    pub fn set_json(
        &mut self,
        field: &str,
        operator: &str,
        value: serde_json::Value,
    ) -> Result<&mut Self> {
        let value = QueryValue::try_from(value)?;
        self.set(field, operator, value)
    }

    /// Unchecked variant of `set` for callers that already hold an
    /// `Operator`. Values are written as given.
    pub fn set_with(
        &mut self,
        field: &str,
        operator: Operator,
        value: impl Into<QueryValue>,
    ) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.field == field) {
            Some(entry) => {
                entry.operator = operator;
                entry.value = value;
            }
            None => self.entries.push(Entry {
                field: field.to_string(),
                operator,
                value,
            }),
        }
        self
    }

    /// Shorthand for `field=value`
    pub fn set_eq(&mut self, field: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.set_with(field, Operator::Equal, value)
    }

    pub fn get(&self, field: &str) -> Option<(Operator, &QueryValue)> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| (e.operator, &e.value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn build(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{}{}{}",
                    e.field,
                    e.operator.encoded(),
                    urlencoding::encode(&e.value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
