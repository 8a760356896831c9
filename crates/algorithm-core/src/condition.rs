//! Edge condition evaluation: decides whether an edge is taken for the response
//! recorded at its source node.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::UnknownConditionPolicy;
use crate::core::{AlgorithmEdge, ConditionType};

/// Raw value a user submits at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Response {
    /// Sentinel submitted at start and generic nodes.
    pub const CONTINUE: &'static str = "continue";
    /// Sentinel submitted when an action node is acknowledged.
    pub const ACKNOWLEDGED: &'static str = "completed";

    pub fn proceed() -> Self {
        Response::Text(Self::CONTINUE.to_string())
    }

    pub fn acknowledged() -> Self {
        Response::Text(Self::ACKNOWLEDGED.to_string())
    }

    /// Textual form used by `equals` and `contains`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Response::Bool(b) => Cow::Owned(b.to_string()),
            Response::Number(n) => Cow::Owned(n.to_string()),
            Response::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Response::Number(n) => Some(*n),
            Response::Text(s) => parse_number(s),
            Response::Bool(_) => None,
        }
    }

    fn is_bool(&self, expected: bool) -> bool {
        match self {
            Response::Bool(b) => *b == expected,
            other => other.as_text().trim().to_lowercase() == expected.to_string(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<bool> for Response {
    fn from(b: bool) -> Self {
        Response::Bool(b)
    }
}

impl From<f64> for Response {
    fn from(n: f64) -> Self {
        Response::Number(n)
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Response::Text(s.to_string())
    }
}

impl From<String> for Response {
    fn from(s: String) -> Self {
        Response::Text(s)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn compare_numeric<F>(response: &Response, operand: Option<&str>, compare: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let Some(lhs) = response.as_number() else {
        return false;
    };
    let Some(rhs) = operand.and_then(parse_number) else {
        return false;
    };
    compare(lhs, rhs)
}

/// Evaluate a single edge against `response`.
pub fn edge_matches(
    edge: &AlgorithmEdge,
    response: &Response,
    unknown: UnknownConditionPolicy,
) -> bool {
    let Some(condition_type) = &edge.condition_type else {
        return true;
    };
    let operand = edge.condition_value.as_deref();
    match condition_type {
        ConditionType::Equals => operand.is_some_and(|v| response.as_text() == v),
        ConditionType::GreaterThan => compare_numeric(response, operand, |a, b| a > b),
        ConditionType::LessThan => compare_numeric(response, operand, |a, b| a < b),
        ConditionType::Contains => operand.is_some_and(|v| {
            response
                .as_text()
                .to_lowercase()
                .contains(&v.to_lowercase())
        }),
        ConditionType::True => response.is_bool(true),
        ConditionType::False => response.is_bool(false),
        ConditionType::Unknown(raw) => {
            let matched = matches!(unknown, UnknownConditionPolicy::AlwaysMatch);
            tracing::warn!(
                edge_id = %edge.id,
                condition_type = %raw,
                matched,
                "unrecognized edge condition type"
            );
            matched
        }
    }
}
