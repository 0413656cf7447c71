//! Criteria matcher
//!
//! A criterion is one (subject, operator, predicate) triple. Subject and
//! predicate run through the variable/function pipeline before the operator
//! is applied. Evaluation never raises: numeric operators with non-numeric
//! operands, bad regexes and malformed patterns all fail the criterion.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::VarMap;
use crate::error::ScriptError;
use crate::funcs::{evaluate_text, to_num, WorldQuery};
use crate::pattern::Pattern;

/// Criterion operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionOp {
    Eq,
    Neq,
    NumEq,
    NumNeq,
    NumGt,
    NumLt,
    NumGte,
    NumLte,
    Between,
    Contains,
    Matches,
    True,
    False,
}

impl CriterionOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::NumEq => "numeq",
            Self::NumNeq => "numneq",
            Self::NumGt => "numgt",
            Self::NumLt => "numlt",
            Self::NumGte => "numgte",
            Self::NumLte => "numlte",
            Self::Between => "between",
            Self::Contains => "contains",
            Self::Matches => "matches",
            Self::True => "true",
            Self::False => "false",
        }
    }
}

impl fmt::Display for CriterionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionOp {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            "numeq" => Ok(Self::NumEq),
            "numneq" => Ok(Self::NumNeq),
            "numgt" => Ok(Self::NumGt),
            "numlt" => Ok(Self::NumLt),
            "numgte" => Ok(Self::NumGte),
            "numlte" => Ok(Self::NumLte),
            "between" => Ok(Self::Between),
            "contains" => Ok(Self::Contains),
            "matches" => Ok(Self::Matches),
            "true" => Ok(Self::True),
            "false" => Ok(Self::False),
            other => Err(ScriptError::UnknownOperator(other.to_string())),
        }
    }
}

/// One ordered trigger criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub subject: String,
    pub operator: CriterionOp,
    pub predicate: String,
}

impl Criterion {
    pub fn new(subject: impl Into<String>, operator: CriterionOp, predicate: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            operator,
            predicate: predicate.into(),
        }
    }

    /// Resolve both sides, then apply the operator.
    pub fn evaluate<W: WorldQuery + ?Sized>(&self, vars: &VarMap, world: &W) -> bool {
        let subject = evaluate_text(&self.subject, vars, world);
        let predicate = evaluate_text(&self.predicate, vars, world);
        evaluate_condition(&subject, self.operator, &predicate)
    }
}

/// Apply `operator` to already-resolved operands.
pub fn evaluate_condition(subject: &str, operator: CriterionOp, predicate: &str) -> bool {
    match operator {
        CriterionOp::Eq => subject.trim().eq_ignore_ascii_case(predicate.trim()),
        CriterionOp::Neq => !subject.trim().eq_ignore_ascii_case(predicate.trim()),
        CriterionOp::NumEq => num_cmp(subject, predicate, |a, b| a == b),
        CriterionOp::NumNeq => num_cmp(subject, predicate, |a, b| a != b),
        CriterionOp::NumGt => num_cmp(subject, predicate, |a, b| a > b),
        CriterionOp::NumLt => num_cmp(subject, predicate, |a, b| a < b),
        CriterionOp::NumGte => num_cmp(subject, predicate, |a, b| a >= b),
        CriterionOp::NumLte => num_cmp(subject, predicate, |a, b| a <= b),
        CriterionOp::Between => match (to_num(subject), parse_bounds(predicate)) {
            (Some(v), Some((lo, hi))) => lo <= v && v <= hi,
            _ => false,
        },
        CriterionOp::Contains => match Pattern::parse(predicate) {
            Ok(pattern) => pattern.matches(subject),
            Err(err) => {
                warn!(%err, predicate, "bad contains pattern");
                false
            }
        },
        CriterionOp::Matches => match Regex::new(predicate) {
            // anchored at the start, like the original engine's matcher
            Ok(re) => re.find(subject).is_some_and(|m| m.start() == 0),
            Err(err) => {
                warn!(%err, predicate, "bad regex predicate");
                false
            }
        },
        CriterionOp::True => true,
        CriterionOp::False => false,
    }
}

/// Two bounds, comma- or whitespace-separated
fn parse_bounds(predicate: &str) -> Option<(i64, i64)> {
    let parts: Vec<&str> = predicate
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 2 {
        return None;
    }
    Some((to_num(parts[0])?, to_num(parts[1])?))
}

fn num_cmp(subject: &str, predicate: &str, cmp: impl FnOnce(i64, i64) -> bool) -> bool {
    match (to_num(subject), to_num(predicate)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}
