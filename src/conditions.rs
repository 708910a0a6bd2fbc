use log::*;
use serde_json::Value as Json;

use crate::{
    errors::{SearchError, SearchResult},
    models::Value,
    registry::FieldName,
    sanitizers::SearchTerm,
};

/// A predicate template with `?` placeholders and the values bound to them,
/// in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    template: String,
    params: Vec<Value>,
}

impl Condition {
    pub fn new(template: impl Into<String>, params: Vec<Value>) -> SearchResult<Self> {
        let template = template.into();
        let placeholders = count_placeholders(&template);

        if placeholders != params.len() {
            warn!(
                "Rejecting condition {template:?}: {placeholders} placeholder(s), {} param(s)",
                params.len()
            );
            return Err(SearchError::InvalidCondition {
                placeholders,
                params: params.len(),
            });
        }

        Ok(Self { template, params })
    }

    pub fn like(field: &FieldName, term: &SearchTerm, pattern: String) -> Self {
        let template = if term.is_escaped() {
            format!("{field} LIKE ? ESCAPE '{}'", SearchTerm::ESCAPE_CHAR)
        } else {
            format!("{field} LIKE ?")
        };

        Self {
            template,
            params: vec![Value::Text(pattern)],
        }
    }

    pub fn eq(field: &FieldName, value: impl Into<Value>) -> Self {
        Self {
            template: format!("{field} = ?"),
            params: vec![value.into()],
        }
    }

    /// OR-joins conditions in order; `None` if there are none to join.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Option<Self> {
        conditions.into_iter().reduce(|mut acc, cond| {
            acc.template.push_str(" OR ");
            acc.template.push_str(&cond.template);
            acc.params.extend(cond.params);
            acc
        })
    }

    /// AND-joins `other` after `self`. Both sides are parenthesized, so an OR
    /// chain on either side keeps its meaning. A leading `AND` in `other` is
    /// accepted and dropped.
    pub fn and(mut self, other: Condition) -> Self {
        self.template = format!(
            "({}) AND ({})",
            self.template,
            strip_conjunction(&other.template)
        );
        self.params.extend(other.params);
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.template, self.params)
    }
}

// hook output: `["AND age > ?", 50]`
impl TryFrom<Json> for Condition {
    type Error = SearchError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        let mut items = match json {
            Json::Array(items) => items,
            other => {
                return Err(invalid_type(format!(
                    "expected an array, got {}",
                    describe(&other)
                )));
            }
        };

        if items.is_empty() {
            return Err(invalid_type("expected a condition template, got an empty array".into()));
        }

        let template = match items.remove(0) {
            Json::String(template) => template,
            other => {
                return Err(invalid_type(format!(
                    "expected the first element to be a condition template, got {}",
                    describe(&other)
                )));
            }
        };

        let operand = strip_conjunction(&template);
        if operand.is_empty() {
            return Err(invalid_type(format!(
                "condition template {template:?} has no predicate"
            )));
        }
        if strip_keyword(operand, "and").is_some() || strip_keyword(operand, "or").is_some() {
            return Err(invalid_type(format!(
                "condition template {template:?} starts with a dangling conjunction"
            )));
        }

        let params = items
            .into_iter()
            .map(Value::try_from)
            .collect::<SearchResult<Vec<_>>>()?;

        Self::new(template, params)
    }
}

impl TryFrom<Json> for Value {
    type Error = SearchError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        match json {
            Json::Null => Ok(Self::Null),
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n
                    .as_f64()
                    .map(Self::Real)
                    .ok_or_else(|| invalid_type(format!("unrepresentable number {n}"))),
            },
            Json::String(s) => Ok(Self::Text(s)),
            other => Err(invalid_type(format!(
                "expected a scalar parameter, got {}",
                describe(&other)
            ))),
        }
    }
}

fn invalid_type(reason: String) -> SearchError {
    warn!("Rejecting extra condition: {reason}");
    SearchError::InvalidType(reason)
}

fn describe(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(..) => "a boolean",
        Json::Number(..) => "a number",
        Json::String(..) => "a string",
        Json::Array(..) => "an array",
        Json::Object(..) => "an object",
    }
}

fn count_placeholders(template: &str) -> usize {
    template.matches('?').count()
}

// the rest of `template` if it opens with `keyword` as a whole word
fn strip_keyword<'t>(template: &'t str, keyword: &str) -> Option<&'t str> {
    let trimmed = template.trim_start();
    let head = trimmed.get(..keyword.len())?;
    let rest = &trimmed[keyword.len()..];

    let whole_word = rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '(');

    (head.eq_ignore_ascii_case(keyword) && whole_word).then(|| rest.trim())
}

fn strip_conjunction(template: &str) -> &str {
    strip_keyword(template, "and").unwrap_or_else(|| template.trim())
}
