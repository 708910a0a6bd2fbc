use std::fmt;

use sqlx::{
    Arguments, FromRow,
    sqlite::{SqliteArguments, SqliteRow},
};

use crate::errors::{SearchError, SearchResult};

/// A table whose rows can be searched.
///
/// `COLUMNS` is the whitelist searchable attributes are checked against; a
/// field that is not listed here can never end up in generated SQL.
pub trait Model: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
}

/// A parameter bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => i.fmt(f),
            Self::Real(r) => r.fmt(f),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bool(b) => b.fmt(f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

/// Collects `values` into sqlite arguments, in placeholder order.
pub(crate) fn sqlite_args(values: &[Value]) -> SearchResult<SqliteArguments<'static>> {
    let mut args = SqliteArguments::default();

    for value in values {
        match value {
            Value::Null => args.add(None::<String>),
            Value::Integer(i) => args.add(*i),
            Value::Real(r) => args.add(*r),
            Value::Text(s) => args.add(s.clone()),
            Value::Bool(b) => args.add(*b),
        }
        .map_err(SearchError::QueryBuildError)?;
    }

    Ok(args)
}
