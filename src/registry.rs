use std::{
    any::TypeId,
    fmt,
    ops::Deref,
    sync::{Arc, LazyLock},
};

use dashmap::DashMap;
use log::*;
use regex::Regex;

use crate::{
    errors::{SearchError, SearchResult},
    models::Model,
};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static GLOBAL: LazyLock<AttributeRegistry> = LazyLock::new(AttributeRegistry::default);

/// A column name that is safe to splice into SQL as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldName(String);

impl FieldName {
    /// Accepts plain SQL identifiers only; anything that would need quoting
    /// (or could smuggle SQL in) is a `WrongAttributeType`.
    pub fn parse(name: &str) -> SearchResult<Self> {
        if IDENTIFIER.is_match(name) {
            Ok(Self(name.to_owned()))
        } else {
            Err(SearchError::WrongAttributeType(name.to_owned()))
        }
    }

    /// Like `parse`, but the name must also be one of `M`'s columns.
    pub fn of<M: Model>(name: &str) -> SearchResult<Self> {
        let field = Self::parse(name)?;

        if M::COLUMNS.contains(&name) {
            Ok(field)
        } else {
            Err(SearchError::WrongAttributeType(name.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The searchable fields of one model, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeList(Arc<[FieldName]>);

impl Deref for AttributeList {
    type Target = [FieldName];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AttributeList {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(FieldName::as_str).collect()
    }
}

/// Searchable attributes per model type.
///
/// Registrations replace the whole list at once, so readers observe either
/// the old list or the new one. Concurrent writers for the same model are
/// last-write-wins with no ordering between them.
#[derive(Default, Debug)]
pub struct AttributeRegistry {
    attributes: DashMap<TypeId, AttributeList>,
}

impl AttributeRegistry {
    /// Shared registry for callers that don't carry their own.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn set_attributes<M, I, S>(&self, fields: I) -> SearchResult<()>
    where
        M: Model,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|name| FieldName::of::<M>(name.as_ref()))
            .collect::<SearchResult<Arc<[_]>>>()
            .inspect_err(|e| warn!("Not registering attributes for {}: {e}", M::TABLE))?;

        debug!(
            "Registering {} searchable attribute(s) for {}",
            fields.len(),
            M::TABLE
        );

        self.attributes.insert(TypeId::of::<M>(), AttributeList(fields));

        Ok(())
    }

    pub fn attributes<M: Model>(&self) -> Option<AttributeList> {
        self.attributes
            .get(&TypeId::of::<M>())
            .map(|entry| entry.value().clone())
    }

    pub fn clear(&self) {
        self.attributes.clear();
    }
}
