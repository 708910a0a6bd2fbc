use std::{fmt, marker::PhantomData};

use futures::stream::BoxStream;
use log::*;
use sqlx::{Sqlite, sqlite::SqliteArguments};

use crate::{
    conditions::Condition,
    config::Config,
    errors::{SearchError, SearchResult},
    models::{Model, Value, sqlite_args},
    registry::{AttributeRegistry, FieldName},
    sanitizers::{PatternKind, SearchTerm},
};

type ExtraConditionHook<'h> = Box<dyn FnOnce(&str) -> serde_json::Value + 'h>;

/// How `search` should interpret its term.
#[derive(Default)]
pub struct SearchOptions<'h> {
    pub pattern: PatternKind,
    pub escape_wildcards: bool,
    extra: Option<ExtraConditionHook<'h>>,
}

impl<'h> SearchOptions<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: PatternKind) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn escape_wildcards(mut self, escape: bool) -> Self {
        self.escape_wildcards = escape;
        self
    }

    /// Adds a hook producing one more condition, AND-ed onto the search.
    ///
    /// The hook receives the raw term and must return a JSON array: a
    /// template string followed by one value per `?` in it, e.g.
    /// `json!(["AND age > ?", 50])`.
    pub fn extra_condition<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&str) -> serde_json::Value + 'h,
    {
        self.extra = Some(Box::new(hook));
        self
    }
}

impl From<&Config> for SearchOptions<'_> {
    fn from(config: &Config) -> Self {
        Self {
            pattern: config.default_pattern,
            escape_wildcards: config.escape_wildcards,
            extra: None,
        }
    }
}

impl fmt::Debug for SearchOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("pattern", &self.pattern)
            .field("escape_wildcards", &self.escape_wildcards)
            .field("extra", &self.extra.is_some())
            .finish()
    }
}

/// Builds the query for `term` over `M`'s registered attributes.
///
/// Every field gets `<field> LIKE ?` bound to the term rendered through the
/// pattern; those are OR-ed together and then AND-ed with the extra
/// condition, if any. Nothing is executed here: the returned relation runs
/// when it is fetched from.
pub fn search<M: Model>(
    registry: &AttributeRegistry,
    term: &str,
    options: SearchOptions<'_>,
) -> SearchResult<Relation<M>> {
    let attributes = registry
        .attributes::<M>()
        .filter(|attrs| !attrs.is_empty())
        .ok_or(SearchError::AttributesMissing(M::TABLE))?;

    let search_term = if options.escape_wildcards {
        SearchTerm::escaped(term)
    } else {
        SearchTerm::from(term)
    };
    let pattern = search_term.render(options.pattern);

    let likes = attributes
        .iter()
        .map(|field| Condition::like(field, &search_term, pattern.clone()));

    // attributes are non-empty, so there's always something to join
    let mut condition = Condition::any(likes).ok_or(SearchError::AttributesMissing(M::TABLE))?;

    if let Some(hook) = options.extra {
        let extra = Condition::try_from(hook(term))?;
        condition = condition.and(extra);
    }

    debug!(
        "Built {} search on {} ({} param(s)): {}",
        options.pattern,
        M::TABLE,
        condition.params().len(),
        condition.template()
    );

    Relation::filter(condition)
}

/// A not-yet-executed `SELECT` over `M`'s table.
pub struct Relation<M> {
    condition: Option<Condition>,
    sql: String,
    arguments: SqliteArguments<'static>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Relation<M> {
    pub fn all() -> SearchResult<Self> {
        Self::build(None)
    }

    pub fn filter(condition: Condition) -> SearchResult<Self> {
        Self::build(Some(condition))
    }

    /// Equality lookup on a single column of `M`.
    pub fn find_by(field: &str, value: impl Into<Value>) -> SearchResult<Self> {
        let field = FieldName::of::<M>(field)?;

        Self::filter(Condition::eq(&field, value))
    }

    fn build(condition: Option<Condition>) -> SearchResult<Self> {
        let mut sql = format!("SELECT * FROM {}", M::TABLE);

        if let Some(cond) = &condition {
            sql.push_str(" WHERE ");
            sql.push_str(cond.template());
        }

        let params = condition.as_ref().map(Condition::params).unwrap_or_default();
        let arguments = sqlite_args(params)?;

        Ok(Self {
            condition,
            sql,
            arguments,
            _model: PhantomData,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn params(&self) -> &[Value] {
        self.condition
            .as_ref()
            .map(Condition::params)
            .unwrap_or_default()
    }

    // built once in `build`; each execution consumes a copy
    fn args<'q>(&self) -> SqliteArguments<'q> {
        self.arguments.clone()
    }

    pub fn fetch<'e, 'c: 'e, E>(&'e self, db: E) -> BoxStream<'e, Result<M, sqlx::Error>>
    where
        E: 'e + sqlx::Executor<'c, Database = Sqlite>,
    {
        sqlx::query_as_with::<_, M, _>(&self.sql, self.args()).fetch(db)
    }

    pub async fn fetch_all<'e, 'c: 'e, E>(&'e self, db: E) -> SearchResult<Vec<M>>
    where
        E: 'e + sqlx::Executor<'c, Database = Sqlite>,
    {
        let rows = sqlx::query_as_with::<_, M, _>(&self.sql, self.args())
            .fetch_all(db)
            .await?;

        Ok(rows)
    }

    pub async fn fetch_optional<'e, 'c: 'e, E>(&'e self, db: E) -> SearchResult<Option<M>>
    where
        E: 'e + sqlx::Executor<'c, Database = Sqlite>,
    {
        let row = sqlx::query_as_with::<_, M, _>(&self.sql, self.args())
            .fetch_optional(db)
            .await?;

        Ok(row)
    }

    pub async fn count<'e, 'c: 'e, E>(&'e self, db: E) -> SearchResult<i64>
    where
        E: 'e + sqlx::Executor<'c, Database = Sqlite>,
    {
        let sql = format!("SELECT COUNT(*) FROM ({})", self.sql);

        let n = sqlx::query_scalar_with::<_, i64, _>(&sql, self.args())
            .fetch_one(db)
            .await?;

        Ok(n)
    }
}

impl<M> Clone for Relation<M> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            sql: self.sql.clone(),
            arguments: self.arguments.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> PartialEq for Relation<M> {
    fn eq(&self, other: &Self) -> bool {
        self.sql == other.sql && self.condition == other.condition
    }
}

impl<M> fmt::Debug for Relation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("sql", &self.sql)
            .field("params", &self.condition.as_ref().map(Condition::params))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;
    use sqlx::FromRow;

    use super::*;

    #[derive(FromRow)]
    #[allow(dead_code)]
    struct User {
        name: String,
        email: String,
        age: i64,
    }

    impl Model for User {
        const TABLE: &'static str = "users";
        const COLUMNS: &'static [&'static str] = &["name", "email", "age"];
    }

    fn registry() -> AttributeRegistry {
        let registry = AttributeRegistry::default();
        registry.set_attributes::<User, _, _>(["name", "email"]).unwrap();
        registry
    }

    #[test]
    fn missing_attributes_fail_for_every_term() {
        let registry = AttributeRegistry::default();

        for term in ["", "usa", "%"] {
            let err = search::<User>(&registry, term, SearchOptions::new()).unwrap_err();
            assert!(matches!(err, SearchError::AttributesMissing("users")));
        }
    }

    #[test]
    fn empty_registration_counts_as_missing() {
        let registry = AttributeRegistry::default();
        registry.set_attributes::<User, _, _>(Vec::<&str>::new()).unwrap();

        let err = search::<User>(&registry, "usa", SearchOptions::new()).unwrap_err();

        assert!(matches!(err, SearchError::AttributesMissing(..)));
    }

    #[test]
    fn defaults_to_containing() {
        let rel = search::<User>(&registry(), "al", SearchOptions::new()).unwrap();

        assert_eq!(rel.sql(), "SELECT * FROM users WHERE name LIKE ? OR email LIKE ?");
        assert_eq!(rel.params(), &[Value::from("%al%"), Value::from("%al%")]);
    }

    #[test]
    fn renders_requested_pattern_for_every_field() {
        let registry = registry();

        for kind in PatternKind::ALL {
            let rel =
                search::<User>(&registry, "al", SearchOptions::new().pattern(kind)).unwrap();
            let expected = Value::from(kind.template().replace('q', "al"));

            assert!(rel.params().iter().all(|p| *p == expected), "{kind}");
        }
    }

    #[test]
    fn hook_is_called_once_with_the_term() {
        let calls = Cell::new(0);
        let options = SearchOptions::new()
            .pattern(PatternKind::Plain)
            .extra_condition(|term| {
                calls.set(calls.get() + 1);
                assert_eq!(term, "usa");
                json!(["AND age > ?", 50])
            });

        let rel = search::<User>(&registry(), "usa", options).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(
            rel.sql(),
            "SELECT * FROM users WHERE (name LIKE ? OR email LIKE ?) AND (age > ?)"
        );
        assert_eq!(
            rel.params(),
            &[Value::from("usa"), Value::from("usa"), Value::from(50)]
        );
    }

    #[test]
    fn hook_is_not_called_without_attributes() {
        let called = Cell::new(false);
        let options = SearchOptions::new().extra_condition(|_| {
            called.set(true);
            json!(["AND age > ?", 50])
        });

        assert!(search::<User>(&AttributeRegistry::default(), "usa", options).is_err());
        assert!(!called.get());
    }

    #[test]
    fn hook_errors_propagate() {
        let err = search::<User>(
            &registry(),
            "usa",
            SearchOptions::new().extra_condition(|_| json!(["AND age > ?", 50, 60])),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidCondition { .. }));

        let err = search::<User>(
            &registry(),
            "usa",
            SearchOptions::new().extra_condition(|_| json!("Wrong return")),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidType(..)));
    }

    #[test]
    fn escaping_makes_wildcards_literal() {
        let rel = search::<User>(
            &registry(),
            "5%",
            SearchOptions::new()
                .pattern(PatternKind::Beginning)
                .escape_wildcards(true),
        )
        .unwrap();

        assert_eq!(
            rel.sql(),
            r"SELECT * FROM users WHERE name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\'"
        );
        assert_eq!(rel.params()[0], Value::from(r"5\%%"));
    }

    #[test]
    fn options_follow_config() {
        let config = Config {
            default_pattern: PatternKind::Ending,
            escape_wildcards: true,
            ..Config::default()
        };

        let options = SearchOptions::from(&config);

        assert_eq!(options.pattern, PatternKind::Ending);
        assert!(options.escape_wildcards);
    }

    #[test]
    fn find_by_checks_the_column() {
        let rel = Relation::<User>::find_by("name", "alice").unwrap();
        assert_eq!(rel.sql(), "SELECT * FROM users WHERE name = ?");

        assert!(Relation::<User>::find_by("password", "x").is_err());
    }

    #[test]
    fn all_has_no_where_clause() {
        let rel = Relation::<User>::all().unwrap();

        assert_eq!(rel.sql(), "SELECT * FROM users");
        assert!(rel.params().is_empty());
    }

    #[test]
    fn arguments_are_built_with_the_relation() {
        use sqlx::Arguments;

        let options = SearchOptions::new().extra_condition(|_| json!(["AND age > ?", 50]));
        let rel = search::<User>(&registry(), "usa", options).unwrap();

        assert_eq!(rel.arguments.len(), rel.params().len());
        assert_eq!(rel.clone().arguments.len(), 3);
        assert_eq!(Relation::<User>::all().unwrap().arguments.len(), 0);
    }
}
