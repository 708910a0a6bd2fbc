//! Attribute-driven `LIKE` search over sqlx models.
//!
//! A model whitelists the columns that may be searched, once:
//!
//! ```ignore
//! registry.set_attributes::<User, _, _>(["name", "email", "address"])?;
//! ```
//!
//! after which a term can be looked up across all of them, optionally
//! narrowed by an extra condition:
//!
//! ```ignore
//! let users = search::<User>(
//!     &registry,
//!     "usa",
//!     SearchOptions::new()
//!         .pattern(PatternKind::Plain)
//!         .extra_condition(|_term| json!(["AND age > ?", 50])),
//! )?
//! .fetch_all(&pool)
//! .await?;
//! ```

pub mod conditions;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod registry;
pub mod sanitizers;
pub mod search;

pub use conditions::Condition;
pub use config::Config;
pub use errors::{SearchError, SearchResult};
pub use models::{Model, Value};
pub use registry::{AttributeList, AttributeRegistry, FieldName};
pub use sanitizers::{PatternKind, SearchTerm};
pub use search::{Relation, SearchOptions, search};
