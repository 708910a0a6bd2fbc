pub type SearchResult<T> = Result<T, SearchError>;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("no searchable attributes registered for `{0}`")]
    AttributesMissing(&'static str),
    #[error("`{0}` is not a searchable attribute name")]
    WrongAttributeType(String),
    #[error("unknown search pattern `{0}`")]
    InvalidPattern(String),
    #[error("condition has {placeholders} placeholder(s) but {params} parameter(s)")]
    InvalidCondition { placeholders: usize, params: usize },
    #[error("extra condition has the wrong shape: {0}")]
    InvalidType(String),

    #[error("database error: {0}")]
    DbError(#[from] sqlx::Error),
    #[error("failed to build query arguments: {0}")]
    QueryBuildError(sqlx::error::BoxDynError),
}

impl SearchError {
    /// True for the errors raised while validating input, before any query
    /// reaches the database.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::DbError(..) | Self::QueryBuildError(..))
    }
}
