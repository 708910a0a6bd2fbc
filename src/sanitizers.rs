use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::SearchError;

/// Where the search term must appear in a field for it to match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// The whole field, as given
    Plain,
    /// At the start of the field
    Beginning,
    /// At the end of the field
    Ending,
    /// Anywhere in the field
    #[default]
    Containing,
    /// Surrounded by exactly one character on each side
    Underscore,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        Self::Plain,
        Self::Beginning,
        Self::Ending,
        Self::Containing,
        Self::Underscore,
    ];

    pub const fn key(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Beginning => "beginning",
            Self::Ending => "ending",
            Self::Containing => "containing",
            Self::Underscore => "underscore",
        }
    }

    /// The pattern shape, with `q` standing in for the term.
    pub const fn template(&self) -> &'static str {
        match self {
            Self::Plain => "q",
            Self::Beginning => "q%",
            Self::Ending => "%q",
            Self::Containing => "%q%",
            Self::Underscore => "_q_",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PatternKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| SearchError::InvalidPattern(s.to_owned()))
    }
}

// Search terms for SQL `LIKE` pattern matching; wildcards in the raw term are
// passed through unless the term is built with `escaped`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    escaped: bool,
}

impl From<&str> for SearchTerm {
    fn from(raw: &str) -> Self {
        Self {
            text: raw.to_owned(),
            escaped: false,
        }
    }
}

impl SearchTerm {
    pub const ESCAPE_CHAR: char = '\\';

    pub fn escaped(raw: &str) -> Self {
        let text = raw
            .replace("\\", "\\\\")
            .replace("%", "\\%")
            .replace("_", "\\_");

        Self {
            text,
            escaped: true,
        }
    }

    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    pub fn render(&self, kind: PatternKind) -> String {
        match kind {
            PatternKind::Plain => self.text.clone(),
            PatternKind::Beginning => format!("{}%", self.text),
            PatternKind::Ending => format!("%{}", self.text),
            PatternKind::Containing => self.anywhere(),
            PatternKind::Underscore => format!("_{}_", self.text),
        }
    }

    pub fn anywhere(&self) -> String {
        format!("%{}%", self.text)
    }
}
