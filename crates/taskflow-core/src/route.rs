//! Navigation routes.
//!
//! Two screens exist: the root list (`/`) with every non-archived task, and a
//! per-category list (`/category/{id}`).

use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;
use crate::ids::CategoryId;

/// A navigable location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    #[default]
    AllTasks,
    /// `/category/{id}`
    Category(CategoryId),
}

impl Route {
    /// The category parameter, if any.
    pub fn category_id(self) -> Option<CategoryId> {
        match self {
            Self::AllTasks => None,
            Self::Category(id) => Some(id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTasks => f.write_str("/"),
            Self::Category(id) => write!(f, "/category/{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = ParseError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::AllTasks);
        }
        match trimmed.strip_prefix("/category/") {
            Some(id) if !id.contains('/') => id
                .parse()
                .map(Self::Category)
                .map_err(|_| ParseError::UnknownRoute(path.to_owned())),
            _ => Err(ParseError::UnknownRoute(path.to_owned())),
        }
    }
}
