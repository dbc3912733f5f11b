//! Car queries and URL matching
//!
//! A query is a make/model pair. It is matched against vendor URLs through
//! its slugs, never through page content.

mod matcher;
mod slug;

pub use matcher::matches;
pub use slug::slug;

use crate::QueryError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A requested car
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarQuery {
    pub make: String,
    pub model: String,
}

impl CarQuery {
    /// Creates a query from trimmed, non-empty make and model
    ///
    /// # Examples
    ///
    /// ```
    /// use rent_scout::CarQuery;
    ///
    /// let query = CarQuery::new(" BMW ", "X5").unwrap();
    /// assert_eq!(query.make, "BMW");
    /// assert!(CarQuery::new("BMW", "  ").is_err());
    /// ```
    pub fn new(make: &str, model: &str) -> Result<Self, QueryError> {
        let make = make.trim();
        let model = model.trim();

        if make.is_empty() {
            return Err(QueryError::MissingMake);
        }
        if model.is_empty() {
            return Err(QueryError::MissingModel);
        }

        Ok(Self {
            make: make.to_string(),
            model: model.to_string(),
        })
    }

    /// Parses the `MAKE:MODEL` form used on the command line
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let (make, model) = input
            .split_once(':')
            .ok_or_else(|| QueryError::Malformed(input.to_string()))?;
        Self::new(make, model)
    }

    /// Slug of `make-model`
    pub fn full_slug(&self) -> String {
        slug(&self.make, &self.model)
    }

    /// Slug of the model alone
    pub fn model_slug(&self) -> String {
        slug("", &self.model)
    }

    /// Re-validates a query that was built without [`CarQuery::new`]
    /// (e.g. deserialized), returning its trimmed form
    pub fn validated(&self) -> Result<Self, QueryError> {
        Self::new(&self.make, &self.model)
    }
}

/// Validates queries and drops those whose slugs repeat an earlier one
pub fn prepare_queries(queries: &[CarQuery]) -> Result<Vec<CarQuery>, QueryError> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(queries.len());

    for query in queries {
        let query = query.validated()?;
        if seen.insert((query.full_slug(), query.model_slug())) {
            prepared.push(query);
        }
    }

    Ok(prepared)
}
