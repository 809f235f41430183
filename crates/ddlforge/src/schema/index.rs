//! Index model.

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

/// A dialect-neutral index definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Owning table name.
    pub table: String,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    pub unique: bool,
}

impl Index {
    /// Creates an index over the given table columns.
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction("index", "an index requires a name"));
        }
        Ok(Self {
            name,
            table: table.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            unique: false,
        })
    }

    /// Marks the index UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_requires_name() {
        assert!(Index::new("", "users", &["name"]).is_err());
        let idx = Index::new("users_index_name", "users", &["name"]).unwrap();
        assert_eq!(idx.table, "users");
        assert!(!idx.unique);
    }
}
