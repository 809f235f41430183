//! Column model and column options.

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

use super::constraint::{MatchType, ReferentialAction};
use super::data_type::DataType;
use super::expression::Expression;

/// A column default: either a value expression or the explicit "drop the
/// default" sentinel used by alter-MODIFY compilation. `None` on the column
/// means "no default" and is distinct from `Drop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultClause {
    /// `DEFAULT <expr>`.
    Value(Expression),
    /// Drop an existing default (alter-only sentinel).
    Drop,
}

/// A dialect-neutral column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Data type, absent for type-less alter elements.
    pub data_type: Option<DataType>,
    /// Default clause, if any.
    pub default: Option<DefaultClause>,
    /// Whether the column auto-increments.
    pub auto_inc: bool,
    /// Whether the column is NOT NULL.
    pub not_null: bool,
    /// Free-form engine-specific clause strings appended verbatim.
    pub others: Vec<String>,
}

impl Column {
    /// Creates a column with no type and no options.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction(
                "column",
                "a column requires a name",
            ));
        }
        Ok(Self {
            name,
            data_type: None,
            default: None,
            auto_inc: false,
            not_null: false,
            others: Vec::new(),
        })
    }

    /// Sets the data type.
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }
}

/// A foreign-key reference attached to a column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferSpec {
    /// Referenced table.
    pub table: String,
    /// Referenced columns; empty means "same as the local columns".
    pub columns: Vec<String>,
    /// Optional MATCH type.
    pub match_type: Option<MatchType>,
    /// Optional ON DELETE action.
    pub on_delete: Option<ReferentialAction>,
    /// Optional ON UPDATE action.
    pub on_update: Option<ReferentialAction>,
}

impl ReferSpec {
    /// References the given table, defaulting the referenced columns to the
    /// local ones.
    #[must_use]
    pub fn to(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            match_type: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the referenced columns.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the MATCH type.
    #[must_use]
    pub fn match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Options accepted by the column-defining builder calls.
///
/// `Unique`, `PrimaryKey` and `Refer` do double duty: besides marking the
/// column they make the table builder synthesize and attach the matching
/// table-level constraint, named by the deterministic rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOption {
    /// NOT NULL.
    NotNull,
    /// Explicitly nullable (the default).
    Null,
    /// Auto-increment.
    AutoInc,
    /// Synthesize a single-column unique constraint.
    Unique,
    /// Synthesize a single-column primary-key constraint.
    PrimaryKey,
    /// `DEFAULT <expr>`.
    Default(Expression),
    /// Drop an existing default (alter-only).
    DropDefault,
    /// Character encoding for the data type.
    Encoding(String),
    /// Collation for the data type.
    Collate(String),
    /// WITH TIME ZONE for the data type.
    TimeZone,
    /// Synthesize a foreign-key constraint referencing another table.
    Refer(ReferSpec),
    /// Free-form clause string appended verbatim.
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_requires_name() {
        assert!(Column::new("").is_err());
        let col = Column::new("foo").unwrap();
        assert!(col.data_type.is_none());
        assert!(!col.not_null);
    }

    #[test]
    fn test_refer_spec_defaults_columns_to_local() {
        let spec = ReferSpec::to("users").on_delete(ReferentialAction::Cascade);
        assert!(spec.columns.is_empty());
        assert_eq!(spec.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(spec.on_update, None);
    }
}
