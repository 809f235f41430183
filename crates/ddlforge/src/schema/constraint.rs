//! Table constraint variants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

use super::expression::Expression;

/// Kind of a unique-style constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniqueKind {
    /// UNIQUE.
    Unique,
    /// PRIMARY KEY. At most one per table is the caller's responsibility.
    PrimaryKey,
}

impl UniqueKind {
    /// Symbolic tag used by the deterministic name generator.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::PrimaryKey => "primary-key",
        }
    }
}

/// MATCH type of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// MATCH FULL.
    Full,
    /// MATCH PARTIAL.
    Partial,
    /// MATCH SIMPLE.
    Simple,
}

impl MatchType {
    /// SQL text of the match type.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Partial => "PARTIAL",
            Self::Simple => "SIMPLE",
        }
    }
}

/// Triggered referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// ON ... CASCADE.
    Cascade,
    /// ON ... SET NULL.
    SetNull,
    /// ON ... RESTRICT.
    Restrict,
    /// ON ... SET DEFAULT.
    SetDefault,
    /// ON ... NO ACTION.
    NoAction,
}

impl ReferentialAction {
    /// SQL text of the action.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// A UNIQUE or PRIMARY KEY constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name.
    pub name: String,
    /// Unique or primary-key.
    pub kind: UniqueKind,
    /// Ordered column names.
    pub columns: Vec<String>,
}

/// A FOREIGN KEY constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name.
    pub name: String,
    /// Ordered local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub parent_table: String,
    /// Ordered referenced columns; defaults to the local columns when empty
    /// at construction.
    pub parent_columns: Vec<String>,
    /// Optional MATCH type.
    pub match_type: Option<MatchType>,
    /// Optional ON DELETE action.
    pub on_delete: Option<ReferentialAction>,
    /// Optional ON UPDATE action.
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKeyConstraint {
    /// Validates the local/referenced column correspondence: the referenced
    /// list either matches the local count or is empty (meaning "same
    /// columns").
    pub fn validate(&self) -> Result<()> {
        if !self.parent_columns.is_empty() && self.parent_columns.len() != self.columns.len() {
            return Err(DdlError::construction(
                "foreign key constraint",
                format!(
                    "'{}' references {} column(s) but lists {} local column(s)",
                    self.name,
                    self.parent_columns.len(),
                    self.columns.len()
                ),
            ));
        }
        Ok(())
    }

    /// The referenced columns, resolving the empty list to the local ones.
    #[must_use]
    pub fn resolved_parent_columns(&self) -> &[String] {
        if self.parent_columns.is_empty() {
            &self.columns
        } else {
            &self.parent_columns
        }
    }
}

/// A CHECK constraint with its structured condition and the set of column
/// identifiers the condition references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Constraint name.
    pub name: String,
    /// Condition expression.
    pub condition: Expression,
    /// Identifier names referenced by the condition.
    pub identifiers: BTreeSet<String>,
}

impl CheckConstraint {
    /// Builds a check constraint, collecting the referenced identifiers from
    /// the condition.
    pub fn new(name: impl Into<String>, condition: Expression) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction(
                "check constraint",
                "a check constraint requires a name",
            ));
        }
        let mut identifiers = BTreeSet::new();
        condition.referenced_identifiers(&mut identifiers);
        Ok(Self {
            name,
            condition,
            identifiers,
        })
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// UNIQUE / PRIMARY KEY.
    Unique(UniqueConstraint),
    /// FOREIGN KEY.
    ForeignKey(ForeignKeyConstraint),
    /// CHECK.
    Check(CheckConstraint),
    /// A bare named placeholder, used only to express "drop this constraint"
    /// in alter operations.
    Named(String),
}

impl Constraint {
    /// The constraint name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Unique(c) => &c.name,
            Self::ForeignKey(c) => &c.name,
            Self::Check(c) => &c.name,
            Self::Named(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_column_count_validation() {
        let fk = ForeignKeyConstraint {
            name: "posts_fkey_user_id".into(),
            columns: vec!["user_id".into()],
            parent_table: "users".into(),
            parent_columns: vec!["id".into(), "extra".into()],
            match_type: None,
            on_delete: None,
            on_update: None,
        };
        assert!(fk.validate().is_err());
    }

    #[test]
    fn test_foreign_key_parent_columns_default_to_local() {
        let fk = ForeignKeyConstraint {
            name: "posts_fkey_user_id".into(),
            columns: vec!["user_id".into()],
            parent_table: "users".into(),
            parent_columns: vec![],
            match_type: None,
            on_delete: None,
            on_update: None,
        };
        assert!(fk.validate().is_ok());
        assert_eq!(fk.resolved_parent_columns(), ["user_id".to_string()]);
    }

    #[test]
    fn test_check_constraint_collects_identifiers() {
        let check = CheckConstraint::new(
            "users_check_age",
            Expression::op(
                ">=",
                vec![Expression::identifier("age"), Expression::integer(0)],
            ),
        )
        .unwrap();
        assert!(check.identifiers.contains("age"));
        assert_eq!(check.identifiers.len(), 1);
    }
}
