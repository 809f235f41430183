//! Dialect-neutral data types.

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

/// Options a data type may carry. Only `encoding`, `collate` and `time-zone`
/// are ever accepted; anything else fails construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOptions {
    /// Character encoding (rendered as `CHARACTER SET`).
    pub encoding: Option<String>,
    /// Collation name.
    pub collate: Option<String>,
    /// Whether the type carries a time zone.
    pub time_zone: bool,
}

impl TypeOptions {
    /// Returns whether no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoding.is_none() && self.collate.is_none() && !self.time_zone
    }
}

/// A symbolic, dialect-neutral data type: a type name from the canonical
/// vocabulary (`integer`, `varchar`, `numeric`, ...), ordered numeric
/// arguments (length or precision/scale) and an option bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    /// Symbolic type name, lowercase, dashes for spaces
    /// (`"double-precision"`).
    pub name: String,
    /// Ordered numeric type arguments.
    pub args: Vec<i64>,
    /// Encoding/collation/time-zone options.
    pub options: TypeOptions,
}

impl DataType {
    /// Creates a data type with no arguments and no options.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction(
                "data type",
                "a data type requires a name",
            ));
        }
        Ok(Self {
            name,
            args: Vec::new(),
            options: TypeOptions::default(),
        })
    }

    /// Adds numeric arguments (length, or precision and scale).
    #[must_use]
    pub fn with_args(mut self, args: Vec<i64>) -> Self {
        self.args = args;
        self
    }

    /// Validates and installs an option bag expressed as key/value pairs.
    ///
    /// The accepted keys are exactly `encoding`, `collate` and `time-zone`;
    /// any other key fails construction, listing the offending keys.
    pub fn with_options(mut self, pairs: &[(&str, &str)]) -> Result<Self> {
        let mut invalid = Vec::new();
        for (key, value) in pairs {
            match *key {
                "encoding" => self.options.encoding = Some((*value).to_string()),
                "collate" => self.options.collate = Some((*value).to_string()),
                "time-zone" => self.options.time_zone = true,
                other => invalid.push(other.to_string()),
            }
        }
        if invalid.is_empty() {
            Ok(self)
        } else {
            Err(DdlError::construction(
                "data type",
                format!("invalid option(s) for '{}': {}", self.name, invalid.join(", ")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_requires_name() {
        assert!(DataType::new("").is_err());
        assert!(DataType::new("integer").is_ok());
    }

    #[test]
    fn test_option_bag_is_validated() {
        let dt = DataType::new("varchar")
            .unwrap()
            .with_args(vec![100])
            .with_options(&[("collate", "utf8_bin")])
            .unwrap();
        assert_eq!(dt.options.collate.as_deref(), Some("utf8_bin"));

        let err = DataType::new("varchar")
            .unwrap()
            .with_options(&[("charset", "utf8")])
            .unwrap_err();
        assert!(err.to_string().contains("charset"));
    }

    #[test]
    fn test_option_validation_is_order_independent() {
        // The invalid key fails the same way regardless of where it appears.
        for pairs in [
            vec![("bogus", "x"), ("collate", "c"), ("encoding", "e")],
            vec![("collate", "c"), ("bogus", "x"), ("encoding", "e")],
            vec![("collate", "c"), ("encoding", "e"), ("bogus", "x")],
        ] {
            let err = DataType::new("varchar")
                .unwrap()
                .with_options(&pairs)
                .unwrap_err();
            assert!(err.to_string().contains("bogus"), "got: {err}");
        }
    }
}
