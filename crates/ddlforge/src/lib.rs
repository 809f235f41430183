//! Database-agnostic schema definition and DDL compilation.
//!
//! `ddlforge` lets callers describe SQL schemas as dialect-neutral values and
//! turns them into dialect-specific DDL, where:
//! - Schemas, tables, columns, constraints and indexes are plain data built
//!   through composable builders
//! - Compilation lowers the model to a dialect-tagged AST and renders it per
//!   dialect (H2, MySQL, PostgreSQL, SQLite, SQL Server), with the SQL
//!   standard as the shared fallback
//! - The analyzer performs the inverse transform, rebuilding the model from
//!   live database metadata
//!
//! # Architecture
//!
//! - **schema** - The abstract model and its builders
//! - **ast** - The dialect-tagged intermediate representation
//! - **compiler** - Lowering and the compile entry points
//! - **dialect** - Per-dialect rendering rules over a standard baseline
//! - **analyzer** / **metadata** - Model reconstruction from live metadata
//!
//! # Example
//!
//! ```rust
//! use ddlforge::prelude::*;
//!
//! let users = TableBuilder::new("users")
//!     .integer("id", &[ColumnOption::PrimaryKey, ColumnOption::AutoInc])
//!     .varchar("name", 100, &[ColumnOption::NotNull])
//!     .build()
//!     .unwrap();
//!
//! let statements = users.build_create(Dialect::Postgres).unwrap();
//! let sql = compile_all(&statements).unwrap();
//! assert!(sql[0].starts_with("CREATE TABLE \"users\""));
//! ```

pub mod analyzer;
pub mod ast;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod keywords;
pub mod metadata;
pub mod schema;

pub use error::{DdlError, Result};

/// Commonly used types and entry points.
pub mod prelude {
    pub use crate::analyzer::{analyze_schema, analyze_table};
    pub use crate::ast::{AlterAction, DropBehavior};
    pub use crate::compiler::{compile, compile_all, Alterable, Creatable, Dropable};
    pub use crate::dialect::Dialect;
    pub use crate::error::{DdlError, Result};
    pub use crate::schema::{
        ColumnOption, DataType, Expression, Index, ReferSpec, ReferentialAction, Schema, Table,
        TableBuilder,
    };
}
