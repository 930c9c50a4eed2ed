//! # sql-shape
//!
//! Answers structural questions about caller-supplied SQL text without
//! executing it, so pagination layers can splice in seek predicates and
//! ordering without corrupting the statement.
//!
//! ## Core Types
//!
//! - **[`AnalyzedStatement`]**: A parsed statement plus a per-statement alias cache
//! - **[`ExprKind`]**: Closed classification of SELECT-list expressions
//! - **[`ExprStage`]**: Whether an expression is row-level, aggregate or windowed
//! - **[`Error`]**: Parse-class failures
//!
//! ## Top-level rule
//!
//! A clause is top-level only when it binds to the outermost SELECT. Anything
//! inside parentheses (derived tables, scalar subqueries, a parenthesized
//! statement body) is not top-level, and every predicate answers `false` when
//! the shape is ambiguous.
//!
//! ```
//! use sql_shape::AnalyzedStatement;
//!
//! let stmt = AnalyzedStatement::analyze("SELECT user_id AS id FROM users WHERE active = 1").unwrap();
//! assert!(stmt.has_where());
//! assert!(!stmt.is_union());
//! assert_eq!(stmt.extract_alias_select_column("id"), "user_id");
//! ```

mod error;
mod render;
mod statement;

pub use error::{Error, Result};
pub use render::{ExprKind, ExprStage};
pub use statement::AnalyzedStatement;

/// Re-exported so callers can pick a dialect or inspect the tree.
pub use sqlparser;
