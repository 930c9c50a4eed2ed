//! # sql-pager-toolkit
//!
//! Pagination building blocks for caller-supplied SQL. Nothing in this crate
//! talks to a database: it produces SQL and bind values, and turns the rows
//! a driver returns into pages.
//!
//! ## Core Types
//!
//! - **[`KeysetQueryBuilder`]**: Splices a seek predicate, ORDER BY and LIMIT into an analyzed statement
//! - **[`PreparedPageQuery`]**: Generated SQL plus bind values; turns fetched rows into a [`KeysetPage`]
//! - **[`PageWindow`]**: from/to, has-next/has-prev and last-page arithmetic for one page
//! - **[`SeekCursor`]**: Immutable, expiring record of where a keyset listing stopped
//! - **[`TokenStore`]** / **[`CursorStore`]**: Persistence for cursors under opaque ids
//! - **[`CursorConfig`]**: Cursor ttl and store key prefix
//! - **[`Error`]**: Error type for all of the above
//!
//! ## Flow
//!
//! - **Analyze**: `sql_shape::AnalyzedStatement` decides where the seek predicate goes
//! - **Build**: `KeysetQueryBuilder::build` returns the SQL to run
//! - **Page**: `PreparedPageQuery::into_page` and `PageWindow::from_keyset_page`
//! - **Resume**: `SeekCursor::create` + `CursorStore::save`, later `CursorStore::load`

mod builders;
mod config;
mod cursor;
mod error;
pub mod pagination;
mod store;
mod window;

// Re-export public types
pub use builders::{KeysetQueryBuilder, PreparedPageQuery};
pub use config::CursorConfig;
pub use cursor::SeekCursor;
pub use error::{Error, Result};
pub use pagination::{KeysetColumn, KeysetPage, SortDirection};
pub use store::{CursorStore, MemoryTokenStore, TokenStore};
pub use window::{PageSummary, PageWindow};
