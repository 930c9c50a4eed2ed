//! # sql-pager
//!
//! Keyset and offset pagination over caller-supplied SQL.
//!
//! ## Crates
//!
//! - **[`sql_shape`]**: Statement analysis (top-level clause detection, alias resolution)
//! - **[`sql_pager_toolkit`]**: Keyset SQL generation, page windows, seek cursors and token stores
//!
//! This crate re-exports both and adds [`ListingPager`], which runs the whole
//! cycle for a listing endpoint:
//!
//! ```no_run
//! use sql_pager::{CursorConfig, KeysetColumn, ListingPager, MemoryTokenStore};
//!
//! # async fn run() -> sql_pager::Result<()> {
//! let pager = ListingPager::new(MemoryTokenStore::new(), CursorConfig::default());
//!
//! let query = pager
//!    .prepare(
//!       "SELECT id, title FROM posts WHERE published = $1",
//!       vec![serde_json::json!(true)],
//!       vec![KeysetColumn::desc("id")],
//!       20,
//!       None,
//!    )
//!    .await?;
//!
//! // Execute query.sql() with query.values() using any driver
//! let rows = Vec::new();
//!
//! let listing = query.finish(rows, &pager).await?;
//! println!("{:?}", listing.next_cursor_id);
//! # Ok(())
//! # }
//! ```

mod listing;

pub use listing::{Listing, ListingPager, ListingQuery};

pub use sql_pager_toolkit::{
   CursorConfig, CursorStore, Error, KeysetColumn, KeysetPage, KeysetQueryBuilder, MemoryTokenStore,
   PageSummary, PageWindow, PreparedPageQuery, Result, SeekCursor, SortDirection, TokenStore,
};
pub use sql_shape::{AnalyzedStatement, ExprKind, ExprStage};

pub use sql_pager_toolkit;
pub use sql_shape;
