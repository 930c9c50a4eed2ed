//! One-call keyset listings with server-side resumable cursors

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sql_pager_toolkit::{
   CursorConfig, CursorStore, KeysetColumn, KeysetQueryBuilder, PageSummary, PageWindow,
   PreparedPageQuery, Result, SeekCursor, TokenStore,
};
use sql_shape::AnalyzedStatement;
use tracing::debug;

/// Page links shown on each side of the current page unless configured.
const DEFAULT_EACH_SIDE: u64 = 2;

/// Runs the analyze → seek → page → persist cycle for keyset listings.
///
/// Callers hand in SQL and an optional cursor id, execute the returned
/// query with their own driver, then pass the rows to
/// [`ListingQuery::finish`]. A cursor id that is unknown, expired or was
/// taken under a different ordering restarts the listing at page one.
#[derive(Debug, Clone)]
pub struct ListingPager<S> {
   cursors: CursorStore<S>,
   each_side: u64,
}

impl<S: TokenStore> ListingPager<S> {
   pub fn new(store: S, config: CursorConfig) -> Self {
      Self {
         cursors: CursorStore::new(store, config),
         each_side: DEFAULT_EACH_SIDE,
      }
   }

   /// Number of neighboring page links reported on each side.
   pub fn each_side(mut self, each_side: u64) -> Self {
      self.each_side = each_side;
      self
   }

   pub fn cursors(&self) -> &CursorStore<S> {
      &self.cursors
   }

   /// Build the query for the page after `cursor_id`, or the first page.
   pub async fn prepare(
      &self,
      sql: &str,
      values: Vec<JsonValue>,
      keyset: Vec<KeysetColumn>,
      page_size: usize,
      cursor_id: Option<&str>,
   ) -> Result<ListingQuery> {
      let statement = AnalyzedStatement::analyze(sql)?;

      let cursor = match cursor_id {
         Some(id) => self.cursors.load(id).await?,
         None => None,
      };

      let cursor = cursor.filter(|c| {
         let same_ordering = c.ordering() == keyset.as_slice();
         if !same_ordering {
            debug!("seek cursor ordering differs from requested keyset, restarting listing");
         }
         same_ordering
      });

      let mut builder = KeysetQueryBuilder::new(&statement, values, keyset, page_size);
      let page = match &cursor {
         Some(c) => {
            builder = builder.after(c.cursor_values());
            c.page().saturating_add(1)
         }
         None => 1,
      };

      Ok(ListingQuery {
         prepared: builder.build()?,
         page,
         resumed: cursor.is_some(),
      })
   }
}

/// A prepared listing page waiting for its rows.
#[derive(Debug, Clone)]
pub struct ListingQuery {
   prepared: PreparedPageQuery,
   page: u64,
   resumed: bool,
}

impl ListingQuery {
   /// SQL to execute.
   pub fn sql(&self) -> &str {
      &self.prepared.sql
   }

   /// Bind values for [`sql`](Self::sql), caller values first.
   pub fn values(&self) -> &[JsonValue] {
      &self.prepared.values
   }

   pub fn page(&self) -> u64 {
      self.page
   }

   /// Whether a stored cursor was applied.
   pub fn is_resumed(&self) -> bool {
      self.resumed
   }

   /// Turn fetched rows into a [`Listing`], saving a cursor for the next
   /// page when there is one.
   pub async fn finish<S: TokenStore>(
      self,
      rows: Vec<IndexMap<String, JsonValue>>,
      pager: &ListingPager<S>,
   ) -> Result<Listing> {
      let keyset_page = self.prepared.into_page(rows)?;
      let page_number = i64::try_from(self.page).unwrap_or(i64::MAX);
      let page_size = i64::try_from(self.prepared.page_size()).unwrap_or(i64::MAX);
      let window = PageWindow::from_keyset_page(keyset_page, page_number, page_size)?;

      let next_cursor_id = match window.items().last() {
         Some(last_row) if window.has_next() => {
            let cursor = SeekCursor::create(
               self.prepared.keyset().to_vec(),
               &window,
               last_row,
               pager.each_side,
               pager.cursors.config(),
            )?;
            let id = pager.cursors.new_id();
            pager.cursors.save(&id, &cursor).await?;
            Some(id)
         }
         _ => None,
      };

      Ok(Listing {
         page: window.summary(),
         pages: window.neighbor_pages(pager.each_side).collect(),
         next_cursor_id,
         rows: window.into_items(),
      })
   }
}

/// A finished listing page, ready to serialize into a response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
   pub rows: Vec<IndexMap<String, JsonValue>>,
   pub page: PageSummary,
   /// Page numbers to link around the current one
   pub pages: Vec<u64>,
   /// Id to pass to [`ListingPager::prepare`] for the next page
   pub next_cursor_id: Option<String>,
}
