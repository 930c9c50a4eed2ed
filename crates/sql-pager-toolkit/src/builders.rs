//! Builder for keyset-paginated queries over an analyzed statement

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sql_shape::AnalyzedStatement;

use crate::Error;
use crate::pagination::{KeysetColumn, KeysetPage, build_paginated_query};

/// Builder for paginated SELECT queries using keyset (cursor-based) pagination
///
/// The builder never executes anything. [`build`](Self::build) produces the
/// SQL and bind values to run; [`PreparedPageQuery::into_page`] turns the
/// fetched rows into a [`KeysetPage`].
#[derive(Debug)]
pub struct KeysetQueryBuilder<'a> {
   statement: &'a AnalyzedStatement,
   values: Vec<JsonValue>,
   keyset: Vec<KeysetColumn>,
   page_size: usize,
   after: Option<Vec<JsonValue>>,
   before: Option<Vec<JsonValue>>,
}

impl<'a> KeysetQueryBuilder<'a> {
   pub fn new(
      statement: &'a AnalyzedStatement,
      values: Vec<JsonValue>,
      keyset: Vec<KeysetColumn>,
      page_size: usize,
   ) -> Self {
      Self {
         statement,
         values,
         keyset,
         page_size,
         after: None,
         before: None,
      }
   }

   /// Set the cursor for fetching the next page (forward pagination).
   ///
   /// Pass the `next_cursor` from a previous `KeysetPage` to fetch the page
   /// that follows it in the original sort order.
   pub fn after(mut self, cursor: Vec<JsonValue>) -> Self {
      self.after = Some(cursor);
      self
   }

   /// Set the cursor for fetching the previous page (backward pagination).
   ///
   /// Pass a cursor to fetch the page that precedes it in the original sort
   /// order. Rows are returned in the original sort order (not reversed).
   pub fn before(mut self, cursor: Vec<JsonValue>) -> Self {
      self.before = Some(cursor);
      self
   }

   /// Validate inputs and generate the paginated SQL.
   pub fn build(self) -> Result<PreparedPageQuery, Error> {
      if self.keyset.is_empty() {
         return Err(Error::EmptyKeysetColumns);
      }
      if self.page_size == 0 {
         return Err(Error::InvalidPageSize);
      }

      let (cursor_values, backward) = match (self.after, self.before) {
         (Some(_), Some(_)) => return Err(Error::ConflictingCursors),
         (Some(vals), None) => (Some(vals), false),
         (None, Some(vals)) => (Some(vals), true),
         (None, None) => (None, false),
      };

      if let Some(ref vals) = cursor_values
         && vals.len() != self.keyset.len()
      {
         return Err(Error::CursorLengthMismatch {
            cursor_len: vals.len(),
            keyset_len: self.keyset.len(),
         });
      }

      // Cursor placeholders are numbered after the caller's own bind values
      let (sql, cursor_bind_values) = build_paginated_query(
         self.statement,
         &self.keyset,
         cursor_values.as_deref(),
         self.page_size,
         backward,
         self.values.len(),
      )?;

      let mut values = self.values;
      values.extend(cursor_bind_values);

      Ok(PreparedPageQuery {
         sql,
         values,
         keyset: self.keyset,
         page_size: self.page_size,
         backward,
      })
   }
}

/// SQL and bind values for one keyset page, ready to hand to a driver.
#[derive(Debug, Clone)]
pub struct PreparedPageQuery {
   /// Final SQL including seek predicate, ORDER BY and LIMIT
   pub sql: String,
   /// Caller bind values followed by cursor bind values
   pub values: Vec<JsonValue>,
   keyset: Vec<KeysetColumn>,
   page_size: usize,
   backward: bool,
}

impl PreparedPageQuery {
   pub fn keyset(&self) -> &[KeysetColumn] {
      &self.keyset
   }

   pub fn page_size(&self) -> usize {
      self.page_size
   }

   pub fn is_backward(&self) -> bool {
      self.backward
   }

   /// Turn the rows fetched for [`sql`](Self::sql) into a page.
   ///
   /// The query fetches one row beyond the page size; its presence sets
   /// `has_more` and it is dropped from the page.
   pub fn into_page(&self, mut rows: Vec<IndexMap<String, JsonValue>>) -> Result<KeysetPage, Error> {
      let has_more = rows.len() > self.page_size;
      if has_more {
         rows.truncate(self.page_size);
      }

      // Reverse rows when paginating backward to restore original sort order
      if self.backward {
         rows.reverse();
      }

      // Continuation row: first row if backward, last row if forward
      let cursor_row = if self.backward {
         rows.first()
      } else {
         rows.last()
      };

      let next_cursor = match cursor_row {
         Some(row) if has_more => Some(keyset_values(&self.keyset, row)?),
         _ => None,
      };

      Ok(KeysetPage {
         rows,
         next_cursor,
         has_more,
      })
   }
}

/// Project a row onto the keyset columns, in keyset order.
pub(crate) fn keyset_values(
   keyset: &[KeysetColumn],
   row: &IndexMap<String, JsonValue>,
) -> Result<Vec<JsonValue>, Error> {
   keyset
      .iter()
      .map(|col| {
         row.get(&col.name)
            .cloned()
            .ok_or_else(|| Error::CursorColumnNotFound {
               column: col.name.clone(),
            })
      })
      .collect()
}
