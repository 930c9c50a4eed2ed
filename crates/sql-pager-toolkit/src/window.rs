//! Page window arithmetic over an already-fetched slice of rows.
//!
//! A [`PageWindow`] describes one page of a larger result set whose size may
//! or may not be known. It needs either the full `total`, or a look-ahead
//! `next_page_count` saying how many pages follow the current one.

use std::ops::RangeInclusive;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::Error;
use crate::pagination::KeysetPage;

/// One page of a result set plus the metadata needed to render page links.
///
/// `page_size` and `page` are normalized at construction and the value is
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<T> {
   items: Vec<T>,
   offset: u64,
   page_size: u64,
   page: u64,
   total: Option<u64>,
   next_page_count: Option<u64>,
}

impl<T> PageWindow<T> {
   /// Build a window.
   ///
   /// `page_size` and `page` below 1 are raised to 1. When `total` is known,
   /// `page` is also clamped to the last page. Fails with
   /// [`Error::InvalidArgument`] when neither `total` nor `next_page_count`
   /// is given, since the window could not tell whether a next page exists.
   pub fn new(
      items: Vec<T>,
      offset: u64,
      page_size: i64,
      page: i64,
      total: Option<u64>,
      next_page_count: Option<u64>,
   ) -> Result<Self, Error> {
      if total.is_none() && next_page_count.is_none() {
         return Err(Error::InvalidArgument(
            "page window needs a total or a next_page_count".to_string(),
         ));
      }

      let page_size = u64::try_from(page_size.max(1)).unwrap_or(1);
      let mut page = u64::try_from(page.max(1)).unwrap_or(1);

      if let Some(total) = total {
         let last = total.div_ceil(page_size);
         if last >= 1 {
            page = page.min(last);
         }
      }

      Ok(Self {
         items,
         offset,
         page_size,
         page,
         total,
         next_page_count,
      })
   }

   /// Rows of the current page.
   pub fn items(&self) -> &[T] {
      &self.items
   }

   pub fn into_items(self) -> Vec<T> {
      self.items
   }

   pub fn offset(&self) -> u64 {
      self.offset
   }

   pub fn page_size(&self) -> u64 {
      self.page_size
   }

   /// 1-based page number after normalization.
   pub fn page(&self) -> u64 {
      self.page
   }

   pub fn total(&self) -> Option<u64> {
      self.total
   }

   /// Number of rows in this page.
   pub fn count(&self) -> usize {
      self.items.len()
   }

   /// Rows preceding this page in the full result set.
   fn base(&self) -> u64 {
      if self.offset > 0 {
         self.offset
      } else {
         (self.page - 1).saturating_mul(self.page_size)
      }
   }

   /// 1-based index of the first row of this page, or 0 when empty.
   pub fn from(&self) -> u64 {
      if self.items.is_empty() {
         return 0;
      }
      self.base().saturating_add(1)
   }

   /// 1-based index of the last row of this page, or 0 when empty.
   pub fn to(&self) -> u64 {
      if self.items.is_empty() {
         return 0;
      }
      self.base().saturating_add(self.count() as u64)
   }

   /// `ceil(total / page_size)`, when the total is known.
   pub fn last_page(&self) -> Option<u64> {
      self.total.map(|total| total.div_ceil(self.page_size))
   }

   /// Pages known to exist after this one.
   pub fn next_page_count(&self) -> u64 {
      match self.last_page() {
         Some(last) => last.saturating_sub(self.page),
         None => self.next_page_count.unwrap_or(0),
      }
   }

   pub fn has_next(&self) -> bool {
      match self.total {
         Some(total) => self.page.saturating_mul(self.page_size) < total,
         None => self.next_page_count.unwrap_or(0) > 0,
      }
   }

   pub fn has_prev(&self) -> bool {
      self.page > 1
   }

   pub fn has_total(&self) -> bool {
      self.total.is_some()
   }

   pub fn has_last_page(&self) -> bool {
      self.total.is_some()
   }

   /// Page numbers to link on each side of the current page.
   ///
   /// Clamped to page 1 below and to the last known page above (the real
   /// last page when `total` is known, otherwise `page + next_page_count`).
   pub fn neighbor_pages(&self, each_side: u64) -> RangeInclusive<u64> {
      let start = self.page.saturating_sub(each_side).max(1);
      let known_last = match self.last_page() {
         Some(last) => last,
         None => self.page.saturating_add(self.next_page_count()),
      };
      let end = self
         .page
         .saturating_add(each_side)
         .min(known_last.max(self.page));

      start..=end
   }

   /// Serializable metadata for response payloads.
   pub fn summary(&self) -> PageSummary {
      PageSummary {
         page: self.page,
         page_size: self.page_size,
         count: self.count(),
         from: self.from(),
         to: self.to(),
         total: self.total,
         last_page: self.last_page(),
         next_page_count: self.next_page_count(),
         has_next: self.has_next(),
         has_prev: self.has_prev(),
      }
   }
}

impl PageWindow<IndexMap<String, JsonValue>> {
   /// Wrap a keyset page. Only look-ahead is known: one more page if the
   /// sentinel row came back, none otherwise.
   pub fn from_keyset_page(page: KeysetPage, page_number: i64, page_size: i64) -> Result<Self, Error> {
      let next_page_count = u64::from(page.has_more);
      Self::new(page.rows, 0, page_size, page_number, None, Some(next_page_count))
   }
}

/// Page metadata without the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
   pub page: u64,
   pub page_size: u64,
   pub count: usize,
   pub from: u64,
   pub to: u64,
   pub total: Option<u64>,
   pub last_page: Option<u64>,
   pub next_page_count: u64,
   pub has_next: bool,
   pub has_prev: bool,
}
