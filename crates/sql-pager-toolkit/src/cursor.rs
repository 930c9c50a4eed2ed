//! Resumable seek cursors.
//!
//! A [`SeekCursor`] remembers where a keyset listing stopped: the ordering
//! it was produced under and the last row's values for those columns. It
//! is an immutable value; expiry is judged when it is read back.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use tracing::debug;

use crate::config::CursorConfig;
use crate::pagination::{KeysetColumn, validate_column_name};
use crate::window::PageWindow;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeekCursor {
   ordering: Vec<KeysetColumn>,
   seek_values: IndexMap<String, JsonValue>,
   page: u64,
   page_size: u64,
   each_side: u64,
   created_at: OffsetDateTime,
   ttl: Duration,
}

impl SeekCursor {
   /// Capture the position after `last_row`.
   ///
   /// `seek_values` is the projection of `last_row` onto the ordering
   /// columns, in ordering order; any other keys in the row are ignored.
   /// `page` and `page_size` come from `pager` and `ttl` from `config`.
   pub fn create<T>(
      ordering: Vec<KeysetColumn>,
      pager: &PageWindow<T>,
      last_row: &IndexMap<String, JsonValue>,
      each_side: u64,
      config: &CursorConfig,
   ) -> Result<Self> {
      Self::create_at(ordering, pager, last_row, each_side, config, OffsetDateTime::now_utc())
   }

   /// [`create`](Self::create) with an explicit creation time.
   pub fn create_at<T>(
      ordering: Vec<KeysetColumn>,
      pager: &PageWindow<T>,
      last_row: &IndexMap<String, JsonValue>,
      each_side: u64,
      config: &CursorConfig,
      now: OffsetDateTime,
   ) -> Result<Self> {
      if ordering.is_empty() {
         return Err(Error::EmptyKeysetColumns);
      }

      let mut seek_values = IndexMap::with_capacity(ordering.len());
      for col in &ordering {
         validate_column_name(&col.name)?;
         let value = last_row
            .get(&col.name)
            .cloned()
            .ok_or_else(|| Error::CursorColumnNotFound {
               column: col.name.clone(),
            })?;
         seek_values.insert(col.name.clone(), value);
      }

      Ok(Self {
         ordering,
         seek_values,
         page: pager.page(),
         page_size: pager.page_size(),
         each_side,
         created_at: now,
         ttl: config.ttl,
      })
   }

   pub fn ordering(&self) -> &[KeysetColumn] {
      &self.ordering
   }

   pub fn seek_values(&self) -> &IndexMap<String, JsonValue> {
      &self.seek_values
   }

   /// Seek values in ordering order, ready for
   /// [`KeysetQueryBuilder::after`](crate::KeysetQueryBuilder::after).
   pub fn cursor_values(&self) -> Vec<JsonValue> {
      self
         .ordering
         .iter()
         .filter_map(|col| self.seek_values.get(&col.name).cloned())
         .collect()
   }

   /// Page number of the window the cursor was taken from.
   pub fn page(&self) -> u64 {
      self.page
   }

   pub fn page_size(&self) -> u64 {
      self.page_size
   }

   pub fn each_side(&self) -> u64 {
      self.each_side
   }

   pub fn created_at(&self) -> OffsetDateTime {
      self.created_at
   }

   pub fn ttl(&self) -> Duration {
      self.ttl
   }

   pub fn expired(&self) -> bool {
      self.expired_at(OffsetDateTime::now_utc())
   }

   /// True once more than `ttl` has passed since creation.
   pub fn expired_at(&self, now: OffsetDateTime) -> bool {
      now - self.created_at > self.ttl
   }

   /// Serialized form written to a token store.
   pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
      Ok(serde_json::to_vec(self)?)
   }

   /// Inverse of [`to_bytes`](Self::to_bytes). Anything that does not
   /// deserialize is treated as absent.
   pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
      match serde_json::from_slice(bytes) {
         Ok(cursor) => Some(cursor),
         Err(e) => {
            debug!(error = %e, "discarding undecodable seek cursor");
            None
         }
      }
   }

   /// Encode the cursor as an opaque url-safe token, for listings that
   /// carry the position in the request instead of a server-side store.
   pub fn encode_token(&self) -> Result<String> {
      Ok(URL_SAFE_NO_PAD.encode(self.to_bytes()?))
   }

   /// Decode a token from [`encode_token`](Self::encode_token).
   ///
   /// Malformed, outdated or expired tokens all yield `None`.
   pub fn decode_token(token: &str) -> Option<Self> {
      Self::decode_token_at(token, OffsetDateTime::now_utc())
   }

   /// [`decode_token`](Self::decode_token) evaluated at `now`.
   pub fn decode_token_at(token: &str, now: OffsetDateTime) -> Option<Self> {
      let bytes = match URL_SAFE_NO_PAD.decode(token) {
         Ok(bytes) => bytes,
         Err(e) => {
            debug!(error = %e, "discarding malformed cursor token");
            return None;
         }
      };

      let cursor = Self::from_bytes(&bytes)?;
      if cursor.expired_at(now) {
         debug!("discarding expired cursor token");
         return None;
      }

      Some(cursor)
   }
}
