//! Token store collaborator and cursor persistence

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::Result;
use crate::config::CursorConfig;
use crate::cursor::SeekCursor;

/// Key/value storage for serialized cursors.
///
/// Implementations decide durability; entries must survive at least the
/// cursor ttl. Writes are last-writer-wins, there is no compare-and-swap.
/// Errors should be reported as [`Error::TokenStore`](crate::Error::TokenStore).
pub trait TokenStore: Send + Sync {
   fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

   /// Write `value` under `key`, replacing whatever was there.
   fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

   fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Process-local token store
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(Arc<RwLock<HashMap<String, Vec<u8>>>>);

impl MemoryTokenStore {
   pub fn new() -> Self {
      Self::default()
   }

   pub async fn len(&self) -> usize {
      self.0.read().await.len()
   }

   pub async fn is_empty(&self) -> bool {
      self.0.read().await.is_empty()
   }

   pub async fn clear(&self) {
      let mut entries = self.0.write().await;
      debug!("Clearing {} stored token(s)", entries.len());
      entries.clear();
   }
}

impl TokenStore for MemoryTokenStore {
   async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
      Ok(self.0.read().await.get(key).cloned())
   }

   async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
      self.0.write().await.insert(key.to_string(), value);
      Ok(())
   }

   async fn remove(&self, key: &str) -> Result<()> {
      self.0.write().await.remove(key);
      Ok(())
   }
}

/// Saves and loads [`SeekCursor`]s through a [`TokenStore`].
///
/// A missing, expired or undecodable entry loads as `None`, so callers
/// simply restart at the first page. Errors from the store itself are
/// returned unchanged.
#[derive(Clone, Debug)]
pub struct CursorStore<S> {
   store: S,
   config: CursorConfig,
}

impl<S: TokenStore> CursorStore<S> {
   pub fn new(store: S, config: CursorConfig) -> Self {
      Self { store, config }
   }

   pub fn store(&self) -> &S {
      &self.store
   }

   pub fn config(&self) -> &CursorConfig {
      &self.config
   }

   /// Fresh opaque cursor id.
   pub fn new_id(&self) -> String {
      Uuid::new_v4().to_string()
   }

   /// Persist `cursor` under `id`, overwriting any previous cursor there.
   pub async fn save(&self, id: &str, cursor: &SeekCursor) -> Result<()> {
      let bytes = cursor.to_bytes()?;
      self.store.set(&self.config.store_key(id), bytes).await?;
      trace!(id, "saved seek cursor");
      Ok(())
   }

   pub async fn load(&self, id: &str) -> Result<Option<SeekCursor>> {
      self.load_at(id, OffsetDateTime::now_utc()).await
   }

   /// [`load`](Self::load) with expiry judged at `now`.
   pub async fn load_at(&self, id: &str, now: OffsetDateTime) -> Result<Option<SeekCursor>> {
      let Some(bytes) = self.store.get(&self.config.store_key(id)).await? else {
         debug!(id, "no seek cursor stored");
         return Ok(None);
      };

      let Some(cursor) = SeekCursor::from_bytes(&bytes) else {
         return Ok(None);
      };

      if cursor.expired_at(now) {
         debug!(id, "seek cursor expired");
         return Ok(None);
      }

      Ok(Some(cursor))
   }

   pub async fn remove(&self, id: &str) -> Result<()> {
      self.store.remove(&self.config.store_key(id)).await
   }
}
