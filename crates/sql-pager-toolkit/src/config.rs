use std::time::Duration;

/// Configuration for seek cursor persistence
///
/// # Examples
///
/// ```
/// use sql_pager_toolkit::CursorConfig;
/// use std::time::Duration;
///
/// let config = CursorConfig {
///    ttl: Duration::from_secs(5 * 60),
///    ..Default::default()
/// };
/// assert_eq!(config.key_prefix, "seek-cursor:");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorConfig {
   /// How long a saved cursor stays resumable
   ///
   /// The value is copied into every cursor at creation, so changing it
   /// does not affect cursors that already exist. Once it elapses a load
   /// behaves as if no cursor had been saved.
   ///
   /// Default: 30 minutes
   pub ttl: Duration,

   /// Prefix prepended to cursor ids before they reach the token store
   ///
   /// Lets several listings share one store without colliding.
   ///
   /// Default: `"seek-cursor:"`
   pub key_prefix: String,
}

impl Default for CursorConfig {
   fn default() -> Self {
      Self {
         ttl: Duration::from_secs(30 * 60),
         key_prefix: "seek-cursor:".to_string(),
      }
   }
}

impl CursorConfig {
   /// Store key for a caller-facing cursor id.
   pub(crate) fn store_key(&self, id: &str) -> String {
      format!("{}{}", self.key_prefix, id)
   }
}
