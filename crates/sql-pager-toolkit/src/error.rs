/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pagination operations.
///
/// None of these are transient; the toolkit never retries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from statement analysis.
   #[error(transparent)]
   Analyzer(#[from] sql_shape::Error),

   /// Error serializing a cursor.
   #[error("json error: {0}")]
   Json(#[from] serde_json::Error),

   /// Failed to parse a generated seek predicate.
   #[error("generated seek predicate did not parse: {0}")]
   Predicate(#[from] sqlparser::parser::ParserError),

   /// Constructor argument combination that cannot produce a usable value.
   #[error("invalid argument: {0}")]
   InvalidArgument(String),

   /// Keyset pagination requires at least one column.
   #[error("keyset pagination requires at least one column")]
   EmptyKeysetColumns,

   /// Page size must be greater than zero.
   #[error("page size must be greater than zero")]
   InvalidPageSize,

   /// Cursor length does not match keyset column count.
   #[error("cursor has {cursor_len} values but keyset has {keyset_len} columns")]
   CursorLengthMismatch {
      cursor_len: usize,
      keyset_len: usize,
   },

   /// Pagination base statement is not a query, or ends in its own
   /// ORDER BY, LIMIT, OFFSET or FETCH.
   #[error(
      "pagination base query must be a query without top-level ORDER BY, LIMIT, OFFSET or FETCH clauses (these are added automatically; subquery usage is fine)"
   )]
   InvalidPaginationQuery,

   /// Keyset column not found in a result row.
   #[error("keyset column '{column}' not found in query results")]
   CursorColumnNotFound { column: String },

   /// Keyset column name contains invalid characters.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid keyset column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// Cannot provide both `after` and `before` cursors.
   #[error("cannot provide both 'after' and 'before' cursors")]
   ConflictingCursors,

   /// Error surfaced by a token store implementation.
   #[error("token store error: {0}")]
   TokenStore(String),

   /// Generic error for operations that don't fit other categories.
   #[error("{0}")]
   Other(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Analyzer(e) => e.error_code().to_string(),
         Error::Json(_) => "JSON_ERROR".to_string(),
         Error::Predicate(_) => "PREDICATE_PARSE_ERROR".to_string(),
         Error::InvalidArgument(_) => "INVALID_ARGUMENT".to_string(),
         Error::EmptyKeysetColumns => "EMPTY_KEYSET_COLUMNS".to_string(),
         Error::InvalidPageSize => "INVALID_PAGE_SIZE".to_string(),
         Error::CursorLengthMismatch { .. } => "CURSOR_LENGTH_MISMATCH".to_string(),
         Error::InvalidPaginationQuery => "INVALID_PAGINATION_QUERY".to_string(),
         Error::CursorColumnNotFound { .. } => "CURSOR_COLUMN_NOT_FOUND".to_string(),
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::ConflictingCursors => "CONFLICTING_CURSORS".to_string(),
         Error::TokenStore(_) => "TOKEN_STORE_ERROR".to_string(),
         Error::Other(_) => "ERROR".to_string(),
      }
   }
}
