//! Error types for sql-shape

use sqlparser::parser::ParserError;
use thiserror::Error;

/// Errors that may occur when analyzing SQL text.
///
/// All of these indicate a programming error upstream (the caller handed us
/// malformed or unsupported SQL) and are not retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
   /// The parser could not tokenize or parse the text.
   #[error("SQL parse error: {0}")]
   Parse(#[from] ParserError),

   /// The text contained no statement at all.
   #[error("SQL text contains no statement")]
   EmptyStatement,

   /// The text contained more than one statement.
   #[error("SQL text contains {0} statements, expected exactly one")]
   MultipleStatements(usize),
}

impl Error {
   /// Machine-readable error code.
   pub fn error_code(&self) -> &'static str {
      match self {
         Error::Parse(_) => "SQL_PARSE_ERROR",
         Error::EmptyStatement => "EMPTY_STATEMENT",
         Error::MultipleStatements(_) => "MULTIPLE_STATEMENTS",
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
