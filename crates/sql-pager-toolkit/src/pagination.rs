//! Keyset pagination types and SQL generation.
//!
//! Provides declarative, builder-friendly keyset pagination that avoids the
//! performance degradation of OFFSET-based pagination on large datasets.
//! Supports both forward (`.after()`) and backward (`.before()`) pagination.
//!
//! # How It Works
//!
//! Instead of skipping rows with OFFSET, keyset pagination uses indexed column
//! values from a boundary row to seek directly to the next or previous page.
//! This keeps query performance constant regardless of how deep you paginate.
//!
//! Where the seek predicate goes depends on the statement's shape, as
//! reported by [`AnalyzedStatement`]:
//!
//! - a UNION (or any other non-SELECT body) is wrapped in a derived table and
//!   filtered from outside; the UNION itself is never rewritten
//! - so is a SELECT whose keyset aliases a window function, or an aggregate
//!   without GROUP BY
//! - a grouped SELECT receives the predicate in HAVING
//! - any other SELECT receives it in WHERE
//!
//! Keyset columns that are SELECT-list aliases are replaced by the expression
//! they are bound to inside WHERE/HAVING, since those clauses cannot see
//! output aliases.
//!
//! For backward pagination, all sort directions are reversed internally so the
//! database returns rows from the opposite end, then the rows are reversed to
//! restore the original order.
//!
//! # Example
//!
//! ```no_run
//! use sql_pager_toolkit::pagination::{KeysetColumn, SortDirection};
//!
//! let keyset = vec![
//!    KeysetColumn::asc("category"),
//!    KeysetColumn::desc("score"),
//!    KeysetColumn::asc("id"),
//! ];
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sql_shape::{AnalyzedStatement, ExprKind, ExprStage};
use sqlparser::ast::{BinaryOperator, Expr, SetExpr, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::trace;

use crate::Error;

/// Alias given to the derived table wrapped around statements filtered from outside.
const DERIVED_TABLE_ALIAS: &str = "keyset_page";

/// Sort direction for a keyset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   /// Return the opposite sort direction.
   pub fn reversed(self) -> Self {
      match self {
         SortDirection::Asc => SortDirection::Desc,
         SortDirection::Desc => SortDirection::Asc,
      }
   }

   fn keyword(self) -> &'static str {
      match self {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      }
   }

   fn seek_operator(self) -> &'static str {
      match self {
         SortDirection::Asc => ">",
         SortDirection::Desc => "<",
      }
   }
}

/// A column in the keyset used for cursor-based pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetColumn {
   /// Column name as it appears in the query result set
   pub name: String,
   /// Sort direction for this column
   pub direction: SortDirection,
}

impl KeysetColumn {
   /// Create a keyset column with ascending sort direction.
   pub fn asc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Asc,
      }
   }

   /// Create a keyset column with descending sort direction.
   pub fn desc(name: impl Into<String>) -> Self {
      Self {
         name: name.into(),
         direction: SortDirection::Desc,
      }
   }
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<(), Error> {
   let invalid = || Error::InvalidColumnName {
      name: name.to_string(),
   };

   let mut chars = name.chars();
   let Some(first) = chars.next() else {
      return Err(invalid());
   };
   if !first.is_ascii_alphabetic() && first != '_' {
      return Err(invalid());
   }

   for ch in chars {
      if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
         return Err(invalid());
      }
   }

   Ok(())
}

/// Quote a column name with double-quote identifiers.
///
/// Qualified names are quoted per part (`t.id` → `"t"."id"`). Any embedded
/// double quotes are doubled per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   name
      .split('.')
      .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
      .collect::<Vec<_>>()
      .join(".")
}

/// A page of results from keyset pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysetPage {
   /// The rows in this page
   pub rows: Vec<indexmap::IndexMap<String, JsonValue>>,
   /// Cursor values to continue pagination in the **same direction**,
   /// or `None` if there are no more pages.
   ///
   /// After `.after()`, pass to another `.after()` for the next page.
   /// After `.before()`, pass to another `.before()` to keep going backward.
   pub next_cursor: Option<Vec<JsonValue>>,
   /// Whether there are more rows in the current pagination direction
   pub has_more: bool,
}

/// Validate that a base statement is a query with no trailing ORDER BY,
/// LIMIT, OFFSET or FETCH of its own.
///
/// These clauses conflict with the pagination logic, which appends its own
/// ORDER BY and LIMIT automatically. Clauses inside subqueries, derived
/// tables, comments and string literals are allowed.
pub(crate) fn validate_base_query(stmt: &AnalyzedStatement) -> Result<(), Error> {
   if !stmt.is_query() || stmt.has_order_by() || stmt.has_limit() {
      return Err(Error::InvalidPaginationQuery);
   }

   Ok(())
}

/// One keyset column as it must be written inside the seek predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeekTarget {
   /// SQL text of the compared expression
   pub expr: String,
   pub direction: SortDirection,
}

impl SeekTarget {
   /// Refer to the keyset column by its quoted output name.
   pub(crate) fn by_name(column: &KeysetColumn) -> Self {
      Self {
         expr: quote_identifier(&column.name),
         direction: column.direction,
      }
   }

   /// Refer to the keyset column by the expression its alias is bound to,
   /// falling back to the quoted name when it is not an alias.
   ///
   /// Operator expressions are parenthesized so the comparison binds to the
   /// whole expression.
   fn resolved(stmt: &AnalyzedStatement, column: &KeysetColumn) -> Self {
      let expr = match stmt.alias_kind(&column.name) {
         None => quote_identifier(&column.name),
         Some(ExprKind::Scalar) => {
            format!("({})", stmt.extract_alias_select_column(&column.name))
         }
         Some(_) => stmt.extract_alias_select_column(&column.name),
      };

      Self {
         expr,
         direction: column.direction,
      }
   }
}

/// Build the cursor condition for seeking past the previous page.
///
/// `param_offset` is the number of user-supplied bind values that precede
/// the cursor values. Cursor placeholders are numbered `$N` starting from
/// `param_offset + 1` so they never collide with the user's `$1`, `$2`, …
/// placeholders (or positional `?` parameters).
///
/// Returns the SQL fragment and the bind values to use.
///
/// For uniform direction (all ASC or all DESC), uses row-value comparison:
/// `(col1, col2) > ($3, $4)` or `(col1, col2) < ($3, $4)`
///
/// For mixed directions, uses expanded OR form:
/// `(a > $3) OR (a = $4 AND b < $5) OR (a = $6 AND b = $7 AND c > $8)`
pub(crate) fn build_cursor_condition(
   targets: &[SeekTarget],
   cursor_values: &[JsonValue],
   param_offset: usize,
) -> (String, Vec<JsonValue>) {
   let n = targets.len();
   let mut next_param = param_offset + 1;

   let all_asc = targets.iter().all(|t| t.direction == SortDirection::Asc);
   let all_desc = targets.iter().all(|t| t.direction == SortDirection::Desc);

   if all_asc || all_desc {
      let cols: Vec<&str> = targets.iter().map(|t| t.expr.as_str()).collect();
      let placeholders: Vec<String> = (0..n).map(|i| format!("${}", next_param + i)).collect();
      let op = if all_asc { ">" } else { "<" };

      let sql = format!("({}) {} ({})", cols.join(", "), op, placeholders.join(", "));
      return (sql, cursor_values.to_vec());
   }

   let mut clauses = Vec::new();
   let mut values = Vec::new();

   for level in 0..n {
      let mut parts = Vec::new();

      // Equality conditions for all columns before this level
      for eq_idx in 0..level {
         parts.push(format!("{} = ${}", targets[eq_idx].expr, next_param));
         next_param += 1;
         values.push(cursor_values[eq_idx].clone());
      }

      parts.push(format!(
         "{} {} ${}",
         targets[level].expr,
         targets[level].direction.seek_operator(),
         next_param
      ));
      next_param += 1;
      values.push(cursor_values[level].clone());

      clauses.push(format!("({})", parts.join(" AND ")));
   }

   (clauses.join(" OR "), values)
}

/// Build the ORDER BY clause from the keyset definition.
pub(crate) fn build_order_by(keyset: &[KeysetColumn]) -> String {
   let parts: Vec<String> = keyset
      .iter()
      .map(|k| format!("{} {}", quote_identifier(&k.name), k.direction.keyword()))
      .collect();

   format!("ORDER BY {}", parts.join(", "))
}

/// Create a keyset with all sort directions reversed.
fn reversed_keyset(keyset: &[KeysetColumn]) -> Vec<KeysetColumn> {
   keyset
      .iter()
      .map(|k| KeysetColumn {
         name: k.name.clone(),
         direction: k.direction.reversed(),
      })
      .collect()
}

/// AND `predicate` into an optional existing clause, parenthesizing both.
fn conjoin(existing: Option<Expr>, predicate: Expr) -> Expr {
   match existing {
      Some(existing) => Expr::BinaryOp {
         left: Box::new(Expr::Nested(Box::new(existing))),
         op: BinaryOperator::And,
         right: Box::new(Expr::Nested(Box::new(predicate))),
      },
      None => predicate,
   }
}

/// Whether some keyset alias is bound to an expression the inner clauses
/// cannot evaluate: a window function anywhere, or an aggregate in an
/// ungrouped SELECT.
fn needs_outer_filter(stmt: &AnalyzedStatement, keyset: &[KeysetColumn], grouped: bool) -> bool {
   keyset
      .iter()
      .filter_map(|column| stmt.alias_stage(&column.name))
      .any(|stage| match stage {
         ExprStage::Row => false,
         ExprStage::Aggregate => !grouped,
         ExprStage::Window => true,
      })
}

/// Add the seek predicate to the statement and return the new SQL text.
fn splice_seek_predicate(
   stmt: &AnalyzedStatement,
   base_sql: &str,
   keyset: &[KeysetColumn],
   cursor_values: &[JsonValue],
   param_offset: usize,
) -> Result<(String, Vec<JsonValue>), Error> {
   let grouped = stmt.has_group_by();

   if !stmt.is_select() || needs_outer_filter(stmt, keyset, grouped) {
      let targets: Vec<SeekTarget> = keyset.iter().map(SeekTarget::by_name).collect();
      let (condition, values) = build_cursor_condition(&targets, cursor_values, param_offset);
      trace!(union = stmt.is_union(), "wrapping statement in derived table");

      let sql = format!(
         "SELECT * FROM ({}) AS {} WHERE {}",
         base_sql, DERIVED_TABLE_ALIAS, condition
      );
      return Ok((sql, values));
   }

   let targets: Vec<SeekTarget> = keyset
      .iter()
      .map(|column| SeekTarget::resolved(stmt, column))
      .collect();
   let (condition, values) = build_cursor_condition(&targets, cursor_values, param_offset);

   let predicate = Parser::new(&GenericDialect {})
      .try_with_sql(&condition)?
      .parse_expr()?;

   let mut tree = stmt.tree().clone();
   if let Statement::Query(query) = &mut tree
      && let SetExpr::Select(select) = query.body.as_mut()
   {
      if grouped {
         select.having = Some(conjoin(select.having.take(), predicate));
      } else {
         select.selection = Some(conjoin(select.selection.take(), predicate));
      }
   }

   Ok((tree.to_string(), values))
}

/// Build the complete paginated query from an analyzed base statement.
///
/// `user_param_count` is the number of bind values the caller supplies for
/// the base query (e.g., 2 when the query contains `$1` and `$2`). Cursor
/// placeholders are numbered starting from `user_param_count + 1` so they
/// never collide with user parameters.
///
/// When `backward` is true, all sort directions are reversed so the database
/// returns rows from the opposite end of the result set. The caller is
/// responsible for reversing the returned rows to restore the original order.
///
/// Without a cursor the base text is kept verbatim. With a cursor the
/// statement is re-serialized from its syntax tree, so comments and original
/// formatting are not preserved.
///
/// Returns the final SQL and all cursor bind values (which should be appended
/// after the user's own bind values).
pub(crate) fn build_paginated_query(
   stmt: &AnalyzedStatement,
   keyset: &[KeysetColumn],
   cursor: Option<&[JsonValue]>,
   page_size: usize,
   backward: bool,
   user_param_count: usize,
) -> Result<(String, Vec<JsonValue>), Error> {
   validate_base_query(stmt)?;

   // Validate all column names before interpolating into SQL
   for col in keyset {
      validate_column_name(&col.name)?;
   }

   let effective;
   let effective_keyset: &[KeysetColumn] = if backward {
      effective = reversed_keyset(keyset);
      &effective
   } else {
      keyset
   };

   let base_sql = stmt.source_text().trim_end().trim_end_matches(';').trim_end();

   let (mut sql, cursor_bind_values) = match cursor {
      Some(cursor_vals) => splice_seek_predicate(
         stmt,
         base_sql,
         effective_keyset,
         cursor_vals,
         user_param_count,
      )?,
      None => (base_sql.to_string(), Vec::new()),
   };

   let order_by = build_order_by(effective_keyset);
   let limit = page_size.checked_add(1).ok_or(Error::InvalidPageSize)?;
   sql = format!("{} {} LIMIT {}", sql, order_by, limit);

   Ok((sql, cursor_bind_values))
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   fn analyze(sql: &str) -> AnalyzedStatement {
      AnalyzedStatement::analyze(sql).unwrap()
   }

   fn by_name(keyset: &[KeysetColumn]) -> Vec<SeekTarget> {
      keyset.iter().map(SeekTarget::by_name).collect()
   }

   // ─── validate_base_query ───

   fn validate(sql: &str) -> Result<(), Error> {
      validate_base_query(&analyze(sql))
   }

   #[test]
   fn validate_rejects_top_level_order_by() {
      assert!(validate("SELECT * FROM posts ORDER BY id").is_err());
   }

   #[test]
   fn validate_rejects_order_by_split_across_lines() {
      assert!(validate("SELECT * FROM posts ORDER\n  BY id").is_err());
      assert!(validate("SELECT * FROM posts ORDER\tBY id").is_err());
   }

   #[test]
   fn validate_rejects_top_level_limit() {
      assert!(validate("SELECT * FROM posts LIMIT 10").is_err());
   }

   #[test]
   fn validate_rejects_offset_without_limit() {
      assert!(validate("SELECT * FROM posts OFFSET 5").is_err());
   }

   #[test]
   fn validate_rejects_fetch_first() {
      assert!(validate("SELECT * FROM posts FETCH FIRST 5 ROWS ONLY").is_err());
   }

   #[test]
   fn validate_accepts_clean_query() {
      assert!(validate("SELECT * FROM posts WHERE category = ?").is_ok());
   }

   #[test]
   fn validate_rejects_non_query_statement() {
      assert!(validate("DELETE FROM posts WHERE id = 1").is_err());
   }

   #[test]
   fn validate_allows_order_by_inside_subquery() {
      assert!(validate("SELECT * FROM (SELECT * FROM posts ORDER BY id LIMIT 5) AS p").is_ok());
   }

   #[test]
   fn validate_rejects_order_by_after_subquery() {
      assert!(validate("SELECT * FROM (SELECT * FROM posts LIMIT 5) AS p ORDER BY id").is_err());
   }

   #[test]
   fn validate_rejects_order_by_after_union() {
      assert!(validate("SELECT id FROM posts UNION SELECT id FROM drafts ORDER BY id").is_err());
   }

   // ─── validate_base_query: comments and quoted strings ───

   #[test]
   fn validate_ignores_order_by_in_line_comment() {
      assert!(validate("SELECT * FROM posts -- ORDER BY id").is_ok());
   }

   #[test]
   fn validate_ignores_limit_in_block_comment() {
      assert!(validate("SELECT * FROM posts /* LIMIT 10 */").is_ok());
   }

   #[test]
   fn validate_ignores_keywords_in_escaped_single_quotes() {
      assert!(validate("SELECT * FROM t WHERE name = 'order''s ORDER BY clause'").is_ok());
   }

   #[test]
   fn validate_ignores_keywords_in_double_quoted_identifier() {
      assert!(validate(r#"SELECT "ORDER BY" FROM posts"#).is_ok());
   }

   #[test]
   fn validate_detects_limit_after_line_comment() {
      assert!(validate("SELECT * FROM posts -- comment\nLIMIT 10").is_err());
   }

   // ─── validate_column_name ───

   #[test]
   fn column_name_valid() {
      assert!(validate_column_name("id").is_ok());
      assert!(validate_column_name("_private").is_ok());
      assert!(validate_column_name("col_123").is_ok());
      assert!(validate_column_name("schema.table.column").is_ok());
   }

   #[test]
   fn column_name_rejects_empty() {
      assert!(validate_column_name("").is_err());
   }

   #[test]
   fn column_name_rejects_injection() {
      assert!(validate_column_name("id; DROP TABLE posts --").is_err());
      assert!(validate_column_name("id)--").is_err());
      assert!(validate_column_name("1bad").is_err());
      assert!(validate_column_name("col name").is_err());
   }

   // ─── quote_identifier ───

   #[test]
   fn quote_identifier_simple() {
      assert_eq!(quote_identifier("id"), r#""id""#);
   }

   #[test]
   fn quote_identifier_qualified_quotes_each_part() {
      assert_eq!(quote_identifier("t.id"), r#""t"."id""#);
   }

   // ─── build_cursor_condition ───

   #[test]
   fn cursor_condition_uniform_asc_with_offset() {
      let keyset = vec![KeysetColumn::asc("a"), KeysetColumn::asc("b")];
      let cursor = vec![json!(1), json!(2)];

      let (sql, values) = build_cursor_condition(&by_name(&keyset), &cursor, 2);

      assert_eq!(sql, r#"("a", "b") > ($3, $4)"#);
      assert_eq!(values, vec![json!(1), json!(2)]);
   }

   #[test]
   fn cursor_condition_uniform_desc() {
      let keyset = vec![KeysetColumn::desc("a"), KeysetColumn::desc("b")];
      let cursor = vec![json!(10), json!(20)];

      let (sql, values) = build_cursor_condition(&by_name(&keyset), &cursor, 0);

      assert_eq!(sql, r#"("a", "b") < ($1, $2)"#);
      assert_eq!(values, vec![json!(10), json!(20)]);
   }

   #[test]
   fn cursor_condition_mixed_directions() {
      let keyset = vec![
         KeysetColumn::asc("a"),
         KeysetColumn::desc("b"),
         KeysetColumn::asc("c"),
      ];
      let cursor = vec![json!("va"), json!("vb"), json!("vc")];

      let (sql, values) = build_cursor_condition(&by_name(&keyset), &cursor, 0);

      assert_eq!(
         sql,
         r#"("a" > $1) OR ("a" = $2 AND "b" < $3) OR ("a" = $4 AND "b" = $5 AND "c" > $6)"#
      );
      assert_eq!(
         values,
         vec![
            json!("va"),
            json!("va"),
            json!("vb"),
            json!("va"),
            json!("vb"),
            json!("vc"),
         ]
      );
   }

   #[test]
   fn cursor_condition_resolved_alias_uses_expression() {
      let stmt = analyze("SELECT score * 2 AS doubled, id FROM posts");
      let targets = vec![
         SeekTarget::resolved(&stmt, &KeysetColumn::asc("doubled")),
         SeekTarget::resolved(&stmt, &KeysetColumn::asc("id")),
      ];

      let (sql, _) = build_cursor_condition(&targets, &[json!(4), json!(1)], 0);

      assert_eq!(sql, r#"((score * 2), "id") > ($1, $2)"#);
   }

   #[test]
   fn cursor_condition_parenthesizes_operator_alias() {
      let stmt = analyze("SELECT NOT archived AS is_open, id FROM posts");
      let targets = vec![
         SeekTarget::resolved(&stmt, &KeysetColumn::desc("is_open")),
         SeekTarget::resolved(&stmt, &KeysetColumn::asc("id")),
      ];

      let (sql, _) = build_cursor_condition(&targets, &[json!(true), json!(1)], 0);

      assert_eq!(sql, r#"((NOT archived) < $1) OR ((NOT archived) = $2 AND "id" > $3)"#);
   }

   #[test]
   fn cursor_condition_keeps_atomic_alias_bare() {
      let stmt = analyze("SELECT lower(title) AS t, user_id AS uid FROM posts");

      assert_eq!(SeekTarget::resolved(&stmt, &KeysetColumn::asc("t")).expr, "lower(title)");
      assert_eq!(SeekTarget::resolved(&stmt, &KeysetColumn::asc("uid")).expr, "user_id");
      assert_eq!(SeekTarget::resolved(&stmt, &KeysetColumn::asc("id")).expr, r#""id""#);
   }

   // ─── build_order_by ───

   #[test]
   fn order_by_mixed_directions() {
      let keyset = vec![
         KeysetColumn::asc("category"),
         KeysetColumn::desc("score"),
         KeysetColumn::asc("id"),
      ];

      assert_eq!(
         build_order_by(&keyset),
         r#"ORDER BY "category" ASC, "score" DESC, "id" ASC"#
      );
   }

   // ─── build_paginated_query ───

   #[test]
   fn paginated_query_first_page_keeps_text() {
      let keyset = vec![KeysetColumn::asc("id")];
      let stmt = analyze("SELECT * FROM posts");

      let (sql, values) = build_paginated_query(&stmt, &keyset, None, 20, false, 0).unwrap();

      assert_eq!(sql, r#"SELECT * FROM posts ORDER BY "id" ASC LIMIT 21"#);
      assert!(values.is_empty());
   }

   #[test]
   fn paginated_query_strips_trailing_semicolon() {
      let keyset = vec![KeysetColumn::asc("id")];
      let stmt = analyze("SELECT * FROM posts;");

      let (sql, _) = build_paginated_query(&stmt, &keyset, None, 10, false, 0).unwrap();

      assert_eq!(sql, r#"SELECT * FROM posts ORDER BY "id" ASC LIMIT 11"#);
   }

   #[test]
   fn paginated_query_with_cursor_adds_where() {
      let keyset = vec![KeysetColumn::asc("id")];
      let cursor = vec![json!(100)];
      let stmt = analyze("SELECT * FROM posts");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 20, false, 0).unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM posts WHERE ("id") > ($1) ORDER BY "id" ASC LIMIT 21"#
      );
      assert_eq!(values, vec![json!(100)]);
   }

   #[test]
   fn paginated_query_with_existing_where_keeps_precedence() {
      let keyset = vec![KeysetColumn::asc("id")];
      let cursor = vec![json!(100)];
      let stmt = analyze("SELECT * FROM posts WHERE category = $1 OR score > 5");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 20, false, 1).unwrap();

      assert!(sql.contains(r#"WHERE (category = $1 OR score > 5) AND (("id") > ($2))"#));
      assert!(sql.ends_with(r#"ORDER BY "id" ASC LIMIT 21"#));
      assert_eq!(values, vec![json!(100)]);
   }

   #[test]
   fn paginated_query_grouped_statement_uses_having() {
      let keyset = vec![KeysetColumn::desc("n"), KeysetColumn::desc("category")];
      let cursor = vec![json!(3), json!("tech")];
      let stmt =
         analyze("SELECT category, count(*) AS n FROM posts WHERE score > 0 GROUP BY category");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 10, false, 0).unwrap();

      assert!(sql.contains(r#"HAVING (count(*), "category") < ($1, $2)"#));
      assert!(sql.contains("WHERE score > 0"));
      assert_eq!(values, vec![json!(3), json!("tech")]);

      let spliced = analyze(sql.trim_end_matches(r#" ORDER BY "n" DESC, "category" DESC LIMIT 11"#));
      assert!(spliced.has_having());
      assert!(spliced.has_group_by());
   }

   #[test]
   fn paginated_query_union_is_wrapped_not_rewritten() {
      let keyset = vec![KeysetColumn::asc("id")];
      let cursor = vec![json!(7)];
      let stmt = analyze("SELECT id FROM posts WHERE score > 1 UNION SELECT id FROM drafts");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 5, false, 0).unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM (SELECT id FROM posts WHERE score > 1 UNION SELECT id FROM drafts) AS keyset_page WHERE ("id") > ($1) ORDER BY "id" ASC LIMIT 6"#
      );
      assert_eq!(values, vec![json!(7)]);
   }

   #[test]
   fn paginated_query_comparison_alias_binds_whole_expression() {
      let keyset = vec![KeysetColumn::desc("same"), KeysetColumn::asc("id")];
      let cursor = vec![json!(true), json!(4)];
      let stmt = analyze("SELECT a = b AS same, id FROM pairs");

      let (sql, _) = build_paginated_query(&stmt, &keyset, Some(&cursor), 5, false, 0).unwrap();

      assert!(sql.contains(r#"WHERE ((a = b) < $1) OR ((a = b) = $2 AND "id" > $3)"#));
   }

   #[test]
   fn paginated_query_window_alias_is_filtered_outside() {
      let keyset = vec![KeysetColumn::asc("rn")];
      let cursor = vec![json!(3)];
      let stmt = analyze("SELECT id, row_number() OVER (ORDER BY score) AS rn FROM posts");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 5, false, 0).unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM (SELECT id, row_number() OVER (ORDER BY score) AS rn FROM posts) AS keyset_page WHERE ("rn") > ($1) ORDER BY "rn" ASC LIMIT 6"#
      );
      assert_eq!(values, vec![json!(3)]);
   }

   #[test]
   fn paginated_query_ungrouped_aggregate_alias_is_filtered_outside() {
      let keyset = vec![KeysetColumn::desc("n")];
      let cursor = vec![json!(10)];
      let stmt = analyze("SELECT count(*) AS n FROM posts");

      let (sql, _) = build_paginated_query(&stmt, &keyset, Some(&cursor), 5, false, 0).unwrap();

      assert_eq!(
         sql,
         r#"SELECT * FROM (SELECT count(*) AS n FROM posts) AS keyset_page WHERE ("n") < ($1) ORDER BY "n" DESC LIMIT 6"#
      );
   }

   #[test]
   fn paginated_query_grouped_window_alias_is_filtered_outside() {
      let keyset = vec![KeysetColumn::asc("pos")];
      let cursor = vec![json!(2)];
      let stmt = analyze(
         "SELECT category, rank() OVER (ORDER BY count(*) DESC) AS pos FROM posts GROUP BY category",
      );

      let (sql, _) = build_paginated_query(&stmt, &keyset, Some(&cursor), 5, false, 0).unwrap();

      assert!(sql.starts_with("SELECT * FROM (SELECT category, rank() OVER"));
      assert!(sql.contains(r#") AS keyset_page WHERE ("pos") > ($1)"#));
      assert!(!sql.contains("HAVING"));
   }

   #[test]
   fn paginated_query_rejects_trailing_offset_and_fetch() {
      let keyset = vec![KeysetColumn::asc("id")];

      for sql in [
         "SELECT * FROM posts OFFSET 5",
         "SELECT * FROM posts FETCH FIRST 5 ROWS ONLY",
         "SELECT * FROM posts ORDER\n BY id",
      ] {
         let stmt = analyze(sql);
         let result = build_paginated_query(&stmt, &keyset, None, 10, false, 0);
         assert!(matches!(result, Err(Error::InvalidPaginationQuery)), "{sql}");
      }
   }

   #[test]
   fn paginated_query_rejects_order_by() {
      let keyset = vec![KeysetColumn::asc("id")];
      let stmt = analyze("SELECT * FROM posts ORDER BY id");

      let result = build_paginated_query(&stmt, &keyset, None, 10, false, 0);

      assert!(matches!(result, Err(Error::InvalidPaginationQuery)));
   }

   #[test]
   fn paginated_query_rejects_invalid_column_name() {
      let keyset = vec![KeysetColumn::asc("id; DROP TABLE posts --")];
      let stmt = analyze("SELECT * FROM posts");

      let result = build_paginated_query(&stmt, &keyset, None, 10, false, 0);

      assert!(matches!(result, Err(Error::InvalidColumnName { .. })));
   }

   // ─── SortDirection ───

   #[test]
   fn sort_direction_reversed() {
      assert_eq!(SortDirection::Asc.reversed(), SortDirection::Desc);
      assert_eq!(SortDirection::Desc.reversed(), SortDirection::Asc);
   }

   // ─── build_paginated_query backward ───

   #[test]
   fn paginated_query_backward_no_cursor() {
      let keyset = vec![KeysetColumn::asc("id")];
      let stmt = analyze("SELECT * FROM posts");

      let (sql, values) = build_paginated_query(&stmt, &keyset, None, 20, true, 0).unwrap();

      // Reversed: ASC becomes DESC
      assert_eq!(sql, r#"SELECT * FROM posts ORDER BY "id" DESC LIMIT 21"#);
      assert!(values.is_empty());
   }

   #[test]
   fn paginated_query_backward_mixed_with_cursor() {
      let keyset = vec![
         KeysetColumn::asc("a"),
         KeysetColumn::desc("b"),
         KeysetColumn::asc("c"),
      ];
      let cursor = vec![json!("va"), json!("vb"), json!("vc")];
      let stmt = analyze("SELECT * FROM posts");

      let (sql, values) =
         build_paginated_query(&stmt, &keyset, Some(&cursor), 25, true, 0).unwrap();

      // Reversed: ASC→DESC (uses <), DESC→ASC (uses >), ASC→DESC (uses <)
      assert!(sql.contains(r#"("a" < $1) OR ("a" = $2 AND "b" > $3)"#));
      assert!(sql.ends_with(r#"ORDER BY "a" DESC, "b" ASC, "c" DESC LIMIT 26"#));
      assert_eq!(values.len(), 6);
   }

   // ─── serde ───

   #[test]
   fn sort_direction_serializes_to_camel_case() {
      assert_eq!(
         serde_json::to_string(&SortDirection::Asc).unwrap(),
         "\"asc\""
      );
      assert_eq!(
         serde_json::to_string(&SortDirection::Desc).unwrap(),
         "\"desc\""
      );
   }

   #[test]
   fn keyset_column_round_trips_through_json() {
      let column = KeysetColumn::desc("score");
      let json = serde_json::to_value(&column).unwrap();
      assert_eq!(json, json!({"name": "score", "direction": "desc"}));
   }
}
