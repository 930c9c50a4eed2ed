//! Parsed statements and the structural questions asked of them.

use std::collections::HashMap;

use parking_lot::Mutex;
use sqlparser::ast::{
   GroupByExpr, Ident, Query, Select, SelectItem, SetExpr, SetOperator, Statement,
};
use sqlparser::dialect::{Dialect, GenericDialect};
use sqlparser::parser::Parser;
use tracing::trace;

use crate::render::{ExprKind, ExprStage, SelectExpr};
use crate::{Error, Result};

/// A single parsed SQL statement.
///
/// Construction parses the text once; afterwards the tree is read-only. The
/// only interior mutation is the alias cache, which is scoped to this value
/// and never shared with other statements.
#[derive(Debug)]
pub struct AnalyzedStatement {
   source: String,
   tree: Statement,
   alias_cache: Mutex<HashMap<String, String>>,
}

impl AnalyzedStatement {
   /// Parse `sql` with the generic dialect.
   ///
   /// Fails if the text does not parse, or if it holds anything other than
   /// exactly one statement.
   pub fn analyze(sql: &str) -> Result<Self> {
      Self::analyze_with_dialect(&GenericDialect {}, sql)
   }

   /// Parse `sql` with a caller-chosen dialect.
   pub fn analyze_with_dialect(dialect: &dyn Dialect, sql: &str) -> Result<Self> {
      let mut statements = Parser::parse_sql(dialect, sql)?;

      let tree = match statements.len() {
         0 => return Err(Error::EmptyStatement),
         1 => statements.remove(0),
         n => return Err(Error::MultipleStatements(n)),
      };

      trace!(sql, "analyzed statement");

      Ok(Self {
         source: sql.to_string(),
         tree,
         alias_cache: Mutex::default(),
      })
   }

   /// The SQL text this statement was parsed from.
   pub fn source_text(&self) -> &str {
      &self.source
   }

   /// The parsed syntax tree.
   pub fn tree(&self) -> &Statement {
      &self.tree
   }

   /// True iff the statement is a query (SELECT, set operation, VALUES...).
   pub fn is_query(&self) -> bool {
      self.query().is_some()
   }

   /// True iff the outermost query ends in an ORDER BY.
   ///
   /// Clauses inside subqueries, derived tables, parenthesized set operands,
   /// comments and string literals do not count.
   pub fn has_order_by(&self) -> bool {
      self.query().is_some_and(|query| query.order_by.is_some())
   }

   /// True iff the outermost query carries LIMIT, OFFSET or FETCH.
   pub fn has_limit(&self) -> bool {
      self
         .query()
         .is_some_and(|query| query.limit_clause.is_some() || query.fetch.is_some())
   }

   /// True iff the outermost body is a UNION or UNION ALL.
   ///
   /// A UNION inside a derived table or a subquery does not count.
   pub fn is_union(&self) -> bool {
      matches!(
         self.body(),
         Some(SetExpr::SetOperation {
            op: SetOperator::Union,
            ..
         })
      )
   }

   /// True iff the outermost body is a single SELECT.
   ///
   /// Set operations, parenthesized bodies, VALUES lists and non-query
   /// statements all answer `false`.
   pub fn is_select(&self) -> bool {
      self.top_level_select().is_some()
   }

   /// True iff the outermost SELECT has a WHERE clause.
   pub fn has_where(&self) -> bool {
      self
         .top_level_select()
         .is_some_and(|select| select.selection.is_some())
   }

   /// True iff the outermost SELECT has a HAVING clause.
   pub fn has_having(&self) -> bool {
      self
         .top_level_select()
         .is_some_and(|select| select.having.is_some())
   }

   /// True iff the outermost SELECT has a GROUP BY clause.
   pub fn has_group_by(&self) -> bool {
      self
         .top_level_select()
         .is_some_and(|select| match &select.group_by {
            GroupByExpr::All(..) => true,
            GroupByExpr::Expressions(exprs, ..) => !exprs.is_empty(),
         })
   }

   /// Resolve a SELECT-list alias to the expression text it is bound to.
   ///
   /// `SELECT 1+2 AS foo` resolves `foo` to `1 + 2`. When the statement is
   /// not a single SELECT, or no entry carries the alias, the alias itself is
   /// returned: it is then assumed to already name a real column.
   ///
   /// Results are memoized per statement.
   pub fn extract_alias_select_column(&self, alias: &str) -> String {
      let mut cache = self.alias_cache.lock();
      if let Some(hit) = cache.get(alias) {
         return hit.clone();
      }

      let resolved = match self.find_alias(alias) {
         Some(expr) => expr.render_without_alias(),
         None => alias.to_string(),
      };

      trace!(alias, resolved = %resolved, "resolved select alias");
      cache.insert(alias.to_string(), resolved.clone());
      resolved
   }

   /// Kind of the expression bound to `alias`, if the alias exists.
   pub fn alias_kind(&self, alias: &str) -> Option<ExprKind> {
      self.find_alias(alias).map(|expr| expr.kind())
   }

   /// Clause stage the expression bound to `alias` belongs to, if the alias
   /// exists: row-level, aggregate or window.
   pub fn alias_stage(&self, alias: &str) -> Option<ExprStage> {
      self.find_alias(alias).map(|expr| expr.stage())
   }

   /// Aliases declared in the outermost SELECT list, in order.
   pub fn select_aliases(&self) -> Vec<&str> {
      let Some(select) = self.top_level_select() else {
         return Vec::new();
      };

      select
         .projection
         .iter()
         .filter_map(|item| match item {
            SelectItem::ExprWithAlias { alias, .. } => Some(alias.value.as_str()),
            _ => None,
         })
         .collect()
   }

   fn query(&self) -> Option<&Query> {
      match &self.tree {
         Statement::Query(query) => Some(query.as_ref()),
         _ => None,
      }
   }

   fn body(&self) -> Option<&SetExpr> {
      self.query().map(|query| query.body.as_ref())
   }

   fn top_level_select(&self) -> Option<&Select> {
      match self.body()? {
         SetExpr::Select(select) => Some(select.as_ref()),
         _ => None,
      }
   }

   fn find_alias(&self, alias: &str) -> Option<SelectExpr<'_>> {
      let select = self.top_level_select()?;

      select.projection.iter().find_map(|item| match item {
         SelectItem::ExprWithAlias { expr, alias: bound } if alias_matches(bound, alias) => {
            Some(SelectExpr::classify(expr))
         }
         _ => None,
      })
   }
}

/// Unquoted identifiers compare case-insensitively; quoted ones exactly.
fn alias_matches(bound: &Ident, requested: &str) -> bool {
   match bound.quote_style {
      Some(_) => bound.value == requested,
      None => bound.value.eq_ignore_ascii_case(requested),
   }
}
