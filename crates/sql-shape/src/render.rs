//! Alias-free re-serialization of SELECT-list expressions.
//!
//! Each SELECT-list entry is classified into one of a closed set of
//! expression kinds. Every kind knows how to print its expression without
//! the trailing `AS alias` clause, which is all alias resolution needs.

use std::ops::ControlFlow;

use sqlparser::ast::{Expr, Function, FunctionArguments, Ident, Visit, visit_expressions};

/// Functions treated as aggregates when called without `OVER`.
///
/// Multi-argument scalar `min`/`max` (SQLite) are counted too; that only
/// ever moves a seek predicate further out of the query.
const AGGREGATE_FUNCTIONS: &[&str] = &[
   "any_value",
   "array_agg",
   "avg",
   "bit_and",
   "bit_or",
   "bool_and",
   "bool_or",
   "count",
   "every",
   "group_concat",
   "json_agg",
   "json_group_array",
   "json_group_object",
   "jsonb_agg",
   "listagg",
   "max",
   "min",
   "stddev",
   "stddev_pop",
   "stddev_samp",
   "string_agg",
   "sum",
   "total",
   "var_pop",
   "var_samp",
   "variance",
];

/// Kind of expression bound to a SELECT-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
   /// Plain or qualified column reference (`id`, `u.id`)
   ColumnRef,
   /// Parenthesized expression (`(a + b)`)
   Bracketed,
   /// Function call with an argument list (`lower(name)`, `count(*)`)
   Function,
   /// Literal constant (`1`, `'x'`, `NULL`)
   Constant,
   /// Keyword-like niladic function (`CURRENT_TIMESTAMP`)
   Reserved,
   /// Any other scalar expression (`1 + 2`, `CASE ...`, `CAST(...)`)
   Scalar,
}

/// Earliest clause in which a SELECT-list expression can be evaluated.
///
/// Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprStage {
   /// Computed per input row; usable in WHERE
   Row,
   /// Contains an aggregate; usable in HAVING of a grouped SELECT
   Aggregate,
   /// Contains a window function; only usable from an enclosing query
   Window,
}

/// Borrowed view of a SELECT-list expression, tagged by kind.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SelectExpr<'a> {
   ColumnRef(&'a [Ident]),
   Bracketed(&'a Expr),
   Function(&'a Function),
   Constant(&'a Expr),
   Reserved(&'a Function),
   Scalar(&'a Expr),
}

impl<'a> SelectExpr<'a> {
   pub(crate) fn classify(expr: &'a Expr) -> Self {
      match expr {
         Expr::Identifier(ident) => SelectExpr::ColumnRef(std::slice::from_ref(ident)),
         Expr::CompoundIdentifier(parts) => SelectExpr::ColumnRef(parts),
         Expr::Nested(inner) => SelectExpr::Bracketed(inner.as_ref()),
         Expr::Function(func) if matches!(func.args, FunctionArguments::None) => {
            SelectExpr::Reserved(func)
         }
         Expr::Function(func) => SelectExpr::Function(func),
         Expr::Value(_) => SelectExpr::Constant(expr),
         other => SelectExpr::Scalar(other),
      }
   }

   pub(crate) fn kind(&self) -> ExprKind {
      match self {
         SelectExpr::ColumnRef(_) => ExprKind::ColumnRef,
         SelectExpr::Bracketed(_) => ExprKind::Bracketed,
         SelectExpr::Function(_) => ExprKind::Function,
         SelectExpr::Constant(_) => ExprKind::Constant,
         SelectExpr::Reserved(_) => ExprKind::Reserved,
         SelectExpr::Scalar(_) => ExprKind::Scalar,
      }
   }

   /// Evaluation stage, from the functions the expression contains.
   ///
   /// Functions inside subqueries count as well.
   pub(crate) fn stage(&self) -> ExprStage {
      match self {
         SelectExpr::ColumnRef(_) | SelectExpr::Constant(_) | SelectExpr::Reserved(_) => {
            ExprStage::Row
         }
         SelectExpr::Bracketed(expr) | SelectExpr::Scalar(expr) => stage_of(*expr),
         SelectExpr::Function(func) => function_stage(func).max(stage_of(*func)),
      }
   }

   /// Print the expression text, never the alias it was bound to.
   pub(crate) fn render_without_alias(&self) -> String {
      match self {
         SelectExpr::ColumnRef(parts) => parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("."),
         SelectExpr::Bracketed(inner) => {
            format!("({})", SelectExpr::classify(inner).render_without_alias())
         }
         SelectExpr::Function(func) => func.to_string(),
         SelectExpr::Constant(expr) => expr.to_string(),
         SelectExpr::Reserved(func) => func.name.to_string(),
         SelectExpr::Scalar(expr) => expr.to_string(),
      }
   }
}

fn function_stage(func: &Function) -> ExprStage {
   if func.over.is_some() {
      return ExprStage::Window;
   }
   if func.filter.is_some() || !func.within_group.is_empty() {
      return ExprStage::Aggregate;
   }

   let name = func.name.to_string();
   let base = name.rsplit('.').next().unwrap_or(&name).trim_matches('"');
   if AGGREGATE_FUNCTIONS.iter().any(|agg| base.eq_ignore_ascii_case(agg)) {
      ExprStage::Aggregate
   } else {
      ExprStage::Row
   }
}

/// Latest stage of any function call nested in `node`.
fn stage_of<V: Visit>(node: &V) -> ExprStage {
   let mut stage = ExprStage::Row;
   let _ = visit_expressions(node, |expr| {
      if let Expr::Function(func) = expr {
         stage = stage.max(function_stage(func));
      }
      ControlFlow::<()>::Continue(())
   });
   stage
}
