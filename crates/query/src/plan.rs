//! Compiled query plans.
//!
//! A `QueryPlan` is the product of compiling a predicate once: the chosen
//! index, the strategy, and where every key value comes from. Binding it to
//! arguments yields a `Filter`; the plan itself is immutable and can be
//! shared between threads.

use crate::ast::{Expr, SortOrder};
use crate::decompose::{decompose, ValueSource};
use crate::error::{CompileError, FilterError};
use crate::filter::{
    ExactMatch, Filter, FilterStrategy, PrefixScan, RangeScan, WholeIndexScan,
};
use crate::selector::{self, Selection};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use keyscan_core::schema::{IndexDef, SchemaCatalogue};
use keyscan_core::Value;

/// The strategy a plan binds to, with unresolved values.
#[derive(Clone, Debug)]
pub(crate) enum PlanShape {
    WholeIndex {
        index: Option<String>,
        reversed: bool,
    },
    Exact {
        index: String,
        values: Vec<ValueSource>,
        reversed: bool,
    },
    Range {
        index: String,
        start: Option<Vec<ValueSource>>,
        end: Option<Vec<ValueSource>>,
        reversed: bool,
    },
    Prefix {
        index: String,
        values: Vec<ValueSource>,
    },
}

impl PlanShape {
    fn index(&self) -> Option<&str> {
        match self {
            PlanShape::WholeIndex { index, .. } => index.as_deref(),
            PlanShape::Exact { index, .. }
            | PlanShape::Range { index, .. }
            | PlanShape::Prefix { index, .. } => Some(index),
        }
    }

    fn strategy_name(&self) -> &'static str {
        match self {
            PlanShape::WholeIndex { .. } => "whole-index",
            PlanShape::Exact { reversed: false, .. } => "exact-match",
            PlanShape::Exact { reversed: true, .. } => "exact-match-reversed",
            PlanShape::Range { reversed: false, .. } => "range",
            PlanShape::Range { reversed: true, .. } => "range-reversed",
            PlanShape::Prefix { .. } => "prefix",
        }
    }

    fn value_count(&self) -> usize {
        match self {
            PlanShape::WholeIndex { .. } => 0,
            PlanShape::Exact { values, .. } | PlanShape::Prefix { values, .. } => values.len(),
            PlanShape::Range { start, end, .. } => {
                start.as_ref().map_or(0, Vec::len).max(end.as_ref().map_or(0, Vec::len))
            }
        }
    }
}

#[derive(Debug)]
struct PlanInner {
    width: usize,
    distinct: bool,
    shape: PlanShape,
}

/// A compiled, reusable query plan.
#[derive(Clone, Debug)]
pub struct QueryPlan(Arc<PlanInner>);

impl QueryPlan {
    fn new(selection: Selection) -> Self {
        Self(Arc::new(PlanInner {
            width: selection.width,
            distinct: selection.distinct,
            shape: selection.shape,
        }))
    }

    /// Resolves every value against `args` and builds the filter.
    pub fn bind(&self, args: &[Value]) -> Result<Filter, FilterError> {
        let resolve = |sources: &[ValueSource]| -> Result<Vec<Value>, FilterError> {
            sources.iter().map(|s| s.resolve(args)).collect()
        };
        let width = self.0.width;

        let strategy = match &self.0.shape {
            PlanShape::WholeIndex { index, reversed } => {
                FilterStrategy::WholeIndex(WholeIndexScan::new(index.clone()).reversed(*reversed))
            }
            PlanShape::Exact {
                index,
                values,
                reversed,
            } => {
                let scan = ExactMatch::new(index.as_str(), width, resolve(values)?)?;
                if *reversed {
                    FilterStrategy::ExactMatchReversed(scan)
                } else {
                    FilterStrategy::ExactMatch(scan)
                }
            }
            PlanShape::Range {
                index,
                start,
                end,
                reversed,
            } => {
                let start = start.as_deref().map(resolve).transpose()?;
                let end = end.as_deref().map(resolve).transpose()?;
                let scan = RangeScan::new(index.as_str(), width, start, end)?;
                if *reversed {
                    FilterStrategy::RangeReversed(scan)
                } else {
                    FilterStrategy::Range(scan)
                }
            }
            PlanShape::Prefix { index, values } => {
                FilterStrategy::Prefix(PrefixScan::new(index.as_str(), width, resolve(values)?)?)
            }
        };
        Ok(Filter::new(strategy).with_distinct(self.0.distinct))
    }

    /// Returns the index scanned. `None` is the clustering index.
    pub fn index_name(&self) -> Option<&str> {
        self.0.shape.index()
    }

    /// Returns the name of the strategy `bind` produces.
    pub fn strategy_name(&self) -> &'static str {
        self.0.shape.strategy_name()
    }

    /// Returns true if scans suppress repeated records.
    pub fn is_distinct(&self) -> bool {
        self.0.distinct
    }

    /// Summarises the plan for diagnostics.
    pub fn describe(&self) -> PlanDescription {
        PlanDescription {
            index: self.index_name().map(String::from),
            strategy: self.strategy_name(),
            values: self.0.shape.value_count(),
            distinct: self.0.distinct,
        }
    }
}

/// A summary of a compiled plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanDescription {
    pub index: Option<String>,
    pub strategy: &'static str,
    /// Key values supplied at the longer end of the range.
    pub values: usize,
    pub distinct: bool,
}

impl fmt::Display for PlanDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} ({} values",
            self.strategy,
            self.index.as_deref().unwrap_or("<clustered>"),
            self.values
        )?;
        if self.distinct {
            write!(f, ", distinct")?;
        }
        write!(f, ")")
    }
}

/// Options for `QueryCompiler`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Direction in which compiled scans return entries.
    pub order: SortOrder,
}

/// Compiles predicates against one table's schema.
pub struct QueryCompiler<'a, S: SchemaCatalogue + ?Sized> {
    catalogue: &'a S,
    options: CompileOptions,
}

impl<'a, S: SchemaCatalogue + ?Sized> QueryCompiler<'a, S> {
    /// Creates a compiler with default options.
    pub fn new(catalogue: &'a S) -> Self {
        Self {
            catalogue,
            options: CompileOptions::default(),
        }
    }

    /// Replaces the compile options.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compiles a predicate using the configured order.
    pub fn compile(&self, expr: &Expr) -> Result<QueryPlan, CompileError> {
        self.compile_ordered(expr, self.options.order)
    }

    /// Compiles a predicate, scanning in `order`.
    ///
    /// The predicate must be a conjunction of `==`, `<=` and `>=` comparisons
    /// between a field and a literal, argument or thunk, or a single
    /// `contains` on a field covered by a tuple index.
    pub fn compile_ordered(&self, expr: &Expr, order: SortOrder) -> Result<QueryPlan, CompileError> {
        let triples = decompose(expr)?;
        if matches!(expr, Expr::Contains { .. }) && order == SortOrder::Desc {
            return Err(CompileError::unsupported(
                alloc::format!("{}", expr),
                "containment scans only run in ascending order",
            ));
        }
        let selection = selector::select(self.catalogue, &triples, order)?;
        Ok(self.finish(selection))
    }

    /// Plans a scan of every entry of an index. `None` is the clustering index.
    pub fn scan_index(&self, index: Option<&str>) -> Result<QueryPlan, CompileError> {
        let (width, distinct) = match index {
            Some(name) => {
                let def = self.index_def(name)?;
                (def.width(), selector::produces_repeats(self.catalogue, def))
            }
            None => (0, false),
        };
        Ok(self.finish(Selection {
            width,
            distinct,
            shape: PlanShape::WholeIndex {
                index: index.map(String::from),
                reversed: self.options.order == SortOrder::Desc,
            },
        }))
    }

    /// Plans an exact match on the leading columns of a named index.
    ///
    /// Each value must be a literal, argument or thunk.
    pub fn match_index(&self, index: &str, values: &[Expr]) -> Result<QueryPlan, CompileError> {
        let def = self.index_def(index)?;
        let values = self.index_values(index, def.width(), values)?;
        Ok(self.finish(Selection {
            width: def.width(),
            distinct: selector::produces_repeats(self.catalogue, def),
            shape: PlanShape::Exact {
                index: index.into(),
                values,
                reversed: self.options.order == SortOrder::Desc,
            },
        }))
    }

    /// Plans an inclusive range over a named index, in key order.
    pub fn range_index(
        &self,
        index: &str,
        start: Option<&[Expr]>,
        end: Option<&[Expr]>,
    ) -> Result<QueryPlan, CompileError> {
        let def = self.index_def(index)?;
        let start = start
            .map(|values| self.index_values(index, def.width(), values))
            .transpose()?;
        let end = end
            .map(|values| self.index_values(index, def.width(), values))
            .transpose()?;
        Ok(self.finish(Selection {
            width: def.width(),
            distinct: selector::produces_repeats(self.catalogue, def),
            shape: PlanShape::Range {
                index: index.into(),
                start,
                end,
                reversed: self.options.order == SortOrder::Desc,
            },
        }))
    }

    fn index_def(&self, name: &str) -> Result<&'a IndexDef, CompileError> {
        self.catalogue
            .index(name)
            .ok_or_else(|| CompileError::UnknownIndex { index: name.into() })
    }

    fn index_values(
        &self,
        index: &str,
        width: usize,
        values: &[Expr],
    ) -> Result<Vec<ValueSource>, CompileError> {
        if values.len() > width {
            return Err(CompileError::TooManyValues {
                index: index.into(),
                width,
                count: values.len(),
            });
        }
        values.iter().map(ValueSource::from_expr).collect()
    }

    fn finish(&self, selection: Selection) -> QueryPlan {
        let plan = QueryPlan::new(selection);
        tracing::debug!(
            index = ?plan.index_name(),
            strategy = plan.strategy_name(),
            values = plan.0.shape.value_count(),
            distinct = plan.is_distinct(),
            "compiled query plan"
        );
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;
    use keyscan_core::schema::{Order, Table, TableBuilder};
    use keyscan_core::DataType;

    fn table() -> Table {
        TableBuilder::new("t")
            .unwrap()
            .add_column("c1", DataType::Int32)
            .unwrap()
            .add_column("c2", DataType::Int32)
            .unwrap()
            .add_primary_key(&["c1", "c2"])
            .unwrap()
            .add_ordered_index("ixDesc", &[("c2", Order::Desc)])
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_bind_resolves_arguments() {
        let table = table();
        let compiler = QueryCompiler::new(&table);
        let plan = compiler
            .compile(&Expr::and(
                Expr::eq(Expr::field("c1"), Expr::param(0)),
                Expr::ge(Expr::field("c2"), Expr::thunk(|args| args[1].clone())),
            ))
            .unwrap();
        assert_eq!(plan.strategy_name(), "range");
        assert_eq!(plan.index_name(), Some("pkT"));

        let filter = plan.bind(&[Value::Int32(5), Value::Int32(2)]).unwrap();
        match filter.strategy() {
            FilterStrategy::Range(scan) => {
                assert_eq!(scan.start(), Some(&[Value::Int32(5), Value::Int32(2)][..]));
                assert_eq!(scan.end(), Some(&[Value::Int32(5)][..]));
            }
            other => panic!("unexpected strategy: {:?}", other),
        }

        assert_eq!(
            plan.bind(&[]).unwrap_err(),
            FilterError::MissingArgument { index: 0, supplied: 0 }
        );
    }

    #[test]
    fn test_descending_order() {
        let table = table();
        let compiler = QueryCompiler::new(&table).with_options(CompileOptions {
            order: SortOrder::Desc,
        });
        let plan = compiler.compile(&Expr::eq(Expr::field("c1"), Expr::literal(1))).unwrap();
        assert_eq!(plan.strategy_name(), "exact-match-reversed");
        assert!(plan.bind(&[]).unwrap().is_reversed());

        let whole = compiler.scan_index(None).unwrap();
        assert_eq!(whole.strategy_name(), "whole-index");
        assert!(whole.bind(&[]).unwrap().is_reversed());
    }

    #[test]
    fn test_named_index_plans() {
        let table = table();
        let compiler = QueryCompiler::new(&table);
        let err = compiler
            .match_index("ixDesc", &[Expr::literal(1), Expr::literal(2)])
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::TooManyValues {
                index: "ixDesc".into(),
                width: 1,
                count: 2,
            }
        );
        assert!(matches!(
            compiler.scan_index(Some("missing")),
            Err(CompileError::UnknownIndex { .. })
        ));

        let range = compiler
            .range_index("pkT", Some(&[Expr::literal(1)][..]), None)
            .unwrap();
        assert_eq!(range.describe().values, 1);
        assert!(compiler.match_index("pkT", &[Expr::field("c1")]).is_err());
    }

    #[test]
    fn test_describe() {
        let table = table();
        let plan = QueryCompiler::new(&table)
            .compile(&Expr::eq(Expr::field("c2"), Expr::literal(4)))
            .unwrap();
        let description = plan.describe();
        assert_eq!(description.index.as_deref(), Some("ixDesc"));
        assert_eq!(format!("{}", description), "exact-match on ixDesc (1 values)");
    }

    #[test]
    fn test_contains_descending_rejected() {
        let table = table();
        let compiler = QueryCompiler::new(&table);
        let expr = Expr::contains(Expr::field("c1"), Expr::literal("a"));
        assert!(matches!(
            compiler.compile_ordered(&expr, SortOrder::Desc),
            Err(CompileError::UnsupportedExpression { .. })
        ));
    }

    #[test]
    fn test_plan_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryPlan>();
        assert_send_sync::<Filter>();
    }

    #[test]
    fn test_plan_clone_shares_state() {
        let table = table();
        let plan = QueryCompiler::new(&table)
            .compile(&Expr::eq(Expr::field("c1"), Expr::literal(1)))
            .unwrap();
        let clone = plan.clone();
        assert_eq!(clone.describe(), plan.describe());
        assert_eq!(vec![clone.index_name()], vec![Some("pkT")]);
    }
}
