//! Index selection.
//!
//! Picks the first declared index whose leading columns are pinned by the
//! decomposed triples and turns the triples into a plan shape.

use crate::ast::SortOrder;
use crate::decompose::{Comparison, Triple, TripleKind, ValueSource};
use crate::error::CompileError;
use crate::plan::PlanShape;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use keyscan_core::schema::{IndexCoverage, IndexDef, Order, SchemaCatalogue};

/// The outcome of index selection.
#[derive(Debug)]
pub(crate) struct Selection {
    pub(crate) width: usize,
    pub(crate) distinct: bool,
    pub(crate) shape: PlanShape,
}

/// A condition dropped because an earlier one on the same field won.
struct Ignored<'t> {
    field: &'t str,
    count: usize,
}

/// Chooses an index for `triples` and builds the plan shape.
pub(crate) fn select<S: SchemaCatalogue + ?Sized>(
    catalogue: &S,
    triples: &[Triple],
    order: SortOrder,
) -> Result<Selection, CompileError> {
    if let [triple] = triples {
        if triple.kind == TripleKind::Prefix {
            return select_tuple_index(catalogue, triple);
        }
    }

    if triples.is_empty() {
        return Err(CompileError::unsupported("", "no conditions to answer"));
    }
    let fields = distinct_fields(triples);
    for field in &fields {
        if catalogue.column(field).is_none() {
            return Err(CompileError::UnknownField {
                field: (*field).into(),
            });
        }
    }

    let coverage: Vec<Vec<IndexCoverage>> = fields
        .iter()
        .map(|field| catalogue.indices_covering(field))
        .collect();
    let candidates: Vec<&IndexDef> = catalogue
        .indices()
        .iter()
        .filter(|def| !def.is_tuple())
        .filter(|def| {
            coverage
                .iter()
                .all(|covering| covering.iter().any(|c| c.index == def.name()))
        })
        .collect();
    if candidates.is_empty() {
        return Err(CompileError::NoCoveringIndex {
            fields: owned(&fields),
        });
    }

    for def in candidates {
        let Some((shape, ignored)) = shape_for(def, triples, order) else {
            tracing::trace!(index = def.name(), "index does not fit the conditions");
            continue;
        };
        for skip in ignored {
            tracing::warn!(
                field = skip.field,
                index = def.name(),
                ignored = skip.count,
                "ignoring redundant conditions on field"
            );
        }
        return Ok(Selection {
            width: def.width(),
            distinct: produces_repeats(catalogue, def),
            shape,
        });
    }

    Err(CompileError::NoSuitableIndex {
        fields: owned(&fields),
    })
}

/// Tries to answer `triples` from `def`.
///
/// Returns `None` when the referenced positions are not a contiguous run from
/// the first key column or an earlier column lacks an equality.
fn shape_for<'t>(
    def: &IndexDef,
    triples: &'t [Triple],
    order: SortOrder,
) -> Option<(PlanShape, Vec<Ignored<'t>>)> {
    let mut groups: BTreeMap<usize, Vec<&'t Triple>> = BTreeMap::new();
    for triple in triples {
        groups
            .entry(def.position_of(&triple.field)?)
            .or_default()
            .push(triple);
    }
    if groups.keys().enumerate().any(|(i, &pos)| i != pos) {
        return None;
    }

    let reversed = order == SortOrder::Desc;
    let last = groups.len() - 1;
    let mut prefix: Vec<ValueSource> = Vec::with_capacity(groups.len());
    let mut ignored = Vec::new();

    for (pos, group) in groups {
        let equality = find(&group, Comparison::Eq);
        if let Some(eq) = equality {
            if group.len() > 1 {
                ignored.push(Ignored {
                    field: &eq.field,
                    count: group.len() - 1,
                });
            }
            prefix.push(eq.value.clone());
            if pos == last {
                let shape = PlanShape::Exact {
                    index: def.name().into(),
                    values: prefix,
                    reversed,
                };
                return Some((shape, ignored));
            }
            continue;
        }
        if pos != last {
            return None;
        }

        let lower = find(&group, Comparison::Ge);
        let upper = find(&group, Comparison::Le);
        let used = usize::from(lower.is_some()) + usize::from(upper.is_some());
        if group.len() > used {
            let first: &'t Triple = group[0];
            ignored.push(Ignored {
                field: &first.field,
                count: group.len() - used,
            });
        }

        let (start_value, end_value) = match def.columns()[pos].order {
            Order::Asc => (lower, upper),
            Order::Desc => (upper, lower),
        };
        let shape = PlanShape::Range {
            index: def.name().into(),
            start: bound_values(&prefix, start_value),
            end: bound_values(&prefix, end_value),
            reversed,
        };
        return Some((shape, ignored));
    }
    None
}

fn select_tuple_index<S: SchemaCatalogue + ?Sized>(
    catalogue: &S,
    triple: &Triple,
) -> Result<Selection, CompileError> {
    let column = catalogue
        .column(&triple.field)
        .ok_or_else(|| CompileError::UnknownField {
            field: triple.field.clone(),
        })?;
    if !column.data_type().supports_prefix() {
        return Err(CompileError::IncompatibleColumnType {
            column: triple.field.clone(),
            data_type: column.data_type(),
        });
    }

    let def = catalogue
        .indices_covering(&triple.field)
        .iter()
        .filter(|c| c.position == 0)
        .filter_map(|c| catalogue.index(&c.index))
        .find(|def| def.is_tuple())
        .ok_or_else(|| CompileError::NoTupleIndex {
            field: triple.field.clone(),
        })?;

    Ok(Selection {
        width: def.width(),
        distinct: true,
        shape: PlanShape::Prefix {
            index: def.name().into(),
            values: alloc::vec![triple.value.clone()],
        },
    })
}

/// Whether one record can own several entries of `def`.
pub(crate) fn produces_repeats<S: SchemaCatalogue + ?Sized>(catalogue: &S, def: &IndexDef) -> bool {
    def.is_tuple()
        || def.columns().iter().any(|c| {
            catalogue
                .column(&c.name)
                .map_or(false, |column| column.is_multi_valued())
        })
}

fn find<'t>(group: &[&'t Triple], comparison: Comparison) -> Option<&'t Triple> {
    group
        .iter()
        .copied()
        .find(|t| t.kind == TripleKind::Compare(comparison))
}

fn bound_values(prefix: &[ValueSource], value: Option<&Triple>) -> Option<Vec<ValueSource>> {
    let mut values = prefix.to_vec();
    if let Some(triple) = value {
        values.push(triple.value.clone());
    }
    (!values.is_empty()).then_some(values)
}

fn distinct_fields(triples: &[Triple]) -> Vec<&str> {
    let mut fields: Vec<&str> = Vec::new();
    for triple in triples {
        if !fields.contains(&triple.field.as_str()) {
            fields.push(&triple.field);
        }
    }
    fields
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| String::from(*f)).collect()
}
