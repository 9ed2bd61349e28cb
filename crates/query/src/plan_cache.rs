//! Query plan cache for avoiding repeated compilation.
//!
//! Plans are keyed by a fingerprint of the predicate's structure and
//! literal values, plus the requested order. Argument references hash by
//! position, so one plan serves every bind of the same predicate. Thunks
//! hash by identity: a predicate rebuilt with a fresh closure misses.
//!
//! Fingerprints do not include the schema; use one cache per table.

use crate::ast::{Expr, SortOrder};
use crate::error::CompileError;
use crate::plan::{QueryCompiler, QueryPlan};
use alloc::collections::BTreeMap;
use core::hash::Hasher;
use keyscan_core::schema::SchemaCatalogue;
use keyscan_core::Value;

/// A simple hasher for computing predicate fingerprints.
/// Uses FNV-1a algorithm which is fast and has good distribution.
#[derive(Default)]
struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Computes a fingerprint for a predicate compiled in `order`.
pub fn compute_expr_fingerprint(expr: &Expr, order: SortOrder) -> u64 {
    let mut hasher = FnvHasher::new();
    hasher.write(&[order as u8]);
    hash_expr(expr, &mut hasher);
    hasher.finish()
}

fn hash_str<H: Hasher>(s: &[u8], hasher: &mut H) {
    hasher.write(&(s.len() as u64).to_le_bytes());
    hasher.write(s);
}

fn hash_expr<H: Hasher>(expr: &Expr, hasher: &mut H) {
    match expr {
        Expr::Field(name) => {
            hasher.write(b"field");
            hash_str(name.as_bytes(), hasher);
        }
        Expr::Literal(value) => {
            hasher.write(b"lit");
            hash_value(value, hasher);
        }
        Expr::Param(i) => {
            hasher.write(b"param");
            hasher.write(&(*i as u64).to_le_bytes());
        }
        Expr::Thunk(thunk) => {
            hasher.write(b"thunk");
            hasher.write(&(thunk.id() as u64).to_le_bytes());
        }
        Expr::BinaryOp { left, op, right } => {
            hasher.write(b"binop");
            hasher.write(&[*op as u8]);
            hash_expr(left, hasher);
            hash_expr(right, hasher);
        }
        Expr::UnaryOp { op, expr } => {
            hasher.write(b"unop");
            hasher.write(&[*op as u8]);
            hash_expr(expr, hasher);
        }
        Expr::Contains { haystack, needle } => {
            hasher.write(b"contains");
            hash_expr(haystack, hasher);
            hash_expr(needle, hasher);
        }
        Expr::Call { name, args } => {
            hasher.write(b"call");
            hash_str(name.as_bytes(), hasher);
            hasher.write(&(args.len() as u64).to_le_bytes());
            for arg in args {
                hash_expr(arg, hasher);
            }
        }
    }
}

fn hash_value<H: Hasher>(value: &Value, hasher: &mut H) {
    match value {
        Value::Null => hasher.write(b"null"),
        Value::Boolean(b) => {
            hasher.write(b"bool");
            hasher.write(&[*b as u8]);
        }
        Value::Int32(i) => {
            hasher.write(b"i32");
            hasher.write(&i.to_le_bytes());
        }
        Value::Int64(i) => {
            hasher.write(b"i64");
            hasher.write(&i.to_le_bytes());
        }
        Value::Float64(f) => {
            hasher.write(b"f64");
            hasher.write(&f.to_le_bytes());
        }
        Value::String(s) => {
            hasher.write(b"str");
            hash_str(s.as_bytes(), hasher);
        }
        Value::DateTime(dt) => {
            hasher.write(b"dt");
            hasher.write(&dt.to_le_bytes());
        }
        Value::Bytes(b) => {
            hasher.write(b"bytes");
            hash_str(b, hasher);
        }
        Value::List(items) => {
            hasher.write(b"list");
            hasher.write(&(items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(item, hasher);
            }
        }
    }
}

/// Returns true if two predicates would compile to the same plan: equal
/// structure, equal literals, the same parameter positions and the same
/// thunks.
fn same_expr(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Field(x), Expr::Field(y)) => x == y,
        (Expr::Literal(x), Expr::Literal(y)) => same_value(x, y),
        (Expr::Param(x), Expr::Param(y)) => x == y,
        (Expr::Thunk(x), Expr::Thunk(y)) => x.id() == y.id(),
        (
            Expr::BinaryOp { left, op, right },
            Expr::BinaryOp {
                left: l2,
                op: op2,
                right: r2,
            },
        ) => op == op2 && same_expr(left, l2) && same_expr(right, r2),
        (Expr::UnaryOp { op, expr }, Expr::UnaryOp { op: op2, expr: e2 }) => {
            op == op2 && same_expr(expr, e2)
        }
        (
            Expr::Contains { haystack, needle },
            Expr::Contains {
                haystack: h2,
                needle: n2,
            },
        ) => same_expr(haystack, h2) && same_expr(needle, n2),
        (Expr::Call { name, args }, Expr::Call { name: n2, args: a2 }) => {
            name == n2 && args.len() == a2.len() && args.iter().zip(a2).all(|(x, y)| same_expr(x, y))
        }
        _ => false,
    }
}

/// Value equality as the fingerprint sees it: floats compare by bits.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float64(x), Value::Float64(y)) => x.to_bits() == y.to_bits(),
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        _ => a == b,
    }
}

/// Cache entry with access tracking for LRU eviction.
struct CacheEntry {
    plan: QueryPlan,
    /// The predicate and order the plan was compiled from, when known.
    source: Option<(Expr, SortOrder)>,
    last_access: u64,
}

/// LRU cache for compiled query plans.
///
/// When the cache is full, the least recently used entry is evicted.
pub struct PlanCache {
    /// Cached plans indexed by fingerprint.
    cache: BTreeMap<u64, CacheEntry>,
    /// Maximum number of entries.
    max_size: usize,
    /// Global access counter for LRU tracking.
    access_counter: u64,
    hits: u64,
    misses: u64,
}

impl PlanCache {
    /// Creates a new plan cache with the given maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: BTreeMap::new(),
            max_size,
            access_counter: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Creates a plan cache with default size (64 entries).
    pub fn default_size() -> Self {
        Self::new(64)
    }

    /// Gets a cached plan by fingerprint.
    pub fn get(&mut self, fingerprint: u64) -> Option<QueryPlan> {
        self.access_counter += 1;
        if let Some(entry) = self.cache.get_mut(&fingerprint) {
            entry.last_access = self.access_counter;
            self.hits += 1;
            Some(entry.plan.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    /// Inserts a plan into the cache.
    /// If the cache is full, evicts the least recently used entry.
    pub fn insert(&mut self, fingerprint: u64, plan: QueryPlan) {
        self.store(fingerprint, plan, None);
    }

    fn store(&mut self, fingerprint: u64, plan: QueryPlan, source: Option<(Expr, SortOrder)>) {
        if self.max_size == 0 {
            return;
        }
        if !self.cache.contains_key(&fingerprint) && self.cache.len() >= self.max_size {
            self.evict_lru();
        }

        self.access_counter += 1;
        self.cache.insert(
            fingerprint,
            CacheEntry {
                plan,
                source,
                last_access: self.access_counter,
            },
        );
    }

    /// Compiles `expr` with `compiler`, reusing a cached plan when the same
    /// predicate was compiled before in the same order.
    ///
    /// A cached entry is reused only if its recorded predicate equals `expr`;
    /// a fingerprint collision, or an entry stored through `insert`, is
    /// recompiled and replaced.
    pub fn compile<S: SchemaCatalogue + ?Sized>(
        &mut self,
        compiler: &QueryCompiler<'_, S>,
        expr: &Expr,
    ) -> Result<QueryPlan, CompileError> {
        let order = compiler.options().order;
        let fingerprint = compute_expr_fingerprint(expr, order);

        self.access_counter += 1;
        if let Some(entry) = self.cache.get_mut(&fingerprint) {
            let matches = entry
                .source
                .as_ref()
                .map_or(false, |(cached, o)| *o == order && same_expr(cached, expr));
            if matches {
                entry.last_access = self.access_counter;
                self.hits += 1;
                return Ok(entry.plan.clone());
            }
            tracing::trace!(fingerprint, "cached plan belongs to another predicate");
        }
        self.misses += 1;

        let plan = compiler.compile_ordered(expr, order)?;
        self.store(fingerprint, plan.clone(), Some((expr.clone(), order)));
        Ok(plan)
    }

    /// Evicts the least recently used entry.
    fn evict_lru(&mut self) {
        let lru_key = self
            .cache
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(k, _)| *k);

        if let Some(key) = lru_key {
            tracing::trace!(fingerprint = key, "evicting cached plan");
            self.cache.remove(&key);
        }
    }

    /// Clears the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Returns the number of cached plans.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns cache hit count.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Returns cache miss count.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
