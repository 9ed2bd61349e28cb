//! Expression AST definitions.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use keyscan_core::Value;

/// A value computed when a plan is bound to its arguments.
///
/// The closure receives the bind arguments and must be free of side effects:
/// a plan may evaluate it any number of times, from any thread.
#[derive(Clone)]
pub struct ValueThunk(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl ValueThunk {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluates the thunk against bind arguments.
    pub fn eval(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Returns an identity usable for fingerprinting.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ValueThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueThunk({:#x})", self.id())
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Returns true for comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// The operator obtained by swapping the operands.
    pub fn mirror(&self) -> BinaryOp {
        match self {
            BinaryOp::Lt => BinaryOp::Gt,
            BinaryOp::Le => BinaryOp::Ge,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::Ge => BinaryOp::Le,
            other => *other,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Expression AST node.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Reference to a field of the record.
    Field(String),
    /// Literal value.
    Literal(Value),
    /// Positional bind argument.
    Param(usize),
    /// Value computed at bind time.
    Thunk(ValueThunk),
    /// Binary operation.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// String or byte-string containment.
    Contains {
        haystack: Box<Expr>,
        needle: Box<Expr>,
    },
    /// Function or method call.
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Creates a field reference expression.
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Creates a positional argument reference.
    pub fn param(index: usize) -> Self {
        Expr::Param(index)
    }

    /// Creates a deferred value.
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Expr::Thunk(ValueThunk::new(f))
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Eq, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ne, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Le, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ge, right)
    }

    /// Creates an AND expression.
    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::And, right)
    }

    /// Creates an OR expression.
    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Or, right)
    }

    /// Creates an addition expression.
    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Add, right)
    }

    /// Creates a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    /// Creates a containment expression.
    pub fn contains(haystack: Expr, needle: Expr) -> Self {
        Expr::Contains {
            haystack: Box::new(haystack),
            needle: Box::new(needle),
        }
    }

    /// Creates a call expression.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Joins conditions with AND, left to right.
    pub fn all(conditions: impl IntoIterator<Item = Expr>) -> Option<Self> {
        conditions.into_iter().reduce(Expr::and)
    }

    /// Returns the field name if this is a field reference.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Expr::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this expression references no field.
    pub fn is_value(&self) -> bool {
        match self {
            Expr::Field(_) => false,
            Expr::Literal(_) | Expr::Param(_) | Expr::Thunk(_) => true,
            Expr::BinaryOp { left, right, .. } => left.is_value() && right.is_value(),
            Expr::UnaryOp { expr, .. } => expr.is_value(),
            Expr::Contains { haystack, needle } => haystack.is_value() && needle.is_value(),
            Expr::Call { args, .. } => args.iter().all(Expr::is_value),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) => write!(f, "r.{}", name),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Param(i) => write!(f, "${}", i),
            Expr::Thunk(_) => write!(f, "<thunk>"),
            Expr::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::UnaryOp { op: UnaryOp::Not, expr } => write!(f, "!{}", expr),
            Expr::UnaryOp { op: UnaryOp::Neg, expr } => write!(f, "-{}", expr),
            Expr::Contains { haystack, needle } => write!(f, "{}.contains({})", haystack, needle),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn test_display() {
        let expr = Expr::and(
            Expr::eq(Expr::field("c1"), Expr::literal(5)),
            Expr::ge(Expr::param(0), Expr::field("c2")),
        );
        assert_eq!(format!("{}", expr), "((r.c1 == 5) && ($0 >= r.c2))");

        let call = Expr::call("len", vec![Expr::field("name")]);
        assert_eq!(format!("{}", call), "len(r.name)");
        assert_eq!(
            format!("{}", Expr::contains(Expr::field("s"), Expr::literal("ab"))),
            "r.s.contains(\"ab\")"
        );
    }

    #[test]
    fn test_mirror() {
        assert_eq!(BinaryOp::Le.mirror(), BinaryOp::Ge);
        assert_eq!(BinaryOp::Gt.mirror(), BinaryOp::Lt);
        assert_eq!(BinaryOp::Eq.mirror(), BinaryOp::Eq);
    }

    #[test]
    fn test_is_value() {
        assert!(Expr::literal(1).is_value());
        assert!(Expr::add(Expr::param(0), Expr::literal(1)).is_value());
        assert!(!Expr::add(Expr::field("x"), Expr::literal(1)).is_value());
    }

    #[test]
    fn test_thunk_eval() {
        let t = ValueThunk::new(|args| args.first().cloned().unwrap_or(Value::Null));
        assert_eq!(t.eval(&[Value::Int32(3)]), Value::Int32(3));
        assert_eq!(t.clone().id(), t.id());
    }

    #[test]
    fn test_all() {
        assert!(Expr::all(Vec::new()).is_none());
        let e = Expr::all(vec![
            Expr::eq(Expr::field("a"), Expr::literal(1)),
            Expr::eq(Expr::field("b"), Expr::literal(2)),
        ])
        .unwrap();
        assert!(matches!(e, Expr::BinaryOp { op: BinaryOp::And, .. }));
    }
}
