//! Column expressions used by [`crate::processing::filter_expr`] and [`crate::processing::mutate`].
//!
//! An [`Expr`] is a small serializable tree. It is type-checked against a [`Schema`] with
//! [`Expr::output_type`] before anything runs, so an unknown column or an operation on
//! incompatible types fails with a [`ProcessingError`] instead of an engine error midway through
//! a plan. The verbs then lower it to a Polars expression and run it lazily.
//!
//! Missing values propagate: arithmetic, comparisons and functions over a missing operand are
//! missing. `and` / `or` use three-valued (Kleene) logic.
//!
//! ```rust
//! use tidy_table::expr::{col, lit};
//! use tidy_table::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("adult_body_mass", DataType::Float64),
//!     Field::new("adult_head_body_len", DataType::Float64),
//! ]);
//! let ds = DataSet::new(schema, vec![vec![Value::Float64(500.0), Value::Float64(250.0)]]);
//!
//! let ratio = col("adult_body_mass") / col("adult_head_body_len");
//! assert_eq!(ratio.output_type(&ds.schema)?, DataType::Float64);
//!
//! let out = ds.mutate(&[ratio.alias("ratio")])?;
//! assert_eq!(out.rows[0][2], Value::Float64(2.0));
//! # Ok::<(), tidy_table::ProcessingError>(())
//! ```

use std::fmt;
use std::ops;

use polars::prelude as pl;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{DataType, Schema, Value};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    IsNull,
    IsNotNull,
}

/// Numeric functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Log10,
    Ln,
    Sqrt,
    Abs,
}

impl Function {
    fn name(self) -> &'static str {
        match self {
            Function::Log10 => "log10",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
        }
    }
}

/// A row expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Reference to a column by name.
    Column(String),
    /// A constant.
    Literal(Value),
    /// `left op right`.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `op expr`.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// `func(arg)`.
    Call { func: Function, arg: Box<Expr> },
}

/// Column reference.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// Literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// An expression bound to an output column name (`name = expr` in a mutate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedExpr {
    pub name: String,
    pub expr: Expr,
}

impl NamedExpr {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

impl Expr {
    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into()),
        }
    }

    fn unary(self, op: UnaryOp) -> Expr {
        Expr::Unary {
            op,
            expr: Box::new(self),
        }
    }

    fn call(self, func: Function) -> Expr {
        Expr::Call {
            func,
            arg: Box::new(self),
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn not_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotEq, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn lt_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LtEq, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn gt_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GtEq, rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn is_null(self) -> Expr {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Expr {
        self.unary(UnaryOp::IsNotNull)
    }

    pub fn log10(self) -> Expr {
        self.call(Function::Log10)
    }

    pub fn ln(self) -> Expr {
        self.call(Function::Ln)
    }

    pub fn sqrt(self) -> Expr {
        self.call(Function::Sqrt)
    }

    pub fn abs(self) -> Expr {
        self.call(Function::Abs)
    }

    /// Name the result of this expression.
    pub fn alias(self, name: impl Into<String>) -> NamedExpr {
        NamedExpr::new(name, self)
    }

    /// The type this expression produces over rows of `schema`.
    ///
    /// An expression that can only ever produce a missing value (e.g. `lit(Value::Null)`)
    /// reports [`DataType::Float64`].
    pub fn output_type(&self, schema: &Schema) -> ProcessingResult<DataType> {
        Ok(self.infer(schema)?.unwrap_or(DataType::Float64))
    }

    /// `None` means "untyped missing", which unifies with anything.
    fn infer(&self, schema: &Schema) -> ProcessingResult<Option<DataType>> {
        match self {
            Expr::Column(name) => {
                let idx = schema.require_index(name)?;
                Ok(Some(schema.fields[idx].data_type))
            }
            Expr::Literal(v) => Ok(v.data_type()),
            Expr::Binary { op, left, right } => {
                let l = left.infer(schema)?;
                let r = right.infer(schema)?;
                infer_binary(*op, l, r).map_err(|message| ProcessingError::TypeMismatch {
                    message: format!("{message} in `{self}`"),
                })
            }
            Expr::Unary { op, expr } => {
                let t = expr.infer(schema)?;
                match (op, t) {
                    (UnaryOp::IsNull | UnaryOp::IsNotNull, _) => Ok(Some(DataType::Bool)),
                    (UnaryOp::Neg, None) => Ok(None),
                    (UnaryOp::Neg, Some(t)) if t.is_numeric() => Ok(Some(t)),
                    (UnaryOp::Not, None | Some(DataType::Bool)) => Ok(Some(DataType::Bool)),
                    (_, Some(t)) => Err(ProcessingError::TypeMismatch {
                        message: format!("cannot apply {op:?} to {t} in `{self}`"),
                    }),
                }
            }
            Expr::Call { func, arg } => match arg.infer(schema)? {
                None => Ok(None),
                Some(DataType::Int64) if *func == Function::Abs => Ok(Some(DataType::Int64)),
                Some(t) if t.is_numeric() => Ok(Some(DataType::Float64)),
                Some(t) => Err(ProcessingError::TypeMismatch {
                    message: format!("{}() expects a number, got {t} in `{self}`", func.name()),
                }),
            },
        }
    }

    /// Lower to a Polars expression. Call [`Expr::output_type`] first; this does no checking.
    pub(crate) fn to_polars(&self) -> pl::Expr {
        match self {
            Expr::Column(name) => pl::col(name.as_str()),
            Expr::Literal(value) => literal(value),
            Expr::Binary { op, left, right } => {
                let (l, r) = (left.to_polars(), right.to_polars());
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l.cast(pl::DataType::Float64) / r.cast(pl::DataType::Float64),
                    BinaryOp::Eq => l.eq(r),
                    BinaryOp::NotEq => l.neq(r),
                    BinaryOp::Lt => l.lt(r),
                    BinaryOp::LtEq => l.lt_eq(r),
                    BinaryOp::Gt => l.gt(r),
                    BinaryOp::GtEq => l.gt_eq(r),
                    BinaryOp::And => l.and(r),
                    BinaryOp::Or => l.or(r),
                }
            }
            Expr::Unary { op, expr } => {
                let e = expr.to_polars();
                match op {
                    // `0 - x` keeps integers integral and turns `-0.0` into `0.0`.
                    UnaryOp::Neg => pl::lit(0) - e,
                    UnaryOp::Not => e.not(),
                    UnaryOp::IsNull => e.is_null(),
                    UnaryOp::IsNotNull => e.is_not_null(),
                }
            }
            Expr::Call { func, arg } => {
                let e = arg.to_polars();
                match func {
                    Function::Log10 => e.cast(pl::DataType::Float64).log(pl::lit(10.0)),
                    Function::Ln => e.cast(pl::DataType::Float64).log(pl::lit(std::f64::consts::E)),
                    Function::Sqrt => e.cast(pl::DataType::Float64).sqrt(),
                    Function::Abs => e.abs(),
                }
            }
        }
    }
}

fn literal(value: &Value) -> pl::Expr {
    match value {
        Value::Null => pl::lit(pl::NULL),
        Value::Int64(v) => pl::lit(*v),
        Value::Float64(v) => pl::lit(*v),
        Value::Bool(v) => pl::lit(*v),
        Value::Utf8(v) => pl::lit(v.clone()),
    }
}

fn infer_binary(op: BinaryOp, l: Option<DataType>, r: Option<DataType>) -> Result<Option<DataType>, String> {
    if op.is_logical() {
        return match (l, r) {
            (None | Some(DataType::Bool), None | Some(DataType::Bool)) => Ok(Some(DataType::Bool)),
            (l, r) => Err(format!("`{}` expects booleans, got {l:?} and {r:?}", op.symbol())),
        };
    }

    if op.is_arithmetic() {
        for t in [l, r].into_iter().flatten() {
            if !t.is_numeric() {
                return Err(format!("`{}` expects numbers, got {t}", op.symbol()));
            }
        }
        return Ok(match (op, l, r) {
            (BinaryOp::Div, _, _) => Some(DataType::Float64),
            (_, None, None) => None,
            (_, Some(DataType::Float64), _) | (_, _, Some(DataType::Float64)) => Some(DataType::Float64),
            _ => Some(DataType::Int64),
        });
    }

    match (l, r) {
        (None, _) | (_, None) => Ok(Some(DataType::Bool)),
        (Some(a), Some(b)) if a == b || (a.is_numeric() && b.is_numeric()) => Ok(Some(DataType::Bool)),
        (Some(a), Some(b)) => Err(format!("cannot compare {a} with {b} using `{}`", op.symbol())),
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Literal(Value::Float64(v))
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Literal(Value::Int64(v))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Literal(Value::Bool(v))
    }
}

macro_rules! impl_arith_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> ops::$trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                self.binary($op, rhs)
            }
        }
    };
}

impl_arith_op!(Add, add, BinaryOp::Add);
impl_arith_op!(Sub, sub, BinaryOp::Sub);
impl_arith_op!(Mul, mul, BinaryOp::Mul);
impl_arith_op!(Div, div, BinaryOp::Div);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(Value::Null) => f.write_str("NA"),
            Expr::Literal(Value::Utf8(s)) => write!(f, "{s:?}"),
            Expr::Literal(Value::Int64(v)) => write!(f, "{v}"),
            Expr::Literal(Value::Float64(v)) => write!(f, "{v}"),
            Expr::Literal(Value::Bool(v)) => f.write_str(if *v { "TRUE" } else { "FALSE" }),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Unary { op, expr } => match op {
                UnaryOp::Neg => write!(f, "-{expr}"),
                UnaryOp::Not => write!(f, "!{expr}"),
                UnaryOp::IsNull => write!(f, "is.na({expr})"),
                UnaryOp::IsNotNull => write!(f, "!is.na({expr})"),
            },
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.name()),
        }
    }
}
