//! Dynamically typed values held by model cells.
//!
//! A [`Value`] is what a field declares as its default and what widgets read
//! and write. Cells coerce incoming values toward the [`Kind`] of their
//! default with [`Value::coerce`], compare with numeric equality across
//! `bool`/`int`/`float`, and support the usual operators through
//! [`Value::binary`] and [`Value::unary`] (also exposed as `std::ops` impls
//! on `&Value` with a `Result` output).
use std::{cmp::Ordering, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CoercionError, OperationError};

/// A dynamically typed value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// The variant of a [`Value`], used as the coercion target of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "NoneType",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Map => "dict",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, Kind::List | Kind::Map)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators supported on values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        })
    }
}

/// Unary operators supported on values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    Invert,
    Abs,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Not => "not",
            UnaryOp::Invert => "~",
            UnaryOp::Abs => "abs()",
        })
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    /// Truthiness: null, `false`, zero and empty containers are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Numeric view of the value. Booleans count as integers.
    pub fn as_f64(&self) -> Option<f64> {
        self.number().map(Number::as_f64)
    }

    /// Extract a plain Rust value, if the variant matches.
    pub fn to<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }

    fn number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Convert toward `kind` the way the kind's constructor would.
    ///
    /// Strings are trimmed before numeric parsing, floats truncate toward zero
    /// when converted to integers and anything converts to a bool through its
    /// truthiness.
    pub fn coerce(&self, kind: Kind) -> Result<Value, CoercionError> {
        let fail = || CoercionError {
            from: self.kind(),
            to: kind,
        };
        match kind {
            Kind::Null => match self {
                Value::Null => Ok(Value::Null),
                _ => Err(fail()),
            },
            Kind::Bool => Ok(Value::Bool(self.is_truthy())),
            Kind::Int => match self {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Float(f) => {
                    let f = f.trunc();
                    // `as` saturates; 2^63 itself is already out of range
                    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                        Ok(Value::Int(f as i64))
                    } else {
                        Err(fail())
                    }
                }
                Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| fail()),
                _ => Err(fail()),
            },
            Kind::Float => match self {
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Int(i) => Ok(Value::Float(*i as f64)),
                Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| fail()),
                _ => Err(fail()),
            },
            Kind::Str => Ok(Value::Str(self.to_string())),
            Kind::List => match self {
                Value::List(items) => Ok(Value::List(items.clone())),
                Value::Str(s) => Ok(Value::List(
                    s.chars().map(|c| Value::Str(c.to_string())).collect(),
                )),
                Value::Map(map) => Ok(Value::List(
                    map.keys().map(|k| Value::Str(k.clone())).collect(),
                )),
                _ => Err(fail()),
            },
            Kind::Map => match self {
                Value::Map(map) => Ok(Value::Map(map.clone())),
                Value::List(items) => items
                    .iter()
                    .map(|item| match item.as_list() {
                        Some([Value::Str(key), value]) => Ok((key.clone(), value.clone())),
                        _ => Err(fail()),
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Value::Map),
                _ => Err(fail()),
            },
        }
    }

    /// Quoted rendering used inside containers and model reprs.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_string(),
        }
    }

    pub fn binary(&self, op: BinaryOp, rhs: &Value) -> Result<Value, OperationError> {
        let unsupported = || OperationError::Unsupported {
            op,
            lhs: self.kind(),
            rhs: rhs.kind(),
        };

        if let (Value::Bool(a), Value::Bool(b)) = (self, rhs) {
            match op {
                BinaryOp::BitAnd => return Ok(Value::Bool(a & b)),
                BinaryOp::BitOr => return Ok(Value::Bool(a | b)),
                BinaryOp::BitXor => return Ok(Value::Bool(a ^ b)),
                _ => {}
            }
        }

        if let (Some(a), Some(b)) = (self.number(), rhs.number()) {
            return match (a, b) {
                (Number::Int(a), Number::Int(b)) => int_op(op, a, b),
                (a, b) => float_op(op, a.as_f64(), b.as_f64()).ok_or_else(unsupported)?,
            };
        }

        match (op, self, rhs) {
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (BinaryOp::Add, Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b).cloned().collect()))
            }
            (BinaryOp::Mul, Value::Str(s), n) | (BinaryOp::Mul, n, Value::Str(s)) => {
                let count = repeat_count(n).ok_or_else(unsupported)?;
                s.len()
                    .checked_mul(count)
                    .filter(|&len| len <= isize::MAX as usize)
                    .ok_or(OperationError::Overflow { op })?;
                Ok(Value::Str(s.repeat(count)))
            }
            (BinaryOp::Mul, Value::List(items), n) | (BinaryOp::Mul, n, Value::List(items)) => {
                let count = repeat_count(n).ok_or_else(unsupported)?;
                let len = items
                    .len()
                    .checked_mul(count)
                    .filter(|&len| len <= isize::MAX as usize / size_of::<Value>())
                    .ok_or(OperationError::Overflow { op })?;
                Ok(Value::List(items.iter().cycle().take(len).cloned().collect()))
            }
            _ => Err(unsupported()),
        }
    }

    pub fn unary(&self, op: UnaryOp) -> Result<Value, OperationError> {
        let unsupported = || OperationError::UnsupportedUnary {
            op,
            kind: self.kind(),
        };
        if op == UnaryOp::Not {
            return Ok(Value::Bool(!self.is_truthy()));
        }
        match (op, self.number().ok_or_else(unsupported)?) {
            (UnaryOp::Neg, Number::Int(i)) => i.checked_neg().map(Value::Int).ok_or_else(unsupported),
            (UnaryOp::Neg, Number::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOp::Pos, Number::Int(i)) => Ok(Value::Int(i)),
            (UnaryOp::Pos, Number::Float(f)) => Ok(Value::Float(f)),
            (UnaryOp::Abs, Number::Int(i)) => i.checked_abs().map(Value::Int).ok_or_else(unsupported),
            (UnaryOp::Abs, Number::Float(f)) => Ok(Value::Float(f.abs())),
            (UnaryOp::Invert, Number::Int(i)) => Ok(Value::Int(!i)),
            _ => Err(unsupported()),
        }
    }
}

fn repeat_count(value: &Value) -> Option<usize> {
    match value {
        Value::Int(n) => Some(usize::try_from(*n).unwrap_or(0)),
        Value::Bool(b) => Some(usize::from(*b)),
        _ => None,
    }
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> Result<Value, OperationError> {
    let overflow = OperationError::Overflow { op };
    let value = match op {
        BinaryOp::Add => a.checked_add(b).ok_or(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(OperationError::DivisionByZero);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(OperationError::DivisionByZero);
            }
            let quotient = a.checked_div(b).ok_or(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                quotient - 1
            } else {
                quotient
            }
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(OperationError::DivisionByZero);
            }
            let remainder = a.checked_rem(b).ok_or(overflow)?;
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(OperationError::DivisionByZero);
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            let exponent = u32::try_from(b).map_err(|_| overflow.clone())?;
            a.checked_pow(exponent).ok_or(overflow)?
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => {
            if b < 0 {
                return Err(OperationError::Unsupported {
                    op,
                    lhs: Kind::Int,
                    rhs: Kind::Int,
                });
            }
            if a == 0 {
                0
            } else if b >= 63 {
                return Err(overflow);
            } else {
                let shifted = a << b;
                if shifted >> b != a {
                    return Err(overflow);
                }
                shifted
            }
        }
        BinaryOp::Shr => {
            if b < 0 {
                return Err(OperationError::Unsupported {
                    op,
                    lhs: Kind::Int,
                    rhs: Kind::Int,
                });
            }
            if b >= 64 {
                if a < 0 { -1 } else { 0 }
            } else {
                a >> b
            }
        }
    };
    Ok(Value::Int(value))
}

/// `None` when the operator has no float meaning (bitwise, shifts).
fn float_op(op: BinaryOp, a: f64, b: f64) -> Option<Result<Value, OperationError>> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Rem if b == 0.0 => {
            return Some(Err(OperationError::DivisionByZero));
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Rem => {
            let remainder = a % b;
            if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow if a == 0.0 && b < 0.0 => return Some(Err(OperationError::DivisionByZero)),
        BinaryOp::Pow => a.powf(b),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            return None;
        }
    };
    Some(Ok(Value::Float(value)))
}

/// Render a float the way a reader expects: integral floats keep a `.0`.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        (if f > 0.0 { "inf" } else { "-inf" }).to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// JSON has no non-finite numbers, so those floats are written as the
/// strings `"inf"`, `"-inf"` and `"nan"`. A float field coerces them back.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(f) => serializer.serialize_str(&format_float(*f)),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                let items = items.iter().map(Value::repr).collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", Value::Str(k.clone()).repr(), v.repr()))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => match (self.number(), other.number()) {
                (Some(Number::Int(a)), Some(Number::Int(b))) => a == b,
                (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
                _ => false,
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::List(a), Value::List(b)) => a.partial_cmp(b),
            (Value::Map(a), Value::Map(b)) if a == b => Some(Ordering::Equal),
            _ => match (self.number()?, other.number()?) {
                (Number::Int(a), Number::Int(b)) => a.partial_cmp(&b),
                (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
            },
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value.into())
            }
        }
    )*};
}

value_from!(Bool: bool);
value_from!(Int: i8, i16, i32, i64, u8, u16, u32);
value_from!(Float: f32, f64);
value_from!(Str: String, &str, &String, char);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map(Value::Int).unwrap_or(Value::Float(value as f64))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map(Value::Int).unwrap_or(Value::Float(value as f64))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Conversion out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

macro_rules! from_value_via_i64 {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                i64::from_value(value).and_then(|i| <$ty>::try_from(i).ok())
            }
        }
    )*};
}

from_value_via_i64!(i32, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_map()?
            .iter()
            .map(|(k, v)| Some((k.clone(), T::from_value(v)?)))
            .collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! binary_ops {
    ($($trait:ident $method:ident $op:ident),*) => {$(
        impl<R: Into<Value>> std::ops::$trait<R> for &Value {
            type Output = Result<Value, OperationError>;

            fn $method(self, rhs: R) -> Self::Output {
                self.binary(BinaryOp::$op, &rhs.into())
            }
        }
    )*};
}

binary_ops!(
    Add add Add,
    Sub sub Sub,
    Mul mul Mul,
    Div div Div,
    Rem rem Rem,
    BitAnd bitand BitAnd,
    BitOr bitor BitOr,
    BitXor bitxor BitXor,
    Shl shl Shl,
    Shr shr Shr
);

impl std::ops::Neg for &Value {
    type Output = Result<Value, OperationError>;

    fn neg(self) -> Self::Output {
        self.unary(UnaryOp::Neg)
    }
}

impl std::ops::Not for &Value {
    type Output = bool;

    fn not(self) -> bool {
        !self.is_truthy()
    }
}

macro_rules! scalar_cmp {
    ($($ty:ty),*) => {$(
        impl PartialEq<$ty> for Value {
            fn eq(&self, other: &$ty) -> bool {
                *self == Value::from(other.clone())
            }
        }

        impl PartialOrd<$ty> for Value {
            fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                self.partial_cmp(&Value::from(other.clone()))
            }
        }
    )*};
}

scalar_cmp!(bool, i32, i64, f64, String, &str);
