//! Structural binder: converts typed values to [`Value`] trees and back.
//!
//! The binder is format-agnostic. A codec supplies two things through the
//! conversion contexts: the [`DateStyle`] it writes dates in, and the
//! [`CyclePolicy`] it applies when a shared node is reached twice.
//!
//! Records describe themselves with a table of [`Field`] descriptors, usually
//! generated by the [`record!`](crate::record) macro:
//!
//! ```
//! use twinform_core::{indented, record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! record!(Address { street as "Street", city as "City" });
//!
//! let home = Address { street: "123 Main St".into(), city: "New York".into() };
//! let text = indented::to_string(&home).unwrap();
//! assert_eq!(text, "Street: 123 Main St\nCity: New York");
//! assert_eq!(indented::from_str::<Address>(&text).unwrap(), home);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::dates::DateStyle;
use crate::error::{Error, Result};
use crate::value::{format_number, parse_number, Value};

/// What to do when serialization reaches a shared node a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Every shared node is rendered once per call; later visits become `Null`.
    Suppress,
    /// Re-entering a node that is still being converted fails with
    /// [`Error::CyclicGraph`]. Shared but acyclic nodes are rendered in full.
    Reject,
}

/// State for one `to_value` walk. Create one per top-level serialize call.
#[derive(Debug)]
pub struct ToValueContext {
    dates: DateStyle,
    policy: CyclePolicy,
    /// Node identities: every node entered (`Suppress`) or the active chain (`Reject`).
    visited: HashSet<usize>,
    suppressed: usize,
}

impl ToValueContext {
    pub fn new(dates: DateStyle, policy: CyclePolicy) -> Self {
        Self {
            dates,
            policy,
            visited: HashSet::new(),
            suppressed: 0,
        }
    }

    pub fn dates(&self) -> DateStyle {
        self.dates
    }

    /// Number of back-references replaced by `Null` so far.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Convert a shared node identified by `id`, applying the cycle policy.
    pub fn enter_shared(
        &mut self,
        id: usize,
        convert: impl FnOnce(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        match self.policy {
            CyclePolicy::Suppress => {
                if !self.visited.insert(id) {
                    self.suppressed += 1;
                    tracing::trace!(node = id, "suppressing repeated reference");
                    return Ok(Value::Null);
                }
                convert(self)
            }
            CyclePolicy::Reject => {
                if !self.visited.insert(id) {
                    return Err(Error::CyclicGraph);
                }
                let result = convert(self);
                self.visited.remove(&id);
                result
            }
        }
    }
}

/// State for one `from_value` walk.
#[derive(Debug, Clone, Copy)]
pub struct FromValueContext {
    dates: DateStyle,
}

impl FromValueContext {
    pub fn new(dates: DateStyle) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> DateStyle {
        self.dates
    }
}

/// Types that can be turned into a [`Value`].
pub trait ToValue {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value>;
}

/// Types that can be rebuilt from a [`Value`].
///
/// `Default` doubles as the "default-constructible" requirement: `Null` binds
/// to the default value, and records start from it before fields are set.
pub trait FromValue: Sized + Default {
    /// Bind a non-null value.
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self>;

    fn from_value(value: &Value, cx: &FromValueContext) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            other => Self::from_present(other, cx),
        }
    }
}

/// Convert `value` into a tree using a fresh context.
pub fn to_value<T: ToValue + ?Sized>(
    value: &T,
    dates: DateStyle,
    policy: CyclePolicy,
) -> Result<Value> {
    let mut cx = ToValueContext::new(dates, policy);
    let tree = value.to_value(&mut cx)?;
    if cx.suppressed() > 0 {
        tracing::debug!(suppressed = cx.suppressed(), "broke reference cycles");
    }
    Ok(tree)
}

/// Bind `value` onto `T`.
pub fn from_value<T: FromValue>(value: &Value, dates: DateStyle) -> Result<T> {
    T::from_value(value, &FromValueContext::new(dates))
}

/// Describe a value for an error message, including short scalar content.
fn describe(value: &Value) -> String {
    match value {
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {}", format_number(*n)),
        Value::Str(s) => format!("string {s:?}"),
        other => other.kind().to_string(),
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::unsupported(expected, describe(found))
}

// ----------------------------------------------------------------------------
// Records
// ----------------------------------------------------------------------------

/// One entry of a record's field table.
pub struct Field<R> {
    pub name: &'static str,
    pub get: fn(&R, &mut ToValueContext) -> Result<Value>,
    pub set: fn(&mut R, &Value, &FromValueContext) -> Result<()>,
}

/// A type with named fields, described by a static descriptor table.
pub trait Record: Default + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Emit a `Map` of every field in table order.
pub fn record_to_value<R: Record>(record: &R, cx: &mut ToValueContext) -> Result<Value> {
    let mut entries = Vec::with_capacity(R::FIELDS.len());
    for field in R::FIELDS {
        entries.push((field.name.to_string(), (field.get)(record, cx)?));
    }
    Ok(Value::Map(entries))
}

/// Build a record from a `Map`. Absent fields keep their defaults and
/// unknown names are ignored.
pub fn record_from_value<R: Record>(value: &Value, cx: &FromValueContext) -> Result<R> {
    if !matches!(value, Value::Map(_)) {
        return Err(mismatch("record", value));
    }
    let mut record = R::default();
    for field in R::FIELDS {
        if let Some(entry) = value.get(field.name) {
            (field.set)(&mut record, entry, cx)?;
        }
    }
    Ok(record)
}

/// Generate the [`Record`], [`ToValue`] and [`FromValue`] impls for a struct.
///
/// Each listed field is bound under its own name, or under the literal given
/// with `as`. Field types must themselves implement `ToValue` and `FromValue`.
///
/// ```
/// use twinform_core::record;
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// record!(Person { name as "Name", age });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(as $name:literal)?),* $(,)? }) => {
        impl $crate::binder::Record for $ty {
            const FIELDS: &'static [$crate::binder::Field<Self>] = &[
                $(
                    $crate::binder::Field {
                        name: $crate::record!(@name $field $($name)?),
                        get: |record: &$ty,
                              cx: &mut $crate::binder::ToValueContext|
                              -> $crate::error::Result<$crate::Value> {
                            $crate::binder::ToValue::to_value(&record.$field, cx)
                        },
                        set: |record: &mut $ty,
                              value: &$crate::Value,
                              cx: &$crate::binder::FromValueContext|
                              -> $crate::error::Result<()> {
                            record.$field = $crate::binder::FromValue::from_value(value, cx)?;
                            ::core::result::Result::Ok(())
                        },
                    },
                )*
            ];
        }

        impl $crate::binder::ToValue for $ty {
            fn to_value(
                &self,
                cx: &mut $crate::binder::ToValueContext,
            ) -> $crate::error::Result<$crate::Value> {
                $crate::binder::record_to_value(self, cx)
            }
        }

        impl $crate::binder::FromValue for $ty {
            fn from_present(
                value: &$crate::Value,
                cx: &$crate::binder::FromValueContext,
            ) -> $crate::error::Result<Self> {
                $crate::binder::record_from_value(value, cx)
            }
        }
    };
    (@name $field:ident) => {
        stringify!($field)
    };
    (@name $field:ident $name:literal) => {
        $name
    };
}

// ----------------------------------------------------------------------------
// Scalars
// ----------------------------------------------------------------------------

impl ToValue for Value {
    fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
        Ok(value.clone())
    }
}

impl ToValue for str {
    fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(self.clone()))
    }
}

impl FromValue for String {
    /// Scalars bind by their textual form; collections do not.
    fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            Value::Number(n) => Ok(format_number(*n)),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl ToValue for char {
    fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(self.to_string()))
    }
}

impl FromValue for char {
    fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
        if let Value::Str(s) = value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(mismatch("char", value))
    }
}

impl ToValue for bool {
    fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Str(s) if s.trim() == "true" => Ok(true),
            Value::Str(s) if s.trim() == "false" => Ok(false),
            other => Err(mismatch("bool", other)),
        }
    }
}

macro_rules! impl_integer {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
                Ok(Value::Number(*self as f64))
            }
        }

        impl FromValue for $t {
            fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
                match value {
                    // MAX as f64 rounds up to a power of two for 64-bit types,
                    // so the upper bound is exclusive: MAX + 1 is exact.
                    Value::Number(n)
                        if n.fract() == 0.0
                            && *n >= <$t>::MIN as f64
                            && *n < <$t>::MAX as f64 + 1.0 =>
                    {
                        Ok(*n as $t)
                    }
                    Value::Str(s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| mismatch(stringify!($t), value)),
                    other => Err(mismatch(stringify!($t), other)),
                }
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        impl ToValue for $t {
            fn to_value(&self, _cx: &mut ToValueContext) -> Result<Value> {
                Ok(Value::Number(*self as f64))
            }
        }

        impl FromValue for $t {
            fn from_present(value: &Value, _cx: &FromValueContext) -> Result<Self> {
                match value {
                    Value::Number(n) => Ok(*n as $t),
                    Value::Str(s) => parse_number(s.trim())
                        .map(|n| n as $t)
                        .ok_or_else(|| mismatch(stringify!($t), value)),
                    other => Err(mismatch(stringify!($t), other)),
                }
            }
        }
    )*};
}

impl_float!(f32, f64);

// ----------------------------------------------------------------------------
// Dates
// ----------------------------------------------------------------------------

impl ToValue for NaiveDateTime {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(cx.dates().format_naive(self)))
    }
}

impl FromValue for NaiveDateTime {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        value
            .as_str()
            .and_then(|s| cx.dates().parse_naive(s))
            .ok_or_else(|| mismatch("date/time", value))
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(cx.dates().format_utc(self)))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        value
            .as_str()
            .and_then(|s| cx.dates().parse_utc(s))
            .ok_or_else(|| mismatch("UTC date/time", value))
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        Ok(Value::Str(cx.dates().format_date(self)))
    }
}

impl FromValue for NaiveDate {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        value
            .as_str()
            .and_then(|s| cx.dates().parse_date(s))
            .ok_or_else(|| mismatch("date", value))
    }
}

// ----------------------------------------------------------------------------
// Collections
// ----------------------------------------------------------------------------

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        self.iter()
            .map(|item| item.to_value(cx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Seq)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        self.as_slice().to_value(cx)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        match value {
            Value::Seq(items) => items.iter().map(|item| T::from_value(item, cx)).collect(),
            other => Err(mismatch("sequence", other)),
        }
    }
}

impl<T: ToValue> ToValue for VecDeque<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        self.iter()
            .map(|item| item.to_value(cx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Seq)
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        Vec::<T>::from_present(value, cx).map(VecDeque::from)
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        let mut entries = Vec::with_capacity(self.len());
        for (key, item) in self {
            entries.push((key.clone(), item.to_value(cx)?));
        }
        Ok(Value::Map(entries))
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), T::from_value(item, cx)?)))
                .collect(),
            other => Err(mismatch("mapping", other)),
        }
    }
}

// ----------------------------------------------------------------------------
// Wrappers
// ----------------------------------------------------------------------------

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        match self {
            Some(inner) => inner.to_value(cx),
            None => Ok(Value::Null),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        T::from_present(value, cx).map(Some)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        (**self).to_value(cx)
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        (**self).to_value(cx)
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        T::from_present(value, cx).map(Box::new)
    }
}

/// Shared nodes carry an identity: the address of the `Rc` allocation.
impl<T: ToValue> ToValue for Rc<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        let id = Rc::as_ptr(self) as *const () as usize;
        cx.enter_shared(id, |cx| (**self).to_value(cx))
    }
}

impl<T: FromValue> FromValue for Rc<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        T::from_present(value, cx).map(Rc::new)
    }
}

impl<T: ToValue> ToValue for RefCell<T> {
    fn to_value(&self, cx: &mut ToValueContext) -> Result<Value> {
        let inner = self
            .try_borrow()
            .map_err(|_| Error::unsupported("readable cell", "mutably borrowed cell"))?;
        inner.to_value(cx)
    }
}

impl<T: FromValue> FromValue for RefCell<T> {
    fn from_present(value: &Value, cx: &FromValueContext) -> Result<Self> {
        T::from_present(value, cx).map(RefCell::new)
    }
}
