use crate::{Error, KeyPathSupporting, Object, Result};
use keypath_common::{Atom, Data};
use parking_lot::{Mutex, RwLock};
use std::{
    any::Any,
    fmt,
    sync::{Arc, Weak},
};

/// A value read from a member of a cooperating object.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    /// A cooperating object. Further members can be read from it.
    Object(Object),
    /// Any other shared value. It has no members.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps a shared value of a type that doesn't support key paths.
    pub fn opaque<T: Any + Send + Sync>(value: Arc<T>) -> Value {
        Value::Opaque(value)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the opaque value if it is an `Arc<T>`.
    pub fn downcast_opaque<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Opaque(value) => value.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Returns whether this value is the given object (same allocation).
    pub(crate) fn is_object(&self, object: &Object) -> bool {
        match self {
            Value::Object(this) => this.same(object),
            _ => false,
        }
    }

    /// Name of the kind of value, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i64",
            Value::Float(_) => "f64",
            Value::Str(_) => "str",
            Value::Object(object) => object.type_name(),
            Value::Opaque(_) => "opaque",
        }
    }
}

impl Data for Value {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a.same(b),
            (Value::Int(a), Value::Int(b)) => a.same(b),
            (Value::Float(a), Value::Float(b)) => a.same(b),
            (Value::Str(a), Value::Str(b)) => a.same(b),
            (Value::Object(a), Value::Object(b)) => a.same(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(v) => fmt::Debug::fmt(v, f),
            Value::Int(v) => fmt::Debug::fmt(v, f),
            Value::Float(v) => fmt::Debug::fmt(v, f),
            Value::Str(v) => fmt::Debug::fmt(v, f),
            Value::Object(v) => fmt::Debug::fmt(v, f),
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

/// Equality on contents: objects and opaque values still compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => self.same(other),
        }
    }
}

//--------------------------------------------------------------------------------------------------

/// Conversion of a member to a [`Value`].
///
/// Implemented by the types of fields exposed through `#[derive(KeyPathSupporting)]`.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value_int {
    ($($t:ty),*) => {
        $(impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        })*
    };
}

impl_to_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::None
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.as_str().into())
    }
}

impl ToValue for &'static str {
    fn to_value(&self) -> Value {
        Value::Str((*self).into())
    }
}

impl ToValue for Arc<str> {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for Atom {
    fn to_value(&self) -> Value {
        Value::Str(self.as_str().into())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: KeyPathSupporting> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl ToValue for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

/// Dangling references read as `Value::None`.
impl<T: KeyPathSupporting> ToValue for Weak<T> {
    fn to_value(&self) -> Value {
        match self.upgrade() {
            Some(object) => Value::Object(object),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for RwLock<T> {
    fn to_value(&self) -> Value {
        self.read().to_value()
    }
}

impl<T: ToValue> ToValue for Mutex<T> {
    fn to_value(&self) -> Value {
        self.lock().to_value()
    }
}

//--------------------------------------------------------------------------------------------------

/// Conversion from a resolved [`Value`].
pub trait FromValue: Sized {
    /// Name used in [`Error::UnexpectedValue`].
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;

    fn try_from_value(value: &Value) -> Result<Self> {
        Self::from_value(value).ok_or(Error::UnexpectedValue {
            expected: Self::EXPECTED,
            found: value.type_name(),
        })
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "i64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromValue for Arc<str> {
    const EXPECTED: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "str";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl FromValue for Object {
    const EXPECTED: &'static str = "object";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Member;

    #[test]
    fn strings_are_same_only_when_shared() {
        let a = String::from("text").to_value();
        let b = String::from("text").to_value();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        // contents are still equal
        assert_eq!(a, b);
    }

    #[test]
    fn locks_are_read_through() {
        let lock = RwLock::new(Some(3i32));
        assert_eq!(lock.to_value(), Value::Int(3));
        *lock.write() = None;
        assert!(lock.to_value().is_none());
    }

    #[test]
    fn conversion_failure_names_both_types() {
        let err = i64::try_from_value(&Value::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedValue {
                expected: "i64",
                found: "bool"
            }
        );
        assert_eq!(Option::<i64>::try_from_value(&Value::None), Ok(None));
    }

    #[test]
    fn opaque_values_downcast() {
        struct Plain(u32);
        let value = Value::opaque(Arc::new(Plain(7)));
        assert_eq!(value.downcast_opaque::<Plain>().map(|p| p.0), Some(7));
        assert!(value.downcast_opaque::<String>().is_none());
        assert!(value.member("anything").is_err());
    }
}
