//! Cooperating objects and the member-access hook.
use crate::{recorder, Result, Value};
use std::{fmt, sync::Arc};

/// Objects whose member reads can be observed by a key path capture.
///
/// Usually derived with `#[derive(KeyPathSupporting)]`. Implementations must not record
/// anything themselves: `read_member` is the *real* read, the recorder wraps it.
///
/// Computed members can read further members through [`Member::member`]; those reads are
/// not recorded when they happen while the computed member itself is being recorded.
pub trait KeyPathSupporting: Send + Sync + 'static {
    /// Reads the member named `key`.
    ///
    /// Returns [`Error::MissingMember`](crate::Error::MissingMember) if there is no such member.
    fn read_member(&self, key: &str) -> Result<Value>;

    /// Names of the members that `read_member` knows about.
    fn member_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared reference to a cooperating object.
pub type Object = Arc<dyn KeyPathSupporting>;

impl fmt::Debug for dyn KeyPathSupporting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{:p}", self.type_name(), self as *const dyn KeyPathSupporting as *const ())
    }
}

/// Conversion into an [`Object`].
pub trait IntoObject {
    fn into_object(self) -> Object;
}

impl<T: KeyPathSupporting> IntoObject for Arc<T> {
    fn into_object(self) -> Object {
        self
    }
}

impl<T: KeyPathSupporting> IntoObject for &Arc<T> {
    fn into_object(self) -> Object {
        self.clone()
    }
}

impl IntoObject for Object {
    fn into_object(self) -> Object {
        self
    }
}

impl IntoObject for &Object {
    fn into_object(self) -> Object {
        self.clone()
    }
}

/// Member access that goes through the key path recorder of the current thread.
///
/// Outside of a capture this is a plain read.
pub trait Member {
    fn member(&self, key: &str) -> Result<Value>;
}

impl<T: KeyPathSupporting> Member for Arc<T> {
    fn member(&self, key: &str) -> Result<Value> {
        let receiver: Object = self.clone();
        recorder::read(&receiver, key)
    }
}

impl Member for Object {
    fn member(&self, key: &str) -> Result<Value> {
        recorder::read(self, key)
    }
}

impl Member for Value {
    fn member(&self, key: &str) -> Result<Value> {
        match self {
            Value::Object(object) => recorder::read(object, key),
            other => Err(crate::Error::MissingMember {
                type_name: other.type_name(),
                key: key.into(),
            }),
        }
    }
}
