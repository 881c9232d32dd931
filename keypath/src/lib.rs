//! Key paths captured from member access chains.
//!
//! A [`KeyPath`] records how a value is reached from a target object (`a.b.c` is the target
//! `a` with the keys `b` and `c`) and can read the current value again later.
//! Key paths are captured by evaluating the member chain once while a per-thread recorder
//! observes the reads performed on objects that implement [`KeyPathSupporting`].
//!
//! # Features
//! * `derive` (default): re-exports `#[derive(KeyPathSupporting)]`
extern crate self as keypath;

mod error;
mod key_path;
mod object;
mod recorder;
mod value;

pub use error::{Error, Result};
pub use key_path::{IntoKeys, KeyPath};
pub use object::{IntoObject, KeyPathSupporting, Member, Object};
pub use recorder::is_capturing;
pub use value::{FromValue, ToValue, Value};

// keypath-common reexports
pub use keypath_common::{Atom, Data};

// macro reexports
#[cfg(feature = "derive")]
pub use keypath_macros::KeyPathSupporting;

/// Captures the key path of a member chain.
///
/// `keypath!(a.b.c)` is `KeyPath::of(|| a.member("b")?.member("c"))`. Use parentheses for a
/// root that is not a plain identifier: `keypath!((self.model).b.c)`.
///
/// # Example
///
/// ```
/// use keypath::{keypath, KeyPath, KeyPathSupporting};
/// use std::sync::Arc;
///
/// #[derive(KeyPathSupporting)]
/// struct Settings {
///     volume: i64,
/// }
///
/// let settings = Arc::new(Settings { volume: 3 });
/// let key_path = keypath!(settings.volume).unwrap();
/// assert_eq!(key_path.to_string(), "volume");
/// assert_eq!(key_path.resolve_as::<i64>().unwrap(), 3);
/// ```
#[macro_export]
macro_rules! keypath {
    (($root:expr) $(. $key:ident)+) => {
        $crate::KeyPath::of(|| {
            let value = $crate::Value::Object($crate::IntoObject::into_object(&$root));
            $(let value = $crate::Member::member(&value, ::std::stringify!($key))?;)+
            ::std::result::Result::Ok::<$crate::Value, $crate::Error>(value)
        })
    };
    ($root:ident $(. $key:ident)+) => {
        $crate::keypath!(($root) $(. $key)+)
    };
}
