use crate::{recorder, Error, FromValue, IntoObject, Object, Result, Value};
use keypath_common::{Atom, Data};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Path of member accesses from a target object to a value, such as `a.b.c`.
///
/// A key path doesn't own its target: it holds a shared reference and reads from it again
/// on every `resolve`. Key paths are immutable.
#[derive(Clone)]
pub struct KeyPath {
    target: Object,
    keys: Arc<[Atom]>,
}

impl KeyPath {
    /// Captures the key path of the member chain evaluated by `expr`.
    ///
    /// `expr` must read members through [`Member::member`](crate::Member::member), starting
    /// from the target object. The [`keypath!`](crate::keypath) macro writes it for you.
    ///
    /// # Example
    ///
    /// ```
    /// use keypath::{KeyPath, KeyPathSupporting, Member};
    /// use std::sync::Arc;
    ///
    /// #[derive(KeyPathSupporting)]
    /// struct A {
    ///     b: Arc<B>,
    /// }
    ///
    /// #[derive(KeyPathSupporting)]
    /// struct B {
    ///     c: i64,
    /// }
    ///
    /// let a = Arc::new(A { b: Arc::new(B { c: 0 }) });
    /// let key_path = KeyPath::of(|| a.member("b")?.member("c")).unwrap();
    /// assert_eq!(key_path, KeyPath::new(&a, ["b", "c"]).unwrap());
    /// ```
    pub fn of(expr: impl FnOnce() -> Result<Value>) -> Result<KeyPath> {
        recorder::capture(expr)
    }

    /// Creates a key path from a target and a sequence of keys.
    ///
    /// `keys` is either a sequence of member names or a single dotted string (`"b.c"`).
    pub fn new(target: impl IntoObject, keys: impl IntoKeys) -> Result<KeyPath> {
        let keys = keys.into_keys();
        if keys.is_empty() {
            return Err(Error::EmptyKeyPath);
        }
        if let Some(key) = keys.iter().find(|key| key.is_empty()) {
            return Err(Error::InvalidKey { key: key.to_string() });
        }
        Ok(KeyPath {
            target: target.into_object(),
            keys: keys.into(),
        })
    }

    pub(crate) fn from_recorded(target: Object, keys: Arc<[Atom]>) -> KeyPath {
        debug_assert!(!keys.is_empty());
        KeyPath { target, keys }
    }

    pub fn target(&self) -> &Object {
        &self.target
    }

    pub fn keys(&self) -> &[Atom] {
        &self.keys
    }

    /// Number of keys. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Last key of the path.
    pub fn leaf(&self) -> &Atom {
        // keys are never empty
        &self.keys[self.keys.len() - 1]
    }

    /// Reads the current value at the end of the path.
    ///
    /// This is a plain traversal, nothing is recorded. Fails with the lookup error if a
    /// member along the path doesn't exist anymore.
    pub fn resolve(&self) -> Result<Value> {
        // computed members along the path must not leak reads into an open capture
        recorder::suppressed(|| {
            let mut value = Value::Object(self.target.clone());
            for key in self.keys.iter() {
                value = match value {
                    Value::Object(object) => object.read_member(key)?,
                    other => {
                        return Err(Error::MissingMember {
                            type_name: other.type_name(),
                            key: key.clone(),
                        })
                    }
                };
            }
            Ok(value)
        })
    }

    /// Reads the current value at the end of the path and converts it to `T`.
    pub fn resolve_as<T: FromValue>(&self) -> Result<T> {
        T::try_from_value(&self.resolve()?)
    }
}

impl PartialEq for KeyPath {
    fn eq(&self, other: &Self) -> bool {
        self.target.same(&other.target) && self.keys == other.keys
    }
}

impl Eq for KeyPath {}

impl Hash for KeyPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // identity of the target, consistent with `eq`
        (Arc::as_ptr(&self.target) as *const ()).hash(state);
        self.keys.hash(state);
    }
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyPath(target={:?}, keys=(", self.target)?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key:?}")?;
        }
        if self.keys.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str("))")
    }
}

/// Dotted keys, e.g. `b.c`.
impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(key)?;
        }
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------

/// Sequence of keys accepted by [`KeyPath::new`].
pub trait IntoKeys {
    fn into_keys(self) -> Vec<Atom>;
}

/// Splits on `.`.
impl IntoKeys for &str {
    fn into_keys(self) -> Vec<Atom> {
        self.split('.').map(Atom::from).collect()
    }
}

impl IntoKeys for String {
    fn into_keys(self) -> Vec<Atom> {
        self.as_str().into_keys()
    }
}

impl<S: AsRef<str>> IntoKeys for &[S] {
    fn into_keys(self) -> Vec<Atom> {
        self.iter().map(|key| Atom::from(key.as_ref())).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoKeys for [S; N] {
    fn into_keys(self) -> Vec<Atom> {
        self.iter().map(|key| Atom::from(key.as_ref())).collect()
    }
}

impl<S: AsRef<str>> IntoKeys for Vec<S> {
    fn into_keys(self) -> Vec<Atom> {
        self.iter().map(|key| Atom::from(key.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPathSupporting, Member};
    use parking_lot::RwLock;
    use std::{collections::HashSet, sync::Arc};

    struct Node {
        name: &'static str,
        next: RwLock<Option<Arc<Node>>>,
    }

    impl KeyPathSupporting for Node {
        fn read_member(&self, key: &str) -> Result<Value> {
            match key {
                "name" => Ok(Value::Str(self.name.into())),
                "next" => match &*self.next.read() {
                    Some(next) => Ok(Value::Object(next.clone())),
                    None => Ok(Value::None),
                },
                _ => Err(Error::missing_member::<Self>(key)),
            }
        }

        fn member_names(&self) -> &'static [&'static str] {
            &["name", "next"]
        }
    }

    fn chain() -> Arc<Node> {
        let tail = Arc::new(Node {
            name: "tail",
            next: RwLock::new(None),
        });
        Arc::new(Node {
            name: "head",
            next: RwLock::new(Some(tail)),
        })
    }

    #[test]
    fn dotted_keys_are_split() {
        let head = chain();
        let dotted = KeyPath::new(&head, "next.name").unwrap();
        let listed = KeyPath::new(&head, ["next", "name"]).unwrap();
        assert_eq!(dotted, listed);
        assert_eq!(dotted.to_string(), "next.name");
        assert_eq!(dotted.leaf(), "name");
        assert_eq!(dotted.len(), 2);
    }

    #[test]
    fn empty_key_paths_are_rejected() {
        let head = chain();
        let no_keys: [&str; 0] = [];
        assert_eq!(KeyPath::new(&head, no_keys).unwrap_err(), Error::EmptyKeyPath);
        assert_eq!(
            KeyPath::new(&head, "next..name").unwrap_err(),
            Error::InvalidKey { key: String::new() }
        );
    }

    #[test]
    fn equality_is_target_identity_and_keys() {
        let a = chain();
        let b = chain();
        let kp = KeyPath::new(&a, ["next"]).unwrap();
        assert_eq!(kp, KeyPath::new(&a, vec!["next"]).unwrap());
        assert_ne!(kp, KeyPath::new(&b, ["next"]).unwrap());
        assert_ne!(kp, KeyPath::new(&a, ["name"]).unwrap());

        let set: HashSet<KeyPath> = [kp.clone(), kp.clone(), KeyPath::new(&b, ["next"]).unwrap()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn resolve_reads_live_values() {
        let head = chain();
        let kp = KeyPath::of(|| head.member("next")?.member("name")).unwrap();
        assert_eq!(kp.resolve_as::<String>().unwrap(), "tail");

        let other = Arc::new(Node {
            name: "other",
            next: RwLock::new(None),
        });
        *head.next.write() = Some(other);
        assert_eq!(kp.resolve_as::<String>().unwrap(), "other");

        *head.next.write() = None;
        assert_eq!(
            kp.resolve().unwrap_err(),
            Error::MissingMember {
                type_name: "none",
                key: "name".into()
            }
        );
    }

    #[test]
    fn debug_output_lists_target_and_keys() {
        let head = chain();
        let kp = KeyPath::new(&head, ["next"]).unwrap();
        let repr = format!("{kp:?}");
        assert!(repr.starts_with("KeyPath(target="));
        assert!(repr.contains("Node@"));
        assert!(repr.ends_with("keys=(\"next\",))"));
    }
}
