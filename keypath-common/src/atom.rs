use crate::Data;
use std::{fmt, ops::Deref};
use string_cache::DefaultAtom;

/// Interned strings. Used for member names in key paths.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Atom(DefaultAtom);

impl Atom {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Atom {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Data for Atom {
    fn same(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> From<T> for Atom
where
    DefaultAtom: From<T>,
{
    fn from(value: T) -> Self {
        Atom(DefaultAtom::from(value))
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl<'a> PartialEq<&'a str> for Atom {
    fn eq(&self, other: &&'a str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Atom;

    #[test]
    fn atoms_compare_with_strings() {
        let atom = Atom::from("value");
        assert_eq!(atom, "value");
        assert_eq!(atom, Atom::from(String::from("value")));
        assert_eq!(format!("{atom:?}"), "\"value\"");
        assert_eq!(atom.to_string(), "value");
    }
}
