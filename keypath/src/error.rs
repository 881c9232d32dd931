use keypath_common::Atom;
use thiserror::Error;

/// Errors produced while capturing or resolving key paths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The captured expression did not end with a member access on a cooperating object.
    #[error("no key has been recorded: the captured value was not produced by a member access")]
    NoAccessRecorded,
    /// `KeyPath::of` was called while another capture was running on the same thread.
    #[error("an unfinished key path capture is already running on this thread")]
    ReentrantCapture,
    /// A member was read from an object that is not the result of the previous access.
    #[error("key path is broken at `{key}`: check that every object in the member chain supports key paths")]
    BrokenChain { key: Atom },
    /// The receiver has no member with this name.
    #[error("`{type_name}` has no member named `{key}`")]
    MissingMember { type_name: &'static str, key: Atom },
    #[error("a key path must contain at least one key")]
    EmptyKeyPath,
    #[error("invalid key `{key}` in key path")]
    InvalidKey { key: String },
    /// The resolved value could not be converted to the requested type.
    #[error("expected a value of type `{expected}`, found `{found}`")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    /// Lookup failure for a member that `T` doesn't have.
    ///
    /// Hand-written `KeyPathSupporting::read_member` implementations return this for unknown keys.
    pub fn missing_member<T: ?Sized>(key: &str) -> Error {
        Error::MissingMember {
            type_name: std::any::type_name::<T>(),
            key: key.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
