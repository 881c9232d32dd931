//! Basic types shared by keypath crates.

mod atom;
mod data;

pub use crate::{atom::Atom, data::Data};
