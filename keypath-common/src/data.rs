// Copyright 2019 The Druid Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Identity comparison for values flowing through key paths.

use std::sync::Arc;

/// Values that can be compared by identity.
///
/// `same` answers "is this the very same value", not "is this an equal value": shared
/// pointers compare by address, plain scalars compare by value.
pub trait Data: Clone + 'static {
    fn same(&self, other: &Self) -> bool;
}

/// An impl of `Data` suitable for simple types.
///
/// The `same` method is implemented with equality, so the type should
/// implement `Eq` at least.
macro_rules! impl_data_simple {
    ($t:ty) => {
        impl Data for $t {
            fn same(&self, other: &Self) -> bool {
                self == other
            }
        }
    };
}

impl_data_simple!(i64);
impl_data_simple!(bool);

// NaN is the same as itself, 0.0 is not the same as -0.0.
impl Data for f64 {
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

// `Arc::ptr_eq` ignores fat pointer metadata, so two `Arc<dyn Trait>` created through
// different coercions of the same allocation are still the same.
impl<T: ?Sized + 'static> Data for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::Data;
    use std::sync::Arc;

    #[test]
    fn scalars_compare_by_value() {
        assert!(42i64.same(&42));
        assert!(!42i64.same(&43));
        assert!(true.same(&true));
        assert!(!true.same(&false));
    }

    #[test]
    fn unsized_arcs_compare_by_address() {
        let a: Arc<str> = Arc::from("value");
        let b: Arc<str> = Arc::from("value");
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));

        let any: Arc<dyn std::any::Any> = Arc::new(0u8);
        assert!(any.same(&any.clone()));
    }

    #[test]
    fn arcs_compare_by_address() {
        let a = Arc::new(String::from("value"));
        let b = Arc::new(String::from("value"));
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
    }

    #[test]
    fn floats_compare_by_bits() {
        assert!(f64::NAN.same(&f64::NAN));
        assert!(!0.0f64.same(&-0.0f64));
    }
}
