#![cfg(feature = "derive")]

use keypath::{keypath, Error, KeyPath, KeyPathSupporting, Member, Value};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

#[derive(KeyPathSupporting)]
#[keypath(computed(total))]
struct Cart {
    items: RwLock<i64>,
    #[keypath(rename = "unit")]
    unit_price: f64,
    #[keypath(skip)]
    #[allow(dead_code)]
    cache: Mutex<Vec<u8>>,
    label: Option<String>,
}

impl Cart {
    fn total(&self) -> keypath::Result<f64> {
        Ok(*self.items.read() as f64 * self.unit_price)
    }
}

#[derive(KeyPathSupporting)]
struct Pair(Arc<Cart>, bool);

#[derive(KeyPathSupporting)]
struct Wrapper<T: KeyPathSupporting> {
    inner: Arc<T>,
}

fn cart() -> Arc<Cart> {
    Arc::new(Cart {
        items: RwLock::new(2),
        unit_price: 1.5,
        cache: Mutex::new(Vec::new()),
        label: None,
    })
}

#[test]
fn members_follow_field_attributes() {
    let cart = cart();
    assert_eq!(cart.member_names(), ["items", "unit", "label", "total"]);
    assert_eq!(cart.member("unit").unwrap(), Value::Float(1.5));
    assert!(cart.member("label").unwrap().is_none());
    assert!(matches!(cart.member("unit_price"), Err(Error::MissingMember { .. })));
    assert!(matches!(cart.member("cache"), Err(Error::MissingMember { .. })));
}

#[test]
fn computed_members_read_current_state() {
    let cart = cart();
    let total = keypath!(cart.total).unwrap();
    assert_eq!(total.resolve_as::<f64>().unwrap(), 3.0);
    *cart.items.write() = 4;
    assert_eq!(total.resolve_as::<f64>().unwrap(), 6.0);
}

#[test]
fn tuple_fields_are_numbered() {
    let pair = Arc::new(Pair(cart(), true));
    let key_path = KeyPath::of(|| pair.member("0")?.member("items")).unwrap();
    assert_eq!(key_path, KeyPath::new(&pair, "0.items").unwrap());
    assert_eq!(key_path.resolve_as::<i64>().unwrap(), 2);
    assert_eq!(pair.member("1").unwrap(), Value::Bool(true));
}

#[test]
fn generic_structs() {
    let wrapper = Arc::new(Wrapper { inner: cart() });
    let key_path = keypath!(wrapper.inner.unit).unwrap();
    assert_eq!(key_path.to_string(), "inner.unit");
    assert_eq!(
        key_path.resolve_as::<String>().unwrap_err(),
        Error::UnexpectedValue {
            expected: "str",
            found: "f64"
        }
    );
}
