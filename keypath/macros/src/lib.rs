//! Implementation of `#[derive(KeyPathSupporting)]`.
extern crate proc_macro;
use proc_macro2::Span;
use quote::{ToTokens, TokenStreamExt};

mod key_path_supporting;

//--------------------------------------------------------------------------------------------------
struct CrateName;
const CRATE: CrateName = CrateName;

impl ToTokens for CrateName {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        tokens.append(syn::Ident::new("keypath", Span::call_site()))
    }
}

//--------------------------------------------------------------------------------------------------

/// Derives `KeyPathSupporting` for a struct: every field is a member named after the field
/// (tuple fields are named `0`, `1`, ...).
///
/// Field attributes:
/// * `#[keypath(skip)]`: not a member.
/// * `#[keypath(rename = "name")]`: member name.
/// * `#[keypath(opaque)]`: the field is an `Arc<T>` of a type that doesn't support key paths;
///   it is read as `Value::Opaque`.
///
/// Type parameters are bounded by `Send + Sync + 'static` in the generated impl.
///
/// Struct attribute:
/// * `#[keypath(computed(name, ...))]`: computed members, read by calling
///   `fn name(&self) -> keypath::Result<impl ToValue>`.
///
/// # Examples
///```ignore
/// #[derive(KeyPathSupporting)]
/// #[keypath(computed(total))]
/// struct Cart {
///     items: RwLock<i64>,
///     #[keypath(rename = "unit")]
///     unit_price: f64,
///     #[keypath(skip)]
///     cache: Mutex<Vec<u8>>,
/// }
///```
#[proc_macro_derive(KeyPathSupporting, attributes(keypath))]
pub fn derive_key_path_supporting(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    key_path_supporting::derive_key_path_supporting_impl(input)
}
