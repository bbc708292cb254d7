use proc_macro::TokenStream;
use syn::{ItemFn, parse_macro_input};

mod callback;

/// Register a function as a named event callback.
///
/// The function keeps its signature and can still be called directly. It is
/// also collected into `CallbackTable::collected()`, which is how snapshot
/// files resolve callback names back to code.
///
/// The registered name defaults to the function's module path, e.g.
/// `my_app::audit::record`. Override it with `name`:
///
/// ```rust,ignore
/// use waypost::{BoxError, Payload};
///
/// #[waypost::callback(name = "audit::record")]
/// fn record(event: &str, payload: &Payload) -> Result<(), BoxError> {
///     tracing::info!(%event, "audited");
///     Ok(())
/// }
/// ```
///
/// The function must be synchronous, non-generic, take
/// `(&str, &Payload)` and return `()` or `Result<(), E>`.
#[proc_macro_attribute]
pub fn callback(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as callback::CallbackArgs);
    let input = parse_macro_input!(item as ItemFn);

    callback::expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
