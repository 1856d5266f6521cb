use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Enables `tracing` output for the annotated test.
///
/// Logging is only installed when the test runs with `--nocapture` or `RUST_LOG` is set. The
/// subscriber is thread-local and removed again when the test body returns.
///
/// Crates using this attribute need `shroud-utils` as a dev-dependency.
#[proc_macro_attribute]
pub fn enable_logging(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = parse_macro_input!(item as ItemFn);
    let name = sig.ident.to_string();
    let stmts = &block.stmts;

    quote! {
        #(#attrs)*
        #vis #sig {
            let _logging_guard = ::shroud_utils::logging::setup_test_logging();
            let _test_span = ::tracing::info_span!("test", name = #name).entered();
            #(#stmts)*
        }
    }
    .into()
}
