extern crate proc_macro;

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{ItemFn, Stmt, parse::Parse, parse_macro_input, parse_quote};

/// Unit used when reporting how long a traced function ran for.
#[derive(PartialEq, Eq, Clone, Copy, Default)]
enum Precision {
    #[default]
    Nanos,
    Micros,
    Millis,
    Seconds,
    Unspecified,
}

impl Precision {
    /// Closure expression turning the elapsed `Duration` into a log fragment.
    fn formatter(self) -> syn::Expr {
        match self {
            Self::Nanos => {
                parse_quote!(|d: std::time::Duration| format!("{} ns elapsed", d.as_nanos()))
            }
            Self::Micros => {
                parse_quote!(|d: std::time::Duration| format!("{} us elapsed", d.as_micros()))
            }
            Self::Millis => {
                parse_quote!(|d: std::time::Duration| format!("{} ms elapsed", d.as_millis()))
            }
            Self::Seconds => {
                parse_quote!(|d: std::time::Duration| format!("{} s elapsed", d.as_secs()))
            }
            Self::Unspecified => parse_quote!(|_: std::time::Duration| String::default()),
        }
    }
}

impl From<&str> for Precision {
    fn from(value: &str) -> Self {
        match value {
            "ns" | "nanos" | "nanoseconds" => Self::Nanos,
            "us" | "micros" | "microseconds" => Self::Micros,
            "ms" | "millis" | "milliseconds" => Self::Millis,
            "s" | "secs" | "seconds" => Self::Seconds,
            _ => Self::Unspecified,
        }
    }
}

mod kw {
    syn::custom_keyword!(timing);
    syn::custom_keyword!(precision);
    syn::custom_keyword!(instrument);
}

impl Parse for Precision {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        if !input.peek(syn::token::Paren) {
            return Ok(Self::default());
        }

        let content;
        syn::parenthesized!(content in input);
        content.parse::<kw::precision>()?;
        content.parse::<syn::Token![=]>()?;
        let unit = content.parse::<syn::LitStr>()?.value();

        Ok(Self::from(unit.as_str()))
    }
}

/// Parsed arguments of `#[traced(...)]`.
#[derive(Default)]
struct TracedArgs {
    timing: Option<Precision>,
    instrument: Option<TokenStream>,
    unknown: Vec<syn::Error>,
}

impl Parse for TracedArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut args = Self::default();

        while !input.is_empty() {
            let lookahead = input.lookahead1();
            if lookahead.peek(kw::timing) {
                if args.timing.is_some() {
                    return Err(input.error("`timing` may only be given once"));
                }
                input.parse::<kw::timing>()?;
                args.timing = Some(input.parse()?);
            } else if lookahead.peek(kw::instrument) {
                if args.instrument.is_some() {
                    return Err(input.error("`instrument` may only be given once"));
                }
                input.parse::<kw::instrument>()?;
                let fields = if input.peek(syn::token::Paren) {
                    let content;
                    syn::parenthesized!(content in input);
                    content.parse()?
                } else {
                    TokenStream::new()
                };
                args.instrument = Some(fields);
            } else if lookahead.peek(syn::Token![,]) {
                input.parse::<syn::Token![,]>()?;
            } else {
                args.unknown.push(lookahead.error());
                input.parse::<proc_macro2::TokenTree>()?;
            }
        }

        Ok(args)
    }
}

impl TracedArgs {
    /// Unknown arguments surface as deprecation warnings rather than hard errors.
    fn warnings(&self) -> TokenStream {
        let warnings = self.unknown.iter().map(|err| {
            let note = syn::LitStr::new(&format!("unrecognised `traced` input, {err}"), err.span());

            quote_spanned! {err.span()=>
                #[warn(deprecated)]
                {
                    #[deprecated(since = "not actually deprecated", note = #note)]
                    const TRACED_WARNING: () = ();
                    let _ = TRACED_WARNING;
                }
            }
        });

        quote! { { #(#warnings)* } }
    }

    fn exit_event(&self, name: &str) -> Stmt {
        self.timing.map_or_else(
            || parse_quote! { tracing::trace!("OnExit: {}", #name); },
            |precision| {
                let formatter = precision.formatter();
                parse_quote! {
                    tracing::trace!("OnExit: {} ({})", #name, (#formatter)(self.started.elapsed()));
                }
            },
        )
    }
}

/// Emits `tracing::trace!` events when the attributed function is entered and
/// left, optionally with the elapsed time, and forwards `instrument(...)` to
/// `#[tracing::instrument]`.
///
/// ```ignore
/// #[traced(instrument(level = tracing::Level::DEBUG, skip(self)), timing(precision = "us"))]
/// fn order_cutoff(&self, now: NaiveDateTime) -> NaiveDateTime { ... }
/// ```
#[proc_macro_attribute]
pub fn traced(
    args: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let args = parse_macro_input!(args as TracedArgs);
    let mut item_fn = parse_macro_input!(item as ItemFn);

    item_fn
        .attrs
        .push(parse_quote! { #[allow(clippy::items_after_statements)] });

    if let Some(fields) = &args.instrument {
        item_fn
            .attrs
            .push(parse_quote! { #[tracing::instrument(#fields)] });
    }

    let name = item_fn.sig.ident.to_string();
    let warnings = args.warnings();
    let on_exit = args.exit_event(&name);

    let guard: Vec<Stmt> = parse_quote! {
        struct __TracedGuard {
            started: std::time::Instant,
        }

        impl __TracedGuard {
            fn enter() -> Self {
                #warnings

                tracing::trace!("OnEnter: {}", #name);
                Self {
                    started: std::time::Instant::now(),
                }
            }
        }

        impl std::ops::Drop for __TracedGuard {
            fn drop(&mut self) {
                #on_exit
            }
        }

        let __traced_guard = __TracedGuard::enter();
    };

    let body = std::mem::take(&mut item_fn.block.stmts);
    item_fn.block.stmts = guard.into_iter().chain(body).collect();

    proc_macro::TokenStream::from(quote! { #item_fn })
}
