//! `#[derive(Injectable)]` implementation.

use darling::ast::Data;
use darling::util::{Flag, Ignored};
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{DeriveInput, Ident, Path, Type, parse_macro_input, parse_quote};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: syn::Generics,
    data: Data<Ignored, InjectableField>,
    record: Flag,
    #[darling(rename = "crate")]
    krate: Option<Path>,
}

#[derive(FromField)]
#[darling(forward_attrs(inject))]
struct InjectableField {
    ident: Option<Ident>,
    ty: Type,
    attrs: Vec<syn::Attribute>,
}

impl InjectableField {
    fn inject_attr(&self) -> Option<&syn::Attribute> {
        self.attrs.iter().find(|attr| attr.path().is_ident("inject"))
    }

    fn is_injected(&self) -> bool {
        self.inject_attr().is_some()
    }

    /// `#[inject]` or `#[inject(copy)]`; returns whether `copy` was given.
    fn copy_acknowledged(&self) -> darling::Result<bool> {
        let Some(attr) = self.inject_attr() else {
            return Ok(false);
        };
        match &attr.meta {
            syn::Meta::Path(_) => Ok(false),
            syn::Meta::List(_) => match attr.parse_args::<Ident>() {
                Ok(word) if word == "copy" => Ok(true),
                _ => Err(darling::Error::custom("expected `#[inject]` or `#[inject(copy)]`").with_span(attr)),
            },
            syn::Meta::NameValue(_) => {
                Err(darling::Error::custom("expected `#[inject]` or `#[inject(copy)]`").with_span(attr))
            }
        }
    }

    /// Injected by value: neither `Arc<_>` nor `Ref<_>`. For a supported
    /// type that only leaves a record, which the constructor gets a copy of.
    fn is_by_value(&self) -> bool {
        match &self.ty {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_none_or(|segment| segment.ident != "Arc" && segment.ident != "Ref"),
            _ => true,
        }
    }
}

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let parsed = InjectableInput::from_derive_input(input)?;

    if !parsed.generics.params.is_empty() {
        return Err(darling::Error::custom(
            "Injectable cannot be derived for generic types; implement it by hand",
        )
        .with_span(&parsed.generics));
    }

    let krate: Path = parsed.krate.clone().unwrap_or_else(|| parse_quote!(::sijill));
    let ident = &parsed.ident;

    let Some(fields) = parsed.data.as_ref().take_struct() else {
        return Err(darling::Error::unsupported_shape("enum"));
    };

    let mut errors = darling::Error::accumulator();
    let mut copy_warnings = Vec::new();
    for field in fields.iter().filter(|field| field.is_injected()) {
        let Some(acknowledged) = errors.handle(field.copy_acknowledged()) else {
            continue;
        };
        if !acknowledged && field.is_by_value() {
            copy_warnings.push(copy_warning(ident, field));
        }
    }
    errors.finish()?;

    let injected: Vec<&Type> = fields
        .iter()
        .filter(|field| field.is_injected())
        .map(|field| &field.ty)
        .collect();

    let body = if fields.is_unit() {
        quote! { Self }
    } else {
        let inits = fields.iter().map(|field| {
            let name = &field.ident;
            if field.is_injected() {
                quote! { #name: args.inject() }
            } else {
                quote! { #name: ::core::default::Default::default() }
            }
        });
        quote! { Self { #(#inits),* } }
    };

    let declare = if parsed.record.is_present() {
        quote! { #krate::record!(#ident); }
    } else {
        quote! { #krate::class!(#ident); }
    };

    Ok(quote! {
        impl #krate::Injectable for #ident {
            fn signatures() -> ::std::vec::Vec<#krate::Signature> {
                ::std::vec![#krate::Signature::new()#(.param::<#injected>())*]
            }

            #[allow(unused_variables)]
            fn construct(args: &#krate::Arguments<'_>) -> Self {
                #body
            }
        }

        #declare

        #krate::__private::inventory::submit! {
            #krate::catalog::Declaration::new::<#ident>()
        }

        #(#copy_warnings)*
    })
}

/// Stable Rust has no way for a derive to emit a warning directly, so the
/// warning is a use of a deprecated constant spanned at the field's type.
fn copy_warning(owner: &Ident, field: &InjectableField) -> TokenStream2 {
    let ty = &field.ty;
    let name = field.ident.as_ref().map_or_else(|| "field".to_string(), Ident::to_string);
    let marker = format_ident!("{}_receives_a_copy", name);
    let note = format!(
        "`{owner}::{name}` injects a record by value and receives a copy, not the singleton; \
         inject `Ref<{}>` to share it, or write `#[inject(copy)]` to keep the copy",
        quote!(#ty).to_string().replace(' ', ""),
    );
    quote_spanned! {ty.span()=>
        const _: () = {
            #[deprecated(note = #note)]
            #[allow(non_upper_case_globals)]
            const #marker: () = ();
            #marker
        };
    }
}
