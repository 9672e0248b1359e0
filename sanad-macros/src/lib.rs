//! Procedural macros for Sanad DI.
//!
//! `#[derive(Injectable)]` turns a struct definition into constructor
//! metadata and submits it to the type catalog.
//!
//! Field rules:
//! - `Arc<T>`: resolved through the container under `T`'s short name
//! - `Instance`: handed over untouched (give it a `key`)
//! - anything else: needs an explicit value or a default, and is cloned
//!   out of the resolved arguments
//!
//! Attributes:
//! - struct: `#[inject(name = "Key", transient, provider, with = "path")]`
//! - field: `#[inject(key = "Name", default = "expr")]`

use darling::ast::{Data, Fields};
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{DeriveInput, Expr, GenericArgument, Ident, Path, PathArguments, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(inject), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: syn::Generics,
    data: Data<Ignored, InjectField>,
    /// Key to register under instead of the short type name.
    #[darling(default)]
    name: Option<String>,
    /// Never cache instances of this type.
    #[darling(default)]
    transient: bool,
    /// The type implements `Provider` and builds itself.
    #[darling(default)]
    provider: bool,
    /// `fn(TypeInfo) -> TypeInfo` applied last, e.g. to add methods.
    #[darling(default)]
    with: Option<Path>,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    key: Option<String>,
    #[darling(default)]
    default: Option<Expr>,
}

/// How a field's value comes out of the resolved arguments.
enum FieldKind<'a> {
    /// `Arc<T>`
    Shared(&'a Type),
    /// `Instance`
    Raw,
    /// Anything else, cloned
    Value,
}

#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match InjectableInput::from_derive_input(&input).and_then(|parsed| expand(&parsed)) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &InjectableInput) -> darling::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(darling::Error::custom(
            "#[derive(Injectable)] does not support generic types; register them with TypeInfo",
        )
        .with_span(&input.generics));
    }

    let ident = &input.ident;
    let fields = match &input.data {
        Data::Struct(fields) => fields,
        Data::Enum(_) => return Err(darling::Error::unsupported_shape("enum")),
    };

    let params = fields.iter().map(field_param);
    let construct = constructor(ident, fields);

    let key_override = input.name.as_ref().map(|name| {
        quote! {
            fn key() -> ::sanad::DependencyKey {
                ::sanad::DependencyKey::named(#name)
            }
        }
    });
    let transient = input.transient.then(|| quote!(.transient()));
    let provider = input
        .provider
        .then(|| quote!(.provided_by::<#ident>()));
    let extend = input.with.as_ref().map(|with| quote!(let info = #with(info);));

    Ok(quote! {
        impl ::sanad::Injectable for #ident {
            fn type_info() -> ::sanad::TypeInfo {
                let info = ::sanad::TypeInfo::of::<#ident>()
                    .with_key(<#ident as ::sanad::Injectable>::key())
                    #(.param(#params))*
                    .constructor(#construct)
                    #transient
                    #provider;
                #extend
                info
            }

            #key_override
        }

        ::sanad::__private::inventory::submit! {
            ::sanad::TypeEntry::new(<#ident as ::sanad::Injectable>::type_info)
        }
    })
}

fn field_name(field: &InjectField) -> String {
    field
        .ident
        .as_ref()
        .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default()
}

fn field_kind(ty: &Type) -> FieldKind<'_> {
    let Type::Path(path) = ty else {
        return FieldKind::Value;
    };
    let Some(last) = path.path.segments.last() else {
        return FieldKind::Value;
    };

    if last.ident == "Instance" {
        return FieldKind::Raw;
    }
    if last.ident != "Arc" {
        return FieldKind::Value;
    }

    match &last.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) if args.args.len() == 1 => FieldKind::Shared(inner),
            _ => FieldKind::Value,
        },
        _ => FieldKind::Value,
    }
}

/// `Parameter` expression for one field.
fn field_param(field: &InjectField) -> TokenStream2 {
    let name = field_name(field);
    let ty = &field.ty;
    let kind = field_kind(ty);

    let param = match (&field.key, &kind) {
        (Some(key), _) => quote!(::sanad::Parameter::typed(#name, #key)),
        (None, FieldKind::Shared(inner)) => quote!(::sanad::Parameter::of::<#inner>(#name)),
        (None, _) => quote!(::sanad::Parameter::untyped(#name)),
    };

    let Some(default) = &field.default else {
        return param;
    };

    match kind {
        FieldKind::Shared(_) => quote_spanned! {default.span()=>
            #param.with_default_instance(|| -> ::sanad::Instance {
                let value: #ty = #default;
                value
            })
        },
        FieldKind::Raw => quote_spanned! {default.span()=>
            #param.with_default_instance(|| -> ::sanad::Instance { #default })
        },
        FieldKind::Value => quote_spanned! {default.span()=>
            #param.with_default(|| -> #ty { #default })
        },
    }
}

/// Constructor closure building the struct from resolved arguments.
///
/// Unit structs accept `Name {}` too, so both shapes share one path.
fn constructor(ident: &Ident, fields: &Fields<InjectField>) -> TokenStream2 {
    let inits = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let name = field_name(field);
        let ty = &field.ty;
        let value = match field_kind(ty) {
            FieldKind::Shared(inner) => quote!(args.arc::<#inner>(#name)?),
            FieldKind::Raw => quote!(args.instance(#name)?),
            FieldKind::Value => quote!(args.cloned::<#ty>(#name)?),
        };
        quote!(#field_ident: #value)
    });

    quote! {
        |args: ::sanad::Args| {
            let _ = &args;
            ::core::result::Result::Ok(#ident { #(#inits),* })
        }
    }
}
