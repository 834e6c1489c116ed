// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

mod mapping;

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Expr, Fields, LitStr};

/// Container-level `#[node(...)]` options.
#[derive(Default)]
struct KindAttrs {
    signature: Vec<(String, String)>,
    bases: Vec<String>,
    bounds: Vec<(String, String)>,
}

/// How a field is filled when absent from an instance.
enum FieldDefault {
    None,
    Default,
    Expr(Box<Expr>),
}

/// Field-level `#[node(...)]` options.
struct FieldAttrs {
    annotation: Option<String>,
    default: FieldDefault,
    skip: bool,
}

fn parse_kind_attrs(input: &DeriveInput) -> syn::Result<KindAttrs> {
    let mut attrs = KindAttrs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("node")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.signature.push(("name".to_string(), lit.value()));
            } else if meta.path.is_ident("sig") {
                meta.parse_nested_meta(|component| {
                    let key = component.path.require_ident()?.unraw().to_string();
                    let lit: LitStr = component.value()?.parse()?;
                    attrs.signature.push((key, lit.value()));
                    Ok(())
                })?;
            } else if meta.path.is_ident("returns") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.bases.push(format!("Node[{}]", lit.value()));
            } else if meta.path.is_ident("extends") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.bases.push(lit.value());
            } else if meta.path.is_ident("bound") {
                meta.parse_nested_meta(|param| {
                    let name = param.path.require_ident()?.to_string();
                    let lit: LitStr = param.value()?.parse()?;
                    attrs.bounds.push((name, lit.value()));
                    Ok(())
                })?;
            } else {
                return Err(meta.error(
                    "unknown node attribute; expected tag, sig, returns, extends or bound",
                ));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        annotation: None,
        default: FieldDefault::None,
        skip: false,
    };
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("node")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("annotation") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.annotation = Some(lit.value());
            } else if meta.path.is_ident("default") {
                attrs.default = if meta.input.peek(syn::Token![=]) {
                    FieldDefault::Expr(Box::new(meta.value()?.parse()?))
                } else {
                    FieldDefault::Default
                };
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else {
                return Err(meta.error(
                    "unknown node field attribute; expected annotation, default or skip",
                ));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// `#[derive(Node)]` macro: generates the node kind declaration plus
/// typed/dynamic conversions.
///
/// Container attributes:
/// - `#[node(tag = "add")]` - single signature component
/// - `#[node(sig(ns = "calc", name = "add", version = "1.0"))]` - ordered components
/// - `#[node(returns = "float")]` - shorthand for `extends = "Node[float]"`
/// - `#[node(extends = "BinaryOp")]` - extra declared base
/// - `#[node(bound(T = "int | float"))]` - bound of generic parameter `T`
///
/// Field attributes:
/// - `#[node(annotation = "int | str")]` - override the mapped annotation
/// - `#[node(default)]` / `#[node(default = expr)]` - value used when absent
/// - `#[node(skip)]` - not part of the kind; rebuilt with `Default`
///
/// The tag is computed and validated at compile time.
///
/// # Panics
///
/// Never; unsupported input is reported as a compile error.
///
/// Example:
/// ```ignore
/// use treedsl::{Node, Ref};
///
/// #[derive(Node)]
/// #[node(sig(ns = "calc", name = "add"), returns = "float")]
/// struct Add {
///     left: Ref<Expr>,
///     right: Ref<Expr>,
///     #[node(default = 2)]
///     precision: i64,
/// }
/// ```
#[proc_macro_derive(Node, attributes(node))]
pub fn derive_node(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[allow(clippy::too_many_lines)]
fn expand(mut input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = input.ident.clone();
    let type_name = name.to_string();
    let kind = parse_kind_attrs(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => f.named.clone(),
            _ => return Err(syn::Error::new_spanned(&input, "Only named fields are supported")),
        },
        _ => return Err(syn::Error::new_spanned(&input, "Only structs are supported")),
    };

    let tag = mapping::compose_tag(&type_name, &kind.signature)
        .map_err(|reason| syn::Error::new_spanned(&name, reason))?;

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(lifetime, "node kinds cannot borrow"));
    }
    let params: Vec<String> = input
        .generics
        .type_params()
        .map(|p| p.ident.to_string())
        .collect();
    for (param, _) in &kind.bounds {
        if !params.contains(param) {
            return Err(syn::Error::new_spanned(
                &name,
                format!("bound given for unknown type parameter '{param}'"),
            ));
        }
    }

    let component_stmts = kind.signature.iter().map(|(k, v)| {
        quote! { decl = decl.component(#k, #v); }
    });
    let param_stmts = params.iter().map(|p| {
        match kind.bounds.iter().find(|(name, _)| name == p) {
            Some((_, bound)) => quote! {
                decl = decl.type_param(
                    ::treedsl::annotation::ParamDecl::new(#p)
                        .with_bound(::treedsl::annotation::Annotation::parse(#bound)?),
                );
            },
            None => quote! {
                decl = decl.type_param(::treedsl::annotation::ParamDecl::new(#p));
            },
        }
    });
    let base_stmts = kind.bases.iter().map(|base| {
        quote! { decl = decl.extends(::treedsl::annotation::Annotation::parse(#base)?); }
    });

    let mut field_stmts = Vec::new();
    let mut to_fields = Vec::new();
    let mut from_fields = Vec::new();

    for field in &fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let ty = &field.ty;
        let attrs = parse_field_attrs(field)?;

        if attrs.skip {
            from_fields.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let field_name = ident.unraw().to_string();
        let annotation = match attrs.annotation {
            Some(text) => text,
            None => mapping::annotation_of(ty)?,
        };
        let is_option = matches!(
            ty,
            syn::Type::Path(p) if p.path.segments.last().is_some_and(|s| s.ident == "Option")
        );

        let mut decl_field = quote! {
            ::treedsl::registry::FieldDecl::new(
                #field_name,
                ::treedsl::annotation::Annotation::parse(#annotation)?,
            )
        };
        let take = match &attrs.default {
            FieldDefault::None if is_option => {
                quote! { instance.take_or_else::<#ty>(#field_name, || ::core::option::Option::None)? }
            }
            FieldDefault::None if field_name.starts_with('_') => {
                quote! { instance.take_or_else::<#ty>(#field_name, ::core::default::Default::default)? }
            }
            FieldDefault::None => quote! { instance.take::<#ty>(#field_name)? },
            FieldDefault::Default => {
                decl_field = quote! {
                    #decl_field.with_default(::treedsl::ToValue::to_value(
                        &<#ty as ::core::default::Default>::default(),
                    ))
                };
                quote! { instance.take_or_else::<#ty>(#field_name, ::core::default::Default::default)? }
            }
            FieldDefault::Expr(expr) => {
                decl_field = quote! {
                    #decl_field.with_default(::treedsl::ToValue::to_value(&{
                        let value: #ty = #expr;
                        value
                    }))
                };
                quote! { instance.take_or_else::<#ty>(#field_name, || -> #ty { #expr })? }
            }
        };

        field_stmts.push(quote! { decl = decl.field_decl(#decl_field); });
        to_fields.push(quote! {
            .with(#field_name, ::treedsl::ToValue::to_value(&self.#ident))
        });
        from_fields.push(quote! { #ident: #take });
    }

    for param in input.generics.type_params().map(|p| p.ident.clone()).collect::<Vec<_>>() {
        input
            .generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#param: ::treedsl::ToValue + ::treedsl::FromValue));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::treedsl::registry::Node for #name #ty_generics #where_clause {
            const TAG: &'static str = #tag;

            fn declaration() -> ::core::result::Result<
                ::treedsl::registry::KindDecl,
                ::treedsl::errors::ParseError,
            > {
                #[allow(unused_mut)]
                let mut decl = ::treedsl::registry::KindDecl::new(#type_name);
                #(#component_stmts)*
                #(#param_stmts)*
                #(#base_stmts)*
                #(#field_stmts)*
                ::core::result::Result::Ok(decl)
            }

            fn to_instance(&self) -> ::treedsl::NodeInstance {
                ::treedsl::NodeInstance::new(#tag) #(#to_fields)*
            }

            #[allow(unused_mut)]
            fn from_instance(
                mut instance: ::treedsl::NodeInstance,
            ) -> ::core::result::Result<Self, ::treedsl::errors::ValueError> {
                instance.expect_tag(#tag)?;
                ::core::result::Result::Ok(Self {
                    #(#from_fields),*
                })
            }
        }

        impl #impl_generics ::treedsl::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::treedsl::Value {
                ::treedsl::Value::Node(::std::boxed::Box::new(
                    ::treedsl::registry::Node::to_instance(self),
                ))
            }
        }

        impl #impl_generics ::treedsl::FromValue for #name #ty_generics #where_clause {
            fn from_value(
                value: ::treedsl::Value,
            ) -> ::core::result::Result<Self, ::treedsl::errors::ValueError> {
                match value {
                    ::treedsl::Value::Node(instance) => {
                        <Self as ::treedsl::registry::Node>::from_instance(*instance)
                    }
                    other => ::core::result::Result::Err(::treedsl::errors::ValueError::Mismatch {
                        expected: "node",
                        got: other.type_name().to_string(),
                    }),
                }
            }
        }
    })
}
