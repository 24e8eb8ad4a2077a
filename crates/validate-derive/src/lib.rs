//! Derive macro for `fieldlen_core::Inspect`.

use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenTree};
use quote::{ToTokens, quote};
use std::collections::BTreeSet;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Index, Lit, LitStr, Member, Meta, Type,
    Visibility, WherePredicate,
};

/// Derive `fieldlen_core::Inspect`, publishing the struct's field table.
///
/// Field annotations:
///
/// - `#[validate = "len:0,10"]`
/// - `#[validate(rule = "len:0,10", field = "DisplayName")]`
///
/// Annotation text is checked at validation time, not here. An annotated
/// public field whose type involves a type parameter gets an
/// `AsRef<str>` bound on the generated impl.
#[proc_macro_derive(Inspect, attributes(validate))]
pub fn derive_inspect(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand_inspect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_inspect(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    reject_container_attrs(&input.attrs)?;

    let type_params: BTreeSet<Ident> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();

    let (body, bounds) = match &input.data {
        Data::Struct(struct_data) => expand_struct(&struct_data.fields, &type_params)?,
        Data::Enum(_) => (
            quote! {
                ::fieldlen_core::Shape::Enum(::core::any::type_name::<Self>())
            },
            Vec::new(),
        ),
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Inspect cannot be derived for unions",
            ));
        },
    };

    let name = &input.ident;
    let mut generics = input.generics.clone();
    if !bounds.is_empty() {
        generics.make_where_clause().predicates.extend(bounds);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::fieldlen_core::Inspect for #name #ty_generics #where_clause {
            fn shape(&self) -> ::fieldlen_core::Shape<'_> {
                #body
            }
        }
    })
}

fn reject_container_attrs(attrs: &[Attribute]) -> Result<(), syn::Error> {
    match attrs.iter().find(|attr| attr.path().is_ident("validate")) {
        Some(attr) => Err(syn::Error::new_spanned(
            attr,
            "validate attributes belong on fields, not on the container",
        )),
        None => Ok(()),
    }
}

fn expand_struct(
    fields: &Fields,
    type_params: &BTreeSet<Ident>,
) -> Result<(proc_macro2::TokenStream, Vec<WherePredicate>), syn::Error> {
    let mut descriptors = Vec::new();
    let mut bounds = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let attrs = parse_field_attrs(&field.attrs)?;
        let (member, default_name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
            None => (Member::Unnamed(Index::from(index)), index.to_string()),
        };
        let name = LitStr::new(
            &attrs.field_name.unwrap_or(default_name),
            proc_macro2::Span::call_site(),
        );
        let ty = &field.ty;

        let annotated = attrs.rule.as_ref().is_some_and(|rule| !rule.value().is_empty());
        let annotation = match &attrs.rule {
            Some(rule) => quote! { ::core::option::Option::Some(#rule) },
            None => quote! { ::core::option::Option::None },
        };

        let public = matches!(field.vis, Visibility::Public(_));
        let visibility = if public {
            quote! { ::fieldlen_core::Visibility::Public }
        } else {
            quote! { ::fieldlen_core::Visibility::Private }
        };

        let value = if !public {
            quote! { ::fieldlen_core::FieldValue::Unreadable }
        } else if annotated && mentions_type_param(ty, type_params) {
            // Generic field types are only known after monomorphization.
            bounds.push(syn::parse_quote! { #ty: ::core::convert::AsRef<str> });
            quote! {
                ::fieldlen_core::FieldValue::Str(
                    ::core::convert::AsRef::<str>::as_ref(&self.#member)
                )
            }
        } else {
            quote! {
                {
                    use ::fieldlen_core::record::field_read::*;
                    (&FieldRef(&self.#member)).field_value()
                }
            }
        };

        descriptors.push(quote! {
            ::fieldlen_core::FieldDescriptor {
                name: #name,
                type_name: ::core::any::type_name::<#ty>(),
                visibility: #visibility,
                annotation: #annotation,
                value: #value,
            }
        });
    }

    let body = quote! {
        ::fieldlen_core::Shape::Struct(::fieldlen_core::RecordView::new(
            ::core::any::type_name::<Self>(),
            ::std::vec![#(#descriptors),*],
        ))
    };
    Ok((body, bounds))
}

#[derive(Debug, Default)]
struct FieldAttrs {
    rule: Option<LitStr>,
    field_name: Option<String>,
}

fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs, syn::Error> {
    let mut rule: Option<LitStr> = None;
    let mut field_name: Option<String> = None;
    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        match &attr.meta {
            Meta::NameValue(name_value) => {
                let Expr::Lit(ExprLit {
                    lit: Lit::Str(value),
                    ..
                }) = &name_value.value
                else {
                    return Err(syn::Error::new_spanned(
                        &name_value.value,
                        "expected a string literal, e.g. #[validate = \"len:0,10\"]",
                    ));
                };
                if rule.is_some() {
                    return Err(syn::Error::new_spanned(attr, "duplicate validate rule"));
                }
                rule = Some(value.clone());
            },
            Meta::List(_) => {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rule") {
                        let value: LitStr = meta.value()?.parse()?;
                        if rule.is_some() {
                            return Err(meta.error("duplicate validate rule"));
                        }
                        rule = Some(value);
                        return Ok(());
                    }
                    if meta.path.is_ident("field") {
                        let value: LitStr = meta.value()?.parse()?;
                        if field_name.is_some() {
                            return Err(meta.error("duplicate validate(field = ...)"));
                        }
                        field_name = Some(value.value());
                        return Ok(());
                    }
                    Err(meta.error("unsupported validate attribute on field"))
                })?;
            },
            Meta::Path(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected #[validate = \"...\"] or #[validate(rule = \"...\")]",
                ));
            },
        }
    }
    Ok(FieldAttrs { rule, field_name })
}

fn mentions_type_param(ty: &Type, type_params: &BTreeSet<Ident>) -> bool {
    fn walk(tokens: proc_macro2::TokenStream, type_params: &BTreeSet<Ident>) -> bool {
        tokens.into_iter().any(|token| match token {
            TokenTree::Ident(ident) => type_params.contains(&ident),
            TokenTree::Group(group) => walk(group.stream(), type_params),
            TokenTree::Punct(_) | TokenTree::Literal(_) => false,
        })
    }

    !type_params.is_empty() && walk(ty.to_token_stream(), type_params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expansion_error(input: &DeriveInput) -> Option<String> {
        expand_inspect(input).err().map(|error| error.to_string())
    }

    #[test]
    fn unions_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            union Bits {
                int: u32,
                float: f32,
            }
        };
        assert_eq!(
            expansion_error(&input).as_deref(),
            Some("Inspect cannot be derived for unions")
        );
    }

    #[test]
    fn container_attribute_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            #[validate = "len:0,1"]
            struct Tagged {
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&input).as_deref(),
            Some("validate attributes belong on fields, not on the container")
        );
    }

    #[test]
    fn non_literal_rule_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Tagged {
                #[validate = 10]
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&input).as_deref(),
            Some("expected a string literal, e.g. #[validate = \"len:0,10\"]")
        );
    }

    #[test]
    fn bare_attribute_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Tagged {
                #[validate]
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&input).as_deref(),
            Some("expected #[validate = \"...\"] or #[validate(rule = \"...\")]")
        );
    }

    #[test]
    fn duplicate_rules_are_rejected() {
        let repeated: DeriveInput = syn::parse_quote! {
            struct Tagged {
                #[validate = "len:0,1"]
                #[validate = "len:0,2"]
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&repeated).as_deref(),
            Some("duplicate validate rule")
        );

        let listed: DeriveInput = syn::parse_quote! {
            struct Tagged {
                #[validate(rule = "len:0,1", rule = "len:0,2")]
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&listed).as_deref(),
            Some("duplicate validate rule")
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Tagged {
                #[validate(max = "3")]
                pub name: String,
            }
        };
        assert_eq!(
            expansion_error(&input).as_deref(),
            Some("unsupported validate attribute on field")
        );
    }

    #[test]
    fn field_table_follows_declaration_order() -> Result<(), syn::Error> {
        let input: DeriveInput = syn::parse_quote! {
            struct Ordered {
                #[validate = "len:0,1"]
                pub zeta: String,
                pub alpha: u8,
                r#mid: String,
            }
        };
        let tokens = expand_inspect(&input)?.to_string();

        let positions: Vec<Option<usize>> = ["\"zeta\"", "\"alpha\"", "\"mid\""]
            .iter()
            .map(|name| tokens.find(name))
            .collect();
        assert!(positions.iter().all(Option::is_some));
        assert!(positions.windows(2).all(|pair| pair.first() < pair.get(1)));
        assert!(!tokens.contains("where"));
        Ok(())
    }

    #[test]
    fn annotated_generic_field_gets_a_str_bound() -> Result<(), syn::Error> {
        let input: DeriveInput = syn::parse_quote! {
            struct Tagged<T, P> {
                #[validate = "len:1,3"]
                pub label: T,
                pub payload: P,
                #[validate = ""]
                pub note: P,
            }
        };
        let tokens = expand_inspect(&input)?.to_string();

        assert!(tokens.contains("where"));
        assert_eq!(tokens.matches("AsRef < str >").count(), 1);
        Ok(())
    }

    #[test]
    fn type_param_detection_sees_nested_uses() {
        let params: BTreeSet<Ident> = [syn::parse_quote!(T)].into_iter().collect();
        let nested: Type = syn::parse_quote!(Box<Vec<T>>);
        let reference: Type = syn::parse_quote!(&'a T);
        let concrete: Type = syn::parse_quote!(Vec<Total>);

        assert!(mentions_type_param(&nested, &params));
        assert!(mentions_type_param(&reference, &params));
        assert!(!mentions_type_param(&concrete, &params));
    }
}
