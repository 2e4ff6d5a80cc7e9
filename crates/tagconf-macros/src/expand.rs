//! Config derive implementation.
//!
//! The derive emits three impls for the annotated struct:
//!
//! - `Config`, holding the static `Schema` built from the field attributes
//!   and a hook encoding the struct's default value;
//! - `Record`, classifying every field value for the instance walk;
//! - `Node`, which applies default literals and recurses into nested records.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{option_inner, ConfigField, ConfigStruct};

/// Expands `#[derive(Config)]`.
pub fn expand_config(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let parsed = ConfigStruct::parse(&input)?;
    Ok(generate(&parsed))
}

fn generate(parsed: &ConfigStruct) -> TokenStream {
    let ident = &parsed.ident;
    let name = ident.to_string();
    let count = parsed.fields.len();

    let descriptors = parsed.fields.iter().map(descriptor);
    let nodes = parsed.fields.iter().map(field_node);
    let defaults = parsed.fields.iter().map(field_defaults);

    let self_validating = parsed.attrs.self_validate.then(|| {
        quote! {
            fn self_validating(&self) -> ::core::option::Option<&dyn ::tagconf::__private::SelfValidate> {
                ::core::option::Option::Some(self)
            }
        }
    });

    quote! {
        #[automatically_derived]
        impl ::tagconf::__private::Config for #ident {
            fn config_schema() -> &'static ::tagconf::__private::Schema {
                static FIELDS: [::tagconf::__private::FieldDescriptor; #count] = [#(#descriptors),*];
                static SCHEMA: ::tagconf::__private::Schema = ::tagconf::__private::Schema {
                    name: #name,
                    fields: &FIELDS,
                    defaults: ::tagconf::__private::default_tree::<#ident>,
                };
                &SCHEMA
            }

            #self_validating
        }

        #[automatically_derived]
        impl ::tagconf::__private::Record for #ident {
            fn record_schema(&self) -> &'static ::tagconf::__private::Schema {
                <Self as ::tagconf::__private::Config>::config_schema()
            }

            fn field_nodes(&self) -> ::std::vec::Vec<::tagconf::__private::NodeRef<'_>> {
                ::std::vec![#(#nodes),*]
            }
        }

        #[automatically_derived]
        impl ::tagconf::__private::Node for #ident {
            fn schema() -> ::core::option::Option<&'static ::tagconf::__private::Schema> {
                ::core::option::Option::Some(<Self as ::tagconf::__private::Config>::config_schema())
            }

            fn node(&self) -> ::tagconf::__private::NodeRef<'_> {
                ::tagconf::__private::NodeRef::Record(self)
            }

            fn apply_defaults(&mut self) -> ::core::result::Result<(), ::tagconf::__private::DefaultError> {
                #(#defaults)*
                ::core::result::Result::Ok(())
            }
        }
    }
}

fn descriptor(field: &ConfigField) -> TokenStream {
    let ident = field.name();
    let serde_name = field.serde_name();
    let ty = &field.ty;
    let attrs = &field.attrs;

    let key = opt_str(attrs.key.as_deref());
    let yaml = opt_str(attrs.yaml.as_deref());
    let json = opt_str(attrs.json.as_deref());
    let toml = opt_str(attrs.toml.as_deref());
    let default = opt_str(attrs.default.as_deref());
    let exported = field.exported;
    let env_strict = attrs.env_strict;

    let (nested, kind) = if attrs.leaf {
        (
            quote!(::tagconf::__private::no_schema),
            quote!(::tagconf::__private::no_scalar),
        )
    } else {
        (
            quote!(<#ty as ::tagconf::__private::Node>::schema),
            quote!(<#ty as ::tagconf::__private::Node>::scalar),
        )
    };

    quote! {
        ::tagconf::__private::FieldDescriptor {
            ident: #ident,
            serde_name: #serde_name,
            tags: ::tagconf::__private::FieldTags {
                key: #key,
                yaml: #yaml,
                json: #json,
                toml: #toml,
            },
            exported: #exported,
            env_strict: #env_strict,
            default: #default,
            nested: #nested,
            kind: #kind,
        }
    }
}

fn field_node(field: &ConfigField) -> TokenStream {
    let ident = &field.ident;
    if field.attrs.leaf {
        quote!(::tagconf::__private::NodeRef::Leaf)
    } else {
        quote!(::tagconf::__private::Node::node(&self.#ident))
    }
}

fn field_defaults(field: &ConfigField) -> TokenStream {
    let ident = &field.ident;
    let name = field.name();
    let ty = &field.ty;

    let assign = field.attrs.default.as_deref().map(|literal| match option_inner(ty) {
        Some(inner) => quote! {
            self.#ident = ::core::option::Option::Some(
                ::tagconf::__private::parse_default::<#inner>(#name, #literal)?,
            );
        },
        None => quote! {
            self.#ident = ::tagconf::__private::parse_default::<#ty>(#name, #literal)?;
        },
    });

    let recurse = (!field.attrs.leaf).then(|| {
        quote! {
            ::tagconf::__private::Node::apply_defaults(&mut self.#ident)?;
        }
    });

    quote! {
        #assign
        #recurse
    }
}

fn opt_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    }
}
