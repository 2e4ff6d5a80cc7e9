//! Parsing utilities for the `Config` derive.
//!
//! This module reads `#[config(...)]` and the relevant `#[serde(...)]`
//! attributes off a struct and its fields.

use proc_macro2::TokenStream;
use syn::{
    meta::ParseNestedMeta, spanned::Spanned, Attribute, Data, DeriveInput, Fields,
    GenericArgument, Ident, LitStr, PathArguments, Token, Type, Visibility,
};

/// Value of `env = "..."` that marks a field environment-mandatory.
const ENV_STRICT: &str = "strict";

/// Types a default literal cannot be parsed into.
const NO_FROM_STR: &[&str] = &[
    "Duration", "Vec", "VecDeque", "HashMap", "BTreeMap", "HashSet", "BTreeSet",
];

/// Parsed container attributes.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Whether validation goes through `SelfValidate` instead of rules.
    pub self_validate: bool,
}

impl ContainerAttrs {
    /// Parses the attributes of the struct itself.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs {
            if attr.path().is_ident("config") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("self_validate") {
                        out.self_validate = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown config container attribute"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        return Err(meta.error(
                            "serde(rename_all) is not supported on Config types; \
                             name fields with #[config(key = \"...\")] instead",
                        ));
                    }
                    skip_value(&meta)
                })?;
            }
        }

        Ok(out)
    }
}

/// Parsed field attributes.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Primary mapping.
    pub key: Option<String>,
    /// YAML family name.
    pub yaml: Option<String>,
    /// JSON family name.
    pub json: Option<String>,
    /// TOML family name.
    pub toml: Option<String>,
    /// `env = "strict"` is present.
    pub env_strict: bool,
    /// Default literal.
    pub default: Option<String>,
    /// The field type is treated as an opaque leaf.
    pub leaf: bool,
    /// `#[serde(rename = "...")]`.
    pub serde_rename: Option<String>,
}

impl FieldAttrs {
    /// Parses the attributes of one field.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs {
            if attr.path().is_ident("config") {
                attr.parse_nested_meta(|meta| out.parse_config(&meta))?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| out.parse_serde(&meta))?;
            }
        }

        Ok(out)
    }

    fn parse_config(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        let name = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        match name.as_str() {
            "key" => self.key = Some(string_value(meta)?),
            "yaml" => self.yaml = Some(string_value(meta)?),
            "json" => self.json = Some(string_value(meta)?),
            "toml" => self.toml = Some(string_value(meta)?),
            "default" => self.default = Some(string_value(meta)?),
            "leaf" => self.leaf = true,
            "env" => {
                let value = meta.value()?.parse::<LitStr>()?;
                if value.value() != ENV_STRICT {
                    return Err(syn::Error::new(
                        value.span(),
                        format!("expected env = \"{ENV_STRICT}\""),
                    ));
                }
                self.env_strict = true;
            }
            _ => return Err(meta.error(format!("unknown config attribute: {name}"))),
        }

        Ok(())
    }

    fn parse_serde(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
            self.serde_rename = Some(string_value(meta)?);
            Ok(())
        } else if meta.path.is_ident("flatten") {
            Err(meta.error("serde(flatten) is not supported on Config fields"))
        } else {
            skip_value(meta)
        }
    }
}

/// One parsed field.
#[derive(Debug)]
pub struct ConfigField {
    /// Field identifier.
    pub ident: Ident,
    /// Field type.
    pub ty: Type,
    /// Whether the field has any `pub` visibility.
    pub exported: bool,
    /// Field attributes.
    pub attrs: FieldAttrs,
}

impl ConfigField {
    /// Identifier as written, without a raw prefix.
    pub fn name(&self) -> String {
        let name = self.ident.to_string();
        name.strip_prefix("r#").map_or(name.clone(), str::to_string)
    }

    /// Name the serde derive uses for this field.
    pub fn serde_name(&self) -> String {
        self.attrs.serde_rename.clone().unwrap_or_else(|| self.name())
    }
}

/// A parsed `#[derive(Config)]` input.
#[derive(Debug)]
pub struct ConfigStruct {
    /// Struct name.
    pub ident: Ident,
    /// Container attributes.
    pub attrs: ContainerAttrs,
    /// Named fields in declaration order.
    pub fields: Vec<ConfigField>,
}

impl ConfigStruct {
    /// Parses a derive input.
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "Config cannot be derived for generic types",
            ));
        }

        let data = match &input.data {
            Data::Struct(data) => data,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span(),
                    "Config can only be derived for structs with named fields",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span(),
                    "Config can only be derived for structs with named fields",
                ))
            }
        };

        let named = match &data.fields {
            Fields::Named(named) => named,
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "Config can only be derived for structs with named fields",
                ))
            }
        };

        let fields = named
            .named
            .iter()
            .map(|field| {
                let ident = field
                    .ident
                    .clone()
                    .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
                let attrs = FieldAttrs::from_attrs(&field.attrs)?;
                if attrs.default.is_some() {
                    check_default_type(&field.ty)?;
                }
                Ok(ConfigField {
                    ident,
                    ty: field.ty.clone(),
                    exported: !matches!(field.vis, Visibility::Inherited),
                    attrs,
                })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            ident: input.ident.clone(),
            attrs: ContainerAttrs::from_attrs(&input.attrs)?,
            fields,
        })
    }
}

/// Returns the inner type if `ty` is `Option<T>`.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Rejects `default` on types whose values are not parsed from a literal.
fn check_default_type(ty: &Type) -> syn::Result<()> {
    let target = option_inner(ty).unwrap_or(ty);
    let name = match target {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .filter(|ident| NO_FROM_STR.contains(&ident.as_str())),
        Type::Array(_) | Type::Slice(_) | Type::Tuple(_) => Some("this type".to_string()),
        _ => None,
    };

    match name {
        Some(name) => Err(syn::Error::new(
            target.span(),
            format!(
                "`default` needs a type that implements FromStr, and {name} does not; \
                 set the value in the Default impl instead"
            ),
        )),
        None => Ok(()),
    }
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// Consumes the value of an attribute this derive does not interpret.
fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream>()?;
    }
    Ok(())
}
