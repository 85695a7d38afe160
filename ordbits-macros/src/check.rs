use std::collections::{HashMap, HashSet};

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, ToTokens};
use syn::spanned::Spanned;
use syn::{Attribute, Error, Expr, Ident, LitStr, Path, Result, Visibility};

use crate::ast::{self, TagArg};

/// Names of generated inherent items that fields may not reuse.
const RESERVED_NAMES: &[&str] = &[
    "DATA_SIZE",
    "LAYOUT",
    "data",
    "data_mut",
    "data_size",
    "from_data",
    "get",
    "get_mut",
    "index",
    "into_data",
    "new",
];

/// Accumulates errors so one expansion can report all of them.
#[derive(Default)]
pub struct Errors {
    error: Option<Error>,
}

impl Errors {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, e: Error) {
        match &mut self.error {
            None => self.error = Some(e),
            Some(error) => error.combine(e),
        }
    }

    pub fn record<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ToTokens for Errors {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        if let Some(error) = &self.error {
            tokens.extend(error.to_compile_error());
        }
    }
}

/// How a struct's fields are tagged.
pub enum TagScheme {
    Str,
    Enum(Path),
}

impl TagScheme {
    pub fn tag_type(&self) -> TokenStream {
        match self {
            TagScheme::Str => quote! { &'static str },
            TagScheme::Enum(path) => quote! { #path },
        }
    }
}

/// A tag value as it appears in generated code.
pub enum TagValue {
    Str(LitStr),
    Path(Path),
}

impl TagValue {
    /// A key identifying the tag for duplicate detection.
    fn key(&self) -> String {
        match self {
            TagValue::Str(lit) => format!("{:?}", lit.value()),
            TagValue::Path(path) => path.to_token_stream().to_string(),
        }
    }
}

impl ToTokens for TagValue {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            TagValue::Str(lit) => lit.to_tokens(tokens),
            TagValue::Path(path) => path.to_tokens(tokens),
        }
    }
}

pub struct Checked {
    pub scheme: TagScheme,
    pub attrs: Vec<Attribute>,
    pub fields: Vec<CheckedField>,
}

pub struct CheckedField {
    pub attrs: Vec<Attribute>,
    pub visibility: Visibility,
    /// `None` for padding.
    pub named: Option<Named>,
    pub width: u32,
    pub width_span: Span,
    pub default: Option<Expr>,
    pub fixed: bool,
}

pub struct Named {
    pub ident: Ident,
    pub tag: TagValue,
}

/// Converts `snake_case` to `UpperCamelCase`.
pub fn upper_camel(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_scheme(attrs: Vec<Attribute>, errors: &mut Errors) -> (TagScheme, Vec<Attribute>) {
    let mut scheme = None;
    let mut other_attrs = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("tags") {
            other_attrs.push(attr);
            continue;
        }
        if scheme.is_some() {
            errors.push(Error::new(
                attr.span(),
                "multiple `#[tags]` attributes are not allowed",
            ));
            continue;
        }
        if let Some(path) = errors.record(attr.parse_args::<Path>()) {
            scheme = Some(TagScheme::Enum(path));
        }
    }
    (scheme.unwrap_or(TagScheme::Str), other_attrs)
}

fn field_tag(
    scheme: &TagScheme,
    ident: &Ident,
    tag_attr: Option<TagArg>,
) -> Result<TagValue> {
    match (scheme, tag_attr) {
        (TagScheme::Str, None) => Ok(TagValue::Str(LitStr::new(
            ident.to_string().trim_start_matches("r#"),
            ident.span(),
        ))),
        (TagScheme::Str, Some(TagArg::Str(lit))) => {
            if lit.value().is_empty() {
                Err(Error::new(
                    lit.span(),
                    "the empty tag is reserved for padding",
                ))
            } else {
                Ok(TagValue::Str(lit))
            }
        }
        (TagScheme::Enum(path), None) => {
            let variant = format_ident!("{}", upper_camel(&ident.to_string()), span = ident.span());
            let mut path = path.clone();
            path.segments.push(variant.into());
            Ok(TagValue::Path(path))
        }
        (TagScheme::Enum(_), Some(TagArg::Path(path))) => Ok(TagValue::Path(path)),
        (TagScheme::Str, Some(arg)) => Err(Error::new(
            arg.span(),
            "expected a string tag; use `#[tags(Enum)]` on the struct for enum tags",
        )),
        (TagScheme::Enum(_), Some(arg)) => {
            Err(Error::new(arg.span(), "expected an enum variant path"))
        }
    }
}

/// Returns a field name without its raw-identifier prefix.
fn unraw(ident: &Ident) -> String {
    ident.to_string().trim_start_matches("r#").to_string()
}

fn check_field(
    scheme: &TagScheme,
    field: ast::Field,
    declared: &HashSet<String>,
    names: &mut HashMap<String, Span>,
    tags: &mut HashMap<String, Span>,
    errors: &mut Errors,
) -> Option<CheckedField> {
    let name_span = field.name_span();
    let width_span = field.width.span();
    let width = errors.record(field.width.base10_parse::<u32>());

    let mut tag_attr = None;
    let mut attrs = Vec::new();
    for attr in field.attrs {
        if !attr.path().is_ident("tag") {
            attrs.push(attr);
        } else if tag_attr.is_some() {
            errors.push(Error::new(
                attr.span(),
                "multiple `#[tag]` attributes are not allowed",
            ));
        } else {
            tag_attr = errors.record(attr.parse_args::<TagArg>());
        }
    }

    let default = field.default.map(|d| d.value);
    let named = match field.name {
        ast::FieldName::Ident(ident) => {
            let name = ident.to_string();
            if RESERVED_NAMES.contains(&name.as_str()) {
                errors.push(Error::new(
                    ident.span(),
                    format!("`{name}` conflicts with a generated method"),
                ));
            }
            if names.insert(name.clone(), ident.span()).is_some() {
                errors.push(Error::new(
                    ident.span(),
                    format!("duplicate field name `{name}`"),
                ));
            }
            if width == Some(0) {
                errors.push(Error::new(
                    width_span,
                    "named fields must have a nonzero width; use `_: 0` for a unit break",
                ));
            }
            if field.const_token.is_none() {
                let plain = unraw(&ident);
                for generated in [format!("{plain}_mut"), format!("with_{plain}")] {
                    if declared.contains(&generated) {
                        errors.push(Error::new(
                            ident.span(),
                            format!("`{generated}`, generated for `{plain}`, is also a field name"),
                        ));
                    }
                }
            }
            let tag = errors.record(field_tag(scheme, &ident, tag_attr))?;
            if tags.insert(tag.key(), ident.span()).is_some() {
                errors.push(Error::new(
                    ident.span(),
                    format!("duplicate tag `{}`", tag.to_token_stream()),
                ));
            }
            Some(Named { ident, tag })
        }
        ast::FieldName::Placeholder(_) => {
            if let Some(tag_attr) = tag_attr {
                errors.push(Error::new(tag_attr.span(), "padding cannot have a tag"));
            }
            if let Some(default) = &default {
                errors.push(Error::new(
                    default.span(),
                    "padding cannot have a default value",
                ));
            }
            if let Some(const_token) = &field.const_token {
                errors.push(Error::new(
                    const_token.span(),
                    "padding is always fixed",
                ));
            }
            if !matches!(field.visibility, Visibility::Inherited) {
                errors.push(Error::new(
                    field.visibility.span(),
                    "padding has no accessors",
                ));
            }
            if !attrs.is_empty() {
                errors.push(Error::new(name_span, "padding cannot have attributes"));
            }
            None
        }
    };

    Some(CheckedField {
        attrs,
        visibility: field.visibility,
        fixed: named.is_none() || field.const_token.is_some(),
        named,
        width: width?,
        width_span,
        default,
    })
}

/// Validates a struct declaration, reporting every problem found.
pub fn check(input: &mut ast::Struct) -> Result<Checked> {
    let mut errors = Errors::new();
    let (scheme, attrs) = parse_scheme(std::mem::take(&mut input.attrs), &mut errors);

    let declared: HashSet<_> = input
        .fields
        .iter()
        .filter_map(ast::Field::ident)
        .map(unraw)
        .collect();
    let mut names = HashMap::new();
    let mut tags = HashMap::new();
    let mut fields = Vec::new();
    for field in std::mem::take(&mut input.fields) {
        let checked = check_field(&scheme, field, &declared, &mut names, &mut tags, &mut errors);
        if let Some(field) = checked {
            fields.push(field);
        }
    }

    errors.finish()?;
    Ok(Checked {
        scheme,
        attrs,
        fields,
    })
}
