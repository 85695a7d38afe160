use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    braced, parenthesized, token, Attribute, Expr, Ident, LitInt, LitStr, Path, Result, Token,
    Type, Visibility,
};

pub struct Input {
    _paren_token: token::Paren,
    pub crate_path: Path,
    _comma_token: Token![,],
    pub structs: Vec<Struct>,
}

impl Parse for Input {
    fn parse(input: ParseStream) -> Result<Self> {
        let content;
        Ok(Input {
            _paren_token: parenthesized!(content in input),
            crate_path: content.parse()?,
            _comma_token: content.parse()?,
            structs: {
                let mut structs = Vec::new();
                while !content.is_empty() {
                    structs.push(content.parse()?);
                }
                structs
            },
        })
    }
}

pub struct Struct {
    pub attrs: Vec<Attribute>,
    pub visibility: Visibility,
    _struct_token: Token![struct],
    pub name: Ident,
    _colon_token: Token![:],
    pub unit: Type,
    _brace_token: token::Brace,
    pub fields: Punctuated<Field, Token![,]>,
}

impl Parse for Struct {
    fn parse(input: ParseStream) -> Result<Self> {
        let body;
        Ok(Self {
            attrs: input.call(Attribute::parse_outer)?,
            visibility: input.parse()?,
            _struct_token: input.parse()?,
            name: input.parse()?,
            _colon_token: input.parse()?,
            unit: input.parse()?,
            _brace_token: braced!(body in input),
            fields: body.parse_terminated(Field::parse, Token![,])?,
        })
    }
}

pub struct Field {
    pub attrs: Vec<Attribute>,
    pub visibility: Visibility,
    pub const_token: Option<Token![const]>,
    pub name: FieldName,
    _colon_token: Token![:],
    pub width: LitInt,
    pub default: Option<FieldDefault>,
}

impl Field {
    pub fn ident(&self) -> Option<&Ident> {
        match &self.name {
            FieldName::Ident(ident) => Some(ident),
            FieldName::Placeholder(_) => None,
        }
    }

    pub fn name_span(&self) -> Span {
        match &self.name {
            FieldName::Ident(ident) => ident.span(),
            FieldName::Placeholder(underscore) => underscore.span(),
        }
    }
}

impl Parse for Field {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            attrs: input.call(Attribute::parse_outer)?,
            visibility: input.parse()?,
            const_token: input.parse()?,
            name: input.parse()?,
            _colon_token: input.parse()?,
            width: input.parse()?,
            default: if input.peek(Token![=]) {
                Some(input.parse()?)
            } else {
                None
            },
        })
    }
}

pub enum FieldName {
    Ident(Ident),
    Placeholder(Token![_]),
}

impl Parse for FieldName {
    fn parse(input: ParseStream) -> Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(Ident) {
            input.parse().map(Self::Ident)
        } else if lookahead.peek(Token![_]) {
            input.parse().map(Self::Placeholder)
        } else {
            Err(lookahead.error())
        }
    }
}

pub struct FieldDefault {
    _eq_token: Token![=],
    pub value: Expr,
}

impl Parse for FieldDefault {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            _eq_token: input.parse()?,
            value: input.parse()?,
        })
    }
}

/// The argument of a `#[tag(...)]` field attribute.
#[derive(Clone)]
pub enum TagArg {
    Str(LitStr),
    Path(Path),
}

impl TagArg {
    pub fn span(&self) -> Span {
        match self {
            TagArg::Str(lit) => lit.span(),
            TagArg::Path(path) => path.span(),
        }
    }
}

impl Parse for TagArg {
    fn parse(input: ParseStream) -> Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(LitStr) {
            input.parse().map(Self::Str)
        } else if lookahead.peek(Ident) || lookahead.peek(Token![::]) {
            input.parse().map(Self::Path)
        } else {
            Err(lookahead.error())
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::parse::Parser;

    use super::*;

    #[test]
    fn struct_empty() {
        let input = quote! { struct Foo: u8 {} };
        let Struct {
            attrs,
            visibility,
            name,
            unit,
            fields,
            ..
        } = syn::parse2(input).unwrap();
        assert!(attrs.is_empty());
        assert_eq!(quote! { #visibility }.to_string(), "");
        assert_eq!(name.to_string(), "Foo");
        assert_eq!(quote! { #unit }.to_string(), "u8");
        assert_eq!(fields.len(), 0);
    }

    #[test]
    fn struct_everything() {
        let input = quote! {
            /// this has a doc comment
            #[tags(Reg)]
            pub(crate) struct Bar: ::ordbits::Octet {
                a: 1,
                _: 0,
            }
        };
        let Struct {
            attrs,
            visibility,
            unit,
            fields,
            ..
        } = syn::parse2(input).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(quote! { #visibility }.to_string(), "pub (crate)");
        assert_eq!(quote! { #unit }.to_string(), ":: ordbits :: Octet");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn field_plain() {
        let input = quote! { my_field: 5 };
        let field: Field = syn::parse2(input).unwrap();
        assert!(field.attrs.is_empty());
        assert!(matches!(field.visibility, Visibility::Inherited));
        assert!(field.const_token.is_none());
        assert_eq!(field.ident().unwrap().to_string(), "my_field");
        assert_eq!(field.width.base10_digits(), "5");
        assert!(field.default.is_none());
    }

    #[test]
    fn field_everything() {
        let input = quote! { #[tag("MF")] pub(crate) const my_field: 5 = -(1 << 2) };
        let field: Field = syn::parse2(input).unwrap();
        assert_eq!(field.attrs.len(), 1);
        let visibility = &field.visibility;
        assert_eq!(quote! { #visibility }.to_string(), "pub (crate)");
        assert!(field.const_token.is_some());
        let value = &field.default.as_ref().unwrap().value;
        assert_eq!(quote! { #value }.to_string(), "- (1 << 2)");
    }

    #[test]
    fn field_padding() {
        let field: Field = syn::parse2(quote! { _: 0 }).unwrap();
        assert!(field.ident().is_none());
        assert_eq!(field.width.base10_digits(), "0");
    }

    #[test]
    fn field_default_stops_at_comma() {
        let fields = Punctuated::<Field, Token![,]>::parse_terminated
            .parse2(quote! { a: 3 = 1 + 1, b: 2 })
            .unwrap();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn tag_args() {
        assert!(matches!(
            syn::parse2(quote! { "x" }).unwrap(),
            TagArg::Str(_)
        ));
        assert!(matches!(
            syn::parse2(quote! { Reg::Mode }).unwrap(),
            TagArg::Path(_)
        ));
        assert!(syn::parse2::<TagArg>(quote! { 3 }).is_err());
    }
}
