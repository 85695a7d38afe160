use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{Path, Result, Type};

use crate::ast::{self, Input};
use crate::check::{check, Checked, CheckedField, TagScheme};

struct Config {
    crate_path: Path,
}

pub fn bitfield_impl(input: Input) -> TokenStream {
    let cfg = Config {
        crate_path: input.crate_path,
    };
    let results: Vec<_> = input
        .structs
        .into_iter()
        .map(|struct_| generate_struct(&cfg, struct_))
        .collect();
    quote! { #(#results)* }
}

fn generate_struct(cfg: &Config, input: ast::Struct) -> TokenStream {
    let cloned_name = input.name.clone();
    match generate_struct_impl(cfg, input) {
        Ok(result) => result,
        Err(e) => {
            let compile_error = e.into_compile_error();
            quote! {
                #compile_error
                struct #cloned_name {}
            }
        }
    }
}

fn generate_struct_impl(cfg: &Config, mut input: ast::Struct) -> Result<TokenStream> {
    let Checked {
        scheme,
        attrs,
        fields,
    } = check(&mut input)?;

    let crate_path = &cfg.crate_path;
    let name = &input.name;
    let visibility = &input.visibility;
    let unit = &input.unit;
    let tag_type = scheme.tag_type();
    let field_count = Literal::usize_unsuffixed(fields.len());

    let widths: Vec<_> = fields
        .iter()
        .map(|field| {
            let mut literal = Literal::u32_unsuffixed(field.width);
            literal.set_span(field.width_span);
            literal
        })
        .collect();
    let storage_len = quote! {
        #crate_path::__private::storage_len::<#unit>(&[#(#widths),*])
    };
    let array = quote! { [#unit; #storage_len] };

    let descs = fields
        .iter()
        .zip(&widths)
        .map(|(field, width)| field_desc(cfg, &tag_type, field, width));

    let index_fn = generate_index(cfg, &scheme, &fields);
    let padding_check = generate_padding_check(cfg, &scheme, &fields);

    let mut accessors = Vec::new();
    let mut trait_impls = Vec::new();
    let mut debug_fields = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let Some(named) = &field.named else { continue };
        let index = Literal::usize_unsuffixed(i);
        accessors.push(generate_accessors(cfg, unit, &index, field));
        trait_impls.push(generate_field_at(cfg, name, unit, &index, field.fixed));

        let ident = &named.ident;
        let label = ident.to_string();
        let label = label.trim_start_matches("r#");
        debug_fields.push(quote! { .field(#label, &self.#ident()) });
    }
    let name_str = name.to_string();

    Ok(quote! {
        #[derive(
            ::core::clone::Clone,
            ::core::marker::Copy,
            ::core::cmp::PartialEq,
            ::core::cmp::Eq,
            ::core::hash::Hash,
        )]
        #[repr(transparent)]
        #(#attrs)*
        #visibility struct #name {
            data: [#unit; #storage_len],
        }

        #[allow(dead_code)]
        impl #name {
            /// The computed placement of every field.
            pub const LAYOUT: #crate_path::Layout<#tag_type, #unit, #field_count> =
                #crate_path::Layout::new(&[#(#descs),*]);

            /// The number of storage units.
            pub const DATA_SIZE: usize = #storage_len;

            /// Returns the number of storage units.
            #[inline(always)]
            #[must_use]
            pub const fn data_size() -> usize {
                Self::DATA_SIZE
            }

            /// Creates a value holding every field's default.
            #[inline(always)]
            #[must_use]
            pub const fn new() -> Self {
                const BYTES: usize = #storage_len * ::core::mem::size_of::<#unit>();
                const DATA: [u8; BYTES] = #name::LAYOUT.init_bytes::<BYTES>();
                // SAFETY: The struct is a transparent wrapper around an array
                // of `Pod` units that is exactly `BYTES` long, and
                // `init_bytes` lays the units out in native byte order.
                unsafe { ::core::mem::transmute::<[u8; BYTES], Self>(DATA) }
            }

            /// Wraps raw storage units.
            #[inline(always)]
            #[must_use]
            pub const fn from_data(data: #array) -> Self {
                Self { data }
            }

            /// Returns the raw storage units.
            #[inline(always)]
            #[must_use]
            pub const fn into_data(self) -> #array {
                self.data
            }

            /// Borrows the raw storage units.
            #[inline(always)]
            #[must_use]
            pub const fn data(&self) -> &#array {
                &self.data
            }

            /// Mutably borrows the raw storage units.
            #[inline(always)]
            pub fn data_mut(&mut self) -> &mut #array {
                &mut self.data
            }

            #index_fn

            /// Returns a read-only view of the field at position `I`.
            #[inline(always)]
            #[must_use]
            pub fn get<const I: usize>(&self) -> #crate_path::FieldRef<'_, #unit>
            where
                Self: #crate_path::FieldAt<I, Unit = #unit>,
            {
                <Self as #crate_path::FieldAt<I>>::field(self)
            }

            /// Returns a read/write view of the field at position `I`.
            #[inline(always)]
            pub fn get_mut<const I: usize>(&mut self) -> #crate_path::FieldMut<'_, #unit>
            where
                Self: #crate_path::FieldAtMut<I, Unit = #unit>,
            {
                <Self as #crate_path::FieldAtMut<I>>::field_mut(self)
            }

            #(#accessors)*
        }

        #(#trait_impls)*

        #padding_check

        impl ::core::default::Default for #name {
            #[inline(always)]
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::core::convert::From<#array> for #name {
            #[inline(always)]
            fn from(data: #array) -> Self {
                Self { data }
            }
        }

        impl ::core::convert::From<#name> for #array {
            #[inline(always)]
            fn from(value: #name) -> Self {
                value.data
            }
        }

        impl ::core::fmt::Debug for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(#name_str)
                    #(#debug_fields)*
                    .finish()
            }
        }

        impl #crate_path::Bitfield for #name {
            type Tag = #tag_type;
            type Unit = #unit;

            #[inline(always)]
            fn units(&self) -> &[#unit] {
                &self.data
            }

            #[inline(always)]
            fn units_mut(&mut self) -> &mut [#unit] {
                &mut self.data
            }

            fn position(tag: #tag_type) -> ::core::option::Option<usize> {
                Self::LAYOUT.position(tag)
            }

            fn find(
                &self,
                tag: #tag_type,
            ) -> ::core::result::Result<#crate_path::FieldRef<'_, #unit>, #crate_path::FieldError> {
                Self::LAYOUT.find(&self.data, tag)
            }

            fn find_mut(
                &mut self,
                tag: #tag_type,
            ) -> ::core::result::Result<#crate_path::FieldMut<'_, #unit>, #crate_path::FieldError> {
                Self::LAYOUT.find_mut(&mut self.data, tag)
            }
        }

        // SAFETY: The struct is a transparent wrapper around an array of
        // `Pod` units, and every bit pattern is a valid value.
        unsafe impl #crate_path::__private::bytemuck::Zeroable for #name {}
        unsafe impl #crate_path::__private::bytemuck::Pod for #name {}
    })
}

fn field_desc(
    cfg: &Config,
    tag_type: &TokenStream,
    field: &CheckedField,
    width: &Literal,
) -> TokenStream {
    let crate_path = &cfg.crate_path;
    let desc = quote! { #crate_path::FieldDesc::<#tag_type> };
    let default = field
        .default
        .as_ref()
        .map(|value| quote! { (#value) as i128 });
    match (&field.named, field.fixed, default) {
        (None, _, _) => quote! { #desc::padding(#width) },
        (Some(named), true, default) => {
            let tag = &named.tag;
            let default = default.unwrap_or_else(|| quote! { 0 });
            quote! { #desc::fixed(#tag, #width, #default) }
        }
        (Some(named), false, Some(default)) => {
            let tag = &named.tag;
            quote! { #desc::new(#tag, #width).with_default(#default) }
        }
        (Some(named), false, None) => {
            let tag = &named.tag;
            quote! { #desc::new(#tag, #width) }
        }
    }
}

/// Generates the const tag-to-position lookup.
fn generate_index(cfg: &Config, scheme: &TagScheme, fields: &[CheckedField]) -> TokenStream {
    let crate_path = &cfg.crate_path;
    let named = fields.iter().enumerate().filter_map(|(i, field)| {
        field
            .named
            .as_ref()
            .map(|named| (Literal::usize_unsuffixed(i), &named.tag))
    });
    let doc = "Returns the position of the field tagged `tag`.\n\n\
        Unknown tags panic with \"field not found\", which is a compile error \
        in a constant.";

    match scheme {
        TagScheme::Str => {
            let arms = named.map(|(i, tag)| {
                quote! {
                    if #crate_path::__private::str_eq(tag, #tag) {
                        return #i;
                    }
                }
            });
            quote! {
                #[doc = #doc]
                #[must_use]
                #[allow(unused_variables)]
                pub const fn index(tag: &str) -> usize {
                    #(#arms)*
                    ::core::panic!("field not found")
                }
            }
        }
        TagScheme::Enum(path) => {
            let arms = named.map(|(i, tag)| quote! { #tag => #i, });
            quote! {
                #[doc = #doc]
                #[must_use]
                #[allow(unreachable_patterns)]
                pub const fn index(tag: #path) -> usize {
                    match tag {
                        #(#arms)*
                        _ => ::core::panic!("field not found"),
                    }
                }
            }
        }
    }
}

/// Rejects enum-tagged fields whose tag is the enum's padding tag, since
/// lookups would never find them.
fn generate_padding_check(
    cfg: &Config,
    scheme: &TagScheme,
    fields: &[CheckedField],
) -> TokenStream {
    let TagScheme::Enum(path) = scheme else {
        return TokenStream::new();
    };
    let tags: Vec<_> = fields
        .iter()
        .filter_map(|field| field.named.as_ref().map(|named| &named.tag))
        .collect();
    if tags.is_empty() {
        return TokenStream::new();
    }
    let crate_path = &cfg.crate_path;
    quote! {
        const _: () = ::core::assert!(
            !::core::matches!(<#path as #crate_path::Tag>::PADDING, #(#tags)|*),
            "a named field carries the padding tag",
        );
    }
}

fn generate_accessors(
    cfg: &Config,
    unit: &Type,
    index: &Literal,
    field: &CheckedField,
) -> TokenStream {
    let crate_path = &cfg.crate_path;
    let Some(named) = &field.named else {
        return TokenStream::new();
    };
    let attrs = &field.attrs;
    let visibility = &field.visibility;
    let ident = &named.ident;
    let name = ident.to_string();
    let name = name.trim_start_matches("r#");
    let span = ident.span();

    let get_method = {
        let doc = if attrs.iter().any(|attr| attr.path().is_ident("doc")) {
            TokenStream::new()
        } else {
            let doc = format!("Returns a read-only view of the `{name}` field.");
            quote! { #[doc = #doc] }
        };
        quote! {
            #(#attrs)*
            #doc
            #[inline(always)]
            #[must_use]
            #visibility fn #ident(&self) -> #crate_path::FieldRef<'_, #unit> {
                <Self as #crate_path::FieldAt<#index>>::field(self)
            }
        }
    };

    if field.fixed {
        return get_method;
    }

    let mut_method_name = format_ident!("{}_mut", name, span = span);
    let with_method_name = format_ident!("with_{}", name, span = span);

    let mut_method = {
        let doc = format!("Returns a read/write view of the `{name}` field.");
        quote! {
            #[doc = #doc]
            #[inline(always)]
            #visibility fn #mut_method_name(&mut self) -> #crate_path::FieldMut<'_, #unit> {
                <Self as #crate_path::FieldAtMut<#index>>::field_mut(self)
            }
        }
    };

    let with_method = {
        let doc = format!("Returns a copy with the `{name}` field set to `value`.");
        quote! {
            #[doc = #doc]
            #[inline(always)]
            #[must_use]
            #visibility fn #with_method_name(mut self, value: #unit) -> Self {
                self.#mut_method_name().set(value);
                self
            }
        }
    };

    quote! {
        #get_method
        #mut_method
        #with_method
    }
}

fn generate_field_at(
    cfg: &Config,
    name: &syn::Ident,
    unit: &Type,
    index: &Literal,
    fixed: bool,
) -> TokenStream {
    let crate_path = &cfg.crate_path;
    let private = quote! { #crate_path::__private };

    let field_at = quote! {
        impl #crate_path::FieldAt<#index> for #name {
            type Unit = #unit;

            #[inline(always)]
            fn field(&self) -> #crate_path::FieldRef<'_, #unit> {
                #private::field_ref(
                    &self.data[const { Self::LAYOUT.unit_index(#index) }],
                    const { Self::LAYOUT.shift(#index) },
                    const { Self::LAYOUT.masked_width(#index) },
                )
            }
        }
    };
    if fixed {
        return field_at;
    }

    quote! {
        #field_at

        impl #crate_path::FieldAtMut<#index> for #name {
            #[inline(always)]
            fn field_mut(&mut self) -> #crate_path::FieldMut<'_, #unit> {
                #private::field_mut(
                    &mut self.data[const { Self::LAYOUT.unit_index(#index) }],
                    const { Self::LAYOUT.shift(#index) },
                    const { Self::LAYOUT.masked_width(#index) },
                )
            }
        }
    }
}
