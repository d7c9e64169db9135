use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Visibility, parse_macro_input};

/// Derive macro for record field mapping.
///
/// Generates three impls on the annotated struct:
///
/// - `fieldmap::Record`: field table (visible fields only, declaration
///   order) and indexed slot access.
/// - `fieldmap::FieldValue`, so the record can be nested in other records,
///   `Option`, `Box` and `Vec`.
/// - `fieldmap::AsRecord`.
///
/// Only `pub` fields take part. The struct must implement `Default`, `Clone`
/// and `Debug`, and be `Send + Sync + 'static`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Debug, Default, Clone)]
/// #[record(decode)]
/// pub struct Account {
///     #[tag(json = "id", db = "account_id")]
///     pub id: i64,
///
///     #[tag(json = "owner,omitempty")]
///     pub owner: Option<String>,
///
///     secret: String, // not visible
/// }
/// ```
///
/// Struct options in `#[record(...)]`:
/// - `encode`: extract through the type's `MapEncode` impl.
/// - `decode`: inject through the type's `MapDecode` impl.
/// - `column`: scan rows into the type's `Column` impl.
#[proc_macro_derive(Record, attributes(tag, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct RecordOptions {
    encode: bool,
    decode: bool,
    column: bool,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Err(syn::Error::new_spanned(name, "Record does not support unit structs")),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let options = parse_record_options(input)?;

    let mut def_tokens = Vec::new();
    let mut ref_arms = Vec::new();
    let mut mut_arms = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "expected named field")
        })?;

        // Parse #[tag(scheme = "decl", ...)] even on hidden fields, so typos
        // are reported.
        let mut tags: Vec<(String, String)> = Vec::new();
        for attr in &field.attrs {
            if !attr.path().is_ident("tag") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let scheme = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a scheme name"))?
                    .to_string();
                let decl: LitStr = meta.value()?.parse()?;
                if tags.iter().any(|(s, _)| *s == scheme) {
                    return Err(meta.error(format!("duplicate scheme '{scheme}'")));
                }
                tags.push((scheme, decl.value()));
                Ok(())
            })?;
        }

        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }

        let index = Literal::usize_unsuffixed(def_tokens.len());
        let field_name_str = field_name.to_string();
        let schemes = tags.iter().map(|(s, _)| s);
        let decls = tags.iter().map(|(_, d)| d);

        def_tokens.push(quote! {
            ::fieldmap::FieldDef {
                name: #field_name_str,
                tags: &[#((#schemes, #decls)),*],
            }
        });
        ref_arms.push(quote! { #index => ::core::option::Option::Some(&self.#field_name) });
        mut_arms.push(quote! { #index => ::core::option::Option::Some(&mut self.#field_name) });
    }

    let to_value = if options.encode {
        quote! { ::fieldmap::extract::encode_hook(self) }
    } else {
        quote! { ::fieldmap::extract::extract_record(self, scheme) }
    };

    let decode = options.decode.then(|| {
        quote! {
            fn decode(value: ::fieldmap::Value) -> ::fieldmap::Step<Self> {
                ::fieldmap::coerce::decode_hook(value)
            }
        }
    });

    let column = options.column.then(|| {
        quote! {
            fn column() -> ::core::option::Option<::std::boxed::Box<dyn ::fieldmap::Column>> {
                ::core::option::Option::Some(
                    ::std::boxed::Box::new(<Self as ::fieldmap::FieldValue>::zero())
                        as ::std::boxed::Box<dyn ::fieldmap::Column>,
                )
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::fieldmap::Record for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #name_str
            }

            fn fields(&self) -> &'static [::fieldmap::FieldDef] {
                const FIELDS: &[::fieldmap::FieldDef] = &[
                    #(#def_tokens),*
                ];
                FIELDS
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::fieldmap::Slot> {
                match index {
                    #(#ref_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::fieldmap::Slot> {
                match index {
                    #(#mut_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl #impl_generics ::fieldmap::FieldValue for #name #ty_generics #where_clause {
            fn kind() -> ::fieldmap::Kind {
                ::fieldmap::Kind::Record(#name_str)
            }

            fn zero() -> Self {
                ::core::default::Default::default()
            }

            #[allow(unused_variables)]
            fn to_value(&self, scheme: &str) -> ::fieldmap::Value {
                #to_value
            }

            fn to_raw(&self) -> ::fieldmap::Value {
                ::fieldmap::Value::record(::core::clone::Clone::clone(self))
            }

            fn exact(value: ::fieldmap::Value) -> ::fieldmap::Step<Self> {
                ::fieldmap::coerce::record_exact(value)
            }

            #decode

            fn nested(value: ::fieldmap::Value, scheme: &str) -> ::fieldmap::Step<Self> {
                ::fieldmap::coerce::record_nested(value, scheme)
            }

            fn deflate(
                mapped: &::fieldmap::Mapped,
                scheme: &str,
            ) -> ::core::option::Option<::core::result::Result<Self, ::fieldmap::FillError>> {
                ::core::option::Option::Some(::fieldmap::fill::deflate_into_zero(mapped, scheme))
            }

            fn flatten(&self, out: &mut ::fieldmap::Mapped, scheme: &str) {
                ::fieldmap::mapper::flatten_into(self, out, scheme)
            }

            #column
        }

        impl #impl_generics ::fieldmap::AsRecord for #name #ty_generics #where_clause {
            fn as_record(&self) -> ::core::option::Option<&dyn ::fieldmap::Record> {
                ::core::option::Option::Some(self)
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// Parse struct-level `#[record(encode, decode, column)]`.
fn parse_record_options(input: &DeriveInput) -> Result<RecordOptions, syn::Error> {
    let mut options = RecordOptions::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("encode") {
                options.encode = true;
            } else if meta.path.is_ident("decode") {
                options.decode = true;
            } else if meta.path.is_ident("column") {
                options.column = true;
            } else {
                return Err(meta.error("unknown record option (expected 'encode', 'decode' or 'column')"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}
