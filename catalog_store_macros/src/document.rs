use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Path};

/// Field roles a `Document` implementation needs to locate.
#[derive(Clone, Copy)]
enum Role {
    Id,
    Name,
    Image,
}

impl Role {
    fn marker(self) -> &'static str {
        match self {
            Role::Id => "id",
            Role::Name => "name",
            Role::Image => "image",
        }
    }

    fn default_field(self) -> &'static str {
        match self {
            Role::Id => "id",
            Role::Name => "name",
            Role::Image => "image_ref",
        }
    }
}

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (collection, validate) = parse_struct_attrs(input)?;

    let id_field = find_field(input, Role::Id)?;
    let name_field = find_field(input, Role::Name)?;
    let image_field = find_field(input, Role::Image)?;

    let validate_fn = validate.map(|path| {
        quote! {
            fn validate(&self) -> ::std::result::Result<(), ::std::string::String> {
                #path(self)
            }
        }
    });

    Ok(quote! {
        impl catalog_store::Document for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> ::std::option::Option<&str> {
                self.#id_field.as_deref()
            }

            fn set_id(&mut self, id: ::std::string::String) {
                self.#id_field = ::std::option::Option::Some(id);
            }

            fn name(&self) -> &str {
                &self.#name_field
            }

            fn image_ref(&self) -> ::std::option::Option<&str> {
                self.#image_field.as_deref()
            }

            fn set_image_ref(&mut self, reference: ::std::option::Option<::std::string::String>) {
                self.#image_field = reference;
            }

            #validate_fn
        }
    })
}

fn parse_struct_attrs(input: &DeriveInput) -> syn::Result<(String, Option<Path>)> {
    let mut collection = None;
    let mut validate = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("validate") {
                let value: LitStr = meta.value()?.parse()?;
                validate = Some(value.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("expected `collection = \"...\"` or `validate = \"...\"`"))
            }
        })?;
    }

    // Default: snake_case struct name + "s"
    let collection =
        collection.unwrap_or_else(|| format!("{}s", to_snake_case(&input.ident.to_string())));

    Ok((collection, validate))
}

fn find_field(input: &DeriveInput, role: Role) -> syn::Result<Ident> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document requires named fields",
        ));
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("document") {
                continue;
            }
            let mut marked = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(role.marker()) {
                    marked = true;
                }
                Ok(())
            })?;
            if marked {
                if let Some(ident) = &field.ident {
                    return Ok(ident.clone());
                }
            }
        }
    }

    for field in &fields.named {
        if let Some(ident) = &field.ident {
            if ident == role.default_field() {
                return Ok(ident.clone());
            }
        }
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        format!(
            "Document derive: no field marked with #[document({})] and no field named `{}`",
            role.marker(),
            role.default_field()
        ),
    ))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
