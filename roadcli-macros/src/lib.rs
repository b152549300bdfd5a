use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derives `roadcli::FromContext` for a struct with named fields.
///
/// # Usage
///
/// ```ignore
/// #[derive(FromContext)]
/// struct GreetArgs {
///     name: String,
///     count: i64,
///     #[roadcli(name = "dry-run")]
///     dry_run: bool,
///     target: Option<String>,
/// }
/// ```
///
/// This will generate:
///
/// ```ignore
/// impl roadcli::FromContext for GreetArgs {
///     fn from_context(ctx: &roadcli::Context<'_>) -> Result<Self, roadcli::ParseError> {
///         Ok(Self {
///             name: ctx.field::<String>("name")?,
///             count: ctx.field::<i64>("count")?,
///             dry_run: ctx.field::<bool>("dry-run")?,
///             target: ctx.field::<Option<String>>("target")?,
///         })
///     }
/// }
/// ```
///
/// Each field is looked up among the context's options first, then its
/// arguments.
#[proc_macro_derive(FromContext, attributes(roadcli))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "FromContext requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "FromContext can only be derived for structs",
            ))
        }
    };

    let assignments = fields
        .iter()
        .map(|field| -> syn::Result<proc_macro2::TokenStream> {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let ty = &field.ty;
            let key = match extract_name(&field.attrs)? {
                Some(name) => name,
                None => ident.to_string().trim_start_matches("r#").to_string(),
            };
            Ok(quote! {
                #ident: ctx.field::<#ty>(#key)?
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::roadcli::FromContext for #struct_name #ty_generics #where_clause {
            fn from_context(
                ctx: &::roadcli::Context<'_>,
            ) -> ::core::result::Result<Self, ::roadcli::ParseError> {
                ::core::result::Result::Ok(Self {
                    #(#assignments,)*
                })
            }
        }
    })
}

/// Extract the looked-up key from #[roadcli(name = "...")]
fn extract_name(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("roadcli") {
            continue;
        }
        let meta_list = attr.meta.require_list()?;
        let nv: syn::MetaNameValue = syn::parse2(meta_list.tokens.clone())?;
        if !nv.path.is_ident("name") {
            return Err(syn::Error::new_spanned(
                &nv.path,
                "unknown roadcli attribute, expected `name = \"...\"`",
            ));
        }
        if let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nv.value
        {
            return Ok(Some(lit.value()));
        }
        return Err(syn::Error::new_spanned(&nv.value, "expected a string literal"));
    }
    Ok(None)
}
