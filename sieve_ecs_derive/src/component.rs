use quote::{format_ident, quote};
use proc_macro::TokenStream;
use syn::{parse_quote, DeriveInput};

pub fn impl_component(mut ast: DeriveInput) -> TokenStream {
    let name = ast.ident.clone();

    // Generic components can't share a single cached id, every instantiation
    // resolves its own through the registry.
    if !ast.generics.params.is_empty() {
        let params: Vec<_> = ast.generics.type_params().map(|p| p.ident.clone()).collect();
        let where_clause = ast.generics.make_where_clause();
        for param in params {
            where_clause.predicates.push(parse_quote!(#param: 'static));
        }

        let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
        let gen = quote! {
            impl #impl_generics sieve_ecs::components::Component for #name #ty_generics #where_clause {}
        };
        return gen.into();
    }

    let name_str = name.to_string().to_uppercase();
    let id_name = format_ident!("__COMPONENT_ID_OF_{}", name_str);

    let gen = quote! {
        sieve_ecs::lazy_static! {
            static ref #id_name: sieve_ecs::components::ComponentId =
                sieve_ecs::components::ComponentId::register::<#name>();
        }

        impl sieve_ecs::components::Component for #name {
            #[inline(always)]
            fn component_id() -> sieve_ecs::components::ComponentId {
                *#id_name
            }
        }
    };
    gen.into()
}
