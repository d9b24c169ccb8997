extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DataEnum, DataStruct, DataUnion, DeriveInput, Fields};

#[proc_macro_derive(Kind)]
pub fn kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    match input.data {
        Data::Struct(DataStruct { .. }) => quote!(
            impl Kind for #name {
                fn kind(&self) -> String {
                    stringify!(#name).to_string()
                }
            }
        ),
        Data::Enum(DataEnum { variants, .. }) => {
            let q = variants.iter().map(|variant| {
                let v = &variant.ident;
                match variant.fields {
                    Fields::Unnamed(_) => quote! {
                        #name::#v(..) => concat!(stringify!(#name), stringify!(::), stringify!(#v)).to_string()
                    },
                    Fields::Named(_) => quote!{
                        #name::#v{ .. } => concat!(stringify!(#name), stringify!(::), stringify!(#v)).to_string()
                    },
                    Fields::Unit => quote!{
                        #name::#v => concat!(stringify!(#name), stringify!(::), stringify!(#v)).to_string()
                    }
                }
            });
            quote!(
                impl Kind for #name {
                    fn kind(&self) -> String {
                        match self {
                            #(#q),*
                        }
                    }
                }
            )
        }
        Data::Union(DataUnion { .. }) => {
            panic!(
                "kind-derive does not support unions. Implement Kind for {} by hand instead.",
                name
            )
        }
    }
    .into()
}
