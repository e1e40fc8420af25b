use crate::attrs::{field_type, FieldInfo, Presence, Target};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

pub(crate) fn derive_builder(target: &Target) -> TokenStream {
    let Target {
        ident,
        vis,
        builder,
        fields,
    } = target;
    let store = format_ident!("{}Store", builder);
    let target_name = ident.to_string();

    // One marker parameter per required field, in declaration order. Markers are numbered so no
    // field name can make two of them, or a marker and `__Out`, coincide.
    let markers: Vec<Ident> = (0..target.required().count())
        .map(|i| format_ident!("__Field{}", i))
        .collect();

    let slot_idents: Vec<&Ident> = fields.iter().map(|f| &f.ident).collect();
    let slot_tys = fields.iter().map(|f| &f.slot_ty);
    let initial = fields.iter().map(|f| match &f.presence {
        Presence::Required | Presence::Optional => quote! { ::core::option::Option::None },
        Presence::Defaulted(None) => {
            quote! { ::core::option::Option::Some(::core::default::Default::default()) }
        }
        Presence::Defaulted(Some(expr)) => quote! { ::core::option::Option::Some(#expr) },
    });

    let mut required_index = 0;
    let mut setters = Vec::with_capacity(fields.len());
    for field in fields {
        setters.push(setter_fn(target, field, &markers, required_index));
        if matches!(field.presence, Presence::Required) {
            required_index += 1;
        }
    }

    let extract = fields.iter().map(|f| {
        let slot = &f.ident;
        let name = &f.name;
        match f.presence {
            Presence::Optional => quote! { ::core::clone::Clone::clone(&store.#slot) },
            Presence::Required | Presence::Defaulted(_) => quote! {
                ::fieldwise::typed::required(&store.#slot, #target_name, #name)
            },
        }
    });

    let presence_checks = fields.iter().map(|f| {
        let slot = &f.ident;
        let name = &f.name;
        quote! {
            if store.#slot.is_some() {
                names.push(#name);
            }
        }
    });

    let build_bounds = if markers.is_empty() {
        quote! {}
    } else {
        quote! { where #( #markers: ::fieldwise::IsSet ),* }
    };

    let schema_fields = fields.iter().map(|f| {
        let name = &f.name;
        let ty = field_type(&f.slot_ty);
        let required = matches!(f.presence, Presence::Required);
        quote! {
            .field(::fieldwise::FieldSpec {
                name: ::std::string::String::from(#name),
                ty: ::fieldwise::FieldType::#ty,
                required: #required,
            })
        }
    });

    let builder_doc = format!(
        "Builder for [`{target_name}`]. Each required field is tracked by one type parameter, \
         `Unset` until its setter is called; `build` is only available once all are `Set`."
    );

    quote! {
        #[doc(hidden)]
        #vis struct #store {
            #( #slot_idents: ::core::option::Option<#slot_tys>, )*
        }

        #[doc = #builder_doc]
        #vis struct #builder<__Out = #ident, #( #markers = ::fieldwise::Unset ),*> {
            store: ::fieldwise::Shared<#store>,
            finalizer: ::std::rc::Rc<dyn ::core::ops::Fn(#ident) -> __Out>,
            state: ::core::marker::PhantomData<( #( #markers, )* )>,
        }

        #[allow(dead_code)]
        impl #ident {
            /// Starts a builder whose `build` returns the record itself.
            #vis fn builder() -> #builder {
                #builder::new()
            }
        }

        #[allow(dead_code)]
        impl #builder {
            #vis fn new() -> Self {
                Self::with_finalizer(|record| record)
            }
        }

        impl ::core::default::Default for #builder {
            fn default() -> Self {
                Self::new()
            }
        }

        #[allow(dead_code)]
        impl<__Out> #builder<__Out> {
            /// Starts a builder whose `build` returns `finalizer(record)`.
            #vis fn with_finalizer(finalizer: impl ::core::ops::Fn(#ident) -> __Out + 'static) -> Self {
                Self {
                    store: ::fieldwise::Shared::new(#store {
                        #( #slot_idents: #initial, )*
                    }),
                    finalizer: ::std::rc::Rc::new(finalizer),
                    state: ::core::marker::PhantomData,
                }
            }
        }

        #[allow(dead_code)]
        impl<__Out, #( #markers ),*> #builder<__Out, #( #markers ),*> {
            #( #setters )*

            /// Names of the fields set so far, in declaration order.
            #vis fn initialized(&self) -> ::std::vec::Vec<&'static str> {
                self.store.with(|store| {
                    let mut names = ::std::vec::Vec::new();
                    #( #presence_checks )*
                    names
                })
            }

            /// Finalizes the chain. Only callable once every required field is set.
            #vis fn build(&self) -> __Out #build_bounds {
                let record = self.store.with(|store| #ident {
                    #( #slot_idents: #extract, )*
                });
                (self.finalizer)(record)
            }
        }

        impl<__Out, #( #markers ),*> ::core::clone::Clone for #builder<__Out, #( #markers ),*> {
            fn clone(&self) -> Self {
                Self {
                    store: ::core::clone::Clone::clone(&self.store),
                    finalizer: ::std::rc::Rc::clone(&self.finalizer),
                    state: ::core::marker::PhantomData,
                }
            }
        }

        impl ::fieldwise::Describe for #ident {
            fn schema() -> ::fieldwise::Schema {
                ::fieldwise::Schema::new(#target_name)
                    #( #schema_fields )*
            }
        }
    }
}

fn setter_fn(
    target: &Target,
    field: &FieldInfo,
    markers: &[Ident],
    required_index: usize,
) -> TokenStream {
    let Target { vis, builder, .. } = target;
    let FieldInfo {
        ident: slot,
        setter,
        slot_ty,
        docs,
        ..
    } = field;

    let (param, value) = if field.into {
        (
            quote! { value: impl ::core::convert::Into<#slot_ty> },
            quote! { ::core::convert::Into::into(value) },
        )
    } else {
        (quote! { value: #slot_ty }, quote! { value })
    };

    let write = quote! {
        self.store.with_mut(|store| store.#slot = ::core::option::Option::Some(#value));
    };

    match field.presence {
        Presence::Required => {
            let next = markers.iter().enumerate().map(|(i, marker)| {
                if i == required_index {
                    quote! { ::fieldwise::Set }
                } else {
                    quote! { #marker }
                }
            });
            quote! {
                #( #docs )*
                #vis fn #setter(&self, #param) -> #builder<__Out, #( #next ),*> {
                    #write
                    #builder {
                        store: ::core::clone::Clone::clone(&self.store),
                        finalizer: ::std::rc::Rc::clone(&self.finalizer),
                        state: ::core::marker::PhantomData,
                    }
                }
            }
        }
        Presence::Optional | Presence::Defaulted(_) => quote! {
            #( #docs )*
            #vis fn #setter(&self, #param) -> Self {
                #write
                ::core::clone::Clone::clone(self)
            }
        },
    }
}
