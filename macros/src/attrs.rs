use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Type, TypePath, Visibility,
};

/// Setter names the generated builder already uses for its own methods.
const RESERVED: &[&str] = &[
    "build",
    "new",
    "with_finalizer",
    "initialized",
    "default",
    "clone",
];

/// How a field takes part in the initialized-field set.
pub(crate) enum Presence {
    /// Tracked by a typestate marker; must be set before `build`.
    Required,
    /// `Option<T>`; absent unless set.
    Optional,
    /// Prefilled at creation, from `Default::default()` or the given expression.
    Defaulted(Option<Expr>),
}

pub(crate) struct FieldInfo {
    pub ident: Ident,
    /// Field name without any `r#` prefix.
    pub name: String,
    pub setter: Ident,
    /// Type stored in the slot: the field type, or `T` for an `Option<T>` field.
    pub slot_ty: Type,
    pub presence: Presence,
    pub into: bool,
    pub docs: Vec<Attribute>,
}

pub(crate) struct Target {
    pub ident: Ident,
    pub vis: Visibility,
    pub builder: Ident,
    pub fields: Vec<FieldInfo>,
}

impl Target {
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
            return Err(syn::Error::new(
                input.generics.span(),
                "`#[derive(Builder)]` does not support generic structs",
            ));
        }

        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new(
                input.ident.span(),
                "`#[derive(Builder)]` only supports structs with named fields",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(syn::Error::new(
                data.fields.span(),
                "`#[derive(Builder)]` only supports structs with named fields",
            ));
        };

        let mut builder = None;
        for attr in input.attrs.iter().filter(|a| a.path().is_ident("builder")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    builder = Some(lit.parse::<Ident>()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported builder property, expected `name`"))
                }
            })?;
        }
        let builder = builder
            .unwrap_or_else(|| Ident::new(&format!("{}Builder", input.ident), input.ident.span()));

        let fields = named
            .named
            .iter()
            .map(parse_field)
            .collect::<syn::Result<Vec<_>>>()?;

        for (i, field) in fields.iter().enumerate() {
            let setter = field.setter.unraw().to_string();
            if RESERVED.contains(&setter.as_str()) {
                return Err(syn::Error::new(
                    field.setter.span(),
                    format!("`{setter}` clashes with a builder method; use #[builder(rename = \"...\")]"),
                ));
            }
            if fields[..i].iter().any(|f| f.setter.unraw() == field.setter.unraw()) {
                return Err(syn::Error::new(
                    field.setter.span(),
                    format!("two fields use the setter name `{setter}`"),
                ));
            }
        }

        Ok(Self {
            ident: input.ident.clone(),
            vis: input.vis.clone(),
            builder,
            fields,
        })
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields
            .iter()
            .filter(|f| matches!(f.presence, Presence::Required))
    }
}

fn parse_field(field: &syn::Field) -> syn::Result<FieldInfo> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new(field.span(), "expected a named field"));
    };

    let mut default: Option<Option<Expr>> = None;
    let mut into = false;
    let mut rename = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("builder")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = Some(if meta.input.peek(syn::Token![=]) {
                    Some(meta.value()?.parse::<Expr>()?)
                } else {
                    None
                });
            } else if meta.path.is_ident("into") {
                into = true;
            } else if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit.parse::<Ident>()?);
            } else {
                return Err(meta.error(
                    "unsupported builder property, expected `default`, `into` or `rename`",
                ));
            }
            Ok(())
        })?;
    }

    let (slot_ty, presence) = match (option_inner(&field.ty), default) {
        (Some(_), Some(_)) => {
            return Err(syn::Error::new(
                field.ty.span(),
                "`Option` fields are already optional; remove #[builder(default)]",
            ));
        }
        (Some(inner), None) => (inner.clone(), Presence::Optional),
        (None, Some(expr)) => (field.ty.clone(), Presence::Defaulted(expr)),
        (None, None) => (field.ty.clone(), Presence::Required),
    };

    let name = ident.unraw().to_string();
    Ok(FieldInfo {
        setter: rename.unwrap_or_else(|| ident.clone()),
        ident,
        name,
        slot_ty,
        presence,
        into,
        docs: field
            .attrs
            .iter()
            .filter(|a| a.path().is_ident("doc"))
            .cloned()
            .collect(),
    })
}

/// `Option<T>` -> `T`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let [GenericArgument::Type(inner)] = args.args.iter().collect::<Vec<_>>().as_slice() else {
        return None;
    };
    Some(inner)
}

/// Name of the `FieldType` variant describing `ty`.
pub(crate) fn field_type(ty: &Type) -> Ident {
    let variant = match ty {
        Type::Reference(reference) => return field_type(&reference.elem),
        Type::Array(_) | Type::Slice(_) => "List",
        Type::Path(TypePath { qself: None, path }) => match path.segments.last() {
            Some(segment) => match segment.ident.to_string().as_str() {
                "String" | "str" | "char" | "Cow" => "Text",
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize" => "Integer",
                "f32" | "f64" => "Number",
                "bool" => "Bool",
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => "List",
                "HashMap" | "BTreeMap" => "Map",
                _ => "Any",
            },
            None => "Any",
        },
        _ => "Any",
    };
    Ident::new(variant, Span::call_site())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn rejection(input: DeriveInput) -> String {
        match Target::parse(&input) {
            Ok(target) => panic!("`{}` should be rejected", target.ident),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn classifies_fields() {
        let input: DeriveInput = parse_quote! {
            struct User {
                email: String,
                #[builder(default = 3)]
                retries: u8,
                age: Option<u32>,
                #[builder(into, rename = "kind")]
                r#type: String,
            }
        };
        let target = Target::parse(&input).unwrap();
        assert_eq!(target.builder, "UserBuilder");
        let required: Vec<&str> = target.required().map(|f| f.name.as_str()).collect();
        assert_eq!(required, vec!["email", "type"]);
        assert!(matches!(target.fields[1].presence, Presence::Defaulted(Some(_))));
        assert!(matches!(target.fields[2].presence, Presence::Optional));
        assert_eq!(target.fields[3].setter, "kind");
        assert!(target.fields[3].into);
    }

    #[test]
    fn container_name_overrides_builder_ident() {
        let input: DeriveInput = parse_quote! {
            #[builder(name = "Draft")]
            struct Ticket { title: String }
        };
        assert_eq!(Target::parse(&input).unwrap().builder, "Draft");
    }

    #[test]
    fn rejects_generic_structs() {
        let err = rejection(parse_quote! { struct Wrapper<T> { inner: T } });
        assert!(err.contains("does not support generic structs"));
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        let tuple = rejection(parse_quote! { struct Point(u8, u8); });
        let enumeration = rejection(parse_quote! { enum Shape { Circle, Square } });
        assert!(tuple.contains("only supports structs with named fields"));
        assert!(enumeration.contains("only supports structs with named fields"));
    }

    #[test]
    fn rejects_default_on_option() {
        let err = rejection(parse_quote! {
            struct User {
                #[builder(default)]
                age: Option<u32>,
            }
        });
        assert!(err.contains("already optional"));
    }

    #[test]
    fn rejects_reserved_setter_names() {
        let inputs: [DeriveInput; 6] = [
            parse_quote! { struct A { build: u8 } },
            parse_quote! { struct A { r#new: u8 } },
            parse_quote! { struct A { default: u8 } },
            parse_quote! { struct A { clone: u8 } },
            parse_quote! { struct A { #[builder(rename = "with_finalizer")] x: u8 } },
            parse_quote! { struct A { #[builder(rename = "initialized")] x: u8 } },
        ];
        for input in inputs {
            assert!(rejection(input).contains("clashes with a builder method"));
        }
    }

    #[test]
    fn rejects_duplicate_setter_names() {
        let err = rejection(parse_quote! {
            struct A {
                label: String,
                #[builder(rename = "label")]
                title: String,
            }
        });
        assert!(err.contains("two fields use the setter name `label`"));
    }

    #[test]
    fn rejects_unknown_properties() {
        let field = rejection(parse_quote! { struct A { #[builder(skip)] x: u8 } });
        let container = rejection(parse_quote! {
            #[builder(vis = "pub")]
            struct A { x: u8 }
        });
        assert!(field.contains("unsupported builder property"));
        assert!(container.contains("unsupported builder property"));
    }

    #[test]
    fn option_inner_unwraps_only_option() {
        let inner: Type = parse_quote!(u32);
        assert_eq!(option_inner(&parse_quote!(Option<u32>)), Some(&inner));
        assert_eq!(option_inner(&parse_quote!(std::option::Option<u32>)), Some(&inner));
        assert_eq!(option_inner(&parse_quote!(Vec<u32>)), None);
        assert_eq!(option_inner(&parse_quote!(Option)), None);
    }

    #[test]
    fn field_type_maps_common_types() {
        assert_eq!(field_type(&parse_quote!(String)), "Text");
        assert_eq!(field_type(&parse_quote!(&'static str)), "Text");
        assert_eq!(field_type(&parse_quote!(u64)), "Integer");
        assert_eq!(field_type(&parse_quote!(f32)), "Number");
        assert_eq!(field_type(&parse_quote!(bool)), "Bool");
        assert_eq!(field_type(&parse_quote!(Vec<String>)), "List");
        assert_eq!(field_type(&parse_quote!([u8; 4])), "List");
        assert_eq!(field_type(&parse_quote!(BTreeMap<String, u8>)), "Map");
        assert_eq!(field_type(&parse_quote!(std::time::Duration)), "Any");
    }
}
