use crate::utils::{collect_doc, event_args_type, expect_lit_str};
use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Expr, Ident, Item, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input,
};

/// #[observable] 宏实现
/// - 仅支持具名字段结构体，不支持生命周期参数
/// - 字段上的 `#[event]` / `#[event(name = "...", policy = "...")]` 声明事件，字段类型须为 `Event<A>`
/// - 字段文档注释作为事件文档
/// - 生成 `::evenz::Observable` 实现（event_declarations/install_event/event）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let _cfg = parse_macro_input!(attr as ObservableAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[observable] only on struct")
                .to_compile_error()
                .into();
        }
    };

    if let Some(lt) = st.generics.lifetimes().next() {
        return syn::Error::new(
            lt.span(),
            "#[observable] does not support lifetime parameters",
        )
        .to_compile_error()
        .into();
    }

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "#[observable] only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let mut events: Vec<EventField> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for field in fields_named.named.iter_mut() {
        let mut cfg: Option<EventFieldConfig> = None;
        let mut retained_attrs = Vec::new();

        for attr in field.attrs.iter() {
            if attr.path().is_ident("event") {
                if cfg.is_some() {
                    return syn::Error::new(attr.span(), "duplicate #[event] on this field")
                        .to_compile_error()
                        .into();
                }
                match parse_event_attr(attr) {
                    Ok(parsed) => cfg = Some(parsed),
                    Err(err) => return err.to_compile_error().into(),
                }
            } else {
                retained_attrs.push(attr.clone());
            }
        }

        let Some(cfg) = cfg else {
            continue;
        };
        field.attrs = retained_attrs;

        let Some(ident) = field.ident.clone() else {
            continue;
        };

        let Some(args) = event_args_type(&field.ty).cloned() else {
            return syn::Error::new(field.ty.span(), "#[event] fields must have type Event<Args>")
                .to_compile_error()
                .into();
        };

        let (name, name_span) = match cfg.name {
            Some(lit) => (lit.value(), lit.span()),
            None => (ident.to_string(), ident.span()),
        };
        if !seen_names.insert(name.clone()) {
            return syn::Error::new(name_span, format!("duplicate event name '{name}'"))
                .to_compile_error()
                .into();
        }

        events.push(EventField {
            ident,
            name,
            args,
            doc: collect_doc(&field.attrs),
            policy: cfg.policy,
        });
    }

    // 事件参数须为 'static：为每个类型参数追加 `T: 'static`
    let mut generics = st.generics.clone();
    let type_params: Vec<Ident> = st.generics.type_params().map(|tp| tp.ident.clone()).collect();
    if !type_params.is_empty() {
        let where_clause = generics.make_where_clause();
        for tp in &type_params {
            where_clause.predicates.push(syn::parse_quote! { #tp: 'static });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let ident = &st.ident;
    let owner = ident.to_string();

    let declarations = events.iter().map(|e| {
        let name = &e.name;
        let args = &e.args;
        let signature = args.to_token_stream().to_string();
        let doc = &e.doc;
        let policy = e.policy.as_ref().map(|p| {
            quote! { .with_policy(::evenz::DispatchPolicy::#p) }
        });
        quote! {
            ::evenz::EventDeclaration::of::<#args>(#name, #owner)
                .with_signature(#signature)
                .with_doc(#doc)
                #policy
        }
    });

    let install_arms = events.iter().map(|e| {
        let name = &e.name;
        let field = &e.ident;
        quote! {
            #name => {
                self.#field = event.into_event()?;
                ::std::result::Result::Ok(())
            }
        }
    });

    let lookup_arms = events.iter().map(|e| {
        let name = &e.name;
        let field = &e.ident;
        quote! {
            #name => ::std::option::Option::Some(&self.#field as &dyn ::evenz::AnyEvent),
        }
    });

    let expanded = quote! {
        #st

        impl #impl_generics ::evenz::Observable for #ident #ty_generics #where_clause {
            fn event_declarations() -> ::std::vec::Vec<::evenz::EventDeclaration> {
                ::std::vec![ #( #declarations ),* ]
            }

            fn install_event(
                &mut self,
                event: ::evenz::BoundEvent,
            ) -> ::evenz::EventResult<()> {
                match event.name() {
                    #( #install_arms )*
                    other => ::std::result::Result::Err(::evenz::EventError::UnknownEvent {
                        type_name: ::std::any::type_name::<Self>(),
                        event: ::std::string::ToString::to_string(other),
                    }),
                }
            }

            fn event(&self, name: &str) -> ::std::option::Option<&dyn ::evenz::AnyEvent> {
                match name {
                    #( #lookup_arms )*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

struct EventField {
    ident: Ident,
    name: String,
    args: Type,
    doc: String,
    policy: Option<Ident>,
}

// -------- parsing --------

// #[observable] 暂不接受参数
struct ObservableAttrConfig;

impl Parse for ObservableAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            Ok(Self)
        } else {
            Err(syn::Error::new(input.span(), "#[observable] takes no arguments"))
        }
    }
}

#[derive(Default)]
struct EventFieldConfig {
    name: Option<syn::LitStr>,
    policy: Option<Ident>,
}

fn parse_event_attr(attr: &syn::Attribute) -> Result<EventFieldConfig> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok(EventFieldConfig::default()),
        syn::Meta::List(_) => {
            let mut cfg = EventFieldConfig::default();
            let pairs: Punctuated<EventAttrKv, Token![,]> =
                attr.parse_args_with(Punctuated::<EventAttrKv, Token![,]>::parse_terminated)?;

            for kv in pairs {
                match kv.key.to_string().as_str() {
                    "name" => {
                        if cfg.name.is_some() {
                            return Err(syn::Error::new(
                                kv.key.span(),
                                "duplicate key 'name' in attribute",
                            ));
                        }
                        let lit = expect_lit_str(&kv.value, "name")?;
                        if lit.value().is_empty() {
                            return Err(syn::Error::new(lit.span(), "event name must not be empty"));
                        }
                        cfg.name = Some(lit);
                    }
                    "policy" => {
                        if cfg.policy.is_some() {
                            return Err(syn::Error::new(
                                kv.key.span(),
                                "duplicate key 'policy' in attribute",
                            ));
                        }
                        let lit = expect_lit_str(&kv.value, "policy")?;
                        let variant = match lit.value().as_str() {
                            "fail_fast" => "FailFast",
                            "continue_on_error" => "ContinueOnError",
                            _ => {
                                return Err(syn::Error::new(
                                    lit.span(),
                                    "unknown policy; expected 'fail_fast' | 'continue_on_error'",
                                ));
                            }
                        };
                        cfg.policy = Some(Ident::new(variant, lit.span()));
                    }
                    _ => {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "unknown key; expected 'name' | 'policy'",
                        ));
                    }
                }
            }

            Ok(cfg)
        }
        other => Err(syn::Error::new(
            other.span(),
            "expected #[event] or #[event(...)]",
        )),
    }
}

struct EventAttrKv {
    key: Ident,
    #[allow(dead_code)]
    eq: Token![=],
    value: Expr,
}

impl Parse for EventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Self {
            key: input.parse()?,
            eq: input.parse()?,
            value: input.parse()?,
        })
    }
}
