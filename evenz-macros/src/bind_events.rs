use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{ItemFn, Result, ReturnType, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[bind_events] 宏实现
/// - 构造函数 `fn(..) -> Result<Self, E>`：原函数体执行完毕后绑定返回的实例
/// - 重新初始化方法 `fn(&mut self, ..) -> Result<T, E>`：原函数体执行完毕后重新绑定 `self`
/// - 要求 `E: From<::evenz::EventError>`；不支持 async/const fn
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let _cfg = parse_macro_input!(attr as BindEventsAttrConfig);
    let func = parse_macro_input!(item as ItemFn);

    if let Some(token) = &func.sig.asyncness {
        return syn::Error::new(token.span(), "#[bind_events] does not support async fn")
            .to_compile_error()
            .into();
    }
    if let Some(token) = &func.sig.constness {
        return syn::Error::new(token.span(), "#[bind_events] does not support const fn")
            .to_compile_error()
            .into();
    }

    let ret = match &func.sig.output {
        ReturnType::Type(_, ty) => ty.clone(),
        ReturnType::Default => {
            return syn::Error::new(
                func.sig.span(),
                "#[bind_events] requires a return type Result<Self, E> where E: From<EventError>",
            )
            .to_compile_error()
            .into();
        }
    };

    let reinit = match func.sig.receiver() {
        None => false,
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_some() => true,
        Some(receiver) => {
            return syn::Error::new(
                receiver.span(),
                "#[bind_events] on a method requires a `&mut self` receiver",
            )
            .to_compile_error()
            .into();
        }
    };

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = func;

    // 原函数体包进闭包执行，保证其中的 `return` 也会经过绑定步骤
    let body = if reinit {
        quote! {
            #[allow(clippy::redundant_closure_call)]
            let __evenz_value = (|| -> #ret #block)()?;
            ::evenz::Observable::bind_events(self)?;
            ::std::result::Result::Ok(__evenz_value)
        }
    } else {
        quote! {
            #[allow(clippy::redundant_closure_call)]
            let mut __evenz_instance = (|| -> #ret #block)()?;
            ::evenz::Observable::bind_events(&mut __evenz_instance)?;
            ::std::result::Result::Ok(__evenz_instance)
        }
    };

    TokenStream::from(quote! {
        #(#attrs)*
        #vis #sig {
            #body
        }
    })
}

// -------- parsing --------

// #[bind_events] 暂不接受参数
struct BindEventsAttrConfig;

impl Parse for BindEventsAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            Ok(Self)
        } else {
            Err(syn::Error::new(input.span(), "#[bind_events] takes no arguments"))
        }
    }
}
