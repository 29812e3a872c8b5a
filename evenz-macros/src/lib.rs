use proc_macro::TokenStream;

mod bind_events;
mod observable;
mod utils;

/// 事件承载类型宏
/// - 用于具名字段结构体；以 `#[event]` 标记的 `Event<A>` 字段成为事件声明
/// - 支持字段参数：`#[event(name = "...", policy = "fail_fast" | "continue_on_error")]`
/// - 字段上的文档注释作为事件文档
/// - 自动实现 `::evenz::Observable`
#[proc_macro_attribute]
pub fn observable(attr: TokenStream, item: TokenStream) -> TokenStream {
    observable::expand(attr, item)
}

/// 构造钩子宏
/// 在构造函数（`-> Result<Self, E>`）或 `&mut self` 重新初始化方法的函数体执行完毕后，
/// 通过全局绑定器为实例物化全部事件。
#[proc_macro_attribute]
pub fn bind_events(attr: TokenStream, item: TokenStream) -> TokenStream {
    bind_events::expand(attr, item)
}
