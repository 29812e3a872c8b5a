//! 事件处理器（Handler）
//!
//! 处理器是以 `Arc` 共享的回调闭包。身份按“同一分配”判定：
//! 克隆出的句柄与原句柄相等；内容相同但各自创建的两个闭包互不相等。
//! `Hash` 与身份一致，因此处理器可以直接放入集合参与交/并运算。
//!
use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 处理器闭包签名：接收触发参数，失败时返回 `anyhow::Error`
pub type HandlerFn<A> = dyn Fn(&A) -> anyhow::Result<()> + Send + Sync;

/// 订阅到 `Event<A>` 上的处理器
pub struct Handler<A> {
    f: Arc<HandlerFn<A>>,
    label: Arc<str>,
}

impl<A> Handler<A> {
    /// 包装一个可能失败的闭包，标签取闭包类型名
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::named(type_name::<F>(), f)
    }

    /// 包装一个可能失败的闭包，并指定用于日志与错误信息的标签
    pub fn named<F>(label: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            label: label.into(),
        }
    }

    /// 包装一个不会失败的闭包
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::named(type_name::<F>(), move |args: &A| {
            f(args);
            Ok(())
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 调用处理器
    pub fn call(&self, args: &A) -> anyhow::Result<()> {
        (self.f)(args)
    }

    /// 是否与另一个句柄指向同一个处理器
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.f).cast::<()>()
    }
}

impl<A> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
            label: Arc::clone(&self.label),
        }
    }
}

impl<A> PartialEq for Handler<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A> Eq for Handler<A> {}

impl<A> Hash for Handler<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<A> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("label", &self.label)
            .field("addr", &self.addr())
            .finish()
    }
}
