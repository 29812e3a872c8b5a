//! 类型擦除的事件访问
//!
//! - `AnyEvent`：按名称访问实例上的事件时使用的对象安全接口；
//! - `ErasedHandler`：擦除参数类型的处理器，订阅时再按事件参数类型还原；
//! - `BoundEvent`：绑定器物化出的事件，在安装到实例字段时还原为 `Event<A>`。
//!
use crate::error::{EventError, EventResult};
use crate::declaration::EventDeclaration;
use crate::event::{Event, EventDescriptor};
use crate::handler::Handler;
use std::any::{Any, TypeId, type_name};
use std::fmt;

/// 擦除参数类型后的事件接口
pub trait AnyEvent: Send + Sync {
    fn name(&self) -> &str;

    fn declaration(&self) -> Option<&EventDeclaration>;

    /// 触发参数的类型
    fn args_type(&self) -> TypeId;

    fn args_type_name(&self) -> &'static str;

    fn handler_count(&self) -> usize;

    fn describe(&self) -> EventDescriptor;

    /// 订阅擦除后的处理器；处理器不能以本事件的参数调用时返回 `InvalidHandler`
    fn subscribe_erased(&self, handler: ErasedHandler) -> EventResult<()>;

    fn unsubscribe_erased(&self, handler: &ErasedHandler) -> EventResult<()>;

    /// 以擦除后的参数触发；参数类型不符时返回 `SignatureMismatch`
    fn trigger_erased(&self, args: &dyn Any) -> EventResult<()>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn AnyEvent + '_ {
    /// 还原为具体的 `Event<A>`
    pub fn downcast_ref<A: 'static>(&self) -> Option<&Event<A>> {
        self.as_any().downcast_ref::<Event<A>>()
    }
}

impl fmt::Debug for dyn AnyEvent + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyEvent")
            .field("name", &self.name())
            .field("args", &self.args_type_name())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl<A: 'static> AnyEvent for Event<A> {
    fn name(&self) -> &str {
        Event::name(self)
    }

    fn declaration(&self) -> Option<&EventDeclaration> {
        Event::declaration(self)
    }

    fn args_type(&self) -> TypeId {
        TypeId::of::<A>()
    }

    fn args_type_name(&self) -> &'static str {
        type_name::<A>()
    }

    fn handler_count(&self) -> usize {
        self.len()
    }

    fn describe(&self) -> EventDescriptor {
        Event::describe(self)
    }

    fn subscribe_erased(&self, handler: ErasedHandler) -> EventResult<()> {
        let handler = handler
            .into_handler::<A>()
            .map_err(|_| self.invalid_handler())?;
        self.subscribe(handler);
        Ok(())
    }

    fn unsubscribe_erased(&self, handler: &ErasedHandler) -> EventResult<()> {
        let handler = handler
            .as_handler::<A>()
            .ok_or_else(|| self.invalid_handler())?;
        self.unsubscribe(handler).map(|_| ())
    }

    fn trigger_erased(&self, args: &dyn Any) -> EventResult<()> {
        let args = args
            .downcast_ref::<A>()
            .ok_or_else(|| EventError::SignatureMismatch {
                event: self.name().to_string(),
                expected: type_name::<A>(),
                found: "unknown",
            })?;
        self.trigger(args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<A: 'static> Event<A> {
    fn invalid_handler(&self) -> EventError {
        EventError::InvalidHandler {
            event: self.name().to_string(),
            expected: type_name::<A>(),
        }
    }
}

/// 擦除参数类型的处理器
///
/// 通常由 `Handler<A>` 转换而来；`from_any` 允许传入任意值，
/// 在订阅时才校验它是否是可以接收该事件参数的处理器。
pub struct ErasedHandler {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ErasedHandler {
    pub fn new<A: 'static>(handler: Handler<A>) -> Self {
        Self {
            inner: Box::new(handler),
            type_name: type_name::<Handler<A>>(),
        }
    }

    /// 包装任意值；不是 `Handler<A>` 的值在订阅时会被拒绝
    pub fn from_any<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// 被包装值的类型名
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_handler_for<A: 'static>(&self) -> bool {
        self.inner.is::<Handler<A>>()
    }

    pub fn as_handler<A: 'static>(&self) -> Option<&Handler<A>> {
        self.inner.downcast_ref::<Handler<A>>()
    }

    /// 还原为 `Handler<A>`；类型不符时原样返回
    pub fn into_handler<A: 'static>(self) -> Result<Handler<A>, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<Handler<A>>()
            .map(|h| *h)
            .map_err(|inner| Self { inner, type_name })
    }
}

impl<A: 'static> From<Handler<A>> for ErasedHandler {
    fn from(handler: Handler<A>) -> Self {
        Self::new(handler)
    }
}

impl fmt::Debug for ErasedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedHandler")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 绑定器物化出的事件，等待安装到实例上
pub struct BoundEvent {
    name: &'static str,
    args_type_name: &'static str,
    inner: Box<dyn Any + Send + Sync>,
}

impl BoundEvent {
    pub fn new<A: 'static>(name: &'static str, event: Event<A>) -> Self {
        Self {
            name,
            args_type_name: type_name::<A>(),
            inner: Box::new(event),
        }
    }

    /// 声明的事件名
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn args_type_name(&self) -> &'static str {
        self.args_type_name
    }

    /// 还原为 `Event<A>`；参数类型与声明不符时返回 `SignatureMismatch`
    pub fn into_event<A: 'static>(self) -> EventResult<Event<A>> {
        let Self {
            name,
            args_type_name,
            inner,
        } = self;
        inner
            .downcast::<Event<A>>()
            .map(|event| *event)
            .map_err(|_| EventError::SignatureMismatch {
                event: name.to_string(),
                expected: type_name::<A>(),
                found: args_type_name,
            })
    }
}

impl fmt::Debug for BoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEvent")
            .field("name", &self.name)
            .field("args", &self.args_type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventConfig;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counter(total: &Arc<AtomicU32>) -> Handler<u32> {
        let total = total.clone();
        Handler::named("counter", move |n: &u32| {
            total.fetch_add(*n, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn erased_subscribe_and_trigger_roundtrip() {
        let total = Arc::new(AtomicU32::new(0));
        let event = Event::<u32>::new();
        let any: &dyn AnyEvent = &event;

        let handler = counter(&total);
        any.subscribe_erased(handler.clone().into()).unwrap();
        any.trigger_erased(&4u32).unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 4);
        assert_eq!(any.handler_count(), 1);

        any.unsubscribe_erased(&ErasedHandler::new(handler)).unwrap();
        assert_eq!(any.handler_count(), 0);
    }

    #[test]
    fn non_invocable_handler_is_rejected() {
        let event = Event::<u32>::new();
        let any: &dyn AnyEvent = &event;

        let err = any
            .subscribe_erased(ErasedHandler::from_any("not a function"))
            .unwrap_err();
        assert!(matches!(err, EventError::InvalidHandler { expected, .. } if expected == "u32"));

        let wrong_args: Handler<String> = Handler::infallible(|_| {});
        let err = any.subscribe_erased(wrong_args.into()).unwrap_err();
        assert!(matches!(err, EventError::InvalidHandler { .. }));
        assert!(event.is_empty());
    }

    #[test]
    fn trigger_with_wrong_arguments_is_a_signature_mismatch() {
        let event = Event::<u32>::new();
        let any: &dyn AnyEvent = &event;
        let err = any.trigger_erased(&"five").unwrap_err();
        assert!(matches!(err, EventError::SignatureMismatch { .. }));
    }

    #[test]
    fn downcast_recovers_typed_event() {
        let event = Event::<u32>::new();
        let any: &dyn AnyEvent = &event;
        assert!(any.downcast_ref::<u32>().is_some());
        assert!(any.downcast_ref::<u64>().is_none());
        assert_eq!(any.args_type(), TypeId::of::<u32>());
    }

    #[test]
    fn bound_event_checks_argument_type() {
        let bound = BoundEvent::new("ping", Event::<u8>::with_config(EventConfig::default()));
        assert_eq!(bound.name(), "ping");
        let err = bound.into_event::<u16>().unwrap_err();
        assert!(matches!(
            err,
            EventError::SignatureMismatch { expected: "u16", found: "u8", .. }
        ));
    }

    #[test]
    fn erased_handler_returns_itself_on_mismatch() {
        let h: Handler<u32> = Handler::infallible(|_| {});
        let erased = ErasedHandler::new(h.clone());
        assert!(erased.is_handler_for::<u32>());
        let erased = erased.into_handler::<u64>().unwrap_err();
        assert_eq!(erased.into_handler::<u32>().unwrap(), h);
    }
}
