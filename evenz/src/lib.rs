//! 进程内事件基础库（evenz）
//!
//! 提供观察者/发布订阅模式的通用构件，用于在类型上声明具名事件，
//! 让外部订阅/退订回调，并在之后以调用方给出的参数触发全部订阅者：
//! - 事件（`event`）：有序的处理器列表，支持订阅、退订、快照、触发与交/并过滤；
//! - 处理器（`handler`）：按身份比较的共享回调；
//! - 事件参数（`args`）：携带发送方的通用参数；
//! - 事件声明（`declaration`）：类型级的不可变模板；
//! - 绑定器（`binder`）：为每个实例物化独立的事件，保证实例之间互不共享；
//! - 类型擦除访问（`erased`）：按名称订阅/触发实例上的事件。
//!
//! 典型用法：
//! 1. 在结构体上使用 `#[observable]`，用 `#[event]` 标记 `Event<A>` 字段；
//! 2. 在构造函数上使用 `#[bind_events]`（或调用 `Binder::construct`）；
//! 3. 通过 `instance.field.subscribe(..)` 订阅，`instance.field.trigger(&args)` 触发。
//!
//! ```
//! use evenz::{Event, EventResult, Handler, bind_events, observable};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[observable]
//! struct Dog {
//!     /// 狗叫了，参数为叫声次数
//!     #[event]
//!     barked: Event<u32>,
//! }
//!
//! impl Dog {
//!     #[bind_events]
//!     fn new() -> EventResult<Self> {
//!         Ok(Self { barked: Event::default() })
//!     }
//! }
//!
//! let dog = Dog::new()?;
//! let total = Arc::new(AtomicU32::new(0));
//! let sink = total.clone();
//! dog.barked.subscribe(Handler::infallible(move |count: &u32| {
//!     sink.fetch_add(*count, Ordering::SeqCst);
//! }));
//! dog.barked.trigger(&5)?;
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//! # Ok::<(), evenz::EventError>(())
//! ```
//!
pub mod args;
pub mod binder;
pub mod config;
pub mod declaration;
pub mod erased;
pub mod error;
pub mod event;
pub mod handler;
pub mod observable;

pub use args::Args;
pub use binder::{Binder, TypeEvents};
pub use config::{DispatchPolicy, EventConfig};
pub use declaration::EventDeclaration;
pub use erased::{AnyEvent, BoundEvent, ErasedHandler};
pub use error::{EventError, EventResult, HandlerFailure};
pub use event::{Event, EventDescriptor, Handlers};
pub use handler::Handler;
pub use observable::Observable;

#[cfg(feature = "macros")]
pub use evenz_macros::{bind_events, observable};

// 允许在本 crate 内部通过 ::evenz 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::evenz 路径。
extern crate self as evenz;
