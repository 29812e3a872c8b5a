//! 事件（Event）
//!
//! 一个事件持有按订阅顺序排列的处理器列表，并在触发时依次同步调用：
//! - `subscribe` 追加到末尾，允许重复（同一处理器订阅两次即每次触发调用两次）；
//! - `unsubscribe` 移除第一次出现的处理器，不存在时返回 `HandlerNotFound`；
//! - `handlers` 返回不受后续订阅变更影响的快照；
//! - `trigger` 在调用方线程上按顺序调用全部处理器；
//! - `intersect_with` / `union_with` 以集合语义过滤处理器列表。
//!
//! 处理器列表以写时复制方式存放：快照只是一次 `Arc` 克隆，
//! 锁只在修改列表或取快照时持有，调用处理器期间从不持锁，
//! 因此处理器内部可以安全地订阅/退订同一事件（在下一次触发时生效）。
//!
//! 注意：分发没有超时与取消，某个处理器阻塞即阻塞整个分发。
//!
use crate::config::{DispatchPolicy, EventConfig};
use crate::declaration::EventDeclaration;
use crate::error::{EventError, EventResult, HandlerFailure};
use crate::handler::Handler;
use parking_lot::Mutex;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::ops::{AddAssign, BitAndAssign, BitOrAssign, Deref};
use std::sync::Arc;

const ANONYMOUS: &str = "<anonymous>";

/// 事件
///
/// 有意不实现 `Clone`：每个事件只归属于一个实例，不允许在实例间共享。
pub struct Event<A> {
    handlers: Mutex<Arc<Vec<Handler<A>>>>,
    declaration: Option<EventDeclaration>,
    config: EventConfig,
}

impl<A> Event<A> {
    /// 创建一个独立（未绑定到任何类型声明）的事件
    pub fn new() -> Self {
        Self::with_config(EventConfig::default())
    }

    pub fn with_config(config: EventConfig) -> Self {
        Self {
            handlers: Mutex::new(Arc::new(Vec::new())),
            declaration: None,
            config,
        }
    }

    /// 由类型级声明物化出的事件，配置为 `base` 叠加声明级覆写
    pub fn from_declaration(declaration: EventDeclaration, base: &EventConfig) -> Self {
        let config = declaration.effective_config(base);
        Self {
            handlers: Mutex::new(Arc::new(Vec::new())),
            declaration: Some(declaration),
            config,
        }
    }

    pub fn name(&self) -> &str {
        self.declaration.as_ref().map_or(ANONYMOUS, |d| d.name())
    }

    pub fn declaration(&self) -> Option<&EventDeclaration> {
        self.declaration.as_ref()
    }

    /// 是否已由绑定器物化（而非类型作者写下的占位事件）
    pub fn is_bound(&self) -> bool {
        self.declaration.is_some()
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.config.policy
    }

    /// 订阅处理器（追加到末尾），返回自身以便链式订阅
    pub fn subscribe(&self, handler: Handler<A>) -> &Self {
        tracing::debug!(event = %self.name(), handler = handler.label(), "subscribe");
        self.update(|list| list.push(handler));
        self
    }

    /// 以闭包订阅，返回生成的处理器以便之后退订
    pub fn subscribe_fn<F>(&self, f: F) -> Handler<A>
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let handler = Handler::new(f);
        self.subscribe(handler.clone());
        handler
    }

    /// 移除第一次出现的处理器；不存在时列表保持不变
    pub fn unsubscribe(&self, handler: &Handler<A>) -> EventResult<&Self> {
        let removed = self.update(|list| {
            let pos = list.iter().position(|h| h == handler)?;
            Some(list.remove(pos))
        });

        match removed {
            Some(_) => {
                tracing::debug!(event = %self.name(), handler = handler.label(), "unsubscribe");
                Ok(self)
            }
            None => Err(EventError::HandlerNotFound {
                event: self.name().to_string(),
                handler: handler.label().to_string(),
            }),
        }
    }

    /// 当前处理器快照（按订阅顺序，可重复遍历）
    pub fn handlers(&self) -> Handlers<A> {
        Handlers {
            inner: Arc::clone(&self.handlers.lock()),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, handler: &Handler<A>) -> bool {
        self.handlers.lock().iter().any(|h| h == handler)
    }

    /// 清空全部订阅
    pub fn clear(&self) {
        self.update(Vec::clear);
    }

    /// 触发事件
    ///
    /// 按订阅顺序同步调用快照中的每个处理器。默认 `FailFast`：第一个失败的处理器
    /// 中止分发并以 `HandlerFailed` 返回，其后的处理器不会被调用；
    /// `ContinueOnError` 下全部处理器都会被调用，失败以 `DispatchFailed` 汇总返回。
    /// 处理器 panic 不会被捕获。
    pub fn trigger(&self, args: &A) -> EventResult<()> {
        let snapshot = self.handlers();
        tracing::trace!(
            event = %self.name(),
            handlers = snapshot.len(),
            policy = %self.config.policy,
            "trigger"
        );

        match self.config.policy {
            DispatchPolicy::FailFast => {
                for (index, handler) in snapshot.iter().enumerate() {
                    self.invoke(index, handler, args).map_err(|failure| {
                        EventError::HandlerFailed {
                            event: self.name().to_string(),
                            handler: failure.handler,
                            index: failure.index,
                            source: failure.source,
                        }
                    })?;
                }
                Ok(())
            }
            DispatchPolicy::ContinueOnError => {
                let failures: Vec<HandlerFailure> = snapshot
                    .iter()
                    .enumerate()
                    .filter_map(|(index, handler)| self.invoke(index, handler, args).err())
                    .collect();

                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(EventError::DispatchFailed {
                        event: self.name().to_string(),
                        failures,
                    })
                }
            }
        }
    }

    /// 仅保留同时出现在当前列表与 `other` 中的处理器（永久移除其余处理器）
    ///
    /// 集合语义：重复订阅折叠为第一次出现的位置，结果保持当前订阅顺序。
    /// 重复次数因此丢失，这是有意接受的有损行为。
    pub fn intersect_with<I>(&self, other: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Borrow<Handler<A>>,
    {
        let other: HashSet<Handler<A>> = other
            .into_iter()
            .map(|h| Borrow::<Handler<A>>::borrow(&h).clone())
            .collect();
        self.update(|list| {
            let mut seen = HashSet::with_capacity(list.len());
            list.retain(|h| other.contains(h) && seen.insert(h.clone()));
        });
        tracing::debug!(event = %self.name(), handlers = self.len(), "intersect");
        self
    }

    /// 保留当前列表与 `other` 的并集
    ///
    /// 结果为：当前处理器（去重，按订阅顺序）后接 `other` 中尚未出现的处理器
    /// （去重，按 `other` 的迭代顺序）。与 `intersect_with` 一样丢失重复次数。
    ///
    /// 注意：这是真正的并集，会把 `other` 中的处理器加入本事件；
    /// 仅按集合成员关系过滤现有列表的做法永远不会新增处理器，这里不采用。
    pub fn union_with<I>(&self, other: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Borrow<Handler<A>>,
    {
        let other: Vec<Handler<A>> = other
            .into_iter()
            .map(|h| Borrow::<Handler<A>>::borrow(&h).clone())
            .collect();
        self.update(|list| {
            let mut seen = HashSet::with_capacity(list.len() + other.len());
            list.retain(|h| seen.insert(h.clone()));
            for h in other {
                if seen.insert(h.clone()) {
                    list.push(h);
                }
            }
        });
        tracing::debug!(event = %self.name(), handlers = self.len(), "union");
        self
    }

    /// 诊断用的事件描述
    pub fn describe(&self) -> EventDescriptor {
        let declaration = self.declaration.as_ref();
        EventDescriptor {
            name: self.name().to_string(),
            owner: declaration.map(|d| d.owner().to_string()),
            signature: declaration.map(|d| d.signature().to_string()),
            doc: declaration
                .map(|d| d.doc())
                .filter(|doc| !doc.is_empty())
                .map(str::to_string),
            handlers: self.len(),
            policy: self.config.policy,
        }
    }

    fn invoke(&self, index: usize, handler: &Handler<A>, args: &A) -> Result<(), HandlerFailure> {
        if self.config.trace_dispatch {
            tracing::trace!(event = %self.name(), handler = handler.label(), index, "invoke");
        }
        handler.call(args).map_err(|source| {
            tracing::debug!(
                event = %self.name(),
                handler = handler.label(),
                index,
                error = %source,
                "handler failed"
            );
            HandlerFailure {
                index,
                handler: handler.label().to_string(),
                source,
            }
        })
    }

    fn update<R>(&self, f: impl FnOnce(&mut Vec<Handler<A>>) -> R) -> R {
        let mut guard = self.handlers.lock();
        f(Arc::make_mut(&mut guard))
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> AddAssign<Handler<A>> for Event<A> {
    fn add_assign(&mut self, handler: Handler<A>) {
        self.subscribe(handler);
    }
}

/// `event &= &other` 等价于 `event.intersect_with(&other.handlers())`
impl<A> BitAndAssign<&Event<A>> for Event<A> {
    fn bitand_assign(&mut self, other: &Event<A>) {
        self.intersect_with(&other.handlers());
    }
}

impl<A> BitAndAssign<&Handlers<A>> for Event<A> {
    fn bitand_assign(&mut self, other: &Handlers<A>) {
        self.intersect_with(other);
    }
}

/// `event |= &other` 等价于 `event.union_with(&other.handlers())`
impl<A> BitOrAssign<&Event<A>> for Event<A> {
    fn bitor_assign(&mut self, other: &Event<A>) {
        self.union_with(&other.handlers());
    }
}

impl<A> BitOrAssign<&Handlers<A>> for Event<A> {
    fn bitor_assign(&mut self, other: &Handlers<A>) {
        self.union_with(other);
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name())
            .field("handlers", &self.len())
            .field("policy", &self.config.policy)
            .finish()
    }
}

/// 处理器快照
///
/// 取快照之后的订阅/退订不会影响已有快照。
pub struct Handlers<A> {
    inner: Arc<Vec<Handler<A>>>,
}

impl<A> Deref for Handlers<A> {
    type Target = [Handler<A>];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<A> Clone for Handlers<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<'a, A> IntoIterator for &'a Handlers<A> {
    type Item = &'a Handler<A>;
    type IntoIter = std::slice::Iter<'a, Handler<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<A> IntoIterator for Handlers<A> {
    type Item = Handler<A>;
    type IntoIter = std::vec::IntoIter<Handler<A>>;

    fn into_iter(self) -> Self::IntoIter {
        Arc::unwrap_or_clone(self.inner).into_iter()
    }
}

impl<A> fmt::Debug for Handlers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

/// 事件描述（诊断/测试用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub handlers: usize,
    pub policy: DispatchPolicy,
}
