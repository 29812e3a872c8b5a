//! 事件承载类型（Observable）
//!
//! 类型作者通过 `#[observable]` 宏（或手写实现）让类型：
//! - 枚举自身的事件声明（`event_declarations`）；
//! - 接收绑定器物化出的事件并安装到对应字段（`install_event`）；
//! - 按名称暴露实例上的事件（`event` / `events`）。
//!
use crate::binder::Binder;
use crate::declaration::EventDeclaration;
use crate::erased::{AnyEvent, BoundEvent};
use crate::error::EventResult;

/// 事件承载类型
pub trait Observable: Sized + 'static {
    /// 类型级事件声明，按声明顺序返回
    fn event_declarations() -> Vec<EventDeclaration>;

    /// 将物化出的事件安装到实例上同名的位置，替换原有事件
    fn install_event(&mut self, event: BoundEvent) -> EventResult<()>;

    /// 按声明名查找实例上的事件
    fn event(&self, name: &str) -> Option<&dyn AnyEvent>;

    /// 实例上的全部事件，按声明顺序
    fn events(&self) -> Vec<&dyn AnyEvent> {
        Self::event_declarations()
            .into_iter()
            .filter_map(|declaration| self.event(declaration.name()))
            .collect()
    }

    /// 使用全局绑定器为当前实例物化全部事件
    ///
    /// 重复调用会以全新的空事件替换现有事件，之前的订阅全部丢弃。
    fn bind_events(&mut self) -> EventResult<()> {
        Binder::global().bind(self)
    }
}
