//! 实例绑定器（Binder）
//!
//! 把类型级的事件声明转换为每个实例独立持有的 `Event`：
//! 1. 首次遇到某个类型时校验其声明（非空、名称不重复）并按 `TypeId` 缓存；
//! 2. 对每个声明物化出一个全新的空事件（声明元数据 + 生效配置）；
//! 3. 按名称安装到实例上，替换类型作者写下的占位事件。
//!
//! 对同一实例再次绑定等价于完全重置：所有事件换成新的空事件。
//!
use crate::config::EventConfig;
use crate::declaration::EventDeclaration;
use crate::error::{EventError, EventResult};
use crate::observable::Observable;
use bon::Builder;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// 已校验的类型事件声明
#[derive(Debug)]
pub struct TypeEvents {
    type_name: &'static str,
    declarations: Vec<EventDeclaration>,
}

impl TypeEvents {
    fn validate<T: Observable>() -> EventResult<Self> {
        let type_name = type_name::<T>();
        let declarations = T::event_declarations();
        if declarations.is_empty() {
            return Err(EventError::NotEventBearing { type_name });
        }

        let mut seen = HashSet::with_capacity(declarations.len());
        for declaration in &declarations {
            if !seen.insert(declaration.name()) {
                return Err(EventError::DeclarationConflict {
                    type_name,
                    event: declaration.name(),
                });
            }
        }

        Ok(Self {
            type_name,
            declarations,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn declarations(&self) -> &[EventDeclaration] {
        &self.declarations
    }

    pub fn get(&self, name: &str) -> Option<&EventDeclaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declarations.iter().map(EventDeclaration::name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// 实例绑定器
///
/// 持有物化事件时使用的默认配置与按类型缓存的声明。
/// `Binder::global()` 供 `Observable::bind_events` 与 `#[bind_events]` 使用。
#[derive(Builder, Debug, Default)]
pub struct Binder {
    #[builder(default)]
    config: EventConfig,
    #[builder(skip)]
    registry: DashMap<TypeId, Arc<TypeEvents>>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级绑定器（默认配置）
    pub fn global() -> &'static Binder {
        static GLOBAL: OnceLock<Binder> = OnceLock::new();
        GLOBAL.get_or_init(Binder::default)
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// 校验并缓存类型 `T` 的事件声明
    ///
    /// 校验失败不会被缓存，每次绑定都会重新报告同样的错误。
    pub fn register<T: Observable>(&self) -> EventResult<Arc<TypeEvents>> {
        let key = TypeId::of::<T>();
        if let Some(found) = self.registry.get(&key).map(|entry| Arc::clone(entry.value())) {
            return Ok(found);
        }

        let validated = Arc::new(TypeEvents::validate::<T>()?);
        tracing::debug!(
            type_name = validated.type_name(),
            events = validated.len(),
            "register event-bearing type"
        );
        Ok(Arc::clone(
            self.registry.entry(key).or_insert(validated).value(),
        ))
    }

    pub fn is_registered<T: Observable>(&self) -> bool {
        self.registry.contains_key(&TypeId::of::<T>())
    }

    /// 为实例物化并安装全部声明的事件
    ///
    /// 安装前先逐一核对实例上的同名事件及其参数类型，任何一项不符都不会改动实例。
    pub fn bind<T: Observable>(&self, instance: &mut T) -> EventResult<()> {
        let events = self.register::<T>()?;
        for declaration in events.declarations() {
            check_slot(instance, events.type_name(), declaration)?;
        }
        for declaration in events.declarations() {
            instance.install_event(declaration.materialize(&self.config))?;
        }
        tracing::debug!(
            type_name = events.type_name(),
            events = events.len(),
            "bind events"
        );
        Ok(())
    }

    /// 工厂形式：绑定后返回实例
    pub fn construct<T: Observable>(&self, mut instance: T) -> EventResult<T> {
        self.bind(&mut instance)?;
        Ok(instance)
    }
}

fn check_slot<T: Observable>(
    instance: &T,
    type_name: &'static str,
    declaration: &EventDeclaration,
) -> EventResult<()> {
    let slot = instance
        .event(declaration.name())
        .ok_or_else(|| EventError::UnknownEvent {
            type_name,
            event: declaration.name().to_string(),
        })?;
    if slot.args_type() != declaration.args_type() {
        return Err(EventError::SignatureMismatch {
            event: declaration.name().to_string(),
            expected: slot.args_type_name(),
            found: declaration.args_type_name(),
        });
    }
    Ok(())
}
