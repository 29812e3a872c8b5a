//! 事件声明（EventDeclaration）
//!
//! 类型级的不可变模板：描述“该类型有一个名为 X、参数为 A 的事件”，
//! 附带文档与可选的分发策略。声明本身从不持有处理器，也从不被触发，
//! 只由绑定器读取并为每个实例物化出独立的 `Event<A>`。
//!
use crate::config::{DispatchPolicy, EventConfig};
use crate::erased::BoundEvent;
use crate::event::Event;
use std::any::{TypeId, type_name};
use std::fmt;

type Materializer = fn(&EventDeclaration, &EventConfig) -> BoundEvent;

/// 事件声明
#[derive(Clone)]
pub struct EventDeclaration {
    name: &'static str,
    owner: &'static str,
    signature: &'static str,
    doc: &'static str,
    args: TypeId,
    args_type_name: &'static str,
    policy: Option<DispatchPolicy>,
    materializer: Materializer,
}

impl EventDeclaration {
    /// 声明 `owner` 类型上名为 `name`、参数类型为 `A` 的事件
    pub fn of<A: 'static>(name: &'static str, owner: &'static str) -> Self {
        Self {
            name,
            owner,
            signature: type_name::<A>(),
            doc: "",
            args: TypeId::of::<A>(),
            args_type_name: type_name::<A>(),
            policy: None,
            materializer: materialize::<A>,
        }
    }

    /// 覆写参数签名的展示文本（默认取参数类型名）
    pub fn with_signature(self, signature: &'static str) -> Self {
        Self { signature, ..self }
    }

    pub fn with_doc(self, doc: &'static str) -> Self {
        Self { doc, ..self }
    }

    /// 为该事件单独指定分发策略
    pub fn with_policy(self, policy: DispatchPolicy) -> Self {
        Self {
            policy: Some(policy),
            ..self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    pub fn args_type(&self) -> TypeId {
        self.args
    }

    pub fn args_type_name(&self) -> &'static str {
        self.args_type_name
    }

    pub fn policy(&self) -> Option<DispatchPolicy> {
        self.policy
    }

    /// 在基础配置上叠加声明级覆写
    pub fn effective_config(&self, base: &EventConfig) -> EventConfig {
        match self.policy {
            Some(policy) => base.with_policy(policy),
            None => *base,
        }
    }

    /// 物化出一个全新的、处理器列表为空的事件
    pub fn materialize(&self, base: &EventConfig) -> BoundEvent {
        (self.materializer)(self, base)
    }
}

fn materialize<A: 'static>(declaration: &EventDeclaration, base: &EventConfig) -> BoundEvent {
    BoundEvent::new(
        declaration.name,
        Event::<A>::from_declaration(declaration.clone(), base),
    )
}

impl fmt::Debug for EventDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDeclaration")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("signature", &self.signature)
            .field("doc", &self.doc)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_carries_metadata() {
        let decl = EventDeclaration::of::<(String, u32)>("barked", "Dog")
            .with_signature("(sender, count)")
            .with_doc("Raised when the dog barks.");

        assert_eq!(decl.name(), "barked");
        assert_eq!(decl.owner(), "Dog");
        assert_eq!(decl.signature(), "(sender, count)");
        assert_eq!(decl.doc(), "Raised when the dog barks.");
        assert_eq!(decl.args_type(), TypeId::of::<(String, u32)>());
        assert_eq!(decl.policy(), None);
    }

    #[test]
    fn policy_override_wins_over_base_config() {
        let base = EventConfig::builder().trace_dispatch(true).build();
        let decl = EventDeclaration::of::<u8>("ping", "Probe");
        assert_eq!(decl.effective_config(&base), base);

        let decl = decl.with_policy(DispatchPolicy::ContinueOnError);
        let cfg = decl.effective_config(&base);
        assert_eq!(cfg.policy, DispatchPolicy::ContinueOnError);
        assert!(cfg.trace_dispatch);
    }

    #[test]
    fn each_materialization_is_a_fresh_event() {
        let decl = EventDeclaration::of::<u8>("ping", "Probe");
        let first = decl
            .materialize(&EventConfig::default())
            .into_event::<u8>()
            .unwrap();
        first.subscribe_fn(|_| Ok(()));

        let second = decl
            .materialize(&EventConfig::default())
            .into_event::<u8>()
            .unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(second.name(), "ping");
    }
}
