//! 事件参数（Args）
//!
//! 携带发送方的通用事件参数：`sender` 标识触发事件的实例，`payload` 为其余内容。
//! 事件参数可以是任意类型，`Args` 只是最常见形状的现成写法。
//!
use serde::Serialize;

/// 带发送方的事件参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Args<S, P = ()> {
    pub sender: S,
    pub payload: P,
}

impl<S, P> Args<S, P> {
    pub fn new(sender: S, payload: P) -> Self {
        Self { sender, payload }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// 保留发送方，替换内容
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Args<S, Q> {
        Args {
            sender: self.sender,
            payload: f(self.payload),
        }
    }
}

impl<S> Args<S> {
    /// 只有发送方、没有其余内容的参数
    pub fn from_sender(sender: S) -> Self {
        Self::new(sender, ())
    }
}
