//! 事件系统统一错误定义
//!
//! 聚焦订阅列表、类型声明/绑定与处理器分发三类错误，
//! 所有可失败的 API 统一返回 `EventResult<T>`。
//!
use std::fmt;
use thiserror::Error;

/// 单个处理器在一次分发中的失败记录（`ContinueOnError` 策略下收集）
#[derive(Debug)]
pub struct HandlerFailure {
    /// 处理器在本次快照中的位置（按订阅顺序）
    pub index: usize,
    /// 处理器标签
    pub handler: String,
    /// 处理器返回的错误
    pub source: anyhow::Error,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.handler, self.source)
    }
}

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    // --- 订阅列表 ---
    #[error("invalid handler: event={event}, expected handler for {expected}")]
    InvalidHandler {
        event: String,
        expected: &'static str,
    },
    #[error("handler not found: event={event}, handler={handler}")]
    HandlerNotFound { event: String, handler: String },

    // --- 声明/绑定 ---
    #[error("type is not event-bearing: {type_name}")]
    NotEventBearing { type_name: &'static str },
    #[error("declaration conflict: type={type_name}, event={event}")]
    DeclarationConflict {
        type_name: &'static str,
        event: &'static str,
    },
    #[error("signature mismatch: event={event}, expected={expected}, found={found}")]
    SignatureMismatch {
        event: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown event: type={type_name}, event={event}")]
    UnknownEvent {
        type_name: &'static str,
        event: String,
    },

    // --- 分发 ---
    #[error("handler failed: event={event}, handler={handler}, index={index}")]
    HandlerFailed {
        event: String,
        handler: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("dispatch failed: event={event}, failed={}", .failures.len())]
    DispatchFailed {
        event: String,
        failures: Vec<HandlerFailure>,
    },
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;

impl EventError {
    /// 本次分发中失败的处理器数量；非分发错误返回 0
    pub fn failed_handlers(&self) -> usize {
        match self {
            EventError::HandlerFailed { .. } => 1,
            EventError::DispatchFailed { failures, .. } => failures.len(),
            _ => 0,
        }
    }
}
