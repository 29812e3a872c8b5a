//! 事件配置
//!
//! `EventConfig` 决定一次触发如何对待处理器失败，以及是否逐个记录处理器调用。
//! 绑定器持有一份默认配置，单个事件声明可以覆写分发策略。
//!
use bon::Builder;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// 处理器失败时的分发策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// 第一个失败的处理器中止本次分发，其后的处理器不再调用（默认）
    #[default]
    FailFast,
    /// 调用全部处理器，收集失败后一并返回
    ContinueOnError,
}

impl DispatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPolicy::FailFast => "fail_fast",
            DispatchPolicy::ContinueOnError => "continue_on_error",
        }
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析失败时返回的错误
#[derive(Debug, thiserror::Error)]
#[error("unknown dispatch policy: {0}; expected 'fail_fast' | 'continue_on_error'")]
pub struct ParsePolicyError(String);

impl FromStr for DispatchPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fail_fast" | "fail-fast" => Ok(DispatchPolicy::FailFast),
            "continue_on_error" | "continue-on-error" => Ok(DispatchPolicy::ContinueOnError),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// 事件配置
#[derive(Builder, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventConfig {
    /// 处理器失败时的分发策略
    #[builder(default)]
    pub policy: DispatchPolicy,
    /// 是否为每个处理器调用输出 trace 日志
    #[builder(default)]
    pub trace_dispatch: bool,
}

impl EventConfig {
    /// 用给定策略覆写，保留其余配置
    pub fn with_policy(self, policy: DispatchPolicy) -> Self {
        Self { policy, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_both_spellings() {
        assert_eq!(
            "fail_fast".parse::<DispatchPolicy>().unwrap(),
            DispatchPolicy::FailFast
        );
        assert_eq!(
            "continue-on-error".parse::<DispatchPolicy>().unwrap(),
            DispatchPolicy::ContinueOnError
        );
        assert!("retry".parse::<DispatchPolicy>().is_err());
    }

    #[test]
    fn builder_defaults_match_default() {
        let cfg = EventConfig::builder().build();
        assert_eq!(cfg, EventConfig::default());
        assert_eq!(cfg.policy, DispatchPolicy::FailFast);
        assert!(!cfg.trace_dispatch);

        let cfg = EventConfig::builder()
            .policy(DispatchPolicy::ContinueOnError)
            .trace_dispatch(true)
            .build();
        assert_eq!(cfg.with_policy(DispatchPolicy::FailFast).policy, DispatchPolicy::FailFast);
        assert!(cfg.trace_dispatch);
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&DispatchPolicy::ContinueOnError).unwrap();
        assert_eq!(json, "\"continue_on_error\"");
    }
}
