//! # `vigil-engine` - 检测引擎
//!
//! 实现 `vigil-core` 的 [`Detector`](vigil_core::detect::port::Detector)
//! 端口：每个规则族一个检测器，对成交快照与运行启动时刻的规则配置
//! 快照求值，产出告警草稿。检测器均为纯函数，落库与去重由上层完成。

pub mod factory;
pub mod high_frequency;
pub mod self_trade;
pub mod wash_trade;

#[cfg(test)]
pub(crate) mod test_support;
