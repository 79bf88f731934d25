//! # `vigil-core` - 领域模型与端口定义
//!
//! 本 crate 定义合规监控系统的全部领域实体（告警、规则配置、交易数据）、
//! 端口 Trait（AlertStore / RuleStore / TradeDataStore / Detector）以及
//! 跨层共享的错误枚举。不包含任何具体实现，下游 crate 通过
//! `Arc<dyn Trait>` 注入具体组件。

pub mod alert;
pub mod config;
pub mod data;
pub mod detect;
pub mod rules;
pub mod score;
pub mod store;
