//! # `vigil-store` - 存储层实现
//!
//! 提供 `vigil-core` 各存储端口的具体实现：
//! - [`alert::SqliteAlertStore`] / [`data::SqliteTradeDataStore`]：
//!   基于 `sqlx` 的 SQLite 持久化（WAL 模式）。
//! - [`rules::MemoryRuleStore`]：基于 `DashMap` 的进程内规则配置存储。

pub mod alert;
pub mod config;
pub mod data;
pub mod rules;
