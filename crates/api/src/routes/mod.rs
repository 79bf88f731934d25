//! 路由控制器集合，按资源分组。

pub mod alerts;
pub mod dashboard;
pub mod data;
pub mod rules;
