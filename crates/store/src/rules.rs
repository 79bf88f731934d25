use dashmap::DashMap;
use std::collections::BTreeMap;
use tracing::info;

use vigil_core::rules::entity::{ParamValue, RuleConfig, RuleName, RuleSetSnapshot};
use vigil_core::rules::error::RuleError;
use vigil_core::rules::port::RuleStore;
use vigil_core::rules::spec;

/// # Summary
/// RuleStore 的进程内实现，基于并发哈希表 `DashMap`。
/// 配置随进程创建（内置默认值），由操作员修改，从不删除。
///
/// # Invariants
/// - 写入前经 [`spec::validate`] 校验，越界与类型不符整体拒绝，
///   表内已存值在拒绝路径上保持不变。
/// - `snapshot` 返回的是深拷贝，检测运行持有快照后不受后续写入影响。
pub struct MemoryRuleStore {
    configs: DashMap<RuleName, RuleConfig>,
}

impl MemoryRuleStore {
    /// 以内置默认值初始化全部规则族。
    pub fn new() -> Self {
        let configs = DashMap::new();
        for rule in RuleName::ALL {
            if let Some(cfg) = spec::default_config(rule) {
                configs.insert(rule, cfg);
            }
        }
        Self { configs }
    }
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore for MemoryRuleStore {
    fn get(&self, rule: RuleName) -> Result<RuleConfig, RuleError> {
        self.configs
            .get(&rule)
            .map(|c| c.clone())
            .ok_or_else(|| RuleError::UnknownRule(rule.to_string()))
    }

    fn set_parameter(
        &self,
        rule: RuleName,
        param: &str,
        value: ParamValue,
    ) -> Result<RuleConfig, RuleError> {
        // 先校验再写入，拒绝路径不触碰存量值
        spec::validate(rule, param, &value)?;

        let mut entry = self
            .configs
            .get_mut(&rule)
            .ok_or_else(|| RuleError::UnknownRule(rule.to_string()))?;
        entry.params.insert(param.to_string(), value);

        info!("Rule parameter updated: {}.{} = {}", rule, param, value);
        Ok(entry.clone())
    }

    fn set_enabled(&self, rule: RuleName, enabled: bool) -> Result<RuleConfig, RuleError> {
        let mut entry = self
            .configs
            .get_mut(&rule)
            .ok_or_else(|| RuleError::UnknownRule(rule.to_string()))?;
        entry.enabled = enabled;

        info!("Rule {} {}", rule, if enabled { "enabled" } else { "disabled" });
        Ok(entry.clone())
    }

    fn reset(&self, rule: Option<RuleName>) -> Result<(), RuleError> {
        match rule {
            Some(r) => {
                let cfg =
                    spec::default_config(r).ok_or_else(|| RuleError::UnknownRule(r.to_string()))?;
                self.configs.insert(r, cfg);
                info!("Rule {} reset to defaults", r);
            }
            None => {
                for r in RuleName::ALL {
                    if let Some(cfg) = spec::default_config(r) {
                        self.configs.insert(r, cfg);
                    }
                }
                info!("All rules reset to defaults");
            }
        }
        Ok(())
    }

    fn list(&self) -> Vec<(RuleName, RuleConfig)> {
        // 按声明顺序输出，而非 DashMap 的迭代顺序
        RuleName::ALL
            .into_iter()
            .filter_map(|r| self.configs.get(&r).map(|c| (r, c.clone())))
            .collect()
    }

    fn snapshot(&self) -> RuleSetSnapshot {
        let mut rules = BTreeMap::new();
        for entry in self.configs.iter() {
            rules.insert(*entry.key(), entry.value().clone());
        }
        RuleSetSnapshot { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_write_reads_back_exactly() {
        let store = MemoryRuleStore::new();
        let cfg = store
            .set_parameter(RuleName::SelfTrade, "min_trade_pairs", ParamValue::Int(6))
            .unwrap();
        assert_eq!(cfg.int("min_trade_pairs"), Some(6));
        assert_eq!(
            store.get(RuleName::SelfTrade).unwrap().int("min_trade_pairs"),
            Some(6)
        );
    }

    #[test]
    fn rejected_write_leaves_value_unchanged() {
        let store = MemoryRuleStore::new();
        store
            .set_parameter(
                RuleName::WashTrade,
                "position_threshold",
                ParamValue::Fraction(0.05),
            )
            .unwrap();

        // 0.9 超出 [0.01, 0.5]，必须拒绝且存量值不变
        let err = store
            .set_parameter(
                RuleName::WashTrade,
                "position_threshold",
                ParamValue::Fraction(0.9),
            )
            .unwrap_err();
        assert!(matches!(err, RuleError::OutOfRange { .. }));
        assert_eq!(
            store
                .get(RuleName::WashTrade)
                .unwrap()
                .fraction("position_threshold"),
            Some(0.05)
        );
    }

    #[test]
    fn rejection_is_idempotent() {
        let store = MemoryRuleStore::new();
        for _ in 0..3 {
            assert!(store
                .set_parameter(
                    RuleName::HighFrequency,
                    "trades_per_hour",
                    ParamValue::Int(1000),
                )
                .is_err());
        }
        assert_eq!(
            store
                .get(RuleName::HighFrequency)
                .unwrap()
                .int("trades_per_hour"),
            Some(50)
        );
    }

    #[test]
    fn reset_restores_defaults() {
        let store = MemoryRuleStore::new();
        store.set_enabled(RuleName::SelfTrade, false).unwrap();
        store
            .set_parameter(RuleName::SelfTrade, "time_window_hours", ParamValue::Int(48))
            .unwrap();

        store.reset(Some(RuleName::SelfTrade)).unwrap();
        let cfg = store.get(RuleName::SelfTrade).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.int("time_window_hours"), Some(24));
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let store = MemoryRuleStore::new();
        let snap = store.snapshot();
        store
            .set_parameter(RuleName::SelfTrade, "min_trade_pairs", ParamValue::Int(10))
            .unwrap();

        let frozen = snap.get(RuleName::SelfTrade).unwrap();
        assert_eq!(frozen.int("min_trade_pairs"), Some(4));
    }

    #[test]
    fn list_follows_declaration_order() {
        let store = MemoryRuleStore::new();
        let names: Vec<RuleName> = store.list().into_iter().map(|(r, _)| r).collect();
        assert_eq!(names, RuleName::ALL.to_vec());
    }
}
