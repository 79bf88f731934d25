//! # 规则参数表
//!
//! 以静态数据声明每个规则族的参数名、语义类型、合法区间与默认值。
//! 校验与默认值构造均以本表为唯一事实来源。

use std::collections::BTreeMap;

use super::entity::{ParamValue, RuleConfig, RuleName, RuleSetSnapshot};
use super::error::RuleError;

/// 参数语义类型及其合法区间与默认值。
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    Int { min: i64, max: i64, default: i64 },
    Fraction { min: f64, max: f64, default: f64 },
}

/// 单个参数的声明。
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

/// 单个规则族的声明。
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub rule: RuleName,
    pub default_enabled: bool,
    pub params: &'static [ParamSpec],
}

/// 已识别的规则族及其参数（名称、类型、区间、默认值）。
pub const RULE_SPECS: &[RuleSpec] = &[
    RuleSpec {
        rule: RuleName::SelfTrade,
        default_enabled: true,
        params: &[
            ParamSpec {
                name: "time_window_hours",
                kind: ParamKind::Int { min: 1, max: 168, default: 24 },
            },
            ParamSpec {
                name: "min_trade_pairs",
                kind: ParamKind::Int { min: 2, max: 20, default: 4 },
            },
            ParamSpec {
                name: "offsetting_threshold",
                kind: ParamKind::Fraction { min: 0.1, max: 1.0, default: 0.7 },
            },
        ],
    },
    RuleSpec {
        rule: RuleName::WashTrade,
        default_enabled: true,
        params: &[
            ParamSpec {
                name: "time_window_days",
                kind: ParamKind::Int { min: 1, max: 30, default: 7 },
            },
            ParamSpec {
                name: "min_trade_count",
                kind: ParamKind::Int { min: 4, max: 50, default: 6 },
            },
            ParamSpec {
                name: "position_threshold",
                kind: ParamKind::Fraction { min: 0.01, max: 0.5, default: 0.1 },
            },
        ],
    },
    RuleSpec {
        rule: RuleName::HighFrequency,
        default_enabled: true,
        params: &[
            ParamSpec {
                name: "trades_per_hour",
                kind: ParamKind::Int { min: 10, max: 500, default: 50 },
            },
            ParamSpec {
                name: "alert_threshold",
                kind: ParamKind::Int { min: 50, max: 1000, default: 100 },
            },
        ],
    },
];

/// 查找规则族声明。
pub fn rule_spec(rule: RuleName) -> Option<&'static RuleSpec> {
    RULE_SPECS.iter().find(|s| s.rule == rule)
}

/// # Summary
/// 构造单个规则族的默认配置。
pub fn default_config(rule: RuleName) -> Option<RuleConfig> {
    let spec = rule_spec(rule)?;
    let mut params = BTreeMap::new();
    for p in spec.params {
        let value = match p.kind {
            ParamKind::Int { default, .. } => ParamValue::Int(default),
            ParamKind::Fraction { default, .. } => ParamValue::Fraction(default),
        };
        params.insert(p.name.to_string(), value);
    }
    Some(RuleConfig {
        enabled: spec.default_enabled,
        params,
    })
}

/// 构造全部规则族的默认快照。
pub fn default_snapshot() -> RuleSetSnapshot {
    let mut rules = BTreeMap::new();
    for spec in RULE_SPECS {
        if let Some(cfg) = default_config(spec.rule) {
            rules.insert(spec.rule, cfg);
        }
    }
    RuleSetSnapshot { rules }
}

/// # Summary
/// 校验一次参数写入。
///
/// # Logic
/// 1. 参数名必须在规则族声明中存在，否则 `UnknownParameter`。
/// 2. 值的语义类型必须与声明一致，否则 `WrongType`。
/// 3. 值必须落在 [min, max] 闭区间内，否则 `OutOfRange`。
pub fn validate(rule: RuleName, param: &str, value: &ParamValue) -> Result<(), RuleError> {
    let spec = rule_spec(rule).ok_or_else(|| RuleError::UnknownRule(rule.to_string()))?;
    let param_spec = spec
        .params
        .iter()
        .find(|p| p.name == param)
        .ok_or_else(|| RuleError::UnknownParameter {
            rule: rule.to_string(),
            param: param.to_string(),
        })?;

    match (param_spec.kind, value) {
        (ParamKind::Int { min, max, .. }, ParamValue::Int(i)) => {
            if *i < min || *i > max {
                return Err(RuleError::OutOfRange {
                    rule: rule.to_string(),
                    param: param.to_string(),
                    value: i.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
            Ok(())
        }
        (ParamKind::Fraction { min, max, .. }, ParamValue::Fraction(f)) => {
            if *f < min || *f > max || !f.is_finite() {
                return Err(RuleError::OutOfRange {
                    rule: rule.to_string(),
                    param: param.to_string(),
                    value: f.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
            Ok(())
        }
        (ParamKind::Int { .. }, ParamValue::Fraction(_)) => Err(RuleError::WrongType {
            rule: rule.to_string(),
            param: param.to_string(),
            expected: "an integer",
        }),
        (ParamKind::Fraction { .. }, ParamValue::Int(_)) => Err(RuleError::WrongType {
            rule: rule.to_string(),
            param: param.to_string(),
            expected: "a fraction",
        }),
    }
}
