use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// # Summary
/// 检测规则族枚举。每个规则族拥有独立的启用开关和参数集。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    SelfTrade,
    WashTrade,
    HighFrequency,
}

impl RuleName {
    /// 全部已识别的规则族，顺序即设置页展示顺序。
    pub const ALL: [RuleName; 3] = [
        RuleName::SelfTrade,
        RuleName::WashTrade,
        RuleName::HighFrequency,
    ];
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleName::SelfTrade => write!(f, "self_trade"),
            RuleName::WashTrade => write!(f, "wash_trade"),
            RuleName::HighFrequency => write!(f, "high_frequency"),
        }
    }
}

impl FromStr for RuleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "self_trade" => Ok(RuleName::SelfTrade),
            "wash_trade" => Ok(RuleName::WashTrade),
            "high_frequency" => Ok(RuleName::HighFrequency),
            _ => Err(format!("Unknown RuleName: {}", s)),
        }
    }
}

/// # Summary
/// 规则参数值。区分整数与小数两种语义类型，
/// 写入时按参数声明的类型校验，不做隐式转换。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Fraction(f64),
}

impl ParamValue {
    /// # Summary
    /// 从任意 JSON 值解析参数值。整数字面量解析为 `Int`，
    /// 其余数值解析为 `Fraction`，非数值返回 Err。
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        if let Some(i) = value.as_i64() {
            return Ok(ParamValue::Int(i));
        }
        if let Some(f) = value.as_f64() {
            return Ok(ParamValue::Fraction(f));
        }
        Err(format!("Expected a number, got: {}", value))
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Fraction(x) => write!(f, "{}", x),
        }
    }
}

/// # Summary
/// 单个规则族的当前配置。
///
/// # Invariants
/// - `params` 的每个值在任意时刻都处于参数声明的 [min, max] 区间内；
///   越界写入被拒绝而非截断，由 [`super::spec`] 校验保证。
/// - 禁用的规则在检测运行中不得被求值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub enabled: bool,
    pub params: BTreeMap<String, ParamValue>,
}

impl RuleConfig {
    /// 读取整数参数，缺失或类型不符时返回 None。
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.params.get(name) {
            Some(ParamValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// 读取小数参数，缺失或类型不符时返回 None。
    pub fn fraction(&self, name: &str) -> Option<f64> {
        match self.params.get(name) {
            Some(ParamValue::Fraction(f)) => Some(*f),
            _ => None,
        }
    }
}

/// # Summary
/// 一次检测运行开始时对全部规则配置的一致性快照。
/// 运行期间的并发配置修改不会回溯影响已开始的运行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetSnapshot {
    pub rules: BTreeMap<RuleName, RuleConfig>,
}

impl RuleSetSnapshot {
    pub fn get(&self, rule: RuleName) -> Option<&RuleConfig> {
        self.rules.get(&rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_name_roundtrip() {
        for r in RuleName::ALL {
            assert_eq!(r.to_string().parse::<RuleName>().unwrap(), r);
        }
    }

    #[test]
    fn param_value_from_json() {
        assert_eq!(
            ParamValue::from_json(&serde_json::json!(24)).unwrap(),
            ParamValue::Int(24)
        );
        assert_eq!(
            ParamValue::from_json(&serde_json::json!(0.7)).unwrap(),
            ParamValue::Fraction(0.7)
        );
        assert!(ParamValue::from_json(&serde_json::json!("24")).is_err());
    }
}
