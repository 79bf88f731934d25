use thiserror::Error;

/// # Summary
/// 规则配置域错误枚举。所有变体都指明出错的字段，
/// 供调用方以稳定的机器可读形式转发给前端。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// 规则族不在已识别集合内
    #[error("Unknown rule: {0}")]
    UnknownRule(String),
    /// 参数名不属于该规则族
    #[error("Unknown parameter '{param}' for rule '{rule}'")]
    UnknownParameter { rule: String, param: String },
    /// 参数值越界，拒绝写入且原值保持不变
    #[error("Parameter '{param}' of rule '{rule}' out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        rule: String,
        param: String,
        value: String,
        min: String,
        max: String,
    },
    /// 参数类型不符（整数参数收到小数，或反之）
    #[error("Parameter '{param}' of rule '{rule}' expects {expected}")]
    WrongType {
        rule: String,
        param: String,
        expected: &'static str,
    },
}
