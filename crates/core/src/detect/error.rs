use thiserror::Error;

/// # Summary
/// 检测引擎域错误枚举。
///
/// # Invariants
/// - 检测失败时本轮不得提交任何告警（全有或全无）。
#[derive(Error, Debug)]
pub enum DetectError {
    // 检测器求值过程中的错误
    #[error("Detector '{rule}' failed: {message}")]
    Detector { rule: String, message: String },
    // 底层数据源读取失败
    #[error("Data source error: {0}")]
    DataSource(String),
}
