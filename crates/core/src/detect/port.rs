use super::entity::{AlertDraft, DetectionInput};
use super::error::DetectError;
use crate::rules::entity::{RuleConfig, RuleName};

/// # Summary
/// 检测器端口。每个规则族对应一个实现，对成交快照求值并产出
/// 零个或多个告警草稿。实现必须是纯函数式的：相同输入与配置
/// 产出相同草稿集。
pub trait Detector: Send + Sync {
    /// 本检测器所属的规则族。
    fn rule_name(&self) -> RuleName;

    /// # Summary
    /// 对一轮检测输入求值。
    ///
    /// # Arguments
    /// * `input` - 成交快照与参考时刻。
    /// * `config` - 本规则族在运行启动时刻的配置快照。
    ///
    /// # Returns
    /// 告警草稿列表；无可疑模式时返回空列表而非错误。
    fn evaluate(
        &self,
        input: &DetectionInput,
        config: &RuleConfig,
    ) -> Result<Vec<AlertDraft>, DetectError>;
}
