use super::entity::{ParamValue, RuleConfig, RuleName, RuleSetSnapshot};
use super::error::RuleError;

/// # Summary
/// 规则配置存储接口。配置以进程为生命周期：随默认值创建、
/// 由操作员修改、从不删除（重置即恢复默认）。
///
/// # Invariants
/// - 越界 / 类型不符的写入必须被整体拒绝，已存值保持不变。
/// - 写入成功后对所有后续读取以及下一轮检测运行可见；
///   进行中的运行继续使用其启动时的快照。
pub trait RuleStore: Send + Sync {
    /// 获取单个规则族的当前配置，未识别的规则返回 `UnknownRule`。
    fn get(&self, rule: RuleName) -> Result<RuleConfig, RuleError>;

    /// 按声明区间与类型校验后写入参数，返回更新后的配置。
    fn set_parameter(
        &self,
        rule: RuleName,
        param: &str,
        value: ParamValue,
    ) -> Result<RuleConfig, RuleError>;

    /// 切换规则族的求值开关。
    fn set_enabled(&self, rule: RuleName, enabled: bool) -> Result<RuleConfig, RuleError>;

    /// 恢复内置默认值。`rule` 为 None 时重置全部规则族。
    fn reset(&self, rule: Option<RuleName>) -> Result<(), RuleError>;

    /// 设置页列表：全部规则族及其当前配置，按声明顺序。
    fn list(&self) -> Vec<(RuleName, RuleConfig)>;

    /// 一致性快照，检测运行启动时读取一次。
    fn snapshot(&self) -> RuleSetSnapshot;
}
