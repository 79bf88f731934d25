use super::entity::AlertStatus;

/// # Summary
/// 状态迁移策略端口。原系统允许任意状态之间自由切换（操作员覆写），
/// 但更严格的工作流（如终态不可重开）可以通过替换实现来叠加，
/// 无需改动核心模型。
pub trait TransitionPolicy: Send + Sync {
    /// 判断从 `from` 迁移到 `to` 是否被允许。
    fn allows(&self, from: AlertStatus, to: AlertStatus) -> bool;
}

/// # Summary
/// 默认策略：四个状态值之间任意迁移均合法。
/// 迁移请求仅受状态值本身合法性约束，不受顺序图约束。
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

impl TransitionPolicy for PermissivePolicy {
    fn allows(&self, _from: AlertStatus, _to: AlertStatus) -> bool {
        true
    }
}

/// # Summary
/// 严格策略：CLOSED / FALSE_POSITIVE 为终态，进入后不允许再变更。
/// 当前未在默认装配中启用，作为可插拔的加固选项保留。
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalStatePolicy;

impl TransitionPolicy for TerminalStatePolicy {
    fn allows(&self, from: AlertStatus, to: AlertStatus) -> bool {
        if from == to {
            return true;
        }
        !matches!(from, AlertStatus::Closed | AlertStatus::FalsePositive)
    }
}
