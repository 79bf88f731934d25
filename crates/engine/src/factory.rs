use vigil_core::detect::port::Detector;

use crate::high_frequency::HighFrequencyDetector;
use crate::self_trade::SelfTradeDetector;
use crate::wash_trade::WashTradeDetector;

/// 返回全部内置检测器。禁用规则的跳过由运行编排层依据配置快照完成。
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(SelfTradeDetector),
        Box::new(WashTradeDetector),
        Box::new(HighFrequencyDetector),
    ]
}
