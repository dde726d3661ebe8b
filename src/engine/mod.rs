// ==========================================
// 跨境库存补货决策系统 - 引擎层
// ==========================================
// 职责: 实现补货分类/低库存预警/多变体再均衡三套业务规则引擎
// 红线: Engine 不拼 SQL, 纯函数判定 + 编排器负责 IO
// ==========================================

pub mod alert;
pub mod classification;
pub mod orchestrator;
pub mod rebalancer;

// 重导出核心引擎
pub use alert::{AlertCycleOutcome, AlertEngine, AlertInput};
pub use classification::{
    ClassificationEngine, ClassificationResult, SkuPlanningInput, SkuPlanningReport,
    RUNWAY_SENTINEL_DAYS, SEA_GAP_PAD_DAYS,
};
pub use orchestrator::{EngineError, RefreshOrchestrator, RefreshResult};
pub use rebalancer::{RebalanceOutcome, RebalanceReport, VariantRebalancer};
