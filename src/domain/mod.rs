// ==========================================
// 跨境库存补货决策系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不含业务规则
// 所有实体每周期整体重建；仅 AlertRecord 与配比配置跨周期持久
// ==========================================

pub mod alert;
pub mod allocation;
pub mod inventory;
pub mod shipment;
pub mod types;
pub mod velocity;

// 重导出核心实体
pub use alert::{AlertLine, AlertNotification, AlertRecord, AlertSummary};
pub use allocation::{AllocationEntry, StockAdjustment, VariantAllocation};
pub use inventory::{SkuInventory, VariantStock};
pub use shipment::{IncomingShipment, IncomingTotals, ProductionOrderPending};
pub use velocity::VelocitySample;
