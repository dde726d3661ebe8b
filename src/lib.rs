// ==========================================
// 跨境库存补货决策系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (建议为主, 仅再均衡直接写平台)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 数据仓储层 - 预警状态持久化
pub mod repository;

// 平台层 - 电商平台/通知通道抽象
pub mod platform;

// 引擎层 - 业务规则
pub mod engine;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertTier, BurnRatePeriod, ProdStatus, ShipMode, ShipType, UnknownEtaPolicy,
};

// 领域实体
pub use domain::{
    AlertNotification, AlertRecord, AlertSummary, IncomingShipment, SkuInventory,
    VariantAllocation, VariantStock, VelocitySample,
};

// 配置
pub use config::{ConfigManager, EngineThresholds, PlanningConfigReader};

// 平台抽象
pub use platform::{FixturePlatform, InventoryPlatform, LogNotificationSink, NotificationSink};

// 引擎
pub use engine::{
    AlertEngine, ClassificationEngine, RefreshOrchestrator, RefreshResult, VariantRebalancer,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "跨境库存补货决策系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
