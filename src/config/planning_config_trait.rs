// ==========================================
// 跨境库存补货决策系统 - 计划配置读取 Trait
// ==========================================
// 职责: 定义决策引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::EngineThresholds;
use crate::domain::types::{BurnRatePeriod, UnknownEtaPolicy};
use crate::domain::VariantAllocation;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 用途: 分类/预警/再均衡引擎所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PlanningConfigReader: Send + Sync {
    // ===== 预警阈值配置 =====

    /// 获取严重低库存数量阈值
    ///
    /// # 默认值
    /// - 50
    async fn get_critical_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取低库存数量阈值
    ///
    /// # 默认值
    /// - 200
    async fn get_low_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取续航天数阈值（低于此天数才可进入 Low/Critical）
    ///
    /// # 默认值
    /// - 90
    async fn get_runway_threshold_days(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    // ===== 分类引擎配置 =====

    /// 获取目标备货天数（need 计算的 target 口径）
    ///
    /// # 默认值
    /// - 30
    async fn get_target_days(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取日销速率窗口
    ///
    /// # 默认值
    /// - DAYS_21
    async fn get_burn_rate_period(&self) -> Result<BurnRatePeriod, Box<dyn Error + Send + Sync>>;

    /// 获取海运 ETA 未知时的口径
    ///
    /// # 默认值
    /// - OMIT_FROM_GAP（沿用源系统口径，但标记人工复核）
    async fn get_unknown_eta_policy(&self) -> Result<UnknownEtaPolicy, Box<dyn Error + Send + Sync>>;

    // ===== 仓库配置 =====

    /// 获取 LA 近仓名列表（计入主可售池的两个仓）
    async fn get_near_locations(&self) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;

    /// 获取国内仓名
    async fn get_china_location(&self) -> Result<String, Box<dyn Error + Send + Sync>>;

    // ===== 多变体配比配置 =====

    /// 获取多变体 SKU 配比表（JSON 存储）
    ///
    /// 配置缺失或格式错误时返回空表（不启用再均衡）
    async fn get_variant_allocations(&self) -> Result<Vec<VariantAllocation>, Box<dyn Error + Send + Sync>>;

    // ===== 周期预算 =====

    /// 获取刷新周期墙钟预算（秒）
    ///
    /// # 默认值
    /// - 120
    async fn get_cycle_budget_secs(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    // ===== 配置留痕 =====

    /// 导出当前全局配置快照（JSON），周期开始时记录生效口径
    async fn export_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>>;

    // ===== 组合读取 =====

    /// 一次性读取引擎阈值快照（周期开始时调用一次，周期内不再回读）
    async fn load_engine_thresholds(&self) -> Result<EngineThresholds, Box<dyn Error + Send + Sync>> {
        Ok(EngineThresholds {
            critical_threshold: self.get_critical_threshold().await?,
            low_threshold: self.get_low_threshold().await?,
            runway_threshold_days: self.get_runway_threshold_days().await?,
            target_days: self.get_target_days().await?,
            burn_rate_period: self.get_burn_rate_period().await?,
            unknown_eta_policy: self.get_unknown_eta_policy().await?,
        })
    }
}
