// ==========================================
// 跨境库存补货决策系统 - 日销速率实体
// ==========================================
// 口径: 固定回看窗口的日均销量（简单移动平均，非预测模型）
// ==========================================

use crate::domain::types::BurnRatePeriod;
use serde::{Deserialize, Serialize};

// ==========================================
// VelocitySample - SKU 日销速率样本
// ==========================================
/// 单个 SKU 在各固定窗口的日均销量
///
/// 非负浮点；0 表示近期无销量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocitySample {
    pub sku_code: String,
    /// 近7天日均
    pub avg_daily_7d: f64,
    /// 近21天日均
    pub avg_daily_21d: f64,
    /// 近90天日均
    pub avg_daily_90d: f64,
    /// 去年同期30天日均（季节性参考，不参与分类）
    pub avg_daily_last_year_30d: f64,
}

impl VelocitySample {
    /// 全零样本（速率数据缺失时的计划口径）
    pub fn zero(sku_code: impl Into<String>) -> Self {
        Self {
            sku_code: sku_code.into(),
            avg_daily_7d: 0.0,
            avg_daily_21d: 0.0,
            avg_daily_90d: 0.0,
            avg_daily_last_year_30d: 0.0,
        }
    }

    /// 按配置窗口取日销速率
    pub fn rate_for(&self, period: BurnRatePeriod) -> f64 {
        match period {
            BurnRatePeriod::Days7 => self.avg_daily_7d,
            BurnRatePeriod::Days21 => self.avg_daily_21d,
            BurnRatePeriod::Days90 => self.avg_daily_90d,
        }
    }
}
