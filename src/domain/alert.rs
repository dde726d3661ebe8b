// ==========================================
// 跨境库存补货决策系统 - 预警实体
// ==========================================
// 红线: alert_state 表的写契约是"整表替换"，不是增量补丁
// ==========================================

use crate::domain::types::AlertTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// AlertRecord - 预警状态记录
// ==========================================
/// 单个 SKU 上一周期的预警状态（唯一跨周期持久化的引擎状态）
///
/// 每周期整体替换为当前 {Low, Critical, Zero} 等级的 SKU 集合；
/// 回到 None 等级的 SKU 隐式从存储中清除，即自动解除预警
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub sku_code: String,
    pub tier: AlertTier,
    /// 触发时的近仓数量
    pub quantity: f64,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// AlertLine - 出站通知中的单行
// ==========================================
/// 通知消息里展示的一行 SKU 信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertLine {
    pub sku_code: String,
    pub display_name: String,
    pub quantity: f64,
    /// 空运口径续航天数（零日销时为哨兵值）
    pub runway_air_days: f64,
    pub phase_out: bool,
}

// ==========================================
// AlertNotification - 每周期单条批量通知
// ==========================================
/// 本周期所有新触发预警，按等级分组；一个周期至多发送一条
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertNotification {
    pub zero_stock: Vec<AlertLine>,
    pub critical: Vec<AlertLine>,
    pub low: Vec<AlertLine>,
}

impl AlertNotification {
    /// 是否有任何需要通知的内容
    pub fn is_empty(&self) -> bool {
        self.zero_stock.is_empty() && self.critical.is_empty() && self.low.is_empty()
    }

    /// 周期汇总计数
    pub fn summary(&self) -> AlertSummary {
        AlertSummary {
            zero_count: self.zero_stock.len(),
            critical_count: self.critical.len(),
            low_count: self.low.len(),
        }
    }
}

// ==========================================
// AlertSummary - 周期预警汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub zero_count: usize,
    pub critical_count: usize,
    pub low_count: usize,
}

impl AlertSummary {
    pub fn total(&self) -> usize {
        self.zero_count + self.critical_count + self.low_count
    }
}
