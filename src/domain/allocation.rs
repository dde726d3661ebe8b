// ==========================================
// 跨境库存补货决策系统 - 多变体配比实体
// ==========================================
// 不变量: 各配比之和必须为 1.0（容差内），否则整组跳过
// ==========================================

use serde::{Deserialize, Serialize};

/// 配比之和允许的浮点容差
pub const ALLOCATION_SUM_TOLERANCE: f64 = 1e-6;

// ==========================================
// AllocationEntry - 单个变体的目标配比
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// 变体标题子串匹配标签
    pub match_label: String,
    /// 目标占比 (0.0, 1.0]
    pub percentage: f64,
}

// ==========================================
// VariantAllocation - 多变体 SKU 配比组
// ==========================================
/// 一个逻辑 SKU 在平台侧的多变体目标拆分配置（跨周期持久，来自配置）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantAllocation {
    pub sku_code: String,
    /// 按序迭代；最后一项取精确余数以吸收取整误差
    pub entries: Vec<AllocationEntry>,
}

impl VariantAllocation {
    /// 校验配比之和是否为 1.0（容差内）
    pub fn is_valid(&self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let sum: f64 = self.entries.iter().map(|e| e.percentage).sum();
        (sum - 1.0).abs() <= ALLOCATION_SUM_TOLERANCE
    }
}

// ==========================================
// StockAdjustment - 平台侧库存调整指令
// ==========================================
/// 批量调整调用中的单条 delta；delta 为 0 的变体不提交
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub inventory_item_id: String,
    pub delta: i64,
}
