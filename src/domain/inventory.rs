// ==========================================
// 跨境库存补货决策系统 - 库存实体
// ==========================================
// 生命周期: 每次刷新周期从平台快照整体重建，不做局部修改
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// SkuInventory - SKU 多仓库存
// ==========================================
/// 单个 SKU 在各仓库的可售库存快照
///
/// 每次刷新由平台快照整体重建；`total_available` 为派生值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuInventory {
    /// SKU 编码（唯一键）
    pub sku_code: String,
    /// 商品标题
    pub product_title: String,
    /// 变体标题
    pub variant_title: String,
    /// 仓库名 → 可售数量
    pub location_available: HashMap<String, f64>,
    /// 全仓可售合计（派生）
    pub total_available: f64,
}

impl SkuInventory {
    /// 从仓库明细构建，合计由明细派生
    pub fn new(
        sku_code: impl Into<String>,
        product_title: impl Into<String>,
        variant_title: impl Into<String>,
        location_available: HashMap<String, f64>,
    ) -> Self {
        let total_available = location_available.values().sum();
        Self {
            sku_code: sku_code.into(),
            product_title: product_title.into(),
            variant_title: variant_title.into(),
            location_available,
            total_available,
        }
    }

    /// 指定仓库的可售数量（缺失按 0 处理）
    pub fn available_at(&self, location: &str) -> f64 {
        self.location_available.get(location).copied().unwrap_or(0.0)
    }

    /// 展示名: 商品标题 + 变体标题
    pub fn display_name(&self) -> String {
        if self.variant_title.is_empty() {
            self.product_title.clone()
        } else {
            format!("{} - {}", self.product_title, self.variant_title)
        }
    }
}

// ==========================================
// VariantStock - 多变体均衡用的变体库存视图
// ==========================================
/// 再均衡引擎的输入: 同一逻辑 SKU 下某个平台变体在目标仓的现货
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStock {
    /// 平台变体标题（与配置的匹配标签做子串匹配）
    pub variant_title: String,
    /// 平台库存条目句柄；缺失时该变体不可调整
    pub inventory_item_id: Option<String>,
    /// 目标仓当前可售数量
    pub available: i64,
}
