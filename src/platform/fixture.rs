// ==========================================
// 跨境库存补货决策系统 - JSON 夹具平台
// ==========================================
// 用途: 离线运行与集成测试的平台实现
// 数据源: 目录内固定命名的 JSON 文件
// 说明: 库存调整只作用于内存副本；幂等令牌重复提交不二次生效
// ==========================================

use crate::domain::{
    AlertNotification, IncomingShipment, ProductionOrderPending, SkuInventory, StockAdjustment,
    VariantStock, VelocitySample,
};
use crate::platform::error::{PlatformError, PlatformResult};
use crate::platform::traits::{InventoryPlatform, NotificationSink};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

// ==========================================
// 夹具文件名
// ==========================================
pub const SNAPSHOT_FILE: &str = "inventory_snapshot.json";
pub const VELOCITY_FILE: &str = "velocity.json";
pub const SHIPMENTS_FILE: &str = "incoming_shipments.json";
pub const PRODUCTION_FILE: &str = "production_orders.json";
pub const PHASE_OUT_FILE: &str = "phase_out.json";
pub const VARIANT_STOCK_FILE: &str = "variant_stock.json";

/// variant_stock.json 中的单条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStockFixture {
    pub sku_code: String,
    pub location: String,
    pub variants: Vec<VariantStock>,
}

// ==========================================
// FixturePlatform - JSON 文件夹具平台
// ==========================================
pub struct FixturePlatform {
    root: PathBuf,
    /// (sku_code, location) → 变体现货（调整后的内存副本）
    variant_stock: Mutex<HashMap<(String, String), Vec<VariantStock>>>,
    /// 已生效的幂等令牌
    applied_tokens: Mutex<HashSet<String>>,
    /// 已提交的调整批次（测试断言用）
    adjustment_log: Mutex<Vec<(String, Vec<StockAdjustment>)>>,
}

impl FixturePlatform {
    /// 从夹具目录创建平台实例
    ///
    /// variant_stock.json 缺失时再均衡数据为空（全部 SKU 组跳过）
    pub fn new(root: impl AsRef<Path>) -> PlatformResult<Self> {
        let root = root.as_ref().to_path_buf();

        let fixtures: Vec<VariantStockFixture> =
            read_json_or_default(&root.join(VARIANT_STOCK_FILE))?;
        let variant_stock = fixtures
            .into_iter()
            .map(|f| ((f.sku_code, f.location), f.variants))
            .collect();

        Ok(Self {
            root,
            variant_stock: Mutex::new(variant_stock),
            applied_tokens: Mutex::new(HashSet::new()),
            adjustment_log: Mutex::new(Vec::new()),
        })
    }

    /// 读取已提交的调整批次（测试断言用）
    pub fn adjustment_log(&self) -> Vec<(String, Vec<StockAdjustment>)> {
        self.adjustment_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// 读取调整后的变体现货（测试断言用）
    pub fn variant_stock_of(&self, sku_code: &str, location: &str) -> Vec<VariantStock> {
        self.variant_stock
            .lock()
            .ok()
            .and_then(|m| m.get(&(sku_code.to_string(), location.to_string())).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InventoryPlatform for FixturePlatform {
    async fn fetch_inventory_snapshot(&self) -> PlatformResult<Vec<SkuInventory>> {
        // 快照是致命前置条件，文件缺失直接报错
        let path = self.root.join(SNAPSHOT_FILE);
        if !path.exists() {
            return Err(PlatformError::SourceUnavailable {
                source_name: SNAPSHOT_FILE.to_string(),
            });
        }
        read_json(&path)
    }

    async fn fetch_velocity(&self) -> PlatformResult<Vec<VelocitySample>> {
        read_json_or_default(&self.root.join(VELOCITY_FILE))
    }

    async fn fetch_incoming_shipments(&self) -> PlatformResult<Vec<IncomingShipment>> {
        read_json_or_default(&self.root.join(SHIPMENTS_FILE))
    }

    async fn fetch_pending_production_orders(
        &self,
    ) -> PlatformResult<Vec<ProductionOrderPending>> {
        read_json_or_default(&self.root.join(PRODUCTION_FILE))
    }

    async fn fetch_phase_out_set(&self) -> PlatformResult<HashSet<String>> {
        let skus: Vec<String> = read_json_or_default(&self.root.join(PHASE_OUT_FILE))?;
        Ok(skus.into_iter().collect())
    }

    async fn fetch_variant_stock(
        &self,
        sku_code: &str,
        location: &str,
    ) -> PlatformResult<Vec<VariantStock>> {
        let stock = self
            .variant_stock
            .lock()
            .map_err(|e| PlatformError::RequestFailed(format!("锁获取失败: {}", e)))?;
        Ok(stock
            .get(&(sku_code.to_string(), location.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn adjust_stock_batch(
        &self,
        location: &str,
        adjustments: &[StockAdjustment],
        idempotency_token: &str,
    ) -> PlatformResult<()> {
        {
            let mut tokens = self
                .applied_tokens
                .lock()
                .map_err(|e| PlatformError::RequestFailed(format!("锁获取失败: {}", e)))?;
            if !tokens.insert(idempotency_token.to_string()) {
                info!(token = idempotency_token, "幂等令牌已生效，跳过重复调整");
                return Ok(());
            }
        }

        let mut stock = self
            .variant_stock
            .lock()
            .map_err(|e| PlatformError::RequestFailed(format!("锁获取失败: {}", e)))?;

        for ((_, loc), variants) in stock.iter_mut() {
            if loc != location {
                continue;
            }
            for variant in variants.iter_mut() {
                if let Some(item_id) = &variant.inventory_item_id {
                    if let Some(adj) = adjustments.iter().find(|a| &a.inventory_item_id == item_id)
                    {
                        variant.available += adj.delta;
                    }
                }
            }
        }

        self.adjustment_log
            .lock()
            .map_err(|e| PlatformError::RequestFailed(format!("锁获取失败: {}", e)))?
            .push((idempotency_token.to_string(), adjustments.to_vec()));

        Ok(())
    }
}

// ==========================================
// LogNotificationSink - 日志通知通道
// ==========================================
/// 把通知内容打到日志的离线实现
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, payload: &AlertNotification) -> PlatformResult<()> {
        let summary = payload.summary();
        info!(
            zero_count = summary.zero_count,
            critical_count = summary.critical_count,
            low_count = summary.low_count,
            "发送库存预警通知"
        );
        for line in payload
            .zero_stock
            .iter()
            .chain(&payload.critical)
            .chain(&payload.low)
        {
            info!(
                sku = %line.sku_code,
                name = %line.display_name,
                quantity = line.quantity,
                runway_air_days = line.runway_air_days,
                phase_out = line.phase_out,
                "预警明细"
            );
        }
        Ok(())
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> PlatformResult<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PlatformError::RequestFailed(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| PlatformError::MalformedResponse(format!("{}: {}", path.display(), e)))
}

/// 文件缺失按空数据处理（数据源降级口径），格式错误仍然报错
fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(
    path: &Path,
) -> PlatformResult<T> {
    if !path.exists() {
        warn!(file = %path.display(), "夹具文件缺失，按空数据处理");
        return Ok(T::default());
    }
    read_json(path)
}
