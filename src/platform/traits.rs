// ==========================================
// 跨境库存补货决策系统 - 外部协作方接口
// ==========================================
// 职责: 定义电商平台与通知通道的抽象契约
// 红线: 引擎内不做任何网络调用，全部悬挂点都在这一层
// ==========================================

use crate::domain::{
    AlertNotification, IncomingShipment, ProductionOrderPending, SkuInventory, StockAdjustment,
    VariantStock, VelocitySample,
};
use crate::platform::error::PlatformResult;
use async_trait::async_trait;
use std::collections::HashSet;

// ==========================================
// InventoryPlatform Trait
// ==========================================
// 用途: 第三方电商平台的只读数据拉取 + 库存调整
// 实现者: 平台 API 客户端（传输层在本仓库范围之外）/ 测试夹具
#[async_trait]
pub trait InventoryPlatform: Send + Sync {
    /// 拉取全量库存快照（按 SKU 聚合多仓可售量）
    ///
    /// 这是周期唯一的致命前置条件：快照拿不到则整个周期中止
    async fn fetch_inventory_snapshot(&self) -> PlatformResult<Vec<SkuInventory>>;

    /// 拉取各 SKU 的日销速率样本
    async fn fetch_velocity(&self) -> PlatformResult<Vec<VelocitySample>>;

    /// 拉取在途货件台账
    async fn fetch_incoming_shipments(&self) -> PlatformResult<Vec<IncomingShipment>>;

    /// 拉取在产订单余量（ordered - received，仅 in_production/partial）
    async fn fetch_pending_production_orders(&self)
        -> PlatformResult<Vec<ProductionOrderPending>>;

    /// 拉取停售 SKU 集合
    async fn fetch_phase_out_set(&self) -> PlatformResult<HashSet<String>>;

    /// 拉取某逻辑 SKU 在目标仓的全部平台变体现货
    async fn fetch_variant_stock(
        &self,
        sku_code: &str,
        location: &str,
    ) -> PlatformResult<Vec<VariantStock>>;

    /// 批量提交库存调整（再均衡专用）
    ///
    /// # 参数
    /// - idempotency_token: 周期内容寻址令牌，重复提交不得二次生效
    async fn adjust_stock_batch(
        &self,
        location: &str,
        adjustments: &[StockAdjustment],
        idempotency_token: &str,
    ) -> PlatformResult<()>;
}

// ==========================================
// NotificationSink Trait
// ==========================================
// 用途: 出站通知通道（fire-and-forget）
// 失败语义: 记录日志即可，不重试、不阻塞预警状态持久化
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 发送本周期的批量预警通知（每周期至多一条）
    async fn send(&self, payload: &AlertNotification) -> PlatformResult<()>;
}
