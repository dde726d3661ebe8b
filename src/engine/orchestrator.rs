// ==========================================
// 跨境库存补货决策系统 - 刷新周期编排器
// ==========================================
// 用途: 协调再均衡 → 快照拉取 → 分类 → 预警 → 持久化 → 通知
// 时序红线: 预警状态先持久化，通知后发送；
//           通知失败不得影响已持久化的状态
// ==========================================

use crate::config::PlanningConfigReader;
use crate::domain::types::BurnRatePeriod;
use crate::domain::{
    AlertSummary, IncomingShipment, IncomingTotals, ProductionOrderPending, SkuInventory,
    VelocitySample,
};
use crate::engine::alert::{AlertEngine, AlertInput};
use crate::engine::classification::{ClassificationEngine, SkuPlanningInput, SkuPlanningReport};
use crate::engine::rebalancer::{RebalanceReport, VariantRebalancer};
use crate::platform::{InventoryPlatform, NotificationSink, PlatformError};
use crate::repository::{AlertStateRepository, RepositoryError};
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 再均衡提交后等待平台收敛的秒数（已知的最终一致窗口）
pub const REBALANCE_SETTLE_SECS: u64 = 2;

// ==========================================
// EngineError - 周期级错误
// ==========================================
/// 唯一致命错误是快照不可用；其余数据源失败都降级为警告
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("库存快照不可用，周期中止: {0}")]
    SnapshotUnavailable(#[source] PlatformError),

    #[error("预警状态持久化失败: {0}")]
    AlertStatePersistFailed(#[from] RepositoryError),

    #[error("配置读取失败: {0}")]
    ConfigError(String),
}

// ==========================================
// RefreshResult - 周期结果
// ==========================================
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub cycle_id: String,
    /// 周期开始时生效的全局配置快照（JSON），用于事后排查阈值口径
    pub config_snapshot: String,
    /// 展示层消费的按 SKU 计划表
    pub planning: Vec<SkuPlanningReport>,
    /// 周期预警汇总
    pub alert_summary: AlertSummary,
    /// 再均衡逐组结果
    pub rebalance: RebalanceReport,
    /// 数据质量与数据源降级警告
    pub warnings: Vec<String>,
}

// ==========================================
// RefreshOrchestrator - 刷新周期编排器
// ==========================================
pub struct RefreshOrchestrator<C>
where
    C: PlanningConfigReader,
{
    config: Arc<C>,
    alert_repo: AlertStateRepository,
    rebalancer: VariantRebalancer,
}

impl<C> RefreshOrchestrator<C>
where
    C: PlanningConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 配置读取器
    /// - alert_repo: 预警状态仓储
    pub fn new(config: Arc<C>, alert_repo: AlertStateRepository) -> Self {
        Self {
            config,
            alert_repo,
            rebalancer: VariantRebalancer::new(),
        }
    }

    /// 执行一次完整刷新周期（手动触发或整点调度共用入口）
    ///
    /// # 参数
    /// - platform: 电商平台客户端
    /// - sink: 通知通道
    /// - today: 当前日期（ETA 衔接口径的基准日）
    pub async fn execute_refresh_cycle<P, N>(
        &self,
        platform: &P,
        sink: &N,
        today: NaiveDate,
    ) -> Result<RefreshResult, EngineError>
    where
        P: InventoryPlatform,
        N: NotificationSink,
    {
        let cycle_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        // 配置一次性读取（阈值快照随周期生效，周期内不再回读）
        let thresholds = load_or_config_err(self.config.load_engine_thresholds().await)?;
        let near_locations = load_or_config_err(self.config.get_near_locations().await)?;
        let china_location = load_or_config_err(self.config.get_china_location().await)?;
        let allocations = load_or_config_err(self.config.get_variant_allocations().await)?;
        let budget_secs = load_or_config_err(self.config.get_cycle_budget_secs().await)?;
        let budget = Duration::from_secs(budget_secs);

        // 生效配置留痕（失败降级为警告，不中止周期）
        let config_snapshot = match self.config.export_config_snapshot().await {
            Ok(snapshot) => {
                debug!(cycle_id = %cycle_id, config_snapshot = %snapshot, "周期生效配置已留痕");
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "配置快照留痕失败");
                warnings.push(format!("配置快照留痕失败: {}", e));
                "{}".to_string()
            }
        };

        info!(
            cycle_id = %cycle_id,
            near_locations = ?near_locations,
            burn_rate_period = %thresholds.burn_rate_period,
            "开始刷新周期"
        );

        // ==========================================
        // 步骤1: 多变体再均衡（快照之前）
        // ==========================================
        debug!("步骤1: 执行多变体再均衡");

        let rebalance = if allocations.is_empty() {
            RebalanceReport::default()
        } else {
            let target_location = near_locations.first().cloned().unwrap_or_default();
            let report = self
                .rebalancer
                .rebalance_all(platform, &allocations, &target_location, &cycle_id)
                .await;

            if report.any_adjusted() {
                // 平台侧最终一致窗口，短暂等待后再取快照
                debug!(secs = REBALANCE_SETTLE_SECS, "等待平台收敛");
                tokio::time::sleep(Duration::from_secs(REBALANCE_SETTLE_SECS)).await;
            }
            report
        };

        // ==========================================
        // 步骤2: 数据拉取（快照致命，其余降级）
        // ==========================================
        debug!("步骤2: 拉取快照与周边数据");

        let snapshot = platform
            .fetch_inventory_snapshot()
            .await
            .map_err(EngineError::SnapshotUnavailable)?;

        let (velocity, shipments, production, phase_out) = tokio::join!(
            platform.fetch_velocity(),
            platform.fetch_incoming_shipments(),
            platform.fetch_pending_production_orders(),
            platform.fetch_phase_out_set(),
        );
        let velocity = degrade(velocity, "velocity", &mut warnings);
        let shipments = degrade(shipments, "incoming_shipments", &mut warnings);
        let production = degrade(production, "production_orders", &mut warnings);
        let phase_out = degrade(phase_out, "phase_out", &mut warnings);

        info!(
            sku_count = snapshot.len(),
            velocity_count = velocity.len(),
            shipment_count = shipments.len(),
            "数据拉取完成"
        );

        // ==========================================
        // 步骤3: 按 SKU 聚合 + 补货分类
        // ==========================================
        debug!("步骤3: 执行补货分类");

        let (planning_inputs, alert_inputs) = build_sku_inputs(
            &snapshot,
            &velocity,
            &shipments,
            &production,
            &phase_out,
            &near_locations,
            &china_location,
            thresholds.burn_rate_period,
        );

        let classifier = ClassificationEngine::new(thresholds.clone());
        let classification = classifier.evaluate_batch(planning_inputs, today);
        for warning in &classification.warnings {
            warn!("{}", warning);
        }
        warnings.extend(classification.warnings);

        info!(report_count = classification.reports.len(), "补货分类完成");

        // ==========================================
        // 步骤4: 预警判定 + 整表替换持久化 + 通知
        // ==========================================
        debug!("步骤4: 执行预警判定");

        let previous = self.alert_repo.load_all()?;
        let alert_engine = AlertEngine::new(thresholds);
        let outcome = alert_engine.evaluate_cycle(&alert_inputs, &previous, Utc::now());

        // 先持久化：通知失败或预算超限都不得丢状态
        let persisted = self.alert_repo.replace_all(&outcome.new_state)?;
        info!(
            persisted,
            fired = outcome.summary.total(),
            "预警状态已整表替换"
        );

        if started.elapsed() > budget {
            warn!(
                elapsed_secs = started.elapsed().as_secs(),
                budget_secs, "周期超出墙钟预算，跳过通知发送"
            );
            warnings.push("周期超出墙钟预算，本周期通知未发送".to_string());
        } else if !outcome.notification.is_empty() {
            // fire-and-forget: 失败只记警告，周期内不重试
            if let Err(e) = sink.send(&outcome.notification).await {
                warn!(error = %e, "通知发送失败（不重试）");
                warnings.push(format!("通知发送失败: {}", e));
            }
        }

        info!(
            cycle_id = %cycle_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            zero = outcome.summary.zero_count,
            critical = outcome.summary.critical_count,
            low = outcome.summary.low_count,
            "刷新周期完成"
        );

        Ok(RefreshResult {
            cycle_id,
            config_snapshot,
            planning: classification.reports,
            alert_summary: outcome.summary,
            rebalance,
            warnings,
        })
    }
}

// ==========================================
// 按 SKU 聚合
// ==========================================

/// 把快照与周边数据聚合为分类/预警引擎的按 SKU 输入
///
/// 显式归约：输入列表不可变，输出全新键控结构（引擎保持纯函数）
#[allow(clippy::too_many_arguments)]
fn build_sku_inputs(
    snapshot: &[SkuInventory],
    velocity: &[VelocitySample],
    shipments: &[IncomingShipment],
    production: &[ProductionOrderPending],
    phase_out: &HashSet<String>,
    near_locations: &[String],
    china_location: &str,
    burn_rate_period: BurnRatePeriod,
) -> (Vec<SkuPlanningInput>, Vec<AlertInput>) {
    let velocity_by_sku: HashMap<&str, &VelocitySample> = velocity
        .iter()
        .map(|v| (v.sku_code.as_str(), v))
        .collect();

    // 在途聚合: 仅统计目的地为近仓池的货件
    let mut incoming_by_sku: HashMap<&str, IncomingTotals> = HashMap::new();
    for shipment in shipments {
        if near_locations.iter().any(|l| l == &shipment.destination) {
            incoming_by_sku
                .entry(shipment.sku_code.as_str())
                .or_default()
                .accumulate(shipment);
        }
    }

    let mut pending_by_sku: HashMap<&str, f64> = HashMap::new();
    for order in production {
        *pending_by_sku.entry(order.sku_code.as_str()).or_default() += order.pending_quantity;
    }

    let mut planning_inputs = Vec::with_capacity(snapshot.len());
    let mut alert_inputs = Vec::with_capacity(snapshot.len());

    for sku in snapshot {
        let la_available: f64 = near_locations.iter().map(|l| sku.available_at(l)).sum();
        let incoming = incoming_by_sku
            .get(sku.sku_code.as_str())
            .cloned()
            .unwrap_or_default();
        // 速率数据缺失按全零样本处理（零日销 → 续航哨兵值）
        let sample = velocity_by_sku
            .get(sku.sku_code.as_str())
            .map(|s| (*s).clone())
            .unwrap_or_else(|| VelocitySample::zero(&sku.sku_code));
        let is_phase_out = phase_out.contains(&sku.sku_code);
        let display_name = sku.display_name();

        planning_inputs.push(SkuPlanningInput {
            sku_code: sku.sku_code.clone(),
            display_name: display_name.clone(),
            la_available,
            incoming_air: incoming.air_quantity,
            incoming_sea: incoming.sea_quantity,
            earliest_sea_eta: incoming.earliest_sea_eta,
            has_unknown_sea_eta: incoming.has_unknown_sea_eta,
            unknown_eta_sea_quantity: incoming.unknown_eta_sea_quantity,
            china_available: sku.available_at(china_location),
            pending_production: pending_by_sku
                .get(sku.sku_code.as_str())
                .copied()
                .unwrap_or(0.0),
            phase_out: is_phase_out,
            burn_rate: sample.rate_for(burn_rate_period),
        });

        // 预警固定使用 21 天窗口
        alert_inputs.push(AlertInput {
            sku_code: sku.sku_code.clone(),
            display_name,
            quantity: la_available,
            incoming_air: incoming.air_quantity,
            burn_rate_21d: sample.avg_daily_21d,
            phase_out: is_phase_out,
        });
    }

    (planning_inputs, alert_inputs)
}

// ==========================================
// 辅助函数
// ==========================================

/// 数据源降级: 拉取失败按空数据处理并记录警告
fn degrade<T: Default>(
    result: Result<T, PlatformError>,
    source_name: &str,
    warnings: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(source = source_name, error = %e, "数据源拉取失败，按空数据处理");
            warnings.push(format!("数据源 {} 拉取失败: {}", source_name, e));
            T::default()
        }
    }
}

/// 配置读取错误统一折叠为 EngineError::ConfigError
fn load_or_config_err<T>(
    result: Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> Result<T, EngineError> {
    result.map_err(|e| EngineError::ConfigError(e.to_string()))
}
