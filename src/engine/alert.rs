// ==========================================
// 跨境库存补货决策系统 - 分级低库存预警引擎
// ==========================================
// 红线: 通知由"等级变化"触发，不是"等级存在"触发
//       同一等级连续两个周期不得重复打扰
// ==========================================
// 职责: 判定预警等级 + 变化去重 + 生成整表替换用的新状态集
// 输入: 近仓数量 + 在途空运 + 21天日销 + 停售标记 + 上周期记录
// 输出: AlertCycleOutcome（通知 + 新状态 + 汇总）
// ==========================================

use crate::config::EngineThresholds;
use crate::domain::types::AlertTier;
use crate::domain::{AlertLine, AlertNotification, AlertRecord, AlertSummary};
use crate::engine::classification::runway_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// AlertInput - 单 SKU 预警输入
// ==========================================
/// 预警引擎固定使用 21 天日销窗口（与分类引擎的可配置窗口无关）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInput {
    pub sku_code: String,
    pub display_name: String,
    /// LA 近仓池可售合计
    pub quantity: f64,
    /// 在途空运量（目的地为近仓池）
    pub incoming_air: f64,
    /// 21天窗口日销速率
    pub burn_rate_21d: f64,
    pub phase_out: bool,
}

// ==========================================
// AlertCycleOutcome - 单周期预警结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AlertCycleOutcome {
    /// 本周期新触发的预警（等级发生变化的 SKU），按等级分组
    pub notification: AlertNotification,
    /// 供整表替换写入的新状态集（当前 tier ∈ {Low, Critical, Zero}）
    pub new_state: Vec<AlertRecord>,
    /// 周期汇总计数
    pub summary: AlertSummary,
}

// ==========================================
// AlertEngine - 分级低库存预警引擎
// ==========================================
pub struct AlertEngine {
    thresholds: EngineThresholds,
}

impl AlertEngine {
    /// 创建新的预警引擎（阈值一次性注入）
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self { thresholds }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一个周期的预警判定
    ///
    /// # 参数
    /// - inputs: 本周期全部 SKU 的预警输入
    /// - previous: 上周期持久化的预警记录
    /// - now: 周期时间戳（写入新状态记录）
    ///
    /// # 去重不变量
    /// 仅当新等级 ≠ 上周期等级时才进入通知（含 Zero 等级）；
    /// 对相同输入重复执行，第二次产生零条通知
    #[instrument(skip(self, inputs, previous), fields(count = inputs.len()))]
    pub fn evaluate_cycle(
        &self,
        inputs: &[AlertInput],
        previous: &[AlertRecord],
        now: DateTime<Utc>,
    ) -> AlertCycleOutcome {
        let prev_tiers: HashMap<&str, AlertTier> = previous
            .iter()
            .map(|r| (r.sku_code.as_str(), r.tier))
            .collect();

        let mut notification = AlertNotification::default();
        let mut new_state = Vec::new();

        for input in inputs {
            let (tier, runway_air) = self.assign_tier(input);
            let prev_tier = prev_tiers
                .get(input.sku_code.as_str())
                .copied()
                .unwrap_or(AlertTier::None);

            // 等级变化才通知（level-triggered 是上一代系统的缺陷）
            if tier != prev_tier && tier != AlertTier::None {
                let line = AlertLine {
                    sku_code: input.sku_code.clone(),
                    display_name: input.display_name.clone(),
                    quantity: input.quantity,
                    runway_air_days: runway_air,
                    phase_out: input.phase_out,
                };
                match tier {
                    AlertTier::Zero => notification.zero_stock.push(line),
                    AlertTier::Critical => notification.critical.push(line),
                    AlertTier::Low => notification.low.push(line),
                    AlertTier::None => unreachable!(),
                }
            }

            // 新状态集只保留可预警等级；回到 None 的 SKU 随整表替换隐式清除
            if tier.is_persistable() {
                new_state.push(AlertRecord {
                    sku_code: input.sku_code.clone(),
                    tier,
                    quantity: input.quantity,
                    updated_at: now,
                });
            }
        }

        let summary = notification.summary();
        AlertCycleOutcome {
            notification,
            new_state,
            summary,
        }
    }

    // ==========================================
    // 等级判定
    // ==========================================

    /// 判定单 SKU 的预警等级
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) quantity ≤ 0 → Zero（续航再长也算断货）
    /// 2) quantity < critical 且 runwayAir < runway阈值 → Critical
    /// 3) quantity < low 且 runwayAir < runway阈值 → Low
    /// 4) 其他 → None
    ///
    /// 返回: (AlertTier, runwayAir 天数)
    pub fn assign_tier(&self, input: &AlertInput) -> (AlertTier, f64) {
        let runway_air = runway_days(input.quantity + input.incoming_air, input.burn_rate_21d);

        let tier = if input.quantity <= 0.0 {
            AlertTier::Zero
        } else if input.quantity < self.thresholds.critical_threshold
            && runway_air < self.thresholds.runway_threshold_days
        {
            AlertTier::Critical
        } else if input.quantity < self.thresholds.low_threshold
            && runway_air < self.thresholds.runway_threshold_days
        {
            AlertTier::Low
        } else {
            AlertTier::None
        };

        (tier, runway_air)
    }
}
