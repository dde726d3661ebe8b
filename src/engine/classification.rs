// ==========================================
// 跨境库存补货决策系统 - 补货分类引擎
// ==========================================
// 红线: 纯函数引擎，不做外部调用，不读全局状态
// ==========================================
// 职责: 计算续航指标 + 空运需求量 + 运输方式建议 + 生产状态建议
// 输入: 按 SKU 聚合后的近仓现货/在途/国内仓/在产/停售标记/日销速率
// 输出: SkuPlanningReport（展示层直接消费）
// ==========================================

use crate::config::EngineThresholds;
use crate::domain::types::{ProdStatus, ShipType, UnknownEtaPolicy};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 零日销时的续航哨兵值（天）
pub const RUNWAY_SENTINEL_DAYS: f64 = 999.0;

/// 海运缺口补货的安全垫天数
pub const SEA_GAP_PAD_DAYS: f64 = 4.0;

// ==========================================
// SkuPlanningInput - 单 SKU 分类输入
// ==========================================
/// 分类引擎的按 SKU 输入（已由调用方聚合完毕）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuPlanningInput {
    pub sku_code: String,
    pub display_name: String,
    /// LA 近仓池可售合计（两个近仓之和）
    pub la_available: f64,
    /// 在途空运量（目的地为近仓池）
    pub incoming_air: f64,
    /// 在途海运量（目的地为近仓池）
    pub incoming_sea: f64,
    /// 在途海运最早 ETA（仅统计有 ETA 的票）
    pub earliest_sea_eta: Option<NaiveDate>,
    /// 存在 ETA 缺失的海运票
    pub has_unknown_sea_eta: bool,
    /// ETA 缺失的海运量（已包含在 incoming_sea 内）
    pub unknown_eta_sea_quantity: f64,
    /// 国内仓可售量
    pub china_available: f64,
    /// 在产订单余量
    pub pending_production: f64,
    /// 停售标记
    pub phase_out: bool,
    /// 日销速率（按配置窗口）
    pub burn_rate: f64,
}

// ==========================================
// SkuPlanningReport - 单 SKU 分类结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuPlanningReport {
    pub sku_code: String,
    pub display_name: String,
    /// 续航(天): 近仓 + 在途空运
    pub runway_air_days: f64,
    /// 续航(天): 近仓 + 在途空运 + 在途海运
    pub runway_total_days: f64,
    /// 续航(天): 近仓 + 在途空运 + 在途海运 + 国内仓
    pub runway_with_china_days: f64,
    /// 建议立即空运的数量
    pub need_quantity: f64,
    /// ETA 缺失导致缺口口径不确定，需人工复核
    pub needs_review: bool,
    pub ship_type: ShipType,
    pub prod_status: ProdStatus,
}

// ==========================================
// ClassificationResult - 批量分类结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ClassificationResult {
    pub reports: Vec<SkuPlanningReport>,
    /// 数据质量警告（负数/NaN 被钳位为 0 的字段），由调用方记录日志
    pub warnings: Vec<String>,
}

// ==========================================
// ClassificationEngine - 补货分类引擎
// ==========================================
pub struct ClassificationEngine {
    thresholds: EngineThresholds,
}

impl ClassificationEngine {
    /// 创建新的分类引擎（阈值一次性注入）
    pub fn new(thresholds: EngineThresholds) -> Self {
        Self { thresholds }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 批量分类（推荐使用）
    ///
    /// 对每个 SKU 先做数据质量钳位，再计算全部派生指标
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub fn evaluate_batch(
        &self,
        inputs: Vec<SkuPlanningInput>,
        today: NaiveDate,
    ) -> ClassificationResult {
        let mut result = ClassificationResult::default();
        for input in inputs {
            let (input, mut warnings) = sanitize_input(input);
            result.warnings.append(&mut warnings);
            result.reports.push(self.evaluate_single(&input, today));
        }
        result
    }

    /// 单个 SKU 分类（输入须已钳位）
    pub fn evaluate_single(&self, input: &SkuPlanningInput, today: NaiveDate) -> SkuPlanningReport {
        let burn = input.burn_rate;
        let la = input.la_available;
        let air = input.incoming_air;
        let sea = input.incoming_sea;

        // 1. 续航指标（零日销 → 哨兵值，永不做除零）
        let runway_air_days = runway_days(la + air, burn);
        let runway_total_days = runway_days(la + air + sea, burn);
        let runway_with_china_days = runway_days(la + air + sea + input.china_available, burn);

        // 2. 空运需求量
        let (need_quantity, needs_review) = self.need_quantity(input, runway_air_days, today);

        // 3. 运输方式建议（停售覆盖在最后）
        let ship_type = self.classify_ship_type(input, runway_air_days, today);

        // 4. 生产状态建议
        let prod_status = self.classify_prod_status(input, runway_with_china_days);

        SkuPlanningReport {
            sku_code: input.sku_code.clone(),
            display_name: input.display_name.clone(),
            runway_air_days,
            runway_total_days,
            runway_with_china_days,
            need_quantity,
            needs_review,
            ship_type,
            prod_status,
        }
    }

    // ==========================================
    // 空运需求量
    // ==========================================

    /// 计算建议立即空运的数量
    ///
    /// 分支1: target = target_days × burn 超过在手合计 → 简单缺口
    /// 分支2: 否则看海运 ETA 与空运续航到期日的衔接:
    /// - ETA 晚于到期日 → 缺口天数 + 安全垫
    /// - ETA 未知 → 按配置口径处理（缺口按 0 天并标记复核 / 视为永不到港）
    /// - ETA 不晚于到期日 → 海运接得上，无需动作
    fn need_quantity(
        &self,
        input: &SkuPlanningInput,
        runway_air_days: f64,
        today: NaiveDate,
    ) -> (f64, bool) {
        let burn = input.burn_rate;
        let target = self.thresholds.target_days * burn;
        let on_hand_air = input.la_available + input.incoming_air;

        // 口径为"永不到港"时，仅 ETA 缺失的那部分海运量不计入在手合计；
        // 有 ETA 的票照常计入（已知/未知混票时不得连带剔除）
        let sea_counted = if self.thresholds.unknown_eta_policy == UnknownEtaPolicy::NeverArrives {
            (input.incoming_sea - input.unknown_eta_sea_quantity).max(0.0)
        } else {
            input.incoming_sea
        };
        let on_hand_total = on_hand_air + sea_counted;

        // 只要存在 ETA 缺失的海运票，缺口口径就带不确定性，标记人工复核
        let review = input.has_unknown_sea_eta;

        // 分支1: 简单缺口（终止）
        if target > on_hand_total {
            return (target - on_hand_total, review);
        }

        // 无在途海运则不存在衔接问题
        if input.incoming_sea <= 0.0 {
            return (0.0, false);
        }

        // 分支2: 海运衔接缺口
        let expiry = runway_expiry_date(today, runway_air_days);
        match input.earliest_sea_eta {
            Some(eta) if eta > expiry => {
                let gap_days = (eta - expiry).num_days() as f64;
                ((gap_days + SEA_GAP_PAD_DAYS) * burn, review)
            }
            Some(_) => (0.0, review), // ETA 不晚于到期日，海运接得上
            None => match self.thresholds.unknown_eta_policy {
                // 源系统口径: 缺口按 0 天，但显式标记人工复核
                UnknownEtaPolicy::OmitFromGap => (SEA_GAP_PAD_DAYS * burn, true),
                // 保守口径: 海运已从在手合计剔除，分支1未命中说明无缺口
                UnknownEtaPolicy::NeverArrives => (0.0, true),
            },
        }
    }

    // ==========================================
    // 运输方式建议
    // ==========================================

    /// 判定运输方式
    ///
    /// 海运量仅在 ETA 早于空运续航到期日时计入有效库存；
    /// 停售 SKU 无条件覆盖为 PhaseOut
    fn classify_ship_type(
        &self,
        input: &SkuPlanningInput,
        runway_air_days: f64,
        today: NaiveDate,
    ) -> ShipType {
        if input.phase_out {
            return ShipType::PhaseOut;
        }

        let expiry = runway_expiry_date(today, runway_air_days);
        let effective_sea = match input.earliest_sea_eta {
            Some(eta) if eta < expiry => input.incoming_sea,
            _ => 0.0,
        };

        let days_of_stock = runway_days(
            input.la_available + input.incoming_air + effective_sea,
            input.burn_rate,
        );

        if input.china_available > 0.0 {
            if days_of_stock <= 15.0 {
                ShipType::Express
            } else if days_of_stock <= 60.0 {
                ShipType::SlowAir
            } else if days_of_stock <= 90.0 {
                ShipType::Sea
            } else {
                ShipType::NoAction
            }
        } else if days_of_stock < 60.0 {
            ShipType::NoChinaInventory
        } else {
            ShipType::NoAction
        }
    }

    // ==========================================
    // 生产状态建议
    // ==========================================

    /// 判定生产状态
    ///
    /// 口径: runwayWithChina 与 90 天分界 + 是否存在在产余量
    fn classify_prod_status(&self, input: &SkuPlanningInput, runway_with_china: f64) -> ProdStatus {
        if input.phase_out {
            return ProdStatus::PhaseOut;
        }

        let has_pending = input.pending_production > 0.0;
        if runway_with_china > 90.0 {
            if has_pending {
                ProdStatus::MonitorProduction
            } else {
                ProdStatus::NoAction
            }
        } else if has_pending {
            ProdStatus::PushVendor
        } else {
            ProdStatus::OrderMore
        }
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 续航天数（除零安全: 零/负日销返回哨兵值）
pub fn runway_days(quantity: f64, burn_rate: f64) -> f64 {
    if burn_rate <= 0.0 {
        RUNWAY_SENTINEL_DAYS
    } else {
        quantity / burn_rate
    }
}

/// 空运续航到期日 = today + runway_air 天（向下取整）
fn runway_expiry_date(today: NaiveDate, runway_air_days: f64) -> NaiveDate {
    let days = runway_air_days.min(RUNWAY_SENTINEL_DAYS).max(0.0) as i64;
    today + Duration::days(days)
}

/// 数据质量钳位: 负数/NaN 一律置 0，并生成警告
fn sanitize_input(mut input: SkuPlanningInput) -> (SkuPlanningInput, Vec<String>) {
    let mut warnings = Vec::new();
    let sku = input.sku_code.clone();

    let mut clamp = |field: &str, value: &mut f64| {
        if value.is_nan() || *value < 0.0 {
            warnings.push(format!("DQ: sku={} field={} raw={} 钳位为0", sku, field, value));
            *value = 0.0;
        }
    };

    clamp("la_available", &mut input.la_available);
    clamp("incoming_air", &mut input.incoming_air);
    clamp("incoming_sea", &mut input.incoming_sea);
    clamp("unknown_eta_sea_quantity", &mut input.unknown_eta_sea_quantity);
    clamp("china_available", &mut input.china_available);
    clamp("pending_production", &mut input.pending_production);
    clamp("burn_rate", &mut input.burn_rate);

    (input, warnings)
}
