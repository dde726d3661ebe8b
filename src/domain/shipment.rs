// ==========================================
// 跨境库存补货决策系统 - 在途与在产实体
// ==========================================
// 在途台账: 按 (SKU, 目的仓, 运输方式) 聚合后使用，不回溯单票
// ==========================================

use crate::domain::types::ShipMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// IncomingShipment - 在途货件
// ==========================================
/// 单票在途货件
///
/// ETA 可空：未知 ETA 按配置口径保守处理（见 UnknownEtaPolicy）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingShipment {
    pub sku_code: String,
    /// 目的仓名
    pub destination: String,
    pub mode: ShipMode,
    pub quantity: f64,
    /// 预计到港日期（可空）
    pub eta: Option<NaiveDate>,
}

// ==========================================
// IncomingTotals - 按 SKU 聚合后的在途合计
// ==========================================
/// 面向 LA 近仓池的在途聚合结果
///
/// `earliest_sea_eta` 仅统计有 ETA 的海运票；
/// `unknown_eta_sea_quantity` 单独累计 ETA 缺失的海运量，
/// 保守口径下从在手合计中剔除的正是这一部分
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingTotals {
    pub air_quantity: f64,
    pub sea_quantity: f64,
    pub earliest_sea_eta: Option<NaiveDate>,
    /// ETA 缺失的海运量（已包含在 sea_quantity 内）
    pub unknown_eta_sea_quantity: f64,
    pub has_unknown_sea_eta: bool,
}

impl IncomingTotals {
    /// 聚合一票在途货件（目的仓过滤由调用方完成）
    pub fn accumulate(&mut self, shipment: &IncomingShipment) {
        match shipment.mode {
            ShipMode::Air => self.air_quantity += shipment.quantity,
            ShipMode::Sea => {
                self.sea_quantity += shipment.quantity;
                match shipment.eta {
                    Some(eta) => {
                        self.earliest_sea_eta = Some(match self.earliest_sea_eta {
                            Some(cur) if cur <= eta => cur,
                            _ => eta,
                        });
                    }
                    None => {
                        self.unknown_eta_sea_quantity += shipment.quantity;
                        self.has_unknown_sea_eta = true;
                    }
                }
            }
        }
    }
}

// ==========================================
// ProductionOrderPending - 在产订单余量
// ==========================================
/// 单个 SKU 的未交付生产量（ordered - received）
///
/// 仅统计订单状态 ∈ {in_production, partial} 的订单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrderPending {
    pub sku_code: String,
    pub pending_quantity: f64,
}
