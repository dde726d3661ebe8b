// ==========================================
// 跨境库存补货决策系统 - 领域类型定义
// ==========================================
// 红线: 预警等级是"等级制",不是评分制
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 预警等级 (Alert Tier)
// ==========================================
// 顺序: None < Low < Critical < Zero
// 仅 {Low, Critical, Zero} 会持久化到 alert_state 表
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTier {
    None,     // 无预警
    Low,      // 低库存
    Critical, // 严重低库存
    Zero,     // 零库存
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTier::None => write!(f, "NONE"),
            AlertTier::Low => write!(f, "LOW"),
            AlertTier::Critical => write!(f, "CRITICAL"),
            AlertTier::Zero => write!(f, "ZERO"),
        }
    }
}

impl AlertTier {
    /// 从数据库字符串解析预警等级
    pub fn from_db_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOW" => AlertTier::Low,
            "CRITICAL" => AlertTier::Critical,
            "ZERO" => AlertTier::Zero,
            _ => AlertTier::None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AlertTier::None => "NONE",
            AlertTier::Low => "LOW",
            AlertTier::Critical => "CRITICAL",
            AlertTier::Zero => "ZERO",
        }
    }

    /// 是否需要持久化（None 等级从预警表中隐式清除）
    pub fn is_persistable(&self) -> bool {
        !matches!(self, AlertTier::None)
    }
}

// ==========================================
// 空运/海运补货建议 (Ship Type)
// ==========================================
// 分类引擎输出，PhaseOut 为最高优先级覆盖
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipType {
    Express,          // 快递空运 (≤15天库存)
    SlowAir,          // 普通空运 (≤60天库存)
    Sea,              // 海运 (≤90天库存)
    NoAction,         // 库存充足
    NoChinaInventory, // 国内仓无货
    PhaseOut,         // 停售清仓
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipType::Express => write!(f, "EXPRESS"),
            ShipType::SlowAir => write!(f, "SLOW_AIR"),
            ShipType::Sea => write!(f, "SEA"),
            ShipType::NoAction => write!(f, "NO_ACTION"),
            ShipType::NoChinaInventory => write!(f, "NO_CHINA_INVENTORY"),
            ShipType::PhaseOut => write!(f, "PHASE_OUT"),
        }
    }
}

// ==========================================
// 生产状态建议 (Production Status)
// ==========================================
// 依据 runwayWithChina 与在产订单判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProdStatus {
    MonitorProduction, // 有在产订单，库存充裕，跟踪即可
    PushVendor,        // 有在产订单，库存吃紧，催促工厂
    OrderMore,         // 无在产订单且库存吃紧，需要下单
    NoAction,          // 无需动作
    PhaseOut,          // 停售清仓
}

impl fmt::Display for ProdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProdStatus::MonitorProduction => write!(f, "MONITOR_PRODUCTION"),
            ProdStatus::PushVendor => write!(f, "PUSH_VENDOR"),
            ProdStatus::OrderMore => write!(f, "ORDER_MORE"),
            ProdStatus::NoAction => write!(f, "NO_ACTION"),
            ProdStatus::PhaseOut => write!(f, "PHASE_OUT"),
        }
    }
}

// ==========================================
// 运输方式 (Ship Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipMode {
    Air, // 空运
    Sea, // 海运
}

impl fmt::Display for ShipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipMode::Air => write!(f, "AIR"),
            ShipMode::Sea => write!(f, "SEA"),
        }
    }
}

// ==========================================
// 日销速率窗口 (Burn Rate Period)
// ==========================================
// 选择 VelocitySample 中哪个窗口作为分类引擎的日销口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BurnRatePeriod {
    Days7,  // 近7天
    Days21, // 近21天
    Days90, // 近90天
}

impl fmt::Display for BurnRatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BurnRatePeriod::Days7 => write!(f, "DAYS_7"),
            BurnRatePeriod::Days21 => write!(f, "DAYS_21"),
            BurnRatePeriod::Days90 => write!(f, "DAYS_90"),
        }
    }
}

impl BurnRatePeriod {
    /// 从配置字符串解析（兼容 "7"/"21"/"90" 与枚举名）
    pub fn from_config_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "7" | "7D" | "DAYS_7" => BurnRatePeriod::Days7,
            "90" | "90D" | "DAYS_90" => BurnRatePeriod::Days90,
            _ => BurnRatePeriod::Days21, // 默认 21 天
        }
    }
}

// ==========================================
// 海运 ETA 未知时的口径 (Unknown ETA Policy)
// ==========================================
// 源系统对 ETA 缺失采取"静默忽略"，这里做成显式配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnknownEtaPolicy {
    OmitFromGap,  // 缺口计算按 0 天处理，并标记该 SKU 需人工复核
    NeverArrives, // 最保守口径：视为永不到港，海运量不参与在途合计
}

impl fmt::Display for UnknownEtaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownEtaPolicy::OmitFromGap => write!(f, "OMIT_FROM_GAP"),
            UnknownEtaPolicy::NeverArrives => write!(f, "NEVER_ARRIVES"),
        }
    }
}

impl UnknownEtaPolicy {
    /// 从配置字符串解析
    pub fn from_config_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "NEVER_ARRIVES" => UnknownEtaPolicy::NeverArrives,
            _ => UnknownEtaPolicy::OmitFromGap, // 默认沿用源系统口径
        }
    }
}
