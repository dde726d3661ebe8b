// ==========================================
// 跨境库存补货决策系统 - 多变体库存再均衡引擎
// ==========================================
// 红线: 再均衡只做再分配，不创造也不销毁库存
//       Σ target == Σ current 必须严格成立
// ==========================================
// 职责: 把同一逻辑 SKU 的多个平台变体拉回目标配比
// 时序: 在快照拉取之前执行；有调整时调用方需等待平台收敛
// 失败语义: 单组失败/配置错误只跳过该组，不中止周期
// ==========================================

use crate::domain::{AllocationEntry, StockAdjustment, VariantAllocation, VariantStock};
use crate::platform::InventoryPlatform;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

// ==========================================
// RebalanceOutcome - 单 SKU 组结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RebalanceOutcome {
    /// 已提交调整
    Adjusted {
        /// 正向移动的件数（= Σ 正 delta）
        moved_units: i64,
    },
    /// 已在目标配比上，无需调整
    AlreadyBalanced,
    /// 配置或数据不满足前置条件，跳过
    Skipped { reason: String },
    /// 平台调整调用失败，跳过（周期内不重试）
    Failed { reason: String },
}

// ==========================================
// RebalanceReport - 周期再均衡报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebalanceReport {
    pub outcomes: Vec<(String, RebalanceOutcome)>,
}

impl RebalanceReport {
    /// 是否有任何组实际提交了调整（决定是否需要等待平台收敛）
    pub fn any_adjusted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, o)| matches!(o, RebalanceOutcome::Adjusted { .. }))
    }
}

// ==========================================
// VariantRebalancer - 多变体再均衡引擎
// ==========================================
pub struct VariantRebalancer;

impl Default for VariantRebalancer {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantRebalancer {
    /// 创建新的再均衡引擎
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 对全部配置的多变体 SKU 组执行再均衡
    ///
    /// # 参数
    /// - allocations: 配比配置表
    /// - location: 目标仓
    /// - cycle_id: 刷新周期ID（构造幂等令牌）
    #[instrument(skip(self, platform, allocations), fields(groups = allocations.len()))]
    pub async fn rebalance_all<P: InventoryPlatform>(
        &self,
        platform: &P,
        allocations: &[VariantAllocation],
        location: &str,
        cycle_id: &str,
    ) -> RebalanceReport {
        let mut report = RebalanceReport::default();

        for allocation in allocations {
            let outcome = self
                .rebalance_group(platform, allocation, location, cycle_id)
                .await;

            match &outcome {
                RebalanceOutcome::Adjusted { moved_units } => {
                    info!(sku = %allocation.sku_code, moved_units, "变体再均衡已提交");
                }
                RebalanceOutcome::AlreadyBalanced => {
                    debug!(sku = %allocation.sku_code, "变体配比已达标");
                }
                RebalanceOutcome::Skipped { reason } => {
                    warn!(sku = %allocation.sku_code, reason = %reason, "变体再均衡跳过");
                }
                RebalanceOutcome::Failed { reason } => {
                    warn!(sku = %allocation.sku_code, reason = %reason, "变体再均衡失败");
                }
            }

            report.outcomes.push((allocation.sku_code.clone(), outcome));
        }

        report
    }

    /// 对单个 SKU 组执行再均衡
    async fn rebalance_group<P: InventoryPlatform>(
        &self,
        platform: &P,
        allocation: &VariantAllocation,
        location: &str,
        cycle_id: &str,
    ) -> RebalanceOutcome {
        // 配置校验: 配比之和必须为 1.0
        if !allocation.is_valid() {
            return RebalanceOutcome::Skipped {
                reason: "配比之和不为1.0或配置为空".to_string(),
            };
        }

        // 步骤1-2: 解析平台变体并取现货
        let variants = match platform
            .fetch_variant_stock(&allocation.sku_code, location)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                return RebalanceOutcome::Failed {
                    reason: format!("变体现货拉取失败: {}", e),
                }
            }
        };

        let usable: Vec<&VariantStock> = variants
            .iter()
            .filter(|v| v.inventory_item_id.is_some())
            .collect();
        if usable.len() < 2 {
            return RebalanceOutcome::Skipped {
                reason: format!("有效变体不足2个 (count={})", usable.len()),
            };
        }

        // 步骤3-6: 纯计算部分
        let deltas = match compute_adjustments(&allocation.entries, &usable) {
            Ok(d) => d,
            Err(reason) => return RebalanceOutcome::Skipped { reason },
        };

        if deltas.is_empty() {
            return RebalanceOutcome::AlreadyBalanced;
        }

        // 步骤7: 单次批量提交；失败跳过本组，不重试
        let token = idempotency_token(cycle_id, &allocation.sku_code, &deltas);
        if let Err(e) = platform
            .adjust_stock_batch(location, &deltas, &token)
            .await
        {
            return RebalanceOutcome::Failed {
                reason: format!("库存调整提交失败: {}", e),
            };
        }

        let moved_units = deltas.iter().map(|d| d.delta.max(0)).sum();
        RebalanceOutcome::Adjusted { moved_units }
    }
}

// ==========================================
// 纯计算部分
// ==========================================

/// 计算调整批次（步骤3-6）
///
/// - 按子串匹配把每个配比项对应到恰好一个变体，且映射必须是双射，否则判为歧义
/// - 最后一个配比项取精确余数，取整误差不得改变总量
/// - 仅返回 delta ≠ 0 的变体
pub fn compute_adjustments(
    entries: &[AllocationEntry],
    variants: &[&VariantStock],
) -> Result<Vec<StockAdjustment>, String> {
    // 步骤3: 1:1 匹配校验（两个标签命中同一变体会导致总量重复计入）
    let mut matched: Vec<&VariantStock> = Vec::with_capacity(entries.len());
    let mut matched_idx: HashSet<usize> = HashSet::with_capacity(entries.len());
    for entry in entries {
        let hits: Vec<usize> = variants
            .iter()
            .enumerate()
            .filter(|(_, v)| v.variant_title.contains(&entry.match_label))
            .map(|(idx, _)| idx)
            .collect();
        if hits.len() != 1 {
            return Err(format!(
                "匹配歧义: label={} 命中 {} 个变体",
                entry.match_label,
                hits.len()
            ));
        }
        let idx = hits[0];
        if !matched_idx.insert(idx) {
            return Err(format!(
                "匹配歧义: 变体 {} 被多个标签命中",
                variants[idx].variant_title
            ));
        }
        matched.push(variants[idx]);
    }
    if matched.len() != variants.len() {
        return Err(format!(
            "变体数与配比项数不一致: variants={} entries={}",
            variants.len(),
            entries.len()
        ));
    }

    // 步骤4: 总量为0时无货可分
    let total: i64 = matched.iter().map(|v| v.available).sum();
    if total == 0 {
        return Err("总量为0，无货可分".to_string());
    }

    // 步骤5: 目标量（最后一项吸收取整余数）
    let mut targets: Vec<i64> = Vec::with_capacity(entries.len());
    let mut assigned: i64 = 0;
    for (idx, entry) in entries.iter().enumerate() {
        let target = if idx + 1 == entries.len() {
            total - assigned
        } else {
            (total as f64 * entry.percentage).round() as i64
        };
        assigned += target;
        targets.push(target);
    }
    debug_assert_eq!(targets.iter().sum::<i64>(), total);

    // 步骤6: 仅保留非零 delta；需要调整的变体必须有库存条目句柄
    let mut deltas = Vec::with_capacity(matched.len());
    for (variant, &target) in matched.iter().zip(targets.iter()) {
        let delta = target - variant.available;
        if delta == 0 {
            continue;
        }
        match &variant.inventory_item_id {
            Some(id) => deltas.push(StockAdjustment {
                inventory_item_id: id.clone(),
                delta,
            }),
            None => {
                return Err(format!(
                    "变体 {} 缺少 inventory_item_id，无法提交调整",
                    variant.variant_title
                ))
            }
        }
    }

    Ok(deltas)
}

/// 周期内容寻址幂等令牌：同周期同内容的重复提交不得二次生效
fn idempotency_token(cycle_id: &str, sku_code: &str, deltas: &[StockAdjustment]) -> String {
    let content: Vec<String> = deltas
        .iter()
        .map(|d| format!("{}={}", d.inventory_item_id, d.delta))
        .collect();
    format!("{}:{}:{}", cycle_id, sku_code, content.join(","))
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================
    // 测试数据准备
    // ==========================================

    fn entry(label: &str, pct: f64) -> AllocationEntry {
        AllocationEntry {
            match_label: label.to_string(),
            percentage: pct,
        }
    }

    fn variant(title: &str, item_id: &str, available: i64) -> VariantStock {
        VariantStock {
            variant_title: title.to_string(),
            inventory_item_id: Some(item_id.to_string()),
            available,
        }
    }

    // ==========================================
    // 第一部分：目标量与守恒不变量
    // ==========================================

    #[test]
    fn test_targets_preserve_total_on_uneven_split() {
        // 场景: total=101, 35/65 → 最后一项吸收余数, 合计仍为101
        let entries = vec![entry("Type-A", 0.35), entry("Type-C", 0.65)];
        let v1 = variant("Charger Type-A", "item-1", 1);
        let v2 = variant("Charger Type-C", "item-2", 100);
        let variants = vec![&v1, &v2];

        let deltas = compute_adjustments(&entries, &variants).unwrap();

        // round(101×0.35)=35 → delta +34; 末项 101-35=66 → delta -34
        let sum: i64 = deltas.iter().map(|d| d.delta).sum();
        assert_eq!(sum, 0, "Σ delta == 0, 总量守恒");
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].delta, 34);
        assert_eq!(deltas[1].delta, -34);
    }

    #[test]
    fn test_targets_last_entry_takes_remainder() {
        // 场景: total=100, 三路 33/33/34
        let entries = vec![
            entry("Small", 0.33),
            entry("Medium", 0.33),
            entry("Large", 0.34),
        ];
        let v1 = variant("Case Small", "i1", 100);
        let v2 = variant("Case Medium", "i2", 0);
        let v3 = variant("Case Large", "i3", 0);
        let variants = vec![&v1, &v2, &v3];

        let deltas = compute_adjustments(&entries, &variants).unwrap();
        let sum: i64 = deltas.iter().map(|d| d.delta).sum();
        assert_eq!(sum, 0);
        // 33 + 33 + 34(余数) = 100
        assert_eq!(deltas[0].delta, -67);
        assert_eq!(deltas[1].delta, 33);
        assert_eq!(deltas[2].delta, 34);
    }

    #[test]
    fn test_already_balanced_yields_no_deltas() {
        // 场景: 已在配比上 → 空批次
        let entries = vec![entry("A", 0.5), entry("B", 0.5)];
        let v1 = variant("Plug A", "i1", 50);
        let v2 = variant("Plug B", "i2", 50);
        let variants = vec![&v1, &v2];

        let deltas = compute_adjustments(&entries, &variants).unwrap();
        assert!(deltas.is_empty());
    }

    // ==========================================
    // 第二部分：跳过条件
    // ==========================================

    #[test]
    fn test_ambiguous_match_is_rejected() {
        // 场景: 一个标签命中两个变体 → 歧义
        let entries = vec![entry("Type", 0.5), entry("Type-C", 0.5)];
        let v1 = variant("Charger Type-A", "i1", 10);
        let v2 = variant("Charger Type-C", "i2", 10);
        let variants = vec![&v1, &v2];

        let result = compute_adjustments(&entries, &variants);
        assert!(result.is_err(), "标签 'Type' 命中两个变体必须拒绝");
    }

    #[test]
    fn test_duplicate_matched_variant_is_rejected() {
        // 场景: "Charger Red" 与 "Red" 都命中同一变体 → 非双射, 必须拒绝
        // 若放行, 总量会把 Charger Red 计两次且 Charger Blue 永不被调整
        let entries = vec![entry("Charger Red", 0.5), entry("Red", 0.5)];
        let v1 = variant("Charger Red", "i1", 10);
        let v2 = variant("Charger Blue", "i2", 30);
        let variants = vec![&v1, &v2];

        let result = compute_adjustments(&entries, &variants);
        assert!(result.is_err(), "两个标签命中同一变体必须拒绝");
    }

    #[test]
    fn test_missing_item_id_with_nonzero_delta_is_rejected() {
        // 场景: 需调整的变体缺少 inventory_item_id → 不得静默丢弃该笔 delta
        let entries = vec![entry("A", 0.5), entry("B", 0.5)];
        let v1 = variant("Plug A", "i1", 60);
        let v2 = VariantStock {
            variant_title: "Plug B".to_string(),
            inventory_item_id: None,
            available: 40,
        };
        let variants = vec![&v1, &v2];

        let result = compute_adjustments(&entries, &variants);
        assert!(result.is_err(), "缺句柄的变体需要 +10 调整, 必须整组拒绝");
    }

    #[test]
    fn test_unmatched_entry_is_rejected() {
        // 场景: 标签无命中 → 歧义
        let entries = vec![entry("Type-A", 0.5), entry("Type-X", 0.5)];
        let v1 = variant("Charger Type-A", "i1", 10);
        let v2 = variant("Charger Type-C", "i2", 10);
        let variants = vec![&v1, &v2];

        assert!(compute_adjustments(&entries, &variants).is_err());
    }

    #[test]
    fn test_variant_count_mismatch_is_rejected() {
        // 场景: 配比2项但仓内有3个变体 → 不是 1:1
        let entries = vec![entry("Type-A", 0.5), entry("Type-C", 0.5)];
        let v1 = variant("Charger Type-A", "i1", 10);
        let v2 = variant("Charger Type-C", "i2", 10);
        let v3 = variant("Charger Type-E", "i3", 10);
        let variants = vec![&v1, &v2, &v3];

        assert!(compute_adjustments(&entries, &variants).is_err());
    }

    #[test]
    fn test_zero_total_is_rejected() {
        // 场景: 总量为0 → 无货可分
        let entries = vec![entry("A", 0.5), entry("B", 0.5)];
        let v1 = variant("Plug A", "i1", 0);
        let v2 = variant("Plug B", "i2", 0);
        let variants = vec![&v1, &v2];

        assert!(compute_adjustments(&entries, &variants).is_err());
    }

    #[test]
    fn test_invalid_percentages_detected_by_allocation() {
        // 场景: 配比之和 ≠ 1.0 → is_valid 为 false（组级跳过由引擎负责）
        let allocation = VariantAllocation {
            sku_code: "SKU-X".to_string(),
            entries: vec![entry("A", 0.4), entry("B", 0.4)],
        };
        assert!(!allocation.is_valid());
    }

    // ==========================================
    // 第三部分：幂等令牌
    // ==========================================

    #[test]
    fn test_idempotency_token_is_content_addressed() {
        let deltas = vec![
            StockAdjustment {
                inventory_item_id: "i1".to_string(),
                delta: 5,
            },
            StockAdjustment {
                inventory_item_id: "i2".to_string(),
                delta: -5,
            },
        ];

        let t1 = idempotency_token("cycle-1", "SKU-A", &deltas);
        let t2 = idempotency_token("cycle-1", "SKU-A", &deltas);
        let t3 = idempotency_token("cycle-2", "SKU-A", &deltas);

        assert_eq!(t1, t2, "同周期同内容令牌一致");
        assert_ne!(t1, t3, "跨周期令牌不同");
    }
}
