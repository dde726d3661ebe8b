// ==========================================
// 补货分类引擎集成测试
// ==========================================
// 职责: 验证续航指标、空运需求量、运输方式与生产状态的组合口径
// 场景: 简单缺口 / 海运衔接 / ETA 未知口径 / 停售覆盖 / 数据质量钳位
// ==========================================

use chrono::{Duration, NaiveDate};
use inventory_aps::config::EngineThresholds;
use inventory_aps::domain::types::{ProdStatus, ShipType, UnknownEtaPolicy};
use inventory_aps::engine::classification::{
    ClassificationEngine, SkuPlanningInput, RUNWAY_SENTINEL_DAYS, SEA_GAP_PAD_DAYS,
};

// ==========================================
// 测试辅助函数
// ==========================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

fn engine() -> ClassificationEngine {
    inventory_aps::logging::init_test();
    ClassificationEngine::new(EngineThresholds::default())
}

fn engine_with_policy(policy: UnknownEtaPolicy) -> ClassificationEngine {
    inventory_aps::logging::init_test();
    ClassificationEngine::new(EngineThresholds {
        unknown_eta_policy: policy,
        ..EngineThresholds::default()
    })
}

#[allow(clippy::too_many_arguments)]
fn planning_input(
    sku: &str,
    la: f64,
    air: f64,
    sea: f64,
    sea_eta: Option<NaiveDate>,
    china: f64,
    pending: f64,
    burn: f64,
) -> SkuPlanningInput {
    SkuPlanningInput {
        sku_code: sku.to_string(),
        display_name: format!("商品 {}", sku),
        la_available: la,
        incoming_air: air,
        incoming_sea: sea,
        earliest_sea_eta: sea_eta,
        has_unknown_sea_eta: false,
        unknown_eta_sea_quantity: 0.0,
        china_available: china,
        pending_production: pending,
        phase_out: false,
        burn_rate: burn,
    }
}

// ==========================================
// 第一部分：简单缺口与续航指标
// ==========================================

#[test]
fn test_simple_gap_with_express_recommendation() {
    // 场景: 近仓100 + 在途空运50, 日销10, 目标30天=300
    // → 需求 300-150=150; runwayAir=15天 → Express; 国内有货
    let e = engine();
    let input = planning_input("SKU-A", 100.0, 50.0, 0.0, None, 500.0, 0.0, 10.0);
    let report = e.evaluate_single(&input, today());

    assert!((report.runway_air_days - 15.0).abs() < 1e-9);
    assert!((report.need_quantity - 150.0).abs() < 1e-9);
    assert!(!report.needs_review);
    assert_eq!(report.ship_type, ShipType::Express);
    // runwayWithChina = 650/10 = 65 ≤ 90, 无在产 → OrderMore
    assert_eq!(report.prod_status, ProdStatus::OrderMore);
}

#[test]
fn test_runway_tiers_are_cumulative() {
    // 场景: 三级续航口径逐级累加近仓/空运/海运/国内仓
    let e = engine();
    let eta = today() + Duration::days(20);
    let input = planning_input("SKU-A", 100.0, 50.0, 200.0, Some(eta), 650.0, 0.0, 10.0);
    let report = e.evaluate_single(&input, today());

    assert!((report.runway_air_days - 15.0).abs() < 1e-9);
    assert!((report.runway_total_days - 35.0).abs() < 1e-9);
    assert!((report.runway_with_china_days - 100.0).abs() < 1e-9);
}

#[test]
fn test_zero_burn_rate_uses_sentinel() {
    // 场景: 零日销 → 所有续航为哨兵值, 不除零; 无国内货也判 NoAction
    let e = engine();
    let input = planning_input("SKU-A", 100.0, 0.0, 0.0, None, 0.0, 0.0, 0.0);
    let report = e.evaluate_single(&input, today());

    assert_eq!(report.runway_air_days, RUNWAY_SENTINEL_DAYS);
    assert_eq!(report.runway_with_china_days, RUNWAY_SENTINEL_DAYS);
    assert!((report.need_quantity - 0.0).abs() < 1e-9);
    assert_eq!(report.ship_type, ShipType::NoAction);
}

// ==========================================
// 第二部分：海运衔接
// ==========================================

#[test]
fn test_sea_arriving_before_expiry_bridges_gap() {
    // 场景: 近仓+空运=300 覆盖目标, 海运300在第20天到港 (到期日=第30天)
    // → 衔接成功, 需求0; 运输判定计入海运 → 600/10=60天 → SlowAir
    let e = engine();
    let eta = today() + Duration::days(20);
    let input = planning_input("SKU-A", 200.0, 100.0, 300.0, Some(eta), 400.0, 0.0, 10.0);
    let report = e.evaluate_single(&input, today());

    assert!((report.need_quantity - 0.0).abs() < 1e-9);
    assert!(!report.needs_review);
    assert_eq!(report.ship_type, ShipType::SlowAir);
}

#[test]
fn test_sea_arriving_after_expiry_needs_gap_cover() {
    // 场景: runwayAir=30天, 海运ETA第40天 → 缺口10天 + 4天安全垫
    // → 需求 (10+4)×10 = 140
    let e = engine();
    let eta = today() + Duration::days(40);
    let input = planning_input("SKU-A", 250.0, 50.0, 100.0, Some(eta), 400.0, 0.0, 10.0);
    let report = e.evaluate_single(&input, today());

    let expected = (10.0 + SEA_GAP_PAD_DAYS) * 10.0;
    assert!((report.need_quantity - expected).abs() < 1e-9);
    assert!(!report.needs_review);
}

#[test]
fn test_sea_exactly_at_expiry_counts_as_bridged() {
    // 场景: ETA 恰好等于到期日 → 衔接成功 (缺口口径 eta > expiry 才算晚)
    let e = engine();
    let eta = today() + Duration::days(30);
    let input = planning_input("SKU-A", 250.0, 50.0, 100.0, Some(eta), 400.0, 0.0, 10.0);
    let report = e.evaluate_single(&input, today());

    assert!((report.need_quantity - 0.0).abs() < 1e-9);
    // 运输判定口径更严: eta < expiry 才计入有效海运, 相等不计入
    // days_of_stock = 300/10 = 30 ≤ 60 → SlowAir
    assert_eq!(report.ship_type, ShipType::SlowAir);
}

// ==========================================
// 第三部分：ETA 未知口径
// ==========================================

#[test]
fn test_unknown_eta_omit_from_gap_flags_review() {
    // 场景: 海运在途但 ETA 缺失, OMIT_FROM_GAP 口径
    // → 缺口按0天 + 4天安全垫 = 40, 标记人工复核
    let e = engine_with_policy(UnknownEtaPolicy::OmitFromGap);
    let mut input = planning_input("SKU-A", 250.0, 50.0, 100.0, None, 400.0, 0.0, 10.0);
    input.has_unknown_sea_eta = true;
    input.unknown_eta_sea_quantity = 100.0;
    let report = e.evaluate_single(&input, today());

    assert!((report.need_quantity - SEA_GAP_PAD_DAYS * 10.0).abs() < 1e-9);
    assert!(report.needs_review, "ETA 缺失必须标记人工复核");
}

#[test]
fn test_unknown_eta_never_arrives_excludes_sea() {
    // 场景: 同样输入, NEVER_ARRIVES 口径
    // → 海运不计入在手合计: 300 = 目标300, 无简单缺口; 衔接缺口按0
    let e = engine_with_policy(UnknownEtaPolicy::NeverArrives);
    let mut input = planning_input("SKU-A", 250.0, 50.0, 100.0, None, 400.0, 0.0, 10.0);
    input.has_unknown_sea_eta = true;
    input.unknown_eta_sea_quantity = 100.0;
    let report = e.evaluate_single(&input, today());

    assert!((report.need_quantity - 0.0).abs() < 1e-9);
    assert!(report.needs_review);

    // 近仓再少50件 → 简单缺口直接暴露 (OMIT 口径下会被海运掩盖)
    let mut short = planning_input("SKU-B", 200.0, 50.0, 100.0, None, 400.0, 0.0, 10.0);
    short.has_unknown_sea_eta = true;
    short.unknown_eta_sea_quantity = 100.0;
    let report = e.evaluate_single(&short, today());
    assert!((report.need_quantity - 50.0).abs() < 1e-9);
}

#[test]
fn test_mixed_eta_shipments_exclude_only_unknown_quantity() {
    // 场景: NEVER_ARRIVES + 混票 (80件有ETA + 20件无ETA)
    // → 仅20件被剔除: 在手 250+50+80=380 ≥ 目标300, 无缺口
    let e = engine_with_policy(UnknownEtaPolicy::NeverArrives);
    let eta = today() + Duration::days(10);
    let mut input = planning_input("SKU-A", 250.0, 50.0, 100.0, Some(eta), 400.0, 0.0, 10.0);
    input.has_unknown_sea_eta = true;
    input.unknown_eta_sea_quantity = 20.0;
    let report = e.evaluate_single(&input, today());
    assert!((report.need_quantity - 0.0).abs() < 1e-9, "已知ETA的80件照常计入");
    assert!(report.needs_review, "混票存在ETA缺失仍需人工复核");

    // 未知部分加大到90件 → 在手 250+50+10=310 仍覆盖目标; 降近仓到200
    // → 在手 200+50+10=260 < 300 → 简单缺口40
    let mut short = planning_input("SKU-B", 200.0, 50.0, 100.0, Some(eta), 400.0, 0.0, 10.0);
    short.has_unknown_sea_eta = true;
    short.unknown_eta_sea_quantity = 90.0;
    let report = e.evaluate_single(&short, today());
    assert!((report.need_quantity - 40.0).abs() < 1e-9, "300-(200+50+10)=40");
}

// ==========================================
// 第四部分：运输方式与生产状态分界
// ==========================================

#[test]
fn test_ship_type_day_boundaries() {
    let e = engine();

    // 60天整 → SlowAir (≤60); 60.1天 → Sea
    let report = e.evaluate_single(
        &planning_input("SKU-A", 600.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::SlowAir);

    let report = e.evaluate_single(
        &planning_input("SKU-B", 601.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::Sea);

    // 90天整 → Sea (≤90); 90.1天 → NoAction
    let report = e.evaluate_single(
        &planning_input("SKU-C", 900.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::Sea);

    let report = e.evaluate_single(
        &planning_input("SKU-D", 901.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::NoAction);
}

#[test]
fn test_no_china_inventory_only_when_stock_tight() {
    let e = engine();

    // 国内无货 + 45天库存 → NoChinaInventory (< 60)
    let report = e.evaluate_single(
        &planning_input("SKU-A", 450.0, 0.0, 0.0, None, 0.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::NoChinaInventory);

    // 国内无货但库存宽裕 → NoAction
    let report = e.evaluate_single(
        &planning_input("SKU-B", 700.0, 0.0, 0.0, None, 0.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.ship_type, ShipType::NoAction);
}

#[test]
fn test_prod_status_quadrants() {
    let e = engine();

    // 宽裕 + 有在产 → MonitorProduction
    let report = e.evaluate_single(
        &planning_input("SKU-A", 500.0, 0.0, 0.0, None, 500.0, 300.0, 10.0),
        today(),
    );
    assert_eq!(report.prod_status, ProdStatus::MonitorProduction);

    // 宽裕 + 无在产 → NoAction
    let report = e.evaluate_single(
        &planning_input("SKU-B", 500.0, 0.0, 0.0, None, 500.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.prod_status, ProdStatus::NoAction);

    // 吃紧 (≤90天) + 有在产 → PushVendor
    let report = e.evaluate_single(
        &planning_input("SKU-C", 300.0, 0.0, 0.0, None, 300.0, 300.0, 10.0),
        today(),
    );
    assert_eq!(report.prod_status, ProdStatus::PushVendor);

    // 吃紧 + 无在产 → OrderMore
    let report = e.evaluate_single(
        &planning_input("SKU-D", 300.0, 0.0, 0.0, None, 300.0, 0.0, 10.0),
        today(),
    );
    assert_eq!(report.prod_status, ProdStatus::OrderMore);
}

#[test]
fn test_phase_out_overrides_everything() {
    // 场景: 停售 SKU 即使严重缺货也只判 PhaseOut
    let e = engine();
    let mut input = planning_input("SKU-A", 10.0, 0.0, 0.0, None, 500.0, 300.0, 10.0);
    input.phase_out = true;
    let report = e.evaluate_single(&input, today());

    assert_eq!(report.ship_type, ShipType::PhaseOut);
    assert_eq!(report.prod_status, ProdStatus::PhaseOut);
}

// ==========================================
// 第五部分：批量与数据质量
// ==========================================

#[test]
fn test_batch_clamps_negative_inputs_with_warning() {
    // 场景: 负数近仓 (平台坏数据) → 钳位为0并产生警告, 不中止批次
    let e = engine();
    let inputs = vec![
        planning_input("SKU-BAD", -5.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
        planning_input("SKU-OK", 100.0, 0.0, 0.0, None, 100.0, 0.0, 10.0),
    ];

    let result = e.evaluate_batch(inputs, today());
    assert_eq!(result.reports.len(), 2, "坏数据不中止批次");
    assert!(!result.warnings.is_empty(), "钳位必须产生数据质量警告");
    assert!(result.warnings[0].contains("SKU-BAD"));

    // 钳位后按0计算: runwayAir = 0
    assert!((result.reports[0].runway_air_days - 0.0).abs() < 1e-9);
}

#[test]
fn test_batch_preserves_input_order() {
    let e = engine();
    let inputs = vec![
        planning_input("SKU-1", 100.0, 0.0, 0.0, None, 0.0, 0.0, 1.0),
        planning_input("SKU-2", 200.0, 0.0, 0.0, None, 0.0, 0.0, 1.0),
        planning_input("SKU-3", 300.0, 0.0, 0.0, None, 0.0, 0.0, 1.0),
    ];

    let result = e.evaluate_batch(inputs, today());
    let codes: Vec<&str> = result.reports.iter().map(|r| r.sku_code.as_str()).collect();
    assert_eq!(codes, vec!["SKU-1", "SKU-2", "SKU-3"]);
}
