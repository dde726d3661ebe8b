// ==========================================
// 跨境库存补货决策系统 - 命令行主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (无头运行, 单次刷新周期)
// ==========================================

use inventory_aps::config::ConfigManager;
use inventory_aps::engine::RefreshOrchestrator;
use inventory_aps::platform::{FixturePlatform, LogNotificationSink};
use inventory_aps::repository::AlertStateRepository;
use std::sync::Arc;

/// 默认数据库路径: ~/.inventory-aps/inventory.db（目录不存在则创建）
fn get_default_db_path() -> String {
    let base = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join(".inventory-aps");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!("创建数据目录失败, 回退到当前目录: {}", e);
        return "inventory.db".to_string();
    }
    dir.join("inventory.db").to_string_lossy().to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 初始化日志系统
    inventory_aps::logging::init();

    tracing::info!("==================================================");
    tracing::info!("跨境库存补货决策系统 - 决策支持系统");
    tracing::info!("系统版本: {}", inventory_aps::VERSION);
    tracing::info!("数据库版本: {}", inventory_aps::DB_VERSION);
    tracing::info!("==================================================");

    // 用法: inventory-aps <fixture_dir> [db_path]
    let mut args = std::env::args().skip(1);
    let fixture_dir = match args.next() {
        Some(dir) => dir,
        None => {
            eprintln!("用法: inventory-aps <fixture_dir> [db_path]");
            eprintln!("  fixture_dir: 平台数据夹具目录 (inventory_snapshot.json 等)");
            eprintln!("  db_path:     SQLite 数据库路径, 缺省为 ~/.inventory-aps/inventory.db");
            std::process::exit(2);
        }
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("使用夹具目录: {}", fixture_dir);

    // 初始化数据库表（幂等）
    {
        let conn = inventory_aps::db::open_sqlite_connection(&db_path)?;
        inventory_aps::db::init_schema(&conn)?;
    }

    let config = Arc::new(ConfigManager::new(&db_path)?);
    let alert_repo = AlertStateRepository::new(&db_path)?;
    let platform = FixturePlatform::new(&fixture_dir)?;
    let sink = LogNotificationSink;

    let orchestrator = RefreshOrchestrator::new(config, alert_repo);
    let today = chrono::Local::now().date_naive();

    match orchestrator
        .execute_refresh_cycle(&platform, &sink, today)
        .await
    {
        Ok(result) => {
            tracing::info!("刷新周期 {} 完成", result.cycle_id);
            println!("周期: {}", result.cycle_id);
            println!(
                "预警: 断货 {} / 严重 {} / 低 {}",
                result.alert_summary.zero_count,
                result.alert_summary.critical_count,
                result.alert_summary.low_count
            );
            println!("计划表 ({} 个 SKU):", result.planning.len());
            for report in &result.planning {
                println!(
                    "  {:<24} 续航(空运) {:>6.1} 天  需求 {:>8.1}  发运 {}  生产 {}",
                    report.sku_code,
                    report.runway_air_days,
                    report.need_quantity,
                    report.ship_type,
                    report.prod_status
                );
            }
            for warning in &result.warnings {
                println!("警告: {}", warning);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("刷新周期失败: {}", e);
            Err(e.into())
        }
    }
}
