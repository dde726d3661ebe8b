// ==========================================
// 跨境库存补货决策系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 红线: 阈值只从这里注入引擎，禁止在引擎内读取全局状态
// ==========================================

use crate::config::planning_config_trait::PlanningConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::{BurnRatePeriod, UnknownEtaPolicy};
use crate::domain::VariantAllocation;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// EngineThresholds - 引擎阈值快照
// ==========================================
/// 一次刷新周期内生效的全部阈值，一次性读取后注入引擎
///
/// 源系统把 50/200/90/100 散落在多处硬编码；此处收敛为
/// 单一显式配置结构，随周期快照记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineThresholds {
    pub critical_threshold: f64,
    pub low_threshold: f64,
    pub runway_threshold_days: f64,
    pub target_days: f64,
    pub burn_rate_period: BurnRatePeriod,
    pub unknown_eta_policy: UnknownEtaPolicy,
}

impl Default for EngineThresholds {
    fn default() -> Self {
        Self {
            critical_threshold: 50.0,
            low_threshold: 200.0,
            runway_threshold_days: 90.0,
            target_days: 30.0,
            burn_rate_period: BurnRatePeriod::Days21,
            unknown_eta_policy: UnknownEtaPolicy::OmitFromGap,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在刷新周期开始时记录生效配置
    /// - 保证事后排查时阈值口径可追溯
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 注意
    /// - 此方法会覆盖现有的global配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute("BEGIN TRANSACTION", [])?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            let affected = conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            count += affected;
        }

        conn.execute("COMMIT", [])?;
        Ok(count)
    }
}

// ==========================================
// PlanningConfigReader Trait 实现
// ==========================================
#[async_trait]
impl PlanningConfigReader for ConfigManager {
    // ===== 预警阈值配置 =====

    async fn get_critical_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::CRITICAL_THRESHOLD, "50")?;
        Ok(value.parse::<f64>().unwrap_or(50.0))
    }

    async fn get_low_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::LOW_THRESHOLD, "200")?;
        Ok(value.parse::<f64>().unwrap_or(200.0))
    }

    async fn get_runway_threshold_days(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::RUNWAY_THRESHOLD_DAYS, "90")?;
        Ok(value.parse::<f64>().unwrap_or(90.0))
    }

    // ===== 分类引擎配置 =====

    async fn get_target_days(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::TARGET_DAYS, "30")?;
        Ok(value.parse::<f64>().unwrap_or(30.0))
    }

    async fn get_burn_rate_period(&self) -> Result<BurnRatePeriod, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::BURN_RATE_PERIOD, "DAYS_21")?;
        Ok(BurnRatePeriod::from_config_str(&value))
    }

    async fn get_unknown_eta_policy(&self) -> Result<UnknownEtaPolicy, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::UNKNOWN_ETA_POLICY, "OMIT_FROM_GAP")?;
        Ok(UnknownEtaPolicy::from_config_str(&value))
    }

    // ===== 仓库配置 =====

    async fn get_near_locations(&self) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        let value =
            self.get_config_or_default(config_keys::NEAR_LOCATIONS, "LA Warehouse,Walnut Warehouse")?;

        let locations: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if locations.is_empty() {
            Ok(vec![
                "LA Warehouse".to_string(),
                "Walnut Warehouse".to_string(),
            ])
        } else {
            Ok(locations)
        }
    }

    async fn get_china_location(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.get_config_or_default(config_keys::CHINA_LOCATION, "China Warehouse")
    }

    // ===== 多变体配比配置 =====

    async fn get_variant_allocations(&self) -> Result<Vec<VariantAllocation>, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::VARIANT_ALLOCATIONS, "[]")?;
        let allocations: Vec<VariantAllocation> =
            serde_json::from_str(&value).unwrap_or_else(|_| {
                tracing::warn!(
                    config_key = config_keys::VARIANT_ALLOCATIONS,
                    raw_value = %value,
                    "多变体配比配置格式错误，使用空配置"
                );
                Vec::new()
            });
        Ok(allocations)
    }

    // ===== 周期预算 =====

    async fn get_cycle_budget_secs(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let value = self.get_config_or_default(config_keys::CYCLE_BUDGET_SECS, "120")?;
        Ok(value.parse::<u64>().unwrap_or(120))
    }

    // ===== 配置留痕 =====

    async fn export_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.get_config_snapshot()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 预警阈值
    pub const CRITICAL_THRESHOLD: &str = "critical_threshold";
    pub const LOW_THRESHOLD: &str = "low_threshold";
    pub const RUNWAY_THRESHOLD_DAYS: &str = "runway_threshold_days";

    // 分类引擎
    pub const TARGET_DAYS: &str = "target_days";
    pub const BURN_RATE_PERIOD: &str = "burn_rate_period";
    pub const UNKNOWN_ETA_POLICY: &str = "unknown_eta_policy";

    // 仓库
    pub const NEAR_LOCATIONS: &str = "near_locations";
    pub const CHINA_LOCATION: &str = "china_location";

    // 多变体配比 (JSON)
    pub const VARIANT_ALLOCATIONS: &str = "variant_allocations";

    // 周期预算
    pub const CYCLE_BUDGET_SECS: &str = "cycle_budget_secs";
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager_in_memory() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let manager = manager_in_memory();
        manager
            .set_global_config_value(config_keys::LOW_THRESHOLD, "100")
            .unwrap();
        manager
            .set_global_config_value(config_keys::TARGET_DAYS, "45")
            .unwrap();

        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains(config_keys::LOW_THRESHOLD));

        // 覆写后从快照恢复, 原值必须回来
        manager
            .set_global_config_value(config_keys::LOW_THRESHOLD, "999")
            .unwrap();
        let restored = manager.restore_config_from_snapshot(&snapshot).unwrap();
        assert!(restored >= 2);

        let value = manager.get_config_value(config_keys::LOW_THRESHOLD).unwrap();
        assert_eq!(value.as_deref(), Some("100"));
        let value = manager.get_config_value(config_keys::TARGET_DAYS).unwrap();
        assert_eq!(value.as_deref(), Some("45"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_threshold_load_is_spawnable() {
        // 配置读取 future 需要能跨线程调度 (tokio::spawn 要求 Send)
        let manager = Arc::new(manager_in_memory());
        manager
            .set_global_config_value(config_keys::CRITICAL_THRESHOLD, "80")
            .unwrap();

        let handle = tokio::spawn(async move { manager.load_engine_thresholds().await });
        let thresholds = handle.await.unwrap().unwrap();
        assert_eq!(thresholds.critical_threshold, 80.0);
        assert_eq!(thresholds.low_threshold, 200.0, "未配置键取默认值");
    }

    #[tokio::test]
    async fn test_export_snapshot_reflects_current_config() {
        let manager = manager_in_memory();
        manager
            .set_global_config_value(config_keys::NEAR_LOCATIONS, "LA Warehouse")
            .unwrap();

        let snapshot = manager.export_config_snapshot().await.unwrap();
        assert!(snapshot.contains("near_locations"));
        assert!(snapshot.contains("LA Warehouse"));
    }
}
