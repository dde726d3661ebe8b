// ==========================================
// 跨境库存补货决策系统 - 预警状态仓储
// ==========================================
// 职责: 管理 alert_state 表的读写
// 红线: 不含业务逻辑，只负责数据访问
// 写契约: "整表替换" —— 表内集合恒等于当前可预警 SKU 集合，
//         回到 None 等级的 SKU 随替换隐式清除（自动解除预警）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::AlertTier;
use crate::domain::AlertRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// AlertStateRepository - 预警状态仓储
// ==========================================
pub struct AlertStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AlertStateRepository {
    /// 创建新的 AlertStateRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取上一周期的全部预警记录
    pub fn load_all(&self) -> RepositoryResult<Vec<AlertRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT sku_code, tier, quantity, updated_at FROM alert_state ORDER BY sku_code",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(AlertRecord {
                    sku_code: row.get(0)?,
                    tier: AlertTier::from_db_str(&row.get::<_, String>(1)?),
                    quantity: row.get(2)?,
                    updated_at: parse_timestamp(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    /// 整表替换为当前可预警集合
    ///
    /// # 说明
    /// - DELETE + INSERT 在同一事务内完成，读方不会看到半替换状态
    /// - 传入含 None 等级的记录视为调用方缺陷，直接拒绝
    /// - 并发刷新下为 last-writer-wins（与周期模型约定一致）
    pub fn replace_all(&self, records: &[AlertRecord]) -> RepositoryResult<usize> {
        if let Some(bad) = records.iter().find(|r| !r.tier.is_persistable()) {
            return Err(RepositoryError::ValidationError(format!(
                "None 等级不允许持久化: sku={}",
                bad.sku_code
            )));
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM alert_state", [])?;

        let mut count = 0;
        for record in records {
            tx.execute(
                r#"
                INSERT INTO alert_state (sku_code, tier, quantity, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    record.sku_code,
                    record.tier.to_db_str(),
                    record.quantity,
                    record.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 按 SKU 查询单条预警记录
    pub fn find_by_sku(&self, sku_code: &str) -> RepositoryResult<Option<AlertRecord>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT sku_code, tier, quantity, updated_at FROM alert_state WHERE sku_code = ?1",
            params![sku_code],
            |row| {
                Ok(AlertRecord {
                    sku_code: row.get(0)?,
                    tier: AlertTier::from_db_str(&row.get::<_, String>(1)?),
                    quantity: row.get(2)?,
                    updated_at: parse_timestamp(&row.get::<_, String>(3)?),
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 当前预警记录条数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM alert_state", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 解析时间戳字符串（异常值回退到 UNIX 纪元）
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}
