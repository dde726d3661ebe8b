// ==========================================
// 跨境库存补货决策系统 - 数据仓储层
// ==========================================
// 职责: 数据访问，不含业务规则
// 红线: Repository 不拼业务逻辑
// ==========================================

pub mod alert_state_repo;
pub mod error;

pub use alert_state_repo::AlertStateRepository;
pub use error::{RepositoryError, RepositoryResult};
