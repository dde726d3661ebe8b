// ==========================================
// 跨境库存补货决策系统 - 外部平台错误类型
// ==========================================
// 工具: thiserror 派生宏
// 口径: 除库存快照外，所有拉取失败都降级为警告 + 零量
// ==========================================

use thiserror::Error;

/// 外部协作方（电商平台 / 通知通道）错误类型
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("平台请求失败: {0}")]
    RequestFailed(String),

    #[error("平台响应格式错误: {0}")]
    MalformedResponse(String),

    #[error("库存调整被拒绝: location={location}, reason={reason}")]
    AdjustmentRejected { location: String, reason: String },

    #[error("通知发送失败: {0}")]
    NotificationFailed(String),

    #[error("数据源不可用: {source_name}")]
    SourceUnavailable { source_name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type PlatformResult<T> = Result<T, PlatformError>;
