// ==========================================
// 跨境库存补货决策系统 - 外部协作方层
// ==========================================
// 职责: 第三方平台与通知通道的抽象契约及离线夹具实现
// ==========================================

pub mod error;
pub mod fixture;
pub mod traits;

pub use error::{PlatformError, PlatformResult};
pub use fixture::{FixturePlatform, LogNotificationSink};
pub use traits::{InventoryPlatform, NotificationSink};
