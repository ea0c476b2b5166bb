// ==========================================
// 施工进度计划系统 - API 层
// ==========================================
// 职责: 业务接口 (编辑锁校验、归属校验、本地化消息)
// 红线: API 不拼 SQL; 写操作必须先过编辑闸门
// ==========================================

pub mod config_api;
pub mod error;
pub mod guard;
pub mod hierarchy_api;
pub mod report_api;
pub mod response;
pub mod schedule_api;

// 重导出核心API
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use hierarchy_api::HierarchyApi;
pub use report_api::ReportApi;
pub use response::{ApiResponse, LockState};
pub use schedule_api::{CreatedSchedule, ScheduleApi};
