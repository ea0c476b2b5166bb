// ==========================================
// 施工进度计划系统 - 应用层
// ==========================================
// 职责: 应用状态装配, 命令分发 (对外边界)
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{command_names, dispatch};
pub use state::{get_default_db_path, AppState};
