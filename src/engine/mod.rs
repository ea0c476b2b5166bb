// ==========================================
// 施工进度计划系统 - 引擎层
// ==========================================
// 职责: 编辑锁判定、序号重排、周度汇总
// 红线: Engine 不拼 SQL, 数据访问经由 Repository
// ==========================================

pub mod lock_manager;
pub mod ordering;
pub mod repositories;
pub mod weekly_aggregation;

// 重导出核心引擎
pub use lock_manager::{evaluate_gate, ChangesSwitch, LockManager, LockScope, UnlockOutcome};
pub use ordering::{
    build_ordinal_assignment, MoveOutcome, OrderingEngine, OrderingError, OrderingViolation,
};
pub use repositories::ScheduleRepositories;
pub use weekly_aggregation::{aggregate_rows, week_count, week_start, weeks_between};
