// ==========================================
// 施工进度计划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod hierarchy;
pub mod object;
pub mod plan;
pub mod report;
pub mod types;

// 重导出核心类型
pub use hierarchy::{Chapter, Subchapter, WorkPlan, WorkType};
pub use object::ConstructionObject;
pub use plan::{PlanStructure, SchedulePlan};
pub use report::{ReportHeader, ReportRow, ReportWeek, WeeklyReport};
pub use types::{PlanStatus, ReportRowType};
