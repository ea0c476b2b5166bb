// ==========================================
// 施工进度计划系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑 (锁定校验、序号校验在 engine/api)
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有值参数化; 表名/列名只来自代码内常量
// ==========================================

pub mod cascade_repo;
pub mod chapter_repo;
pub mod error;
pub mod id_allocator;
pub mod object_repo;
pub mod plan_repo;
pub mod sql_util;
pub mod subchapter_repo;
pub mod work_plan_repo;
pub mod work_type_repo;

// 重导出核心仓储
pub use cascade_repo::{CascadeRepository, CascadeSummary};
pub use chapter_repo::ChapterRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use id_allocator::{IdAssignment, IdCollection};
pub use object_repo::ObjectRepository;
pub use plan_repo::SchedulePlanRepository;
pub use subchapter_repo::SubchapterRepository;
pub use work_plan_repo::WorkPlanRepository;
pub use work_type_repo::WorkTypeRepository;
