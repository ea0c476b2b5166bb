// ==========================================
// 施工进度计划系统 - 级联删除仓储
// ==========================================
// 红线: 子树删除必须在单一事务中完成 (全部删除或全部保留)
// 删除顺序: 工作计划 -> 工作类型 -> 节 -> 章 -> 方案 -> 对象
// ==========================================

mod core;


pub use core::{CascadeRepository, CascadeSummary};
