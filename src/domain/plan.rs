// ==========================================
// 施工进度计划系统 - 进度计划方案领域模型
// ==========================================
// 方案是编辑锁边界: 锁定方案后其下全部层级只读
// 方案只追加不覆盖, 通过激活另一版本完成切换
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::hierarchy::{Chapter, Subchapter, WorkPlan, WorkType};
use crate::domain::object::ConstructionObject;
use crate::domain::types::PlanStatus;

// ==========================================
// SchedulePlan - 进度计划方案 (版本)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub plan_id: i64,              // 方案ID
    pub object_id: i64,            // 所属对象
    pub created_at: NaiveDateTime, // 创建时间
    pub version: i32,              // 版本号 (对象内唯一且递增)
    pub status: PlanStatus,        // 状态
}

impl SchedulePlan {
    /// 判断是否为编辑状态
    pub fn is_editing(&self) -> bool {
        self.status == PlanStatus::Editing
    }

    /// 判断是否为锁定状态
    pub fn is_locked(&self) -> bool {
        self.status == PlanStatus::Locked
    }

    /// 判断是否为归档状态
    pub fn is_archived(&self) -> bool {
        self.status == PlanStatus::Archived
    }
}

// ==========================================
// PlanStructure - 方案结构快照
// ==========================================
// 只读聚合: 章按序号, 节按序号, 工作类型按序号, 工作计划按日期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStructure {
    pub plan: SchedulePlan,
    pub object: Option<ConstructionObject>,
    pub chapters: Vec<Chapter>,
    pub subchapters: Vec<Subchapter>,
    pub work_types: Vec<WorkType>,
    pub work_plans: Vec<WorkPlan>,
}

impl PlanStructure {
    /// 指定章下的节 (保持快照中的序号顺序)
    pub fn subchapters_of(&self, chapter_id: i64) -> impl Iterator<Item = &Subchapter> {
        self.subchapters
            .iter()
            .filter(move |s| s.chapter_id == chapter_id)
    }

    /// 指定节下的工作类型
    pub fn work_types_of(&self, subchapter_id: i64) -> impl Iterator<Item = &WorkType> {
        self.work_types
            .iter()
            .filter(move |w| w.subchapter_id == subchapter_id)
    }

    /// 指定工作类型下的工作计划
    pub fn work_plans_of(&self, work_type_id: i64) -> impl Iterator<Item = &WorkPlan> {
        self.work_plans
            .iter()
            .filter(move |wp| wp.work_type_id == work_type_id)
    }

    /// 结构是否为空 (没有任何章)
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}
