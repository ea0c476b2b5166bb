// ==========================================
// 施工进度计划系统 - 层级实体
// ==========================================
// 层级: 方案 → 章 → 节 → 工作类型 → 工作计划
// 所有权: 子实体只属于一个父实体, 删除父实体必须删除全部后代
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Chapter - 章
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: i64, // 章ID (全局 max+1 分配)
    pub plan_id: i64,    // 所属方案
    pub name: String,    // 名称
    pub number: i32,     // 序号 (同一方案内, 重排后为 1..N)
}

// ==========================================
// Subchapter - 节
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subchapter {
    pub subchapter_id: i64, // 节ID
    pub chapter_id: i64,    // 所属章 (可移动到其他章)
    pub name: String,       // 名称
    pub number: i32,        // 序号 (同一章内)
}

// ==========================================
// WorkType - 工作类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkType {
    pub work_type_id: i64,  // 工作类型ID
    pub subchapter_id: i64, // 所属节
    pub name: String,       // 名称
    pub number: i32,        // 序号
    pub unit: String,       // 计量单位 (EI)
}

// ==========================================
// WorkPlan - 工作计划 (某日计划量)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPlan {
    pub work_plan_id: i64,   // 工作计划ID
    pub work_type_id: i64,   // 所属工作类型
    pub plan_date: NaiveDate, // 日期
    pub value: i32,          // 计划量
}
