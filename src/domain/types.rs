// ==========================================
// 施工进度计划系统 - 领域类型定义
// ==========================================
// 职责: 方案状态、对象锁标记、报表行类型
// 注意: 状态值按原始数据库口径存储 (俄文状态字符串)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 进度计划方案状态 (Plan Status)
// ==========================================
// 存储口径: "Редактируется" / "Заблокирован" / "Архивный"
// 同一对象下最多一个 Editing 方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Editing,  // 编辑中
    Locked,   // 已锁定
    Archived, // 已归档
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PlanStatus {
    /// 从数据库字符串解析状态
    ///
    /// 未知值按 Locked 处理: 无法识别的状态不允许编辑
    pub fn from_db_str(s: &str) -> Self {
        match s.trim() {
            "Редактируется" | "EDITING" => PlanStatus::Editing,
            "Заблокирован" | "LOCKED" => PlanStatus::Locked,
            "Архивный" | "ARCHIVED" => PlanStatus::Archived,
            _ => PlanStatus::Locked,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanStatus::Editing => "Редактируется",
            PlanStatus::Locked => "Заблокирован",
            PlanStatus::Archived => "Архивный",
        }
    }
}

// ==========================================
// 施工对象锁标记 (Object Status Marker)
// ==========================================
// 对象 status 字段为自由文本, 仅 "LOCKED" 视为锁定
pub mod object_status {
    pub const LOCKED: &str = "LOCKED";
    pub const UNLOCKED: &str = "UNLOCKED";

    /// 判断对象状态文本是否为锁定标记
    pub fn is_locked(status: &str) -> bool {
        status.trim().eq_ignore_ascii_case(LOCKED)
    }
}

// ==========================================
// 报表行类型 (Report Row Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportRowType {
    Chapter,
    Subchapter,
    WorkType,
}

impl ReportRowType {
    /// 嵌套层级 (用于缩进)
    pub fn level(&self) -> u8 {
        match self {
            ReportRowType::Chapter => 0,
            ReportRowType::Subchapter => 1,
            ReportRowType::WorkType => 2,
        }
    }
}

impl fmt::Display for ReportRowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportRowType::Chapter => write!(f, "Chapter"),
            ReportRowType::Subchapter => write!(f, "Subchapter"),
            ReportRowType::WorkType => write!(f, "WorkType"),
        }
    }
}
