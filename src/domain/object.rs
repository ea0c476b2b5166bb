// ==========================================
// 施工进度计划系统 - 施工对象领域模型
// ==========================================
// 对象是版本边界: 进度计划方案按对象递增版本号
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::object_status;

// ==========================================
// ConstructionObject - 施工对象
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionObject {
    pub object_id: i64,   // 对象ID
    pub district: String, // 区域
    pub street: String,   // 街道/地址
    pub status: String,   // 状态 (自由文本, "LOCKED" 为锁定标记)
}

impl ConstructionObject {
    /// 对象是否被锁定
    pub fn is_locked(&self) -> bool {
        object_status::is_locked(&self.status)
    }
}
