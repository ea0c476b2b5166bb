// ==========================================
// 施工进度计划系统 - API 响应包装
// ==========================================

use serde::{Deserialize, Serialize};

/// 写操作响应: 本地化消息 + 受影响的实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: String, data: T) -> Self {
        Self { message, data }
    }
}

/// 锁状态查询结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockState {
    pub id: Option<i64>,
    pub locked: bool,
}
