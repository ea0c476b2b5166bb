// ==========================================
// 施工进度计划系统 - 主键分配器
// ==========================================
// 规则: next = max(existing ids) + 1, 空集合为 1
// 显式主键: 不分配, 但必须校验唯一 (拒绝而非覆盖)
// 注意: 非真正序列, 并发写入下可能冲突, 依赖“单一编辑者”假设
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// IdCollection - 主键集合 (表)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCollection {
    Object,
    Plan,
    Chapter,
    Subchapter,
    WorkType,
    WorkPlan,
}

impl IdCollection {
    /// 表名
    pub fn table(&self) -> &'static str {
        match self {
            IdCollection::Object => "construction_object",
            IdCollection::Plan => "work_schedule_plan",
            IdCollection::Chapter => "chapter",
            IdCollection::Subchapter => "subchapter",
            IdCollection::WorkType => "work_type",
            IdCollection::WorkPlan => "work_plan",
        }
    }

    /// 主键列名
    pub fn id_column(&self) -> &'static str {
        match self {
            IdCollection::Object => "object_id",
            IdCollection::Plan => "plan_id",
            IdCollection::Chapter => "chapter_id",
            IdCollection::Subchapter => "subchapter_id",
            IdCollection::WorkType => "work_type_id",
            IdCollection::WorkPlan => "work_plan_id",
        }
    }

    /// 实体名 (用于错误信息)
    pub fn entity(&self) -> &'static str {
        match self {
            IdCollection::Object => "ConstructionObject",
            IdCollection::Plan => "SchedulePlan",
            IdCollection::Chapter => "Chapter",
            IdCollection::Subchapter => "Subchapter",
            IdCollection::WorkType => "WorkType",
            IdCollection::WorkPlan => "WorkPlan",
        }
    }
}

// ==========================================
// IdAssignment - 主键来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IdAssignment {
    /// max + 1
    #[default]
    Auto,
    /// 调用方指定 (必须未被占用)
    Explicit(i64),
}

impl From<Option<i64>> for IdAssignment {
    fn from(id: Option<i64>) -> Self {
        match id {
            Some(id) => IdAssignment::Explicit(id),
            None => IdAssignment::Auto,
        }
    }
}

/// 由当前最大主键计算下一个主键
///
/// 最大主键已是 i64::MAX 时无法继续分配
pub fn next_id(collection: IdCollection, current_max: Option<i64>) -> RepositoryResult<i64> {
    match current_max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| RepositoryError::FieldValueError {
                field: collection.id_column().to_string(),
                message: format!("主键已达上限, 无法自动分配: {}", max),
            }),
    }
}

/// 查询集合当前最大主键
pub fn max_id(conn: &Connection, collection: IdCollection) -> RepositoryResult<Option<i64>> {
    let sql = format!(
        "SELECT MAX({}) FROM {}",
        collection.id_column(),
        collection.table()
    );
    let max: Option<i64> = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(max)
}

/// 主键是否已存在
pub fn id_exists(conn: &Connection, collection: IdCollection, id: i64) -> RepositoryResult<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        collection.table(),
        collection.id_column()
    );
    let found: Option<i64> = conn
        .query_row(&sql, params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// 按主键来源解析出最终主键
///
/// # 错误
/// - `RepositoryError::DuplicateId`: 显式主键已被占用
/// - `RepositoryError::FieldValueError`: 显式主键非正数, 或自动主键溢出
pub fn allocate(
    conn: &Connection,
    collection: IdCollection,
    assignment: IdAssignment,
) -> RepositoryResult<i64> {
    match assignment {
        IdAssignment::Auto => next_id(collection, max_id(conn, collection)?),
        IdAssignment::Explicit(id) => {
            if id <= 0 {
                return Err(RepositoryError::FieldValueError {
                    field: collection.id_column().to_string(),
                    message: format!("主键必须为正数: {}", id),
                });
            }
            if id_exists(conn, collection, id)? {
                return Err(RepositoryError::DuplicateId {
                    entity: collection.entity().to_string(),
                    id,
                });
            }
            Ok(id)
        }
    }
}
