// ==========================================
// 施工进度计划系统 - 进度计划方案仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 方案删除由 CascadeRepository 负责 (需先删除全部后代)
// ==========================================

use crate::domain::plan::SchedulePlan;
use crate::domain::types::PlanStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use crate::repository::sql_util::{get_datetime, DATETIME_FORMAT};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT plan_id, object_id, created_at, version, status FROM work_schedule_plan";

// ==========================================
// SchedulePlanRepository - 进度计划方案仓储
// ==========================================
pub struct SchedulePlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SchedulePlanRepository {
    /// 创建新的SchedulePlanRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建方案（自动分配版本号）
    ///
    /// 说明：
    /// - 在同一事务内查询 MAX(version) 并写入，保证同一对象的版本号分配原子性。
    /// - 版本号 = 该对象已有最大版本 + 1（无版本时为 1）。
    pub fn create_with_next_version(
        &self,
        object_id: i64,
        status: PlanStatus,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<SchedulePlan> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let max_version: Option<i32> = tx.query_row(
            "SELECT MAX(version) FROM work_schedule_plan WHERE object_id = ?",
            params![object_id],
            |row| row.get(0),
        )?;
        let version = max_version.unwrap_or(0) + 1;

        let plan_id = id_allocator::allocate(&tx, IdCollection::Plan, IdAssignment::Auto)?;

        tx.execute(
            r#"INSERT INTO work_schedule_plan (plan_id, object_id, created_at, version, status)
               VALUES (?, ?, ?, ?, ?)"#,
            params![
                plan_id,
                object_id,
                created_at.format(DATETIME_FORMAT).to_string(),
                version,
                status.to_db_str(),
            ],
        )?;

        tx.commit()?;

        Ok(SchedulePlan {
            plan_id,
            object_id,
            created_at,
            version,
            status,
        })
    }

    /// 按plan_id查询方案
    pub fn find_by_id(&self, plan_id: i64) -> RepositoryResult<Option<SchedulePlan>> {
        let conn = self.get_conn()?;

        let plan = conn
            .query_row(
                &format!("{} WHERE plan_id = ?", SELECT_COLUMNS),
                params![plan_id],
                Self::map_row,
            )
            .optional()?;

        Ok(plan)
    }

    /// 查询所有方案 (按创建时间降序)
    pub fn list_all(&self) -> RepositoryResult<Vec<SchedulePlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, plan_id DESC",
            SELECT_COLUMNS
        ))?;

        let plans = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<SchedulePlan>, _>>()?;

        Ok(plans)
    }

    /// 查询对象的所有方案版本 (按版本号降序)
    pub fn list_by_object(&self, object_id: i64) -> RepositoryResult<Vec<SchedulePlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE object_id = ? ORDER BY version DESC",
            SELECT_COLUMNS
        ))?;

        let plans = stmt
            .query_map(params![object_id], Self::map_row)?
            .collect::<Result<Vec<SchedulePlan>, _>>()?;

        Ok(plans)
    }

    /// 查询对象当前处于编辑状态的方案
    ///
    /// 按状态显式查找, 若历史数据中存在多个则取版本号最大者
    pub fn find_editing_by_object(&self, object_id: i64) -> RepositoryResult<Option<SchedulePlan>> {
        let conn = self.get_conn()?;

        let plan = conn
            .query_row(
                &format!(
                    "{} WHERE object_id = ? AND status = ? ORDER BY version DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![object_id, PlanStatus::Editing.to_db_str()],
                Self::map_row,
            )
            .optional()?;

        Ok(plan)
    }

    /// 更新方案状态
    ///
    /// # 返回
    /// - `Ok(true)`: 已更新
    /// - `Ok(false)`: 方案不存在
    pub fn update_status(&self, plan_id: i64, status: PlanStatus) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE work_schedule_plan SET status = ? WHERE plan_id = ?",
            params![status.to_db_str(), plan_id],
        )?;

        Ok(rows > 0)
    }

    /// 激活方案 (同时归档同一对象的其他方案)
    ///
    /// # 红线
    /// - 必须在事务中完成，确保原子性
    /// - 同一对象只能有一个编辑中方案
    ///
    /// # 返回
    /// - `Ok(archived_count)`: 被归档的其他方案数
    pub fn activate(&self, plan_id: i64) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 1. 获取object_id
        let object_id: i64 = tx
            .query_row(
                "SELECT object_id FROM work_schedule_plan WHERE plan_id = ?",
                params![plan_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "SchedulePlan".to_string(),
                id: plan_id.to_string(),
            })?;

        // 2. 将同对象其他方案归档
        let archived = tx.execute(
            "UPDATE work_schedule_plan SET status = ? WHERE object_id = ? AND plan_id <> ?",
            params![PlanStatus::Archived.to_db_str(), object_id, plan_id],
        )?;

        // 3. 激活指定方案
        tx.execute(
            "UPDATE work_schedule_plan SET status = ? WHERE plan_id = ?",
            params![PlanStatus::Editing.to_db_str(), plan_id],
        )?;

        tx.commit()?;
        Ok(archived)
    }

    /// 映射数据库行到SchedulePlan对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<SchedulePlan> {
        let status: String = row.get(4)?;
        Ok(SchedulePlan {
            plan_id: row.get(0)?,
            object_id: row.get(1)?,
            created_at: get_datetime(row, 2)?,
            version: row.get(3)?,
            status: PlanStatus::from_db_str(&status),
        })
    }
}
