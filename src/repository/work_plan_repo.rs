// ==========================================
// 施工进度计划系统 - 工作计划仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::hierarchy::WorkPlan;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use crate::repository::sql_util::{get_date, id_values, placeholders, DATE_FORMAT};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkPlanRepository - 工作计划仓储
// ==========================================
pub struct WorkPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkPlanRepository {
    /// 创建新的WorkPlanRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增工作计划
    pub fn insert(
        &self,
        work_type_id: i64,
        plan_date: NaiveDate,
        value: i32,
        assignment: IdAssignment,
    ) -> RepositoryResult<WorkPlan> {
        let conn = self.get_conn()?;
        let work_plan_id = id_allocator::allocate(&conn, IdCollection::WorkPlan, assignment)?;

        conn.execute(
            r#"INSERT INTO work_plan (work_plan_id, work_type_id, plan_date, value)
               VALUES (?, ?, ?, ?)"#,
            params![
                work_plan_id,
                work_type_id,
                plan_date.format(DATE_FORMAT).to_string(),
                value
            ],
        )?;

        Ok(WorkPlan {
            work_plan_id,
            work_type_id,
            plan_date,
            value,
        })
    }

    /// 按work_plan_id查询工作计划
    pub fn find_by_id(&self, work_plan_id: i64) -> RepositoryResult<Option<WorkPlan>> {
        let conn = self.get_conn()?;

        let work_plan = conn
            .query_row(
                r#"SELECT work_plan_id, work_type_id, plan_date, value
                   FROM work_plan WHERE work_plan_id = ?"#,
                params![work_plan_id],
                Self::map_row,
            )
            .optional()?;

        Ok(work_plan)
    }

    /// 查询工作计划所属的方案ID
    pub fn find_plan_id(&self, work_plan_id: i64) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;

        let plan_id = conn
            .query_row(
                r#"SELECT c.plan_id
                   FROM work_plan wp
                   JOIN work_type w ON w.work_type_id = wp.work_type_id
                   JOIN subchapter s ON s.subchapter_id = w.subchapter_id
                   JOIN chapter c ON c.chapter_id = s.chapter_id
                   WHERE wp.work_plan_id = ?"#,
                params![work_plan_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(plan_id)
    }

    /// 查询工作类型下的工作计划 (按日期升序)
    pub fn list_by_work_type(&self, work_type_id: i64) -> RepositoryResult<Vec<WorkPlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT work_plan_id, work_type_id, plan_date, value
               FROM work_plan
               WHERE work_type_id = ?
               ORDER BY plan_date, work_plan_id"#,
        )?;

        let work_plans = stmt
            .query_map(params![work_type_id], Self::map_row)?
            .collect::<Result<Vec<WorkPlan>, _>>()?;

        Ok(work_plans)
    }

    /// 查询多个工作类型下的工作计划 (按日期升序)
    ///
    /// # 参数
    /// - `range`: 可选日期区间 [start, end] (含两端)
    pub fn list_by_work_types(
        &self,
        work_type_ids: &[i64],
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> RepositoryResult<Vec<WorkPlan>> {
        if work_type_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let mut sql = format!(
            r#"SELECT work_plan_id, work_type_id, plan_date, value
               FROM work_plan
               WHERE work_type_id IN ({})"#,
            placeholders(work_type_ids.len())
        );
        let mut values = id_values(work_type_ids);

        if let Some((start, end)) = range {
            sql.push_str(" AND plan_date >= ? AND plan_date <= ?");
            values.push(Value::Text(start.format(DATE_FORMAT).to_string()));
            values.push(Value::Text(end.format(DATE_FORMAT).to_string()));
        }
        sql.push_str(" ORDER BY plan_date, work_plan_id");

        let mut stmt = conn.prepare(&sql)?;
        let work_plans = stmt
            .query_map(params_from_iter(values), Self::map_row)?
            .collect::<Result<Vec<WorkPlan>, _>>()?;

        Ok(work_plans)
    }

    /// 更新工作计划 (日期、计划量)
    pub fn update(&self, work_plan: &WorkPlan) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE work_plan SET plan_date = ?, value = ? WHERE work_plan_id = ?",
            params![
                work_plan.plan_date.format(DATE_FORMAT).to_string(),
                work_plan.value,
                work_plan.work_plan_id
            ],
        )?;

        Ok(rows > 0)
    }

    /// 删除工作计划 (叶子节点, 无后代)
    pub fn delete(&self, work_plan_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "DELETE FROM work_plan WHERE work_plan_id = ?",
            params![work_plan_id],
        )?;

        Ok(rows > 0)
    }

    /// 映射数据库行到WorkPlan对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<WorkPlan> {
        Ok(WorkPlan {
            work_plan_id: row.get(0)?,
            work_type_id: row.get(1)?,
            plan_date: get_date(row, 2)?,
            value: row.get(3)?,
        })
    }
}
