// ==========================================
// 施工进度计划系统 - 工作类型仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 注意: work_type 删除由 CascadeRepository 负责 (先删工作计划)
// ==========================================

use crate::domain::hierarchy::WorkType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use crate::repository::sql_util::{id_values, placeholders};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// WorkTypeRepository - 工作类型仓储
// ==========================================
pub struct WorkTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkTypeRepository {
    /// 创建新的WorkTypeRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增工作类型
    ///
    /// # 参数
    /// - `assignment`: Auto 为 max+1; Explicit 时主键被占用返回 DuplicateId
    pub fn insert(
        &self,
        subchapter_id: i64,
        name: &str,
        number: i32,
        unit: &str,
        assignment: IdAssignment,
    ) -> RepositoryResult<WorkType> {
        let conn = self.get_conn()?;
        let work_type_id = id_allocator::allocate(&conn, IdCollection::WorkType, assignment)?;

        conn.execute(
            r#"INSERT INTO work_type (work_type_id, subchapter_id, name, number, unit)
               VALUES (?, ?, ?, ?, ?)"#,
            params![work_type_id, subchapter_id, name, number, unit],
        )?;

        Ok(WorkType {
            work_type_id,
            subchapter_id,
            name: name.to_string(),
            number,
            unit: unit.to_string(),
        })
    }

    /// 按work_type_id查询工作类型
    pub fn find_by_id(&self, work_type_id: i64) -> RepositoryResult<Option<WorkType>> {
        let conn = self.get_conn()?;

        let work_type = conn
            .query_row(
                r#"SELECT work_type_id, subchapter_id, name, number, unit
                   FROM work_type WHERE work_type_id = ?"#,
                params![work_type_id],
                Self::map_row,
            )
            .optional()?;

        Ok(work_type)
    }

    /// 查询工作类型所属的方案ID (经由节、章)
    pub fn find_plan_id(&self, work_type_id: i64) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;

        let plan_id = conn
            .query_row(
                r#"SELECT c.plan_id
                   FROM work_type w
                   JOIN subchapter s ON s.subchapter_id = w.subchapter_id
                   JOIN chapter c ON c.chapter_id = s.chapter_id
                   WHERE w.work_type_id = ?"#,
                params![work_type_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(plan_id)
    }

    /// 查询节下的工作类型 (按序号升序)
    pub fn list_by_subchapter(&self, subchapter_id: i64) -> RepositoryResult<Vec<WorkType>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT work_type_id, subchapter_id, name, number, unit
               FROM work_type
               WHERE subchapter_id = ?
               ORDER BY number, work_type_id"#,
        )?;

        let work_types = stmt
            .query_map(params![subchapter_id], Self::map_row)?
            .collect::<Result<Vec<WorkType>, _>>()?;

        Ok(work_types)
    }

    /// 查询多个节下的工作类型 (按序号升序)
    pub fn list_by_subchapters(&self, subchapter_ids: &[i64]) -> RepositoryResult<Vec<WorkType>> {
        if subchapter_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT work_type_id, subchapter_id, name, number, unit
               FROM work_type
               WHERE subchapter_id IN ({})
               ORDER BY number, work_type_id"#,
            placeholders(subchapter_ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let work_types = stmt
            .query_map(params_from_iter(id_values(subchapter_ids)), Self::map_row)?
            .collect::<Result<Vec<WorkType>, _>>()?;

        Ok(work_types)
    }

    /// 更新工作类型 (名称、序号、计量单位)
    pub fn update(&self, work_type: &WorkType) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE work_type SET name = ?, number = ?, unit = ? WHERE work_type_id = ?",
            params![
                &work_type.name,
                work_type.number,
                &work_type.unit,
                work_type.work_type_id
            ],
        )?;

        Ok(rows > 0)
    }

    /// 映射数据库行到WorkType对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<WorkType> {
        Ok(WorkType {
            work_type_id: row.get(0)?,
            subchapter_id: row.get(1)?,
            name: row.get(2)?,
            number: row.get(3)?,
            unit: row.get(4)?,
        })
    }
}
