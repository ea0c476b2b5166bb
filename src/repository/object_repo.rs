// ==========================================
// 施工进度计划系统 - 施工对象仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::object::ConstructionObject;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ObjectRepository - 施工对象仓储
// ==========================================
pub struct ObjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ObjectRepository {
    /// 创建新的ObjectRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建对象 (主键 max+1)
    ///
    /// # 返回
    /// - `Ok(ConstructionObject)`: 已写入的对象 (含分配的主键)
    pub fn create(
        &self,
        district: &str,
        street: &str,
        status: &str,
        assignment: IdAssignment,
    ) -> RepositoryResult<ConstructionObject> {
        let conn = self.get_conn()?;
        let object_id = id_allocator::allocate(&conn, IdCollection::Object, assignment)?;

        conn.execute(
            "INSERT INTO construction_object (object_id, district, street, status) VALUES (?, ?, ?, ?)",
            params![object_id, district, street, status],
        )?;

        Ok(ConstructionObject {
            object_id,
            district: district.to_string(),
            street: street.to_string(),
            status: status.to_string(),
        })
    }

    /// 按object_id查询对象
    ///
    /// # 返回
    /// - `Ok(Some(ConstructionObject))`: 找到对象
    /// - `Ok(None)`: 未找到
    pub fn find_by_id(&self, object_id: i64) -> RepositoryResult<Option<ConstructionObject>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT object_id, district, street, status FROM construction_object WHERE object_id = ?",
            params![object_id],
            Self::map_row,
        ) {
            Ok(obj) => Ok(Some(obj)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询所有对象 (按主键升序)
    pub fn list_all(&self) -> RepositoryResult<Vec<ConstructionObject>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT object_id, district, street, status FROM construction_object ORDER BY object_id",
        )?;

        let objects = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<ConstructionObject>, _>>()?;

        Ok(objects)
    }

    /// 更新对象状态 (锁标记)
    ///
    /// # 返回
    /// - `Ok(true)`: 已更新
    /// - `Ok(false)`: 对象不存在
    pub fn update_status(&self, object_id: i64, status: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE construction_object SET status = ? WHERE object_id = ?",
            params![status, object_id],
        )?;

        Ok(rows > 0)
    }

    /// 映射数据库行到ConstructionObject
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ConstructionObject> {
        Ok(ConstructionObject {
            object_id: row.get(0)?,
            district: row.get(1)?,
            street: row.get(2)?,
            status: row.get(3)?,
        })
    }
}
