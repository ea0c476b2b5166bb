// ==========================================
// 施工进度计划系统 - 章仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 序号重排的校验在 OrderingEngine, 这里只做原子写入
// ==========================================

use crate::domain::hierarchy::Chapter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ChapterRepository - 章仓储
// ==========================================
pub struct ChapterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ChapterRepository {
    /// 创建新的ChapterRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增章 (主键全局 max+1)
    pub fn insert(&self, plan_id: i64, name: &str, number: i32) -> RepositoryResult<Chapter> {
        let conn = self.get_conn()?;
        let chapter_id = id_allocator::allocate(&conn, IdCollection::Chapter, IdAssignment::Auto)?;

        conn.execute(
            "INSERT INTO chapter (chapter_id, plan_id, name, number) VALUES (?, ?, ?, ?)",
            params![chapter_id, plan_id, name, number],
        )?;

        Ok(Chapter {
            chapter_id,
            plan_id,
            name: name.to_string(),
            number,
        })
    }

    /// 按chapter_id查询章
    pub fn find_by_id(&self, chapter_id: i64) -> RepositoryResult<Option<Chapter>> {
        let conn = self.get_conn()?;

        let chapter = conn
            .query_row(
                "SELECT chapter_id, plan_id, name, number FROM chapter WHERE chapter_id = ?",
                params![chapter_id],
                Self::map_row,
            )
            .optional()?;

        Ok(chapter)
    }

    /// 查询方案下的章 (按序号升序, 同序号按主键)
    pub fn list_by_plan(&self, plan_id: i64) -> RepositoryResult<Vec<Chapter>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT chapter_id, plan_id, name, number
               FROM chapter
               WHERE plan_id = ?
               ORDER BY number, chapter_id"#,
        )?;

        let chapters = stmt
            .query_map(params![plan_id], Self::map_row)?
            .collect::<Result<Vec<Chapter>, _>>()?;

        Ok(chapters)
    }

    /// 更新章的名称与序号
    ///
    /// # 返回
    /// - `Ok(false)`: 章不存在
    pub fn update(&self, chapter: &Chapter) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE chapter SET name = ?, number = ? WHERE chapter_id = ?",
            params![&chapter.name, chapter.number, chapter.chapter_id],
        )?;

        Ok(rows > 0)
    }

    /// 批量写入序号
    ///
    /// # 红线
    /// - 必须在事务中完成: 全部成功或全部不生效
    /// - 仅更新属于 plan_id 的章, 任一行未命中则回滚
    pub fn apply_numbers(&self, plan_id: i64, numbers: &[(i64, i32)]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt =
                tx.prepare("UPDATE chapter SET number = ? WHERE chapter_id = ? AND plan_id = ?")?;
            for (chapter_id, number) in numbers {
                let rows = stmt.execute(params![number, chapter_id, plan_id])?;
                if rows == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Chapter".to_string(),
                        id: chapter_id.to_string(),
                    });
                }
            }
        }

        tx.commit()?;
        Ok(numbers.len())
    }

    /// 映射数据库行到Chapter对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Chapter> {
        Ok(Chapter {
            chapter_id: row.get(0)?,
            plan_id: row.get(1)?,
            name: row.get(2)?,
            number: row.get(3)?,
        })
    }
}
