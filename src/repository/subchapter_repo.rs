// ==========================================
// 施工进度计划系统 - 节仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::hierarchy::Subchapter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdAssignment, IdCollection};
use crate::repository::sql_util::{id_values, placeholders};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// SubchapterRepository - 节仓储
// ==========================================
pub struct SubchapterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubchapterRepository {
    /// 创建新的SubchapterRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增节 (主键全局 max+1)
    pub fn insert(&self, chapter_id: i64, name: &str, number: i32) -> RepositoryResult<Subchapter> {
        let conn = self.get_conn()?;
        let subchapter_id =
            id_allocator::allocate(&conn, IdCollection::Subchapter, IdAssignment::Auto)?;

        conn.execute(
            "INSERT INTO subchapter (subchapter_id, chapter_id, name, number) VALUES (?, ?, ?, ?)",
            params![subchapter_id, chapter_id, name, number],
        )?;

        Ok(Subchapter {
            subchapter_id,
            chapter_id,
            name: name.to_string(),
            number,
        })
    }

    /// 按subchapter_id查询节
    pub fn find_by_id(&self, subchapter_id: i64) -> RepositoryResult<Option<Subchapter>> {
        let conn = self.get_conn()?;

        let subchapter = conn
            .query_row(
                "SELECT subchapter_id, chapter_id, name, number FROM subchapter WHERE subchapter_id = ?",
                params![subchapter_id],
                Self::map_row,
            )
            .optional()?;

        Ok(subchapter)
    }

    /// 查询节所属的方案ID (经由章)
    pub fn find_plan_id(&self, subchapter_id: i64) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;

        let plan_id = conn
            .query_row(
                r#"SELECT c.plan_id
                   FROM subchapter s
                   JOIN chapter c ON c.chapter_id = s.chapter_id
                   WHERE s.subchapter_id = ?"#,
                params![subchapter_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(plan_id)
    }

    /// 查询章下的节 (按序号升序)
    pub fn list_by_chapter(&self, chapter_id: i64) -> RepositoryResult<Vec<Subchapter>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT subchapter_id, chapter_id, name, number
               FROM subchapter
               WHERE chapter_id = ?
               ORDER BY number, subchapter_id"#,
        )?;

        let subchapters = stmt
            .query_map(params![chapter_id], Self::map_row)?
            .collect::<Result<Vec<Subchapter>, _>>()?;

        Ok(subchapters)
    }

    /// 查询多个章下的节 (按序号升序)
    pub fn list_by_chapters(&self, chapter_ids: &[i64]) -> RepositoryResult<Vec<Subchapter>> {
        if chapter_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT subchapter_id, chapter_id, name, number
               FROM subchapter
               WHERE chapter_id IN ({})
               ORDER BY number, subchapter_id"#,
            placeholders(chapter_ids.len())
        );

        let mut stmt = conn.prepare(&sql)?;
        let subchapters = stmt
            .query_map(params_from_iter(id_values(chapter_ids)), Self::map_row)?
            .collect::<Result<Vec<Subchapter>, _>>()?;

        Ok(subchapters)
    }

    /// 更新节的名称与序号
    pub fn update(&self, subchapter: &Subchapter) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE subchapter SET name = ?, number = ? WHERE subchapter_id = ?",
            params![&subchapter.name, subchapter.number, subchapter.subchapter_id],
        )?;

        Ok(rows > 0)
    }

    /// 批量写入序号 (事务, 任一行未命中则回滚)
    pub fn apply_numbers(&self, chapter_id: i64, numbers: &[(i64, i32)]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "UPDATE subchapter SET number = ? WHERE subchapter_id = ? AND chapter_id = ?",
            )?;
            for (subchapter_id, number) in numbers {
                let rows = stmt.execute(params![number, subchapter_id, chapter_id])?;
                if rows == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Subchapter".to_string(),
                        id: subchapter_id.to_string(),
                    });
                }
            }
        }

        tx.commit()?;
        Ok(numbers.len())
    }

    /// 将节移动到新章末尾
    ///
    /// 新序号 = 移动前新章的节数 + 1 (同章内移动时包含自身); 原章剩余节不重新编号
    ///
    /// # 返回
    /// - `Ok(new_number)`: 新序号
    pub fn move_to_chapter(&self, subchapter_id: i64, new_chapter_id: i64) -> RepositoryResult<i32> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: i32 = tx.query_row(
            "SELECT COUNT(*) FROM subchapter WHERE chapter_id = ?",
            params![new_chapter_id],
            |row| row.get(0),
        )?;
        let new_number = existing + 1;

        let rows = tx.execute(
            "UPDATE subchapter SET chapter_id = ?, number = ? WHERE subchapter_id = ?",
            params![new_chapter_id, new_number, subchapter_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Subchapter".to_string(),
                id: subchapter_id.to_string(),
            });
        }

        tx.commit()?;
        Ok(new_number)
    }

    /// 映射数据库行到Subchapter对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Subchapter> {
        Ok(Subchapter {
            subchapter_id: row.get(0)?,
            chapter_id: row.get(1)?,
            name: row.get(2)?,
            number: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup() -> SubchapterRepository {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO construction_object (object_id, district, street) VALUES (1, 'D', 'S');
            INSERT INTO work_schedule_plan (plan_id, object_id, created_at, version, status)
                VALUES (1, 1, '2024-01-01 08:00:00', 1, 'Редактируется');
            INSERT INTO chapter (chapter_id, plan_id, name, number) VALUES (1, 1, 'A', 1);
            INSERT INTO chapter (chapter_id, plan_id, name, number) VALUES (2, 1, 'B', 2);
            "#,
        )
        .unwrap();
        SubchapterRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_move_to_chapter_appends_and_leaves_gap() {
        let repo = setup();
        let s1 = repo.insert(1, "a1", 1).unwrap();
        let s2 = repo.insert(1, "a2", 2).unwrap();
        let s3 = repo.insert(1, "a3", 3).unwrap();
        repo.insert(2, "b1", 1).unwrap();

        let number = repo.move_to_chapter(s2.subchapter_id, 2).unwrap();
        assert_eq!(number, 2);

        let moved = repo.find_by_id(s2.subchapter_id).unwrap().unwrap();
        assert_eq!(moved.chapter_id, 2);

        // 原章不重新编号
        let left: Vec<i32> = repo
            .list_by_chapter(1)
            .unwrap()
            .iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(left, vec![1, 3]);
        assert_eq!(repo.find_by_id(s1.subchapter_id).unwrap().unwrap().number, 1);
        assert_eq!(repo.find_by_id(s3.subchapter_id).unwrap().unwrap().number, 3);
    }

    #[test]
    fn test_move_within_same_chapter_goes_after_last() {
        let repo = setup();
        let s1 = repo.insert(1, "a1", 1).unwrap();
        let s2 = repo.insert(1, "a2", 2).unwrap();

        let number = repo.move_to_chapter(s1.subchapter_id, 1).unwrap();
        assert_eq!(number, 3);

        let numbers: Vec<(i64, i32)> = repo
            .list_by_chapter(1)
            .unwrap()
            .iter()
            .map(|s| (s.subchapter_id, s.number))
            .collect();
        assert_eq!(numbers, vec![(s2.subchapter_id, 2), (s1.subchapter_id, 3)]);
    }

    #[test]
    fn test_apply_numbers_rolls_back_on_foreign_row() {
        let repo = setup();
        let a = repo.insert(1, "a1", 1).unwrap();
        let b = repo.insert(2, "b1", 1).unwrap();

        let result = repo.apply_numbers(1, &[(a.subchapter_id, 5), (b.subchapter_id, 6)]);
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

        // 第一行的更新也被回滚
        assert_eq!(repo.find_by_id(a.subchapter_id).unwrap().unwrap().number, 1);
    }

    #[test]
    fn test_find_plan_id_through_chapter() {
        let repo = setup();
        let s = repo.insert(2, "b1", 1).unwrap();
        assert_eq!(repo.find_plan_id(s.subchapter_id).unwrap(), Some(1));
        assert_eq!(repo.find_plan_id(999).unwrap(), None);
    }
}
