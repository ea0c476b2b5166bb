use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::id_allocator::{self, IdCollection};
use crate::repository::sql_util::{child_ids, delete_ids};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// CascadeSummary - 各层删除行数
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeSummary {
    pub objects: usize,
    pub plans: usize,
    pub chapters: usize,
    pub subchapters: usize,
    pub work_types: usize,
    pub work_plans: usize,
}

impl CascadeSummary {
    /// 删除总行数
    pub fn total(&self) -> usize {
        self.objects + self.plans + self.chapters + self.subchapters + self.work_types + self.work_plans
    }
}

// ==========================================
// CascadeRepository - 级联删除
// ==========================================
pub struct CascadeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CascadeRepository {
    /// 创建新的CascadeRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 公开入口: 每个入口一个事务
    // ==========================================

    /// 删除方案及其全部后代
    pub fn delete_plan_tree(&self, plan_id: i64) -> RepositoryResult<CascadeSummary> {
        self.run_cascade(IdCollection::Plan, plan_id, |conn| {
            delete_plans(conn, &[plan_id])
        })
    }

    /// 删除对象的全部方案 (含后代) 及对象本身
    pub fn delete_object_schedules(&self, object_id: i64) -> RepositoryResult<CascadeSummary> {
        self.run_cascade(IdCollection::Object, object_id, |conn| {
            let plan_ids = child_ids(conn, "work_schedule_plan", "plan_id", "object_id", &[object_id])?;
            let mut summary = delete_plans(conn, &plan_ids)?;
            summary.objects = delete_ids(conn, "construction_object", "object_id", &[object_id])?;
            Ok(summary)
        })
    }

    /// 删除章及其节、工作类型、工作计划
    pub fn delete_chapter_tree(&self, chapter_id: i64) -> RepositoryResult<CascadeSummary> {
        self.run_cascade(IdCollection::Chapter, chapter_id, |conn| {
            delete_chapters(conn, &[chapter_id])
        })
    }

    /// 删除节及其工作类型、工作计划
    pub fn delete_subchapter_tree(&self, subchapter_id: i64) -> RepositoryResult<CascadeSummary> {
        self.run_cascade(IdCollection::Subchapter, subchapter_id, |conn| {
            delete_subchapters(conn, &[subchapter_id])
        })
    }

    /// 删除工作类型及其工作计划
    pub fn delete_work_type_tree(&self, work_type_id: i64) -> RepositoryResult<CascadeSummary> {
        self.run_cascade(IdCollection::WorkType, work_type_id, |conn| {
            delete_work_types(conn, &[work_type_id])
        })
    }

    /// 在事务中执行级联删除
    ///
    /// 根节点不存在返回 NotFound (不开始删除);
    /// 删除过程中任何失败统一为 DatabaseTransactionError, 事务随 drop 回滚
    fn run_cascade<F>(
        &self,
        root: IdCollection,
        root_id: i64,
        cascade: F,
    ) -> RepositoryResult<CascadeSummary>
    where
        F: FnOnce(&Connection) -> RepositoryResult<CascadeSummary>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::from(e).into_transaction_error())?;

        if !id_allocator::id_exists(&tx, root, root_id)? {
            return Err(RepositoryError::NotFound {
                entity: root.entity().to_string(),
                id: root_id.to_string(),
            });
        }

        let summary = cascade(&*tx).map_err(RepositoryError::into_transaction_error)?;

        tx.commit()
            .map_err(|e| RepositoryError::from(e).into_transaction_error())?;

        tracing::debug!(
            root = root.entity(),
            root_id,
            deleted = summary.total(),
            "级联删除完成"
        );
        Ok(summary)
    }
}

// ==========================================
// 逐层删除 (叶子优先)
// ==========================================

fn delete_plans(conn: &Connection, plan_ids: &[i64]) -> RepositoryResult<CascadeSummary> {
    let chapter_ids = child_ids(conn, "chapter", "chapter_id", "plan_id", plan_ids)?;
    let mut summary = delete_chapters(conn, &chapter_ids)?;
    summary.plans = delete_ids(conn, "work_schedule_plan", "plan_id", plan_ids)?;
    Ok(summary)
}

fn delete_chapters(conn: &Connection, chapter_ids: &[i64]) -> RepositoryResult<CascadeSummary> {
    let subchapter_ids = child_ids(conn, "subchapter", "subchapter_id", "chapter_id", chapter_ids)?;
    let mut summary = delete_subchapters(conn, &subchapter_ids)?;
    summary.chapters = delete_ids(conn, "chapter", "chapter_id", chapter_ids)?;
    Ok(summary)
}

fn delete_subchapters(conn: &Connection, subchapter_ids: &[i64]) -> RepositoryResult<CascadeSummary> {
    let work_type_ids = child_ids(conn, "work_type", "work_type_id", "subchapter_id", subchapter_ids)?;
    let mut summary = delete_work_types(conn, &work_type_ids)?;
    summary.subchapters = delete_ids(conn, "subchapter", "subchapter_id", subchapter_ids)?;
    Ok(summary)
}

fn delete_work_types(conn: &Connection, work_type_ids: &[i64]) -> RepositoryResult<CascadeSummary> {
    let work_plan_ids = child_ids(conn, "work_plan", "work_plan_id", "work_type_id", work_type_ids)?;
    let work_plans = delete_ids(conn, "work_plan", "work_plan_id", &work_plan_ids)?;
    let work_types = delete_ids(conn, "work_type", "work_type_id", work_type_ids)?;
    Ok(CascadeSummary {
        work_types,
        work_plans,
        ..CascadeSummary::default()
    })
}
