// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
pub mod test_helpers;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use work_schedule::api::ApiError;
use work_schedule::app::AppState;
use work_schedule::domain::{Chapter, Subchapter, WorkPlan, WorkType};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 基于临时数据库文件装配完整的 AppState
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

/// 预置的一棵完整方案树
///
/// 2 章 × 2 节 × 1 工作类型 × 2 工作计划
#[derive(Debug, Clone)]
pub struct SeededPlan {
    pub object_id: i64,
    pub plan_id: i64,
    pub chapters: Vec<i64>,
    pub subchapters: Vec<i64>,
    pub work_types: Vec<i64>,
    pub work_plans: Vec<i64>,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let state = AppState::new(db_path.clone())?;

        Ok(Self {
            db_path,
            state,
            _temp_file: temp_file,
        })
    }

    // ==========================================
    // 数据准备
    // ==========================================

    pub fn create_object(&self, district: &str, street: &str) -> i64 {
        self.state
            .schedule_api
            .create_object(district, street)
            .expect("创建对象失败")
            .data
            .object_id
    }

    pub fn create_plan(&self, object_id: i64) -> i64 {
        self.state
            .schedule_api
            .create_work_schedule(object_id)
            .expect("创建方案失败")
            .data
            .plan_id
    }

    pub fn add_chapter(&self, plan_id: i64, name: &str, number: i32) -> Chapter {
        self.state
            .hierarchy_api
            .add_chapter(plan_id, name, number)
            .expect("新增章失败")
            .data
    }

    pub fn add_subchapter(&self, chapter_id: i64, name: &str, number: i32) -> Subchapter {
        self.state
            .hierarchy_api
            .add_subchapter(chapter_id, name, number)
            .expect("新增节失败")
            .data
    }

    pub fn add_work_type(&self, subchapter_id: i64, name: &str, number: i32, unit: &str) -> WorkType {
        self.state
            .hierarchy_api
            .add_work_type(subchapter_id, name, number, unit, None)
            .expect("新增工作类型失败")
            .data
    }

    pub fn add_work_plan(&self, work_type_id: i64, date: NaiveDate, value: i32) -> WorkPlan {
        self.state
            .hierarchy_api
            .add_work_plan(work_type_id, date, value, None)
            .expect("新增工作计划失败")
            .data
    }

    /// 为新对象创建一棵完整的方案树
    pub fn seed_plan(&self) -> SeededPlan {
        let object_id = self.create_object("Central", "Main street 1");
        let plan_id = self.create_plan(object_id);
        self.seed_tree(object_id, plan_id)
    }

    /// 在已有方案下填充 2 章 × 2 节 × 1 工作类型 × 2 工作计划
    pub fn seed_tree(&self, object_id: i64, plan_id: i64) -> SeededPlan {
        let mut seeded = SeededPlan {
            object_id,
            plan_id,
            chapters: Vec::new(),
            subchapters: Vec::new(),
            work_types: Vec::new(),
            work_plans: Vec::new(),
        };

        for c in 1..=2 {
            let chapter = self.add_chapter(plan_id, &format!("Chapter {}", c), c);
            seeded.chapters.push(chapter.chapter_id);

            for s in 1..=2 {
                let sub = self.add_subchapter(chapter.chapter_id, &format!("Sub {}.{}", c, s), s);
                seeded.subchapters.push(sub.subchapter_id);

                let wt = self.add_work_type(sub.subchapter_id, &format!("Work {}.{}", c, s), 1, "m3");
                seeded.work_types.push(wt.work_type_id);

                for day in [1, 8] {
                    let wp = self.add_work_plan(wt.work_type_id, date(2024, 1, day), 10);
                    seeded.work_plans.push(wp.work_plan_id);
                }
            }
        }

        seeded
    }

    // ==========================================
    // 状态核对
    // ==========================================

    /// 层级表的完整快照
    pub fn snapshot(&self) -> String {
        test_helpers::snapshot(&self.db_path)
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        test_helpers::count_rows(&self.db_path, table)
    }

    pub fn side_connection(&self) -> rusqlite::Connection {
        test_helpers::open_side_connection(&self.db_path)
    }

    pub fn chapter_numbers(&self, plan_id: i64) -> Vec<(i64, i32)> {
        self.state
            .hierarchy_api
            .list_chapters(plan_id)
            .unwrap()
            .iter()
            .map(|c| (c.chapter_id, c.number))
            .collect()
    }

    pub fn subchapter_numbers(&self, chapter_id: i64) -> Vec<(i64, i32)> {
        self.state
            .hierarchy_api
            .list_subchapters(chapter_id)
            .unwrap()
            .iter()
            .map(|s| (s.subchapter_id, s.number))
            .collect()
    }
}

/// 构造日期
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 断言为编辑锁类错误
pub fn assert_lock_error<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(err) => assert!(err.is_lock_violation(), "期望编辑锁错误, 实际: {:?}", err),
        Ok(v) => panic!("期望编辑锁错误, 实际成功: {:?}", v),
    }
}

/// 断言为 NotFound
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::NotFound(_)) => {}
        other => panic!("期望 NotFound, 实际: {:?}", other),
    }
}
