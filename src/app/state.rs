// ==========================================
// 施工进度计划系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 全部仓储共享同一个数据库连接; 全局编辑开关仅存于进程内存
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, HierarchyApi, ReportApi, ScheduleApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::{ChangesSwitch, LockManager, OrderingEngine, ScheduleRepositories};
use crate::i18n::set_locale;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "WORK_SCHEDULE_DB_PATH";

/// 默认数据库文件名
const DB_FILE_NAME: &str = "work_schedule.db";

/// 应用状态
///
/// 包含所有API实例的共享引用
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 全局编辑开关 (进程重启后复位)
    pub changes_switch: Arc<ChangesSwitch>,

    /// 仓储集合
    pub repos: ScheduleRepositories,

    /// 编辑锁管理
    pub lock_manager: Arc<LockManager>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 方案 API
    pub schedule_api: Arc<ScheduleApi>,

    /// 层级结构 API
    pub hierarchy_api: Arc<HierarchyApi>,

    /// 周报 API
    pub report_api: Arc<ReportApi>,

    /// 配置 API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并幂等建库
    /// 2. 初始化Repository与Engine
    /// 3. 按配置设置消息语言
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建库失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let repos = ScheduleRepositories::from_connection(conn.clone());

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        match config_manager.get_locale() {
            Ok(locale) => set_locale(&locale),
            Err(e) => tracing::warn!("读取语言配置失败(使用默认语言): {}", e),
        }

        let changes_switch = Arc::new(ChangesSwitch::new());
        let lock_manager = Arc::new(LockManager::new(
            changes_switch.clone(),
            repos.plan_repo.clone(),
            repos.object_repo.clone(),
        ));
        let ordering_engine = Arc::new(OrderingEngine::new(
            repos.chapter_repo.clone(),
            repos.subchapter_repo.clone(),
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let schedule_api = Arc::new(ScheduleApi::new(
            repos.clone(),
            lock_manager.clone(),
            config_manager.clone(),
        ));
        let hierarchy_api = Arc::new(HierarchyApi::new(
            repos.clone(),
            lock_manager.clone(),
            ordering_engine,
        ));
        let report_api = Arc::new(ReportApi::new(repos.clone(), config_manager.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            changes_switch,
            repos,
            lock_manager,
            config_manager,
            schedule_api,
            hierarchy_api,
            report_api,
            config_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("work-schedule");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
