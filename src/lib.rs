// ==========================================
// 施工进度计划系统 - 核心库
// ==========================================
// 层级: 对象 → 方案(版本) → 章 → 节 → 工作类型 → 工作计划
// 核心: 方案编辑锁、章/节序号重排与移动、级联删除
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 编辑锁、序号重排、周度汇总
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建库）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配与命令分发
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Chapter, ConstructionObject, PlanStatus, PlanStructure, ReportRow, ReportRowType,
    SchedulePlan, Subchapter, WeeklyReport, WorkPlan, WorkType,
};

// 引擎
pub use engine::{ChangesSwitch, LockManager, LockScope, OrderingEngine, ScheduleRepositories};

// API
pub use api::{ApiError, ApiResult, ConfigApi, HierarchyApi, ReportApi, ScheduleApi};

// 应用层
pub use app::{dispatch, AppState};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "施工进度计划系统";
