// ==========================================
// 施工进度计划系统 - SQLite 连接初始化与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键、busy_timeout)
// - 幂等建库: 层级五张表 + 配置表 + schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存数据库 (测试/演示用), 已建库
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// 幂等建库
///
/// 外键说明：
/// - work_type → subchapter、work_plan → work_type 为 RESTRICT，
///   删除必须由调用方显式按“叶 → 根”顺序完成
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS construction_object (
            object_id INTEGER PRIMARY KEY,
            district TEXT NOT NULL,
            street TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'UNLOCKED'
        );

        CREATE TABLE IF NOT EXISTS work_schedule_plan (
            plan_id INTEGER PRIMARY KEY,
            object_id INTEGER NOT NULL REFERENCES construction_object(object_id),
            created_at TEXT NOT NULL,
            version INTEGER NOT NULL,
            status TEXT NOT NULL,
            UNIQUE(object_id, version)
        );

        CREATE TABLE IF NOT EXISTS chapter (
            chapter_id INTEGER PRIMARY KEY,
            plan_id INTEGER NOT NULL REFERENCES work_schedule_plan(plan_id),
            name TEXT NOT NULL,
            number INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subchapter (
            subchapter_id INTEGER PRIMARY KEY,
            chapter_id INTEGER NOT NULL REFERENCES chapter(chapter_id),
            name TEXT NOT NULL,
            number INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS work_type (
            work_type_id INTEGER PRIMARY KEY,
            subchapter_id INTEGER NOT NULL
                REFERENCES subchapter(subchapter_id) ON DELETE RESTRICT,
            name TEXT NOT NULL,
            number INTEGER NOT NULL,
            unit TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS work_plan (
            work_plan_id INTEGER PRIMARY KEY,
            work_type_id INTEGER NOT NULL
                REFERENCES work_type(work_type_id) ON DELETE RESTRICT,
            plan_date TEXT NOT NULL,
            value INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_plan_object ON work_schedule_plan(object_id);
        CREATE INDEX IF NOT EXISTS idx_chapter_plan ON chapter(plan_id);
        CREATE INDEX IF NOT EXISTS idx_subchapter_chapter ON subchapter(chapter_id);
        CREATE INDEX IF NOT EXISTS idx_work_type_subchapter ON work_type(subchapter_id);
        CREATE INDEX IF NOT EXISTS idx_work_plan_work_type ON work_plan(work_type_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
