// ==========================================
// 施工进度计划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "en", "ru"];

/// 报表默认最大周数
pub const DEFAULT_REPORT_MAX_WEEKS: usize = 104;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// 未写入的已知键以默认值补齐
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        config_map.insert(
            config_keys::SINGLE_EDITING_PLAN.to_string(),
            "true".to_string(),
        );
        config_map.insert(config_keys::LOCALE.to_string(), DEFAULT_LOCALE.to_string());
        config_map.insert(
            config_keys::REPORT_MAX_WEEKS.to_string(),
            DEFAULT_REPORT_MAX_WEEKS.to_string(),
        );

        {
            let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            let mut stmt =
                conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            for row in rows {
                let (key, value) = row?;
                config_map.insert(key, value);
            }
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 方案配置 =====

    /// 是否限制同一对象只能有一个编辑中方案
    ///
    /// 默认 true; 无法解析时按 true 处理
    pub fn get_single_editing_plan(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SINGLE_EDITING_PLAN, "true")?;
        Ok(match value.trim().to_lowercase().as_str() {
            "false" | "0" | "no" | "off" => false,
            _ => true,
        })
    }

    // ===== 界面配置 =====

    /// 消息语言, 不支持的值回退到默认语言
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)?;
        let value = value.trim();
        if SUPPORTED_LOCALES.contains(&value) {
            Ok(value.to_string())
        } else {
            tracing::warn!(
                config_key = config_keys::LOCALE,
                raw_value = %value,
                "不支持的语言配置，使用默认语言"
            );
            Ok(DEFAULT_LOCALE.to_string())
        }
    }

    // ===== 报表配置 =====

    /// 报表最大周数
    pub fn get_report_max_weeks(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::REPORT_MAX_WEEKS,
            &DEFAULT_REPORT_MAX_WEEKS.to_string(),
        )?;
        Ok(value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_REPORT_MAX_WEEKS))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 方案
    pub const SINGLE_EDITING_PLAN: &str = "schedule.single_editing_plan";

    // 界面
    pub const LOCALE: &str = "ui.locale";

    // 报表
    pub const REPORT_MAX_WEEKS: &str = "report.max_weeks";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn manager() -> ConfigManager {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        ConfigManager::from_connection(conn).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = manager();
        assert!(config.get_single_editing_plan().unwrap());
        assert_eq!(config.get_locale().unwrap(), "zh-CN");
        assert_eq!(config.get_report_max_weeks().unwrap(), 104);
    }

    #[test]
    fn test_set_and_read_back() {
        let config = manager();
        config
            .set_global_config_value(config_keys::SINGLE_EDITING_PLAN, "false")
            .unwrap();
        config.set_global_config_value(config_keys::LOCALE, "ru").unwrap();
        config
            .set_global_config_value(config_keys::REPORT_MAX_WEEKS, "12")
            .unwrap();

        assert!(!config.get_single_editing_plan().unwrap());
        assert_eq!(config.get_locale().unwrap(), "ru");
        assert_eq!(config.get_report_max_weeks().unwrap(), 12);

        // 覆写
        config
            .set_global_config_value(config_keys::REPORT_MAX_WEEKS, "20")
            .unwrap();
        assert_eq!(config.get_report_max_weeks().unwrap(), 20);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = manager();
        config.set_global_config_value(config_keys::LOCALE, "fr").unwrap();
        config
            .set_global_config_value(config_keys::REPORT_MAX_WEEKS, "abc")
            .unwrap();

        assert_eq!(config.get_locale().unwrap(), DEFAULT_LOCALE);
        assert_eq!(config.get_report_max_weeks().unwrap(), DEFAULT_REPORT_MAX_WEEKS);
    }

    #[test]
    fn test_snapshot_contains_defaults_and_overrides() {
        let config = manager();
        config.set_global_config_value(config_keys::LOCALE, "en").unwrap();

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.get(config_keys::LOCALE).map(String::as_str), Some("en"));
        assert_eq!(
            snapshot.get(config_keys::SINGLE_EDITING_PLAN).map(String::as_str),
            Some("true")
        );
        assert_eq!(
            snapshot.get(config_keys::REPORT_MAX_WEEKS).map(String::as_str),
            Some("104")
        );
    }
}
