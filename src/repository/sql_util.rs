// ==========================================
// 仓储层公共工具: 日期格式、IN 子句、ID 列表查询
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// 时间戳存储格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 生成 `?, ?, ?` 形式的占位符
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// ID 列表转为 rusqlite 参数
pub fn id_values(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| Value::Integer(*id)).collect()
}

/// 解析时间戳列
pub fn get_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 解析日期列
pub fn get_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 按父ID列表查询子ID
///
/// `table`/`id_column`/`parent_column` 只接受代码内常量
pub fn child_ids(
    conn: &Connection,
    table: &str,
    id_column: &str,
    parent_column: &str,
    parent_ids: &[i64],
) -> rusqlite::Result<Vec<i64>> {
    if parent_ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {id} FROM {table} WHERE {parent} IN ({ph}) ORDER BY {id}",
        id = id_column,
        table = table,
        parent = parent_column,
        ph = placeholders(parent_ids.len()),
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(id_values(parent_ids)), |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// 按ID列表删除
pub fn delete_ids(
    conn: &Connection,
    table: &str,
    id_column: &str,
    ids: &[i64],
) -> rusqlite::Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "DELETE FROM {} WHERE {} IN ({})",
        table,
        id_column,
        placeholders(ids.len())
    );
    conn.execute(&sql, params_from_iter(id_values(ids)))
}
