// ==========================================
// 施工进度计划系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新; 语言切换即时生效
// ==========================================

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::config::config_manager::{config_keys, ConfigManager, SUPPORTED_LOCALES};
use crate::i18n::{set_locale, t_with_args};

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    /// 创建新的ConfigApi实例
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 全部配置 (含默认值)
    pub fn get_config_snapshot(&self) -> ApiResult<Value> {
        let raw = self
            .config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 更新单个配置
    ///
    /// 只接受已知键, 值在写入前校验
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<ApiResponse<Value>> {
        let value = value.trim();
        let valid = match key {
            config_keys::SINGLE_EDITING_PLAN => {
                matches!(value.to_lowercase().as_str(), "true" | "false")
            }
            config_keys::LOCALE => SUPPORTED_LOCALES.contains(&value),
            config_keys::REPORT_MAX_WEEKS => value.parse::<usize>().map(|w| w > 0).unwrap_or(false),
            _ => {
                return Err(ApiError::InvalidInput(format!("未知配置键: {}", key)));
            }
        };
        if !valid {
            return Err(ApiError::ValidationError(t_with_args(
                "error.config_value",
                &[("key", key), ("value", value)],
            )));
        }

        self.config_manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if key == config_keys::LOCALE {
            set_locale(value);
            info!(locale = value, "消息语言已切换");
        }

        Ok(ApiResponse::new(
            t_with_args("config.updated", &[("key", key)]),
            serde_json::json!({ "key": key, "value": value }),
        ))
    }
}
