use serde::Deserialize;
use serde_json::Value;

use crate::app::state::AppState;

use super::common::{map_api_error, parse_args, to_json};

#[derive(Debug, Deserialize)]
struct UpdateConfigArgs {
    key: String,
    value: String,
}

// ==========================================
// 配置相关命令
// ==========================================

/// 获取全部配置
pub(super) fn get_config(state: &AppState, _args: Value) -> Result<String, String> {
    let result = state.config_api.get_config_snapshot().map_err(map_api_error)?;

    to_json(&result)
}

/// 更新单个配置
pub(super) fn update_config(state: &AppState, args: Value) -> Result<String, String> {
    let args: UpdateConfigArgs = parse_args(args)?;
    let result = state
        .config_api
        .update_config(&args.key, &args.value)
        .map_err(map_api_error)?;

    to_json(&result)
}
