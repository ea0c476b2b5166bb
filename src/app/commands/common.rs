use crate::api::error::ApiError;
use crate::i18n::t_with_args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==========================================
// 公共工具：错误映射、参数解析、结果序列化
// ==========================================

/// 错误响应（返回给调用方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<Value>,
}

impl ErrorResponse {
    fn into_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone())
    }
}

/// 将ApiError转换为JSON字符串
///
/// details.status 为对应的 HTTP 状态类别
pub(super) fn map_api_error(err: ApiError) -> String {
    ErrorResponse {
        code: err.code().to_string(),
        message: err.to_string(),
        details: Some(serde_json::json!({ "status": err.status_class() })),
    }
    .into_json()
}

/// 未知命令
pub(super) fn unknown_command(command: &str) -> String {
    ErrorResponse {
        code: "UNKNOWN_COMMAND".to_string(),
        message: t_with_args("error.unknown_command", &[("command", command)]),
        details: Some(serde_json::json!({ "status": 404 })),
    }
    .into_json()
}

/// 解析命令参数
///
/// 缺省参数 (null) 按空对象处理, 便于全部字段可选的命令
pub(super) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };

    serde_json::from_value(args).map_err(|e| {
        ErrorResponse {
            code: "INVALID_ARGS".to_string(),
            message: t_with_args("error.invalid_args", &[("reason", &e.to_string())]),
            details: Some(serde_json::json!({ "status": 400 })),
        }
        .into_json()
    })
}

/// 序列化命令结果
pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("序列化失败: {}", e))
}
