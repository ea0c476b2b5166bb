// ==========================================
// 施工进度计划系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/引擎错误为用户可读的错误消息
// 约束: "未找到" 与 "已锁定" 为不同变体, 调用方可结构化区分
// ==========================================

use crate::engine::lock_manager::LockScope;
use crate::engine::ordering::{OrderingError, OrderingViolation};
use crate::i18n::t_with_args;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 业务类变体携带已本地化的消息
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 资源错误
    // ==========================================
    #[error("{0}")]
    NotFound(String),

    // ==========================================
    // 编辑锁错误
    // ==========================================
    #[error("{0}")]
    PlanLocked(String),

    #[error("{0}")]
    ObjectLocked(String),

    /// 全局编辑开关
    #[error("{0}")]
    ChangesLocked(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    DuplicateId(String),

    #[error("{0}")]
    CrossPlanMove(String),

    #[error("{0}")]
    ActivePlanExists(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 实体不存在
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        ApiError::NotFound(t_with_args(
            "error.not_found",
            &[("entity", entity), ("id", &id.to_string())],
        ))
    }

    /// 由锁阻断来源构造错误
    pub fn from_lock_scope(scope: LockScope) -> Self {
        match scope {
            LockScope::Changes => ApiError::ChangesLocked(t_with_args("error.changes_locked", &[])),
            LockScope::Object(object_id) => ApiError::ObjectLocked(t_with_args(
                "error.object_locked",
                &[("object_id", &object_id.to_string())],
            )),
            LockScope::Plan(plan_id) => ApiError::PlanLocked(t_with_args(
                "error.plan_locked",
                &[("plan_id", &plan_id.to_string())],
            )),
        }
    }

    /// 是否为编辑锁类错误
    pub fn is_lock_violation(&self) -> bool {
        matches!(
            self,
            ApiError::PlanLocked(_) | ApiError::ObjectLocked(_) | ApiError::ChangesLocked(_)
        )
    }

    /// 错误码 (JSON 响应使用)
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PlanLocked(_) => "PLAN_LOCKED",
            ApiError::ObjectLocked(_) => "OBJECT_LOCKED",
            ApiError::ChangesLocked(_) => "CHANGES_LOCKED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::DuplicateId(_) => "DUPLICATE_ID",
            ApiError::CrossPlanMove(_) => "CROSS_PLAN_MOVE",
            ApiError::ActivePlanExists(_) => "ACTIVE_PLAN_EXISTS",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "UNKNOWN_ERROR",
        }
    }

    /// 对应的 HTTP 状态类别: 404 / 400 / 500
    pub fn status_class(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::PlanLocked(_)
            | ApiError::ObjectLocked(_)
            | ApiError::ChangesLocked(_)
            | ApiError::InvalidInput(_)
            | ApiError::ValidationError(_)
            | ApiError::DuplicateId(_)
            | ApiError::CrossPlanMove(_)
            | ApiError::ActivePlanExists(_) => 400,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound(t_with_args(
                "error.not_found",
                &[("entity", &entity), ("id", &id)],
            )),
            RepositoryError::DuplicateId { entity, id } => ApiError::DuplicateId(t_with_args(
                "error.duplicate_id",
                &[("entity", &entity), ("id", &id.to_string())],
            )),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 OrderingError 转换
// ==========================================
impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::Violation(v) => {
                let msg = match v {
                    OrderingViolation::CountMismatch { expected, actual } => t_with_args(
                        "error.reorder_count",
                        &[
                            ("expected", &expected.to_string()),
                            ("actual", &actual.to_string()),
                        ],
                    ),
                    OrderingViolation::UnknownId(id) => {
                        t_with_args("error.reorder_unknown", &[("id", &id.to_string())])
                    }
                    OrderingViolation::DuplicateId(id) => {
                        t_with_args("error.reorder_duplicate", &[("id", &id.to_string())])
                    }
                };
                ApiError::ValidationError(msg)
            }
            OrderingError::NotFound { entity, id } => ApiError::not_found(entity, id),
            OrderingError::CrossPlanMove {
                subchapter_id,
                from_plan_id,
                to_plan_id,
            } => ApiError::CrossPlanMove(t_with_args(
                "error.cross_plan_move",
                &[
                    ("subchapter_id", &subchapter_id.to_string()),
                    ("from_plan_id", &from_plan_id.to_string()),
                    ("to_plan_id", &to_plan_id.to_string()),
                ],
            )),
            OrderingError::Repository(e) => e.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
