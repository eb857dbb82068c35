// ==========================================
// 员工批量导入 - API层错误类型
// ==========================================
// 职责: 把导入层 / 仓储层错误转换为面向操作员的错误消息
// ==========================================

use crate::i18n::t_with_args;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入 / 会话错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("会话阶段不允许该操作: {0}")]
    SessionPhaseViolation(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => {
                ApiError::NotFound(t_with_args("import.file_not_found", &[("path", &path)]))
            }
            ImportError::FileReadError(msg) => ApiError::ImportError(msg),
            ImportError::Parse(e) => ApiError::ImportError(e.to_string()),
            ImportError::RecordNotFound(local_id) => {
                ApiError::NotFound(format!("local_id={}", local_id))
            }
            e @ ImportError::EditRejected { .. } | e @ ImportError::CommitRejected { .. } => {
                ApiError::SessionPhaseViolation(e.to_string())
            }
            e @ ImportError::ConfigReadError { .. } | e @ ImportError::ConfigValueError { .. } => {
                ApiError::ConfigError(e.to_string())
            }
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            e @ RepositoryError::DuplicateKey(_) => ApiError::BusinessRuleViolation(e.to_string()),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImportPhase;
    use crate::importer::error::ParseError;

    #[test]
    fn test_phase_errors_map_to_phase_violation() {
        let err: ApiError = ImportError::CommitRejected {
            phase: ImportPhase::Completed,
        }
        .into();
        assert!(matches!(err, ApiError::SessionPhaseViolation(msg) if msg.contains("COMPLETED")));
    }

    #[test]
    fn test_parse_error_maps_to_import_error() {
        let err: ApiError = ImportError::Parse(ParseError::EmptyInput).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }

    #[test]
    fn test_duplicate_key_keeps_store_message() {
        let err: ApiError = RepositoryError::DuplicateKey("EMP001".to_string()).into();
        assert_eq!(
            err.to_string(),
            "业务规则违反: Employee with ID EMP001 already exists"
        );
    }
}
