// ==========================================
// 员工批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 字段级校验错误不走此类型（记录在 CandidateRecord 上）
// ==========================================

use crate::domain::ImportPhase;
use thiserror::Error;

/// 解析错误（对会话致命，不产生任何中间状态）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("输入为空: 未找到表头行")]
    EmptyInput,

    #[error("缺少数据行: 仅有表头 (第 {header_line} 行)")]
    MissingDataRows { header_line: usize },
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件解析失败: {0}")]
    Parse(#[from] ParseError),

    // ===== 会话相关错误 =====
    #[error("记录不存在: local_id={0}")]
    RecordNotFound(String),

    #[error("当前阶段不允许修改记录: phase={phase}")]
    EditRejected { phase: ImportPhase },

    #[error("当前阶段不允许提交: phase={phase}")]
    CommitRejected { phase: ImportPhase },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;
