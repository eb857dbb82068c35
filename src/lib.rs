// ==========================================
// 员工批量导入 - 核心库
// ==========================================
// 管道: 分隔文本解析 → 字段映射 → 已有员工号拉取 → 校验 → 人工修正 → 提交
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 候选记录与类型
pub mod domain;

// 数据仓储层 - 员工存储
pub mod repository;

// 导入层 - 解析 / 映射 / 校验 / 会话 / 提交
pub mod importer;

// 配置层 - config_kv
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 操作员接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CandidateRecord, CommitOutcome, EmployeeField, EmployeeRecord, EmployeeStatus, FieldError,
    FieldErrorKind, FieldSlot, FieldValue, ImportPhase, ImportResult, RawRow,
};

// 导入
pub use importer::{
    EditOutcome, EmployeeImporter, EmployeeImporterImpl, ImportError, ImportSession,
    ImporterResult, ParseError,
};

// 存储
pub use repository::{EmployeeStore, RepositoryError, SqliteEmployeeStore};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 版本信息
// ==========================================
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "员工批量导入";
