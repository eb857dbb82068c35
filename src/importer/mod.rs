// ==========================================
// 员工批量导入 - 导入层
// ==========================================
// 职责: 分隔文本 → 候选记录 → 校验 → 人工修正 → 提交
// ==========================================

// 模块声明
pub mod committer;
pub mod conflict_handler;
pub mod employee_importer_impl;
pub mod employee_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_validator;
pub mod session;

// 重导出核心类型
pub use committer::CommitOrchestrator;
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use employee_importer_impl::EmployeeImporterImpl;
pub use error::{ImportError, ImporterResult, ParseError};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::DelimitedTextParser;
pub use record_validator::RecordValidator as RecordValidatorImpl;
pub use session::{DuplicateConflict, EditOutcome, ImportSession};

// 重导出 Trait 接口
pub use employee_importer_trait::{
    ConflictHandler, EmployeeImporter, FieldMapper, FileParser, RecordValidator,
};
