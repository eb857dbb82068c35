// ==========================================
// 员工批量导入 - API 层
// ==========================================
// 职责: 面向操作员的会话操作与结果视图
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{CommitResponse, EditResponse, ImportApi, RecordView, SessionView};
