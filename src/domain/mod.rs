// ==========================================
// 员工批量导入 - 领域模型层
// ==========================================
// 职责: 定义候选记录、字段类型、会话阶段
// 红线: 不含数据访问逻辑,不含校验逻辑
// ==========================================

pub mod employee;
pub mod types;

// 重导出核心类型
pub use employee::{
    CandidateRecord, CommitFailure, CommitOutcome, EmployeeField, EmployeeRecord, FieldError,
    FieldErrorKind, FieldKind, FieldSlot, FieldValue, ImportResult, RawRow,
};
pub use types::{EmployeeStatus, ImportPhase};
