// ==========================================
// 员工批量导入 - 数据仓储层
// ==========================================
// 职责: 员工存储访问（已有员工号查询 + 单条创建）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

pub mod employee_store;
pub mod employee_store_impl;
pub mod error;

pub use employee_store::EmployeeStore;
pub use employee_store_impl::SqliteEmployeeStore;
pub use error::{RepositoryError, RepositoryResult};
