// ==========================================
// 员工批量导入 - 员工存储 Trait
// ==========================================
// 职责: 定义导入所需的存储访问接口（不包含业务逻辑）
// 红线: 存储不做字段校验，只做读写
// ==========================================

use crate::domain::EmployeeRecord;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashSet;

// ==========================================
// EmployeeStore Trait
// ==========================================
// 用途: 已有员工号查询 + 单条创建
// 实现者: SqliteEmployeeStore（使用 rusqlite）
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// 列出存储中全部员工号（会话开始时调用一次）
    async fn list_employee_ids(&self) -> RepositoryResult<HashSet<String>>;

    /// 创建一条员工记录
    ///
    /// # 返回
    /// - Ok(String): 存储后的员工号
    /// - Err(DuplicateKey): 员工号已存在
    async fn create_employee(&self, employee: &EmployeeRecord) -> RepositoryResult<String>;
}
